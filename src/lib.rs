//! # RC Gamepad Bridge Library
//!
//! Turn an RC receiver into a virtual gamepad.
//!
//! This library decodes the serial output of an RC receiver (FlySky IBUS or
//! the 18-byte custom packet protocol), maps the channels to a six-axis
//! gamepad report, and hands the report to an output sink.

pub mod bridge;
pub mod config;
pub mod error;
pub mod gamepad;
pub mod protocol;
pub mod serial;
pub mod sink;
pub mod telemetry;
