//! # Gamepad Module
//!
//! Virtual gamepad side of the bridge.
//!
//! This module handles:
//! - The six-axis input report and its HID descriptor
//! - Mapping receiver channels to gamepad axes

pub mod channel_mapper;
pub mod report;
