//! # Output Sink Module
//!
//! Destinations for gamepad reports.
//!
//! This module handles:
//! - The [`OutputSink`] trait the bridge loop submits reports through
//! - A logging sink for dry runs and debugging
//! - A HID gadget sink writing raw reports to `/dev/hidgN`
//!
//! A sink is configured once with a [`DeviceDescriptor`] before decoding
//! starts and torn down once on exit. Submission failures are reported to
//! the caller, which treats them as non-fatal.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{DeviceConfig, OutputConfig, OutputKind};
use crate::gamepad::report::{GamepadReport, REPORT_DESCRIPTOR};

/// Errors raised by output sinks
#[derive(Debug, Error)]
pub enum SinkError {
    /// Report submitted before `configure` succeeded
    #[error("output sink is not configured")]
    NotConfigured,

    /// Underlying device I/O failed
    #[error("output device I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Identity and report layout of the virtual device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    pub name: String,
    pub serial: String,
    pub vendor_id: u16,
    pub product_id: u16,
    pub report_descriptor: Vec<u8>,
}

impl DeviceDescriptor {
    /// Build a descriptor for the six-axis gamepad from device settings
    pub fn from_config(device: &DeviceConfig) -> Self {
        Self {
            name: device.name.clone(),
            serial: device.serial.clone(),
            vendor_id: device.vendor_id,
            product_id: device.product_id,
            report_descriptor: REPORT_DESCRIPTOR.to_vec(),
        }
    }
}

/// A destination for gamepad reports
#[cfg_attr(test, mockall::automock)]
pub trait OutputSink: Send {
    /// Create or open the virtual device
    fn configure(&mut self, device: &DeviceDescriptor) -> Result<(), SinkError>;

    /// Send one report
    fn submit(&mut self, report: &GamepadReport) -> Result<(), SinkError>;

    /// Release the virtual device
    fn teardown(&mut self) -> Result<(), SinkError>;
}

/// Create the sink selected in the configuration
pub fn new_sink(output: &OutputConfig) -> Box<dyn OutputSink> {
    match output.kind {
        OutputKind::Log => Box::new(LogSink::new()),
        OutputKind::Hidg => Box::new(HidgSink::new(output.path.clone())),
    }
}

/// Sink that only logs reports
#[derive(Debug, Default)]
pub struct LogSink {
    configured: bool,
    submitted: u64,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports accepted so far
    pub fn submitted(&self) -> u64 {
        self.submitted
    }
}

impl OutputSink for LogSink {
    fn configure(&mut self, device: &DeviceDescriptor) -> Result<(), SinkError> {
        info!(
            "Virtual device '{}' ({}) {:04x}:{:04x}, {}-byte report descriptor",
            device.name,
            device.serial,
            device.vendor_id,
            device.product_id,
            device.report_descriptor.len()
        );
        self.configured = true;
        Ok(())
    }

    fn submit(&mut self, report: &GamepadReport) -> Result<(), SinkError> {
        if !self.configured {
            return Err(SinkError::NotConfigured);
        }
        debug!(
            left_x = report.left_x,
            left_y = report.left_y,
            right_x = report.right_x,
            right_y = report.right_y,
            aux1 = report.aux1,
            aux2 = report.aux2,
            "Sending gamepad report"
        );
        self.submitted += 1;
        Ok(())
    }

    fn teardown(&mut self) -> Result<(), SinkError> {
        info!("Destroying virtual device ({} reports sent)", self.submitted);
        self.configured = false;
        Ok(())
    }
}

/// Sink writing raw reports to a Linux USB HID gadget device
///
/// The gadget itself (descriptor, vendor and product id) is set up through
/// configfs outside this process; this sink only writes input reports.
#[derive(Debug)]
pub struct HidgSink {
    path: PathBuf,
    device: Option<File>,
}

impl HidgSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            device: None,
        }
    }
}

impl OutputSink for HidgSink {
    fn configure(&mut self, device: &DeviceDescriptor) -> Result<(), SinkError> {
        let file = OpenOptions::new().write(true).open(&self.path)?;
        info!(
            "Opened HID gadget {} for '{}' ({})",
            self.path.display(),
            device.name,
            device.serial
        );
        self.device = Some(file);
        Ok(())
    }

    fn submit(&mut self, report: &GamepadReport) -> Result<(), SinkError> {
        let device = self.device.as_mut().ok_or(SinkError::NotConfigured)?;
        device.write_all(&report.to_bytes())?;
        Ok(())
    }

    fn teardown(&mut self) -> Result<(), SinkError> {
        if let Some(mut device) = self.device.take() {
            device.flush()?;
            info!("Closed HID gadget {}", self.path.display());
        }
        Ok(())
    }
}
