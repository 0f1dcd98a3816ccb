//! # Serial Communication Module
//!
//! Reads the receiver's serial output.
//!
//! This module handles:
//! - Opening the receiver UART (8N1, no flow control)
//! - Async chunked reads feeding the frame decoders
//! - The [`ByteSource`] abstraction used by the bridge loop

pub mod port_trait;

pub use port_trait::ByteSource;

use async_trait::async_trait;
use std::io;
use tokio::io::AsyncReadExt;
use tokio_serial::SerialPortBuilderExt;
use tracing::{debug, info};

use crate::config::SerialConfig;
use crate::error::{BridgeError, Result};

/// Receiver serial port handler
pub struct ReceiverSerial {
    /// Serial port handle
    port: tokio_serial::SerialStream,
    /// Device path (e.g., /dev/ttyUSB0)
    device_path: String,
}

impl std::fmt::Debug for ReceiverSerial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReceiverSerial")
            .field("device_path", &self.device_path)
            .finish_non_exhaustive()
    }
}

impl ReceiverSerial {
    /// Open the receiver port described by the serial configuration
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::Serial` if the port cannot be opened
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use rc_gamepad_bridge::config::SerialConfig;
    /// use rc_gamepad_bridge::serial::ReceiverSerial;
    ///
    /// #[tokio::main]
    /// async fn main() -> anyhow::Result<()> {
    ///     let serial = ReceiverSerial::open(&SerialConfig::default())?;
    ///     println!("Connected to: {}", serial.device_path());
    ///     Ok(())
    /// }
    /// ```
    pub fn open(config: &SerialConfig) -> Result<Self> {
        debug!("Opening serial port {} at {} baud", config.port, config.baud_rate);
        let port = Self::open_port(&config.port, config.baud_rate)?;
        info!("Opened receiver at {}", config.port);

        Ok(Self {
            port,
            device_path: config.port.clone(),
        })
    }

    fn open_port(path: &str, baud_rate: u32) -> Result<tokio_serial::SerialStream> {
        let port = tokio_serial::new(path, baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .open_native_async()
            .map_err(|e| BridgeError::Serial(format!("Failed to open {}: {}", path, e)))?;

        Ok(port)
    }

    /// Get the device path of the opened serial port
    pub fn device_path(&self) -> &str {
        &self.device_path
    }
}

#[async_trait]
impl ByteSource for ReceiverSerial {
    async fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.port.read(buf).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_with_invalid_path_returns_error() {
        let config = SerialConfig {
            port: "/dev/nonexistent_serial_device_12345".to_string(),
            ..SerialConfig::default()
        };
        let result = ReceiverSerial::open(&config);

        match result {
            Err(BridgeError::Serial(msg)) => {
                assert!(msg.contains("/dev/nonexistent_serial_device_12345"));
                assert!(msg.contains("Failed to open"));
            }
            other => panic!("Expected Serial error, got: {:?}", other),
        }
    }

    // Integration test - only runs if a receiver is connected
    #[tokio::test]
    #[ignore] // Run with: cargo test -- --ignored
    async fn test_read_with_real_hardware() {
        let result = ReceiverSerial::open(&SerialConfig::default());

        if let Ok(mut serial) = result {
            let mut buf = [0u8; 64];
            let read = tokio::time::timeout(
                std::time::Duration::from_millis(500),
                serial.read_chunk(&mut buf),
            )
            .await;
            println!("Read from {}: {:?}", serial.device_path(), read);
        } else {
            println!("No receiver detected (skipping read test)");
        }
    }
}
