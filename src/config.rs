//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{BridgeError, Result};
use crate::gamepad::report::Axis;
use crate::protocol::Protocol;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub serial: SerialConfig,
    #[serde(default)]
    pub protocol: ProtocolConfig,
    #[serde(default)]
    pub mapping: MappingConfig,
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Serial port configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SerialConfig {
    #[serde(default = "default_serial_port")]
    pub port: String,

    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    /// Longest wait for data before rechecking the shutdown flag
    #[serde(default = "default_poll_timeout_ms")]
    pub poll_timeout_ms: u64,

    #[serde(default = "default_read_buffer_size")]
    pub read_buffer_size: usize,
}

/// Receiver protocol selection
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ProtocolConfig {
    #[serde(default)]
    pub kind: Protocol,
}

/// Channel to axis mapping configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct MappingConfig {
    #[serde(default)]
    pub reverse_axes: Vec<Axis>,
}

/// Virtual device identity
#[derive(Debug, Deserialize, Clone)]
pub struct DeviceConfig {
    #[serde(default = "default_device_name")]
    pub name: String,

    #[serde(default = "default_device_serial")]
    pub serial: String,

    #[serde(default = "default_vendor_id")]
    pub vendor_id: u16,

    #[serde(default = "default_product_id")]
    pub product_id: u16,
}

/// Where gamepad reports are sent
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    /// Log reports only
    #[default]
    Log,
    /// Write reports to a HID gadget device
    Hidg,
}

/// Output sink configuration
#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    #[serde(default)]
    pub kind: OutputKind,

    #[serde(default = "default_output_path")]
    pub path: String,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for daily rolling log files; console only when unset
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    #[serde(default = "default_stats_interval_frames")]
    pub stats_interval_frames: u64,

    #[serde(default = "default_monitor_interval")]
    pub monitor_interval: u64,
}

// Default value functions
fn default_serial_port() -> String { "/dev/ttyUSB0".to_string() }
fn default_baud_rate() -> u32 { 115200 }
fn default_poll_timeout_ms() -> u64 { 1 }
fn default_read_buffer_size() -> usize { 1000 }

fn default_device_name() -> String { "Virtual Serial Transmitter".to_string() }
fn default_device_serial() -> String { "SN 123456".to_string() }
fn default_vendor_id() -> u16 { 2 }
fn default_product_id() -> u16 { 3 }

fn default_output_path() -> String { "/dev/hidg0".to_string() }

fn default_log_level() -> String { "info".to_string() }
fn default_stats_interval_frames() -> u64 { 1000 }
fn default_monitor_interval() -> u64 { 10 }

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: default_serial_port(),
            baud_rate: default_baud_rate(),
            poll_timeout_ms: default_poll_timeout_ms(),
            read_buffer_size: default_read_buffer_size(),
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            name: default_device_name(),
            serial: default_device_serial(),
            vendor_id: default_vendor_id(),
            product_id: default_product_id(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            kind: OutputKind::default(),
            path: default_output_path(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_dir: None,
            stats_interval_frames: default_stats_interval_frames(),
            monitor_interval: default_monitor_interval(),
        }
    }
}

/// Baud rates receivers are commonly configured for
const SUPPORTED_BAUD_RATES: [u32; 6] = [9600, 19200, 38400, 57600, 115200, 230400];

/// Accepted `logging.level` values
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

fn invalid(message: impl Into<String>) -> BridgeError {
    BridgeError::InvalidConfig(message.into())
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use rc_gamepad_bridge::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        if self.serial.port.is_empty() {
            return Err(invalid("serial port cannot be empty"));
        }

        if !SUPPORTED_BAUD_RATES.contains(&self.serial.baud_rate) {
            return Err(invalid(format!(
                "baud_rate must be one of: {:?}",
                SUPPORTED_BAUD_RATES
            )));
        }

        if self.serial.poll_timeout_ms == 0 || self.serial.poll_timeout_ms > 1000 {
            return Err(invalid("poll_timeout_ms must be between 1 and 1000"));
        }

        if self.serial.read_buffer_size == 0 || self.serial.read_buffer_size > 4096 {
            return Err(invalid("read_buffer_size must be between 1 and 4096"));
        }

        if self.device.name.is_empty() {
            return Err(invalid("device name cannot be empty"));
        }

        if self.device.serial.is_empty() {
            return Err(invalid("device serial cannot be empty"));
        }

        if self.output.kind == OutputKind::Hidg && self.output.path.is_empty() {
            return Err(invalid("output path cannot be empty for hidg output"));
        }

        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(invalid(format!(
                "logging level must be one of: {}",
                LOG_LEVELS.join(", ")
            )));
        }

        if self.logging.stats_interval_frames == 0 {
            return Err(invalid("stats_interval_frames must be greater than 0"));
        }

        if self.logging.monitor_interval == 0 {
            return Err(invalid("monitor_interval must be greater than 0"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_valid_config() -> Config {
        Config::default()
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(create_valid_config().validate().is_ok());
    }

    #[test]
    fn test_load_config_from_file() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let toml_content = r#"
[serial]
port = "/dev/ttyAMA0"
baud_rate = 115200

[protocol]
kind = "ibus"

[mapping]
reverse_axes = ["left_y", "aux2"]

[device]
name = "Receiver Pad"

[output]
kind = "hidg"
path = "/dev/hidg1"

[logging]
level = "debug"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = Config::load(temp_file.path()).unwrap();
        assert_eq!(config.serial.port, "/dev/ttyAMA0");
        assert_eq!(config.protocol.kind, Protocol::Ibus);
        assert_eq!(config.mapping.reverse_axes, vec![Axis::LeftY, Axis::Aux2]);
        assert_eq!(config.device.name, "Receiver Pad");
        assert_eq!(config.device.serial, "SN 123456");
        assert_eq!(config.output.kind, OutputKind::Hidg);
        assert_eq!(config.output.path, "/dev/hidg1");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_shipped_default_config_loads() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/default.toml");
        let config = Config::load(path).unwrap();
        assert_eq!(config.protocol.kind, Protocol::Custom);
        assert_eq!(config.output.kind, OutputKind::Log);
        assert_eq!(config.device.vendor_id, 2);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.serial.port, "/dev/ttyUSB0");
        assert_eq!(config.protocol.kind, Protocol::Custom);
        assert!(config.mapping.reverse_axes.is_empty());
        assert_eq!(config.output.kind, OutputKind::Log);
        assert!(config.logging.log_dir.is_none());
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load("/nonexistent/rc-gamepad-bridge.toml");
        assert!(matches!(result, Err(BridgeError::Io(_))));
    }

    #[test]
    fn test_unknown_protocol_rejected() {
        let result = Config::from_toml("[protocol]\nkind = \"sbus\"\n");
        assert!(matches!(result, Err(BridgeError::Config(_))));
    }

    #[test]
    fn test_unknown_axis_rejected() {
        let result = Config::from_toml("[mapping]\nreverse_axes = [\"throttle\"]\n");
        assert!(matches!(result, Err(BridgeError::Config(_))));
    }

    #[test]
    fn test_empty_serial_port() {
        let mut config = create_valid_config();
        config.serial.port = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_baud_rate() {
        let mut config = create_valid_config();
        config.serial.baud_rate = 420000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_valid_baud_rates() {
        for &baud in &SUPPORTED_BAUD_RATES {
            let mut config = create_valid_config();
            config.serial.baud_rate = baud;
            assert!(config.validate().is_ok(), "Baud rate {} should be valid", baud);
        }
    }

    #[test]
    fn test_poll_timeout_zero() {
        let mut config = create_valid_config();
        config.serial.poll_timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_poll_timeout_too_high() {
        let mut config = create_valid_config();
        config.serial.poll_timeout_ms = 1001;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_read_buffer_size_zero() {
        let mut config = create_valid_config();
        config.serial.read_buffer_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_read_buffer_size_too_high() {
        let mut config = create_valid_config();
        config.serial.read_buffer_size = 4097;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_device_name() {
        let mut config = create_valid_config();
        config.device.name = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_device_serial() {
        let mut config = create_valid_config();
        config.device.serial = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_hidg_requires_path() {
        let mut config = create_valid_config();
        config.output.kind = OutputKind::Hidg;
        config.output.path = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_log_output_ignores_empty_path() {
        let mut config = create_valid_config();
        config.output.kind = OutputKind::Log;
        config.output.path = String::new();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = create_valid_config();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_stats_interval_zero() {
        let mut config = create_valid_config();
        config.logging.stats_interval_frames = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_monitor_interval_zero() {
        let mut config = create_valid_config();
        config.logging.monitor_interval = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_functions() {
        assert_eq!(default_serial_port(), "/dev/ttyUSB0");
        assert_eq!(default_baud_rate(), 115200);
        assert_eq!(default_poll_timeout_ms(), 1);
        assert_eq!(default_read_buffer_size(), 1000);
        assert_eq!(default_device_name(), "Virtual Serial Transmitter");
        assert_eq!(default_device_serial(), "SN 123456");
        assert_eq!(default_vendor_id(), 2);
        assert_eq!(default_product_id(), 3);
        assert_eq!(default_output_path(), "/dev/hidg0");
        assert_eq!(default_log_level(), "info");
        assert_eq!(default_stats_interval_frames(), 1000);
        assert_eq!(default_monitor_interval(), 10);
    }
}
