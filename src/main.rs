//! # RC Gamepad Bridge
//!
//! Turn an RC receiver into a virtual gamepad.
//!
//! Reads IBUS or custom-packet frames from the receiver's serial port and
//! forwards them as six-axis gamepad reports.

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use rc_gamepad_bridge::bridge::Bridge;
use rc_gamepad_bridge::config::{Config, LoggingConfig};
use rc_gamepad_bridge::serial::ReceiverSerial;
use rc_gamepad_bridge::sink::DeviceDescriptor;

/// Configuration file used when none is given on the command line
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Base name of the rolling log files
const LOG_FILE_NAME: &str = "rc-gamepad-bridge.log";

/// Main entry point
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Load configuration (first argument, else `config/default.toml` if
///      present, else built-in defaults)
///    - Set up logging
///    - Open the receiver serial port
///    - Create the virtual gamepad through the configured sink
///
/// 2. **Main Loop**
///    - Decode receiver frames and submit gamepad reports until Ctrl+C or a
///      serial failure
///
/// 3. **Shutdown**
///    - Destroy the virtual gamepad
///
/// # Errors
///
/// Returns error if configuration is invalid, the serial port cannot be
/// opened, the virtual device cannot be created, or the serial port fails
/// while running.
#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config(std::env::args().nth(1))?;
    let _log_guard = init_logging(&config.logging)?;

    info!("RC Gamepad Bridge v{} starting...", env!("CARGO_PKG_VERSION"));
    info!("Protocol: {}", config.protocol.kind);

    let serial = ReceiverSerial::open(&config.serial)?;
    info!("Receiver serial port opened at: {}", serial.device_path());

    let mut bridge = Bridge::from_config(serial, &config);
    bridge
        .configure(&DeviceDescriptor::from_config(&config.device))
        .context("Unable to create virtual HID device")?;

    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down..."),
            Err(e) => error!("Couldn't register signal handler: {}", e),
        }
        flag.store(true, Ordering::SeqCst);
    });

    info!("Press Ctrl+C to exit");
    let result = bridge.run(shutdown).await;

    if let Err(e) = bridge.teardown() {
        warn!("Unable to destroy virtual HID device: {}", e);
    }

    let stats = result.context("Receiver serial port failed")?;
    info!(
        "Total: {} bytes, {} frames, {} reports sent",
        stats.bytes_read, stats.frames, stats.reports_sent
    );
    Ok(())
}

/// Load configuration from an explicit path, the default path, or defaults
fn load_config(arg: Option<String>) -> Result<Config> {
    match arg {
        Some(path) => Config::load(&path)
            .with_context(|| format!("Failed to load configuration from {}", path)),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => Config::load(DEFAULT_CONFIG_PATH)
            .with_context(|| format!("Failed to load configuration from {}", DEFAULT_CONFIG_PATH)),
        None => Ok(Config::default()),
    }
}

/// Initialize the tracing subscriber
///
/// `RUST_LOG` directives are honoured on top of the configured level. When
/// a log directory is configured, output goes to a daily rolling file and
/// the returned guard must be held until exit.
fn init_logging(logging: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::from_default_env().add_directive(
        logging
            .level
            .parse()
            .with_context(|| format!("Invalid log level: {}", logging.level))?,
    );

    match &logging.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_path() {
        assert_eq!(DEFAULT_CONFIG_PATH, "config/default.toml");
    }

    #[test]
    fn test_load_config_explicit_missing_path_fails() {
        let result = load_config(Some("/nonexistent/bridge.toml".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_explicit_path() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[protocol]\nkind = \"ibus\"\n").unwrap();
        file.flush().unwrap();

        let config = load_config(Some(file.path().display().to_string())).unwrap();
        assert_eq!(config.protocol.kind, rc_gamepad_bridge::protocol::Protocol::Ibus);
    }

    #[test]
    fn test_log_levels_parse_as_directives() {
        for level in ["trace", "debug", "info", "warn", "error"] {
            let parsed = level.parse::<tracing_subscriber::filter::Directive>();
            assert!(parsed.is_ok(), "{} should parse", level);
        }
    }
}
