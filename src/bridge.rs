//! # Bridge Loop
//!
//! Moves bytes from the receiver through the active decoder and channel
//! mapper into the output sink.
//!
//! The loop is single-threaded and cooperative: every read is bounded by
//! the poll timeout, and the shutdown flag is checked before each read, so
//! a shutdown request is honoured within one poll interval even when the
//! receiver is silent or a frame is only partly received.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::time::{timeout, Duration};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::gamepad::channel_mapper::ChannelMapper;
use crate::protocol::{new_decoder, ChannelFrame, FrameDecoder};
use crate::serial::ByteSource;
use crate::sink::{new_sink, DeviceDescriptor, OutputSink};
use crate::telemetry::{BridgeStats, ChannelMonitor};

/// Loop timing and reporting settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeSettings {
    /// Longest wait for receiver data before rechecking the shutdown flag
    pub poll_timeout: Duration,

    /// Largest chunk read from the source at once
    pub read_buffer_size: usize,

    /// Frames between status log lines
    pub stats_interval_frames: u64,

    /// Frames between channel samples
    pub monitor_interval: u64,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            poll_timeout: Duration::from_millis(1),
            read_buffer_size: 1000,
            stats_interval_frames: 1000,
            monitor_interval: 10,
        }
    }
}

impl BridgeSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            poll_timeout: Duration::from_millis(config.serial.poll_timeout_ms),
            read_buffer_size: config.serial.read_buffer_size,
            stats_interval_frames: config.logging.stats_interval_frames,
            monitor_interval: config.logging.monitor_interval,
        }
    }
}

/// Receiver to gamepad bridge
pub struct Bridge<S: ByteSource> {
    source: S,
    decoder: Box<dyn FrameDecoder>,
    mapper: ChannelMapper,
    sink: Box<dyn OutputSink>,
    settings: BridgeSettings,
    monitor: ChannelMonitor,
    stats: BridgeStats,
}

impl<S: ByteSource> Bridge<S> {
    pub fn new(
        source: S,
        decoder: Box<dyn FrameDecoder>,
        mapper: ChannelMapper,
        sink: Box<dyn OutputSink>,
        settings: BridgeSettings,
    ) -> Self {
        Self {
            source,
            decoder,
            mapper,
            sink,
            monitor: ChannelMonitor::new(settings.monitor_interval),
            settings,
            stats: BridgeStats::default(),
        }
    }

    /// Build a bridge with the decoder, mapper and sink selected by `config`
    pub fn from_config(source: S, config: &Config) -> Self {
        Self::new(
            source,
            new_decoder(config.protocol.kind),
            ChannelMapper::with_reversed(&config.mapping.reverse_axes),
            new_sink(&config.output),
            BridgeSettings::from_config(config),
        )
    }

    /// Configure the output sink's virtual device
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::Sink` if the device cannot be created
    pub fn configure(&mut self, device: &DeviceDescriptor) -> Result<()> {
        self.sink.configure(device)?;
        Ok(())
    }

    /// Release the output sink's virtual device
    pub fn teardown(&mut self) -> Result<()> {
        self.sink.teardown()?;
        Ok(())
    }

    /// Run until `shutdown` is set or the byte source fails
    ///
    /// Returns a snapshot of the counters at shutdown.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::Io` if reading from the byte source fails.
    /// Decoding and sink errors are logged and never end the loop.
    pub async fn run(&mut self, shutdown: Arc<AtomicBool>) -> Result<BridgeStats> {
        let mut buf = vec![0u8; self.settings.read_buffer_size.max(1)];

        info!(
            "Decoding {} frames (poll timeout {:?})",
            self.decoder.protocol(),
            self.settings.poll_timeout
        );

        while !shutdown.load(Ordering::SeqCst) {
            let read = timeout(
                self.settings.poll_timeout,
                self.source.read_chunk(&mut buf),
            )
            .await;

            let n = match read {
                // No data within the poll window
                Err(_) => continue,
                Ok(Ok(n)) => n,
                Ok(Err(e)) => {
                    error!("Receiver read failed: {}", e);
                    return Err(e.into());
                }
            };

            if n > 0 {
                self.process(&buf[..n]);
            }
        }

        let stats = self.stats();
        info!(
            "Stopped after {} frames ({} reports sent, {} checksum errors)",
            stats.frames, stats.reports_sent, stats.decoder.checksum_errors
        );
        Ok(stats)
    }

    /// Feed a chunk of receiver bytes through the pipeline
    ///
    /// Returns the number of frames completed by the chunk.
    pub fn process(&mut self, bytes: &[u8]) -> usize {
        self.stats.bytes_read += bytes.len() as u64;

        let frames = self.decoder.feed_all(bytes);
        for frame in &frames {
            self.handle_frame(frame);
        }
        frames.len()
    }

    fn handle_frame(&mut self, frame: &ChannelFrame) {
        self.stats.frames += 1;
        self.monitor.observe(frame);

        let report = self.mapper.map_frame(frame);
        match self.sink.submit(&report) {
            Ok(()) => self.stats.reports_sent += 1,
            Err(e) => {
                self.stats.sink_errors += 1;
                warn!("Unable to send report to virtual device: {}", e);
            }
        }

        if self.stats.frames % self.settings.stats_interval_frames.max(1) == 0 {
            let decoder = self.decoder.stats();
            info!(
                "Decoded {} frames ({} checksum errors, {} test channel mismatches, \
                 {} sink errors)",
                self.stats.frames,
                decoder.checksum_errors,
                decoder.test_channel_mismatches,
                self.stats.sink_errors
            );
        }
    }

    /// Snapshot of the loop and decoder counters
    pub fn stats(&self) -> BridgeStats {
        BridgeStats {
            decoder: self.decoder.stats(),
            ..self.stats
        }
    }
}
