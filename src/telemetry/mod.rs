//! # Telemetry Module
//!
//! Link statistics and channel diagnostics for the bridge loop.
//!
//! This module handles:
//! - Counting bytes, frames, reports and sink failures
//! - Periodically logging raw channel values and their change since the
//!   previous sample

use tracing::debug;

use crate::protocol::{ChannelFrame, DecoderStats};

/// Counters kept by the bridge loop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BridgeStats {
    /// Bytes received from the byte source
    pub bytes_read: u64,

    /// Frames produced by the decoder
    pub frames: u64,

    /// Reports accepted by the sink
    pub reports_sent: u64,

    /// Reports the sink failed to deliver
    pub sink_errors: u64,

    /// Decoder counters at the time of the snapshot
    pub decoder: DecoderStats,
}

/// Samples every Nth frame and reports per-channel deltas
#[derive(Debug, Clone)]
pub struct ChannelMonitor {
    interval: u64,
    since_sample: u64,
    last: Vec<u16>,
}

impl ChannelMonitor {
    /// Create a monitor sampling every `interval` frames
    ///
    /// An interval of 0 is treated as 1.
    pub fn new(interval: u64) -> Self {
        Self {
            interval: interval.max(1),
            since_sample: 0,
            last: Vec::new(),
        }
    }

    /// Account for a frame, returning the deltas when it is sampled
    ///
    /// The first sample is measured against zero.
    pub fn observe(&mut self, frame: &ChannelFrame) -> Option<Vec<i32>> {
        self.since_sample += 1;
        if self.since_sample < self.interval {
            return None;
        }
        self.since_sample = 0;

        let deltas: Vec<i32> = frame
            .channels
            .iter()
            .enumerate()
            .map(|(i, &value)| {
                i32::from(value) - i32::from(self.last.get(i).copied().unwrap_or(0))
            })
            .collect();
        self.last.clone_from(&frame.channels);

        debug!(
            protocol = %frame.protocol,
            channels = ?frame.channels,
            deltas = ?deltas,
            "Channel sample"
        );
        Some(deltas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Protocol;

    fn frame(channels: Vec<u16>) -> ChannelFrame {
        ChannelFrame {
            protocol: Protocol::Ibus,
            channels,
            test_channel: None,
        }
    }

    #[test]
    fn test_samples_every_interval() {
        let mut monitor = ChannelMonitor::new(3);
        assert!(monitor.observe(&frame(vec![1500])).is_none());
        assert!(monitor.observe(&frame(vec![1500])).is_none());
        assert!(monitor.observe(&frame(vec![1500])).is_some());
        assert!(monitor.observe(&frame(vec![1500])).is_none());
    }

    #[test]
    fn test_deltas_against_previous_sample() {
        let mut monitor = ChannelMonitor::new(1);
        assert_eq!(monitor.observe(&frame(vec![1500, 1000])), Some(vec![1500, 1000]));
        assert_eq!(monitor.observe(&frame(vec![1510, 990])), Some(vec![10, -10]));
    }

    #[test]
    fn test_zero_interval_samples_every_frame() {
        let mut monitor = ChannelMonitor::new(0);
        assert!(monitor.observe(&frame(vec![1])).is_some());
        assert!(monitor.observe(&frame(vec![2])).is_some());
    }

    #[test]
    fn test_default_stats_are_zero() {
        let stats = BridgeStats::default();
        assert_eq!(stats.frames, 0);
        assert_eq!(stats.decoder, DecoderStats::default());
    }
}
