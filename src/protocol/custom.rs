//! # Custom Packet Decoder
//!
//! Decodes the fixed-size packets sent by the serial transmitter firmware.
//!
//! ## Packet Layout (18 bytes)
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0 | 1 | Header A (`0x55`) |
//! | 1 | 1 | Header B (`0xFC`) |
//! | 2 | 12 | 6 channels, big-endian `u16`, raw value + 1000 |
//! | 14 | 2 | Test channel, big-endian `u16`, no offset |
//! | 16 | 2 | Sum of the 14 payload bytes, big-endian `u16` |
//!
//! The test channel repeats decoded channel 2. A mismatch is only reported,
//! never used to drop the packet.

use tracing::{trace, warn};

use super::checksum::sum16;
use super::{ChannelFrame, DecoderStats, FrameDecoder, Protocol};

/// First header byte
pub const HEADER_A: u8 = 85;

/// Second header byte
pub const HEADER_B: u8 = 252;

/// Total packet size including header and checksum
pub const PACKET_SIZE: usize = 18;

/// Header length
pub const HEADER_BYTES: usize = 2;

/// Checksum trailer length
pub const CHECKSUM_BYTES: usize = 2;

/// Payload length: six channels plus the test channel
pub const PAYLOAD_BYTES: usize = PACKET_SIZE - HEADER_BYTES - CHECKSUM_BYTES;

/// Number of control channels per packet
pub const CHANNELS: usize = 6;

/// Channel the test channel must repeat
pub const TEST_CHANNEL: usize = 2;

/// Offset added to every control channel by the transmitter
pub const CHANNEL_OFFSET: u16 = 1000;

/// Parser position within a packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Scanning for `HEADER_A`
    HeaderA,
    /// `HEADER_A` seen, expecting `HEADER_B`
    HeaderB,
    /// Collecting payload bytes
    Payload,
    /// Collecting checksum bytes
    Checksum,
}

/// Byte-fed decoder for custom packets
#[derive(Debug)]
pub struct CustomDecoder {
    state: State,
    body: [u8; PAYLOAD_BYTES + CHECKSUM_BYTES],
    filled: usize,
    stats: DecoderStats,
}

impl Default for CustomDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl CustomDecoder {
    /// Create a decoder scanning for a header
    pub fn new() -> Self {
        Self {
            state: State::HeaderA,
            body: [0; PAYLOAD_BYTES + CHECKSUM_BYTES],
            filled: 0,
            stats: DecoderStats::default(),
        }
    }

    /// Big-endian word `index` of the packet body
    fn word(&self, index: usize) -> u16 {
        u16::from_be_bytes([self.body[2 * index], self.body[2 * index + 1]])
    }

    /// Validate and decode a completed packet body, then rearm the parser
    fn finish(&mut self) -> Option<ChannelFrame> {
        self.state = State::HeaderA;
        self.filled = 0;

        let computed = sum16(&self.body[..PAYLOAD_BYTES]);
        let wire = self.word(PAYLOAD_BYTES / 2);

        if computed != wire {
            warn!("Wrong checksum: {} != {}", computed, wire);
            self.stats.checksum_errors += 1;
            return None;
        }

        let channels: Vec<u16> = (0..CHANNELS)
            .map(|i| self.word(i).saturating_sub(CHANNEL_OFFSET))
            .collect();

        let test_channel = self.word(CHANNELS);
        if test_channel != channels[TEST_CHANNEL] {
            warn!(
                "Wrong test channel value: {} != {}",
                test_channel, channels[TEST_CHANNEL]
            );
            self.stats.test_channel_mismatches += 1;
        }

        self.stats.frames += 1;
        trace!("Decoded custom packet: {:?}", channels);

        Some(ChannelFrame {
            protocol: Protocol::Custom,
            channels,
            test_channel: Some(test_channel),
        })
    }
}

impl FrameDecoder for CustomDecoder {
    fn protocol(&self) -> Protocol {
        Protocol::Custom
    }

    fn feed(&mut self, byte: u8) -> Option<ChannelFrame> {
        match self.state {
            State::HeaderA => {
                if byte == HEADER_A {
                    self.state = State::HeaderB;
                } else {
                    self.stats.discarded_bytes += 1;
                }
                None
            }
            State::HeaderB => {
                if byte == HEADER_B {
                    self.state = State::Payload;
                    self.filled = 0;
                } else if byte == HEADER_A {
                    // The failed candidate may itself open the next packet
                    self.stats.discarded_bytes += 1;
                } else {
                    self.stats.discarded_bytes += 2;
                    self.state = State::HeaderA;
                }
                None
            }
            State::Payload => {
                self.body[self.filled] = byte;
                self.filled += 1;
                if self.filled == PAYLOAD_BYTES {
                    self.state = State::Checksum;
                }
                None
            }
            State::Checksum => {
                self.body[self.filled] = byte;
                self.filled += 1;
                if self.filled == PAYLOAD_BYTES + CHECKSUM_BYTES {
                    self.finish()
                } else {
                    None
                }
            }
        }
    }

    fn reset(&mut self) {
        self.state = State::HeaderA;
        self.filled = 0;
    }

    fn stats(&self) -> DecoderStats {
        self.stats
    }
}

/// Encode the seven payload words into a complete 18-byte packet
///
/// `words` holds the six wire channel values followed by the test channel.
/// Values are written as-is; a decoded channel value `v` is sent as
/// `v + CHANNEL_OFFSET`, the test channel without offset.
///
/// # Examples
///
/// ```
/// use rc_gamepad_bridge::protocol::custom::{encode_packet, PACKET_SIZE};
///
/// let packet = encode_packet(&[1511, 1511, 1511, 1511, 1511, 1511, 511]);
/// assert_eq!(packet.len(), PACKET_SIZE);
/// ```
pub fn encode_packet(words: &[u16; CHANNELS + 1]) -> Vec<u8> {
    let mut packet = Vec::with_capacity(PACKET_SIZE);
    packet.push(HEADER_A);
    packet.push(HEADER_B);
    for &value in words {
        packet.extend_from_slice(&value.to_be_bytes());
    }
    let checksum = sum16(&packet[HEADER_BYTES..]);
    packet.extend_from_slice(&checksum.to_be_bytes());
    packet
}

/// Encode six wire channel values with a matching test channel
///
/// # Examples
///
/// ```
/// use rc_gamepad_bridge::protocol::custom::encode_channels;
///
/// let packet = encode_channels(&[1000, 1100, 1200, 1300, 1400, 1500]);
/// assert_eq!(&packet[14..16], &200u16.to_be_bytes());
/// ```
pub fn encode_channels(channels: &[u16; CHANNELS]) -> Vec<u8> {
    let mut words = [0u16; CHANNELS + 1];
    words[..CHANNELS].copy_from_slice(channels);
    words[CHANNELS] = channels[TEST_CHANNEL].saturating_sub(CHANNEL_OFFSET);
    encode_packet(&words)
}
