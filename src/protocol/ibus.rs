//! # IBUS Decoder
//!
//! Decodes the FlySky IBUS servo stream.
//!
//! ## Frame Layout (32 bytes)
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0 | 1 | Header A (`0x20`, also the frame length) |
//! | 1 | 1 | Header B (`0x40`, servo command) |
//! | 2 | 28 | 14 channels, little-endian `u16`, nominally 1000-2000 |
//! | 30 | 2 | Checksum, little-endian `u16` |
//!
//! The checksum is `0xFFFF` minus every preceding byte, with 16-bit
//! wraparound. It is accumulated while the frame streams in, so no frame
//! buffer is kept.

use tracing::{trace, warn};

use super::checksum::IbusChecksum;
use super::{ChannelFrame, DecoderStats, FrameDecoder, Protocol};

/// First header byte
pub const IBUS_HEADER_A: u8 = 0x20;

/// Second header byte
pub const IBUS_HEADER_B: u8 = 0x40;

/// Channels per frame
pub const IBUS_CHANNELS: usize = 14;

/// Total frame size
pub const IBUS_FRAME_SIZE: usize = 2 + IBUS_CHANNELS * 2 + 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    HdrA,
    HdrB,
    IntLo,
    IntHi,
    CheckA,
    CheckB,
}

/// Byte-fed IBUS decoder
#[derive(Debug)]
pub struct IbusDecoder {
    state: State,
    values: [u16; IBUS_CHANNELS],
    channel: usize,
    checksum: IbusChecksum,
    wire_checksum: u16,
    stats: DecoderStats,
}

impl Default for IbusDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl IbusDecoder {
    /// Create a decoder waiting for a header
    pub fn new() -> Self {
        Self {
            state: State::HdrA,
            values: [0; IBUS_CHANNELS],
            channel: 0,
            checksum: IbusChecksum::new(),
            wire_checksum: 0,
            stats: DecoderStats::default(),
        }
    }
}

impl FrameDecoder for IbusDecoder {
    fn protocol(&self) -> Protocol {
        Protocol::Ibus
    }

    fn feed(&mut self, byte: u8) -> Option<ChannelFrame> {
        match self.state {
            State::HdrA => {
                if byte == IBUS_HEADER_A {
                    self.state = State::HdrB;
                    self.checksum.reset();
                    self.checksum.update(byte);
                } else {
                    self.stats.discarded_bytes += 1;
                }
            }
            State::HdrB => {
                if byte == IBUS_HEADER_B {
                    self.state = State::IntLo;
                    self.checksum.update(byte);
                } else {
                    self.stats.discarded_bytes += 2;
                    self.state = State::HdrA;
                }
                self.channel = 0;
            }
            State::IntLo => {
                self.values[self.channel] = u16::from(byte);
                self.checksum.update(byte);
                self.state = State::IntHi;
            }
            State::IntHi => {
                self.values[self.channel] |= u16::from(byte) << 8;
                self.checksum.update(byte);
                self.channel += 1;
                self.state = if self.channel == IBUS_CHANNELS {
                    State::CheckA
                } else {
                    State::IntLo
                };
            }
            State::CheckA => {
                self.wire_checksum = u16::from(byte);
                self.state = State::CheckB;
            }
            State::CheckB => {
                self.wire_checksum |= u16::from(byte) << 8;
                let computed = self.checksum.value();

                self.state = State::HdrA;
                self.checksum.reset();

                if self.wire_checksum == computed {
                    self.stats.frames += 1;
                    trace!("Decoded IBUS frame: {:?}", self.values);
                    return Some(ChannelFrame {
                        protocol: Protocol::Ibus,
                        channels: self.values.to_vec(),
                        test_channel: None,
                    });
                }

                warn!(
                    "Bad checksum: wire checksum {:04x}, checksum {:04x}",
                    self.wire_checksum, computed
                );
                self.stats.checksum_errors += 1;
            }
        }
        None
    }

    fn reset(&mut self) {
        self.state = State::HdrA;
        self.channel = 0;
        self.checksum.reset();
    }

    fn stats(&self) -> DecoderStats {
        self.stats
    }
}

/// Encode 14 channel values into a complete IBUS frame
///
/// # Examples
///
/// ```
/// use rc_gamepad_bridge::protocol::ibus::{encode_frame, IBUS_CHANNELS, IBUS_FRAME_SIZE};
///
/// let frame = encode_frame(&[1500; IBUS_CHANNELS]);
/// assert_eq!(frame.len(), IBUS_FRAME_SIZE);
/// ```
pub fn encode_frame(channels: &[u16; IBUS_CHANNELS]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(IBUS_FRAME_SIZE);
    frame.push(IBUS_HEADER_A);
    frame.push(IBUS_HEADER_B);
    for &value in channels {
        frame.extend_from_slice(&value.to_le_bytes());
    }
    let checksum = IbusChecksum::compute(&frame);
    frame.extend_from_slice(&checksum.to_le_bytes());
    frame
}
