//! # Receiver Checksums
//!
//! The two checksum schemes used by the receiver protocols.
//!
//! **Custom packets**: wrapping 16-bit sum of the payload bytes, sent
//! big-endian after the payload.
//!
//! **IBUS**: starts at `0xFFFF`, every header and channel byte is subtracted
//! with 16-bit wraparound, sent little-endian after the channels.

/// Initial value of the IBUS running checksum
pub const IBUS_CHECKSUM_SEED: u16 = 0xFFFF;

/// Wrapping 16-bit sum of a payload
///
/// # Examples
///
/// ```
/// use rc_gamepad_bridge::protocol::checksum::sum16;
///
/// assert_eq!(sum16(&[0xFF; 4]), 0x03FC);
/// ```
pub fn sum16(data: &[u8]) -> u16 {
    data.iter()
        .fold(0u16, |acc, &byte| acc.wrapping_add(u16::from(byte)))
}

/// Running IBUS checksum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IbusChecksum {
    value: u16,
}

impl Default for IbusChecksum {
    fn default() -> Self {
        Self::new()
    }
}

impl IbusChecksum {
    /// Create an accumulator at its seed value
    pub fn new() -> Self {
        Self {
            value: IBUS_CHECKSUM_SEED,
        }
    }

    /// Reset to the seed value
    pub fn reset(&mut self) {
        self.value = IBUS_CHECKSUM_SEED;
    }

    /// Account for one byte
    pub fn update(&mut self, byte: u8) {
        self.value = self.value.wrapping_sub(u16::from(byte));
    }

    /// Current accumulated value
    pub fn value(&self) -> u16 {
        self.value
    }

    /// Checksum of a complete byte run (header + channels)
    pub fn compute(data: &[u8]) -> u16 {
        let mut checksum = Self::new();
        for &byte in data {
            checksum.update(byte);
        }
        checksum.value()
    }
}
