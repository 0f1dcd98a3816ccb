//! # Channel Mapper Module
//!
//! Maps decoded receiver channels to gamepad axes.
//!
//! ## Axis Assignments
//!
//! | Channel index | Axis |
//! |---------------|------|
//! | 0 | Right X |
//! | 1 | Right Y |
//! | 2 | Left Y |
//! | 3 | Left X |
//! | 4 | Aux 1 |
//! | 5 | Aux 2 |
//!
//! IBUS frames carry 14 channels; indices 6-13 have no axis.
//!
//! ## Centering
//!
//! - Custom packets: values clamped to 0-1022, center 511
//! - IBUS: nominal 1000-2000, center 1500, no clamping
//!
//! ## Usage
//!
//! ```
//! use rc_gamepad_bridge::gamepad::channel_mapper::ChannelMapper;
//! use rc_gamepad_bridge::protocol::Protocol;
//!
//! let mapper = ChannelMapper::new();
//! let report = mapper.map_channels(Protocol::Ibus, &[1500; 14]);
//! assert_eq!(report.left_x, 0);
//! ```

use super::report::{Axis, GamepadReport};
use crate::protocol::{ChannelFrame, Protocol};

/// Highest custom-protocol channel value passed through
pub const CHANNEL_MAXIMUM: u16 = 1022;

/// Center of the custom-protocol channel range
pub const CUSTOM_CENTER: i32 = 511;

/// Center of the IBUS channel range
pub const IBUS_CENTER: i32 = 1500;

/// Receiver channel feeding each axis, in report order
pub const AXIS_CHANNELS: [(Axis, usize); 6] = [
    (Axis::LeftX, 3),
    (Axis::LeftY, 2),
    (Axis::RightX, 0),
    (Axis::RightY, 1),
    (Axis::Aux1, 4),
    (Axis::Aux2, 5),
];

/// Maps channel frames to gamepad reports
#[derive(Debug, Clone, Default)]
pub struct ChannelMapper {
    /// Axes whose sign is flipped after centering
    reversed: Vec<Axis>,
}

impl ChannelMapper {
    /// Creates a mapper with no reversed axes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mapper that negates the given axes.
    ///
    /// # Examples
    ///
    /// ```
    /// use rc_gamepad_bridge::gamepad::channel_mapper::ChannelMapper;
    /// use rc_gamepad_bridge::gamepad::report::Axis;
    /// use rc_gamepad_bridge::protocol::Protocol;
    ///
    /// let mapper = ChannelMapper::with_reversed(&[Axis::LeftY]);
    /// let report = mapper.map_channels(Protocol::Ibus, &[1500, 1500, 1600, 1500, 1500, 1500]);
    /// assert_eq!(report.left_y, -100);
    /// ```
    #[must_use]
    pub fn with_reversed(reversed: &[Axis]) -> Self {
        Self {
            reversed: reversed.to_vec(),
        }
    }

    /// Maps a decoded frame using the frame's own protocol.
    #[must_use]
    pub fn map_frame(&self, frame: &ChannelFrame) -> GamepadReport {
        self.map_channels(frame.protocol, &frame.channels)
    }

    /// Maps raw channel values with the centering of `protocol`.
    ///
    /// A channel missing from `channels` maps to a centered axis.
    #[must_use]
    pub fn map_channels(&self, protocol: Protocol, channels: &[u16]) -> GamepadReport {
        let mut report = GamepadReport::default();

        for (axis, index) in AXIS_CHANNELS {
            let value = channels
                .get(index)
                .map_or(0, |&raw| center(protocol, raw));
            report.set(axis, self.apply_reverse(value, axis));
        }

        report
    }

    fn apply_reverse(&self, value: i16, axis: Axis) -> i16 {
        if self.reversed.contains(&axis) {
            value.saturating_neg()
        } else {
            value
        }
    }
}

/// Applies the protocol's clamp and center offset to one channel.
fn center(protocol: Protocol, raw: u16) -> i16 {
    let centered = match protocol {
        Protocol::Custom => i32::from(raw.min(CHANNEL_MAXIMUM)) - CUSTOM_CENTER,
        Protocol::Ibus => i32::from(raw) - IBUS_CENTER,
    };
    // IBUS values are unclamped, so keep the full u16 range representable
    centered.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}
