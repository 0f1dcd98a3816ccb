//! # Gamepad Report
//!
//! The six-axis input report sent to the virtual HID device, and the HID
//! report descriptor describing it.

use serde::Deserialize;

/// Number of axes in a report
pub const REPORT_AXES: usize = 6;

/// Serialized report length (six little-endian `i16`)
pub const REPORT_SIZE: usize = REPORT_AXES * 2;

/// Logical minimum advertised by the descriptor
pub const AXIS_LOGICAL_MIN: i16 = -511;

/// Logical maximum advertised by the descriptor
pub const AXIS_LOGICAL_MAX: i16 = 511;

/// HID report descriptor for a game pad with six 16-bit axes
///
/// For details on the format see the USB HID Device Class Definition and
/// the HID Usage Tables (Generic Desktop page).
#[rustfmt::skip]
pub const REPORT_DESCRIPTOR: [u8; 36] = [
    0x05, 0x01,       // USAGE_PAGE (Generic Desktop)
    0x09, 0x05,       // USAGE (Game Pad)
    0xa1, 0x01,       // COLLECTION (Application)
    0xa1, 0x00,       //   COLLECTION (Physical)
    0x05, 0x01,       //     USAGE_PAGE (Generic Desktop)
    0x09, 0x30,       //     USAGE (X)
    0x09, 0x31,       //     USAGE (Y)
    0x09, 0x32,       //     USAGE (Z)
    0x09, 0x33,       //     USAGE (Rx)
    0x09, 0x34,       //     USAGE (Ry)
    0x09, 0x35,       //     USAGE (Rz)
    0x16, 0x01, 0xfe, //     LOGICAL_MINIMUM (-511)
    0x26, 0xff, 0x01, //     LOGICAL_MAXIMUM (511)
    0x75, 0x10,       //     REPORT_SIZE (16)
    0x95, 0x06,       //     REPORT_COUNT (6)
    0x81, 0x02,       //     INPUT (Data,Var,Abs)
    0xc0,             //   END_COLLECTION
    0xc0,             // END_COLLECTION
];

/// Gamepad axis, in report order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    LeftX,
    LeftY,
    RightX,
    RightY,
    Aux1,
    Aux2,
}

impl Axis {
    /// All axes in report order
    pub const ALL: [Axis; REPORT_AXES] = [
        Axis::LeftX,
        Axis::LeftY,
        Axis::RightX,
        Axis::RightY,
        Axis::Aux1,
        Axis::Aux2,
    ];

    /// Position of the axis within the report
    pub fn index(self) -> usize {
        match self {
            Axis::LeftX => 0,
            Axis::LeftY => 1,
            Axis::RightX => 2,
            Axis::RightY => 3,
            Axis::Aux1 => 4,
            Axis::Aux2 => 5,
        }
    }
}

/// One gamepad input report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GamepadReport {
    pub left_x: i16,
    pub left_y: i16,
    pub right_x: i16,
    pub right_y: i16,
    pub aux1: i16,
    pub aux2: i16,
}

impl GamepadReport {
    /// Read an axis
    pub fn get(&self, axis: Axis) -> i16 {
        match axis {
            Axis::LeftX => self.left_x,
            Axis::LeftY => self.left_y,
            Axis::RightX => self.right_x,
            Axis::RightY => self.right_y,
            Axis::Aux1 => self.aux1,
            Axis::Aux2 => self.aux2,
        }
    }

    /// Write an axis
    pub fn set(&mut self, axis: Axis, value: i16) {
        match axis {
            Axis::LeftX => self.left_x = value,
            Axis::LeftY => self.left_y = value,
            Axis::RightX => self.right_x = value,
            Axis::RightY => self.right_y = value,
            Axis::Aux1 => self.aux1 = value,
            Axis::Aux2 => self.aux2 = value,
        }
    }

    /// Serialize to the wire layout described by [`REPORT_DESCRIPTOR`]
    ///
    /// # Examples
    ///
    /// ```
    /// use rc_gamepad_bridge::gamepad::report::GamepadReport;
    ///
    /// let report = GamepadReport { left_x: -1, ..Default::default() };
    /// assert_eq!(&report.to_bytes()[..2], &[0xFF, 0xFF]);
    /// ```
    pub fn to_bytes(&self) -> [u8; REPORT_SIZE] {
        let mut bytes = [0u8; REPORT_SIZE];
        for axis in Axis::ALL {
            let offset = axis.index() * 2;
            bytes[offset..offset + 2].copy_from_slice(&self.get(axis).to_le_bytes());
        }
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_length() {
        assert_eq!(REPORT_DESCRIPTOR.len(), 36);
    }

    #[test]
    fn test_descriptor_logical_range() {
        let min = i16::from_le_bytes([REPORT_DESCRIPTOR[23], REPORT_DESCRIPTOR[24]]);
        let max = i16::from_le_bytes([REPORT_DESCRIPTOR[26], REPORT_DESCRIPTOR[27]]);
        assert_eq!(min, AXIS_LOGICAL_MIN);
        assert_eq!(max, AXIS_LOGICAL_MAX);
    }

    #[test]
    fn test_descriptor_report_shape() {
        // REPORT_SIZE (16) and REPORT_COUNT (6) must match the serialized report
        assert_eq!(&REPORT_DESCRIPTOR[28..32], &[0x75, 0x10, 0x95, 0x06]);
        assert_eq!(16 * 6 / 8, REPORT_SIZE);
    }

    #[test]
    fn test_to_bytes_order() {
        let report = GamepadReport {
            left_x: 1,
            left_y: 2,
            right_x: 3,
            right_y: 4,
            aux1: -511,
            aux2: 511,
        };
        let bytes = report.to_bytes();
        assert_eq!(
            bytes,
            [1, 0, 2, 0, 3, 0, 4, 0, 0x01, 0xFE, 0xFF, 0x01]
        );
    }

    #[test]
    fn test_get_set_roundtrip_every_axis() {
        let mut report = GamepadReport::default();
        for (i, axis) in Axis::ALL.into_iter().enumerate() {
            report.set(axis, i as i16 * 10);
        }
        for (i, axis) in Axis::ALL.into_iter().enumerate() {
            assert_eq!(report.get(axis), i as i16 * 10);
            assert_eq!(axis.index(), i);
        }
    }
}
