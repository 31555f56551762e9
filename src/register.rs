//! Register Mapping
//!
//! The board exposes one flat register space starting at offset 0. Every
//! read returns the block from register 0 onwards, so offsets below are
//! positions inside that block as much as they are bus addresses.

/// Offset 0x00 through 0x14 inclusive.
pub const REGISTER_BLOCK_LEN: usize = 0x15;

/// Length of a full diagnostic dump, reserved tail 0x15..=0x17 included.
pub const DEBUG_DUMP_LEN: usize = 0x18;

#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Register {
    /// Device identity, always `DEVICE_ID` on a genuine board.
    DEVICE_ID = 0x00,
    FIRMWARE_VERSION = 0x01,
    /// Dynamic window radiation level, 24-bit big-endian, µSv/h * 1000.
    RADIATION_LEVEL_DYNAMIC = 0x03,
    /// Fixed window radiation level, 24-bit big-endian, µSv/h * 1000.
    RADIATION_LEVEL_FIXED = 0x06,
    /// Pulses since the previous bus read, 16-bit big-endian.
    /// The board clears it on every read.
    PULSE_COUNT = 0x09,
    DEVICE_ADDRESS = 0x10,
    HV_GENERATOR_STATE = 0x11,
    /// 16-bit little-endian.
    CALIBRATION_VALUE = 0x12,
    LED_INDICATION_STATE = 0x14,
}

impl Register {
    pub fn addr(self) -> u8 {
        self as u8
    }

    /// Width of the register in bytes.
    pub fn width(self) -> usize {
        match self {
            Register::RADIATION_LEVEL_DYNAMIC | Register::RADIATION_LEVEL_FIXED => 3,
            Register::PULSE_COUNT | Register::CALIBRATION_VALUE => 2,
            _ => 1,
        }
    }

    pub(crate) fn offset(self) -> usize {
        self.addr() as usize
    }
}
