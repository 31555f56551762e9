/*
 * Filename: data.rs
 * Description: modules for holding data from the sensor.
 */

use crate::register::{Register, REGISTER_BLOCK_LEN};

/// Raw radiation levels are reported in thousandths of a µSv/h.
pub const LEVEL_SCALE: f64 = 1000.0;


/// Snapshot of the register block as returned by the last bus read.
///
/// Nothing here talks to the bus; the driver replaces the whole snapshot
/// after a successful read and never patches it in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RegisterCache {
    bytes: [u8; REGISTER_BLOCK_LEN],
}

impl RegisterCache {
    pub fn new() -> Self {
        RegisterCache { bytes: [0u8; REGISTER_BLOCK_LEN] }
    }

    pub fn from_bytes(bytes: [u8; REGISTER_BLOCK_LEN]) -> Self {
        RegisterCache { bytes }
    }

    pub fn decode_u8(&self, offset: usize) -> u8 {
        self.bytes[offset]
    }

    /// Low byte at the lower offset.
    pub fn decode_u16_le(&self, offset: usize) -> u16 {
        u16::from_le_bytes([self.bytes[offset], self.bytes[offset + 1]])
    }

    /// High byte at the lower offset.
    pub fn decode_u16_be(&self, offset: usize) -> u16 {
        u16::from_be_bytes([self.bytes[offset], self.bytes[offset + 1]])
    }

    pub fn decode_u24_be(&self, offset: usize) -> u32 {
        u32::from_be_bytes([
            0,
            self.bytes[offset],
            self.bytes[offset + 1],
            self.bytes[offset + 2],
        ])
    }

    pub fn device_id(&self) -> u8 {
        self.decode_u8(Register::DEVICE_ID.offset())
    }

    pub fn firmware_version(&self) -> u8 {
        self.decode_u8(Register::FIRMWARE_VERSION.offset())
    }

    pub fn level_dynamic(&self) -> f64 {
        self.decode_u24_be(Register::RADIATION_LEVEL_DYNAMIC.offset()) as f64 / LEVEL_SCALE
    }

    pub fn level_fixed(&self) -> f64 {
        self.decode_u24_be(Register::RADIATION_LEVEL_FIXED.offset()) as f64 / LEVEL_SCALE
    }

    /// Pulses counted since the previous read, not a running total.
    pub fn pulse_delta(&self) -> u16 {
        self.decode_u16_be(Register::PULSE_COUNT.offset())
    }

    pub fn device_address(&self) -> u8 {
        self.decode_u8(Register::DEVICE_ADDRESS.offset())
    }

    pub fn hv_generator_state(&self) -> bool {
        self.decode_u8(Register::HV_GENERATOR_STATE.offset()) != 0
    }

    pub fn calibration_value(&self) -> u16 {
        self.decode_u16_le(Register::CALIBRATION_VALUE.offset())
    }

    pub fn led_indication_state(&self) -> bool {
        self.decode_u8(Register::LED_INDICATION_STATE.offset()) != 0
    }
}


/// Radiation levels in µSv/h plus the accumulated pulse count.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RadiationData {
    pub dynamic: f64,
    pub fixed: f64,
    pub pulses: u64,
}

impl From<RadiationData> for (f64, f64, u64) {
    fn from(data: RadiationData) -> Self {
        (data.dynamic, data.fixed, data.pulses)
    }
}


/// Every decoded field taken from a single register block read.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Readings {
    pub radiation: RadiationData,
    pub device_id: u8,
    pub firmware_version: u8,
    pub device_address: u8,
    pub hv_generator_state: bool,
    pub calibration_value: u16,
    pub led_indication_state: bool,
}
