#![no_std]

#[allow(unused_imports)]
#[macro_use]
extern crate alloc;

use alloc::vec::Vec;
use core::fmt;

use embedded_hal::i2c;
use log::{debug, trace, warn};


//Import the register map of the board.
mod register;
pub use crate::register::{Register, DEBUG_DUMP_LEN, REGISTER_BLOCK_LEN};

//Import the register cache and the data types built from it.
mod data;
use crate::data::RegisterCache;
pub use crate::data::{RadiationData, Readings, LEVEL_SCALE};

mod accumulator;
use crate::accumulator::PulseAccumulator;


/// RadSens factory I2C address
pub const DEFAULT_ADDRESS: u8 = 0x66; // = 102

/// Value of the device id register on every RadSens board.
pub const DEVICE_ID: u8 = 0x7D;

/// Factory calibration, pulses per µR.
pub const DEFAULT_CALIBRATION_VALUE: u16 = 105;


//Impliment Error type for our driver.
#[derive(Debug, PartialEq)]
pub enum Error<E> {
    /// The bus reported a failure. Never retried by the driver.
    I2C(E),
    /// Returned by [`RadSens::verify`] with the id the board reported.
    UnexpectedDeviceId(u8),
}

impl<E> From<E> for Error<E> {
    fn from(error: E) -> Self {
        Error::I2C(error)
    }
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::I2C(e) => write!(f, "I2C error: {:?}", e),
            Error::UnexpectedDeviceId(id) => write!(
                f,
                "Unexpected device id 0x{:02X} (expected 0x{:02X})",
                id, DEVICE_ID
            ),
        }
    }
}

#[cfg(feature = "defmt")]
impl<E: defmt::Format> defmt::Format for Error<E> {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::I2C(e) => defmt::write!(f, "I2C error: {}", e),
            Error::UnexpectedDeviceId(id) => defmt::write!(f, "Unexpected device id {=u8:#x}", id),
        }
    }
}


/// Driver for one RadSens Geiger counter board.
///
/// Every getter reads the whole register block from the board before
/// answering, so two getters mean two bus reads. Because the board clears
/// its pulse counter on each read, every one of those reads also adds to the
/// pulse count returned by [`get_pulse_count`](Self::get_pulse_count).
/// Use [`read_all`](Self::read_all) to get every field from a single read.
///
/// The driver does no locking. When the bus is shared between threads,
/// callers have to serialize access to it themselves.
pub struct RadSens<I2C>
where I2C: i2c::I2c
{
    i2c: I2C,
    address: u8,
    registers: RegisterCache,
    pulses: PulseAccumulator,
}

impl<I2C> RadSens<I2C>
where I2C: i2c::I2c
{

    /// Bind to the board at `address` and read its registers once.
    ///
    /// The pulse count starts at zero; pulses counted by the board before
    /// this call are dropped. On failure the bus is dropped along with the
    /// error.
    pub fn new(i2c: I2C, address: u8) -> Result<Self, Error<I2C::Error>> {
        let mut sensor = RadSens {
            i2c,
            address,
            registers: RegisterCache::new(),
            pulses: PulseAccumulator::new(),
        };

        sensor.refresh()?;
        sensor.reset_pulse_count();

        Ok(sensor)
    }

    pub fn with_default_address(i2c: I2C) -> Result<Self, Error<I2C::Error>> {
        Self::new(i2c, DEFAULT_ADDRESS)
    }

    /// The address this handle talks to. Not changed by
    /// [`set_device_address`](Self::set_device_address).
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Releases the underlying I2C bus and destroys the driver.
    pub fn release(self) -> I2C {
        self.i2c
    }


    /// Read the full register block and add the board's pulse counter to
    /// the running total.
    ///
    /// If the read fails the previous register values and the pulse count
    /// are kept.
    pub fn refresh(&mut self) -> Result<(), Error<I2C::Error>> {
        let mut buf = [0u8; REGISTER_BLOCK_LEN];
        self.read_block(&mut buf)?;

        self.registers = RegisterCache::from_bytes(buf);

        let delta = self.registers.pulse_delta();
        let total = self.pulses.accumulate(delta);
        trace!(
            "radsens 0x{:02X}: +{} pulses, {} total",
            self.address, delta, total
        );

        Ok(())
    }


    //Radiation data

    /// Returns `(dynamic, fixed, pulses)`, levels in µSv/h.
    pub fn get_radiation_data(&mut self) -> Result<(f64, f64, u64), Error<I2C::Error>> {
        self.refresh()?;
        Ok(self.radiation().into())
    }

    /// One full refresh per call, see [`get_radiation_data`](Self::get_radiation_data).
    pub fn get_radiation_level_dynamic(&mut self) -> Result<f64, Error<I2C::Error>> {
        let (dynamic, _, _) = self.get_radiation_data()?;
        Ok(dynamic)
    }

    /// One full refresh per call, see [`get_radiation_data`](Self::get_radiation_data).
    pub fn get_radiation_level_fixed(&mut self) -> Result<f64, Error<I2C::Error>> {
        let (_, fixed, _) = self.get_radiation_data()?;
        Ok(fixed)
    }

    /// Pulses seen since construction or the last
    /// [`reset_pulse_count`](Self::reset_pulse_count), this read included.
    pub fn get_pulse_count(&mut self) -> Result<u64, Error<I2C::Error>> {
        let (_, _, pulses) = self.get_radiation_data()?;
        Ok(pulses)
    }

    /// Zero the host side total. No bus traffic.
    pub fn reset_pulse_count(&mut self) {
        self.pulses.reset();
    }

    /// Every field from a single refresh.
    pub fn read_all(&mut self) -> Result<Readings, Error<I2C::Error>> {
        self.refresh()?;

        let r = &self.registers;
        Ok(Readings {
            radiation: self.radiation(),
            device_id: r.device_id(),
            firmware_version: r.firmware_version(),
            device_address: r.device_address(),
            hv_generator_state: r.hv_generator_state(),
            calibration_value: r.calibration_value(),
            led_indication_state: r.led_indication_state(),
        })
    }


    //Identity

    pub fn get_device_id(&mut self) -> Result<u8, Error<I2C::Error>> {
        self.refresh()?;
        Ok(self.registers.device_id())
    }

    pub fn get_firmware_version(&mut self) -> Result<u8, Error<I2C::Error>> {
        self.refresh()?;
        Ok(self.registers.firmware_version())
    }

    /// Tells a RadSens apart from other devices on the same bus.
    pub fn is_valid(&mut self) -> Result<bool, Error<I2C::Error>> {
        Ok(self.get_device_id()? == DEVICE_ID)
    }

    /// Like [`is_valid`](Self::is_valid) but a mismatch is an error.
    pub fn verify(&mut self) -> Result<(), Error<I2C::Error>> {
        match self.get_device_id()? {
            DEVICE_ID => Ok(()),
            id => Err(Error::UnexpectedDeviceId(id)),
        }
    }


    //Configuration

    pub fn get_device_address(&mut self) -> Result<u8, Error<I2C::Error>> {
        self.refresh()?;
        Ok(self.registers.device_address())
    }

    /// Store a new bus address on the board.
    ///
    /// This handle keeps using the old address. Bind a new handle to
    /// `address` to keep talking to the board.
    pub fn set_device_address(&mut self, address: u8) -> Result<(), Error<I2C::Error>> {
        self.write_register8(Register::DEVICE_ADDRESS, address)
    }

    pub fn get_high_voltage_generator_state(&mut self) -> Result<bool, Error<I2C::Error>> {
        self.refresh()?;
        Ok(self.registers.hv_generator_state())
    }

    pub fn set_high_voltage_generator_state(&mut self, enabled: bool) -> Result<(), Error<I2C::Error>> {
        self.write_register8(Register::HV_GENERATOR_STATE, enabled as u8)
    }

    pub fn get_calibration_value(&mut self) -> Result<u16, Error<I2C::Error>> {
        self.refresh()?;
        Ok(self.registers.calibration_value())
    }

    /// Written as two single byte writes, low byte first. If the second
    /// write fails the board is left holding the new low byte.
    pub fn set_calibration_value(&mut self, value: u16) -> Result<(), Error<I2C::Error>> {
        self.write_register16(Register::CALIBRATION_VALUE, value)
    }

    pub fn get_led_indication_state(&mut self) -> Result<bool, Error<I2C::Error>> {
        self.refresh()?;
        Ok(self.registers.led_indication_state())
    }

    pub fn set_led_indication_state(&mut self, enabled: bool) -> Result<(), Error<I2C::Error>> {
        self.write_register8(Register::LED_INDICATION_STATE, enabled as u8)
    }


    //Debug

    /// Raw read of `count` bytes starting at register 0.
    ///
    /// Skips the cache and the pulse total. The board still clears its
    /// pulse counter, so pulses counted before this read are lost.
    pub fn read_registers(&mut self, count: usize) -> Result<Vec<u8>, Error<I2C::Error>> {
        let mut buf = vec![0u8; count];
        self.read_block(&mut buf)?;
        Ok(buf)
    }


    fn radiation(&self) -> RadiationData {
        RadiationData {
            dynamic: self.registers.level_dynamic(),
            fixed: self.registers.level_fixed(),
            pulses: self.pulses.total(),
        }
    }

    //Bus primitives

    fn read_block(&mut self, buf: &mut [u8]) -> Result<(), Error<I2C::Error>> {
        let address = self.address;
        let len = buf.len();
        self.i2c
            .read(address, buf)
            .map_err(|e| {
                warn!("radsens 0x{:02X}: read of {} bytes failed: {:?}", address, len, e);
                Error::I2C(e)
            })
    }

    fn write_byte(&mut self, offset: u8, value: u8) -> Result<(), Error<I2C::Error>> {
        let address = self.address;
        debug!("radsens 0x{:02X}: write 0x{:02X} to 0x{:02X}", address, value, offset);
        self.i2c
            .write(address, &[offset, value])
            .map_err(|e| {
                warn!("radsens 0x{:02X}: write to 0x{:02X} failed: {:?}", address, offset, e);
                Error::I2C(e)
            })
    }

    fn write_register8(&mut self, reg: Register, value: u8) -> Result<(), Error<I2C::Error>> {
        self.write_byte(reg.addr(), value)
    }

    //Low byte at reg, then high byte at reg + 1.
    fn write_register16(&mut self, reg: Register, value: u16) -> Result<(), Error<I2C::Error>> {
        let [low, high] = value.to_le_bytes();
        self.write_byte(reg.addr(), low)?;
        self.write_byte(reg.addr() + 1, high)
    }
}




#[cfg(test)]
mod error_tests {
    use alloc::string::ToString;

    use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource, Operation};

    use super::*;

    //A bus with nothing attached.
    struct EmptyBus;

    impl i2c::ErrorType for EmptyBus {
        type Error = ErrorKind;
    }

    impl i2c::I2c for EmptyBus {
        fn transaction(
            &mut self,
            _address: u8,
            _operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address))
        }
    }

    #[test]
    fn new_propagates_bus_error()
    {
        let result = RadSens::new(EmptyBus, DEFAULT_ADDRESS);
        assert_eq!(
            result.err(),
            Some(Error::I2C(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)))
        );
    }

    #[test]
    fn from_bus_error()
    {
        let e: Error<ErrorKind> = ErrorKind::Bus.into();
        assert_eq!(e, Error::I2C(ErrorKind::Bus));
    }

    #[test]
    fn display()
    {
        let e: Error<ErrorKind> = Error::I2C(ErrorKind::Other);
        assert_eq!(e.to_string(), "I2C error: Other");

        let e: Error<ErrorKind> = Error::UnexpectedDeviceId(0x38);
        assert_eq!(e.to_string(), "Unexpected device id 0x38 (expected 0x7D)");
    }
}
