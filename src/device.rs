//! S2-LP SPI Device Interface
//!
//! This module provides the bus level interface to the S2-LP. Every SPI transaction
//! starts with a two byte header:
//! - `0x00 addr` followed by the bytes to write from `addr` upwards
//! - `0x01 addr` followed by the bytes to read from `addr` upwards
//! - `0x80 cmd` to issue a command strobe
//!
//! The `Device<SPI>` struct wraps an SPI interface and provides methods for:
//! - Reading and writing typed registers
//! - Reading and writing raw register ranges
//! - Sending command strobes
//!
//! # Example
//! ```no_run
//! use s2lp::{Device, registers::ChannelNumber};
//!
//! # fn example<SPI: embedded_hal::spi::SpiDevice>(spi: SPI) -> Result<(), regiface::errors::Error> {
//! let mut device = Device::new(spi);
//!
//! // Read a register
//! let channel: ChannelNumber = device.read_register()?;
//!
//! // Write a raw register range
//! device.write_registers(0x0D, &[channel.value + 1])?;
//! # Ok(())
//! # }
//! ```

use core::convert::Infallible;

use embedded_hal::spi::{Operation, SpiDevice};
use regiface::{
    errors::Error as RegifaceError, ByteArray, Command, ReadableRegister, WritableRegister,
};

const WRITE_HEADER: u8 = 0x00;
const READ_HEADER: u8 = 0x01;
const COMMAND_HEADER: u8 = 0x80;

/// Main device interface for the S2-LP radio.
///
/// This struct wraps an SPI interface and provides methods to interact with the radio.
pub struct Device<SPI> {
    spi: SPI,
}

impl<SPI> Device<SPI> {
    /// Creates a new Device instance wrapping the provided SPI interface.
    ///
    /// # Arguments
    /// * `spi` - An SPI interface implementing the required embedded-hal traits
    pub fn new(spi: SPI) -> Self {
        Self { spi }
    }

    /// Releases the underlying SPI device.
    ///
    /// This method consumes the Device instance and returns the wrapped SPI interface.
    pub fn release(self) -> SPI {
        self.spi
    }
}

impl<SPI> Device<SPI>
where
    SPI: SpiDevice,
{
    /// Reads a register value from the device.
    ///
    /// # Type Parameters
    /// * `R` - Register type implementing ReadableRegister with u8 ID
    ///
    /// # Errors
    /// * `RegifaceError::BusError` - SPI communication failed
    /// * `RegifaceError::DeserializationError` - Failed to parse register value
    pub fn read_register<R>(&mut self) -> Result<R, RegifaceError>
    where
        R: ReadableRegister<IdType = u8>,
    {
        let mut raw_value = R::Array::new();

        self.read_registers(R::id(), raw_value.as_mut())?;

        R::from_bytes(raw_value).map_err(|_| RegifaceError::DeserializationError)
    }

    /// Writes a value to a device register.
    ///
    /// # Errors
    /// * `RegifaceError::BusError` - SPI communication failed
    pub fn write_register<R>(&mut self, register: R) -> Result<(), RegifaceError>
    where
        R: WritableRegister<IdType = u8, Error = Infallible>,
    {
        let raw_value = register.to_bytes().unwrap_or_else(|e| match e {});

        self.write_registers(R::id(), raw_value.as_ref())
    }

    /// Reads consecutive registers starting at `address`.
    ///
    /// The S2-LP auto-increments the address, so `bytes.len()` registers are read.
    ///
    /// # Errors
    /// * `RegifaceError::BusError` - SPI communication failed
    pub fn read_registers(&mut self, address: u8, bytes: &mut [u8]) -> Result<(), RegifaceError> {
        let header = [READ_HEADER, address];

        self.spi
            .transaction(&mut [Operation::Write(&header), Operation::Read(bytes)])
            .map_err(|_| RegifaceError::BusError)
    }

    /// Writes consecutive registers starting at `address`.
    ///
    /// # Errors
    /// * `RegifaceError::BusError` - SPI communication failed
    pub fn write_registers(&mut self, address: u8, bytes: &[u8]) -> Result<(), RegifaceError> {
        let header = [WRITE_HEADER, address];

        self.spi
            .transaction(&mut [Operation::Write(&header), Operation::Write(bytes)])
            .map_err(|_| RegifaceError::BusError)
    }

    /// Sends a command strobe to the device.
    ///
    /// S2-LP commands carry no parameters and return nothing; the state change they
    /// trigger is observed through the MC_STATE registers.
    ///
    /// # Errors
    /// * `RegifaceError::BusError` - SPI communication failed
    pub fn send_command<C>(&mut self, _command: C) -> Result<(), RegifaceError>
    where
        C: Command<IdType = u8>,
    {
        let header = [COMMAND_HEADER, C::id()];

        self.spi
            .transaction(&mut [Operation::Write(&header)])
            .map_err(|_| RegifaceError::BusError)
    }
}
