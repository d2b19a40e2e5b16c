//! Register I/O contract
//!
//! The radio API never talks to the bus directly. It consumes an [`Interface`]: the
//! ability to read and write N consecutive registers and to send command strobes.
//! [`Device`] implements it over SPI; other transports (or a register file in a
//! test) can implement it too.
//!
//! Every operation returns a [`Result`]; a failed transfer is never silently turned
//! into stale register contents.

use core::convert::Infallible;

use embedded_hal::spi::SpiDevice;
use regiface::{ByteArray, Command, ReadableRegister, WritableRegister};

use crate::registers::McState;
use crate::{Device, Error};

/// Register level access to an S2-LP
pub trait Interface {
    /// Read `data.len()` consecutive registers starting at `address`
    fn read_regs(&mut self, address: u8, data: &mut [u8]) -> Result<(), Error>;

    /// Write `data` to consecutive registers starting at `address`
    fn write_regs(&mut self, address: u8, data: &[u8]) -> Result<(), Error>;

    /// Send a command strobe
    fn send_command<C>(&mut self, command: C) -> Result<(), Error>
    where
        C: Command<IdType = u8>;

    /// Read a single register
    fn read_reg(&mut self, address: u8) -> Result<u8, Error> {
        let mut incoming = [0u8; 1];
        self.read_regs(address, &mut incoming)?;
        Ok(incoming[0])
    }

    /// Write a single register
    fn write_reg(&mut self, address: u8, value: u8) -> Result<(), Error> {
        self.write_regs(address, &[value])
    }

    /// Update the specified register with the provided value & mask
    fn update_reg(&mut self, address: u8, mask: u8, value: u8) -> Result<u8, Error> {
        let existing = self.read_reg(address)?;
        let updated = (existing & !mask) | (value & mask);
        self.write_reg(address, updated)?;
        Ok(updated)
    }

    /// Read and decode a typed register
    fn read_register<R>(&mut self) -> Result<R, Error>
    where
        R: ReadableRegister<IdType = u8>,
    {
        let mut raw = R::Array::new();
        self.read_regs(R::id(), raw.as_mut())?;
        R::from_bytes(raw).map_err(|_| Error::Deserialization)
    }

    /// Encode and write a typed register
    fn write_register<R>(&mut self, register: R) -> Result<(), Error>
    where
        R: WritableRegister<IdType = u8, Error = Infallible>,
    {
        let raw = register.to_bytes().unwrap_or_else(|e| match e {});
        self.write_regs(R::id(), raw.as_ref())
    }

    /// Read a typed register, apply `f` and write the result back
    fn modify_register<R, F>(&mut self, f: F) -> Result<R, Error>
    where
        R: ReadableRegister<IdType = u8> + WritableRegister<IdType = u8, Error = Infallible> + Copy,
        F: FnOnce(&mut R),
    {
        let mut register: R = self.read_register()?;
        f(&mut register);
        self.write_register(register)?;
        Ok(register)
    }

    /// Read the main controller state
    fn refresh_status(&mut self) -> Result<McState, Error> {
        self.read_register()
    }
}

impl<SPI> Interface for Device<SPI>
where
    SPI: SpiDevice,
{
    fn read_regs(&mut self, address: u8, data: &mut [u8]) -> Result<(), Error> {
        Ok(self.read_registers(address, data)?)
    }

    fn write_regs(&mut self, address: u8, data: &[u8]) -> Result<(), Error> {
        Ok(self.write_registers(address, data)?)
    }

    fn send_command<C>(&mut self, command: C) -> Result<(), Error>
    where
        C: Command<IdType = u8>,
    {
        Ok(Device::send_command(self, command)?)
    }
}
