#![cfg_attr(not(test), no_std)]
//! S2-LP Radio Driver
//!
//! This crate provides a type-safe interface for the ST S2-LP sub-GHz radio transceiver.
//! The S2-LP is a low power transceiver for the 430-470 MHz and 860-940 MHz ISM bands,
//! configured entirely through a flat register map.
//!
//! # Features
//! - Carrier frequency: 430-470 MHz (middle band), 860-940 MHz (high band)
//! - Modulation: 2(G)FSK, 4(G)FSK, ASK/OOK, polar and CW
//! - Datarate: 100 bps up to 250 kbps (referenced to a 26 MHz crystal)
//! - Channel filter: 1.1 kHz to 800.1 kHz in 90 discrete steps
//! - Output power: -31 to +14 dBm in 0.5 dB steps, 8 PA levels
//!
//! # Architecture
//! The driver is organized into several modules:
//!
//! - [`device`]: SPI framing for the S2-LP
//!   - Register reads/writes and command strobes over an `embedded-hal` `SpiDevice`
//!
//! - [`interface`]: The register I/O contract consumed by the radio API
//!   - Implemented by [`Device`], and by anything else able to move register bytes
//!
//! - [`registers`]: Register definitions for direct hardware access
//!   - [`registers::synth`]: Synthesizer, IF, channel, VCO and clock divider registers
//!   - [`registers::modem`]: Datarate, deviation, channel filter, AFC and clock recovery
//!   - [`registers::pa`]: Power amplifier registers
//!   - [`registers::status`]: Main controller state
//!
//! - [`radio`]: RF front end configuration
//!   - [`radio::codec`]: Conversion between physical units and register encodings
//!   - [`Radio`]: Initialization and per-parameter setters/getters
//!
//! # Usage
//! Register access goes through the `regiface` crate, so every register is a
//! plain struct that is encoded and decoded as a whole. All conversions are relative
//! to the crystal frequency stored in [`radio::Config`], which must match the
//! hardware before any other configuration.
//!
//! # Example
//! ```no_run
//! use embedded_hal::{delay::DelayNs, spi::SpiDevice};
//! use s2lp::{radio::{Config, Modulation, RadioInit}, Device, Error, Radio};
//!
//! fn configure_radio<SPI: SpiDevice, D: DelayNs>(spi: SPI, delay: D) -> Result<(), Error> {
//!     let mut radio = Radio::new(Device::new(spi), delay, Config::default());
//!
//!     radio.initialize(&RadioInit {
//!         frequency_base: 868_000_000,
//!         modulation: Modulation::Fsk2,
//!         datarate: 38_400,
//!         freq_deviation: 20_000,
//!         bandwidth: 100_000,
//!     })?;
//!     radio.set_pa_level_dbm(7, 12)?;
//!
//!     Ok(())
//! }
//! ```

use regiface::errors;

pub mod commands;
pub mod device;
pub mod interface;
pub mod radio;
pub mod registers;

#[cfg(test)]
mod mock;

pub use device::Device;
pub use interface::Interface;
pub use radio::Radio;

/// Driver error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// SPI communication failed
    Bus,
    /// A register held a value that does not decode
    Deserialization,
    /// The device did not reach the requested state within the polling budget
    HardwareTimeout,
    /// A parameter addresses something the hardware does not have
    InvalidParameter,
}

impl From<errors::Error> for Error {
    fn from(e: errors::Error) -> Self {
        match e {
            errors::Error::BusError => Error::Bus,
            _ => Error::Deserialization,
        }
    }
}
