//! Main controller status registers

use core::convert::Infallible;

use bitflags::bitflags;
use regiface::{register, FromByteArray, ReadableRegister};

bitflags! {
    /// MC_STATE1 flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StatusFlags: u8 {
        /// RCO calibration completed successfully
        const RCO_CAL_OK = 0x10;
        /// Currently selected antenna
        const ANT_SEL = 0x08;
        /// TX FIFO is full
        const TX_FIFO_FULL = 0x04;
        /// RX FIFO is empty
        const RX_FIFO_EMPTY = 0x02;
        /// RCO calibrator error
        const ERROR_LOCK = 0x01;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for StatusFlags {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "StatusFlags({=u8:#04x})", self.bits())
    }
}

/// Main controller state (MC_STATE0.STATE)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    Ready,
    Sleep,
    Standby,
    SleepNoFifo,
    Lock,
    Rx,
    SynthSetup,
    Tx,
    /// A transitional or undocumented state code
    Unknown(u8),
}

impl State {
    /// Decode the 7-bit MC_STATE0 state field
    pub fn from_code(code: u8) -> Self {
        match code {
            0x00 => Self::Ready,
            0x01 => Self::Sleep,
            0x02 => Self::Standby,
            0x03 => Self::SleepNoFifo,
            0x0C => Self::Lock,
            0x30 => Self::Rx,
            0x50 => Self::SynthSetup,
            0x5C => Self::Tx,
            other => Self::Unknown(other),
        }
    }

    /// 7-bit MC_STATE0 state field
    pub fn code(self) -> u8 {
        match self {
            Self::Ready => 0x00,
            Self::Sleep => 0x01,
            Self::Standby => 0x02,
            Self::SleepNoFifo => 0x03,
            Self::Lock => 0x0C,
            Self::Rx => 0x30,
            Self::SynthSetup => 0x50,
            Self::Tx => 0x5C,
            Self::Unknown(code) => code,
        }
    }
}

/// Main controller status MC_STATE1, MC_STATE0 (address: 0x8D)
///
/// Read only. Polled while waiting for a command strobe to take effect.
#[register(0x8Du8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct McState {
    pub flags: StatusFlags,
    pub state: State,
    /// Crystal oscillator is running
    pub xo_on: bool,
}

impl FromByteArray for McState {
    type Error = Infallible;
    type Array = [u8; 2];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            flags: StatusFlags::from_bits_retain(bytes[0]),
            state: State::from_code((bytes[1] >> 1) & 0x7F),
            xo_on: bytes[1] & 0x01 != 0,
        })
    }
}
