//! Frequency synthesizer registers
//!
//! This module contains registers related to carrier generation including:
//! - Synthesizer word, band select and charge pump current
//! - Intermediate frequency offsets
//! - Channel spacing and channel number
//! - VCO calibration
//! - Crystal reference and digital clock dividers

use core::convert::Infallible;

use regiface::{register, FromByteArray, ReadableRegister, ToByteArray, WritableRegister};

use crate::radio::codec::{Band, RefDiv};

/// Synthesizer word registers SYNT3..SYNT0 (address: 0x05)
///
/// Carrier frequency is `f_xo * word / (2^19 * B * D)` where B is the band
/// factor and D the reference divider.
#[register(0x05u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
pub struct Synth {
    /// PLL charge pump current, 3 bits
    pub cp_isel: u8,
    /// VCO output division
    pub band: Band,
    /// 28-bit synthesizer word
    pub word: u32,
}

impl Synth {
    /// Bits of the 28-bit synthesizer word
    pub const WORD_MASK: u32 = 0x0FFF_FFFF;
}

/// Intermediate frequency offset registers (address: 0x09)
///
/// Both bytes encode `IF = f * (256 + value) / (3 * 2^12)`, `analog` against the
/// crystal and `digital` against the digital clock.
#[register(0x09u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
pub struct IfOffset {
    /// IF_OFFSET_ANA
    pub analog: u8,
    /// IF_OFFSET_DIG
    pub digital: u8,
}

/// Channel spacing register (address: 0x0C)
///
/// Spacing in steps of `f_xo / 2^15`.
#[register(0x0Cu8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
pub struct ChannelSpace {
    pub value: u8,
}

/// Channel number register (address: 0x0D)
///
/// The carrier is offset from the base frequency by `value * spacing`.
#[register(0x0Du8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
pub struct ChannelNumber {
    pub value: u8,
}

/// SYNTH_CONFIG2 register (address: 0x65)
#[register(0x65u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
pub struct SynthConfig2 {
    /// PLL_PFD_SPLIT_EN: split the phase frequency detector
    pub pfd_split: bool,
    reserved: u8,
}

/// VCO_CONFIG register (address: 0x68)
///
/// Selects whether the VCO calibration words in VCO_CALIBR_IN* are used instead of
/// the internal calibration.
#[register(0x68u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
pub struct VcoConfig {
    /// VCO_CALAMP_EXT_SEL: use the external amplitude calibration words
    pub external_amplitude: bool,
    /// VCO_CALFREQ_EXT_SEL: use the external frequency calibration words
    pub external_frequency: bool,
    reserved: u8,
}

/// VCO_CALIBR_IN2 register (address: 0x69)
#[register(0x69u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
pub struct VcoCalibrIn2 {
    /// Amplitude calibration word for TX, 4 bits
    pub tx_amplitude: u8,
    /// Amplitude calibration word for RX, 4 bits
    pub rx_amplitude: u8,
}

/// VCO_CALIBR_IN1 register (address: 0x6A)
#[register(0x6Au8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
pub struct VcoCalibrIn1 {
    /// Frequency calibration word for TX, 7 bits
    pub tx_frequency: u8,
}

/// VCO_CALIBR_IN0 register (address: 0x6B)
#[register(0x6Bu8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
pub struct VcoCalibrIn0 {
    /// Frequency calibration word for RX, 7 bits
    pub rx_frequency: u8,
}

/// XO_RCO_CONF1 register (address: 0x6C)
///
/// # Important Notes
/// - PD_CLKDIV may only be changed while the device is in STANDBY
#[register(0x6Cu8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
pub struct XoRcoConf1 {
    /// Digital clock divider enabled (PD_CLKDIV cleared)
    pub digital_divider: bool,
    reserved: u8,
}

/// XO_RCO_CONF0 register (address: 0x6D)
#[register(0x6Du8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
pub struct XoRcoConf0 {
    /// Reference clock divider (REFDIV)
    pub ref_div: RefDiv,
    reserved: u8,
}

const SYNT3_CP_ISEL: u8 = 0xE0;
const SYNT3_BS: u8 = 0x10;
const SYNT3_WORD: u8 = 0x0F;
const PFD_SPLIT_EN: u8 = 0x04;
const CALAMP_EXT_SEL: u8 = 0x20;
const CALFREQ_EXT_SEL: u8 = 0x10;
const PD_CLKDIV: u8 = 0x10;
const REFDIV: u8 = 0x08;

impl FromByteArray for Synth {
    type Error = Infallible;
    type Array = [u8; 4];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        let band = if bytes[0] & SYNT3_BS != 0 {
            Band::Middle
        } else {
            Band::High
        };

        Ok(Self {
            cp_isel: (bytes[0] & SYNT3_CP_ISEL) >> 5,
            band,
            word: u32::from_be_bytes([bytes[0] & SYNT3_WORD, bytes[1], bytes[2], bytes[3]]),
        })
    }
}

impl ToByteArray for Synth {
    type Error = Infallible;
    type Array = [u8; 4];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        let mut bytes = (self.word & Self::WORD_MASK).to_be_bytes();
        bytes[0] |= (self.cp_isel << 5) & SYNT3_CP_ISEL;
        if self.band == Band::Middle {
            bytes[0] |= SYNT3_BS;
        }
        Ok(bytes)
    }
}

impl FromByteArray for IfOffset {
    type Error = Infallible;
    type Array = [u8; 2];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            analog: bytes[0],
            digital: bytes[1],
        })
    }
}

impl ToByteArray for IfOffset {
    type Error = Infallible;
    type Array = [u8; 2];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.analog, self.digital])
    }
}

impl FromByteArray for ChannelSpace {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self { value: bytes[0] })
    }
}

impl ToByteArray for ChannelSpace {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.value])
    }
}

impl FromByteArray for ChannelNumber {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self { value: bytes[0] })
    }
}

impl ToByteArray for ChannelNumber {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.value])
    }
}

impl FromByteArray for SynthConfig2 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            pfd_split: bytes[0] & PFD_SPLIT_EN != 0,
            reserved: bytes[0] & !PFD_SPLIT_EN,
        })
    }
}

impl ToByteArray for SynthConfig2 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        let split = if self.pfd_split { PFD_SPLIT_EN } else { 0 };
        Ok([(self.reserved & !PFD_SPLIT_EN) | split])
    }
}

impl FromByteArray for VcoConfig {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            external_amplitude: bytes[0] & CALAMP_EXT_SEL != 0,
            external_frequency: bytes[0] & CALFREQ_EXT_SEL != 0,
            reserved: bytes[0] & !(CALAMP_EXT_SEL | CALFREQ_EXT_SEL),
        })
    }
}

impl ToByteArray for VcoConfig {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        let mut byte = self.reserved & !(CALAMP_EXT_SEL | CALFREQ_EXT_SEL);
        if self.external_amplitude {
            byte |= CALAMP_EXT_SEL;
        }
        if self.external_frequency {
            byte |= CALFREQ_EXT_SEL;
        }
        Ok([byte])
    }
}

impl FromByteArray for VcoCalibrIn2 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            tx_amplitude: bytes[0] >> 4,
            rx_amplitude: bytes[0] & 0x0F,
        })
    }
}

impl ToByteArray for VcoCalibrIn2 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([(self.tx_amplitude << 4) | (self.rx_amplitude & 0x0F)])
    }
}

impl FromByteArray for VcoCalibrIn1 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            tx_frequency: bytes[0] & 0x7F,
        })
    }
}

impl ToByteArray for VcoCalibrIn1 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.tx_frequency & 0x7F])
    }
}

impl FromByteArray for VcoCalibrIn0 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            rx_frequency: bytes[0] & 0x7F,
        })
    }
}

impl ToByteArray for VcoCalibrIn0 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.rx_frequency & 0x7F])
    }
}

impl FromByteArray for XoRcoConf1 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            digital_divider: bytes[0] & PD_CLKDIV == 0,
            reserved: bytes[0] & !PD_CLKDIV,
        })
    }
}

impl ToByteArray for XoRcoConf1 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        let pd_clkdiv = if self.digital_divider { 0 } else { PD_CLKDIV };
        Ok([(self.reserved & !PD_CLKDIV) | pd_clkdiv])
    }
}

impl FromByteArray for XoRcoConf0 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            ref_div: RefDiv::from(bytes[0] & REFDIV != 0),
            reserved: bytes[0] & !REFDIV,
        })
    }
}

impl ToByteArray for XoRcoConf0 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        let refdiv = if self.ref_div == RefDiv::Div2 { REFDIV } else { 0 };
        Ok([(self.reserved & !REFDIV) | refdiv])
    }
}
