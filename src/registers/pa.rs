//! Power amplifier registers
//!
//! PA_POWER8..PA_POWER1 hold eight output levels (0x5A..0x61, level 7 first), PA_POWER0
//! selects which one is used and how ramping between them happens. PA_CONFIG1 and
//! PA_CONFIG0 follow at 0x63 and 0x64.

use core::convert::Infallible;

use regiface::{register, FromByteArray, ReadableRegister, ToByteArray, WritableRegister};

/// Address of PA_POWER8, which holds level 7
pub const PA_POWER8_ADDRESS: u8 = 0x5A;

/// Highest PA level index
pub const MAX_PA_LEVEL_INDEX: u8 = 7;

/// Register address holding PA level `index`, or `None` past the last level
pub const fn pa_level_address(index: u8) -> Option<u8> {
    if index > MAX_PA_LEVEL_INDEX {
        return None;
    }
    Some(PA_POWER8_ADDRESS + MAX_PA_LEVEL_INDEX - index)
}

/// PA_POWER0 register (address: 0x62)
#[register(0x62u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
pub struct PaPower0 {
    /// DIG_SMOOTH_EN: digital smoothing for ASK/OOK
    pub dig_smooth: bool,
    /// PA_MAXDBM: drive the PA at its maximum output
    pub max_dbm: bool,
    /// PA_RAMP_EN: step through the levels up to `level_max_index`
    pub ramp_enabled: bool,
    /// PA_RAMP_STEP_LEN, 2 bits
    pub ramp_step_len: u8,
    /// PA_LEVEL_MAX_INDEX, 3 bits
    pub level_max_index: u8,
}

/// PA_CONFIG0.PA_FC Bessel filter cutoff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BesselFilter {
    /// 12.5 kHz, datarates below 16 kbps
    Khz12_5,
    /// 25 kHz, datarates below 32 kbps
    Khz25,
    /// 50 kHz, datarates below 62.5 kbps
    Khz50,
    /// 100 kHz
    Khz100,
}

impl BesselFilter {
    /// Cutoff suited to `datarate` bps
    pub fn for_datarate(datarate: u32) -> Self {
        match datarate {
            0..=15_999 => Self::Khz12_5,
            16_000..=31_999 => Self::Khz25,
            32_000..=62_499 => Self::Khz50,
            _ => Self::Khz100,
        }
    }

    fn to_bits(self) -> u8 {
        match self {
            Self::Khz12_5 => 0x00,
            Self::Khz25 => 0x01,
            Self::Khz50 => 0x02,
            Self::Khz100 => 0x03,
        }
    }

    fn from_bits(bits: u8) -> Self {
        match bits & PA_FC {
            0x00 => Self::Khz12_5,
            0x01 => Self::Khz25,
            0x02 => Self::Khz50,
            _ => Self::Khz100,
        }
    }
}

/// PA control block PA_POWER0, PA_CONFIG1, PA_CONFIG0 (address: 0x62)
#[register(0x62u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
pub struct PaControl {
    pub power: PaPower0,
    /// PA_CONFIG1.FIR_EN: FIR filter shaping the ASK/OOK envelope
    pub fir_enabled: bool,
    pub bessel_filter: BesselFilter,
    config1: u8,
    config0: u8,
}

/// PA ramping control PA_POWER0, PA_CONFIG1 (address: 0x62)
#[register(0x62u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
pub struct PaRamping {
    pub power: PaPower0,
    /// PA_CONFIG1.FIR_EN
    pub fir_enabled: bool,
    config1: u8,
}

const DIG_SMOOTH_EN: u8 = 0x80;
const PA_MAXDBM: u8 = 0x40;
const PA_RAMP_EN: u8 = 0x20;
const PA_RAMP_STEP_LEN: u8 = 0x18;
const PA_LEVEL_MAX_INDEX: u8 = 0x07;
const FIR_EN: u8 = 0x02;
const PA_FC: u8 = 0x03;

impl PaPower0 {
    fn from_byte(byte: u8) -> Self {
        Self {
            dig_smooth: byte & DIG_SMOOTH_EN != 0,
            max_dbm: byte & PA_MAXDBM != 0,
            ramp_enabled: byte & PA_RAMP_EN != 0,
            ramp_step_len: (byte & PA_RAMP_STEP_LEN) >> 3,
            level_max_index: byte & PA_LEVEL_MAX_INDEX,
        }
    }

    fn to_byte(self) -> u8 {
        let mut byte = ((self.ramp_step_len << 3) & PA_RAMP_STEP_LEN)
            | (self.level_max_index & PA_LEVEL_MAX_INDEX);
        if self.dig_smooth {
            byte |= DIG_SMOOTH_EN;
        }
        if self.max_dbm {
            byte |= PA_MAXDBM;
        }
        if self.ramp_enabled {
            byte |= PA_RAMP_EN;
        }
        byte
    }
}

fn with_fir(config1: u8, enabled: bool) -> u8 {
    if enabled {
        config1 | FIR_EN
    } else {
        config1 & !FIR_EN
    }
}

impl FromByteArray for PaPower0 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self::from_byte(bytes[0]))
    }
}

impl ToByteArray for PaPower0 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.to_byte()])
    }
}

impl FromByteArray for PaControl {
    type Error = Infallible;
    type Array = [u8; 3];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            power: PaPower0::from_byte(bytes[0]),
            fir_enabled: bytes[1] & FIR_EN != 0,
            bessel_filter: BesselFilter::from_bits(bytes[2]),
            config1: bytes[1],
            config0: bytes[2],
        })
    }
}

impl ToByteArray for PaControl {
    type Error = Infallible;
    type Array = [u8; 3];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([
            self.power.to_byte(),
            with_fir(self.config1, self.fir_enabled),
            (self.config0 & !PA_FC) | self.bessel_filter.to_bits(),
        ])
    }
}

impl FromByteArray for PaRamping {
    type Error = Infallible;
    type Array = [u8; 2];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            power: PaPower0::from_byte(bytes[0]),
            fir_enabled: bytes[1] & FIR_EN != 0,
            config1: bytes[1],
        })
    }
}

impl ToByteArray for PaRamping {
    type Error = Infallible;
    type Array = [u8; 2];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.power.to_byte(), with_fir(self.config1, self.fir_enabled)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_addresses_run_backwards() {
        assert_eq!(pa_level_address(7), Some(0x5A));
        assert_eq!(pa_level_address(0), Some(0x61));
        assert_eq!(pa_level_address(8), None);
    }

    #[test]
    fn power0_fields() {
        let power = PaPower0::from_bytes([0xFF]).unwrap();
        assert!(power.dig_smooth && power.max_dbm && power.ramp_enabled);
        assert_eq!((power.ramp_step_len, power.level_max_index), (3, 7));
        assert_eq!(power.to_bytes().unwrap(), [0xFF]);

        let power = PaPower0 {
            max_dbm: false,
            level_max_index: 2,
            ..power
        };
        assert_eq!(power.to_bytes().unwrap(), [0xBA]);
    }

    #[test]
    fn control_block_preserves_other_config_bits() {
        let mut control = PaControl::from_bytes([0x01, 0x41, 0xD6]).unwrap();
        assert!(!control.fir_enabled);
        assert_eq!(control.bessel_filter, BesselFilter::Khz50);

        control.power.dig_smooth = true;
        control.fir_enabled = true;
        control.bessel_filter = BesselFilter::Khz25;
        assert_eq!(control.to_bytes().unwrap(), [0x81, 0x43, 0xD5]);
    }

    #[test]
    fn bessel_filter_thresholds() {
        assert_eq!(BesselFilter::for_datarate(15_999), BesselFilter::Khz12_5);
        assert_eq!(BesselFilter::for_datarate(16_000), BesselFilter::Khz25);
        assert_eq!(BesselFilter::for_datarate(38_400), BesselFilter::Khz50);
        assert_eq!(BesselFilter::for_datarate(62_500), BesselFilter::Khz100);
    }
}
