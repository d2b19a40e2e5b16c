//! Modem registers
//!
//! This module contains registers related to modulation and demodulation including:
//! - Modulation type and datarate
//! - Frequency deviation
//! - Channel filter bandwidth
//! - Automatic frequency correction
//! - ISI equalization
//! - Symbol clock recovery
//!
//! MOD4..MOD0 and CHFLT are contiguous (0x0E..0x13) and are also exposed as a single
//! [`Modem`] block so the full modem configuration can be written in one transfer.

use core::convert::Infallible;

use regiface::{register, FromByteArray, ReadableRegister, ToByteArray, WritableRegister};

use crate::radio::codec::{ChannelBwCode, DatarateCode, FreqDevCode};

/// Error type for modulation decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidModulation(pub u8);

/// Error type for channel filter decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidChannelFilter(pub u8);

/// Error type for decoding the full modem block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InvalidModem {
    Modulation(InvalidModulation),
    ChannelFilter(InvalidChannelFilter),
}

impl From<InvalidModulation> for InvalidModem {
    fn from(err: InvalidModulation) -> Self {
        Self::Modulation(err)
    }
}

impl From<InvalidChannelFilter> for InvalidModem {
    fn from(err: InvalidChannelFilter) -> Self {
        Self::ChannelFilter(err)
    }
}

/// Modulation scheme (MOD2.MOD_TYPE)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Modulation {
    /// CW, unmodulated carrier
    NoModulation,
    /// 2-FSK
    Fsk2,
    /// 4-FSK
    Fsk4,
    /// 2-GFSK, BT = 0.5
    Gfsk2Bt05,
    /// 2-GFSK, BT = 1
    Gfsk2Bt1,
    /// 4-GFSK, BT = 0.5
    Gfsk4Bt05,
    /// 4-GFSK, BT = 1
    Gfsk4Bt1,
    /// ASK/OOK
    AskOok,
    /// Polar mode
    Polar,
}

impl Modulation {
    const MASK: u8 = 0xF0;

    /// Decode the MOD_TYPE nibble of a MOD2 byte
    pub fn from_byte(value: u8) -> Result<Self, InvalidModulation> {
        match value & Self::MASK {
            0x70 => Ok(Self::NoModulation),
            0x00 => Ok(Self::Fsk2),
            0x10 => Ok(Self::Fsk4),
            0xA0 => Ok(Self::Gfsk2Bt05),
            0x20 => Ok(Self::Gfsk2Bt1),
            0xB0 => Ok(Self::Gfsk4Bt05),
            0x30 => Ok(Self::Gfsk4Bt1),
            0x50 => Ok(Self::AskOok),
            0x60 => Ok(Self::Polar),
            invalid => Err(InvalidModulation(invalid)),
        }
    }

    /// MOD_TYPE positioned in the upper nibble of MOD2
    pub fn to_byte(self) -> u8 {
        match self {
            Self::NoModulation => 0x70,
            Self::Fsk2 => 0x00,
            Self::Fsk4 => 0x10,
            Self::Gfsk2Bt05 => 0xA0,
            Self::Gfsk2Bt1 => 0x20,
            Self::Gfsk4Bt05 => 0xB0,
            Self::Gfsk4Bt1 => 0x30,
            Self::AskOok => 0x50,
            Self::Polar => 0x60,
        }
    }
}

/// Datarate registers MOD4, MOD3, MOD2 (address: 0x0E)
///
/// The modulation nibble of MOD2 is carried through untouched.
#[register(0x0Eu8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
pub struct Datarate {
    pub code: DatarateCode,
    mod_type: u8,
}

impl Datarate {
    /// Replace the datarate code, keeping the modulation bits read from the device
    pub fn with_code(self, code: DatarateCode) -> Self {
        Self { code, ..self }
    }
}

/// MOD2 register (address: 0x10)
#[register(0x10u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
pub struct Mod2 {
    pub modulation: Modulation,
    /// DATARATE_E, 4 bits
    pub datarate_exponent: u8,
}

/// Frequency deviation registers MOD1, MOD0 (address: 0x11)
#[register(0x11u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
pub struct FrequencyDeviation {
    pub code: FreqDevCode,
    /// PA_INTERP_EN, MOD_INTERP_EN and CONST_MAP
    reserved: u8,
}

impl FrequencyDeviation {
    /// Replace the deviation code, keeping the upper bits of MOD1 read from the device
    pub fn with_code(self, code: FreqDevCode) -> Self {
        Self { code, ..self }
    }
}

/// Channel filter register CHFLT (address: 0x13)
#[register(0x13u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
pub struct ChannelFilter {
    pub code: ChannelBwCode,
}

/// Modem block MOD4..CHFLT (address: 0x0E)
///
/// Covers datarate, modulation, frequency deviation and channel filter.
///
/// # Important Notes
/// - The upper nibble of MOD1 is not a modem parameter; it is preserved from the
///   value read when the block was decoded (zero for [`Modem::new`])
#[register(0x0Eu8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
pub struct Modem {
    pub datarate: DatarateCode,
    pub modulation: Modulation,
    pub freq_deviation: FreqDevCode,
    pub channel_filter: ChannelBwCode,
    mod1_upper: u8,
}

impl Modem {
    /// Modem block for the given datarate, deviation and filter codes
    pub fn new(
        modulation: Modulation,
        datarate: DatarateCode,
        freq_deviation: FreqDevCode,
        channel_filter: ChannelBwCode,
    ) -> Self {
        Self {
            datarate,
            modulation,
            freq_deviation,
            channel_filter,
            mod1_upper: 0,
        }
    }

    /// Keep the upper MOD1 bits read from the device
    pub fn preserving_mod1(self, existing: FrequencyDeviation) -> Self {
        Self {
            mod1_upper: existing.reserved,
            ..self
        }
    }
}

/// AFC mode (AFC2.AFC_MODE)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AfcMode {
    /// Loop closed on the slicer
    Slicer,
    /// Loop closed on the second conversion stage
    SecondConversionStage,
}

/// AFC registers AFC2, AFC1, AFC0 (address: 0x14)
#[register(0x14u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
pub struct Afc {
    /// Freeze the correction when the sync word is detected
    pub freeze_on_sync: bool,
    pub enabled: bool,
    pub mode: AfcMode,
    /// Duration of the fast loop in samples
    pub fast_period: u8,
    /// Fast loop gain, 4 bits
    pub fast_gain: u8,
    /// Slow loop gain, 4 bits
    pub slow_gain: u8,
    reserved: u8,
}

/// ISI equalizer mode (ANT_SELECT_CONF.EQU_CTRL)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IsiEqualization {
    Disabled,
    /// Dynamic mode, 6 dB above threshold
    SinglePass,
    /// Dynamic mode, 18 dB above threshold
    DualPass,
}

/// ANT_SELECT_CONF register (address: 0x1F)
#[register(0x1Fu8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
pub struct AntSelectConf {
    pub equalization: IsiEqualization,
    reserved: u8,
}

/// Symbol clock recovery algorithm (CLOCKREC2.CLK_REC_ALGO_SEL)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockRecoveryMode {
    Dll,
    Pll,
}

/// Symbol clock recovery registers CLOCKREC2, CLOCKREC1 (address: 0x20)
///
/// CLOCKREC2 holds the slow stage and the algorithm, CLOCKREC1 the fast stage and
/// the post filter length.
#[register(0x20u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
pub struct ClockRecovery {
    pub mode: ClockRecoveryMode,
    /// Proportional gain for the slow stage, 3 bits
    pub p_gain_slow: u8,
    /// Integral gain for the slow stage, 4 bits
    pub i_gain_slow: u8,
    /// Proportional gain for the fast stage, 3 bits
    pub p_gain_fast: u8,
    /// Integral gain for the fast stage, 4 bits
    pub i_gain_fast: u8,
    /// Post filter of 16 symbols instead of 8
    pub post_filter_16_symbols: bool,
}

const DATARATE_E: u8 = 0x0F;
const FDEV_E: u8 = 0x0F;
const AFC_FREEZE_ON_SYNC: u8 = 0x80;
const AFC_ENABLED: u8 = 0x40;
const AFC_MODE: u8 = 0x20;
const EQU_CTRL: u8 = 0x60;
const CLK_REC_ALGO_SEL: u8 = 0x10;
const PSTFLT_LEN: u8 = 0x10;

fn decode_channel_filter(byte: u8) -> Result<ChannelBwCode, InvalidChannelFilter> {
    ChannelBwCode::new(byte >> 4, byte & 0x0F).ok_or(InvalidChannelFilter(byte))
}

fn encode_channel_filter(code: ChannelBwCode) -> u8 {
    (code.mantissa() << 4) | code.exponent()
}

impl FromByteArray for Datarate {
    type Error = Infallible;
    type Array = [u8; 3];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            code: DatarateCode::from_fields(
                u16::from_be_bytes([bytes[0], bytes[1]]),
                bytes[2] & DATARATE_E,
            ),
            mod_type: bytes[2] & !DATARATE_E,
        })
    }
}

impl ToByteArray for Datarate {
    type Error = Infallible;
    type Array = [u8; 3];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        let [high, low] = self.code.mantissa().to_be_bytes();
        Ok([high, low, (self.mod_type & !DATARATE_E) | self.code.exponent()])
    }
}

impl FromByteArray for Mod2 {
    type Error = InvalidModulation;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            modulation: Modulation::from_byte(bytes[0])?,
            datarate_exponent: bytes[0] & DATARATE_E,
        })
    }
}

impl ToByteArray for Mod2 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.modulation.to_byte() | (self.datarate_exponent & DATARATE_E)])
    }
}

impl FromByteArray for FrequencyDeviation {
    type Error = Infallible;
    type Array = [u8; 2];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            code: FreqDevCode::from_fields(bytes[1], bytes[0] & FDEV_E),
            reserved: bytes[0] & !FDEV_E,
        })
    }
}

impl ToByteArray for FrequencyDeviation {
    type Error = Infallible;
    type Array = [u8; 2];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([
            (self.reserved & !FDEV_E) | self.code.exponent(),
            self.code.mantissa(),
        ])
    }
}

impl FromByteArray for ChannelFilter {
    type Error = InvalidChannelFilter;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            code: decode_channel_filter(bytes[0])?,
        })
    }
}

impl ToByteArray for ChannelFilter {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([encode_channel_filter(self.code)])
    }
}

impl FromByteArray for Modem {
    type Error = InvalidModem;
    type Array = [u8; 6];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            datarate: DatarateCode::from_fields(
                u16::from_be_bytes([bytes[0], bytes[1]]),
                bytes[2] & DATARATE_E,
            ),
            modulation: Modulation::from_byte(bytes[2])?,
            freq_deviation: FreqDevCode::from_fields(bytes[4], bytes[3] & FDEV_E),
            channel_filter: decode_channel_filter(bytes[5])?,
            mod1_upper: bytes[3] & !FDEV_E,
        })
    }
}

impl ToByteArray for Modem {
    type Error = Infallible;
    type Array = [u8; 6];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        let [high, low] = self.datarate.mantissa().to_be_bytes();
        Ok([
            high,
            low,
            self.modulation.to_byte() | self.datarate.exponent(),
            (self.mod1_upper & !FDEV_E) | self.freq_deviation.exponent(),
            self.freq_deviation.mantissa(),
            encode_channel_filter(self.channel_filter),
        ])
    }
}

impl FromByteArray for Afc {
    type Error = Infallible;
    type Array = [u8; 3];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        let mode = if bytes[0] & AFC_MODE != 0 {
            AfcMode::SecondConversionStage
        } else {
            AfcMode::Slicer
        };

        Ok(Self {
            freeze_on_sync: bytes[0] & AFC_FREEZE_ON_SYNC != 0,
            enabled: bytes[0] & AFC_ENABLED != 0,
            mode,
            fast_period: bytes[1],
            fast_gain: bytes[2] >> 4,
            slow_gain: bytes[2] & 0x0F,
            reserved: bytes[0] & !(AFC_FREEZE_ON_SYNC | AFC_ENABLED | AFC_MODE),
        })
    }
}

impl ToByteArray for Afc {
    type Error = Infallible;
    type Array = [u8; 3];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        let mut afc2 = self.reserved & !(AFC_FREEZE_ON_SYNC | AFC_ENABLED | AFC_MODE);
        if self.freeze_on_sync {
            afc2 |= AFC_FREEZE_ON_SYNC;
        }
        if self.enabled {
            afc2 |= AFC_ENABLED;
        }
        if self.mode == AfcMode::SecondConversionStage {
            afc2 |= AFC_MODE;
        }

        Ok([
            afc2,
            self.fast_period,
            (self.fast_gain << 4) | (self.slow_gain & 0x0F),
        ])
    }
}

impl FromByteArray for AntSelectConf {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        // 0b11 is undocumented; the equalizer treats it as dual pass
        let equalization = match (bytes[0] & EQU_CTRL) >> 5 {
            0 => IsiEqualization::Disabled,
            1 => IsiEqualization::SinglePass,
            _ => IsiEqualization::DualPass,
        };

        Ok(Self {
            equalization,
            reserved: bytes[0] & !EQU_CTRL,
        })
    }
}

impl ToByteArray for AntSelectConf {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        let equ_ctrl = match self.equalization {
            IsiEqualization::Disabled => 0,
            IsiEqualization::SinglePass => 1,
            IsiEqualization::DualPass => 2,
        };
        Ok([(self.reserved & !EQU_CTRL) | (equ_ctrl << 5)])
    }
}

impl FromByteArray for ClockRecovery {
    type Error = Infallible;
    type Array = [u8; 2];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        let mode = if bytes[0] & CLK_REC_ALGO_SEL != 0 {
            ClockRecoveryMode::Pll
        } else {
            ClockRecoveryMode::Dll
        };

        Ok(Self {
            mode,
            p_gain_slow: bytes[0] >> 5,
            i_gain_slow: bytes[0] & 0x0F,
            p_gain_fast: bytes[1] >> 5,
            i_gain_fast: bytes[1] & 0x0F,
            post_filter_16_symbols: bytes[1] & PSTFLT_LEN != 0,
        })
    }
}

impl ToByteArray for ClockRecovery {
    type Error = Infallible;
    type Array = [u8; 2];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        let mut slow = (self.p_gain_slow << 5) | (self.i_gain_slow & 0x0F);
        if self.mode == ClockRecoveryMode::Pll {
            slow |= CLK_REC_ALGO_SEL;
        }

        let mut fast = (self.p_gain_fast << 5) | (self.i_gain_fast & 0x0F);
        if self.post_filter_16_symbols {
            fast |= PSTFLT_LEN;
        }

        Ok([slow, fast])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modem_block_layout() {
        let modem = Modem::new(
            Modulation::Gfsk2Bt1,
            DatarateCode::new(33579, 7).unwrap(),
            FreqDevCode::new(147, 4).unwrap(),
            ChannelBwCode::new(2, 3).unwrap(),
        )
        .preserving_mod1(FrequencyDeviation::from_bytes([0xC9, 0x00]).unwrap());

        let bytes = modem.to_bytes().unwrap();
        assert_eq!(bytes, [0x83, 0x2B, 0x27, 0xC4, 147, 0x23]);
        assert_eq!(Modem::from_bytes(bytes).unwrap(), modem);
    }

    #[test]
    fn modem_rejects_unknown_modulation_and_filter() {
        assert_eq!(
            Modem::from_bytes([0, 0, 0x40, 0, 0, 0]),
            Err(InvalidModem::Modulation(InvalidModulation(0x40)))
        );
        assert_eq!(
            Modem::from_bytes([0, 0, 0x00, 0, 0, 0x90]),
            Err(InvalidModem::ChannelFilter(InvalidChannelFilter(0x90)))
        );
        assert_eq!(ChannelFilter::from_bytes([0x0A]), Err(InvalidChannelFilter(0x0A)));
    }

    #[test]
    fn modulation_codes() {
        for modulation in [
            Modulation::NoModulation,
            Modulation::Fsk2,
            Modulation::Fsk4,
            Modulation::Gfsk2Bt05,
            Modulation::Gfsk2Bt1,
            Modulation::Gfsk4Bt05,
            Modulation::Gfsk4Bt1,
            Modulation::AskOok,
            Modulation::Polar,
        ] {
            let byte = modulation.to_byte();
            assert_eq!(byte & 0x0F, 0);
            assert_eq!(Modulation::from_byte(byte | 0x05), Ok(modulation));
        }
    }

    #[test]
    fn datarate_keeps_modulation_nibble() {
        let datarate = Datarate::from_bytes([0x00, 0x00, 0x53]).unwrap();
        assert_eq!(datarate.code.exponent(), 3);

        let updated = datarate.with_code(DatarateCode::new(0x1234, 9).unwrap());
        assert_eq!(updated.to_bytes().unwrap(), [0x12, 0x34, 0x59]);
    }

    #[test]
    fn frequency_deviation_keeps_mod1_flags() {
        let fdev = FrequencyDeviation::from_bytes([0x83, 0x10]).unwrap();
        assert_eq!((fdev.code.mantissa(), fdev.code.exponent()), (0x10, 3));

        let updated = fdev.with_code(FreqDevCode::new(163, 5).unwrap());
        assert_eq!(updated.to_bytes().unwrap(), [0x85, 163]);
    }

    #[test]
    fn afc_fields() {
        let afc = Afc::from_bytes([0xC8, 0x18, 0x25]).unwrap();
        assert!(afc.freeze_on_sync);
        assert!(afc.enabled);
        assert_eq!(afc.mode, AfcMode::Slicer);
        assert_eq!((afc.fast_period, afc.fast_gain, afc.slow_gain), (0x18, 2, 5));

        let updated = Afc {
            enabled: false,
            mode: AfcMode::SecondConversionStage,
            ..afc
        };
        assert_eq!(updated.to_bytes().unwrap(), [0xA8, 0x18, 0x25]);
    }

    #[test]
    fn isi_equalization_field() {
        let conf = AntSelectConf::from_bytes([0x45]).unwrap();
        assert_eq!(conf.equalization, IsiEqualization::DualPass);

        let updated = AntSelectConf {
            equalization: IsiEqualization::SinglePass,
            ..conf
        };
        assert_eq!(updated.to_bytes().unwrap(), [0x25]);
    }

    #[test]
    fn clock_recovery_stages() {
        let clock = ClockRecovery {
            mode: ClockRecoveryMode::Pll,
            p_gain_slow: 2,
            i_gain_slow: 8,
            p_gain_fast: 3,
            i_gain_fast: 4,
            post_filter_16_symbols: true,
        };
        let bytes = clock.to_bytes().unwrap();
        assert_eq!(bytes, [0x58, 0x74]);
        assert_eq!(ClockRecovery::from_bytes(bytes).unwrap(), clock);
    }
}
