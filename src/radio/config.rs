//! Radio configuration values

use crate::registers::{Afc, AfcMode, ClockRecovery, ClockRecoveryMode, Modulation};

/// Driver configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Crystal frequency in Hz. Every physical unit conversion depends on it.
    pub xtal_frequency: u32,
    /// Number of MC_STATE polls before a state transition is reported as a timeout
    pub state_poll_attempts: u32,
    /// Delay before each MC_STATE poll in microseconds
    pub state_poll_interval_us: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            xtal_frequency: 50_000_000,
            state_poll_attempts: 1000,
            state_poll_interval_us: 10,
        }
    }
}

/// Analog and digital radio parameters applied by [`Radio::initialize`](super::Radio::initialize)
///
/// All values are physical units. Ranges depend on the crystal, see
/// [`Codec`](super::codec::Codec) for the helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RadioInit {
    /// Carrier frequency in Hz, 430-470 MHz or 860-940 MHz
    pub frequency_base: u32,
    pub modulation: Modulation,
    /// Datarate in bps
    pub datarate: u32,
    /// Frequency deviation in Hz
    pub freq_deviation: u32,
    /// Channel filter bandwidth in Hz
    pub bandwidth: u32,
}

/// AFC parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AfcInit {
    pub enabled: bool,
    /// Freeze the correction once the sync word is detected
    pub freeze_on_sync: bool,
    pub mode: AfcMode,
    /// Fast loop duration
    pub fast_period: u8,
    /// Fast loop gain, 0 to 15
    pub fast_gain: u8,
    /// Slow loop gain, 0 to 15
    pub slow_gain: u8,
}

impl AfcInit {
    /// Apply these parameters on top of the AFC registers read from the device
    pub(crate) fn apply(&self, afc: &mut Afc) {
        afc.enabled = self.enabled;
        afc.freeze_on_sync = self.freeze_on_sync;
        afc.mode = self.mode;
        afc.fast_period = self.fast_period;
        afc.fast_gain = self.fast_gain & 0x0F;
        afc.slow_gain = self.slow_gain & 0x0F;
    }
}

impl From<Afc> for AfcInit {
    fn from(afc: Afc) -> Self {
        Self {
            enabled: afc.enabled,
            freeze_on_sync: afc.freeze_on_sync,
            mode: afc.mode,
            fast_period: afc.fast_period,
            fast_gain: afc.fast_gain,
            slow_gain: afc.slow_gain,
        }
    }
}

/// Symbol clock recovery parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockRecoveryInit {
    pub mode: ClockRecoveryMode,
    /// Proportional gain for the slow stage, 0 to 7
    pub p_gain_slow: u8,
    /// Proportional gain for the fast stage, 0 to 7
    pub p_gain_fast: u8,
    /// Integral gain for the slow stage, 0 to 15
    pub i_gain_slow: u8,
    /// Integral gain for the fast stage, 0 to 15
    pub i_gain_fast: u8,
    /// Post filter of 16 symbols instead of 8
    pub post_filter_16_symbols: bool,
}

impl From<ClockRecoveryInit> for ClockRecovery {
    fn from(init: ClockRecoveryInit) -> Self {
        Self {
            mode: init.mode,
            p_gain_slow: init.p_gain_slow & 0x07,
            i_gain_slow: init.i_gain_slow & 0x0F,
            p_gain_fast: init.p_gain_fast & 0x07,
            i_gain_fast: init.i_gain_fast & 0x0F,
            post_filter_16_symbols: init.post_filter_16_symbols,
        }
    }
}

impl From<ClockRecovery> for ClockRecoveryInit {
    fn from(clock: ClockRecovery) -> Self {
        Self {
            mode: clock.mode,
            p_gain_slow: clock.p_gain_slow,
            p_gain_fast: clock.p_gain_fast,
            i_gain_slow: clock.i_gain_slow,
            i_gain_fast: clock.i_gain_fast,
            post_filter_16_symbols: clock.post_filter_16_symbols,
        }
    }
}
