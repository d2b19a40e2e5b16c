//! RF parameter codec
//!
//! Pure conversions between physical units and the S2-LP register encodings.
//! Nothing here touches the bus; every result depends only on the crystal frequency
//! held by [`Codec`] and, for carrier related values, the band and reference divider.
//!
//! # Encodings
//! - Datarate: 16-bit mantissa, 4-bit exponent, referenced to the digital clock
//! - Frequency deviation: 8-bit mantissa, 4-bit exponent, referenced to the crystal
//! - Channel filter: index into a 90 entry table, split as `exponent * 9 + mantissa`
//! - Carrier: 28-bit synthesizer word
//!
//! The digital clock is the crystal halved when the crystal runs above
//! [`DIG_DOMAIN_XTAL_THRESH`].
//!
//! Inputs outside the documented ranges are not rejected. The search loops stop at
//! their exponent ceiling and the mantissa arithmetic wraps, producing an encoding
//! that is meaningless but harmless to compute. Use the `is_valid_*` helpers before
//! encoding when the input is untrusted.

use core::ops::RangeInclusive;

use crate::registers::IfOffset;

/// Crystal frequency above which the digital domain runs at half the crystal
pub const DIG_DOMAIN_XTAL_THRESH: u32 = 30_000_000;

/// VCO center frequency in Hz
pub const VCO_CENTER_FREQ: u64 = 3_600_000_000;

/// Carrier frequencies served by the high band (VCO divided by 4)
pub const HIGH_BAND: RangeInclusive<u32> = 860_000_000..=940_000_000;

/// Carrier frequencies served by the middle band (VCO divided by 8)
pub const MIDDLE_BAND: RangeInclusive<u32> = 430_000_000..=470_000_000;

/// Minimum datarate supported by the S2-LP in bps
pub const MINIMUM_DATARATE: u32 = 100;

/// Maximum datarate supported by the S2-LP in bps, for a 26 MHz digital clock
pub const MAXIMUM_DATARATE: u32 = 250_000;

/// Intermediate frequency programmed by [`Radio::initialize`](crate::Radio::initialize)
pub const DEFAULT_IF: u32 = 300_000;

/// Available channel filter bandwidths times 10, for a 26 MHz digital clock.
///
/// Index `exponent * 9 + mantissa`. Values for other clocks scale with `f_dig / 26 MHz`.
pub const BANDWIDTH_TABLE_26M: [u16; 90] = [
    8001, 7951, 7684, 7368, 7051, 6709, 6423, 5867, 5414, //
    4509, 4259, 4032, 3808, 3621, 3417, 3254, 2945, 2703, //
    2247, 2124, 2015, 1900, 1807, 1706, 1624, 1471, 1350, //
    1123, 1062, 1005, 950, 903, 853, 812, 735, 675, //
    561, 530, 502, 474, 451, 426, 406, 367, 337, //
    280, 265, 251, 237, 226, 213, 203, 184, 169, //
    140, 133, 126, 119, 113, 106, 101, 92, 84, //
    70, 66, 63, 59, 56, 53, 51, 46, 42, //
    35, 33, 31, 30, 28, 27, 25, 23, 21, //
    18, 17, 16, 15, 14, 13, 13, 12, 11, //
];

// The channel filter search walks the table expecting it never to increase.
const _: () = {
    let mut i = 1;
    while i < BANDWIDTH_TABLE_26M.len() {
        assert!(BANDWIDTH_TABLE_26M[i] <= BANDWIDTH_TABLE_26M[i - 1]);
        i += 1;
    }
};

/// Datarate mantissa/exponent pair (MOD4, MOD3, MOD2[3:0])
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DatarateCode {
    mantissa: u16,
    exponent: u8,
}

impl DatarateCode {
    /// Largest exponent the 4-bit field can hold
    pub const MAX_EXPONENT: u8 = 0x0F;

    /// Build a code, rejecting exponents that do not fit the register field
    pub const fn new(mantissa: u16, exponent: u8) -> Option<Self> {
        if exponent > Self::MAX_EXPONENT {
            return None;
        }
        Some(Self { mantissa, exponent })
    }

    /// Decode the register fields; the exponent keeps its low 4 bits
    pub(crate) const fn from_fields(mantissa: u16, exponent: u8) -> Self {
        Self {
            mantissa,
            exponent: exponent & Self::MAX_EXPONENT,
        }
    }

    /// Mantissa field
    pub const fn mantissa(&self) -> u16 {
        self.mantissa
    }

    /// Exponent field
    pub const fn exponent(&self) -> u8 {
        self.exponent
    }
}

/// Frequency deviation mantissa/exponent pair (MOD0, MOD1[3:0])
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FreqDevCode {
    mantissa: u8,
    exponent: u8,
}

impl FreqDevCode {
    /// Largest exponent the 4-bit field can hold
    pub const MAX_EXPONENT: u8 = 0x0F;

    /// Build a code, rejecting exponents that do not fit the register field
    pub const fn new(mantissa: u8, exponent: u8) -> Option<Self> {
        if exponent > Self::MAX_EXPONENT {
            return None;
        }
        Some(Self { mantissa, exponent })
    }

    /// Decode the register fields; the exponent keeps its low 4 bits
    pub(crate) const fn from_fields(mantissa: u8, exponent: u8) -> Self {
        Self {
            mantissa,
            exponent: exponent & Self::MAX_EXPONENT,
        }
    }

    /// Mantissa field
    pub const fn mantissa(&self) -> u8 {
        self.mantissa
    }

    /// Exponent field
    pub const fn exponent(&self) -> u8 {
        self.exponent
    }
}

/// Channel filter mantissa/exponent pair (CHFLT)
///
/// Always addresses an entry of [`BANDWIDTH_TABLE_26M`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelBwCode {
    mantissa: u8,
    exponent: u8,
}

impl ChannelBwCode {
    /// Largest mantissa (9 steps per exponent)
    pub const MAX_MANTISSA: u8 = 8;
    /// Largest exponent (10 exponent buckets)
    pub const MAX_EXPONENT: u8 = 9;

    /// Build a code, rejecting pairs outside the bandwidth table
    pub const fn new(mantissa: u8, exponent: u8) -> Option<Self> {
        if mantissa > Self::MAX_MANTISSA || exponent > Self::MAX_EXPONENT {
            return None;
        }
        Some(Self { mantissa, exponent })
    }

    const fn from_index(index: usize) -> Self {
        Self {
            mantissa: (index % 9) as u8,
            exponent: (index / 9) as u8,
        }
    }

    /// Mantissa field
    pub const fn mantissa(&self) -> u8 {
        self.mantissa
    }

    /// Exponent field
    pub const fn exponent(&self) -> u8 {
        self.exponent
    }

    /// Position in [`BANDWIDTH_TABLE_26M`]
    pub const fn index(&self) -> usize {
        self.exponent as usize * 9 + self.mantissa as usize
    }
}

/// RF band, selected by the carrier frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Band {
    /// 860-940 MHz, VCO divided by 4
    High,
    /// 430-470 MHz, VCO divided by 8
    Middle,
}

impl Band {
    /// Band used for `frequency`. Anything outside the high band is treated as middle band.
    pub fn from_frequency(frequency: u32) -> Self {
        if HIGH_BAND.contains(&frequency) {
            Self::High
        } else {
            Self::Middle
        }
    }

    /// VCO division factor (B)
    pub const fn factor(self) -> u8 {
        match self {
            Self::High => 4,
            Self::Middle => 8,
        }
    }
}

/// Reference clock divider (XO_RCO_CONF0.REFDIV)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RefDiv {
    /// Reference clock is the crystal
    Div1,
    /// Reference clock is the crystal divided by 2
    Div2,
}

impl RefDiv {
    /// Division factor (D)
    pub const fn factor(self) -> u8 {
        match self {
            Self::Div1 => 1,
            Self::Div2 => 2,
        }
    }
}

impl From<bool> for RefDiv {
    fn from(enabled: bool) -> Self {
        if enabled {
            Self::Div2
        } else {
            Self::Div1
        }
    }
}

/// PLL charge pump setting for a carrier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChargePump {
    /// Charge pump current (SYNT3.PLL_CP_ISEL)
    pub cp_isel: u8,
    /// PFD split mode (SYNTH_CONFIG2.PLL_PFD_SPLIT_EN)
    pub pfd_split: bool,
}

/// Register codec bound to a crystal frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Codec {
    xtal: u32,
}

impl Codec {
    /// Create a codec for a crystal running at `xtal_frequency` Hz
    ///
    /// # Panics
    /// If `xtal_frequency` is zero, as every conversion divides by it.
    pub const fn new(xtal_frequency: u32) -> Self {
        assert!(xtal_frequency != 0, "crystal frequency must be non-zero");
        Self {
            xtal: xtal_frequency,
        }
    }

    /// Crystal frequency in Hz
    pub const fn xtal_frequency(&self) -> u32 {
        self.xtal
    }

    /// Whether the digital clock divider must be enabled for this crystal
    pub const fn digital_divider_active(&self) -> bool {
        self.xtal > DIG_DOMAIN_XTAL_THRESH
    }

    /// Digital domain clock in Hz
    pub const fn digital_frequency(&self) -> u32 {
        if self.digital_divider_active() {
            self.xtal >> 1
        } else {
            self.xtal
        }
    }

    /// Datarate in bps encoded by `code`
    pub fn compute_datarate(&self, code: DatarateCode) -> u32 {
        let f_dig = self.digital_frequency() as u64;
        let m = code.mantissa as u64;

        if code.exponent == 0 {
            return ((f_dig * m) >> 32) as u32;
        }

        ((f_dig * (m + 65536)) >> (33 - code.exponent)) as u32
    }

    /// Closest datarate encoding for `datarate` bps
    pub fn datarate_to_code(&self, datarate: u32) -> DatarateCode {
        let f_dig = self.digital_frequency() as u64;
        let datarate = datarate as u64;

        let mut exponent = 0;
        while exponent != 12 {
            let ceiling = DatarateCode {
                mantissa: 0xFFFF,
                exponent,
            };
            if datarate <= self.compute_datarate(ceiling) as u64 {
                break;
            }
            exponent += 1;
        }

        let (mantissa, tgt, tgt1, tgt2) = if exponent == 0 {
            let tgt = datarate << 32;
            let m = (tgt / f_dig) as u16;
            (m, tgt, f_dig * m as u64, f_dig * (m as u64 + 1))
        } else {
            let tgt = datarate << (33 - exponent);
            let m = (tgt / f_dig).wrapping_sub(65536) as u16;
            (
                m,
                tgt,
                f_dig * (m as u64 + 65536),
                f_dig * (m as u64 + 65537),
            )
        };

        DatarateCode {
            mantissa: round_up_if_closer(mantissa as u64, tgt, tgt1, tgt2) as u16,
            exponent,
        }
    }

    /// Frequency deviation in Hz encoded by `code`
    pub fn compute_freq_deviation(&self, code: FreqDevCode) -> u32 {
        let f_xo = self.xtal as u64;
        let m = code.mantissa as u64;

        if code.exponent == 0 {
            return ((f_xo * m) >> 22) as u32;
        }

        ((f_xo * (256 + m)) >> (23 - code.exponent)) as u32
    }

    /// Closest frequency deviation encoding for `fdev` Hz
    ///
    /// The top mantissa of the exponent below competes with the chosen exponent,
    /// so values falling in the gap between two exponents still round to the nearest code.
    pub fn freq_deviation_to_code(&self, fdev: u32) -> FreqDevCode {
        let f_xo = self.xtal as u64;

        let mut exponent = 0;
        while exponent != 12 {
            let ceiling = FreqDevCode {
                mantissa: 255,
                exponent,
            };
            if fdev <= self.compute_freq_deviation(ceiling) {
                break;
            }
            exponent += 1;
        }

        let (shift, bias) = if exponent == 0 {
            (22, 0)
        } else {
            (23 - exponent, 256)
        };
        let floor = (((fdev as u64) << shift) / f_xo).saturating_sub(bias).min(255) as u8;

        let above = FreqDevCode {
            mantissa: floor.saturating_add(1),
            exponent,
        };
        let lower_ceiling = exponent.checked_sub(1).map(|exponent| FreqDevCode {
            mantissa: 255,
            exponent,
        });

        let mut best = FreqDevCode {
            mantissa: floor,
            exponent,
        };
        for candidate in core::iter::once(above).chain(lower_ceiling) {
            let value = self.compute_freq_deviation(candidate);
            let current = self.compute_freq_deviation(best);
            let (delta, best_delta) = (value.abs_diff(fdev), current.abs_diff(fdev));
            if delta < best_delta || (delta == best_delta && value > current) {
                best = candidate;
            }
        }
        best
    }

    /// Channel filter bandwidth in Hz encoded by `code`
    pub fn compute_channel_bandwidth(&self, code: ChannelBwCode) -> u32 {
        let f_dig = self.digital_frequency() as u64;

        (100 * BANDWIDTH_TABLE_26M[code.index()] as u64 * f_dig / 26_000_000) as u32
    }

    /// Closest channel filter encoding for `bandwidth` Hz
    pub fn channel_bandwidth_to_code(&self, bandwidth: u32) -> ChannelBwCode {
        let last = BANDWIDTH_TABLE_26M.len() - 1;

        let mut index = 0;
        while index <= last && bandwidth < self.table_bandwidth(index) {
            index += 1;
        }

        if index != 0 {
            let center = index;
            let mut best = u64::MAX;

            for candidate in center - 1..=center + 1 {
                let delta = if candidate <= last {
                    (bandwidth as i64 - self.table_bandwidth(candidate) as i64).unsigned_abs()
                } else {
                    i32::MAX as u64
                };
                if delta < best {
                    best = delta;
                    index = candidate;
                }
            }
        }

        ChannelBwCode::from_index(index)
    }

    fn table_bandwidth(&self, index: usize) -> u32 {
        let f_dig = self.digital_frequency() as u64;
        (BANDWIDTH_TABLE_26M[index] as u64 * f_dig / 260_000) as u32
    }

    /// 28-bit synthesizer word for a carrier at `frequency` Hz
    pub fn synth_word(&self, frequency: u32, refdiv: RefDiv) -> u32 {
        let band = Band::from_frequency(frequency);
        let f_xo = self.xtal as u64;

        let tgt = ((frequency as u64) << 19) * (band.factor() as u64 * refdiv.factor() as u64);
        let synth = tgt / f_xo;
        let tgt1 = f_xo * synth;
        let tgt2 = f_xo * (synth + 1);

        round_up_if_closer(synth, tgt, tgt1, tgt2) as u32
    }

    /// Carrier frequency in Hz produced by `synth_word`
    pub fn frequency_base(&self, synth_word: u32, band: Band, refdiv: RefDiv) -> u32 {
        let f_xo = self.xtal as u64;

        (((f_xo * synth_word as u64) >> 19) / band.factor() as u64 / refdiv.factor() as u64) as u32
    }

    /// Charge pump setting for a carrier at `frequency` Hz
    pub fn charge_pump(&self, frequency: u32, refdiv: RefDiv) -> ChargePump {
        let band = Band::from_frequency(frequency);
        let vco_frequency = frequency as u64 * band.factor() as u64;
        let f_ref = self.xtal / refdiv.factor() as u32;

        let (cp_isel, pfd_split) = match (
            vco_frequency >= VCO_CENTER_FREQ,
            f_ref > DIG_DOMAIN_XTAL_THRESH,
        ) {
            (true, true) => (0x02, false),
            (true, false) => (0x01, true),
            (false, true) => (0x03, false),
            (false, false) => (0x02, true),
        };

        ChargePump { cp_isel, pfd_split }
    }

    /// CHSPACE register value for a channel spacing of `spacing` Hz.
    ///
    /// The step is `f_xo / 32768`; spacings above 255 steps saturate.
    pub fn channel_spacing_to_reg(&self, spacing: u32) -> u8 {
        let steps = ((spacing as u64) << 15) / self.xtal as u64;
        u8::try_from(steps).unwrap_or(u8::MAX)
    }

    /// Channel spacing in Hz for a CHSPACE register value
    pub fn compute_channel_spacing(&self, reg: u8) -> u32 {
        ((self.xtal as u64 * reg as u64) >> 15) as u32
    }

    /// IF_OFFSET_ANA and IF_OFFSET_DIG for an intermediate frequency of `if_frequency` Hz
    pub fn intermediate_frequency(&self, if_frequency: u32) -> IfOffset {
        let scaled = ((if_frequency as u64) << 13) * 3;

        IfOffset {
            analog: (scaled / self.xtal as u64).wrapping_sub(100) as u8,
            digital: (scaled / self.digital_frequency() as u64).wrapping_sub(100) as u8,
        }
    }

    /// Datarates the hardware supports with this crystal
    pub fn datarate_range(&self) -> RangeInclusive<u32> {
        let max = MAXIMUM_DATARATE as u64 * self.digital_frequency() as u64 / 1_000_000 / 26;
        MINIMUM_DATARATE..=max as u32
    }

    /// Frequency deviations the hardware supports with this crystal
    pub fn freq_deviation_range(&self) -> RangeInclusive<u32> {
        let max = 787_109 * self.xtal as u64 / 1_000_000 / 26;
        (self.xtal >> 22)..=max as u32
    }

    /// Channel filter bandwidths the hardware supports with this crystal
    pub fn channel_bandwidth_range(&self) -> RangeInclusive<u32> {
        let f_dig = self.digital_frequency() as u64;
        let min = 1_100 * f_dig / 1_000_000 / 26;
        let max = 800_100 * f_dig / 1_000_000 / 26;
        min as u32..=max as u32
    }

    /// Whether `datarate` bps lies in [`Codec::datarate_range`]
    pub fn is_valid_datarate(&self, datarate: u32) -> bool {
        self.datarate_range().contains(&datarate)
    }

    /// Whether `fdev` Hz lies in [`Codec::freq_deviation_range`]
    pub fn is_valid_freq_deviation(&self, fdev: u32) -> bool {
        self.freq_deviation_range().contains(&fdev)
    }

    /// Whether `bandwidth` Hz lies in [`Codec::channel_bandwidth_range`]
    pub fn is_valid_channel_bandwidth(&self, bandwidth: u32) -> bool {
        self.channel_bandwidth_range().contains(&bandwidth)
    }

    /// Whether `frequency` Hz falls in the high or middle band
    pub fn is_valid_frequency(&self, frequency: u32) -> bool {
        HIGH_BAND.contains(&frequency) || MIDDLE_BAND.contains(&frequency)
    }

    /// Whether `spacing` Hz fits the 8-bit CHSPACE register
    pub fn is_valid_channel_spacing(&self, spacing: u32) -> bool {
        spacing <= self.xtal / 32768 * 255
    }
}

/// Pick `candidate + 1` when `tgt2` is at least as close to `tgt` as `tgt1`.
///
/// `tgt1`/`tgt2` bracket `tgt` for in-range input; the wrapping keeps out-of-range
/// input from panicking.
fn round_up_if_closer(candidate: u64, tgt: u64, tgt1: u64, tgt2: u64) -> u64 {
    if tgt2.wrapping_sub(tgt) <= tgt.wrapping_sub(tgt1) {
        candidate.wrapping_add(1)
    } else {
        candidate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const XTAL_26M: Codec = Codec::new(26_000_000);
    const XTAL_50M: Codec = Codec::new(50_000_000);

    /// xorshift32, enough to spread samples across a range
    struct Samples(u32);

    impl Samples {
        fn next_in(&mut self, range: RangeInclusive<u32>) -> u32 {
            self.0 ^= self.0 << 13;
            self.0 ^= self.0 >> 17;
            self.0 ^= self.0 << 5;
            range.start() + self.0 % (range.end() - range.start() + 1)
        }
    }

    fn datarate(codec: &Codec, mantissa: u16, exponent: u8) -> u32 {
        codec.compute_datarate(DatarateCode::new(mantissa, exponent).unwrap())
    }

    fn assert_nearest_datarate(codec: &Codec, target: u32) {
        let code = codec.datarate_to_code(target);
        let got = codec.compute_datarate(code) as i64;
        let error = (got - target as i64).abs();

        let (m, e) = (code.mantissa(), code.exponent());
        assert!(e <= 11, "exponent {} for {}", e, target);

        // Reconstruction floors, so allow one bps of slack against the neighbours.
        if m > 0 {
            let below = datarate(codec, m - 1, e) as i64;
            assert!(error <= (below - target as i64).abs() + 1, "{} -> {:?}", target, code);
        }
        if m < 0xFFFF {
            let above = datarate(codec, m + 1, e) as i64;
            assert!(error <= (above - target as i64).abs() + 1, "{} -> {:?}", target, code);
        }
    }

    #[test]
    fn datarate_38400_at_26mhz() {
        let code = XTAL_26M.datarate_to_code(38_400);
        assert_eq!((code.mantissa(), code.exponent()), (33579, 7));
        assert_eq!(XTAL_26M.compute_datarate(code), 38_400);
    }

    #[test]
    fn datarate_uses_halved_clock_at_50mhz() {
        let code = XTAL_50M.datarate_to_code(38_400);
        assert_eq!((code.mantissa(), code.exponent()), (37543, 7));
        assert_eq!(XTAL_50M.compute_datarate(code), 38_399);
    }

    #[test]
    fn datarate_exponent_zero_has_no_mantissa_bias() {
        let code = XTAL_26M.datarate_to_code(100);
        assert_eq!((code.mantissa(), code.exponent()), (16519, 0));
        assert_eq!(XTAL_26M.compute_datarate(code), 100);
    }

    #[test]
    fn datarate_round_trip_is_nearest() {
        let mut samples = Samples(0x2545_F491);
        for codec in [XTAL_26M, XTAL_50M] {
            for _ in 0..1000 {
                let target = samples.next_in(100..=500_000);
                assert_nearest_datarate(&codec, target);
            }
            for target in [100, 101, 250_000, 499_999, 500_000] {
                assert_nearest_datarate(&codec, target);
            }
        }
    }

    #[test]
    fn datarate_is_monotonic() {
        let mut previous = 0;
        for exponent in 0..=11 {
            for mantissa in (0..=0xFFFFu32).step_by(257).chain([0xFFFF]) {
                let current = datarate(&XTAL_26M, mantissa as u16, exponent);
                assert!(current >= previous, "m={} e={}", mantissa, exponent);
                previous = current;
            }
        }
    }

    #[test]
    fn datarate_out_of_range_saturates_without_panicking() {
        let code = XTAL_26M.datarate_to_code(10_000_000);
        assert_eq!((code.mantissa(), code.exponent()), (20164, 12));
    }

    #[test]
    fn freq_deviation_20khz() {
        let code = XTAL_26M.freq_deviation_to_code(20_000);
        assert_eq!((code.mantissa(), code.exponent()), (147, 4));
        assert_eq!(XTAL_26M.compute_freq_deviation(code), 19_985);

        let code = XTAL_50M.freq_deviation_to_code(20_000);
        assert_eq!((code.mantissa(), code.exponent()), (163, 3));
        assert_eq!(XTAL_50M.compute_freq_deviation(code), 19_979);
    }

    fn deviation(codec: &Codec, mantissa: u8, exponent: u8) -> u32 {
        codec.compute_freq_deviation(FreqDevCode::new(mantissa, exponent).unwrap())
    }

    fn assert_nearest_deviation(codec: &Codec, target: u32) {
        let code = codec.freq_deviation_to_code(target);
        let error = codec.compute_freq_deviation(code).abs_diff(target);

        let nearest = (0..=11)
            .flat_map(|e| (0..=255).map(move |m| (m, e)))
            .map(|(m, e)| deviation(codec, m, e).abs_diff(target))
            .min()
            .unwrap();
        assert_eq!(error, nearest, "{} -> {:?}", target, code);
    }

    #[test]
    fn freq_deviation_round_trip_is_nearest() {
        let mut samples = Samples(0x1234_5678);
        for codec in [XTAL_26M, XTAL_50M] {
            let range = codec.freq_deviation_range();
            for _ in 0..1000 {
                assert_nearest_deviation(&codec, samples.next_in(range.clone()));
            }
            assert_nearest_deviation(&codec, *range.start());
            assert_nearest_deviation(&codec, *range.end());
        }
    }

    #[test]
    fn freq_deviation_exponent_boundaries() {
        for codec in [XTAL_26M, XTAL_50M] {
            for e in 0..=10 {
                let ceiling = deviation(&codec, 255, e);
                let code = codec.freq_deviation_to_code(ceiling);
                assert_eq!((code.mantissa(), code.exponent()), (255, e));

                let next = deviation(&codec, 0, e + 1);
                for target in [ceiling - 1, ceiling + 1, next - 1, next, next + 1] {
                    assert_nearest_deviation(&codec, target);
                }
                for target in ceiling..=next {
                    let got = codec.compute_freq_deviation(codec.freq_deviation_to_code(target));
                    assert!(got == ceiling || got == next, "{} -> {}", target, got);
                }
            }
        }

        let code = XTAL_26M.freq_deviation_to_code(1_580);
        assert_eq!((code.mantissa(), code.exponent()), (255, 0));

        let code = XTAL_26M.freq_deviation_to_code(202_732);
        assert_eq!((code.mantissa(), code.exponent()), (255, 7));
        assert_eq!(XTAL_26M.compute_freq_deviation(code), 202_728);
    }

    #[test]
    #[should_panic(expected = "crystal frequency must be non-zero")]
    fn zero_xtal_frequency_panics() {
        let _ = Codec::new(0);
    }

    #[test]
    fn freq_deviation_out_of_range_saturates_without_panicking() {
        let code = XTAL_26M.freq_deviation_to_code(100_000_000);
        assert_eq!((code.mantissa(), code.exponent()), (255, 12));
    }

    #[test]
    fn channel_bandwidth_table_edges() {
        let code = XTAL_26M.channel_bandwidth_to_code(800_100);
        assert_eq!((code.mantissa(), code.exponent()), (0, 0));
        assert_eq!(XTAL_26M.compute_channel_bandwidth(code), 800_100);

        let code = XTAL_26M.channel_bandwidth_to_code(1_100);
        assert_eq!((code.mantissa(), code.exponent()), (8, 9));
        assert_eq!(XTAL_26M.compute_channel_bandwidth(code), 1_100);
    }

    #[test]
    fn channel_bandwidth_outside_table_clamps_to_ends() {
        let code = XTAL_26M.channel_bandwidth_to_code(2_000_000);
        assert_eq!(code.index(), 0);

        let code = XTAL_26M.channel_bandwidth_to_code(1_000);
        assert_eq!(code.index(), 89);
    }

    #[test]
    fn channel_bandwidth_picks_nearest_neighbour() {
        let code = XTAL_26M.channel_bandwidth_to_code(100_000);
        assert_eq!((code.mantissa(), code.exponent()), (2, 3));
        assert_eq!(XTAL_26M.compute_channel_bandwidth(code), 100_500);

        let code = XTAL_50M.channel_bandwidth_to_code(100_000);
        assert_eq!((code.mantissa(), code.exponent()), (1, 3));
        assert_eq!(XTAL_50M.compute_channel_bandwidth(code), 102_115);

        for index in 0..BANDWIDTH_TABLE_26M.len() {
            let exact = XTAL_26M.table_bandwidth(index);
            let code = XTAL_26M.channel_bandwidth_to_code(exact);
            assert_eq!(XTAL_26M.compute_channel_bandwidth(code), exact);
        }
    }

    #[test]
    fn bandwidth_table_is_non_increasing() {
        assert!(BANDWIDTH_TABLE_26M.windows(2).all(|w| w[1] <= w[0]));
    }

    #[test]
    fn digital_domain_halving_at_threshold() {
        let below = Codec::new(DIG_DOMAIN_XTAL_THRESH);
        let above = Codec::new(DIG_DOMAIN_XTAL_THRESH + 1);
        assert!(!below.digital_divider_active());
        assert!(above.digital_divider_active());
        assert_eq!(below.digital_frequency(), 30_000_000);
        assert_eq!(above.digital_frequency(), 15_000_000);

        let code = DatarateCode::new(33579, 7).unwrap();
        assert_eq!(below.compute_datarate(code), 44_307);
        assert_eq!(above.compute_datarate(code), 22_153);

        let code = ChannelBwCode::new(0, 0).unwrap();
        assert_eq!(below.compute_channel_bandwidth(code), 923_192);
        assert_eq!(above.compute_channel_bandwidth(code), 461_596);
    }

    #[test]
    fn synth_word_round_trip() {
        for (frequency, band) in [(868_000_000, Band::High), (433_000_000, Band::Middle)] {
            assert_eq!(Band::from_frequency(frequency), band);
            let word = XTAL_50M.synth_word(frequency, RefDiv::Div1);
            assert!(word < 1 << 28);
            let back = XTAL_50M.frequency_base(word, band, RefDiv::Div1);
            assert!(back.abs_diff(frequency) <= 50_000_000 >> 19, "{} -> {}", frequency, back);
        }

        assert_eq!(XTAL_50M.synth_word(868_000_000, RefDiv::Div1), 36_406_559);
        assert_eq!(XTAL_26M.synth_word(433_000_000, RefDiv::Div1), 69_851_294);
    }

    #[test]
    fn synth_word_with_reference_divider() {
        let word = XTAL_50M.synth_word(915_000_000, RefDiv::Div2);
        let back = XTAL_50M.frequency_base(word, Band::High, RefDiv::Div2);
        assert!(back.abs_diff(915_000_000) <= 50_000_000 >> 19);
    }

    #[test]
    fn charge_pump_regions() {
        // 868 MHz * 4 is below the VCO center, 940 MHz * 4 above
        let cp = XTAL_50M.charge_pump(868_000_000, RefDiv::Div1);
        assert_eq!(cp, ChargePump { cp_isel: 0x03, pfd_split: false });
        let cp = XTAL_50M.charge_pump(940_000_000, RefDiv::Div1);
        assert_eq!(cp, ChargePump { cp_isel: 0x02, pfd_split: false });
        let cp = XTAL_26M.charge_pump(868_000_000, RefDiv::Div1);
        assert_eq!(cp, ChargePump { cp_isel: 0x02, pfd_split: true });
        let cp = XTAL_26M.charge_pump(470_000_000, RefDiv::Div1);
        assert_eq!(cp, ChargePump { cp_isel: 0x01, pfd_split: true });
        // Dividing a 50 MHz reference brings it under the threshold
        let cp = XTAL_50M.charge_pump(940_000_000, RefDiv::Div2);
        assert_eq!(cp, ChargePump { cp_isel: 0x01, pfd_split: true });
    }

    #[test]
    fn channel_spacing() {
        assert_eq!(XTAL_26M.channel_spacing_to_reg(20_000), 25);
        assert_eq!(XTAL_26M.compute_channel_spacing(25), 19_836);
        assert_eq!(XTAL_50M.channel_spacing_to_reg(20_000), 13);
        assert_eq!(XTAL_50M.channel_spacing_to_reg(400_000), 255);
        assert!(XTAL_50M.is_valid_channel_spacing(50_000_000 / 32768 * 255));
    }

    #[test]
    fn intermediate_frequency() {
        let ifo = XTAL_26M.intermediate_frequency(DEFAULT_IF);
        assert_eq!((ifo.analog, ifo.digital), (183, 183));

        let ifo = XTAL_50M.intermediate_frequency(DEFAULT_IF);
        assert_eq!((ifo.analog, ifo.digital), (47, 194));
    }

    #[test]
    fn documented_ranges() {
        assert_eq!(XTAL_26M.datarate_range(), 100..=250_000);
        assert_eq!(XTAL_26M.channel_bandwidth_range(), 1_100..=800_100);
        assert!(XTAL_26M.is_valid_freq_deviation(20_000));
        assert!(!XTAL_26M.is_valid_freq_deviation(1));
        assert!(XTAL_26M.is_valid_frequency(433_000_000));
        assert!(!XTAL_26M.is_valid_frequency(600_000_000));
    }

    #[test]
    fn code_constructors_reject_oversized_fields() {
        assert!(DatarateCode::new(0, 16).is_none());
        assert!(FreqDevCode::new(0, 16).is_none());
        assert!(ChannelBwCode::new(9, 0).is_none());
        assert!(ChannelBwCode::new(0, 10).is_none());
        assert_eq!(ChannelBwCode::new(8, 9).map(|c| c.index()), Some(89));
    }
}
