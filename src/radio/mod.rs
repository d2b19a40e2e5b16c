//! RF configuration API
//!
//! [`Radio`] combines the [`Codec`] with register access to configure the analog and
//! digital RF front end in physical units. It owns:
//! - an [`Interface`] to the device registers
//! - a [`DelayNs`] provider used to pace state polling
//! - the [`Config`], including the crystal frequency every conversion depends on
//!
//! # Example
//! ```no_run
//! use s2lp::radio::{Config, Modulation, Radio, RadioInit};
//! use s2lp::Interface;
//!
//! # fn example<I: Interface, D: embedded_hal::delay::DelayNs>(interface: I, delay: D) -> Result<(), s2lp::Error> {
//! let mut radio = Radio::new(interface, delay, Config::default());
//!
//! radio.initialize(&RadioInit {
//!     frequency_base: 433_000_000,
//!     modulation: Modulation::Gfsk2Bt1,
//!     datarate: 9_600,
//!     freq_deviation: 4_800,
//!     bandwidth: 20_000,
//! })?;
//!
//! // Hop to channel 3 with 200 kHz spacing
//! radio.set_channel_space(200_000)?;
//! radio.set_channel(3)?;
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod config;
mod power;

use embedded_hal::delay::DelayNs;
use regiface::ReadableRegister;

pub use codec::{Band, Codec, RefDiv};
pub use config::{AfcInit, ClockRecoveryInit, Config, RadioInit};
pub use power::{PA_LOWER_LIMIT_DBM, PA_UPPER_LIMIT_DBM};
pub use crate::registers::{AfcMode, ClockRecoveryMode, IsiEqualization, Modulation};

use crate::commands::{Ready, Standby};
use crate::interface::Interface;
use crate::registers::{
    Afc, AntSelectConf, BesselFilter, ChannelFilter, ChannelNumber, ChannelSpace, ClockRecovery,
    Datarate, FrequencyDeviation, McState, Mod2, Modem, PaControl, State, Synth, SynthConfig2,
    VcoCalibrIn0, VcoCalibrIn1, VcoCalibrIn2, VcoConfig, XoRcoConf0, XoRcoConf1,
};
use crate::Error;
use codec::{DEFAULT_IF, DIG_DOMAIN_XTAL_THRESH};

/// S2-LP RF front end
pub struct Radio<I, D> {
    interface: I,
    delay: D,
    config: Config,
    codec: Codec,
}

impl<I, D> Radio<I, D> {
    /// Create a radio using `config`
    ///
    /// # Panics
    /// If `config.xtal_frequency` is zero.
    pub fn new(interface: I, delay: D, config: Config) -> Self {
        Self {
            interface,
            delay,
            codec: Codec::new(config.xtal_frequency),
            config,
        }
    }

    /// Release the register interface and delay provider
    pub fn release(self) -> (I, D) {
        (self.interface, self.delay)
    }

    /// Direct access to the register interface
    pub fn interface(&mut self) -> &mut I {
        &mut self.interface
    }

    /// Configuration the radio was created with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Codec bound to the configured crystal
    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    /// Crystal frequency in Hz
    pub fn xtal_frequency(&self) -> u32 {
        self.config.xtal_frequency
    }

    /// Change the crystal frequency used by every later conversion.
    ///
    /// Must match the crystal fitted to the board; nothing is written to the device.
    ///
    /// # Errors
    /// * `Error::InvalidParameter` - `xtal_frequency` is zero
    pub fn set_xtal_frequency(&mut self, xtal_frequency: u32) -> Result<(), Error> {
        if xtal_frequency == 0 {
            return Err(Error::InvalidParameter);
        }
        self.config.xtal_frequency = xtal_frequency;
        self.codec = Codec::new(xtal_frequency);
        Ok(())
    }
}

impl<I, D> Radio<I, D>
where
    I: Interface,
    D: DelayNs,
{
    /// Read the main controller status
    pub fn refresh_status(&mut self) -> Result<McState, Error> {
        self.interface.refresh_status()
    }

    /// Poll MC_STATE until the device reports `state`.
    ///
    /// Each attempt waits `state_poll_interval_us` before reading. Gives up with
    /// [`Error::HardwareTimeout`] after `state_poll_attempts` reads.
    pub fn wait_for_state(&mut self, state: State) -> Result<McState, Error> {
        for _ in 0..self.config.state_poll_attempts {
            self.delay.delay_us(self.config.state_poll_interval_us);

            let status = self.interface.refresh_status()?;
            if status.state == state {
                return Ok(status);
            }
        }

        #[cfg(feature = "defmt")]
        {
            defmt::warn!("timed out waiting for {}", state);
        }

        Err(Error::HardwareTimeout)
    }

    /// Configure the RF front end.
    ///
    /// Steps, in order:
    /// 1. Align the digital clock divider with the crystal, cycling through STANDBY
    ///    if it has to change
    /// 2. Program a 300 kHz intermediate frequency
    /// 3. Write datarate, modulation, frequency deviation and channel filter
    /// 4. Configure PA shaping for the modulation and the Bessel filter for the datarate
    /// 5. Freeze AFC on sync word detection
    /// 6. Program the carrier with [`Radio::set_frequency_base`]
    ///
    /// Parameters are not range checked; see the `is_valid_*` helpers on [`Codec`].
    ///
    /// # Errors
    /// * `Error::HardwareTimeout` - the device did not reach STANDBY or READY
    /// * `Error::Bus` - register access failed
    pub fn initialize(&mut self, init: &RadioInit) -> Result<(), Error> {
        #[cfg(feature = "defmt")]
        {
            defmt::debug!("initializing radio: {}", init);
        }

        let xtal = self.codec.xtal_frequency();
        let divider = self.dig_div()?;
        if (xtal < DIG_DOMAIN_XTAL_THRESH && divider) || (xtal > DIG_DOMAIN_XTAL_THRESH && !divider)
        {
            #[cfg(feature = "defmt")]
            {
                defmt::debug!("toggling digital divider to {}", !divider);
            }

            self.interface.send_command(Standby)?;
            self.wait_for_state(State::Standby)?;

            self.set_dig_div(!divider)?;

            self.interface.send_command(Ready)?;
            self.wait_for_state(State::Ready)?;
        }

        self.interface
            .write_register(self.codec.intermediate_frequency(DEFAULT_IF))?;

        let mod1: FrequencyDeviation = self.interface.read_register()?;
        let modem = Modem::new(
            init.modulation,
            self.codec.datarate_to_code(init.datarate),
            self.codec.freq_deviation_to_code(init.freq_deviation),
            self.codec.channel_bandwidth_to_code(init.bandwidth),
        )
        .preserving_mod1(mod1);
        self.interface.write_register(modem)?;

        let ook = init.modulation == Modulation::AskOok;
        self.interface.modify_register(|pa: &mut PaControl| {
            pa.power.dig_smooth = ook;
            pa.fir_enabled = ook;
            pa.bessel_filter = BesselFilter::for_datarate(init.datarate);
        })?;

        self.interface
            .modify_register(|afc: &mut Afc| afc.freeze_on_sync = true)?;

        self.set_frequency_base(init.frequency_base)
    }

    /// Read back the configuration applied by [`Radio::initialize`]
    pub fn info(&mut self) -> Result<RadioInit, Error> {
        let synth: Synth = self.interface.read_register()?;
        let refdiv = self.ref_div()?;
        let modem: Modem = self.interface.read_register()?;

        Ok(RadioInit {
            frequency_base: self.codec.frequency_base(synth.word, synth.band, refdiv),
            modulation: modem.modulation,
            datarate: self.codec.compute_datarate(modem.datarate),
            freq_deviation: self.codec.compute_freq_deviation(modem.freq_deviation),
            bandwidth: self.codec.compute_channel_bandwidth(modem.channel_filter),
        })
    }

    /// Write the 28-bit synthesizer word, keeping charge pump and band select
    pub fn set_synth_word(&mut self, word: u32) -> Result<(), Error> {
        self.interface
            .modify_register(|synth: &mut Synth| synth.word = word & Synth::WORD_MASK)?;
        Ok(())
    }

    /// 28-bit synthesizer word currently programmed
    pub fn synth_word(&mut self) -> Result<u32, Error> {
        let synth: Synth = self.interface.read_register()?;
        Ok(synth.word)
    }

    /// Select the channel; the carrier moves by `channel * channel_space`
    pub fn set_channel(&mut self, channel: u8) -> Result<(), Error> {
        self.interface.write_register(ChannelNumber { value: channel })
    }

    /// Channel number (CHNUM)
    pub fn channel(&mut self) -> Result<u8, Error> {
        let channel: ChannelNumber = self.interface.read_register()?;
        Ok(channel.value)
    }

    /// Set the reference clock divider
    pub fn set_ref_div(&mut self, ref_div: RefDiv) -> Result<(), Error> {
        self.interface
            .modify_register(|conf: &mut XoRcoConf0| conf.ref_div = ref_div)?;
        Ok(())
    }

    /// Reference clock divider
    pub fn ref_div(&mut self) -> Result<RefDiv, Error> {
        let conf: XoRcoConf0 = self.interface.read_register()?;
        Ok(conf.ref_div)
    }

    /// Enable or disable the digital clock divider.
    ///
    /// # Important Notes
    /// - Only effective in STANDBY; [`Radio::initialize`] handles the transition
    pub fn set_dig_div(&mut self, enabled: bool) -> Result<(), Error> {
        self.interface
            .modify_register(|conf: &mut XoRcoConf1| conf.digital_divider = enabled)?;
        Ok(())
    }

    /// Whether the digital clock divider is enabled
    pub fn dig_div(&mut self) -> Result<bool, Error> {
        let conf: XoRcoConf1 = self.interface.read_register()?;
        Ok(conf.digital_divider)
    }

    /// Set the channel spacing in Hz. Spacings above 255 steps of `f_xo / 2^15` saturate.
    pub fn set_channel_space(&mut self, spacing: u32) -> Result<(), Error> {
        let value = self.codec.channel_spacing_to_reg(spacing);
        self.interface.write_register(ChannelSpace { value })
    }

    /// Channel spacing in Hz
    pub fn channel_space(&mut self) -> Result<u32, Error> {
        let space: ChannelSpace = self.interface.read_register()?;
        Ok(self.codec.compute_channel_spacing(space.value))
    }

    /// Program the carrier frequency in Hz.
    ///
    /// Selects the band from the frequency, then writes the PLL charge pump setting
    /// and the synthesizer word for the current reference divider.
    pub fn set_frequency_base(&mut self, frequency: u32) -> Result<(), Error> {
        let refdiv = self.ref_div()?;
        let word = self.codec.synth_word(frequency, refdiv);
        let pump = self.codec.charge_pump(frequency, refdiv);

        #[cfg(feature = "defmt")]
        {
            defmt::debug!("carrier {=u32} Hz: synth {=u32:#x}, {}", frequency, word, pump);
        }

        self.interface
            .modify_register(|conf: &mut SynthConfig2| conf.pfd_split = pump.pfd_split)?;

        self.interface.write_register(Synth {
            cp_isel: pump.cp_isel,
            band: Band::from_frequency(frequency),
            word,
        })
    }

    /// Carrier frequency in Hz, decoded from the synthesizer word and band
    pub fn frequency_base(&mut self) -> Result<u32, Error> {
        let synth: Synth = self.interface.read_register()?;
        let refdiv = self.ref_div()?;
        Ok(self.codec.frequency_base(synth.word, synth.band, refdiv))
    }

    /// Set the datarate in bps
    pub fn set_datarate(&mut self, datarate: u32) -> Result<(), Error> {
        let code = self.codec.datarate_to_code(datarate);
        self.interface
            .modify_register(|reg: &mut Datarate| *reg = reg.with_code(code))?;
        Ok(())
    }

    /// Datarate in bps
    pub fn datarate(&mut self) -> Result<u32, Error> {
        let reg: Datarate = self.interface.read_register()?;
        Ok(self.codec.compute_datarate(reg.code))
    }

    /// Set the frequency deviation in Hz
    pub fn set_frequency_deviation(&mut self, fdev: u32) -> Result<(), Error> {
        let code = self.codec.freq_deviation_to_code(fdev);
        self.interface
            .modify_register(|reg: &mut FrequencyDeviation| *reg = reg.with_code(code))?;
        Ok(())
    }

    /// Frequency deviation in Hz
    pub fn frequency_deviation(&mut self) -> Result<u32, Error> {
        let reg: FrequencyDeviation = self.interface.read_register()?;
        Ok(self.codec.compute_freq_deviation(reg.code))
    }

    /// Set the channel filter bandwidth in Hz.
    ///
    /// The closest entry of the channel filter table is used; read back with
    /// [`Radio::channel_bandwidth`] to get the bandwidth actually applied.
    pub fn set_channel_bandwidth(&mut self, bandwidth: u32) -> Result<(), Error> {
        let code = self.codec.channel_bandwidth_to_code(bandwidth);
        self.interface.write_register(ChannelFilter { code })
    }

    /// Channel filter bandwidth in Hz
    pub fn channel_bandwidth(&mut self) -> Result<u32, Error> {
        let filter: ChannelFilter = self.interface.read_register()?;
        Ok(self.codec.compute_channel_bandwidth(filter.code))
    }

    /// Set the modulation scheme, keeping the datarate exponent in MOD2
    pub fn set_modulation(&mut self, modulation: Modulation) -> Result<(), Error> {
        self.interface
            .update_reg(address_of::<Mod2>(), 0xF0, modulation.to_byte())?;
        Ok(())
    }

    /// Current modulation scheme
    pub fn modulation(&mut self) -> Result<Modulation, Error> {
        let mod2: Mod2 = self.interface.read_register()?;
        Ok(mod2.modulation)
    }

    /// Select the ISI cancellation mode
    pub fn set_isi_equalization(&mut self, mode: IsiEqualization) -> Result<(), Error> {
        self.interface
            .modify_register(|conf: &mut AntSelectConf| conf.equalization = mode)?;
        Ok(())
    }

    /// Current ISI cancellation mode
    pub fn isi_equalization(&mut self) -> Result<IsiEqualization, Error> {
        let conf: AntSelectConf = self.interface.read_register()?;
        Ok(conf.equalization)
    }

    /// Select which VCO calibration words come from VCO_CALIBR_IN*
    /// instead of the internal calibrator
    pub fn calibrate_vco(&mut self, amplitude: bool, frequency: bool) -> Result<(), Error> {
        self.interface.modify_register(|conf: &mut VcoConfig| {
            conf.external_amplitude = amplitude;
            conf.external_frequency = frequency;
        })?;
        Ok(())
    }

    /// Set the TX VCO amplitude calibration word, keeping the RX word
    pub fn set_tx_vco_amplitude_word(&mut self, value: u8) -> Result<(), Error> {
        self.interface
            .modify_register(|words: &mut VcoCalibrIn2| words.tx_amplitude = value & 0x0F)?;
        Ok(())
    }

    /// Set the RX VCO amplitude calibration word, keeping the TX word
    pub fn set_rx_vco_amplitude_word(&mut self, value: u8) -> Result<(), Error> {
        self.interface
            .modify_register(|words: &mut VcoCalibrIn2| words.rx_amplitude = value & 0x0F)?;
        Ok(())
    }

    /// Set the TX VCO frequency calibration word
    pub fn set_tx_vco_frequency_word(&mut self, value: u8) -> Result<(), Error> {
        self.interface.write_register(VcoCalibrIn1 {
            tx_frequency: value & 0x7F,
        })
    }

    /// Set the RX VCO frequency calibration word
    pub fn set_rx_vco_frequency_word(&mut self, value: u8) -> Result<(), Error> {
        self.interface.write_register(VcoCalibrIn0 {
            rx_frequency: value & 0x7F,
        })
    }

    /// Configure automatic frequency correction
    pub fn afc_init(&mut self, init: &AfcInit) -> Result<(), Error> {
        self.interface
            .modify_register(|afc: &mut Afc| init.apply(afc))?;
        Ok(())
    }

    /// Current AFC settings
    pub fn afc_info(&mut self) -> Result<AfcInit, Error> {
        let afc: Afc = self.interface.read_register()?;
        Ok(afc.into())
    }

    /// Configure symbol clock recovery
    pub fn clock_recovery_init(&mut self, init: &ClockRecoveryInit) -> Result<(), Error> {
        self.interface.write_register(ClockRecovery::from(*init))
    }

    /// Current symbol clock recovery settings
    pub fn clock_recovery_info(&mut self) -> Result<ClockRecoveryInit, Error> {
        let clock: ClockRecovery = self.interface.read_register()?;
        Ok(clock.into())
    }
}

fn address_of<R>() -> u8
where
    R: ReadableRegister<IdType = u8>,
{
    R::id()
}
