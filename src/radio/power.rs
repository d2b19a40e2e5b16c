//! Power amplifier control
//!
//! Output power is set per PA level in 0.5 dB steps: register value `29 - 2 * dBm`,
//! with any request above 14 dBm mapped to the maximum (register value 1).

use embedded_hal::delay::DelayNs;

use super::Radio;
use crate::interface::Interface;
use crate::registers::{pa_level_address, PaPower0, PaRamping, MAX_PA_LEVEL_INDEX};
use crate::Error;

/// Highest output power reachable through the PA levels, in dBm
pub const PA_UPPER_LIMIT_DBM: i32 = 14;

/// Lowest output power the register mapping represents, in dBm
pub const PA_LOWER_LIMIT_DBM: i32 = -31;

fn dbm_to_reg(dbm: i32) -> u8 {
    if dbm > PA_UPPER_LIMIT_DBM {
        1
    } else {
        (29 - 2 * dbm.max(PA_LOWER_LIMIT_DBM)) as u8
    }
}

fn reg_to_dbm(reg: u8) -> i32 {
    (29 - reg as i32) / 2
}

impl<I, D> Radio<I, D>
where
    I: Interface,
    D: DelayNs,
{
    /// Drive the PA at its maximum output, ignoring the selected level
    pub fn set_max_pa_level(&mut self, enabled: bool) -> Result<(), Error> {
        self.interface
            .modify_register(|power: &mut PaPower0| power.max_dbm = enabled)?;
        Ok(())
    }

    /// Set PA level `index` (0 to 7) to `dbm`.
    ///
    /// # Errors
    /// * `Error::InvalidParameter` - `index` is past the last PA level
    pub fn set_pa_level_dbm(&mut self, index: u8, dbm: i32) -> Result<(), Error> {
        let address = pa_level_address(index).ok_or(Error::InvalidParameter)?;
        self.interface.write_reg(address, dbm_to_reg(dbm))
    }

    /// Output power of PA level `index` in dBm.
    ///
    /// A value above 14 dBm means the output stage is off.
    ///
    /// # Errors
    /// * `Error::InvalidParameter` - `index` is past the last PA level
    pub fn pa_level_dbm(&mut self, index: u8) -> Result<i32, Error> {
        let address = pa_level_address(index).ok_or(Error::InvalidParameter)?;
        Ok(reg_to_dbm(self.interface.read_reg(address)?))
    }

    /// Select the PA level used for transmission, or the last one ramped to
    ///
    /// # Errors
    /// * `Error::InvalidParameter` - `index` is past the last PA level
    pub fn set_pa_level_max_index(&mut self, index: u8) -> Result<(), Error> {
        if index > MAX_PA_LEVEL_INDEX {
            return Err(Error::InvalidParameter);
        }
        self.interface
            .modify_register(|power: &mut PaPower0| power.level_max_index = index)?;
        Ok(())
    }

    /// PA level selected for transmission
    pub fn pa_level_max_index(&mut self) -> Result<u8, Error> {
        let power: PaPower0 = self.interface.read_register()?;
        Ok(power.level_max_index)
    }

    /// Let the FIR filter shape the PA ramp.
    ///
    /// Enabling clears max dBm and manual ramping; disabling only turns the FIR off.
    pub fn set_auto_ramping(&mut self, enabled: bool) -> Result<(), Error> {
        self.interface.modify_register(|ramp: &mut PaRamping| {
            if enabled {
                ramp.power.max_dbm = false;
                ramp.power.ramp_enabled = false;
            }
            ramp.fir_enabled = enabled;
        })?;
        Ok(())
    }

    /// Step through PA levels 0 to `pa_level_max_index` when the PA turns on.
    ///
    /// Enabling clears max dBm and the FIR filter; disabling only stops the ramp.
    pub fn set_manual_ramping(&mut self, enabled: bool) -> Result<(), Error> {
        self.interface.modify_register(|ramp: &mut PaRamping| {
            if enabled {
                ramp.power.max_dbm = false;
                ramp.fir_enabled = false;
            }
            ramp.power.ramp_enabled = enabled;
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockInterface, NoopDelay};
    use crate::radio::Config;

    fn radio() -> Radio<MockInterface, NoopDelay> {
        Radio::new(MockInterface::new(), NoopDelay, Config::default())
    }

    #[test]
    fn dbm_mapping() {
        assert_eq!(dbm_to_reg(14), 1);
        assert_eq!(dbm_to_reg(15), 1);
        assert_eq!(dbm_to_reg(10), 9);
        assert_eq!(dbm_to_reg(0), 29);
        assert_eq!(dbm_to_reg(-31), 91);
        assert_eq!(dbm_to_reg(-100), 91);
        assert_eq!(reg_to_dbm(9), 10);
        assert_eq!(reg_to_dbm(1), 14);
    }

    #[test]
    fn pa_level_round_trip() {
        let mut radio = radio();
        for dbm in -31..=14 {
            radio.set_pa_level_dbm(3, dbm).unwrap();
            assert_eq!(radio.pa_level_dbm(3).unwrap(), dbm);
        }

        radio.set_pa_level_dbm(0, 10).unwrap();
        radio.set_pa_level_dbm(7, 12).unwrap();
        assert_eq!(radio.interface().regs[0x61], 9);
        assert_eq!(radio.interface().regs[0x5A], 5);
    }

    #[test]
    fn pa_index_out_of_range_is_rejected() {
        let mut radio = radio();
        assert_eq!(radio.set_pa_level_dbm(8, 0), Err(Error::InvalidParameter));
        assert_eq!(radio.pa_level_dbm(8), Err(Error::InvalidParameter));
        assert_eq!(radio.set_pa_level_max_index(8), Err(Error::InvalidParameter));
        assert_eq!(radio.interface().regs[0x62], 0);
    }

    #[test]
    fn max_index_keeps_other_power0_bits() {
        let mut radio = radio();
        radio.interface().regs[0x62] = 0xC0;

        radio.set_pa_level_max_index(5).unwrap();
        assert_eq!(radio.interface().regs[0x62], 0xC5);
        assert_eq!(radio.pa_level_max_index().unwrap(), 5);

        radio.set_max_pa_level(false).unwrap();
        assert_eq!(radio.interface().regs[0x62], 0x85);
    }

    #[test]
    fn ramping_modes() {
        let mut radio = radio();
        radio.interface().regs[0x62] = 0x60;

        radio.set_auto_ramping(true).unwrap();
        assert_eq!(radio.interface().regs[0x62], 0x00);
        assert_eq!(radio.interface().regs[0x63], 0x02);

        radio.set_manual_ramping(true).unwrap();
        assert_eq!(radio.interface().regs[0x62], 0x20);
        assert_eq!(radio.interface().regs[0x63], 0x00);

        radio.set_manual_ramping(false).unwrap();
        assert_eq!(radio.interface().regs[0x62], 0x00);
    }
}
