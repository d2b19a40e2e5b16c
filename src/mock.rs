//! In-memory register file used by the unit tests

use embedded_hal::delay::DelayNs;
use regiface::Command;

use crate::registers::State;
use crate::{Error, Interface};

const MC_STATE1: usize = 0x8D;
const MC_STATE0: usize = 0x8E;
const CMD_READY: u8 = 0x62;
const CMD_STANDBY: u8 = 0x63;

/// 256 byte register file that follows READY/STANDBY strobes
pub struct MockInterface {
    pub regs: [u8; 256],
    /// Command strobes received, in order
    pub commands: Vec<u8>,
    /// Ignore strobes, leaving MC_STATE untouched
    pub stuck: bool,
    /// Number of reads starting at MC_STATE1
    pub status_reads: usize,
}

impl MockInterface {
    pub fn new() -> Self {
        let mut mock = Self {
            regs: [0; 256],
            commands: Vec::new(),
            stuck: false,
            status_reads: 0,
        };
        mock.set_state(State::Ready);
        mock
    }

    /// Report `state` in MC_STATE0 with the crystal on
    pub fn set_state(&mut self, state: State) {
        self.regs[MC_STATE0] = (state.code() << 1) | 0x01;
    }
}

impl Interface for MockInterface {
    fn read_regs(&mut self, address: u8, data: &mut [u8]) -> Result<(), Error> {
        let start = address as usize;
        if start == MC_STATE1 {
            self.status_reads += 1;
        }
        data.copy_from_slice(&self.regs[start..start + data.len()]);
        Ok(())
    }

    fn write_regs(&mut self, address: u8, data: &[u8]) -> Result<(), Error> {
        let start = address as usize;
        self.regs[start..start + data.len()].copy_from_slice(data);
        Ok(())
    }

    fn send_command<C>(&mut self, _command: C) -> Result<(), Error>
    where
        C: Command<IdType = u8>,
    {
        let id = C::id();
        self.commands.push(id);

        if !self.stuck {
            match id {
                CMD_READY => self.set_state(State::Ready),
                CMD_STANDBY => self.set_state(State::Standby),
                _ => {}
            }
        }
        Ok(())
    }
}

/// Delay provider that returns immediately
pub struct NoopDelay;

impl DelayNs for NoopDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}
