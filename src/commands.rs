//! Command strobes
//!
//! The S2-LP is driven through one byte command strobes sent with the `0x80` header.
//! They take no parameters; completion is observed by polling the main controller
//! state ([`McState`](crate::registers::McState)).
//!
//! Only the strobes used by the RF configuration sequence are defined here:
//! - [`Ready`]: move to READY (crystal on, digital core clocked)
//! - [`Standby`]: move to STANDBY (crystal on, digital core unclocked)

use regiface::{Command, NoParameters};

/// READY command (0x62)
///
/// Moves the main controller to READY. Issued from STANDBY, SLEEP or after
/// SABORT. Register reads and writes are possible once READY is reached.
#[derive(Debug, Clone, Copy)]
pub struct Ready;

impl Command for Ready {
    type IdType = u8;
    type CommandParameters = NoParameters;
    type ResponseParameters = NoParameters;

    fn id() -> Self::IdType {
        0x62
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        NoParameters::default()
    }
}

/// STANDBY command (0x63)
///
/// Moves the main controller to STANDBY. Only valid from READY.
///
/// # Important Notes
/// - The digital clock divider (PD_CLKDIV) may only be changed in STANDBY
#[derive(Debug, Clone, Copy)]
pub struct Standby;

impl Command for Standby {
    type IdType = u8;
    type CommandParameters = NoParameters;
    type ResponseParameters = NoParameters;

    fn id() -> Self::IdType {
        0x63
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        NoParameters::default()
    }
}
