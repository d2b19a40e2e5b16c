//! Register definitions for the S2-LP radio
//! Taken from the S2-LP datasheet (DocID028965) register map.
//!
//! Registers that share a byte with fields this driver does not interpret keep the
//! remaining bits in a `reserved` field, so a read-modify-write never clobbers them.

pub mod modem;
pub mod pa;
pub mod status;
pub mod synth;

pub use modem::*;
pub use pa::*;
pub use status::*;
pub use synth::*;
