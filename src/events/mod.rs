//! Event bus, channel names and the observers listening on them.
//!
//! Submodules:
//! - [`bus`] – the publish/subscribe registry every subsystem talks through
//! - [`channels`] – well-known channel names and the resource channel format
//! - [`input`] – key transitions reported by the host
//! - [`switchdebug`] – toggle engine diagnostics on/off from the bus

pub mod bus;
pub mod channels;
pub mod input;
pub mod switchdebug;
