//! Engine systems.
//!
//! Submodules overview
//! - [`frame`] – frame sources that call the scheduler (manual and real-time)
//! - [`scheduler`] – run lifecycle state machine driving the world
//! - [`timestep`] – fixed-timestep accumulator with catch-up and interpolation

pub mod frame;
pub mod scheduler;
pub mod timestep;
