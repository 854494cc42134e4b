//! Frosting engine simulation core.
//!
//! A small real-time core for 2D entity games: an event bus, an
//! asynchronous resource store, a registry of component-based entities and a
//! fixed-timestep scheduler, all shared through an explicit
//! [`Context`](context::Context).

pub mod components;
pub mod context;
pub mod entity;
pub mod error;
pub mod events;
pub mod game;
pub mod math;
pub mod resources;
pub mod systems;
pub mod world;
