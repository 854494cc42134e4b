//! Long-lived engine services.
//!
//! Overview
//! - `camera` – world/screen transform over a 160×90 unit view
//! - `debugmode` – runtime switch for engine diagnostics
//! - `display` – drawing surface size, announces resizes
//! - `engineconfig` – INI-backed engine settings
//! - `filetype` – asset classification by file extension
//! - `input` – pressed state of keyboard keys
//! - `loader` – background thread that reads and decodes assets
//! - `performance` – named metrics fed over the bus
//! - `renderer` – per-asset batched draw queue and drawing backends
//! - `resourcestore` – named assets, load events and preload barrier
pub mod camera;
pub mod debugmode;
pub mod display;
pub mod engineconfig;
pub mod filetype;
pub mod input;
pub mod loader;
pub mod performance;
pub mod renderer;
pub mod resourcestore;
