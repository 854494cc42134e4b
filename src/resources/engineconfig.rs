//! Engine configuration.
//!
//! Settings loaded from an INI configuration file. Provides defaults for a
//! safe startup and methods to load/save the configuration.
//!
//! # Configuration File Format
//!
//! ```ini
//! [simulation]
//! tick_rate_ms = 50
//! max_ticks_per_frame = 0
//!
//! [display]
//! width = 1280
//! height = 720
//! fullscreen = false
//! target_fps = 60
//!
//! [debug]
//! enabled = false
//!
//! [assets]
//! root = ./assets
//! keybinds = keybinds.json
//! ```

use configparser::ini::Ini;
use log::{info, warn};
use std::path::PathBuf;

use crate::systems::timestep::DEFAULT_TICK_RATE_MS;

const DEFAULT_MAX_TICKS_PER_FRAME: u32 = 0;
const DEFAULT_DISPLAY_WIDTH: u32 = 1280;
const DEFAULT_DISPLAY_HEIGHT: u32 = 720;
const DEFAULT_FULLSCREEN: bool = false;
const DEFAULT_TARGET_FPS: u32 = 60;
const DEFAULT_DEBUG: bool = false;
const DEFAULT_ASSET_ROOT: &str = "./assets";
const DEFAULT_KEYBINDS: &str = "keybinds.json";
const DEFAULT_CONFIG_PATH: &str = "./frosting.ini";

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Length of one simulation tick in milliseconds.
    pub tick_rate_ms: f64,
    /// Catch-up limit per frame; 0 means unbounded.
    pub max_ticks_per_frame: u32,
    pub display_width: u32,
    pub display_height: u32,
    pub fullscreen: bool,
    /// Frame rate of the real-time frame loop.
    pub target_fps: u32,
    /// Engine diagnostics on/off.
    pub debug: bool,
    pub asset_root: PathBuf,
    /// Keybinding file, relative to `asset_root`.
    pub keybinds: String,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Unsigned value that fits in a `u32`; anything else counts as missing.
fn get_u32(config: &Ini, section: &str, key: &str) -> Option<u32> {
    let value = config.getuint(section, key).ok().flatten()?;
    match u32::try_from(value) {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Config: [{}] {} = {} is out of range, ignored", section, key, value);
            None
        }
    }
}

impl EngineConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            tick_rate_ms: DEFAULT_TICK_RATE_MS,
            max_ticks_per_frame: DEFAULT_MAX_TICKS_PER_FRAME,
            display_width: DEFAULT_DISPLAY_WIDTH,
            display_height: DEFAULT_DISPLAY_HEIGHT,
            fullscreen: DEFAULT_FULLSCREEN,
            target_fps: DEFAULT_TARGET_FPS,
            debug: DEFAULT_DEBUG,
            asset_root: PathBuf::from(DEFAULT_ASSET_ROOT),
            keybinds: DEFAULT_KEYBINDS.to_string(),
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file.
    ///
    /// Missing or malformed values retain their current values. A tick rate
    /// that is not strictly positive is ignored.
    pub fn load_from_file(&mut self) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| format!("Failed to load config file: {}", e))?;

        // [simulation] section
        if let Some(rate) = config.getfloat("simulation", "tick_rate_ms").ok().flatten() {
            if rate > 0.0 {
                self.tick_rate_ms = rate;
            }
        }
        if let Some(max) = get_u32(&config, "simulation", "max_ticks_per_frame") {
            self.max_ticks_per_frame = max;
        }

        // [display] section
        if let Some(width) = get_u32(&config, "display", "width") {
            self.display_width = width;
        }
        if let Some(height) = get_u32(&config, "display", "height") {
            self.display_height = height;
        }
        if let Some(fullscreen) = config.getbool("display", "fullscreen").ok().flatten() {
            self.fullscreen = fullscreen;
        }
        if let Some(fps) = get_u32(&config, "display", "target_fps") {
            if fps > 0 {
                self.target_fps = fps;
            }
        }

        // [debug] section
        if let Some(enabled) = config.getbool("debug", "enabled").ok().flatten() {
            self.debug = enabled;
        }

        // [assets] section
        if let Some(root) = config.get("assets", "root") {
            self.asset_root = PathBuf::from(root);
        }
        if let Some(keybinds) = config.get("assets", "keybinds") {
            self.keybinds = keybinds;
        }

        info!(
            "Loaded config: tick={}ms max_ticks={} display={}x{} fullscreen={} fps={} debug={} assets={:?}",
            self.tick_rate_ms,
            self.max_ticks_per_frame,
            self.display_width,
            self.display_height,
            self.fullscreen,
            self.target_fps,
            self.debug,
            self.asset_root
        );

        Ok(())
    }

    /// Save configuration to the INI file.
    ///
    /// Creates the file if it doesn't exist.
    pub fn save_to_file(&self) -> Result<(), String> {
        let mut config = Ini::new();

        config.set("simulation", "tick_rate_ms", Some(self.tick_rate_ms.to_string()));
        config.set(
            "simulation",
            "max_ticks_per_frame",
            Some(self.max_ticks_per_frame.to_string()),
        );

        config.set("display", "width", Some(self.display_width.to_string()));
        config.set("display", "height", Some(self.display_height.to_string()));
        config.set("display", "fullscreen", Some(self.fullscreen.to_string()));
        config.set("display", "target_fps", Some(self.target_fps.to_string()));

        config.set("debug", "enabled", Some(self.debug.to_string()));

        config.set(
            "assets",
            "root",
            Some(self.asset_root.to_string_lossy().into_owned()),
        );
        config.set("assets", "keybinds", Some(self.keybinds.clone()));

        config
            .write(&self.config_path)
            .map_err(|e| format!("Failed to save config file: {}", e))?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }

    /// Full path of the keybinding file.
    pub fn keybinds_path(&self) -> PathBuf {
        self.asset_root.join(&self.keybinds)
    }

    pub fn display_size(&self) -> (u32, u32) {
        (self.display_width, self.display_height)
    }
}
