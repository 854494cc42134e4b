//! Debug toggle resource.
//!
//! When disabled the engine runs silently: the global `log` level is lowered
//! to `Off`. Enabling it raises the level again so diagnostics (missing
//! resources, rejected actions, failed loads) reach the installed logger.

use std::cell::Cell;

use log::LevelFilter;

/// Runtime debug flag shared through the engine context.
#[derive(Debug)]
pub struct DebugMode {
    enabled: Cell<bool>,
}

impl DebugMode {
    /// Create the flag. The global log level is left alone until
    /// [`apply_log_level`](Self::apply_log_level) or a switch.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: Cell::new(enabled),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    /// Log level matching the flag.
    pub fn level_filter(&self) -> LevelFilter {
        level_for(self.enabled.get())
    }

    /// Push the flag onto the process-wide `log` level.
    pub fn apply_log_level(&self) {
        log::set_max_level(self.level_filter());
    }

    pub fn set(&self, enabled: bool) {
        if self.enabled.replace(enabled) != enabled {
            self.apply_log_level();
            log::info!("Debug mode {}", if enabled { "enabled" } else { "disabled" });
        }
    }

    /// Flip the flag and return the new value.
    pub fn toggle(&self) -> bool {
        let enabled = !self.enabled.get();
        self.set(enabled);
        enabled
    }
}

fn level_for(enabled: bool) -> LevelFilter {
    if enabled {
        LevelFilter::Debug
    } else {
        LevelFilter::Off
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_and_set() {
        let debug = DebugMode::new(false);
        assert!(!debug.is_enabled());
        assert!(debug.toggle());
        assert!(debug.is_enabled());
        debug.set(true);
        assert!(debug.is_enabled());
        assert!(!debug.toggle());
    }

    #[test]
    fn test_level_filter_follows_flag() {
        assert_eq!(DebugMode::new(true).level_filter(), LevelFilter::Debug);
        assert_eq!(DebugMode::new(false).level_filter(), LevelFilter::Off);
    }
}
