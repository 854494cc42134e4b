//! Display surface description.
//!
//! Holds the pixel dimensions the renderer clears and the camera maps onto.
//! Resizing publishes the new size on the `Display` channel.

use std::cell::Cell;

use log::info;
use serde_json::json;

use crate::events::bus::EventBus;
use crate::events::channels;

/// Label of the only drawing context the engine knows.
pub const CONTEXT_TYPE: &str = "canvas2d";

#[derive(Debug)]
pub struct Display {
    width: Cell<u32>,
    height: Cell<u32>,
    fullscreen: Cell<bool>,
}

impl Display {
    pub fn new(width: u32, height: u32, fullscreen: bool) -> Self {
        Self {
            width: Cell::new(width),
            height: Cell::new(height),
            fullscreen: Cell::new(fullscreen),
        }
    }

    pub fn width(&self) -> u32 {
        self.width.get()
    }

    pub fn height(&self) -> u32 {
        self.height.get()
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width.get(), self.height.get())
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen.get()
    }

    pub fn set_fullscreen(&self, fullscreen: bool) {
        self.fullscreen.set(fullscreen);
    }

    pub fn context_type(&self) -> &'static str {
        CONTEXT_TYPE
    }

    /// Change the surface size and announce it on the `Display` channel.
    pub fn resize(&self, bus: &EventBus, width: u32, height: u32) {
        self.width.set(width);
        self.height.set(height);
        info!("Display resized to {}x{}", width, height);
        bus.publish(
            channels::DISPLAY,
            Some(&json!({ "width": width, "height": height })),
        );
    }
}

impl Default for Display {
    fn default() -> Self {
        Self::new(1280, 720, false)
    }
}
