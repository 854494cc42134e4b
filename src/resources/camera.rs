//! Shared 2D camera.
//!
//! The world is measured in camera units: 160 across and 90 down. The camera
//! maps those onto the display's pixels and follows display resizes through
//! the `Display` channel.

use std::cell::Cell;
use std::rc::{Rc, Weak};

use glam::Vec2;

use crate::events::bus::{EventBus, SubscriptionId};
use crate::events::channels;

/// Camera units on the x axis.
pub const CAMERA_WIDTH: f32 = 160.0;
/// Camera units on the y axis.
pub const CAMERA_HEIGHT: f32 = 90.0;

#[derive(Debug)]
pub struct Camera {
    pixels_per_unit: Cell<Vec2>,
}

impl Camera {
    pub fn new(display_width: u32, display_height: u32) -> Self {
        let camera = Self {
            pixels_per_unit: Cell::new(Vec2::ZERO),
        };
        camera.update_coordinates(display_width, display_height);
        camera
    }

    /// Recompute the pixel scale for a display of the given size.
    pub fn update_coordinates(&self, display_width: u32, display_height: u32) {
        self.pixels_per_unit.set(Vec2::new(
            display_width as f32 / CAMERA_WIDTH,
            display_height as f32 / CAMERA_HEIGHT,
        ));
    }

    pub fn pixels_per_unit(&self) -> Vec2 {
        self.pixels_per_unit.get()
    }

    pub fn width(&self) -> f32 {
        CAMERA_WIDTH
    }

    pub fn height(&self) -> f32 {
        CAMERA_HEIGHT
    }

    /// World position to screen pixels.
    pub fn to_screen_space(&self, x: f32, y: f32) -> Vec2 {
        Vec2::new(x, y) * self.pixels_per_unit.get()
    }

    /// Screen pixels to world position, rounded to whole units.
    pub fn to_world_space(&self, x: f32, y: f32) -> Vec2 {
        (Vec2::new(x, y) / self.pixels_per_unit.get()).round()
    }

    /// Follow `Display` resize announcements.
    pub fn observe_display(self: &Rc<Self>, bus: &EventBus) -> SubscriptionId {
        let camera: Weak<Camera> = Rc::downgrade(self);
        bus.subscribe(
            channels::DISPLAY,
            move |data, _| {
                let (Some(camera), Some(data)) = (camera.upgrade(), data) else {
                    return;
                };
                let width = data["width"].as_u64();
                let height = data["height"].as_u64();
                if let (Some(width), Some(height)) = (width, height) {
                    camera.update_coordinates(width as u32, height as u32);
                }
            },
            None,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::display::Display;

    const EPSILON: f32 = 1e-4;

    fn approx_eq(a: Vec2, b: Vec2) -> bool {
        (a - b).abs().max_element() < EPSILON
    }

    #[test]
    fn test_screen_and_world_space() {
        let camera = Camera::new(1600, 900);
        assert!(approx_eq(camera.pixels_per_unit(), Vec2::new(10.0, 10.0)));
        assert!(approx_eq(camera.to_screen_space(8.0, 4.5), Vec2::new(80.0, 45.0)));
        assert!(approx_eq(camera.to_world_space(84.0, 46.0), Vec2::new(8.0, 5.0)));
    }

    #[test]
    fn test_follows_display_resize() {
        let bus = EventBus::new();
        let display = Display::new(1600, 900, false);
        let camera = Rc::new(Camera::new(display.width(), display.height()));
        camera.observe_display(&bus);

        display.resize(&bus, 320, 180);
        assert!(approx_eq(camera.pixels_per_unit(), Vec2::new(2.0, 2.0)));
    }
}
