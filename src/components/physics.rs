//! Simple kinematic body.
//!
//! Each tick the velocity is scaled by the friction multiplier and added to
//! the owning entity's position. Velocity only grows through
//! [`Physics::add_velocity`], which clamps every axis to the terminal
//! velocity.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::entity::Body;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Physics {
    velocity: Vec2,
    /// Per-axis speed limit in world units per tick.
    pub terminal_velocity: f32,
    /// Velocity multiplier applied every tick (1.0 = no friction).
    pub friction: f32,
}

impl Physics {
    pub fn new(terminal_velocity: f32, friction: f32) -> Self {
        Self {
            velocity: Vec2::ZERO,
            terminal_velocity: terminal_velocity.abs(),
            friction,
        }
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Add `delta` to the velocity, clamping each axis to the terminal velocity.
    pub fn add_velocity(&mut self, delta: Vec2) {
        let limit = Vec2::splat(self.terminal_velocity);
        self.velocity = (self.velocity + delta).clamp(-limit, limit);
    }

    pub fn stop(&mut self) {
        self.velocity = Vec2::ZERO;
    }

    pub fn update(&mut self, body: &mut Body) {
        self.velocity *= self.friction;
        body.position += self.velocity;
    }
}
