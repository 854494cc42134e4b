//! Sprite-sheet animation component.
//!
//! Frames are laid out left to right in a single row. The animation moves
//! to the next frame every `ticks_per_frame` simulation ticks. A looped
//! animation wraps around; a one-shot one holds its last frame and reports
//! [`Animation::finished`].

use std::path::Path;

use glam::Vec2;

use crate::components::assetwatch::AssetWatch;
use crate::context::Context;
use crate::entity::Body;
use crate::resources::filetype::AssetKind;
use crate::resources::renderer::{DrawItem, SourceRect};

#[derive(Debug)]
pub struct Animation {
    watch: AssetWatch,
    pub frame_size: Vec2,
    pub frame_count: u32,
    pub ticks_per_frame: u32,
    pub looped: bool,
    pub scale: f32,
    frame: u32,
    tick_counter: u32,
    finished: bool,
}

impl Animation {
    pub fn new(
        ctx: &Context,
        resource: &str,
        path: impl AsRef<Path>,
        frame_size: Vec2,
        frame_count: u32,
    ) -> Self {
        Self {
            watch: AssetWatch::new(ctx, AssetKind::Image, resource, path),
            frame_size,
            frame_count: frame_count.max(1),
            ticks_per_frame: 1,
            looped: true,
            scale: 1.0,
            frame: 0,
            tick_counter: 0,
            finished: false,
        }
    }

    pub fn with_ticks_per_frame(mut self, ticks: u32) -> Self {
        self.ticks_per_frame = ticks.max(1);
        self
    }

    pub fn with_looped(mut self, looped: bool) -> Self {
        self.looped = looped;
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn resource(&self) -> &str {
        self.watch.resource()
    }

    pub fn is_loaded(&self) -> bool {
        self.watch.is_ready()
    }

    pub fn watch(&self) -> &AssetWatch {
        &self.watch
    }

    pub fn watch_mut(&mut self) -> &mut AssetWatch {
        &mut self.watch
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }

    pub fn finished(&self) -> bool {
        self.finished
    }

    /// Restart from the first frame.
    pub fn reset(&mut self) {
        self.frame = 0;
        self.tick_counter = 0;
        self.finished = false;
    }

    /// Region of the sheet holding the current frame.
    pub fn source_rect(&self) -> SourceRect {
        SourceRect::new(
            self.frame as f32 * self.frame_size.x,
            0.0,
            self.frame_size.x,
            self.frame_size.y,
        )
    }

    pub fn update(&mut self, ctx: &Context) {
        self.watch.settle(&ctx.bus);
        if self.watch.is_ready() {
            self.advance();
        }
    }

    /// Count one tick and step the frame when due.
    pub fn advance(&mut self) {
        if self.finished {
            return;
        }
        self.tick_counter += 1;
        if self.tick_counter < self.ticks_per_frame {
            return;
        }
        self.tick_counter = 0;

        if self.frame + 1 < self.frame_count {
            self.frame += 1;
        } else if self.looped {
            self.frame = 0;
        } else {
            self.finished = true;
        }
    }

    pub fn draw(&self, body: &Body, alpha: f64, ctx: &Context) {
        if !self.watch.is_ready() {
            return;
        }
        let world = body.interpolated(alpha);
        ctx.renderer.queue(DrawItem {
            asset: self.watch.resource().to_string(),
            source: Some(self.source_rect()),
            position: ctx.camera.to_screen_space(world.x, world.y),
            scale: self.scale,
        });
    }
}
