//! Static image component.
//!
//! Draws a whole image, or one region of it when a source rectangle is set,
//! at the entity's interpolated position projected through the camera.

use std::path::Path;

use crate::components::assetwatch::AssetWatch;
use crate::context::Context;
use crate::entity::Body;
use crate::resources::filetype::AssetKind;
use crate::resources::renderer::{DrawItem, SourceRect};

#[derive(Debug)]
pub struct Sprite {
    watch: AssetWatch,
    /// Texture atlas region; the whole image when `None`.
    pub source: Option<SourceRect>,
    pub scale: f32,
}

impl Sprite {
    pub fn new(ctx: &Context, resource: &str, path: impl AsRef<Path>) -> Self {
        Self {
            watch: AssetWatch::new(ctx, AssetKind::Image, resource, path),
            source: None,
            scale: 1.0,
        }
    }

    pub fn with_source(mut self, source: SourceRect) -> Self {
        self.source = Some(source);
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

    pub fn update(&mut self, ctx: &Context) {
        self.watch.settle(&ctx.bus);
    }

    pub fn draw(&self, body: &Body, alpha: f64, ctx: &Context) {
        if !self.watch.is_ready() {
            return;
        }
        let world = body.interpolated(alpha);
        ctx.renderer.queue(DrawItem {
            asset: self.watch.resource().to_string(),
            source: self.source,
            position: ctx.camera.to_screen_space(world.x, world.y),
            scale: self.scale,
        });
    }
}
