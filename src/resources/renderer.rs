//! Batched draw queue.
//!
//! Render components queue [`DrawItem`]s during the draw pass. At the end of
//! the pass [`Renderer::flush`] clears the surface once and hands every asset's
//! items to the [`DrawBackend`] as one batch, assets in first-queued order.
//! The backend is the only part that touches an actual drawing API.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use log::debug;

use crate::resources::display::Display;
use crate::resources::loader::ImageAsset;
use crate::resources::resourcestore::ResourceStore;

/// Region of a texture, in source pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl SourceRect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }
}

/// One queued image draw.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    /// Resource name of the image.
    pub asset: String,
    /// Part of the image to draw; the whole image when `None`.
    pub source: Option<SourceRect>,
    /// Destination in screen pixels.
    pub position: Vec2,
    pub scale: f32,
}

/// Drawing API the renderer forwards batches to.
pub trait DrawBackend {
    fn clear(&mut self, width: u32, height: u32);
    fn draw_batch(&mut self, asset: &str, image: &ImageAsset, items: &[DrawItem]);
}

/// Backend that discards everything. Used when running headless.
#[derive(Debug, Default)]
pub struct NullBackend;

impl DrawBackend for NullBackend {
    fn clear(&mut self, _width: u32, _height: u32) {}
    fn draw_batch(&mut self, _asset: &str, _image: &ImageAsset, _items: &[DrawItem]) {}
}

/// What a [`RecordingBackend`] saw.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Clear { width: u32, height: u32 },
    Batch { asset: String, items: Vec<DrawItem> },
}

/// Backend that records every call into a shared log.
pub struct RecordingBackend {
    calls: Rc<RefCell<Vec<DrawCall>>>,
}

impl RecordingBackend {
    /// Returns the backend and a handle to its call log.
    pub fn new() -> (Self, Rc<RefCell<Vec<DrawCall>>>) {
        let calls: Rc<RefCell<Vec<DrawCall>>> = Rc::default();
        (
            Self {
                calls: Rc::clone(&calls),
            },
            calls,
        )
    }
}

impl DrawBackend for RecordingBackend {
    fn clear(&mut self, width: u32, height: u32) {
        self.calls.borrow_mut().push(DrawCall::Clear { width, height });
    }

    fn draw_batch(&mut self, asset: &str, _image: &ImageAsset, items: &[DrawItem]) {
        self.calls.borrow_mut().push(DrawCall::Batch {
            asset: asset.to_string(),
            items: items.to_vec(),
        });
    }
}

pub struct Renderer {
    queue: RefCell<Vec<DrawItem>>,
    backend: RefCell<Box<dyn DrawBackend>>,
}

impl Renderer {
    pub fn new(backend: Box<dyn DrawBackend>) -> Self {
        Self {
            queue: RefCell::new(Vec::new()),
            backend: RefCell::new(backend),
        }
    }

    pub fn queue(&self, item: DrawItem) {
        self.queue.borrow_mut().push(item);
    }

    pub fn queued(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Clear the surface and draw everything queued since the last flush.
    ///
    /// Items whose image is not an available image resource are dropped.
    pub fn flush(&self, resources: &ResourceStore, display: &Display) {
        let items = std::mem::take(&mut *self.queue.borrow_mut());

        let mut batches: Vec<(String, Vec<DrawItem>)> = Vec::new();
        for item in items {
            match batches.iter_mut().find(|(asset, _)| *asset == item.asset) {
                Some((_, batch)) => batch.push(item),
                None => batches.push((item.asset.clone(), vec![item])),
            }
        }

        let mut backend = self.backend.borrow_mut();
        backend.clear(display.width(), display.height());
        for (asset, batch) in &batches {
            let Ok(payload) = resources.request(asset) else {
                continue;
            };
            match payload.as_image() {
                Some(image) => backend.draw_batch(asset, image, batch),
                None => debug!("Renderer: '{}' is not an image, skipping", asset),
            }
        }
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(Box::new(NullBackend))
    }
}
