//! Surface operations for the painting canvas

use image::RgbaImage;
use tracing::debug;

use crate::surface::CanvasSnapshot;
use crate::types::{PixelRect, Rgba};

use super::PaintingCanvas;

impl PaintingCanvas {
    /// Push the buffer to the presenter
    ///
    /// Returns the dirty region carried by this commit.
    pub fn commit(&mut self) -> Option<PixelRect> {
        let dirty = self.buffer.take_dirty_region();
        if let Some(sink) = self.sink.as_mut() {
            sink.present(&self.buffer, dirty);
        }
        self.commits += 1;
        debug!("commit #{}: dirty={:?}", self.commits, dirty);
        dirty
    }

    /// Reset every pixel to the clear color
    ///
    /// Ongoing contacts forget their previous dab so the next paint is not
    /// skipped or connected across the clear.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.strokes.values_mut().for_each(|state| state.reset());
        self.commit();
    }

    /// Seed the canvas with every non-transparent pixel of `overlay`
    pub fn apply_template(&mut self, overlay: &RgbaImage) {
        self.buffer.apply_template(overlay);
        self.commit();
    }

    /// Read-only copy of the pixels for classification
    pub fn snapshot(&self) -> CanvasSnapshot {
        self.buffer.snapshot()
    }

    /// Raw pixel bytes (RGBA8, row-major) for a full texture upload
    pub fn as_bytes(&self) -> &[u8] {
        self.buffer.as_bytes()
    }

    /// Returns None if coordinates are out of bounds
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        self.buffer.get_pixel(x, y)
    }
}
