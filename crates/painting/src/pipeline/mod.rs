//! Per-surface painting canvas
//!
//! This module ties the painting pieces together for one physical surface:
//! - Contact points come in via `begin_contact`, `paint`, `end_contact`
//! - The surface frame projects them to pixels
//! - The paint strategy stamps dabs and connectors into the canvas buffer
//! - Dirty regions are handed to a presenter on every commit
//!
//! The canvas is single-threaded: callers serialize `paint` per surface.

mod stroke;
mod surface_ops;

use std::collections::HashMap;
use std::sync::Arc;

use glam::UVec2;
use inkseal_config::{CanvasConfig, PaintMethod};
use tracing::{debug, info};

use crate::brush::Brush;
use crate::projection::SurfaceFrame;
use crate::raster::PaintStrategy;
use crate::surface::CanvasBuffer;
use crate::types::{ContactId, PixelRect};
use crate::validation::{CanvasError, buffer_dimensions, pixel_density};

pub use stroke::{DabRecord, StrokeState};

/// Receives the buffer on every commit (texture upload, image export, ...)
pub trait CanvasSink {
    /// `dirty` is the region touched since the previous commit, None if the
    /// commit carried no pixel changes
    fn present(&mut self, buffer: &CanvasBuffer, dirty: Option<PixelRect>);
}

impl<F> CanvasSink for F
where
    F: FnMut(&CanvasBuffer, Option<PixelRect>),
{
    fn present(&mut self, buffer: &CanvasBuffer, dirty: Option<PixelRect>) {
        self(buffer, dirty)
    }
}

/// Drawing surface addressed through 3D contact points
pub struct PaintingCanvas {
    /// Pixel storage; recreated on resize
    pub(crate) buffer: CanvasBuffer,
    pub(crate) frame: SurfaceFrame,
    /// Pixels per surface unit, fixed for the buffer's lifetime
    pub(crate) density: f32,
    pub(crate) config: CanvasConfig,
    pub(crate) strategy: PaintStrategy,
    /// Mask used when the brush method is selected
    pub(crate) brush: Option<Arc<Brush>>,
    /// Previous dab per ongoing contact
    pub(crate) strokes: HashMap<ContactId, StrokeState>,
    pub(crate) sink: Option<Box<dyn CanvasSink>>,
    pub(crate) commits: u64,
}

impl PaintingCanvas {
    /// Create a canvas for `frame`
    ///
    /// Fails on degenerate surface geometry, invalid configuration, or when
    /// the brush method is configured without a brush.
    pub fn new(
        frame: SurfaceFrame,
        config: CanvasConfig,
        brush: Option<Arc<Brush>>,
    ) -> Result<Self, CanvasError> {
        config.validate()?;
        let strategy =
            PaintStrategy::from_method(config.paint_method, brush.clone(), config.brush_spacing)?;
        let (buffer, density) = Self::allocate(&frame, &config)?;

        info!(
            "PaintingCanvas::new: {}x{} buffer, density={:.3} px/unit, method={:?}",
            buffer.width, buffer.height, density, config.paint_method
        );

        Ok(Self {
            buffer,
            frame,
            density,
            config,
            strategy,
            brush,
            strokes: HashMap::new(),
            sink: None,
            commits: 0,
        })
    }

    /// Attach a presenter that receives every commit
    pub fn with_sink(mut self, sink: impl CanvasSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    pub fn set_sink(&mut self, sink: impl CanvasSink + 'static) {
        self.sink = Some(Box::new(sink));
    }

    fn allocate(
        frame: &SurfaceFrame,
        config: &CanvasConfig,
    ) -> Result<(CanvasBuffer, f32), CanvasError> {
        frame.validate()?;
        let physical = frame.physical_size();
        let dims = buffer_dimensions(physical, config.resolution)?;
        let buffer = CanvasBuffer::new(dims.x, dims.y, config.clear_color)?;
        let density = pixel_density(dims.x, physical.x);
        Ok((buffer, density))
    }

    /// Recreate the buffer for a new surface frame
    ///
    /// Previous pixels are discarded and every ongoing contact forgets its
    /// previous dab. On error the canvas keeps its old frame and buffer.
    pub fn resize(&mut self, frame: SurfaceFrame) -> Result<(), CanvasError> {
        let (buffer, density) = Self::allocate(&frame, &self.config)?;
        info!(
            "PaintingCanvas::resize: {}x{} -> {}x{}",
            self.buffer.width, self.buffer.height, buffer.width, buffer.height
        );

        self.buffer = buffer;
        self.frame = frame;
        self.density = density;
        self.strokes.clear();
        self.buffer.mark_all_dirty();
        self.commit();
        Ok(())
    }

    /// Switch the rasterization method between strokes
    pub fn set_paint_method(&mut self, method: PaintMethod) -> Result<(), CanvasError> {
        self.strategy =
            PaintStrategy::from_method(method, self.brush.clone(), self.config.brush_spacing)?;
        self.config.paint_method = method;
        info!("PaintingCanvas: paint method set to {:?}", method);
        Ok(())
    }

    /// Replace the brush mask; takes effect immediately if the brush method
    /// is active
    pub fn set_brush(&mut self, brush: Arc<Brush>) {
        debug!(
            "PaintingCanvas::set_brush: {}x{} mask",
            brush.width(),
            brush.height()
        );
        self.brush = Some(brush.clone());
        if let PaintStrategy::Brush { spacing, .. } = self.strategy {
            self.strategy = PaintStrategy::Brush { brush, spacing };
        }
    }

    #[inline]
    pub fn paint_method(&self) -> PaintMethod {
        self.strategy.method()
    }

    #[inline]
    pub fn buffer(&self) -> &CanvasBuffer {
        &self.buffer
    }

    #[inline]
    pub fn frame(&self) -> &SurfaceFrame {
        &self.frame
    }

    #[inline]
    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    /// Pixels per surface unit
    #[inline]
    pub fn density(&self) -> f32 {
        self.density
    }

    #[inline]
    pub fn size(&self) -> UVec2 {
        UVec2::new(self.buffer.width, self.buffer.height)
    }

    /// Number of commits pushed so far
    #[inline]
    pub fn commit_count(&self) -> u64 {
        self.commits
    }
}
