//! Stroke handling for the painting canvas

use glam::{IVec2, Vec3};
use tracing::debug;

use crate::types::{ContactId, PixelRect, Rgba};

use super::PaintingCanvas;

/// Pixel position and radius of a painted dab
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DabRecord {
    pub center: IVec2,
    pub radius: f32,
}

/// Per-contact stroke state
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StrokeState {
    /// Last dab of this contact, None until the first paint
    pub previous: Option<DabRecord>,
}

impl StrokeState {
    #[inline]
    pub fn reset(&mut self) {
        self.previous = None;
    }
}

impl PaintingCanvas {
    /// Start a new contact; its first dab is never connected to anything
    pub fn begin_contact(&mut self, contact: ContactId) {
        debug!("begin_contact: {:?}", contact);
        self.strokes.insert(contact, StrokeState::default());
    }

    /// Finish a contact and drop its stroke state
    ///
    /// Contacts that paint without a matching `end_contact` keep their state
    /// until [`resize`](Self::resize); hosts with short-lived contact ids
    /// should end them.
    pub fn end_contact(&mut self, contact: ContactId) {
        debug!("end_contact: {:?}", contact);
        self.strokes.remove(&contact);
    }

    /// Whether the contact has stroke state (begun or painted, not ended)
    pub fn is_contact_active(&self, contact: ContactId) -> bool {
        self.strokes.contains_key(&contact)
    }

    /// Last dab painted by a contact
    pub fn previous_dab(&self, contact: ContactId) -> Option<DabRecord> {
        self.strokes.get(&contact).and_then(|state| state.previous)
    }

    /// Paint one dab at a world-space point
    ///
    /// `size` is in surface units and scaled by the pixel density into a
    /// radius. When `allow_connect` is set, connecting is enabled and the
    /// contact already has a dab, the gap to it is filled too. Repeating the
    /// previous pixel and radius is a no-op and returns false; otherwise the
    /// buffer is committed and true is returned.
    ///
    /// Painting with an unknown contact begins it implicitly; its state
    /// lives until `end_contact`.
    pub fn paint(
        &mut self,
        contact: ContactId,
        point: Vec3,
        size: f32,
        color: Rgba,
        allow_connect: bool,
    ) -> bool {
        let center = self.frame.project(point, self.size()).as_ivec2();
        let radius = (size * self.density).max(0.0);
        let dab = DabRecord { center, radius };

        let previous = {
            let state = self.strokes.entry(contact).or_default();
            if state.previous == Some(dab) {
                debug!(
                    "paint: {:?} repeated ({}, {}) r={:.2}, skipping",
                    contact, center.x, center.y, radius
                );
                return false;
            }
            state.previous.replace(dab)
        };

        let mut region = self
            .strategy
            .stamp_dab(&mut self.buffer, center, radius, color);

        if allow_connect && self.config.connect_dots {
            if let Some(previous) = previous {
                let connector =
                    self.strategy
                        .connect(&mut self.buffer, previous.center, center, radius, color);
                region = PixelRect::merge(region, connector);
            }
        }

        debug!(
            "paint: {:?} at ({}, {}) r={:.2}, region={:?}",
            contact, center.x, center.y, radius, region
        );
        if let Some(region) = region {
            self.buffer.mark_dirty(region);
        }
        self.commit();
        true
    }
}
