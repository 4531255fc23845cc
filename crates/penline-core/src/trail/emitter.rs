use glam::Vec2;
use tracing::trace;

use super::store::PointStore;

/// Turns viewport-space input samples into document-space trail points.
///
/// Keeps the last pointer position seen in the viewport and the current
/// scroll offset, so that scrolling under a resting pointer still extends the
/// trail across the document.
#[derive(Debug, Clone)]
pub struct Emitter {
    min_distance: f32,
    last_viewport: Option<Vec2>,
    scroll: Vec2,
}

impl Emitter {
    pub fn new(min_distance: f32) -> Self {
        Self {
            min_distance: min_distance.max(0.0),
            last_viewport: None,
            scroll: Vec2::ZERO,
        }
    }

    pub fn min_distance(&self) -> f32 {
        self.min_distance
    }

    pub fn scroll(&self) -> Vec2 {
        self.scroll
    }

    pub fn last_viewport(&self) -> Option<Vec2> {
        self.last_viewport
    }

    /// Pointer or first-touch movement at `viewport` position.
    pub fn pointer_moved(&mut self, viewport: Vec2, store: &mut PointStore) -> bool {
        if !viewport.is_finite() {
            return false;
        }
        self.last_viewport = Some(viewport);
        self.sample(viewport + self.scroll, store)
    }

    /// Document scrolled to `offset`; re-emits under the resting pointer.
    pub fn scrolled(&mut self, offset: Vec2, store: &mut PointStore) -> bool {
        if !offset.is_finite() {
            return false;
        }
        self.scroll = offset;
        match self.last_viewport {
            Some(viewport) => self.sample(viewport + offset, store),
            None => false,
        }
    }

    /// Applies the minimum-distance gate and appends on success.
    pub fn sample(&self, document: Vec2, store: &mut PointStore) -> bool {
        if !document.is_finite() {
            return false;
        }
        if let Some(last) = store.last() {
            if last.pos.distance(document) < self.min_distance {
                return false;
            }
        }
        trace!("emit point at ({:.1}, {:.1})", document.x, document.y);
        store.push(document);
        true
    }

    /// Forgets the pointer so the next scroll does not emit.
    pub fn reset(&mut self) {
        self.last_viewport = None;
    }
}
