//! The pen-tool ink trail: emit on input, decay every frame, redraw.

mod decay;
mod emitter;
mod point;
mod render;
mod store;

use std::time::Duration;

use glam::Vec2;
use penline_platform::{InputEvent, ViewportMetrics};
use tracing::{debug, trace};

use crate::config::TrailPreset;
use crate::effect::Effect;
use crate::surface::Surface;

pub use decay::{Decay, DecayClock};
pub use emitter::Emitter;
pub use point::{Point, LIFE_EPSILON};
pub use render::{AnchorStyle, TrailRenderer};
pub use store::PointStore;

pub struct PenTrail {
    store: PointStore,
    emitter: Emitter,
    decay: Decay,
    renderer: TrailRenderer,
    viewport: ViewportMetrics,
}

impl PenTrail {
    pub fn new(emitter: Emitter, decay: Decay, renderer: TrailRenderer, max_points: usize) -> Self {
        Self {
            store: PointStore::new(max_points),
            emitter,
            decay,
            renderer,
            viewport: ViewportMetrics::default(),
        }
    }

    pub fn from_preset(preset: &TrailPreset) -> Self {
        Self::new(
            Emitter::new(preset.min_distance),
            preset.decay(),
            preset.renderer(),
            preset.max_points,
        )
    }

    pub fn store(&self) -> &PointStore {
        &self.store
    }

    pub fn scroll(&self) -> Vec2 {
        self.emitter.scroll()
    }

    pub fn viewport(&self) -> ViewportMetrics {
        self.viewport
    }

    pub fn renderer_mut(&mut self) -> &mut TrailRenderer {
        &mut self.renderer
    }
}

impl Effect for PenTrail {
    fn name(&self) -> &'static str {
        "pen"
    }

    fn handle_input(&mut self, event: &InputEvent) {
        match event {
            InputEvent::PointerMoved(pos) => {
                self.emitter.pointer_moved(*pos, &mut self.store);
            }
            InputEvent::TouchMoved(touches) => {
                if let Some(first) = touches.first() {
                    self.emitter.pointer_moved(*first, &mut self.store);
                }
            }
            InputEvent::Scrolled(offset) => {
                self.emitter.scrolled(*offset, &mut self.store);
            }
            InputEvent::Resized(metrics) => {
                self.viewport = metrics.sanitized(self.viewport);
                debug!(
                    "pen trail viewport {}x{} @ {}",
                    self.viewport.width, self.viewport.height, self.viewport.device_pixel_ratio
                );
            }
            InputEvent::HoverChanged(_) => {}
        }
    }

    fn advance(&mut self, elapsed: Duration) {
        let expired = self.decay.apply(&mut self.store, elapsed);
        if expired > 0 {
            trace!("pen trail: {expired} points expired, {} left", self.store.len());
        }
    }

    fn render(&self, surface: &mut dyn Surface) {
        self.renderer.render(&self.store, self.emitter.scroll(), surface);
    }

    fn is_idle(&self) -> bool {
        self.store.is_empty()
    }

    fn reset(&mut self) {
        self.store.clear();
        self.emitter.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::DrawList;

    fn trail() -> PenTrail {
        PenTrail::new(
            Emitter::new(2.0),
            Decay::per_frame(0.5),
            TrailRenderer::default(),
            64,
        )
    }

    #[test]
    fn first_touch_drives_the_trail() {
        let mut trail = trail();
        trail.handle_input(&InputEvent::TouchMoved(vec![
            Vec2::new(3.0, 4.0),
            Vec2::new(50.0, 50.0),
        ]));
        assert_eq!(trail.store().positions(), vec![Vec2::new(3.0, 4.0)]);
        trail.handle_input(&InputEvent::TouchMoved(Vec::new()));
        assert_eq!(trail.store().len(), 1);
    }

    #[test]
    fn goes_idle_after_decay() {
        let mut trail = trail();
        assert!(trail.is_idle());
        trail.handle_input(&InputEvent::PointerMoved(Vec2::ZERO));
        assert!(!trail.is_idle());
        trail.advance(Duration::from_millis(16));
        trail.advance(Duration::from_millis(16));
        assert!(trail.is_idle());

        let mut list = DrawList::new();
        trail.render(&mut list);
        assert_eq!(list.draws().count(), 0);
    }

    #[test]
    fn resize_keeps_previous_metrics_for_bad_values() {
        let mut trail = trail();
        trail.handle_input(&InputEvent::Resized(ViewportMetrics::new(800.0, 0.0, 2.0)));
        assert_eq!(trail.viewport(), ViewportMetrics::new(800.0, 800.0, 2.0));
    }

    #[test]
    fn reset_forgets_pointer() {
        let mut trail = trail();
        trail.handle_input(&InputEvent::PointerMoved(Vec2::new(10.0, 10.0)));
        trail.reset();
        trail.handle_input(&InputEvent::Scrolled(Vec2::new(0.0, 50.0)));
        assert!(trail.is_idle());
    }
}
