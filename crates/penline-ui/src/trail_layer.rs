use std::time::Duration;

use egui::{Context, Event, Id, LayerId, Order, TouchPhase};
use glam::Vec2;
use penline_core::{Driver, Effect, Phase};
use penline_platform::{InputEvent, ViewportMetrics};
use tracing::{debug, info};

use crate::painter_surface::PainterSurface;

/// The cursor effect running on a foreground layer above the portfolio.
///
/// egui acts as both input source and frame scheduler: every pass first feeds
/// the pass's events to the driver, then runs one frame. Repaints are only
/// requested while the effect is active, so an idle trail costs nothing.
pub struct TrailLayer {
    driver: Driver<Box<dyn Effect>>,
    layer: LayerId,
    metrics: Option<ViewportMetrics>,
    scroll: Option<Vec2>,
    hovering: bool,
    /// Whether the previous pass requested a repaint.
    animating: bool,
}

impl TrailLayer {
    pub fn new(effect: Box<dyn Effect>) -> Self {
        info!("trail layer mounted with {} effect", effect.name());
        Self {
            driver: Driver::new(effect),
            layer: LayerId::new(Order::Foreground, Id::new("penline-trail")),
            metrics: None,
            scroll: None,
            hovering: false,
            animating: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.driver.phase()
    }

    pub fn effect_name(&self) -> &'static str {
        self.driver.effect().name()
    }

    pub fn replace_effect(&mut self, effect: Box<dyn Effect>) {
        self.driver.replace(effect);
        // the new effect has not seen the viewport or scroll position yet
        self.metrics = None;
        self.scroll = None;
        self.animating = false;
    }

    /// Translates this pass's pointer, touch and resize input.
    pub fn collect_input(&mut self, ctx: &Context) {
        let rect = ctx.screen_rect();
        let metrics = ViewportMetrics::new(rect.width(), rect.height(), ctx.pixels_per_point());
        if self.metrics != Some(metrics) {
            debug!("viewport {}x{} @ {}", metrics.width, metrics.height, metrics.device_pixel_ratio);
            self.metrics = Some(metrics);
            self.driver.handle_input(&InputEvent::Resized(metrics));
        }

        let events = ctx.input(|i| i.events.clone());
        for event in events {
            let translated = match event {
                Event::PointerMoved(p) => InputEvent::PointerMoved(Vec2::new(p.x, p.y)),
                Event::Touch {
                    phase: TouchPhase::Move,
                    pos,
                    ..
                } => InputEvent::TouchMoved(vec![Vec2::new(pos.x, pos.y)]),
                _ => continue,
            };
            self.driver.handle_input(&translated);
        }
    }

    /// Reports the document scroll offset after the scroll area was laid out.
    pub fn set_scroll(&mut self, offset: egui::Vec2) {
        let offset = Vec2::new(offset.x, offset.y);
        if self.scroll != Some(offset) {
            self.scroll = Some(offset);
            self.driver.handle_input(&InputEvent::Scrolled(offset));
        }
    }

    pub fn set_hovering(&mut self, hovering: bool) {
        if self.hovering != hovering {
            self.hovering = hovering;
            self.driver.handle_input(&InputEvent::HoverChanged(hovering));
        }
    }

    /// Runs one frame and keeps repainting while the effect is active.
    ///
    /// After an idle stretch no repaints were requested, so the pass delta
    /// spans the whole pause; that first frame ages nothing.
    pub fn paint(&mut self, ctx: &Context) {
        let dt = ctx.input(|i| i.unstable_dt);
        let elapsed = if self.animating && dt.is_finite() && dt > 0.0 {
            Duration::from_secs_f32(dt)
        } else {
            Duration::ZERO
        };
        let painter = ctx.layer_painter(self.layer);
        let mut surface = PainterSurface::new(&painter);
        self.driver.frame(elapsed, Some(&mut surface));
        self.animating = self.driver.is_active();
        if self.animating {
            ctx.request_repaint();
        }
    }
}

impl Drop for TrailLayer {
    fn drop(&mut self) {
        self.driver.reset();
        info!("trail layer released after {} frames", self.driver.frames());
    }
}
