//! Spring-driven blob chain that trails the pointer ("liquid cursor").

use std::time::Duration;

use glam::Vec2;
use penline_platform::InputEvent;
use tracing::debug;

use crate::config::LiquidPreset;
use crate::effect::Effect;
use crate::surface::Surface;

const REFERENCE_FRAME_MS: f32 = 16.67;
const MAX_FRAME_SCALE: f32 = 2.0;
const HOVER_EASE: f32 = 0.1;
const SETTLE_DISTANCE: f32 = 0.01;
const TAPER_EXPONENT: f32 = 0.7;

pub struct LiquidCursor {
    preset: LiquidPreset,
    head: Vec2,
    velocity: Vec2,
    target: Vec2,
    body: Vec<Vec2>,
    hover_scale: f32,
    hovering: bool,
    visible: bool,
    touch_device: bool,
}

impl LiquidCursor {
    pub fn new(preset: LiquidPreset) -> Self {
        let links = preset.particles.saturating_sub(1);
        Self {
            preset,
            head: Vec2::ZERO,
            velocity: Vec2::ZERO,
            target: Vec2::ZERO,
            body: vec![Vec2::ZERO; links],
            hover_scale: 1.0,
            hovering: false,
            visible: false,
            touch_device: false,
        }
    }

    pub fn head(&self) -> Vec2 {
        self.head
    }

    pub fn body(&self) -> &[Vec2] {
        &self.body
    }

    pub fn hover_scale(&self) -> f32 {
        self.hover_scale
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    fn frame_scale(elapsed: Duration) -> f32 {
        if elapsed.is_zero() {
            return 1.0;
        }
        (elapsed.as_secs_f32() * 1000.0 / REFERENCE_FRAME_MS).min(MAX_FRAME_SCALE)
    }

    /// Position along the body in `[0, 1)`, head side first.
    fn progress(&self, index: usize) -> f32 {
        let span = self.preset.particles.saturating_sub(1);
        if span == 0 {
            0.0
        } else {
            index as f32 / span as f32
        }
    }

    fn target_scale(&self) -> f32 {
        if self.hovering {
            self.preset.hover_scale
        } else {
            1.0
        }
    }

    fn snap_to(&mut self, pos: Vec2) {
        self.head = pos;
        self.velocity = Vec2::ZERO;
        self.body.iter_mut().for_each(|link| *link = pos);
    }

    fn is_settled(&self) -> bool {
        let mut leader = self.head;
        for &link in &self.body {
            if link.distance(leader) > SETTLE_DISTANCE {
                return false;
            }
            leader = link;
        }
        self.head.distance(self.target) <= SETTLE_DISTANCE
            && self.velocity.length() <= SETTLE_DISTANCE
            && (self.hover_scale - self.target_scale()).abs() <= SETTLE_DISTANCE
    }
}

impl Effect for LiquidCursor {
    fn name(&self) -> &'static str {
        "liquid"
    }

    fn handle_input(&mut self, event: &InputEvent) {
        match event {
            InputEvent::PointerMoved(pos) => {
                if self.touch_device || !pos.is_finite() {
                    return;
                }
                self.target = *pos;
                if !self.visible {
                    self.snap_to(*pos);
                    self.visible = true;
                    debug!("liquid cursor visible at ({:.0}, {:.0})", pos.x, pos.y);
                }
            }
            InputEvent::TouchMoved(_) => {
                if !self.touch_device {
                    debug!("touch input seen, hiding liquid cursor");
                }
                self.touch_device = true;
                self.visible = false;
            }
            InputEvent::HoverChanged(hovering) => self.hovering = *hovering,
            InputEvent::Scrolled(_) | InputEvent::Resized(_) => {}
        }
    }

    fn advance(&mut self, elapsed: Duration) {
        if !self.visible {
            return;
        }
        let dt = Self::frame_scale(elapsed);
        let preset = &self.preset;

        let accel = (self.target - self.head) * preset.spring * dt;
        self.velocity += accel;
        self.velocity *= preset.friction.powf(dt);
        self.head += self.velocity * dt;

        let target_scale = self.target_scale();
        self.hover_scale += (target_scale - self.hover_scale) * HOVER_EASE * dt;

        let (lerp_start, lerp_end) = (preset.lerp_start, preset.lerp_end);
        let mut leader = self.head;
        for index in 0..self.body.len() {
            let progress = self.progress(index);
            let lerp = (lerp_start - progress * (lerp_start - lerp_end)) * dt;
            let link = &mut self.body[index];
            *link += (leader - *link) * lerp;
            leader = *link;
        }
    }

    fn render(&self, surface: &mut dyn Surface) {
        surface.clear();
        if !self.visible {
            return;
        }
        let radius = self.preset.radius * self.hover_scale;
        for (index, link) in self.body.iter().enumerate().rev() {
            let taper = (1.0 - self.progress(index).powf(TAPER_EXPONENT)).max(0.0);
            if taper > 0.0 {
                surface.fill_circle(*link, radius * taper, self.preset.color);
            }
        }
        surface.fill_circle(self.head, radius, self.preset.color);
    }

    fn is_idle(&self) -> bool {
        !self.visible || self.is_settled()
    }

    fn reset(&mut self) {
        self.visible = false;
        self.hovering = false;
        self.hover_scale = 1.0;
        self.snap_to(Vec2::ZERO);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawCmd, DrawList};

    const FRAME: Duration = Duration::from_micros(16_670);

    fn cursor() -> LiquidCursor {
        LiquidCursor::new(LiquidPreset {
            particles: 8,
            ..LiquidPreset::default()
        })
    }

    #[test]
    fn first_move_snaps_the_whole_chain() {
        let mut cursor = cursor();
        assert!(cursor.is_idle());
        cursor.handle_input(&InputEvent::PointerMoved(Vec2::new(40.0, 30.0)));
        assert!(cursor.is_visible());
        assert_eq!(cursor.head(), Vec2::new(40.0, 30.0));
        assert!(cursor.body().iter().all(|p| *p == Vec2::new(40.0, 30.0)));
        assert!(cursor.is_idle());
    }

    #[test]
    fn head_moves_toward_pointer_and_body_lags() {
        let mut cursor = cursor();
        cursor.handle_input(&InputEvent::PointerMoved(Vec2::ZERO));
        cursor.handle_input(&InputEvent::PointerMoved(Vec2::new(100.0, 0.0)));
        assert!(!cursor.is_idle());
        cursor.advance(FRAME);
        let head = cursor.head().x;
        assert!(head > 0.0 && head < 100.0);
        let tail = cursor.body().last().unwrap().x;
        assert!(tail < head);
    }

    #[test]
    fn chain_settles_on_a_resting_pointer() {
        let mut cursor = cursor();
        cursor.handle_input(&InputEvent::PointerMoved(Vec2::ZERO));
        cursor.handle_input(&InputEvent::PointerMoved(Vec2::new(50.0, 20.0)));
        for _ in 0..2000 {
            cursor.advance(FRAME);
        }
        assert!(cursor.is_idle());
        assert!(cursor.head().distance(Vec2::new(50.0, 20.0)) < 0.01);
    }

    #[test]
    fn hover_grows_the_blob() {
        let mut cursor = cursor();
        cursor.handle_input(&InputEvent::PointerMoved(Vec2::ZERO));
        cursor.handle_input(&InputEvent::HoverChanged(true));
        cursor.advance(FRAME);
        assert!(cursor.hover_scale() > 1.0);
    }

    #[test]
    fn touch_hides_and_ignores_pointer() {
        let mut cursor = cursor();
        cursor.handle_input(&InputEvent::PointerMoved(Vec2::ZERO));
        cursor.handle_input(&InputEvent::TouchMoved(vec![Vec2::ONE]));
        cursor.handle_input(&InputEvent::PointerMoved(Vec2::new(9.0, 9.0)));
        assert!(!cursor.is_visible());

        let mut list = DrawList::new();
        cursor.render(&mut list);
        assert_eq!(list.commands(), &[DrawCmd::Clear]);
    }

    #[test]
    fn render_draws_tapered_body_then_head() {
        let mut cursor = cursor();
        cursor.handle_input(&InputEvent::PointerMoved(Vec2::new(5.0, 5.0)));
        let mut list = DrawList::new();
        cursor.render(&mut list);
        let radii: Vec<f32> = list
            .draws()
            .filter_map(|cmd| match cmd {
                DrawCmd::Circle { radius, .. } => Some(*radius),
                _ => None,
            })
            .collect();
        assert_eq!(radii.len(), 8);
        assert_eq!(*radii.last().unwrap(), 32.0);
        assert!(radii.windows(2).all(|w| w[0] <= w[1]));
    }
}
