use std::time::Duration;

use penline_platform::InputEvent;

use crate::surface::Surface;

/// A frame-driven cursor effect.
///
/// Input handlers and frames run on the same thread but in host order; an
/// effect must cope with any interleaving of the two.
pub trait Effect {
    fn name(&self) -> &'static str;

    fn handle_input(&mut self, event: &InputEvent);

    /// Advances the simulation by one frame lasting `elapsed`.
    fn advance(&mut self, elapsed: Duration);

    /// Clears `surface` and draws the current state.
    fn render(&self, surface: &mut dyn Surface);

    /// Nothing to draw and nothing left to animate.
    fn is_idle(&self) -> bool;

    /// Drops all transient state.
    fn reset(&mut self);
}

impl<E: Effect + ?Sized> Effect for Box<E> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn handle_input(&mut self, event: &InputEvent) {
        (**self).handle_input(event)
    }

    fn advance(&mut self, elapsed: Duration) {
        (**self).advance(elapsed)
    }

    fn render(&self, surface: &mut dyn Surface) {
        (**self).render(surface)
    }

    fn is_idle(&self) -> bool {
        (**self).is_idle()
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::DrawList;
    use crate::trail::{Decay, Emitter, PenTrail, TrailRenderer};
    use glam::Vec2;

    #[test]
    fn boxed_effect_forwards_to_the_inner_effect() {
        let trail = PenTrail::new(
            Emitter::new(2.0),
            Decay::per_frame(1.0),
            TrailRenderer::default(),
            16,
        );
        let mut boxed: Box<dyn Effect> = Box::new(trail);
        assert_eq!(boxed.name(), "pen");
        assert!(boxed.is_idle());

        boxed.handle_input(&InputEvent::PointerMoved(Vec2::ZERO));
        assert!(!boxed.is_idle());
        boxed.advance(Duration::from_millis(16));
        assert!(boxed.is_idle());

        let mut list = DrawList::new();
        boxed.render(&mut list);
        assert_eq!(list.clear_count(), 1);
    }
}
