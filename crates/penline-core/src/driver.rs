//! Frame loop state and host wiring for an [`Effect`].

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use penline_platform::{FrameScheduler, InputEvent, InputSource, Teardown, ViewportMetrics};
use tracing::{debug, info, trace, warn};

use crate::effect::Effect;
use crate::surface::Surface;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing to draw; frames only clear.
    Idle,
    /// The effect is animating and wants frames.
    Active,
}

/// Owns an effect and tracks whether it is idle or animating.
pub struct Driver<E: Effect> {
    effect: E,
    phase: Phase,
    pending_resize: Option<ViewportMetrics>,
    frames: u64,
}

impl<E: Effect> Driver<E> {
    pub fn new(effect: E) -> Self {
        let phase = if effect.is_idle() { Phase::Idle } else { Phase::Active };
        Self {
            effect,
            phase,
            pending_resize: None,
            frames: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == Phase::Active
    }

    pub fn effect(&self) -> &E {
        &self.effect
    }

    pub fn effect_mut(&mut self) -> &mut E {
        &mut self.effect
    }

    /// Frames run since creation.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Swaps in another effect; the old one is returned after a reset.
    pub fn replace(&mut self, effect: E) -> E {
        let mut old = std::mem::replace(&mut self.effect, effect);
        old.reset();
        info!("driver: {} -> {}", old.name(), self.effect.name());
        self.sync_phase();
        old
    }

    pub fn handle_input(&mut self, event: &InputEvent) {
        if let InputEvent::Resized(metrics) = event {
            self.pending_resize = Some(*metrics);
        }
        self.effect.handle_input(event);
        self.sync_phase();
    }

    /// Ages the effect and redraws it.
    ///
    /// Without a surface the effect still ages, so that a trail emitted while
    /// the surface is missing does not reappear later.
    pub fn frame(&mut self, elapsed: Duration, surface: Option<&mut dyn Surface>) {
        self.frames += 1;
        self.effect.advance(elapsed);
        match surface {
            Some(surface) => {
                if let Some(metrics) = self.pending_resize.take() {
                    surface.resize(metrics);
                }
                self.effect.render(surface);
            }
            None => trace!("driver: frame {} without surface", self.frames),
        }
        self.sync_phase();
    }

    pub fn reset(&mut self) {
        self.effect.reset();
        self.sync_phase();
    }

    fn sync_phase(&mut self) {
        let next = if self.effect.is_idle() { Phase::Idle } else { Phase::Active };
        if next != self.phase {
            debug!("{} effect: {:?} -> {:?}", self.effect.name(), self.phase, next);
            self.phase = next;
        }
    }
}

/// Listener and frame loop of a mounted effect.
///
/// Dropping it (or calling [`Mounted::unmount`]) stops the frame loop first
/// and then removes the input listener.
pub struct Mounted {
    frames: Teardown,
    input: Teardown,
}

impl Mounted {
    pub fn unmount(self) {
        let Mounted { frames, input } = self;
        frames.release();
        input.release();
        info!("effect unmounted");
    }
}

/// Subscribes `driver` to `input` and runs it on `scheduler`, drawing into
/// `surface` for as long as that surface is alive.
///
/// If the frame loop cannot be started the input listener is released
/// before the error is returned.
pub fn mount<E, S>(
    driver: &Rc<RefCell<Driver<E>>>,
    surface: &Rc<RefCell<S>>,
    input: &mut dyn InputSource,
    scheduler: &mut dyn FrameScheduler,
) -> penline_platform::Result<Mounted>
where
    E: Effect + 'static,
    S: Surface + 'static,
{
    let sink_driver = Rc::clone(driver);
    let input = input.subscribe(Box::new(move |event: &InputEvent| match sink_driver.try_borrow_mut() {
        Ok(mut driver) => driver.handle_input(event),
        Err(_) => warn!("driver busy, dropped input {event:?}"),
    }))?;

    let frame_driver = Rc::clone(driver);
    let frame_surface: Weak<RefCell<S>> = Rc::downgrade(surface);
    let frames = scheduler.start(Box::new(move |elapsed: Duration| {
        let Ok(mut driver) = frame_driver.try_borrow_mut() else {
            warn!("driver busy, skipped frame");
            return;
        };
        let surface = frame_surface.upgrade();
        let mut borrowed = surface.as_ref().and_then(|s| s.try_borrow_mut().ok());
        match borrowed.as_mut() {
            Some(surface) => driver.frame(elapsed, Some(&mut **surface)),
            None => driver.frame(elapsed, None),
        }
    }))?;

    info!("{} effect mounted", driver.borrow().effect().name());
    Ok(Mounted { frames, input })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::DrawList;
    use crate::trail::{Decay, Emitter, PenTrail, TrailRenderer};
    use glam::Vec2;
    use penline_platform::{ManualScheduler, ScriptedInput};

    const FRAME: Duration = Duration::from_millis(16);

    fn pen() -> PenTrail {
        let renderer = TrailRenderer {
            anchors: None,
            ..TrailRenderer::default()
        };
        PenTrail::new(Emitter::new(2.0), Decay::per_frame(0.25), renderer, 128)
    }

    #[test]
    fn phase_follows_the_store() {
        let mut driver = Driver::new(pen());
        assert_eq!(driver.phase(), Phase::Idle);
        driver.handle_input(&InputEvent::PointerMoved(Vec2::ZERO));
        assert_eq!(driver.phase(), Phase::Active);
        for _ in 0..4 {
            driver.frame(FRAME, None);
        }
        assert_eq!(driver.phase(), Phase::Idle);
        assert_eq!(driver.frames(), 4);
    }

    #[test]
    fn pending_resize_reaches_surface_on_next_frame() {
        let mut driver = Driver::new(pen());
        let metrics = ViewportMetrics::new(320.0, 200.0, 2.0);
        driver.handle_input(&InputEvent::Resized(metrics));
        driver.frame(FRAME, None);

        let mut list = DrawList::new();
        driver.frame(FRAME, Some(&mut list));
        assert_eq!(list.metrics(), Some(metrics));
    }

    #[test]
    fn boxed_effects_can_be_swapped() {
        let mut driver: Driver<Box<dyn Effect>> = Driver::new(Box::new(pen()));
        driver.handle_input(&InputEvent::PointerMoved(Vec2::ZERO));
        let old = driver.replace(Box::new(pen()));
        assert!(old.is_idle());
        assert_eq!(driver.phase(), Phase::Idle);
    }

    #[test]
    fn mount_wires_input_and_frames_until_unmount() {
        let driver = Rc::new(RefCell::new(Driver::new(pen())));
        let surface = Rc::new(RefCell::new(DrawList::new()));
        let mut input = ScriptedInput::new();
        let mut scheduler = ManualScheduler::new();

        let mounted = mount(&driver, &surface, &mut input, &mut scheduler).unwrap();
        input.dispatch(&InputEvent::PointerMoved(Vec2::new(0.0, 0.0)));
        input.dispatch(&InputEvent::PointerMoved(Vec2::new(10.0, 0.0)));
        scheduler.tick(FRAME);
        assert_eq!(surface.borrow().draws().count(), 1);

        mounted.unmount();
        assert!(!input.has_listener());
        assert!(!scheduler.is_running());
        assert!(!input.dispatch(&InputEvent::PointerMoved(Vec2::new(50.0, 0.0))));
        assert_eq!(driver.borrow().effect().store().len(), 2);
    }

    #[test]
    fn failed_scheduler_start_releases_listener() {
        let driver = Rc::new(RefCell::new(Driver::new(pen())));
        let surface = Rc::new(RefCell::new(DrawList::new()));
        let mut input = ScriptedInput::new();
        let mut scheduler = ManualScheduler::new();
        let _busy = scheduler.start(Box::new(|_| {})).unwrap();

        assert!(mount(&driver, &surface, &mut input, &mut scheduler).is_err());
        assert!(!input.has_listener());
    }

    #[test]
    fn dropped_surface_still_ages_the_effect() {
        let driver = Rc::new(RefCell::new(Driver::new(pen())));
        let surface = Rc::new(RefCell::new(DrawList::new()));
        let mut input = ScriptedInput::new();
        let mut scheduler = ManualScheduler::new();
        let _mounted = mount(&driver, &surface, &mut input, &mut scheduler).unwrap();

        input.dispatch(&InputEvent::PointerMoved(Vec2::ZERO));
        drop(surface);
        for _ in 0..4 {
            assert!(scheduler.tick(FRAME));
        }
        assert_eq!(driver.borrow().phase(), Phase::Idle);
    }
}
