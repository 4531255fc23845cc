//! In-process hosts driven by explicit calls: headless replay and tests.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use tracing::{trace, warn};

use crate::{EventSink, FrameCallback, FrameScheduler, InputEvent, InputSource, Result, Teardown};

/// Input source that forwards whatever [`ScriptedInput::dispatch`] is given.
#[derive(Default)]
pub struct ScriptedInput {
    sink: Rc<RefCell<Option<EventSink>>>,
}

impl ScriptedInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers `event` to the listener. Returns `false` when nobody listens.
    pub fn dispatch(&self, event: &InputEvent) -> bool {
        let mut slot = self.sink.borrow_mut();
        match slot.as_mut() {
            Some(sink) => {
                trace!("scripted input: {event:?}");
                sink(event);
                true
            }
            None => false,
        }
    }

    pub fn has_listener(&self) -> bool {
        self.sink.borrow().is_some()
    }
}

impl InputSource for ScriptedInput {
    fn subscribe(&mut self, sink: EventSink) -> Result<Teardown> {
        let mut slot = self.sink.borrow_mut();
        if slot.is_some() {
            warn!("scripted input already has a listener");
            return Err("input source already has a listener".into());
        }
        *slot = Some(sink);
        let handle = Rc::clone(&self.sink);
        Ok(Teardown::new("scripted input listener", move || {
            handle.borrow_mut().take();
        }))
    }
}

/// Frame scheduler whose frames happen when [`ManualScheduler::tick`] is called.
#[derive(Default)]
pub struct ManualScheduler {
    callback: Rc<RefCell<Option<FrameCallback>>>,
    frames: Rc<RefCell<u64>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs one frame. Returns `false` when the loop is not running.
    pub fn tick(&self, elapsed: Duration) -> bool {
        let mut slot = self.callback.borrow_mut();
        match slot.as_mut() {
            Some(callback) => {
                callback(elapsed);
                *self.frames.borrow_mut() += 1;
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.callback.borrow().is_some()
    }

    /// Frames delivered since creation.
    pub fn frame_count(&self) -> u64 {
        *self.frames.borrow()
    }
}

impl FrameScheduler for ManualScheduler {
    fn start(&mut self, callback: FrameCallback) -> Result<Teardown> {
        let mut slot = self.callback.borrow_mut();
        if slot.is_some() {
            warn!("manual scheduler already running");
            return Err("frame loop already running".into());
        }
        *slot = Some(callback);
        let handle = Rc::clone(&self.callback);
        Ok(Teardown::new("manual frame loop", move || {
            handle.borrow_mut().take();
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use std::cell::Cell;

    #[test]
    fn dispatch_reaches_listener_until_teardown() {
        let mut input = ScriptedInput::new();
        let seen = Rc::new(Cell::new(0));
        let counter = Rc::clone(&seen);
        let guard = input
            .subscribe(Box::new(move |_| counter.set(counter.get() + 1)))
            .unwrap();

        assert!(input.dispatch(&InputEvent::PointerMoved(Vec2::ZERO)));
        assert_eq!(seen.get(), 1);

        drop(guard);
        assert!(!input.has_listener());
        assert!(!input.dispatch(&InputEvent::PointerMoved(Vec2::ONE)));
        assert_eq!(seen.get(), 1);
    }

    #[test]
    fn second_subscriber_is_rejected() {
        let mut input = ScriptedInput::new();
        let _guard = input.subscribe(Box::new(|_| {})).unwrap();
        assert!(input.subscribe(Box::new(|_| {})).is_err());
    }

    #[test]
    fn tick_stops_after_teardown() {
        let mut scheduler = ManualScheduler::new();
        let total = Rc::new(Cell::new(Duration::ZERO));
        let sum = Rc::clone(&total);
        let guard = scheduler
            .start(Box::new(move |dt| sum.set(sum.get() + dt)))
            .unwrap();

        assert!(scheduler.tick(Duration::from_millis(16)));
        assert!(scheduler.tick(Duration::from_millis(17)));
        assert_eq!(total.get(), Duration::from_millis(33));
        assert_eq!(scheduler.frame_count(), 2);

        guard.release();
        assert!(!scheduler.is_running());
        assert!(!scheduler.tick(Duration::from_millis(16)));
        assert_eq!(scheduler.frame_count(), 2);
    }
}
