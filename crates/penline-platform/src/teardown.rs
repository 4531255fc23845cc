use tracing::debug;

/// Scoped release of a host resource (listener, frame loop, overlay).
///
/// The release closure runs exactly once: on [`Teardown::release`] or when the
/// guard is dropped, whichever comes first.
#[must_use = "dropping a Teardown releases the resource immediately"]
pub struct Teardown {
    label: &'static str,
    release: Option<Box<dyn FnOnce()>>,
}

impl Teardown {
    pub fn new(label: &'static str, release: impl FnOnce() + 'static) -> Self {
        Self {
            label,
            release: Some(Box::new(release)),
        }
    }

    /// A guard with nothing to release.
    pub fn noop(label: &'static str) -> Self {
        Self {
            label,
            release: None,
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn is_released(&self) -> bool {
        self.release.is_none()
    }

    pub fn release(mut self) {
        self.run();
    }

    fn run(&mut self) {
        if let Some(release) = self.release.take() {
            debug!("teardown: releasing {}", self.label);
            release();
        }
    }
}

impl Drop for Teardown {
    fn drop(&mut self) {
        self.run();
    }
}

impl std::fmt::Debug for Teardown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Teardown")
            .field("label", &self.label)
            .field("released", &self.is_released())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn drop_runs_release_once() {
        let count = Rc::new(Cell::new(0));
        let counter = Rc::clone(&count);
        {
            let _guard = Teardown::new("counter", move || counter.set(counter.get() + 1));
        }
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn explicit_release_does_not_run_again_on_drop() {
        let count = Rc::new(Cell::new(0));
        let counter = Rc::clone(&count);
        let guard = Teardown::new("counter", move || counter.set(counter.get() + 1));
        guard.release();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn release_runs_during_unwind() {
        let count = Rc::new(Cell::new(0));
        let counter = Rc::clone(&count);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let _guard = Teardown::new("counter", move || counter.set(counter.get() + 1));
            panic!("unmount failed");
        }));
        assert!(result.is_err());
        assert_eq!(count.get(), 1);
    }
}
