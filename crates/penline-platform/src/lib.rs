//! Host abstraction so `penline-core` stays independent of any windowing toolkit.
//!
//! A host supplies three things to an effect: input events in viewport
//! coordinates, a repeating frame callback, and a drawing surface (the latter
//! lives in `penline-core`). Everything here is single-threaded; callbacks are
//! plain boxed closures and nothing is required to be `Send`.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

mod host;
mod teardown;

pub use host::{ManualScheduler, ScriptedInput};
pub use teardown::Teardown;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

const DEFAULT_WIDTH: f32 = 1280.0;
const DEFAULT_HEIGHT: f32 = 800.0;

/// Size of the visible window plus its device pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportMetrics {
    pub width: f32,
    pub height: f32,
    #[serde(default = "default_pixel_ratio")]
    pub device_pixel_ratio: f32,
}

fn default_pixel_ratio() -> f32 {
    1.0
}

impl Default for ViewportMetrics {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            device_pixel_ratio: 1.0,
        }
    }
}

impl ViewportMetrics {
    pub fn new(width: f32, height: f32, device_pixel_ratio: f32) -> Self {
        Self {
            width,
            height,
            device_pixel_ratio,
        }
    }

    /// Replaces unusable values with `fallback`'s.
    ///
    /// Hosts report zero or garbage sizes on very early calls; a ratio that is
    /// not a positive finite number becomes `1.0`.
    pub fn sanitized(self, fallback: ViewportMetrics) -> Self {
        let usable = |v: f32| v.is_finite() && v > 0.0;
        Self {
            width: if usable(self.width) { self.width } else { fallback.width },
            height: if usable(self.height) { self.height } else { fallback.height },
            device_pixel_ratio: if usable(self.device_pixel_ratio) {
                self.device_pixel_ratio
            } else {
                1.0
            },
        }
    }

    /// Backing-store size in physical pixels.
    pub fn physical_size(&self) -> (u32, u32) {
        let scale = |v: f32| (v * self.device_pixel_ratio).round().max(1.0) as u32;
        (scale(self.width), scale(self.height))
    }
}

/// Input delivered by the host, always in viewport coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputEvent {
    PointerMoved(Vec2),
    /// Active touches; the first one drives the effect.
    TouchMoved(Vec<Vec2>),
    /// New absolute scroll offset of the document.
    Scrolled(Vec2),
    Resized(ViewportMetrics),
    /// Pointer entered or left an interactive element.
    HoverChanged(bool),
}

pub type EventSink = Box<dyn FnMut(&InputEvent)>;
pub type FrameCallback = Box<dyn FnMut(Duration)>;

/// Source of pointer, touch, scroll and resize events.
pub trait InputSource {
    /// Registers `sink`; dropping the returned guard removes it again.
    fn subscribe(&mut self, sink: EventSink) -> Result<Teardown>;
}

/// Repeating per-frame callback, roughly once per display refresh.
pub trait FrameScheduler {
    /// Starts calling `callback` with the time since the previous frame.
    /// Dropping the returned guard cancels the loop.
    fn start(&mut self, callback: FrameCallback) -> Result<Teardown>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitized_falls_back_on_zero_and_nan() {
        let early = ViewportMetrics::new(0.0, f32::NAN, 0.0);
        let fixed = early.sanitized(ViewportMetrics::default());
        assert_eq!(fixed, ViewportMetrics::default());
    }

    #[test]
    fn sanitized_keeps_valid_values() {
        let metrics = ViewportMetrics::new(640.0, 480.0, 2.0);
        assert_eq!(metrics.sanitized(ViewportMetrics::default()), metrics);
    }

    #[test]
    fn physical_size_scales_by_ratio() {
        let metrics = ViewportMetrics::new(640.0, 480.0, 1.5);
        assert_eq!(metrics.physical_size(), (960, 720));
    }

    #[test]
    fn input_events_use_snake_case_tags() {
        let json = serde_json::to_value(InputEvent::PointerMoved(Vec2::new(1.0, 2.0))).unwrap();
        assert_eq!(json, serde_json::json!({ "pointer_moved": [1.0, 2.0] }));

        let decoded: InputEvent =
            serde_json::from_value(serde_json::json!({ "scrolled": [0.0, 40.0] })).unwrap();
        assert_eq!(decoded, InputEvent::Scrolled(Vec2::new(0.0, 40.0)));
    }
}
