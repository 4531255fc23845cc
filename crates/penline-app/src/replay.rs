//! Headless replay: feeds a recorded input script through the scripted hosts
//! and keeps the last rendered frame.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use anyhow::{bail, Context as _};
use glam::Vec2;
use penline_core::{build_effect, mount, Driver, EngineConfig, RasterSurface, Rgba};
use penline_platform::{InputEvent, ManualScheduler, ScriptedInput, ViewportMetrics};
use serde::Deserialize;
use tracing::{debug, info};

#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub viewport: ViewportMetrics,
    #[serde(default = "default_frame_ms")]
    pub frame_ms: f32,
    #[serde(default)]
    pub background: Option<Rgba>,
    pub steps: Vec<Step>,
}

fn default_frame_ms() -> f32 {
    16.67
}

/// Longest frame a script may ask for.
const MAX_FRAME_MS: f32 = 1000.0;
/// Largest backing store side, in physical pixels, a script may ask for.
const MAX_SURFACE_SIDE: f32 = 8192.0;

fn check_viewport(what: &str, metrics: &ViewportMetrics) -> anyhow::Result<()> {
    let ratio = metrics.device_pixel_ratio;
    if !(ratio.is_finite() && ratio > 0.0) {
        bail!("{what} device_pixel_ratio must be positive, got {ratio}");
    }
    for (name, side) in [("width", metrics.width), ("height", metrics.height)] {
        if !(side >= 1.0 && side * ratio <= MAX_SURFACE_SIDE) {
            bail!(
                "{what} {name} must be at least 1 and at most {MAX_SURFACE_SIDE} physical pixels, got {side} @ {ratio}"
            );
        }
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Pointer(Vec2),
    Touch(Vec<Vec2>),
    Scroll(Vec2),
    Resize(ViewportMetrics),
    Hover(bool),
    /// Runs this many frames of `frame_ms` each.
    Frames(u32),
}

impl Step {
    fn event(&self) -> Option<InputEvent> {
        match self {
            Step::Pointer(p) => Some(InputEvent::PointerMoved(*p)),
            Step::Touch(touches) => Some(InputEvent::TouchMoved(touches.clone())),
            Step::Scroll(offset) => Some(InputEvent::Scrolled(*offset)),
            Step::Resize(metrics) => Some(InputEvent::Resized(*metrics)),
            Step::Hover(hovering) => Some(InputEvent::HoverChanged(*hovering)),
            Step::Frames(_) => None,
        }
    }
}

impl Script {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("open replay script '{}'", path.display()))?;
        let script: Script = serde_json::from_str(&text).with_context(|| "parse replay script JSON")?;
        script.validate()?;
        Ok(script)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !(self.frame_ms.is_finite() && self.frame_ms > 0.0 && self.frame_ms <= MAX_FRAME_MS) {
            bail!("frame_ms must be in (0, {MAX_FRAME_MS}], got {}", self.frame_ms);
        }
        check_viewport("viewport", &self.viewport)?;
        for (index, step) in self.steps.iter().enumerate() {
            if let Step::Resize(metrics) = step {
                check_viewport(&format!("step {index} resize"), metrics)?;
            }
        }
        Ok(())
    }

    fn frame(&self) -> anyhow::Result<Duration> {
        Duration::try_from_secs_f32(self.frame_ms / 1000.0)
            .with_context(|| format!("frame_ms {} is not a usable duration", self.frame_ms))
    }
}

/// Replays `script` with the effect selected in `config` and returns the
/// surface holding the final frame.
pub fn run(script: &Script, config: &EngineConfig) -> anyhow::Result<RasterSurface> {
    script.validate()?;
    let frame = script.frame()?;
    let mut raster = RasterSurface::new(script.viewport);
    if let Some(background) = script.background {
        raster = raster.with_background(background);
    }
    let surface = Rc::new(RefCell::new(raster));
    let driver = Rc::new(RefCell::new(Driver::new(build_effect(config))));
    let mut input = ScriptedInput::new();
    let mut scheduler = ManualScheduler::new();

    let mounted = mount(&driver, &surface, &mut input, &mut scheduler)
        .map_err(|e| anyhow::anyhow!("mount effect: {e}"))?;
    for step in &script.steps {
        match step {
            Step::Frames(count) => {
                for _ in 0..*count {
                    scheduler.tick(frame);
                }
            }
            other => {
                if let Some(event) = other.event() {
                    input.dispatch(&event);
                }
            }
        }
    }
    let frames = scheduler.frame_count();
    mounted.unmount();
    debug!("replay ended in {:?} phase", driver.borrow().phase());
    info!("replayed {} steps over {frames} frames", script.steps.len());

    match Rc::try_unwrap(surface) {
        Ok(cell) => Ok(cell.into_inner()),
        Err(_) => bail!("surface still shared after unmount"),
    }
}
