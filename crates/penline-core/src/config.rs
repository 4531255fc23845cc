use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::color::Rgba;
use crate::error::ConfigError;
use crate::trail::{AnchorStyle, Decay, TrailRenderer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectKind {
    #[default]
    Pen,
    Liquid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrailPreset {
    pub name: String,
    pub min_distance: f32,
    pub decay_rate: f32,
    /// Scale decay by frame duration instead of applying it per frame.
    pub frame_independent: bool,
    pub target_frame_ms: f32,
    pub max_frame_scale: f32,
    pub max_points: usize,
    pub line_width: f32,
    pub color: Rgba,
    /// `every = 0` turns the anchor nodes off.
    pub anchors: AnchorStyle,
}

impl Default for TrailPreset {
    fn default() -> Self {
        Self {
            name: "Pen".into(),
            min_distance: 2.0,
            decay_rate: 0.008,
            frame_independent: true,
            target_frame_ms: 16.67,
            max_frame_scale: 4.0,
            max_points: 4096,
            line_width: 2.0,
            color: Rgba::ORANGE,
            anchors: AnchorStyle::default(),
        }
    }
}

impl TrailPreset {
    pub fn decay(&self) -> Decay {
        if !self.frame_independent {
            return Decay::per_frame(self.decay_rate);
        }
        match Duration::try_from_secs_f32(self.target_frame_ms.max(0.0) / 1000.0) {
            Ok(target) => Decay::elapsed(self.decay_rate, target, self.max_frame_scale),
            Err(_) => {
                warn!(
                    "target_frame_ms {} is unusable, decaying per frame",
                    self.target_frame_ms
                );
                Decay::per_frame(self.decay_rate)
            }
        }
    }

    pub fn renderer(&self) -> TrailRenderer {
        TrailRenderer {
            color: self.color,
            line_width: self.line_width,
            anchors: (self.anchors.every > 0).then_some(self.anchors),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiquidPreset {
    pub particles: usize,
    pub spring: f32,
    pub friction: f32,
    /// Follow strength of the link right behind the head.
    pub lerp_start: f32,
    /// Follow strength of the last link.
    pub lerp_end: f32,
    pub radius: f32,
    pub hover_scale: f32,
    pub color: Rgba,
}

impl Default for LiquidPreset {
    fn default() -> Self {
        Self {
            particles: 80,
            spring: 0.25,
            friction: 0.7,
            lerp_start: 0.7,
            lerp_end: 0.15,
            radius: 32.0,
            hover_scale: 1.4,
            color: Rgba::WHITE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub effect: EffectKind,
    pub theme: Theme,
    /// Project catalog JSON, relative to the working directory.
    pub catalog: Option<PathBuf>,
    /// Opening assistant message; may carry `[OPEN_PROJECT:id]` tags.
    pub greeting: String,
    pub preset: TrailPreset,
    pub liquid: LiquidPreset,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            effect: EffectKind::default(),
            theme: Theme::default(),
            catalog: None,
            greeting: "Hi! I'm the portfolio guide. Curious about any of the projects or the \
                       design journey behind them?"
                .into(),
            preset: TrailPreset::default(),
            liquid: LiquidPreset::default(),
        }
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

fn check_non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("{value} is not a non-negative number")))
    }
}

fn check_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("{value} is not a positive number")))
    }
}

/// Upper bound for `target_frame_ms`.
const MAX_TARGET_FRAME_MS: f32 = 1000.0;

fn check_unit(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(field, format!("{value} is outside [0, 1]")))
    }
}

impl EngineConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let preset = &self.preset;
        check_non_negative("preset.min_distance", preset.min_distance)?;
        check_non_negative("preset.decay_rate", preset.decay_rate)?;
        check_positive("preset.target_frame_ms", preset.target_frame_ms)?;
        if preset.target_frame_ms > MAX_TARGET_FRAME_MS {
            return Err(invalid(
                "preset.target_frame_ms",
                format!("{} exceeds {MAX_TARGET_FRAME_MS} ms", preset.target_frame_ms),
            ));
        }
        check_positive("preset.max_frame_scale", preset.max_frame_scale)?;
        check_positive("preset.line_width", preset.line_width)?;
        check_non_negative("preset.anchors.size", preset.anchors.size)?;
        check_unit("preset.anchors.life_threshold", preset.anchors.life_threshold)?;
        if preset.max_points == 0 {
            return Err(invalid("preset.max_points", "must be at least 1"));
        }

        let liquid = &self.liquid;
        if liquid.particles == 0 {
            return Err(invalid("liquid.particles", "must be at least 1"));
        }
        check_positive("liquid.spring", liquid.spring)?;
        check_unit("liquid.friction", liquid.friction)?;
        check_unit("liquid.lerp_start", liquid.lerp_start)?;
        check_unit("liquid.lerp_end", liquid.lerp_end)?;
        check_positive("liquid.radius", liquid.radius)?;
        check_positive("liquid.hover_scale", liquid.hover_scale)?;
        Ok(())
    }
}
