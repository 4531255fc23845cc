//! Penline core engine: platform-agnostic cursor trails and the portfolio data
//! they decorate.

pub mod catalog;
pub mod color;
pub mod config;
pub mod driver;
pub mod effect;
pub mod error;
pub mod liquid;
pub mod raster;
pub mod reply;
pub mod surface;
pub mod trail;

pub use catalog::{Catalog, Category, CategoryFilter, Project};
pub use color::Rgba;
pub use config::{EffectKind, EngineConfig, LiquidPreset, Theme, TrailPreset};
pub use driver::{mount, Driver, Mounted, Phase};
pub use effect::Effect;
pub use error::{CatalogError, ColorError, ConfigError};
pub use liquid::LiquidCursor;
pub use raster::RasterSurface;
pub use reply::{parse_reply, ChatMessage, ParsedReply, Role};
pub use surface::{DrawCmd, DrawList, Rect, Surface};
pub use trail::PenTrail;

/// Builds the effect selected in `config`.
pub fn build_effect(config: &EngineConfig) -> Box<dyn Effect> {
    match config.effect {
        EffectKind::Pen => Box::new(PenTrail::from_preset(&config.preset)),
        EffectKind::Liquid => Box::new(LiquidCursor::new(config.liquid.clone())),
    }
}
