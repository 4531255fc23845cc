use std::fmt;
use std::str::FromStr;

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::error::ColorError;

/// Straight (non-premultiplied) 8-bit RGBA, laid out like one `RgbaImage` pixel.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Pod, Zeroable, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);
    /// Tailwind orange-500, the pen trail color.
    pub const ORANGE: Rgba = Rgba::rgb(0xf9, 0x73, 0x16);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Multiplies alpha by `factor`, clamped to `[0, 1]`. NaN counts as zero.
    pub fn scale_alpha(self, factor: f32) -> Self {
        let factor = if factor.is_nan() { 0.0 } else { factor.clamp(0.0, 1.0) };
        Self {
            a: (self.a as f32 * factor).round() as u8,
            ..self
        }
    }

    pub fn alpha_f32(self) -> f32 {
        self.a as f32 / 255.0
    }

    /// Source-over blend of `self` onto `dst`.
    pub fn over(self, dst: Rgba) -> Rgba {
        let sa = self.alpha_f32();
        if sa <= 0.0 {
            return dst;
        }
        let da = dst.alpha_f32();
        let out_a = sa + da * (1.0 - sa);
        if out_a <= 0.0 {
            return Rgba::TRANSPARENT;
        }
        let channel = |s: u8, d: u8| {
            let value = (s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a;
            value.round().clamp(0.0, 255.0) as u8
        };
        Rgba {
            r: channel(self.r, dst.r),
            g: channel(self.g, dst.g),
            b: channel(self.b, dst.b),
            a: (out_a * 255.0).round() as u8,
        }
    }
}

impl FromStr for Rgba {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix('#')
            .ok_or_else(|| ColorError::MissingHash(s.to_string()))?;
        if digits.len() != 6 && digits.len() != 8 {
            return Err(ColorError::BadLength(s.to_string()));
        }
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ColorError::BadDigit(s.to_string()));
        }
        let byte = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| ColorError::BadDigit(s.to_string()))
        };
        let a = if digits.len() == 8 { byte(6)? } else { 255 };
        Ok(Rgba::new(byte(0)?, byte(2)?, byte(4)?, a))
    }
}

impl TryFrom<String> for Rgba {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgba> for String {
    fn from(value: Rgba) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if self.a != 255 {
            write!(f, "{:02x}", self.a)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_with_and_without_alpha() {
        assert_eq!("#f97316".parse::<Rgba>().unwrap(), Rgba::ORANGE);
        assert_eq!("#FFFFFF80".parse::<Rgba>().unwrap(), Rgba::new(255, 255, 255, 128));
    }

    #[test]
    fn rejects_malformed_hex() {
        assert_eq!(
            "f97316".parse::<Rgba>(),
            Err(ColorError::MissingHash("f97316".into()))
        );
        assert_eq!("#fff".parse::<Rgba>(), Err(ColorError::BadLength("#fff".into())));
        assert_eq!("#ggg000".parse::<Rgba>(), Err(ColorError::BadDigit("#ggg000".into())));
    }

    #[test]
    fn display_omits_opaque_alpha() {
        assert_eq!(Rgba::ORANGE.to_string(), "#f97316");
        assert_eq!(Rgba::new(1, 2, 3, 4).to_string(), "#01020304");
    }

    #[test]
    fn scale_alpha_clamps() {
        assert_eq!(Rgba::WHITE.scale_alpha(1.7).a, 255);
        assert_eq!(Rgba::WHITE.scale_alpha(-0.2).a, 0);
        assert_eq!(Rgba::WHITE.scale_alpha(f32::NAN).a, 0);
        assert_eq!(Rgba::WHITE.scale_alpha(0.5).a, 128);
    }

    #[test]
    fn over_transparent_destination_keeps_source() {
        let src = Rgba::ORANGE.scale_alpha(0.5);
        assert_eq!(src.over(Rgba::TRANSPARENT), src);
        assert_eq!(Rgba::TRANSPARENT.over(Rgba::WHITE), Rgba::WHITE);
        assert_eq!(Rgba::BLACK.over(Rgba::WHITE), Rgba::BLACK);
    }
}
