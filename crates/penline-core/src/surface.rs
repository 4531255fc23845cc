use glam::Vec2;
use penline_platform::ViewportMetrics;

use crate::color::Rgba;

/// Axis-aligned rectangle in viewport (CSS pixel) units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        Self {
            min: center - size * 0.5,
            size,
        }
    }

    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }
}

/// A viewport-sized 2D drawing target.
///
/// Coordinates are logical viewport units; implementations apply the device
/// pixel ratio themselves.
pub trait Surface {
    fn clear(&mut self);
    fn stroke_line(&mut self, from: Vec2, to: Vec2, color: Rgba, width: f32);
    fn fill_rect(&mut self, rect: Rect, color: Rgba);
    fn stroke_rect(&mut self, rect: Rect, color: Rgba, width: f32);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba);
    fn resize(&mut self, _metrics: ViewportMetrics) {}
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Clear,
    Line {
        from: Vec2,
        to: Vec2,
        color: Rgba,
        width: f32,
    },
    FillRect {
        rect: Rect,
        color: Rgba,
    },
    StrokeRect {
        rect: Rect,
        color: Rgba,
        width: f32,
    },
    Circle {
        center: Vec2,
        radius: f32,
        color: Rgba,
    },
}

/// Surface that records what was drawn since the last clear.
///
/// `clear` drops the previous frame's commands, so `commands()` is always the
/// visible frame.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DrawList {
    commands: Vec<DrawCmd>,
    clears: usize,
    metrics: Option<ViewportMetrics>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCmd] {
        &self.commands
    }

    /// Commands other than the leading clear.
    pub fn draws(&self) -> impl Iterator<Item = &DrawCmd> {
        self.commands.iter().filter(|cmd| !matches!(cmd, DrawCmd::Clear))
    }

    pub fn clear_count(&self) -> usize {
        self.clears
    }

    pub fn metrics(&self) -> Option<ViewportMetrics> {
        self.metrics
    }
}

impl Surface for DrawList {
    fn clear(&mut self) {
        self.commands.clear();
        self.commands.push(DrawCmd::Clear);
        self.clears += 1;
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, color: Rgba, width: f32) {
        self.commands.push(DrawCmd::Line {
            from,
            to,
            color,
            width,
        });
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        self.commands.push(DrawCmd::FillRect { rect, color });
    }

    fn stroke_rect(&mut self, rect: Rect, color: Rgba, width: f32) {
        self.commands.push(DrawCmd::StrokeRect { rect, color, width });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        self.commands.push(DrawCmd::Circle {
            center,
            radius,
            color,
        });
    }

    fn resize(&mut self, metrics: ViewportMetrics) {
        self.metrics = Some(metrics);
    }
}
