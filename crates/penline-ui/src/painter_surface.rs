use egui::{Color32, Painter, Pos2, Stroke, StrokeKind};
use glam::Vec2;
use penline_core::{Rect, Rgba, Surface};

/// Draws into an egui layer.
///
/// egui rebuilds every layer on each pass, so the layer is already empty when
/// an effect starts drawing and `clear` has nothing to do.
pub struct PainterSurface<'a> {
    painter: &'a Painter,
}

impl<'a> PainterSurface<'a> {
    pub fn new(painter: &'a Painter) -> Self {
        Self { painter }
    }
}

fn pos(v: Vec2) -> Pos2 {
    Pos2::new(v.x, v.y)
}

fn color(c: Rgba) -> Color32 {
    Color32::from_rgba_unmultiplied(c.r, c.g, c.b, c.a)
}

fn rect(r: Rect) -> egui::Rect {
    egui::Rect::from_min_max(pos(r.min), pos(r.max()))
}

impl Surface for PainterSurface<'_> {
    fn clear(&mut self) {}

    fn stroke_line(&mut self, from: Vec2, to: Vec2, c: Rgba, width: f32) {
        self.painter
            .line_segment([pos(from), pos(to)], Stroke::new(width, color(c)));
    }

    fn fill_rect(&mut self, r: Rect, c: Rgba) {
        self.painter.rect_filled(rect(r), 0.0, color(c));
    }

    fn stroke_rect(&mut self, r: Rect, c: Rgba, width: f32) {
        self.painter
            .rect_stroke(rect(r), 0.0, Stroke::new(width, color(c)), StrokeKind::Middle);
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, c: Rgba) {
        self.painter.circle_filled(pos(center), radius, color(c));
    }
}
