use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::color::Rgba;
use crate::surface::{Rect, Surface};

use super::store::PointStore;

/// Vector-node squares drawn along the path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorStyle {
    /// Every n-th point gets a node; `0` disables them.
    pub every: usize,
    pub life_threshold: f32,
    pub size: f32,
    pub fill: Rgba,
    pub border: Rgba,
    pub border_width: f32,
}

impl Default for AnchorStyle {
    fn default() -> Self {
        Self {
            every: 6,
            life_threshold: 0.6,
            size: 4.0,
            fill: Rgba::WHITE,
            border: Rgba::ORANGE,
            border_width: 1.0,
        }
    }
}

/// Draws the surviving points as segments faded by the older point's life.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailRenderer {
    pub color: Rgba,
    pub line_width: f32,
    pub anchors: Option<AnchorStyle>,
}

impl Default for TrailRenderer {
    fn default() -> Self {
        Self {
            color: Rgba::ORANGE,
            line_width: 2.0,
            anchors: Some(AnchorStyle::default()),
        }
    }
}

impl TrailRenderer {
    /// Clears `surface` and redraws the whole trail.
    ///
    /// Points live in document space; `scroll` maps them back onto the
    /// viewport-fixed surface.
    pub fn render(&self, store: &PointStore, scroll: Vec2, surface: &mut dyn Surface) {
        surface.clear();
        if store.len() < 2 {
            return;
        }
        for (index, (from, to)) in store.segments().enumerate() {
            let a = from.pos - scroll;
            let b = to.pos - scroll;
            surface.stroke_line(a, b, self.color.scale_alpha(from.life), self.line_width);

            if let Some(anchor) = &self.anchors {
                if anchor.every > 0 && index % anchor.every == 0 && from.life > anchor.life_threshold {
                    let rect = Rect::from_center(a, Vec2::splat(anchor.size));
                    surface.fill_rect(rect, anchor.fill);
                    surface.stroke_rect(rect, anchor.border, anchor.border_width);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawCmd, DrawList};

    fn store_with(points: &[(f32, f32)]) -> PointStore {
        let mut store = PointStore::default();
        for &(x, y) in points {
            store.push(Vec2::new(x, y));
        }
        store
    }

    #[test]
    fn single_point_draws_nothing() {
        let mut list = DrawList::new();
        TrailRenderer::default().render(&store_with(&[(1.0, 1.0)]), Vec2::ZERO, &mut list);
        assert_eq!(list.commands(), &[DrawCmd::Clear]);
    }

    #[test]
    fn segments_are_shifted_by_scroll() {
        let renderer = TrailRenderer {
            anchors: None,
            ..TrailRenderer::default()
        };
        let mut list = DrawList::new();
        renderer.render(&store_with(&[(0.0, 100.0), (10.0, 110.0)]), Vec2::new(0.0, 100.0), &mut list);
        assert_eq!(
            list.commands()[1],
            DrawCmd::Line {
                from: Vec2::new(0.0, 0.0),
                to: Vec2::new(10.0, 10.0),
                color: Rgba::ORANGE,
                width: 2.0,
            }
        );
    }

    #[test]
    fn anchors_follow_stride_and_threshold() {
        let renderer = TrailRenderer {
            anchors: Some(AnchorStyle {
                every: 2,
                ..AnchorStyle::default()
            }),
            ..TrailRenderer::default()
        };
        let points: Vec<(f32, f32)> = (0..5).map(|i| (i as f32 * 10.0, 0.0)).collect();
        let mut list = DrawList::new();
        renderer.render(&store_with(&points), Vec2::ZERO, &mut list);
        let fills = list
            .draws()
            .filter(|cmd| matches!(cmd, DrawCmd::FillRect { .. }))
            .count();
        // segments 0 and 2 of 4
        assert_eq!(fills, 2);
    }
}
