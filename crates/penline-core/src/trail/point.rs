use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Life values at or below this snap to zero after decay.
pub const LIFE_EPSILON: f32 = 1e-5;

/// One emitted trail sample in document space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub pos: Vec2,
    /// Remaining visibility, `1.0` when emitted, removed at `0.0`.
    pub life: f32,
}

impl Point {
    pub fn fresh(pos: Vec2) -> Self {
        Self { pos, life: 1.0 }
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }

    /// Lowers life by `amount` (never raises it).
    pub(crate) fn age(&mut self, amount: f32) {
        if amount > 0.0 {
            self.life -= amount;
        }
        if self.life <= LIFE_EPSILON {
            self.life = 0.0;
        }
    }
}
