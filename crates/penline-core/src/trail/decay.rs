use std::time::Duration;

use super::store::PointStore;

/// How much of the per-frame decay rate a frame applies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DecayClock {
    /// Every frame ages by exactly `rate`, whatever its duration.
    PerFrame,
    /// Ages by `rate * elapsed / target_frame`, capped at `max_scale`.
    Elapsed { target_frame: Duration, max_scale: f32 },
}

/// Ages every point once per frame and prunes the expired ones.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decay {
    pub rate: f32,
    pub clock: DecayClock,
}

impl Decay {
    pub fn per_frame(rate: f32) -> Self {
        Self {
            rate,
            clock: DecayClock::PerFrame,
        }
    }

    pub fn elapsed(rate: f32, target_frame: Duration, max_scale: f32) -> Self {
        Self {
            rate,
            clock: DecayClock::Elapsed {
                target_frame,
                max_scale,
            },
        }
    }

    /// Life removed from each point by a frame lasting `elapsed`.
    pub fn amount(&self, elapsed: Duration) -> f32 {
        let rate = if self.rate.is_finite() { self.rate.max(0.0) } else { 0.0 };
        match self.clock {
            DecayClock::PerFrame => rate,
            DecayClock::Elapsed {
                target_frame,
                max_scale,
            } => {
                if target_frame.is_zero() {
                    return rate;
                }
                let scale = elapsed.as_secs_f32() / target_frame.as_secs_f32();
                rate * scale.min(max_scale.max(0.0))
            }
        }
    }

    /// One decay step. Returns how many points expired.
    pub fn apply(&self, store: &mut PointStore, elapsed: Duration) -> usize {
        let amount = self.amount(elapsed);
        for point in store.points_mut() {
            point.age(amount);
        }
        store.prune()
    }
}
