use std::collections::VecDeque;

use glam::Vec2;
use tracing::trace;

use super::point::Point;

/// Ordered trail points, oldest first.
///
/// Points only ever enter at the back and leave from the front (eviction) or
/// through [`PointStore::prune`], so neighbours in the store are neighbours in
/// emission order.
#[derive(Debug, Clone)]
pub struct PointStore {
    points: VecDeque<Point>,
    max_points: usize,
}

impl PointStore {
    pub fn new(max_points: usize) -> Self {
        Self {
            points: VecDeque::new(),
            max_points: max_points.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<&Point> {
        self.points.back()
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Point> + DoubleEndedIterator {
        self.points.iter()
    }

    /// Consecutive `(older, newer)` pairs.
    pub fn segments(&self) -> impl Iterator<Item = (&Point, &Point)> {
        self.points.iter().zip(self.points.iter().skip(1))
    }

    pub fn positions(&self) -> Vec<Vec2> {
        self.points.iter().map(|p| p.pos).collect()
    }

    /// Appends a fresh point, evicting the oldest when full.
    pub fn push(&mut self, pos: Vec2) {
        if self.points.len() == self.max_points {
            self.points.pop_front();
            trace!("point store full ({}), evicted oldest", self.max_points);
        }
        self.points.push_back(Point::fresh(pos));
    }

    pub(crate) fn points_mut(&mut self) -> impl Iterator<Item = &mut Point> {
        self.points.iter_mut()
    }

    /// Drops every point whose life has run out. Returns how many were removed.
    pub fn prune(&mut self) -> usize {
        let before = self.points.len();
        self.points.retain(Point::is_alive);
        before - self.points.len()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}

impl Default for PointStore {
    fn default() -> Self {
        Self::new(4096)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_evicts_oldest_at_capacity() {
        let mut store = PointStore::new(2);
        store.push(Vec2::new(0.0, 0.0));
        store.push(Vec2::new(1.0, 0.0));
        store.push(Vec2::new(2.0, 0.0));
        assert_eq!(store.positions(), vec![Vec2::new(1.0, 0.0), Vec2::new(2.0, 0.0)]);
    }

    #[test]
    fn segments_pair_neighbours() {
        let mut store = PointStore::default();
        for x in 0..3 {
            store.push(Vec2::new(x as f32, 0.0));
        }
        let pairs: Vec<_> = store.segments().map(|(a, b)| (a.pos.x, b.pos.x)).collect();
        assert_eq!(pairs, vec![(0.0, 1.0), (1.0, 2.0)]);
    }

    #[test]
    fn prune_removes_dead_points_only() {
        let mut store = PointStore::default();
        store.push(Vec2::ZERO);
        store.push(Vec2::ONE);
        store.points_mut().next().unwrap().life = 0.0;
        assert_eq!(store.prune(), 1);
        assert_eq!(store.positions(), vec![Vec2::ONE]);
    }
}
