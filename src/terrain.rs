//! Static left-to-right poly-line terrain.

use glam::Vec2;

use crate::error::{FlatlandError, Result};
use crate::shape::BoxShape;
use crate::types::Aabb;

/// Poly-line built strictly left to right, stored as line segments.
///
/// `spans` is the sorted x → segment map: `spans[i]` is the right-end x of
/// segment `i`. Keys strictly increase by construction, so lookups are binary
/// searches.
#[derive(Clone, Debug, Default)]
pub struct Terrain {
    vertices: Vec<Vec2>,
    segments: Vec<BoxShape>,
    spans: Vec<f32>,
    bounds: Aabb,
}

impl Terrain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_vertices(vertices: impl IntoIterator<Item = Vec2>) -> Result<Self> {
        let mut t = Self::new();
        for v in vertices {
            t.push_back(v)?;
        }
        Ok(t)
    }

    /// Append a vertex; its x must exceed the previous vertex's x.
    pub fn push_back(&mut self, vertex: Vec2) -> Result<()> {
        let Some(&prev) = self.vertices.last() else {
            self.vertices.push(vertex);
            self.bounds = self.bounds.include_point(vertex);
            return Ok(());
        };
        if !(vertex.x > prev.x) {
            tracing::debug!(previous = prev.x, attempted = vertex.x, "terrain vertex out of order");
            return Err(FlatlandError::TerrainOrder { previous: prev.x, attempted: vertex.x });
        }
        let segment = BoxShape::line(prev, vertex)?;
        // Exact vertices, not the segment's rebuilt corners.
        self.bounds = self.bounds.include_point(vertex);
        self.spans.push(vertex.x);
        self.segments.push(segment);
        self.vertices.push(vertex);
        Ok(())
    }

    /// Inclusive range of segment indices whose x-extent may overlap `[left, right]`.
    ///
    /// `None` when the interval misses the terrain entirely.
    pub fn index_range(&self, left: f32, right: f32) -> Option<(usize, usize)> {
        let first = self.vertices.first()?;
        let last = self.spans.last()?;
        if right < first.x || left > *last || left > right {
            return None;
        }
        // Lower bound: first segment ending at or after `left`.
        let lower = self.spans.partition_point(|&x| x < left);
        // Segment containing `right`, clamped to the last one.
        let upper = self.spans.partition_point(|&x| x < right).min(self.spans.len() - 1);
        Some((lower, upper))
    }

    /// Interpolated terrain height under `x`, if `x` lies within the terrain.
    pub fn height_at(&self, x: f32) -> Option<f32> {
        let first = self.vertices.first()?;
        if x < first.x {
            return None;
        }
        let i = self.spans.partition_point(|&k| k < x);
        let (a, b) = (*self.vertices.get(i)?, *self.vertices.get(i + 1)?);
        let t = (x - a.x) / (b.x - a.x);
        Some(a.y + t * (b.y - a.y))
    }

    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    pub fn segments(&self) -> &[BoxShape] {
        &self.segments
    }

    pub fn segment(&self, index: usize) -> Option<&BoxShape> {
        self.segments.get(index)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Anchor point: the first vertex.
    pub fn center(&self) -> Vec2 {
        self.vertices.first().copied().unwrap_or(Vec2::ZERO)
    }

    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Translate the whole terrain so its first vertex lands on `center`.
    pub fn set_center(&mut self, center: Vec2) {
        let delta = center - self.center();
        if delta == Vec2::ZERO {
            return;
        }
        for v in &mut self.vertices {
            *v += delta;
        }
        for s in &mut self.segments {
            s.set_center(s.center() + delta);
        }
        for x in &mut self.spans {
            *x += delta.x;
        }
        self.update_bounds();
    }

    pub fn update_bounds(&mut self) {
        self.bounds = Aabb::from_points(&self.vertices);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn sample() -> Terrain {
        Terrain::from_vertices([Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), Vec2::new(20.0, 5.0)]).unwrap()
    }

    #[test]
    fn test_push_back_rejects_non_increasing_x() {
        let mut t = sample();
        let err = t.push_back(Vec2::new(20.0, 1.0)).unwrap_err();
        assert_eq!(err, FlatlandError::TerrainOrder { previous: 20.0, attempted: 20.0 });
        assert!(t.push_back(Vec2::new(5.0, 1.0)).is_err());
        // Rejected vertices leave the terrain untouched.
        assert_eq!(t.len(), 2);
        assert!(t.push_back(Vec2::new(21.0, 1.0)).is_ok());
        assert_eq!(t.len(), 3);
    }

    #[test]
    fn test_segments_are_lines() {
        let t = sample();
        assert_eq!(t.segments().len(), 2);
        let s = t.segment(1).unwrap();
        assert!(s.is_line());
        let (a, b) = s.endpoints();
        assert_abs_diff_eq!(a.x, 10.0, epsilon = 1e-5);
        assert_abs_diff_eq!(b.y, 5.0, epsilon = 1e-5);
        assert_eq!(t.bounds(), Aabb::new(0.0, 0.0, 20.0, 5.0));
    }

    #[test]
    fn test_bounds_match_after_refresh() {
        let mut t = Terrain::from_vertices([
            Vec2::new(0.0, 0.0),
            Vec2::new(3.0, -1.7),
            Vec2::new(7.5, 2.3),
            Vec2::new(11.0, 0.1),
        ])
        .unwrap();
        let built = t.bounds();
        t.update_bounds();
        assert_eq!(built, t.bounds());
        assert_eq!(built, Aabb::new(0.0, -1.7, 11.0, 2.3));
    }

    #[test]
    fn test_index_range_covers_only_overlapping_segments() {
        let t = sample();
        assert_eq!(t.index_range(5.0, 15.0), Some((0, 1)));
        assert_eq!(t.index_range(1.0, 4.0), Some((0, 0)));
        assert_eq!(t.index_range(12.0, 18.0), Some((1, 1)));
        assert_eq!(t.index_range(-5.0, 100.0), Some((0, 1)));
        assert_eq!(t.index_range(25.0, 30.0), None);
        assert_eq!(t.index_range(-9.0, -1.0), None);
        assert_eq!(Terrain::new().index_range(0.0, 1.0), None);
    }

    #[test]
    fn test_height_at() {
        let t = sample();
        assert_abs_diff_eq!(t.height_at(5.0).unwrap(), 0.0);
        assert_abs_diff_eq!(t.height_at(15.0).unwrap(), 2.5);
        assert_abs_diff_eq!(t.height_at(20.0).unwrap(), 5.0);
        assert!(t.height_at(-1.0).is_none());
        assert!(t.height_at(21.0).is_none());
    }

    #[test]
    fn test_translate_moves_spans() {
        let mut t = sample();
        t.set_center(Vec2::new(100.0, 1.0));
        assert_eq!(t.vertices()[2], Vec2::new(120.0, 6.0));
        assert_eq!(t.index_range(105.0, 106.0), Some((0, 0)));
        assert_eq!(t.bounds(), Aabb::new(100.0, 1.0, 120.0, 6.0));
    }
}
