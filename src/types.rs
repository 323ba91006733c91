use glam::Vec2;

use crate::error::{FlatlandError, Result};

/// Handle of an object registered with a [`crate::World`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(pub u32);

/// Axis-aligned bounding box, y growing downwards (`top <= bottom`).
///
/// Invariants:
/// - `left <= right` and `top <= bottom` once populated.
/// - [`Aabb::EMPTY`] is the only state violating the above; it is what a shape
///   without geometry reports, and it intersects nothing.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Aabb {
    /// Sentinel used before any geometry has been folded in.
    pub const EMPTY: Aabb = Aabb {
        left: f32::INFINITY,
        top: f32::INFINITY,
        right: f32::NEG_INFINITY,
        bottom: f32::NEG_INFINITY,
    };

    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        debug_assert!(left <= right && top <= bottom, "invalid AABB: min > max");
        Self { left, top, right, bottom }
    }

    pub fn from_center_half_extents(center: Vec2, half: Vec2) -> Self {
        Self::new(center.x - half.x, center.y - half.y, center.x + half.x, center.y + half.y)
    }

    pub fn from_points(points: &[Vec2]) -> Self {
        points.iter().fold(Self::EMPTY, |acc, p| acc.include_point(*p))
    }

    /// Strict overlap on both axes: boxes that only share an edge do not intersect.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.left < other.right
            && other.left < self.right
            && self.top < other.bottom
            && other.top < self.bottom
    }

    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.left && p.x <= self.right && p.y >= self.top && p.y <= self.bottom
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }

    pub fn include_point(&self, p: Vec2) -> Aabb {
        Aabb {
            left: self.left.min(p.x),
            top: self.top.min(p.y),
            right: self.right.max(p.x),
            bottom: self.bottom.max(p.y),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.left > self.right || self.top > self.bottom
    }

    pub fn width(&self) -> f32 {
        if self.is_empty() { 0.0 } else { self.right - self.left }
    }

    pub fn height(&self) -> f32 {
        if self.is_empty() { 0.0 } else { self.bottom - self.top }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(0.5 * (self.left + self.right), 0.5 * (self.top + self.bottom))
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Shape discriminant. The numeric value indexes the dispatch tables.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Box = 0,
    Circle = 1,
    Terrain = 2,
    Composite = 3,
}

impl ShapeKind {
    /// Number of kinds; side length of the dispatch tables.
    pub const COUNT: usize = 4;

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// One contact point between two shapes.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Contact {
    /// World-space contact position.
    pub position: Vec2,
    /// Unit normal pointing from shape B toward shape A.
    pub normal: Vec2,
    /// Penetration depth along `normal` (≥ 0).
    pub depth: f32,
}

/// Winning separating axis of a box-box test: which box owns the reference
/// face, which of its local axes, and which way the face normal points.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SatAxis {
    APosX,
    ANegX,
    APosY,
    ANegY,
    BPosX,
    BNegX,
    BPosY,
    BNegY,
}

impl SatAxis {
    pub(crate) fn new(on_a: bool, local_axis: usize, positive: bool) -> Self {
        match (on_a, local_axis, positive) {
            (true, 0, true) => SatAxis::APosX,
            (true, 0, false) => SatAxis::ANegX,
            (true, _, true) => SatAxis::APosY,
            (true, _, false) => SatAxis::ANegY,
            (false, 0, true) => SatAxis::BPosX,
            (false, 0, false) => SatAxis::BNegX,
            (false, _, true) => SatAxis::BPosY,
            (false, _, false) => SatAxis::BNegY,
        }
    }

    /// Reference face belongs to box A.
    pub fn on_a(self) -> bool {
        matches!(self, SatAxis::APosX | SatAxis::ANegX | SatAxis::APosY | SatAxis::ANegY)
    }

    /// Local axis index of the reference box: 0 for x, 1 for y.
    pub fn local_axis(self) -> usize {
        match self {
            SatAxis::APosX | SatAxis::ANegX | SatAxis::BPosX | SatAxis::BNegX => 0,
            _ => 1,
        }
    }

    pub fn positive(self) -> bool {
        matches!(self, SatAxis::APosX | SatAxis::APosY | SatAxis::BPosX | SatAxis::BPosY)
    }
}

/// Outcome of an overlapping box-box separating-axis test.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SatResult {
    /// Axis of minimum overlap.
    pub axis: SatAxis,
    /// Overlap along that axis (≥ 0).
    pub depth: f32,
}

/// Per-object surface response parameters, merged pairwise on finalize.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Surface {
    /// Coulomb friction; [`Surface::INFINITE_FRICTION`] means "never slips".
    pub friction: f32,
    /// Restitution in `[0, 1]`.
    pub bounce: f32,
    /// Minimum approach speed before `bounce` applies.
    pub bounce_velocity: f32,
}

impl Surface {
    pub const INFINITE_FRICTION: f32 = f32::INFINITY;

    pub fn new(friction: f32, bounce: f32, bounce_velocity: f32) -> Self {
        Self { friction, bounce, bounce_velocity }
    }

    /// Pairwise merge: friction multiplies (infinity dominates), bounce terms average.
    pub fn combine(self, other: Surface) -> Surface {
        let friction = if self.friction.is_infinite() || other.friction.is_infinite() {
            Self::INFINITE_FRICTION
        } else {
            self.friction * other.friction
        };
        Surface {
            friction,
            bounce: 0.5 * (self.bounce + other.bounce),
            bounce_velocity: 0.5 * (self.bounce_velocity + other.bounce_velocity),
        }
    }
}

impl Default for Surface {
    fn default() -> Self {
        Self { friction: 0.5, bounce: 0.0, bounce_velocity: 0.0 }
    }
}

/// Mass descriptor pushed onto an external rigid body.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct MassData {
    pub mass: f32,
    /// Rotational inertia about the shape center.
    pub inertia: f32,
}

/// World-level configuration for the collision glue.
#[derive(Clone, Debug)]
pub struct WorldConfig {
    /// Surface assigned to objects that never get one explicitly.
    pub default_surface: Surface,
    /// Density used to push mass onto bodies at insertion time.
    pub default_density: f32,
    /// Skip pairs where neither object is dynamic.
    pub skip_static_pairs: bool,
}

impl WorldConfig {
    pub fn with_surface(mut self, surface: Surface) -> Self {
        self.default_surface = surface;
        self
    }

    pub fn with_density(mut self, density: f32) -> Self {
        self.default_density = density;
        self
    }

    pub fn test_static_pairs(mut self) -> Self {
        self.skip_static_pairs = false;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.default_density.is_finite() && self.default_density > 0.0) {
            return Err(FlatlandError::InvalidConfig {
                reason: "default density must be positive and finite",
            });
        }
        let s = self.default_surface;
        if s.friction.is_nan() || s.friction < 0.0 {
            return Err(FlatlandError::InvalidConfig { reason: "friction cannot be negative" });
        }
        if !(0.0..=1.0).contains(&s.bounce) {
            return Err(FlatlandError::InvalidConfig { reason: "bounce must lie in [0, 1]" });
        }
        if s.bounce_velocity.is_nan() || s.bounce_velocity < 0.0 {
            return Err(FlatlandError::InvalidConfig {
                reason: "bounce velocity cannot be negative",
            });
        }
        Ok(())
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self { default_surface: Surface::default(), default_density: 1.0, skip_static_pairs: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_aabb_touching_edges_do_not_intersect() {
        let a = Aabb::new(0.0, 0.0, 1.0, 1.0);
        let b = Aabb::new(1.0, 0.0, 2.0, 1.0);
        assert!(!a.intersects(&b));
        assert!(!b.intersects(&a));
    }

    #[test]
    fn test_aabb_intersects_symmetric() {
        let a = Aabb::new(0.0, 0.0, 2.0, 2.0);
        let b = Aabb::new(1.0, 1.5, 3.0, 4.0);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(a.intersects(&a));
    }

    #[test]
    fn test_aabb_empty_sentinel() {
        let e = Aabb::EMPTY;
        assert!(e.is_empty());
        assert!(!e.intersects(&Aabb::new(-1e9, -1e9, 1e9, 1e9)));
        let grown = e.include_point(Vec2::new(2.0, 3.0));
        assert_eq!(grown, Aabb::new(2.0, 3.0, 2.0, 3.0));
        assert_eq!(e.union(&Aabb::new(0.0, 0.0, 1.0, 1.0)), Aabb::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(e.width(), 0.0);
    }

    #[test]
    fn test_surface_combine() {
        let a = Surface::new(0.5, 0.2, 1.0);
        let b = Surface::new(0.5, 0.6, 3.0);
        let m = a.combine(b);
        assert_relative_eq!(m.friction, 0.25);
        assert_relative_eq!(m.bounce, 0.4);
        assert_relative_eq!(m.bounce_velocity, 2.0);

        let sticky = Surface::new(Surface::INFINITE_FRICTION, 0.0, 0.0);
        assert!(sticky.combine(b).friction.is_infinite());
        assert!(Surface::new(0.0, 0.0, 0.0).combine(sticky).friction.is_infinite());
    }

    #[test]
    fn test_config_validation() {
        assert!(WorldConfig::default().validate().is_ok());
        assert!(WorldConfig::default().with_density(0.0).validate().is_err());
        let bad = WorldConfig::default().with_surface(Surface::new(-1.0, 0.0, 0.0));
        assert!(bad.validate().is_err());
        let bouncy = WorldConfig::default().with_surface(Surface::new(0.1, 1.5, 0.0));
        assert!(bouncy.validate().is_err());
    }
}
