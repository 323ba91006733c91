//! Rigid 2D shapes: oriented boxes, circles, terrains and composites.
//!
//! Every shape carries a `center`, a unit `axis` (its local +X expressed in
//! world space) and a cached [`Aabb`]. Mutators refresh the cached bounds
//! before returning, so a shape is always ready for the next query.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;

use crate::api::RigidBody;
use crate::error::{FlatlandError, Result};
use crate::math::Vec2Ext;
use crate::terrain::Terrain;
use crate::types::{Aabb, MassData, ShapeKind};

/// Tagged shape used by the dispatch tables.
#[derive(Clone, Debug)]
pub enum Shape {
    Box(BoxShape),
    Circle(Circle),
    Terrain(Terrain),
    Composite(Composite),
}

impl Shape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Box(_) => ShapeKind::Box,
            Shape::Circle(_) => ShapeKind::Circle,
            Shape::Terrain(_) => ShapeKind::Terrain,
            Shape::Composite(_) => ShapeKind::Composite,
        }
    }

    pub fn center(&self) -> Vec2 {
        match self {
            Shape::Box(s) => s.center,
            Shape::Circle(s) => s.center,
            Shape::Terrain(s) => s.center(),
            Shape::Composite(s) => s.center,
        }
    }

    pub fn axis(&self) -> Vec2 {
        match self {
            Shape::Box(s) => s.axis,
            Shape::Circle(s) => s.axis,
            Shape::Terrain(_) => Vec2::X,
            Shape::Composite(s) => s.axis,
        }
    }

    pub fn bounds(&self) -> Aabb {
        match self {
            Shape::Box(s) => s.bounds,
            Shape::Circle(s) => s.bounds,
            Shape::Terrain(s) => s.bounds(),
            Shape::Composite(s) => s.bounds,
        }
    }

    /// Recompute the cached bounds from current geometry.
    pub fn update_bounds(&mut self) {
        match self {
            Shape::Box(s) => s.update_bounds(),
            Shape::Circle(s) => s.update_bounds(),
            Shape::Terrain(s) => s.update_bounds(),
            Shape::Composite(s) => s.update_bounds(),
        }
    }

    pub fn set_center(&mut self, center: Vec2) {
        match self {
            Shape::Box(s) => s.set_center(center),
            Shape::Circle(s) => s.set_center(center),
            Shape::Terrain(s) => s.set_center(center),
            Shape::Composite(s) => s.set_center(center),
        }
    }

    pub fn translate(&mut self, delta: Vec2) {
        let c = self.center();
        self.set_center(c + delta);
    }

    /// Point the local +X axis along `axis` (normalized here).
    pub fn set_axis(&mut self, axis: Vec2) {
        let op = self.axis().rotation_to(axis.unit_or(Vec2::X));
        self.rotate_by(op);
    }

    /// Rotate counter-clockwise by `angle` radians.
    pub fn rotate(&mut self, angle: f32) {
        self.rotate_by(Vec2::from_angle(angle));
    }

    /// Rotate by a unit rotation operator (`Vec2::from_angle` form).
    pub fn rotate_by(&mut self, op: Vec2) {
        match self {
            Shape::Box(s) => s.rotate_by(op),
            Shape::Circle(s) => s.rotate_by(op),
            Shape::Terrain(_) => {
                tracing::warn!("terrain cannot be rotated; ignoring rotation request");
            }
            Shape::Composite(s) => s.rotate_by(op),
        }
    }

    pub fn contains(&self, p: Vec2) -> bool {
        match self {
            Shape::Box(s) => s.contains(p),
            Shape::Circle(s) => s.contains(p),
            Shape::Terrain(_) => false,
            Shape::Composite(s) => s.members.iter().any(|m| m.with(|c| c.contains(p))),
        }
    }

    /// Mass and inertia for `density`. Terrain is static scenery and has none.
    pub fn mass_data(&self, density: f32) -> Option<MassData> {
        match self {
            Shape::Box(s) => Some(s.mass_data(density)),
            Shape::Circle(s) => Some(s.mass_data(density)),
            Shape::Terrain(_) => None,
            Shape::Composite(s) => Some(s.mass_data(density)),
        }
    }

    /// Push this shape's mass onto `body`.
    pub fn set_mass<B: RigidBody + ?Sized>(&self, body: &mut B, density: f32) {
        match self.mass_data(density) {
            Some(m) => body.set_mass(m),
            None => tracing::debug!(kind = ?self.kind(), "shape has no mass model; body left untouched"),
        }
    }
}

impl From<BoxShape> for Shape {
    fn from(s: BoxShape) -> Self {
        Shape::Box(s)
    }
}

impl From<Circle> for Shape {
    fn from(s: Circle) -> Self {
        Shape::Circle(s)
    }
}

impl From<Terrain> for Shape {
    fn from(s: Terrain) -> Self {
        Shape::Terrain(s)
    }
}

impl From<Composite> for Shape {
    fn from(s: Composite) -> Self {
        Shape::Composite(s)
    }
}

/// Box mass model; collapses to a thin rod when either extent is zero.
fn box_mass(density: f32, width: f32, height: f32) -> MassData {
    if width == 0.0 || height == 0.0 {
        let length = width.max(height);
        let mass = density * length;
        return MassData { mass, inertia: mass * length * length / 12.0 };
    }
    let mass = density * width * height;
    MassData { mass, inertia: mass * (width * width + height * height) / 12.0 }
}

// --- Box -------------------------------------------------------------------

/// Oriented rectangle. A zero half-height makes it a line segment.
#[derive(Clone, Debug)]
pub struct BoxShape {
    center: Vec2,
    axis: Vec2,
    extent: Vec2,
    corners: [Vec2; 4],
    bounds: Aabb,
}

impl BoxShape {
    /// Box at `center` with half extents along `axis` and its perpendicular.
    pub fn new(center: Vec2, extent: Vec2, axis: Vec2) -> Result<Self> {
        if !(extent.x >= 0.0 && extent.y >= 0.0 && extent.is_finite()) {
            return Err(FlatlandError::InvalidGeometry {
                reason: "box extents must be finite and non-negative",
            });
        }
        if axis.length_squared() == 0.0 {
            return Err(FlatlandError::InvalidGeometry { reason: "box axis has zero length" });
        }
        let mut b = Self { center, axis: axis.unit(), extent, corners: [center; 4], bounds: Aabb::EMPTY };
        b.update_bounds();
        Ok(b)
    }

    /// Axis-aligned block spanning two opposite corners.
    pub fn from_corners(a: Vec2, b: Vec2) -> Result<Self> {
        Self::new(0.5 * (a + b), 0.5 * (b - a).abs(), Vec2::X)
    }

    /// Axis-aligned block from its center and full dimensions.
    pub fn from_center_size(center: Vec2, width: f32, height: f32) -> Result<Self> {
        Self::new(center, 0.5 * Vec2::new(width, height), Vec2::X)
    }

    /// Axis-aligned block from edge coordinates.
    pub fn from_edges(left: f32, top: f32, right: f32, bottom: f32) -> Result<Self> {
        Self::from_corners(Vec2::new(left, top), Vec2::new(right, bottom))
    }

    /// Segment from `a` to `b`: axis is the unit `a → b`, half height is zero.
    pub fn line(a: Vec2, b: Vec2) -> Result<Self> {
        let d = b - a;
        let len = d.length();
        if len == 0.0 {
            return Err(FlatlandError::InvalidGeometry { reason: "line endpoints coincide" });
        }
        Self::new(0.5 * (a + b), Vec2::new(0.5 * len, 0.0), d / len)
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    pub fn axis(&self) -> Vec2 {
        self.axis
    }

    /// Local +Y in world space.
    pub fn side_axis(&self) -> Vec2 {
        self.axis.perp()
    }

    pub fn extent(&self) -> Vec2 {
        self.extent
    }

    pub fn corners(&self) -> &[Vec2; 4] {
        &self.corners
    }

    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    pub fn is_line(&self) -> bool {
        self.extent.y == 0.0
    }

    /// Endpoints of a line along its axis (box: midpoints of the short sides).
    pub fn endpoints(&self) -> (Vec2, Vec2) {
        let h = self.axis * self.extent.x;
        (self.center - h, self.center + h)
    }

    pub fn to_local(&self, p: Vec2) -> Vec2 {
        (p - self.center).unrotate(self.axis)
    }

    pub fn to_world(&self, local: Vec2) -> Vec2 {
        self.center + self.axis.rotate(local)
    }

    /// Strict containment in local space.
    pub fn contains(&self, p: Vec2) -> bool {
        let l = self.to_local(p);
        l.x.abs() < self.extent.x && l.y.abs() < self.extent.y
    }

    pub fn set_center(&mut self, center: Vec2) {
        self.center = center;
        self.update_bounds();
    }

    pub fn rotate_by(&mut self, op: Vec2) {
        self.axis = op.rotate(self.axis).unit_or(Vec2::X);
        self.update_bounds();
    }

    pub fn update_bounds(&mut self) {
        let e = self.extent;
        let locals = [
            Vec2::new(-e.x, -e.y),
            Vec2::new(e.x, -e.y),
            Vec2::new(e.x, e.y),
            Vec2::new(-e.x, e.y),
        ];
        for (corner, local) in self.corners.iter_mut().zip(locals) {
            *corner = self.center + self.axis.rotate(local);
        }
        self.bounds = Aabb::from_points(&self.corners);
    }

    pub fn mass_data(&self, density: f32) -> MassData {
        box_mass(density, 2.0 * self.extent.x, 2.0 * self.extent.y)
    }
}

// --- Circle ----------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct Circle {
    center: Vec2,
    axis: Vec2,
    radius: f32,
    bounds: Aabb,
}

impl Circle {
    pub fn new(center: Vec2, radius: f32) -> Result<Self> {
        if !(radius > 0.0 && radius.is_finite()) {
            return Err(FlatlandError::InvalidGeometry {
                reason: "circle radius must be positive and finite",
            });
        }
        Ok(Self {
            center,
            axis: Vec2::X,
            radius,
            bounds: Aabb::from_center_half_extents(center, Vec2::splat(radius)),
        })
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    pub fn axis(&self) -> Vec2 {
        self.axis
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    pub fn contains(&self, p: Vec2) -> bool {
        (p - self.center).length_squared() < self.radius * self.radius
    }

    pub fn set_center(&mut self, center: Vec2) {
        self.center = center;
        self.update_bounds();
    }

    pub fn rotate_by(&mut self, op: Vec2) {
        self.axis = op.rotate(self.axis).unit_or(Vec2::X);
    }

    pub fn update_bounds(&mut self) {
        self.bounds = Aabb::from_center_half_extents(self.center, Vec2::splat(self.radius));
    }

    /// Box-equivalent placeholder (a `2r × 2r` square), not a disc inertia.
    pub fn mass_data(&self, density: f32) -> MassData {
        let d = 2.0 * self.radius;
        box_mass(density, d, d)
    }
}

// --- Composite -------------------------------------------------------------

/// Child slot of a [`Composite`].
#[derive(Clone, Debug)]
pub enum Member {
    /// Destroyed with the composite.
    Owned(Shape),
    /// Owned elsewhere; the composite only aggregates it.
    Shared(Rc<RefCell<Shape>>),
}

impl Member {
    pub fn with<R>(&self, f: impl FnOnce(&Shape) -> R) -> R {
        match self {
            Member::Owned(s) => f(s),
            Member::Shared(s) => f(&*s.borrow()),
        }
    }

    pub fn with_mut<R>(&mut self, f: impl FnOnce(&mut Shape) -> R) -> R {
        match self {
            Member::Owned(s) => f(s),
            Member::Shared(s) => f(&mut *s.borrow_mut()),
        }
    }
}

/// Whether a composite owns its members or merely aggregates them.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Ownership {
    Owning,
    /// Immovable scenery assembled from externally owned pieces.
    Static,
}

/// Rigid aggregate of child shapes.
#[derive(Clone, Debug)]
pub struct Composite {
    center: Vec2,
    axis: Vec2,
    ownership: Ownership,
    members: Vec<Member>,
    bounds: Aabb,
}

impl Composite {
    pub fn new(center: Vec2) -> Self {
        Self { center, axis: Vec2::X, ownership: Ownership::Owning, members: Vec::new(), bounds: Aabb::EMPTY }
    }

    pub fn new_static(center: Vec2) -> Self {
        Self { ownership: Ownership::Static, ..Self::new(center) }
    }

    pub fn ownership(&self) -> Ownership {
        self.ownership
    }

    pub fn is_static(&self) -> bool {
        self.ownership == Ownership::Static
    }

    /// Take ownership of a child. Static composites refuse.
    pub fn push(&mut self, shape: impl Into<Shape>) -> Result<()> {
        if self.is_static() {
            return Err(FlatlandError::InvalidGeometry {
                reason: "static composite cannot own children",
            });
        }
        self.members.push(Member::Owned(shape.into()));
        self.update_bounds();
        Ok(())
    }

    /// Aggregate an externally owned shape.
    pub fn attach(&mut self, shape: Rc<RefCell<Shape>>) {
        self.members.push(Member::Shared(shape));
        self.update_bounds();
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    pub fn axis(&self) -> Vec2 {
        self.axis
    }

    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Move the assembly; every member translates by the same delta.
    pub fn set_center(&mut self, center: Vec2) {
        let delta = center - self.center;
        self.center = center;
        for m in &mut self.members {
            m.with_mut(|s| s.translate(delta));
        }
        self.update_bounds();
    }

    /// Rotate the assembly rigidly about the composite center.
    pub fn rotate_by(&mut self, op: Vec2) {
        let pivot = self.center;
        for m in &mut self.members {
            m.with_mut(|s| {
                let offset = s.center() - pivot;
                s.set_center(pivot + op.rotate(offset));
                s.rotate_by(op);
            });
        }
        self.axis = op.rotate(self.axis).unit_or(Vec2::X);
        self.update_bounds();
    }

    /// Union of member bounds; empty composites report [`Aabb::EMPTY`].
    pub fn update_bounds(&mut self) {
        let mut bounds = Aabb::EMPTY;
        for m in &mut self.members {
            // Shared members may have been moved by their owner.
            let b = m.with_mut(|s| {
                s.update_bounds();
                s.bounds()
            });
            bounds = bounds.union(&b);
        }
        self.bounds = bounds;
    }

    /// Box-equivalent placeholder sized from the current bounds.
    pub fn mass_data(&self, density: f32) -> MassData {
        box_mass(density, self.bounds.width(), self.bounds.height())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use core::f32::consts::{FRAC_PI_2, FRAC_PI_4};

    fn unit_box(center: Vec2) -> BoxShape {
        BoxShape::new(center, Vec2::ONE, Vec2::X).unwrap()
    }

    #[test]
    fn test_box_bounds_rotated() {
        let mut b = unit_box(Vec2::ZERO);
        assert_eq!(b.bounds(), Aabb::new(-1.0, -1.0, 1.0, 1.0));
        b.rotate_by(Vec2::from_angle(FRAC_PI_4));
        let r = 2.0_f32.sqrt();
        assert_abs_diff_eq!(b.bounds().right, r, epsilon = 1e-5);
        assert_abs_diff_eq!(b.bounds().top, -r, epsilon = 1e-5);
    }

    #[test]
    fn test_box_contains_is_strict() {
        let b = BoxShape::new(Vec2::new(1.0, 1.0), Vec2::new(2.0, 1.0), Vec2::X).unwrap();
        assert!(b.contains(Vec2::new(2.5, 1.5)));
        assert!(!b.contains(Vec2::new(3.0, 1.0)));
        let mut r = b.clone();
        r.rotate_by(Vec2::from_angle(FRAC_PI_2));
        assert!(r.contains(Vec2::new(1.0, 2.5)));
        assert!(!r.contains(Vec2::new(2.5, 1.0)));
    }

    #[test]
    fn test_block_constructors_agree() {
        let a = BoxShape::from_corners(Vec2::new(2.0, 4.0), Vec2::new(0.0, 0.0)).unwrap();
        let b = BoxShape::from_edges(0.0, 0.0, 2.0, 4.0).unwrap();
        let c = BoxShape::from_center_size(Vec2::new(1.0, 2.0), 2.0, 4.0).unwrap();
        for s in [&a, &b, &c] {
            assert_eq!(s.center(), Vec2::new(1.0, 2.0));
            assert_eq!(s.extent(), Vec2::new(1.0, 2.0));
        }
    }

    #[test]
    fn test_line_geometry() {
        let l = BoxShape::line(Vec2::new(0.0, 0.0), Vec2::new(0.0, 4.0)).unwrap();
        assert!(l.is_line());
        assert_eq!(l.center(), Vec2::new(0.0, 2.0));
        assert_abs_diff_eq!(l.axis().y, 1.0, epsilon = 1e-6);
        assert_eq!(l.extent(), Vec2::new(2.0, 0.0));
        let (a, b) = l.endpoints();
        assert_abs_diff_eq!(a.y, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(b.y, 4.0, epsilon = 1e-6);
        assert!(BoxShape::line(Vec2::ONE, Vec2::ONE).is_err());
    }

    #[test]
    fn test_invalid_geometry_rejected() {
        assert!(BoxShape::new(Vec2::ZERO, Vec2::new(-1.0, 1.0), Vec2::X).is_err());
        assert!(BoxShape::new(Vec2::ZERO, Vec2::ONE, Vec2::ZERO).is_err());
        assert!(Circle::new(Vec2::ZERO, 0.0).is_err());
    }

    #[test]
    fn test_rotate_round_trip() {
        let mut s: Shape = BoxShape::new(Vec2::ZERO, Vec2::new(2.0, 1.0), Vec2::from_angle(0.2)).unwrap().into();
        let before = s.axis();
        s.rotate(1.234);
        s.rotate(-1.234);
        assert_abs_diff_eq!(s.axis().x, before.x, epsilon = 1e-5);
        assert_abs_diff_eq!(s.axis().y, before.y, epsilon = 1e-5);
    }

    #[test]
    fn test_set_axis_normalizes() {
        let mut s: Shape = unit_box(Vec2::ZERO).into();
        s.set_axis(Vec2::new(0.0, 5.0));
        assert_abs_diff_eq!(s.axis().x, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(s.axis().y, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_mass_models() {
        let b = BoxShape::new(Vec2::ZERO, Vec2::new(1.0, 2.0), Vec2::X).unwrap();
        let m = b.mass_data(2.0);
        assert_abs_diff_eq!(m.mass, 16.0);
        assert_abs_diff_eq!(m.inertia, 16.0 * (4.0 + 16.0) / 12.0);

        let rod = BoxShape::line(Vec2::ZERO, Vec2::new(6.0, 0.0)).unwrap().mass_data(1.0);
        assert_abs_diff_eq!(rod.mass, 6.0);
        assert_abs_diff_eq!(rod.inertia, 6.0 * 36.0 / 12.0);

        // Circle uses the enclosing square on purpose.
        let c = Circle::new(Vec2::ZERO, 1.0).unwrap().mass_data(1.0);
        assert_abs_diff_eq!(c.mass, 4.0);
        assert_abs_diff_eq!(c.inertia, 4.0 * 8.0 / 12.0);
    }

    #[test]
    fn test_composite_translation_propagates() {
        let mut c = Composite::new(Vec2::ZERO);
        c.push(unit_box(Vec2::new(-2.0, 0.0))).unwrap();
        c.push(Circle::new(Vec2::new(2.0, 0.0), 1.0).unwrap()).unwrap();
        assert_eq!(c.bounds(), Aabb::new(-3.0, -1.0, 3.0, 1.0));
        c.set_center(Vec2::new(10.0, 5.0));
        assert_eq!(c.members()[0].with(|s| s.center()), Vec2::new(8.0, 5.0));
        assert_eq!(c.members()[1].with(|s| s.center()), Vec2::new(12.0, 5.0));
        assert_eq!(c.bounds(), Aabb::new(7.0, 4.0, 13.0, 6.0));
    }

    #[test]
    fn test_composite_rotates_about_own_center() {
        let mut c = Composite::new(Vec2::ZERO);
        c.push(BoxShape::new(Vec2::new(3.0, 0.0), Vec2::new(1.0, 0.5), Vec2::X).unwrap()).unwrap();
        c.rotate_by(Vec2::from_angle(FRAC_PI_2));
        c.members()[0].with(|s| {
            assert_abs_diff_eq!(s.center().x, 0.0, epsilon = 1e-5);
            assert_abs_diff_eq!(s.center().y, 3.0, epsilon = 1e-5);
            assert_abs_diff_eq!(s.axis().y, 1.0, epsilon = 1e-5);
        });
        assert_abs_diff_eq!(c.axis().y, 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(c.bounds().left, -0.5, epsilon = 1e-5);
        assert_abs_diff_eq!(c.bounds().bottom, 4.0, epsilon = 1e-5);
    }

    #[test]
    fn test_empty_composite_has_empty_bounds() {
        let c = Composite::new(Vec2::ZERO);
        assert!(c.bounds().is_empty());
        assert!(c.is_empty());
    }

    #[test]
    fn test_static_composite_shares_members() {
        let piece = Rc::new(RefCell::new(Shape::from(unit_box(Vec2::ZERO))));
        let mut c = Composite::new_static(Vec2::ZERO);
        assert!(c.push(unit_box(Vec2::ONE)).is_err());
        c.attach(Rc::clone(&piece));
        c.set_center(Vec2::new(1.0, 0.0));
        // The external owner sees the move.
        assert_eq!(piece.borrow().center(), Vec2::new(1.0, 0.0));
        drop(c);
        assert_eq!(Rc::strong_count(&piece), 1);
    }
}
