use glam::Vec2;

use crate::contact::ContactList;
use crate::error::Result;
use crate::shape::{BoxShape, Circle};
use crate::types::*;

/// Rigid body owned by the external physics engine.
///
/// The kernel only reads and writes transforms and pushes mass data; it never
/// integrates motion.
pub trait RigidBody {
    fn position(&self) -> Vec2;

    fn set_position(&mut self, position: Vec2);

    /// Orientation in radians, counter-clockwise.
    fn rotation(&self) -> f32;

    fn set_rotation(&mut self, angle: f32);

    /// Static and kinematic bodies report `false`.
    fn is_dynamic(&self) -> bool;

    fn set_mass(&mut self, mass: MassData);
}

/// Physics-world collaborator that turns finalized contacts into solver joints.
pub trait ContactSink {
    fn add_contacts(&mut self, contacts: &ContactList);
}

/// One side of a contacting pair, as seen by [`ContactList::finalize`].
pub trait ContactParty {
    fn id(&self) -> ObjectId;

    fn surface(&self) -> Surface;

    /// Invoked once per finalized pair with the list oriented so that
    /// `contacts.a() == self.id()`.
    fn notify(&mut self, contacts: &ContactList);
}

impl<F: FnMut(&ContactList)> ContactSink for F {
    fn add_contacts(&mut self, contacts: &ContactList) {
        self(contacts)
    }
}

/// Pairwise overlap tests and contact generators.
///
/// Normals written into the list point from the second argument toward the
/// first. Callers are expected to have passed an AABB pre-check already.
pub trait NarrowphaseApi {
    fn test_circle_circle(a: &Circle, b: &Circle) -> bool;
    fn find_circle_circle(a: &Circle, b: &Circle, contacts: &mut ContactList) -> Result<()>;

    fn test_box_circle(a: &BoxShape, b: &Circle) -> bool;
    fn find_box_circle(a: &BoxShape, b: &Circle, contacts: &mut ContactList) -> Result<()>;

    /// Separating-axis test; `None` when a separating axis exists.
    fn test_box_box(a: &BoxShape, b: &BoxShape) -> Option<SatResult>;
    /// Clip the incident face against the reference face picked by `sat`.
    fn find_box_box(
        a: &BoxShape,
        b: &BoxShape,
        sat: &SatResult,
        contacts: &mut ContactList,
    ) -> Result<()>;
}
