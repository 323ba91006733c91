use glam::Vec2;

use crate::api::ContactParty;
use crate::error::{FlatlandError, Result};
use crate::types::*;

/// Maximum number of contacts one pair test can produce.
pub const CONTACT_CAPACITY: usize = 32;

/// Fixed-capacity contact manifold for one shape pair.
///
/// Lifecycle: [`reset`](Self::reset), zero or more
/// [`add_contact`](Self::add_contact) calls while a pair routine runs, then
/// [`finalize`](Self::finalize) once if anything was added.
#[derive(Clone, Debug)]
pub struct ContactList {
    contacts: [Contact; CONTACT_CAPACITY],
    count: usize,
    invert_normals: bool,
    a: ObjectId,
    b: ObjectId,
    surface: Surface,
}

impl ContactList {
    pub fn new() -> Self {
        Self {
            contacts: [Contact::default(); CONTACT_CAPACITY],
            count: 0,
            invert_normals: false,
            a: ObjectId(0),
            b: ObjectId(0),
            surface: Surface::default(),
        }
    }

    /// Clear contacts and bind the list to a new pair.
    pub fn reset(&mut self, a: ObjectId, b: ObjectId) {
        self.count = 0;
        self.invert_normals = false;
        self.a = a;
        self.b = b;
        self.surface = Surface::default();
    }

    /// Append a contact. The normal is negated while inversion is toggled on.
    ///
    /// Overflow is a caller bug: it panics in debug builds and returns
    /// [`FlatlandError::ContactCapacity`] otherwise.
    pub fn add_contact(&mut self, position: Vec2, normal: Vec2, depth: f32) -> Result<()> {
        debug_assert!(
            self.count < CONTACT_CAPACITY,
            "contact list full: capacity {CONTACT_CAPACITY} exceeded"
        );
        if self.count >= CONTACT_CAPACITY {
            tracing::warn!(a = self.a.0, b = self.b.0, "contact list full; dropping pair contacts");
            return Err(FlatlandError::ContactCapacity { capacity: CONTACT_CAPACITY });
        }
        let normal = if self.invert_normals { -normal } else { normal };
        self.contacts[self.count] = Contact { position, normal, depth };
        self.count += 1;
        Ok(())
    }

    /// Flip the sign applied to subsequently added normals.
    ///
    /// Used by the dispatcher when it swaps arguments to reuse a routine.
    pub fn toggle_normal_inversion(&mut self) {
        self.invert_normals = !self.invert_normals;
    }

    pub fn normals_inverted(&self) -> bool {
        self.invert_normals
    }

    /// Merge both parties' surfaces and run their callbacks.
    ///
    /// Each party is notified once, seeing itself as side `a`.
    pub fn finalize<A, B>(&mut self, a: &mut A, b: &mut B)
    where
        A: ContactParty + ?Sized,
        B: ContactParty + ?Sized,
    {
        debug_assert!(a.id() == self.a && b.id() == self.b, "finalize called with a foreign pair");
        self.surface = a.surface().combine(b.surface());
        tracing::trace!(a = self.a.0, b = self.b.0, contacts = self.count, "finalizing contacts");
        a.notify(self);
        self.swap_sides();
        b.notify(self);
        self.swap_sides();
    }

    /// Exchange the two sides: bodies swap and every normal flips.
    pub fn swap_sides(&mut self) {
        core::mem::swap(&mut self.a, &mut self.b);
        for c in &mut self.contacts[..self.count] {
            c.normal = -c.normal;
        }
    }

    pub fn a(&self) -> ObjectId {
        self.a
    }

    pub fn b(&self) -> ObjectId {
        self.b
    }

    /// Merged surface parameters; valid after [`finalize`](Self::finalize).
    pub fn surface(&self) -> Surface {
        self.surface
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn get(&self, index: usize) -> Option<&Contact> {
        self.as_slice().get(index)
    }

    pub fn as_slice(&self) -> &[Contact] {
        &self.contacts[..self.count]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Contact> {
        self.as_slice().iter()
    }

    /// Deepest contact, if any.
    pub fn deepest(&self) -> Option<&Contact> {
        self.iter().max_by(|l, r| l.depth.total_cmp(&r.depth))
    }
}

impl Default for ContactList {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    struct Party {
        id: ObjectId,
        surface: Surface,
        seen: Vec<(ObjectId, ObjectId, Vec2)>,
    }

    impl ContactParty for Party {
        fn id(&self) -> ObjectId {
            self.id
        }
        fn surface(&self) -> Surface {
            self.surface
        }
        fn notify(&mut self, contacts: &ContactList) {
            self.seen.push((contacts.a(), contacts.b(), contacts.as_slice()[0].normal));
        }
    }

    fn party(id: u32, friction: f32) -> Party {
        Party { id: ObjectId(id), surface: Surface::new(friction, 0.0, 0.0), seen: Vec::new() }
    }

    #[test]
    fn test_add_and_invert() {
        let mut list = ContactList::new();
        list.reset(ObjectId(1), ObjectId(2));
        list.add_contact(Vec2::ZERO, Vec2::X, 0.5).unwrap();
        list.toggle_normal_inversion();
        list.add_contact(Vec2::ONE, Vec2::X, 0.25).unwrap();
        list.toggle_normal_inversion();
        assert_eq!(list.len(), 2);
        assert_eq!(list.as_slice()[0].normal, Vec2::X);
        assert_eq!(list.as_slice()[1].normal, -Vec2::X);
        assert_eq!(list.deepest().unwrap().depth, 0.5);
    }

    #[test]
    #[cfg_attr(debug_assertions, should_panic(expected = "contact list full"))]
    fn test_capacity_overflow_is_an_error() {
        let mut list = ContactList::new();
        list.reset(ObjectId(0), ObjectId(1));
        for _ in 0..CONTACT_CAPACITY {
            list.add_contact(Vec2::ZERO, Vec2::Y, 0.0).unwrap();
        }
        let err = list.add_contact(Vec2::ZERO, Vec2::Y, 0.0).unwrap_err();
        assert_eq!(err, FlatlandError::ContactCapacity { capacity: CONTACT_CAPACITY });
        assert_eq!(list.len(), CONTACT_CAPACITY);
    }

    #[test]
    fn test_reset_clears() {
        let mut list = ContactList::new();
        list.reset(ObjectId(0), ObjectId(1));
        list.toggle_normal_inversion();
        list.add_contact(Vec2::ZERO, Vec2::Y, 1.0).unwrap();
        list.reset(ObjectId(3), ObjectId(4));
        assert!(list.is_empty());
        assert!(!list.normals_inverted());
        assert_eq!((list.a(), list.b()), (ObjectId(3), ObjectId(4)));
    }

    #[test]
    fn test_finalize_combines_friction_and_orients_callbacks() {
        let mut a = party(1, 0.5);
        let mut b = party(2, 0.5);
        let mut list = ContactList::new();
        list.reset(a.id, b.id);
        list.add_contact(Vec2::ZERO, Vec2::X, 0.1).unwrap();
        list.finalize(&mut a, &mut b);

        assert_relative_eq!(list.surface().friction, 0.25);
        assert_eq!(a.seen, vec![(ObjectId(1), ObjectId(2), Vec2::X)]);
        assert_eq!(b.seen, vec![(ObjectId(2), ObjectId(1), -Vec2::X)]);
        // Restored after the callbacks.
        assert_eq!(list.a(), ObjectId(1));
        assert_eq!(list.as_slice()[0].normal, Vec2::X);
    }

    #[test]
    fn test_finalize_infinite_friction_wins() {
        let mut a = party(1, Surface::INFINITE_FRICTION);
        let mut b = party(2, 0.3);
        let mut list = ContactList::new();
        list.reset(a.id, b.id);
        list.add_contact(Vec2::ZERO, Vec2::X, 0.1).unwrap();
        list.finalize(&mut a, &mut b);
        assert!(list.surface().friction.is_infinite());
    }
}
