use glam::Vec2;

use crate::api::{ContactParty, ContactSink, RigidBody};
use crate::contact::ContactList;
use crate::dispatch;
use crate::error::{FlatlandError, Result};
use crate::shape::Shape;
use crate::types::*;

/// Per-object hook run once for every finalized pair the object takes part in.
pub type ContactCallback = Box<dyn FnMut(&ContactList)>;

/// A shape registered with a [`World`], optionally driven by a rigid body.
pub struct Object<B> {
    id: ObjectId,
    shape: Shape,
    body: Option<B>,
    surface: Surface,
    on_contact: Option<ContactCallback>,
}

impl<B: RigidBody> Object<B> {
    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Direct shape access. Bounds stay current because every shape mutator
    /// refreshes them.
    pub fn shape_mut(&mut self) -> &mut Shape {
        &mut self.shape
    }

    pub fn body(&self) -> Option<&B> {
        self.body.as_ref()
    }

    pub fn body_mut(&mut self) -> Option<&mut B> {
        self.body.as_mut()
    }

    /// Objects without a body are static scenery.
    pub fn is_dynamic(&self) -> bool {
        self.body.as_ref().is_some_and(|b| b.is_dynamic())
    }
}

impl<B: RigidBody> ContactParty for Object<B> {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn surface(&self) -> Surface {
        self.surface
    }

    fn notify(&mut self, contacts: &ContactList) {
        if let Some(cb) = self.on_contact.as_mut() {
            cb(contacts);
        }
    }
}

/// Collision glue between shapes and an external physics engine.
///
/// Owns the shapes, keeps them in step with their bodies, and on
/// [`collide`](Self::collide) hands every touching pair's contacts to a
/// [`ContactSink`].
pub struct World<B: RigidBody> {
    cfg: WorldConfig,
    objects: Vec<Object<B>>,
    next_id: u32,
    contacts: ContactList,
}

impl<B: RigidBody> World<B> {
    pub fn new(cfg: WorldConfig) -> Result<Self> {
        cfg.validate()?;
        Ok(Self { cfg, objects: Vec::new(), next_id: 0, contacts: ContactList::new() })
    }

    pub fn config(&self) -> &WorldConfig {
        &self.cfg
    }

    /// Register a shape. A body, if given, receives the shape's mass at the
    /// configured default density.
    pub fn insert(&mut self, shape: impl Into<Shape>, mut body: Option<B>) -> ObjectId {
        let shape = shape.into();
        if let Some(b) = body.as_mut() {
            shape.set_mass(b, self.cfg.default_density);
        }
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        tracing::debug!(id = id.0, kind = ?shape.kind(), "object inserted");
        self.objects.push(Object {
            id,
            shape,
            body,
            surface: self.cfg.default_surface,
            on_contact: None,
        });
        id
    }

    pub fn remove(&mut self, id: ObjectId) -> Result<Object<B>> {
        let index = self.index_of(id)?;
        Ok(self.objects.remove(index))
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn objects(&self) -> impl Iterator<Item = &Object<B>> {
        self.objects.iter()
    }

    pub fn object(&self, id: ObjectId) -> Result<&Object<B>> {
        let index = self.index_of(id)?;
        Ok(&self.objects[index])
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Result<&mut Object<B>> {
        let index = self.index_of(id)?;
        Ok(&mut self.objects[index])
    }

    pub fn set_surface(&mut self, id: ObjectId, surface: Surface) -> Result<()> {
        self.object_mut(id)?.surface = surface;
        Ok(())
    }

    pub fn set_contact_callback(
        &mut self,
        id: ObjectId,
        callback: impl FnMut(&ContactList) + 'static,
    ) -> Result<()> {
        self.object_mut(id)?.on_contact = Some(Box::new(callback));
        Ok(())
    }

    /// Recompute the body's mass from the shape at `density`.
    pub fn set_mass(&mut self, id: ObjectId, density: f32) -> Result<()> {
        if !(density.is_finite() && density > 0.0) {
            return Err(FlatlandError::InvalidGeometry { reason: "density must be positive" });
        }
        let obj = self.object_mut(id)?;
        if let Some(body) = obj.body.as_mut() {
            obj.shape.set_mass(body, density);
        }
        Ok(())
    }

    /// Translate shape and body together.
    pub fn move_by(&mut self, id: ObjectId, delta: Vec2) -> Result<()> {
        let obj = self.object_mut(id)?;
        obj.shape.translate(delta);
        if let Some(body) = obj.body.as_mut() {
            body.set_position(body.position() + delta);
        }
        Ok(())
    }

    /// Rotate shape and body together by `angle` radians.
    pub fn rotate(&mut self, id: ObjectId, angle: f32) -> Result<()> {
        let obj = self.object_mut(id)?;
        if obj.shape.kind() == ShapeKind::Terrain {
            tracing::warn!(id = id.0, "terrain cannot be rotated; ignoring rotation request");
            return Ok(());
        }
        obj.shape.rotate(angle);
        if let Some(body) = obj.body.as_mut() {
            body.set_rotation(body.rotation() + angle);
        }
        Ok(())
    }

    pub fn set_center(&mut self, id: ObjectId, center: Vec2) -> Result<()> {
        let obj = self.object_mut(id)?;
        obj.shape.set_center(center);
        if let Some(body) = obj.body.as_mut() {
            body.set_position(center);
        }
        Ok(())
    }

    /// Pull body transforms into the shapes, typically after a physics step.
    pub fn sync_from_bodies(&mut self) {
        for obj in &mut self.objects {
            let Some(body) = obj.body.as_ref() else { continue };
            obj.shape.set_center(body.position());
            if obj.shape.kind() != ShapeKind::Terrain {
                obj.shape.set_axis(Vec2::from_angle(body.rotation()));
            }
        }
    }

    /// Collide two specific objects into `contacts`, finalizing on a hit.
    ///
    /// Returns whether any contact was produced.
    pub fn collide_pair(
        &mut self,
        a: ObjectId,
        b: ObjectId,
        contacts: &mut ContactList,
    ) -> Result<bool> {
        let (ia, ib) = (self.index_of(a)?, self.index_of(b)?);
        let (oa, ob) = match ia.cmp(&ib) {
            core::cmp::Ordering::Less => {
                let (head, tail) = self.objects.split_at_mut(ib);
                (&mut head[ia], &mut tail[0])
            }
            core::cmp::Ordering::Greater => {
                let (head, tail) = self.objects.split_at_mut(ia);
                (&mut tail[0], &mut head[ib])
            }
            core::cmp::Ordering::Equal => return Err(FlatlandError::SelfPair(a.0)),
        };
        collide_objects(oa, ob, contacts)
    }

    /// Run every candidate pair and forward finalized contacts to `sink`.
    ///
    /// Returns the number of touching pairs.
    pub fn collide<S: ContactSink + ?Sized>(&mut self, sink: &mut S) -> Result<usize> {
        let mut touching = 0;
        for j in 1..self.objects.len() {
            let (head, tail) = self.objects.split_at_mut(j);
            let b = &mut tail[0];
            for a in head.iter_mut() {
                if self.cfg.skip_static_pairs && !a.is_dynamic() && !b.is_dynamic() {
                    continue;
                }
                if collide_objects(a, b, &mut self.contacts)? {
                    sink.add_contacts(&self.contacts);
                    touching += 1;
                }
            }
        }
        tracing::debug!(objects = self.objects.len(), touching, "collision pass done");
        Ok(touching)
    }

    fn index_of(&self, id: ObjectId) -> Result<usize> {
        // Ids are handed out in increasing order and removal keeps order.
        self.objects
            .binary_search_by_key(&id, |o| o.id)
            .map_err(|_| FlatlandError::UnknownObject(id.0))
    }
}

/// Reset, test, find and finalize one pair.
///
/// A pair that overflows the contact list is an error and is never finalized.
fn collide_objects<B: RigidBody>(
    a: &mut Object<B>,
    b: &mut Object<B>,
    contacts: &mut ContactList,
) -> Result<bool> {
    contacts.reset(a.id, b.id);
    if !dispatch::test(&a.shape, &b.shape) {
        return Ok(false);
    }
    if dispatch::find(&a.shape, &b.shape, contacts)? == 0 {
        return Ok(false);
    }
    contacts.finalize(a, b);
    Ok(true)
}
