//! flatland: 2D collision kernel (shapes, overlap tests, contact generation; no integration)

pub mod error;
pub mod math;
pub mod types;
pub mod api;
pub mod shape;
pub mod terrain;
pub mod contact;
pub mod narrowphase;
pub mod dispatch;
pub mod world;

pub use crate::error::{FlatlandError, Result};
pub use crate::math::Vec2Ext;
pub use crate::types::*;
pub use crate::api::*;
pub use crate::shape::{BoxShape, Circle, Composite, Member, Ownership, Shape};
pub use crate::terrain::Terrain;
pub use crate::contact::{CONTACT_CAPACITY, ContactList};
pub use crate::narrowphase::Narrowphase;
pub use crate::world::{ContactCallback, Object, World};
