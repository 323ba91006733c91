//! Error types for collision kernel operations.

use thiserror::Error;

/// Errors raised when a caller breaks a kernel precondition.
///
/// Overlap misses are not errors; they surface as `false` / zero contacts.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FlatlandError {
    /// Terrain vertices must be pushed strictly left to right.
    #[error("terrain vertex x={attempted} must be greater than previous x={previous}")]
    TerrainOrder {
        /// X of the last accepted vertex.
        previous: f32,
        /// X of the rejected vertex.
        attempted: f32,
    },

    /// A contact list ran out of slots.
    #[error("contact list capacity exceeded (capacity={capacity})")]
    ContactCapacity {
        /// Fixed capacity of the list.
        capacity: usize,
    },

    /// Shape construction received unusable geometry.
    #[error("invalid shape geometry: {reason}")]
    InvalidGeometry {
        /// What was wrong with the input.
        reason: &'static str,
    },

    /// Object id not known to the world.
    #[error("unknown object id: {0}")]
    UnknownObject(u32),

    /// Both sides of a requested pair are the same object.
    #[error("object {0} cannot be paired with itself")]
    SelfPair(u32),

    /// World configuration failed validation.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Which parameter was rejected.
        reason: &'static str,
    },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, FlatlandError>;
