use cam_geom::Transform;
use serde::{Deserialize, Serialize};

/// A part context: a document with its own length unit and coordinate system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartId(pub u64);

/// A solid body, either a prototype or an assembly occurrence of one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BodyId(pub u64);

/// Kernel-internal face identifier. Stable for the lifetime of the kernel session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FaceId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeId(pub u64);

/// Placement of a prototype body inside an owning assembly part.
#[derive(Debug, Clone, PartialEq)]
pub struct Occurrence {
    /// The body whose geometry this occurrence shows.
    pub prototype: BodyId,
    /// The assembly part that owns the occurrence.
    pub owner: PartId,
    /// Maps owner-unit prototype coordinates into owner coordinates.
    pub placement: Transform,
}

/// Errors from geometry queries.
#[derive(Debug, Clone, thiserror::Error)]
pub enum KernelError {
    #[error("entity not found: {entity}")]
    EntityNotFound { entity: String },

    #[error("face {face:?} is not planar")]
    NotPlanar { face: FaceId },

    #[error("degenerate geometry: {reason}")]
    DegenerateGeometry { reason: String },

    #[error("unknown part: {part:?}")]
    UnknownPart { part: PartId },

    #[error("kernel error: {message}")]
    Other { message: String },
}
