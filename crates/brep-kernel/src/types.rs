use serde::{Deserialize, Serialize};

pub use gridfinity_types::{BoundingBox, CurveSegment, Point3, Vector3};

/// Opaque handle to a solid in the geometry kernel.
/// NEVER persisted. Valid only for the current kernel session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeHandle(pub(crate) u64);

/// Opaque handle to a wire (open or closed chain of edges).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WireHandle(pub(crate) u64);

/// Opaque handle to a planar face bounded by a closed wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FaceHandle(pub(crate) u64);

impl ShapeHandle {
    pub(crate) fn id(&self) -> u64 {
        self.0
    }
}

impl WireHandle {
    pub(crate) fn id(&self) -> u64 {
        self.0
    }
}

impl FaceHandle {
    pub(crate) fn id(&self) -> u64 {
        self.0
    }
}

/// Transient kernel-internal entity identifier.
/// Stable within a single kernel session but NOT across recomputes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KernelId(pub u64);

/// Geometric kind of an edge's underlying curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeKind {
    Line,
    Arc,
    Other,
}

/// An edge of a shape with its end points, used for fillet edge selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeInfo {
    pub id: KernelId,
    pub start: Point3,
    pub end: Point3,
    pub kind: EdgeKind,
}

impl EdgeInfo {
    /// True when the edge runs parallel to Z.
    pub fn is_vertical(&self, tol: f64) -> bool {
        (self.start[0] - self.end[0]).abs() < tol
            && (self.start[1] - self.end[1]).abs() < tol
            && (self.start[2] - self.end[2]).abs() > tol
    }

    /// True when both end points lie at height `z`.
    pub fn lies_at_height(&self, z: f64, tol: f64) -> bool {
        (self.start[2] - z).abs() < tol && (self.end[2] - z).abs() < tol
    }
}

/// Errors from kernel operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum KernelError {
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("boolean operation failed: {reason}")]
    BooleanFailed { reason: String },

    #[error("fillet failed: {reason}")]
    FilletFailed { reason: String },

    #[error("loft failed: {reason}")]
    LoftFailed { reason: String },

    #[error("sweep failed: {reason}")]
    SweepFailed { reason: String },

    #[error("entity not found: {id:?}")]
    EntityNotFound { id: KernelId },

    #[error("operation not supported: {operation}")]
    NotSupported { operation: String },

    #[error("kernel error: {message}")]
    Other { message: String },
}
