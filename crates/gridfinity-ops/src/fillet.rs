//! Edge selection by position, and fillets that tolerate empty selections.

use brep_kernel::{Kernel, KernelId, KernelIntrospect, ShapeHandle};
use tracing::debug;

use crate::kernel_ext::KernelBundle;
use crate::types::OpError;

const EDGE_TOL: f64 = 1e-6;

/// Edges parallel to z.
pub fn vertical_edges(
    kb: &dyn KernelBundle,
    shape: &ShapeHandle,
) -> Result<Vec<KernelId>, OpError> {
    Ok(kb
        .edges(shape)?
        .into_iter()
        .filter(|e| e.is_vertical(EDGE_TOL))
        .map(|e| e.id)
        .collect())
}

/// Edges lying entirely in the plane at height `z`.
pub fn edges_at_height(
    kb: &dyn KernelBundle,
    shape: &ShapeHandle,
    z: f64,
) -> Result<Vec<KernelId>, OpError> {
    Ok(kb
        .edges(shape)?
        .into_iter()
        .filter(|e| e.lies_at_height(z, EDGE_TOL))
        .map(|e| e.id)
        .collect())
}

/// Vertical edges whose x coordinate is `x`.
pub fn vertical_edges_at_x(
    kb: &dyn KernelBundle,
    shape: &ShapeHandle,
    x: f64,
) -> Result<Vec<KernelId>, OpError> {
    Ok(kb
        .edges(shape)?
        .into_iter()
        .filter(|e| {
            e.is_vertical(EDGE_TOL)
                && (e.start[0] - x).abs() < EDGE_TOL
                && (e.end[0] - x).abs() < EDGE_TOL
        })
        .map(|e| e.id)
        .collect())
}

/// Round the given edges. No edges or a non-positive radius leaves the
/// shape untouched.
pub fn fillet_edges(
    kb: &mut dyn KernelBundle,
    shape: ShapeHandle,
    radius: f64,
    edges: &[KernelId],
) -> Result<ShapeHandle, OpError> {
    if edges.is_empty() || radius <= 0.0 {
        debug!(radius, edges = edges.len(), "fillet skipped");
        return Ok(shape);
    }
    Ok(kb.fillet(&shape, radius, edges)?)
}
