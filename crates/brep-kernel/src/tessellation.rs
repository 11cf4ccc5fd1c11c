//! Mass properties of truck solids from their triangulation.
//!
//! truck exposes no exact volume integrals, so volume and centre of gravity
//! are summed over signed tetrahedra of the closed triangle mesh.

use truck_meshalgo::prelude::*;
use truck_meshalgo::tessellation::{MeshableShape, MeshedShape};

use crate::types::{BoundingBox, KernelError};

type TruckSolid = truck_modeling::Solid;

/// Volume, centroid and bounds of a meshed solid.
#[derive(Debug, Clone, Copy)]
pub struct MeshProperties {
    pub volume: f64,
    pub centroid: [f64; 3],
    pub bbox: BoundingBox,
}

/// Triangulate a solid at `tolerance` and integrate its mass properties.
pub fn mesh_properties(solid: &TruckSolid, tolerance: f64) -> Result<MeshProperties, KernelError> {
    let mesh = solid.triangulation(tolerance).to_polygon();
    let positions = mesh.positions();

    let bbox = BoundingBox::from_points(positions.iter().map(|p| [p[0], p[1], p[2]]))
        .ok_or_else(|| KernelError::Other {
            message: "tessellation produced no vertices".to_string(),
        })?;

    let mut volume = 0.0;
    let mut moment = [0.0; 3];
    for tri in mesh.tri_faces() {
        let a = positions[tri[0].pos];
        let b = positions[tri[1].pos];
        let c = positions[tri[2].pos];
        let v = tetra_volume(a, b, c);
        volume += v;
        for i in 0..3 {
            moment[i] += v * (a[i] + b[i] + c[i]) / 4.0;
        }
    }

    if volume.abs() < 1e-12 {
        return Err(KernelError::Other {
            message: "solid has zero volume".to_string(),
        });
    }
    Ok(MeshProperties {
        volume: volume.abs(),
        centroid: [moment[0] / volume, moment[1] / volume, moment[2] / volume],
        bbox,
    })
}

/// Signed volume of a triangulated solid; negative when its faces point inward.
pub fn signed_volume(solid: &TruckSolid, tolerance: f64) -> f64 {
    let mesh = solid.triangulation(tolerance).to_polygon();
    let positions = mesh.positions();
    mesh.tri_faces()
        .iter()
        .map(|tri| tetra_volume(positions[tri[0].pos], positions[tri[1].pos], positions[tri[2].pos]))
        .sum()
}

// Signed volume of the tetrahedron (origin, a, b, c).
fn tetra_volume(a: Point3, b: Point3, c: Point3) -> f64 {
    (a[0] * (b[1] * c[2] - b[2] * c[1]) - a[1] * (b[0] * c[2] - b[2] * c[0])
        + a[2] * (b[0] * c[1] - b[1] * c[0]))
        / 6.0
}
