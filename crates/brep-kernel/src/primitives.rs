//! Higher-level primitive builders on top of truck's sweep API.
//!
//! truck has no built-in box/cylinder: everything is successive sweeps.

use gridfinity_types::vec3;
use truck_modeling::builder;
use truck_modeling::topology::{Edge, Solid, Vertex, Wire};
use truck_modeling::{Point3, Vector3};

use crate::types::{CurveSegment, KernelError};

const TOL: f64 = 1e-6;

pub(crate) fn point(p: [f64; 3]) -> Point3 {
    Point3::new(p[0], p[1], p[2])
}

pub(crate) fn vector(v: [f64; 3]) -> Vector3 {
    Vector3::new(v[0], v[1], v[2])
}

/// Create a box solid via successive translational sweeps.
/// Minimum corner at `origin`, extending by `size`.
pub fn make_box(origin: [f64; 3], size: [f64; 3]) -> Solid {
    let v = builder::vertex(point(origin));
    let edge = builder::tsweep(&v, Vector3::new(size[0], 0.0, 0.0));
    let face = builder::tsweep(&edge, Vector3::new(0.0, size[1], 0.0));
    builder::tsweep(&face, Vector3::new(0.0, 0.0, size[2]))
}

/// Build a truck wire from connected lines and three-point arcs.
///
/// Consecutive segments share vertices; a loop whose last end meets its
/// first start is closed onto the first vertex.
pub fn wire_from_segments(segments: &[CurveSegment]) -> Result<Wire, KernelError> {
    let (first, last) = match (segments.first(), segments.last()) {
        (Some(f), Some(l)) => (f, l),
        _ => {
            return Err(KernelError::InvalidInput {
                reason: "wire needs at least one segment".to_string(),
            })
        }
    };
    let closed = segments.len() > 1 && vec3::distance(last.end(), first.start()) < TOL;

    let mut vertices: Vec<Vertex> = segments
        .iter()
        .map(|s| builder::vertex(point(s.start())))
        .collect();
    if !closed {
        vertices.push(builder::vertex(point(last.end())));
    }

    let n = vertices.len();
    let edges: Vec<Edge> = segments
        .iter()
        .enumerate()
        .map(|(i, seg)| {
            let v0 = &vertices[i];
            let v1 = &vertices[(i + 1) % n];
            match seg {
                CurveSegment::Line { .. } => builder::line(v0, v1),
                CurveSegment::Arc { mid, .. } => builder::circle_arc(v0, v1, point(*mid)),
            }
        })
        .collect();
    Ok(Wire::from_iter(edges))
}

/// Closed circle made of two half arcs in the plane normal to `normal`.
pub fn circle_segments(center: [f64; 3], normal: [f64; 3], radius: f64) -> Option<Vec<CurveSegment>> {
    let n = vec3::normalize(normal)?;
    let helper = if n[0].abs() < 0.9 {
        [1.0, 0.0, 0.0]
    } else {
        [0.0, 1.0, 0.0]
    };
    let u = vec3::normalize(vec3::cross(n, helper))?;
    let v = vec3::cross(n, u);
    let at = |dir: [f64; 3], s: f64| vec3::add(center, vec3::scale(dir, s * radius));
    Some(vec![
        CurveSegment::arc(at(u, 1.0), at(v, 1.0), at(u, -1.0)),
        CurveSegment::arc(at(u, -1.0), at(v, -1.0), at(u, 1.0)),
    ])
}

/// Create a cylinder solid: circle wire → face → translational sweep.
pub fn make_cylinder(
    base_center: [f64; 3],
    axis: [f64; 3],
    radius: f64,
    height: f64,
) -> Result<Solid, KernelError> {
    let dir = vec3::normalize(axis).ok_or_else(|| KernelError::InvalidInput {
        reason: "cylinder axis has zero length".to_string(),
    })?;
    let segments = circle_segments(base_center, dir, radius).ok_or_else(|| {
        KernelError::InvalidInput {
            reason: "cylinder axis has zero length".to_string(),
        }
    })?;
    let wire = wire_from_segments(&segments)?;
    let face = builder::try_attach_plane(&[wire]).map_err(|e| KernelError::Other {
        message: format!("failed to create circular face: {e}"),
    })?;
    Ok(builder::tsweep(&face, vector(vec3::scale(dir, height))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_box_topology() {
        let solid = make_box([0.0; 3], [1.0, 2.0, 3.0]);

        let boundaries = solid.boundaries();
        assert_eq!(boundaries.len(), 1, "Box should have 1 shell");

        let shell = &boundaries[0];
        let faces: Vec<_> = shell.face_iter().collect();

        let mut edge_ids = std::collections::HashSet::new();
        for edge in shell.edge_iter() {
            edge_ids.insert(edge.id());
        }
        let mut vert_ids = std::collections::HashSet::new();
        for v in shell.vertex_iter() {
            vert_ids.insert(v.id());
        }

        assert_eq!(faces.len(), 6, "Box should have 6 faces");
        assert_eq!(edge_ids.len(), 12, "Box should have 12 edges");
        assert_eq!(vert_ids.len(), 8, "Box should have 8 vertices");
    }

    #[test]
    fn test_make_box_offset_origin() {
        let solid = make_box([5.0, 0.0, -1.0], [2.0, 3.0, 4.0]);
        let shell = &solid.boundaries()[0];

        let mut min = [f64::MAX; 3];
        let mut max = [f64::MIN; 3];
        for v in shell.vertex_iter() {
            let p = v.point();
            for i in 0..3 {
                min[i] = min[i].min(p[i]);
                max[i] = max[i].max(p[i]);
            }
        }

        let eps = 1e-10;
        assert!((min[0] - 5.0).abs() < eps);
        assert!((max[2] - 3.0).abs() < eps);
    }

    #[test]
    fn test_closed_wire_shares_first_vertex() {
        let p = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]];
        let segs: Vec<_> = (0..4).map(|i| CurveSegment::line(p[i], p[(i + 1) % 4])).collect();
        let wire = wire_from_segments(&segs).unwrap();
        assert!(wire.is_closed());
        assert_eq!(wire.len(), 4);
    }

    #[test]
    fn test_make_cylinder_has_caps() {
        let solid = make_cylinder([0.0; 3], [0.0, 0.0, 1.0], 1.0, 2.0).unwrap();
        let faces: Vec<_> = solid.boundaries()[0].face_iter().collect();
        assert!(faces.len() >= 3, "Cylinder should have at least 3 faces");
    }
}
