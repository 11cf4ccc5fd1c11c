//! TruckKernel: real geometry kernel wrapping truck's API.
//!
//! Covers wires, planar faces, extrusion, boxes, cylinders, ruled lofts,
//! booleans and rigid motions. truck has no pipe sweep or fillet, so those
//! report `NotSupported`; features that need them only build on other kernels.

use std::collections::{HashMap, HashSet};

use tracing::debug;

// Import truck types selectively to avoid shadowing std::result::Result
use truck_modeling::builder;
use truck_modeling::topology::{Face, Shell, Solid, Wire};
use truck_modeling::Rad;

use crate::primitives::{self, point, vector};
use crate::tessellation;
use crate::traits::{Kernel, KernelIntrospect};
use crate::types::*;

/// Chord tolerance used when integrating mass properties.
const MESH_TOLERANCE: f64 = 0.01;
const BOOLEAN_TOLERANCE: f64 = 0.05;

/// Real geometry kernel backed by the truck BREP library.
pub struct TruckKernel {
    next_handle: u64,
    wires: HashMap<u64, Wire>,
    faces: HashMap<u64, Face>,
    solids: HashMap<u64, Solid>,
}

impl TruckKernel {
    pub fn new() -> Self {
        Self {
            next_handle: 1,
            wires: HashMap::new(),
            faces: HashMap::new(),
            solids: HashMap::new(),
        }
    }

    fn alloc_handle(&mut self) -> u64 {
        let h = self.next_handle;
        self.next_handle += 1;
        h
    }

    pub(crate) fn store_solid(&mut self, solid: Solid) -> ShapeHandle {
        let h = self.alloc_handle();
        self.solids.insert(h, solid);
        ShapeHandle(h)
    }

    fn store_wire(&mut self, wire: Wire) -> WireHandle {
        let h = self.alloc_handle();
        self.wires.insert(h, wire);
        WireHandle(h)
    }

    pub(crate) fn get_solid(&self, handle: &ShapeHandle) -> Result<&Solid, KernelError> {
        self.solids
            .get(&handle.id())
            .ok_or(KernelError::EntityNotFound {
                id: KernelId(handle.id()),
            })
    }

    fn properties(&self, shape: &ShapeHandle) -> Result<tessellation::MeshProperties, KernelError> {
        tessellation::mesh_properties(self.get_solid(shape)?, MESH_TOLERANCE)
    }
}

impl Default for TruckKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl Kernel for TruckKernel {
    fn make_wire(&mut self, segments: &[CurveSegment]) -> Result<WireHandle, KernelError> {
        let wire = primitives::wire_from_segments(segments)?;
        Ok(self.store_wire(wire))
    }

    fn make_circle(
        &mut self,
        center: Point3,
        normal: Vector3,
        radius: f64,
    ) -> Result<WireHandle, KernelError> {
        if radius <= 0.0 {
            return Err(KernelError::InvalidInput {
                reason: format!("circle radius must be positive, got {radius}"),
            });
        }
        let segments = primitives::circle_segments(center, normal, radius).ok_or_else(|| {
            KernelError::InvalidInput {
                reason: "circle normal has zero length".to_string(),
            }
        })?;
        self.make_wire(&segments)
    }

    fn make_face(&mut self, wire: &WireHandle) -> Result<FaceHandle, KernelError> {
        let wire = self
            .wires
            .get(&wire.id())
            .ok_or(KernelError::EntityNotFound {
                id: KernelId(wire.id()),
            })?
            .clone();
        let face = builder::try_attach_plane(&[wire]).map_err(|e| KernelError::Other {
            message: format!("failed to create planar face: {e}"),
        })?;
        let h = self.alloc_handle();
        self.faces.insert(h, face);
        Ok(FaceHandle(h))
    }

    fn extrude(&mut self, face: &FaceHandle, direction: Vector3) -> Result<ShapeHandle, KernelError> {
        let truck_face = self
            .faces
            .get(&face.id())
            .ok_or(KernelError::EntityNotFound {
                id: KernelId(face.id()),
            })?;
        let solid = builder::tsweep(truck_face, vector(direction));
        Ok(self.store_solid(solid))
    }

    fn make_box(&mut self, origin: Point3, size: Vector3) -> Result<ShapeHandle, KernelError> {
        if size.iter().any(|&s| s <= 0.0) {
            return Err(KernelError::InvalidInput {
                reason: format!("box dimensions must be positive, got {size:?}"),
            });
        }
        Ok(self.store_solid(primitives::make_box(origin, size)))
    }

    fn make_cylinder(
        &mut self,
        base_center: Point3,
        axis: Vector3,
        radius: f64,
        height: f64,
    ) -> Result<ShapeHandle, KernelError> {
        if radius <= 0.0 || height <= 0.0 {
            return Err(KernelError::InvalidInput {
                reason: format!("cylinder needs positive radius and height, got r={radius} h={height}"),
            });
        }
        let solid = primitives::make_cylinder(base_center, axis, radius, height)?;
        Ok(self.store_solid(solid))
    }

    fn make_loft(
        &mut self,
        sections: &[WireHandle],
        solid: bool,
        ruled: bool,
    ) -> Result<ShapeHandle, KernelError> {
        if sections.len() < 2 {
            return Err(KernelError::LoftFailed {
                reason: "a loft needs at least two sections".to_string(),
            });
        }
        if !solid {
            return Err(KernelError::NotSupported {
                operation: "make_loft (shell)".to_string(),
            });
        }
        if !ruled {
            debug!("truck lofts are ruled between sections");
        }

        let wires = sections
            .iter()
            .map(|s| {
                self.wires
                    .get(&s.id())
                    .cloned()
                    .ok_or(KernelError::EntityNotFound {
                        id: KernelId(s.id()),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let cap = |wire: &Wire| {
            builder::try_attach_plane(&[wire.clone()]).map_err(|e| KernelError::LoftFailed {
                reason: format!("failed to cap loft section: {e}"),
            })
        };
        let mut faces: Vec<Face> = vec![cap(&wires[0])?.inverse()];
        for pair in wires.windows(2) {
            let band: Shell = builder::try_wire_homotopy(&pair[0], &pair[1]).map_err(|e| {
                KernelError::LoftFailed {
                    reason: format!("sections do not match edge for edge: {e}"),
                }
            })?;
            faces.extend(band.face_iter().cloned());
        }
        faces.push(cap(&wires[wires.len() - 1])?);

        let mut loft = Solid::try_new(vec![Shell::from(faces)]).map_err(|e| {
            KernelError::LoftFailed {
                reason: format!("loft faces do not close: {e}"),
            }
        })?;
        // Sections wound clockwise come out inside-out.
        if tessellation::signed_volume(&loft, MESH_TOLERANCE) < 0.0 {
            loft.not();
        }
        debug!(sections = sections.len(), "lofted ruled solid");
        Ok(self.store_solid(loft))
    }

    fn make_pipe(
        &mut self,
        _path: &WireHandle,
        _profile: &WireHandle,
    ) -> Result<ShapeHandle, KernelError> {
        Err(KernelError::NotSupported {
            operation: "make_pipe".to_string(),
        })
    }

    fn fuse(&mut self, a: &ShapeHandle, b: &ShapeHandle) -> Result<ShapeHandle, KernelError> {
        let solid_a = self.get_solid(a)?.clone();
        let solid_b = self.get_solid(b)?.clone();

        let result = truck_shapeops::or(&solid_a, &solid_b, BOOLEAN_TOLERANCE).ok_or_else(|| {
            KernelError::BooleanFailed {
                reason: "truck or() returned None".to_string(),
            }
        })?;
        debug!(a = a.id(), b = b.id(), "fused solids");
        Ok(self.store_solid(result))
    }

    fn multi_fuse(&mut self, shapes: &[ShapeHandle]) -> Result<ShapeHandle, KernelError> {
        let (first, rest) = shapes.split_first().ok_or_else(|| KernelError::InvalidInput {
            reason: "multi_fuse needs at least one shape".to_string(),
        })?;
        let mut acc = *first;
        for shape in rest {
            acc = self.fuse(&acc, shape)?;
        }
        Ok(acc)
    }

    fn cut(&mut self, a: &ShapeHandle, b: &ShapeHandle) -> Result<ShapeHandle, KernelError> {
        let solid_a = self.get_solid(a)?.clone();
        let mut solid_b = self.get_solid(b)?.clone();

        // Subtraction = A ∩ ¬B. not() mutates in place.
        solid_b.not();
        let result = truck_shapeops::and(&solid_a, &solid_b, BOOLEAN_TOLERANCE).ok_or_else(|| {
            KernelError::BooleanFailed {
                reason: "truck and() returned None for subtraction".to_string(),
            }
        })?;
        debug!(a = a.id(), b = b.id(), "cut solids");
        Ok(self.store_solid(result))
    }

    fn translated(
        &mut self,
        shape: &ShapeHandle,
        v: Vector3,
    ) -> Result<ShapeHandle, KernelError> {
        let moved = builder::translated(self.get_solid(shape)?, vector(v));
        Ok(self.store_solid(moved))
    }

    fn rotated(
        &mut self,
        shape: &ShapeHandle,
        origin: Point3,
        axis: Vector3,
        angle_deg: f64,
    ) -> Result<ShapeHandle, KernelError> {
        let dir = gridfinity_types::vec3::normalize(axis).ok_or_else(|| {
            KernelError::InvalidInput {
                reason: "rotation axis has zero length".to_string(),
            }
        })?;
        let moved = builder::rotated(
            self.get_solid(shape)?,
            point(origin),
            vector(dir),
            Rad(angle_deg.to_radians()),
        );
        Ok(self.store_solid(moved))
    }

    fn fillet(
        &mut self,
        _shape: &ShapeHandle,
        _radius: f64,
        _edges: &[KernelId],
    ) -> Result<ShapeHandle, KernelError> {
        Err(KernelError::NotSupported {
            operation: "fillet".to_string(),
        })
    }

    /// truck leaves no splitter faces worth merging; returns an equal copy.
    fn remove_splitter(&mut self, shape: &ShapeHandle) -> Result<ShapeHandle, KernelError> {
        let solid = self.get_solid(shape)?.clone();
        Ok(self.store_solid(solid))
    }
}

impl KernelIntrospect for TruckKernel {
    /// Edge ids are positions in the solid's deduplicated edge order.
    fn edges(&self, shape: &ShapeHandle) -> Result<Vec<EdgeInfo>, KernelError> {
        let solid = self.get_solid(shape)?;
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for shell in solid.boundaries().iter() {
            for edge in shell.edge_iter() {
                if !seen.insert(edge.id()) {
                    continue;
                }
                let p = edge.front().point();
                let q = edge.back().point();
                let kind = match edge.curve() {
                    truck_modeling::geometry::Curve::Line(_) => EdgeKind::Line,
                    _ => EdgeKind::Other,
                };
                out.push(EdgeInfo {
                    id: KernelId(out.len() as u64),
                    start: [p[0], p[1], p[2]],
                    end: [q[0], q[1], q[2]],
                    kind,
                });
            }
        }
        Ok(out)
    }

    fn vertices(&self, shape: &ShapeHandle) -> Result<Vec<Point3>, KernelError> {
        let solid = self.get_solid(shape)?;
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for shell in solid.boundaries().iter() {
            for v in shell.vertex_iter() {
                if seen.insert(v.id()) {
                    let p = v.point();
                    out.push([p[0], p[1], p[2]]);
                }
            }
        }
        Ok(out)
    }

    fn volume(&self, shape: &ShapeHandle) -> Result<f64, KernelError> {
        Ok(self.properties(shape)?.volume)
    }

    fn center_of_gravity(&self, shape: &ShapeHandle) -> Result<Point3, KernelError> {
        Ok(self.properties(shape)?.centroid)
    }

    fn bounding_box(&self, shape: &ShapeHandle) -> Result<BoundingBox, KernelError> {
        Ok(self.properties(shape)?.bbox)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(w: f64, h: f64) -> Vec<CurveSegment> {
        let p = [[0.0, 0.0, 0.0], [w, 0.0, 0.0], [w, h, 0.0], [0.0, h, 0.0]];
        (0..4).map(|i| CurveSegment::line(p[i], p[(i + 1) % 4])).collect()
    }

    #[test]
    fn test_truck_kernel_wire_face_extrude() {
        let mut kernel = TruckKernel::new();
        let wire = kernel.make_wire(&rect(1.0, 1.0)).unwrap();
        let face = kernel.make_face(&wire).unwrap();
        let handle = kernel.extrude(&face, [0.0, 0.0, 2.0]).unwrap();

        let solid = kernel.get_solid(&handle).unwrap();
        let faces: Vec<_> = solid.boundaries()[0].face_iter().collect();
        assert_eq!(faces.len(), 6, "Extruded rectangle should have 6 faces");
    }

    #[test]
    fn test_truck_kernel_box_volume() {
        let mut kernel = TruckKernel::new();
        let handle = kernel.make_box([0.0; 3], [2.0, 3.0, 4.0]).unwrap();
        let volume = kernel.volume(&handle).unwrap();
        assert!((volume - 24.0).abs() < 1e-6, "box volume was {volume}");

        let c = kernel.center_of_gravity(&handle).unwrap();
        assert!((c[0] - 1.0).abs() < 1e-6);
        assert!((c[2] - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_truck_kernel_translate_moves_bounds() {
        let mut kernel = TruckKernel::new();
        let handle = kernel.make_box([0.0; 3], [1.0, 1.0, 1.0]).unwrap();
        let moved = kernel.translated(&handle, [5.0, 0.0, 0.0]).unwrap();
        let bb = kernel.bounding_box(&moved).unwrap();
        assert!((bb.min[0] - 5.0).abs() < 1e-9);
        assert!((bb.max[0] - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_truck_kernel_box_edges() {
        let mut kernel = TruckKernel::new();
        let handle = kernel.make_box([0.0; 3], [1.0, 1.0, 1.0]).unwrap();
        let edges = kernel.edges(&handle).unwrap();
        assert_eq!(edges.len(), 12);
        assert_eq!(edges.iter().filter(|e| e.is_vertical(1e-9)).count(), 4);
        assert_eq!(kernel.vertices(&handle).unwrap().len(), 8);
    }

    #[test]
    fn test_truck_kernel_unsupported_operations() {
        let mut kernel = TruckKernel::new();
        let handle = kernel.make_box([0.0; 3], [1.0, 1.0, 1.0]).unwrap();
        assert!(matches!(
            kernel.fillet(&handle, 0.1, &[]),
            Err(KernelError::NotSupported { .. })
        ));
        assert!(matches!(
            kernel.make_pipe(&WireHandle(0), &WireHandle(0)),
            Err(KernelError::NotSupported { .. })
        ));
    }

    fn square_at(half: f64, z: f64) -> Vec<CurveSegment> {
        let p = [[-half, -half, z], [half, -half, z], [half, half, z], [-half, half, z]];
        (0..4).map(|i| CurveSegment::line(p[i], p[(i + 1) % 4])).collect()
    }

    #[test]
    fn test_truck_kernel_ruled_loft_frustum_volume() {
        let mut kernel = TruckKernel::new();
        let bottom = kernel.make_wire(&square_at(1.0, 0.0)).unwrap();
        let top = kernel.make_wire(&square_at(2.0, 1.0)).unwrap();
        let handle = kernel.make_loft(&[bottom, top], true, true).unwrap();

        // h/3 * (A1 + A2 + sqrt(A1 A2)) with A1 = 4, A2 = 16.
        let volume = kernel.volume(&handle).unwrap();
        assert!((volume - 28.0 / 3.0).abs() < 1e-3, "frustum volume was {volume}");

        let bb = kernel.bounding_box(&handle).unwrap();
        assert!((bb.max[0] - 2.0).abs() < 1e-6);
        assert!((bb.max[2] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_truck_kernel_loft_needs_two_sections() {
        let mut kernel = TruckKernel::new();
        let only = kernel.make_wire(&square_at(1.0, 0.0)).unwrap();
        assert!(matches!(
            kernel.make_loft(&[only], true, true),
            Err(KernelError::LoftFailed { .. })
        ));
    }
}
