//! MockKernel: analytic test double implementing Kernel + KernelIntrospect.
//!
//! Instead of real topology every shape carries its volume, first moment of
//! volume, bounding box and a synthetic edge list. Extrusions, boxes,
//! cylinders, ruled lofts (Simpson's rule, exact for ruled sections) and
//! closed pipe sweeps (Pappus) are exact. Fuse adds and cut subtracts, so a
//! composite is exact when fused parts are disjoint and every cut tool lies
//! inside the body or misses its bounding box entirely. Fillets and splitter
//! removal leave the volume unchanged.

use std::collections::HashMap;
use std::f64::consts::PI;

use gridfinity_types::{planar_region, total_length, vec3, PlanarRegion};

use crate::traits::{Kernel, KernelIntrospect};
use crate::types::*;

const TOL: f64 = 1e-6;

#[derive(Debug, Clone)]
struct MockWire {
    segments: Vec<CurveSegment>,
    closed: bool,
}

#[derive(Debug, Clone)]
struct MockFace {
    segments: Vec<CurveSegment>,
    region: PlanarRegion,
}

/// A synthetic edge with known geometry.
#[derive(Debug, Clone)]
struct MockEdge {
    id: KernelId,
    segment: CurveSegment,
}

/// Mass properties of a shape; no faces are tracked.
#[derive(Debug, Clone)]
struct MockShape {
    volume: f64,
    /// Volume-weighted centroid, `∫ p dV`.
    moment: Vector3,
    bbox: BoundingBox,
    edges: Vec<MockEdge>,
}

/// Analytic test double for the geometry kernel.
/// Implements both Kernel and KernelIntrospect.
pub struct MockKernel {
    next_id: u64,
    next_handle: u64,
    wires: HashMap<u64, MockWire>,
    faces: HashMap<u64, MockFace>,
    shapes: HashMap<u64, MockShape>,
    calls: HashMap<&'static str, usize>,
}

impl MockKernel {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            next_handle: 1,
            wires: HashMap::new(),
            faces: HashMap::new(),
            shapes: HashMap::new(),
            calls: HashMap::new(),
        }
    }

    /// How many times a `Kernel` method was called, by method name.
    pub fn call_count(&self, operation: &str) -> usize {
        self.calls.get(operation).copied().unwrap_or(0)
    }

    /// Number of shapes created during this session.
    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    fn record(&mut self, operation: &'static str) {
        *self.calls.entry(operation).or_insert(0) += 1;
    }

    fn alloc_id(&mut self) -> KernelId {
        let id = KernelId(self.next_id);
        self.next_id += 1;
        id
    }

    fn alloc_handle(&mut self) -> u64 {
        let h = self.next_handle;
        self.next_handle += 1;
        h
    }

    fn store_shape(&mut self, shape: MockShape) -> ShapeHandle {
        let h = self.alloc_handle();
        self.shapes.insert(h, shape);
        ShapeHandle(h)
    }

    fn store_wire(&mut self, segments: Vec<CurveSegment>) -> WireHandle {
        let closed = match (segments.first(), segments.last()) {
            (Some(first), Some(last)) => vec3::distance(last.end(), first.start()) < TOL,
            _ => false,
        };
        let h = self.alloc_handle();
        self.wires.insert(h, MockWire { segments, closed });
        WireHandle(h)
    }

    fn shape(&self, handle: &ShapeHandle) -> Result<&MockShape, KernelError> {
        self.shapes
            .get(&handle.id())
            .ok_or(KernelError::EntityNotFound {
                id: KernelId(handle.id()),
            })
    }

    fn wire(&self, handle: &WireHandle) -> Result<&MockWire, KernelError> {
        self.wires
            .get(&handle.id())
            .ok_or(KernelError::EntityNotFound {
                id: KernelId(handle.id()),
            })
    }

    fn closed_region(&self, handle: &WireHandle) -> Result<(MockWire, PlanarRegion), KernelError> {
        let wire = self.wire(handle)?.clone();
        if !wire.closed {
            return Err(KernelError::InvalidInput {
                reason: "wire is not closed".to_string(),
            });
        }
        let region = planar_region(&wire.segments)
            .filter(|r| r.area > TOL)
            .ok_or_else(|| KernelError::InvalidInput {
                reason: "wire encloses no area".to_string(),
            })?;
        Ok((wire, region))
    }

    fn edges_from(&mut self, segments: &[CurveSegment]) -> Vec<MockEdge> {
        segments
            .iter()
            .map(|&segment| MockEdge {
                id: self.alloc_id(),
                segment,
            })
            .collect()
    }

    /// Copy of a shape with every edge mapped through `f` and given a fresh id.
    fn remap_edges(
        &mut self,
        edges: &[MockEdge],
        f: impl Fn(&CurveSegment) -> CurveSegment,
    ) -> Vec<MockEdge> {
        let segments: Vec<CurveSegment> = edges.iter().map(|e| f(&e.segment)).collect();
        self.edges_from(&segments)
    }

    fn combine(a: &MockShape, b: &MockShape) -> MockShape {
        let mut edges = a.edges.clone();
        edges.extend(b.edges.iter().cloned());
        MockShape {
            volume: a.volume + b.volume,
            moment: vec3::add(a.moment, b.moment),
            bbox: a.bbox.union(&b.bbox),
            edges,
        }
    }
}

impl Default for MockKernel {
    fn default() -> Self {
        Self::new()
    }
}

/// Average of two matching segments; the mid-section of a ruled loft.
fn average_segment(a: &CurveSegment, b: &CurveSegment) -> Option<CurveSegment> {
    let avg = |p: Point3, q: Point3| vec3::scale(vec3::add(p, q), 0.5);
    match (*a, *b) {
        (CurveSegment::Line { start: s0, end: e0 }, CurveSegment::Line { start: s1, end: e1 }) => {
            Some(CurveSegment::line(avg(s0, s1), avg(e0, e1)))
        }
        (
            CurveSegment::Arc {
                start: s0,
                mid: m0,
                end: e0,
            },
            CurveSegment::Arc {
                start: s1,
                mid: m1,
                end: e1,
            },
        ) => Some(CurveSegment::arc(avg(s0, s1), avg(m0, m1), avg(e0, e1))),
        _ => None,
    }
}

fn circle_segments(center: Point3, normal: Vector3, radius: f64) -> Option<Vec<CurveSegment>> {
    let n = vec3::normalize(normal)?;
    let helper = if n[0].abs() < 0.9 {
        [1.0, 0.0, 0.0]
    } else {
        [0.0, 1.0, 0.0]
    };
    let u = vec3::normalize(vec3::cross(n, helper))?;
    let v = vec3::cross(n, u);
    let at = |dir: Vector3, s: f64| vec3::add(center, vec3::scale(dir, s * radius));
    Some(vec![
        CurveSegment::arc(at(u, 1.0), at(v, 1.0), at(u, -1.0)),
        CurveSegment::arc(at(u, -1.0), at(v, -1.0), at(u, 1.0)),
    ])
}

impl Kernel for MockKernel {
    fn make_wire(&mut self, segments: &[CurveSegment]) -> Result<WireHandle, KernelError> {
        self.record("make_wire");
        if segments.is_empty() {
            return Err(KernelError::InvalidInput {
                reason: "wire needs at least one segment".to_string(),
            });
        }
        for pair in segments.windows(2) {
            if vec3::distance(pair[0].end(), pair[1].start()) > TOL {
                return Err(KernelError::InvalidInput {
                    reason: format!("wire segments are not connected at {:?}", pair[0].end()),
                });
            }
        }
        for seg in segments {
            if matches!(seg, CurveSegment::Arc { .. }) && seg.arc_geometry().is_none() {
                return Err(KernelError::InvalidInput {
                    reason: "arc points are collinear".to_string(),
                });
            }
            if seg.length() < TOL {
                return Err(KernelError::InvalidInput {
                    reason: "wire contains a degenerate segment".to_string(),
                });
            }
        }
        Ok(self.store_wire(segments.to_vec()))
    }

    fn make_circle(
        &mut self,
        center: Point3,
        normal: Vector3,
        radius: f64,
    ) -> Result<WireHandle, KernelError> {
        self.record("make_circle");
        if radius <= 0.0 {
            return Err(KernelError::InvalidInput {
                reason: format!("circle radius must be positive, got {radius}"),
            });
        }
        let segments = circle_segments(center, normal, radius).ok_or_else(|| {
            KernelError::InvalidInput {
                reason: "circle normal has zero length".to_string(),
            }
        })?;
        Ok(self.store_wire(segments))
    }

    fn make_face(&mut self, wire: &WireHandle) -> Result<FaceHandle, KernelError> {
        self.record("make_face");
        let (wire, region) = self.closed_region(wire)?;
        let off_plane = wire.segments.iter().flat_map(|s| s.sample(8)).any(|p| {
            vec3::dot(vec3::sub(p, region.centroid), region.normal).abs() > 1e-6
        });
        if off_plane {
            return Err(KernelError::InvalidInput {
                reason: "wire is not planar".to_string(),
            });
        }
        let h = self.alloc_handle();
        self.faces.insert(
            h,
            MockFace {
                segments: wire.segments,
                region,
            },
        );
        Ok(FaceHandle(h))
    }

    fn extrude(&mut self, face: &FaceHandle, vector: Vector3) -> Result<ShapeHandle, KernelError> {
        self.record("extrude");
        let face = self
            .faces
            .get(&face.id())
            .ok_or(KernelError::EntityNotFound {
                id: KernelId(face.id()),
            })?
            .clone();

        let swept = vec3::dot(face.region.vector_area, vector);
        if swept.abs() < TOL {
            return Err(KernelError::InvalidInput {
                reason: "extrusion vector lies in the face plane".to_string(),
            });
        }

        let base = BoundingBox::from_segments(&face.segments).ok_or_else(|| {
            KernelError::InvalidInput {
                reason: "face has no boundary".to_string(),
            }
        })?;
        let top: Vec<CurveSegment> = face.segments.iter().map(|s| s.translated(vector)).collect();
        let mut segments = face.segments.clone();
        segments.extend(top.iter().copied());
        segments.extend(
            face.segments
                .iter()
                .map(|s| CurveSegment::line(s.start(), vec3::add(s.start(), vector))),
        );

        let volume = swept.abs();
        let centroid = vec3::add(face.region.centroid, vec3::scale(vector, 0.5));
        let edges = self.edges_from(&segments);
        Ok(self.store_shape(MockShape {
            volume,
            moment: vec3::scale(centroid, volume),
            bbox: base.union(&base.translated(vector)),
            edges,
        }))
    }

    fn make_box(&mut self, origin: Point3, size: Vector3) -> Result<ShapeHandle, KernelError> {
        self.record("make_box");
        if size.iter().any(|&s| s <= 0.0) {
            return Err(KernelError::InvalidInput {
                reason: format!("box dimensions must be positive, got {size:?}"),
            });
        }
        let bbox = BoundingBox {
            min: origin,
            max: vec3::add(origin, size),
        };
        let c = bbox.corners();
        // 4 bottom, 4 top, 4 vertical
        let pairs = [
            (0, 1),
            (1, 2),
            (2, 3),
            (3, 0),
            (4, 5),
            (5, 6),
            (6, 7),
            (7, 4),
            (0, 4),
            (1, 5),
            (2, 6),
            (3, 7),
        ];
        let segments: Vec<CurveSegment> = pairs
            .iter()
            .map(|&(a, b)| CurveSegment::line(c[a], c[b]))
            .collect();
        let volume = size[0] * size[1] * size[2];
        let edges = self.edges_from(&segments);
        Ok(self.store_shape(MockShape {
            volume,
            moment: vec3::scale(bbox.center(), volume),
            bbox,
            edges,
        }))
    }

    fn make_cylinder(
        &mut self,
        base_center: Point3,
        axis: Vector3,
        radius: f64,
        height: f64,
    ) -> Result<ShapeHandle, KernelError> {
        self.record("make_cylinder");
        if radius <= 0.0 || height <= 0.0 {
            return Err(KernelError::InvalidInput {
                reason: format!("cylinder needs positive radius and height, got r={radius} h={height}"),
            });
        }
        let dir = vec3::normalize(axis).ok_or_else(|| KernelError::InvalidInput {
            reason: "cylinder axis has zero length".to_string(),
        })?;
        let lift = vec3::scale(dir, height);
        let bottom = circle_segments(base_center, dir, radius).ok_or_else(|| {
            KernelError::InvalidInput {
                reason: "cylinder axis has zero length".to_string(),
            }
        })?;
        let top: Vec<CurveSegment> = bottom.iter().map(|s| s.translated(lift)).collect();
        let mut segments = bottom.clone();
        segments.extend(top.iter().copied());
        segments.push(CurveSegment::line(bottom[0].start(), top[0].start()));

        let bbox = BoundingBox::from_segments(&segments).ok_or_else(|| KernelError::Other {
            message: "cylinder has no boundary".to_string(),
        })?;
        let volume = PI * radius * radius * height;
        let centroid = vec3::add(base_center, vec3::scale(lift, 0.5));
        let edges = self.edges_from(&segments);
        Ok(self.store_shape(MockShape {
            volume,
            moment: vec3::scale(centroid, volume),
            bbox,
            edges,
        }))
    }

    /// Piecewise-ruled between consecutive sections, also when `ruled` is false.
    fn make_loft(
        &mut self,
        sections: &[WireHandle],
        solid: bool,
        _ruled: bool,
    ) -> Result<ShapeHandle, KernelError> {
        self.record("make_loft");
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

        let mut profiles = Vec::with_capacity(sections.len());
        for section in sections {
            let (wire, region) = self
                .closed_region(section)
                .map_err(|e| KernelError::LoftFailed {
                    reason: e.to_string(),
                })?;
            profiles.push((wire, region));
        }

        let mut volume = 0.0;
        let mut moment = [0.0; 3];
        let mut segments = Vec::new();
        for pair in profiles.windows(2) {
            let (wa, ra) = &pair[0];
            let (wb, rb) = &pair[1];
            if wa.segments.len() != wb.segments.len() {
                return Err(KernelError::LoftFailed {
                    reason: format!(
                        "sections have different segment counts ({} vs {})",
                        wa.segments.len(),
                        wb.segments.len()
                    ),
                });
            }
            if vec3::dot(ra.normal, rb.normal) < 1.0 - 1e-9 {
                return Err(KernelError::LoftFailed {
                    reason: "sections are not parallel and equally oriented".to_string(),
                });
            }
            let mid = wa
                .segments
                .iter()
                .zip(&wb.segments)
                .map(|(a, b)| average_segment(a, b))
                .collect::<Option<Vec<_>>>()
                .ok_or_else(|| KernelError::LoftFailed {
                    reason: "sections mix lines and arcs at the same position".to_string(),
                })?;
            let rm = planar_region(&mid).ok_or_else(|| KernelError::LoftFailed {
                reason: "loft mid-section is degenerate".to_string(),
            })?;
            let h = vec3::dot(vec3::sub(rb.centroid, ra.centroid), ra.normal).abs();
            if h < TOL {
                return Err(KernelError::LoftFailed {
                    reason: "consecutive sections are coplanar".to_string(),
                });
            }

            volume += h / 6.0 * (ra.area + 4.0 * rm.area + rb.area);
            let weighted = vec3::add(
                vec3::add(
                    vec3::scale(ra.centroid, ra.area),
                    vec3::scale(rm.centroid, 4.0 * rm.area),
                ),
                vec3::scale(rb.centroid, rb.area),
            );
            moment = vec3::add(moment, vec3::scale(weighted, h / 6.0));

            segments.extend(
                wa.segments
                    .iter()
                    .zip(&wb.segments)
                    .map(|(a, b)| CurveSegment::line(a.start(), b.start())),
            );
        }
        for (wire, _) in &profiles {
            segments.extend(wire.segments.iter().copied());
        }

        let bbox = BoundingBox::from_segments(&segments).ok_or_else(|| KernelError::LoftFailed {
            reason: "loft has no boundary".to_string(),
        })?;
        let edges = self.edges_from(&segments);
        Ok(self.store_shape(MockShape {
            volume,
            moment,
            bbox,
            edges,
        }))
    }

    fn make_pipe(
        &mut self,
        path: &WireHandle,
        profile: &WireHandle,
    ) -> Result<ShapeHandle, KernelError> {
        self.record("make_pipe");
        let sweep_err = |e: KernelError| KernelError::SweepFailed {
            reason: e.to_string(),
        };
        let (path, path_region) = self.closed_region(path).map_err(sweep_err)?;
        let (profile, profile_region) = self.closed_region(profile).map_err(sweep_err)?;

        let start = path.segments[0].start();
        let tangent = path.segments[0]
            .start_tangent()
            .ok_or_else(|| KernelError::SweepFailed {
                reason: "path starts with a degenerate segment".to_string(),
            })?;
        if vec3::dot(profile_region.normal, tangent).abs() < 1.0 - 1e-6 {
            return Err(KernelError::SweepFailed {
                reason: "profile plane is not perpendicular to the path".to_string(),
            });
        }

        let normal = path_region.normal;
        let inward = vec3::cross(normal, tangent);
        let offset = vec3::sub(profile_region.centroid, start);
        // Pappus: the profile centroid travels along the path offset inward by d.
        let d = vec3::dot(offset, inward);
        let centroid_path = total_length(&path.segments) - 2.0 * PI * d;
        if centroid_path <= 0.0 {
            return Err(KernelError::SweepFailed {
                reason: "profile lies inside the path's curvature".to_string(),
            });
        }
        let volume = profile_region.area * centroid_path;
        let centroid = vec3::add(
            path_region.centroid,
            vec3::scale(normal, vec3::dot(offset, normal)),
        );

        let samples: Vec<Point3> = profile.segments.iter().flat_map(|s| s.sample(16)).collect();
        let outward = samples
            .iter()
            .map(|p| -vec3::dot(vec3::sub(*p, start), inward))
            .fold(0.0_f64, f64::max);
        let (w_min, w_max) = samples
            .iter()
            .map(|p| vec3::dot(vec3::sub(*p, start), normal))
            .fold((f64::MAX, f64::MIN), |(lo, hi), w| (lo.min(w), hi.max(w)));

        let mut bbox = BoundingBox::from_segments(&path.segments).ok_or_else(|| {
            KernelError::SweepFailed {
                reason: "path has no boundary".to_string(),
            }
        })?;
        for i in 0..3 {
            if normal[i].abs() > 1.0 - 1e-9 {
                let (a, b) = (start[i] + w_min * normal[i], start[i] + w_max * normal[i]);
                bbox.min[i] = a.min(b);
                bbox.max[i] = a.max(b);
            } else {
                bbox.min[i] -= outward;
                bbox.max[i] += outward;
            }
        }

        let mut segments = profile.segments.clone();
        segments.extend(path.segments.iter().copied());
        let edges = self.edges_from(&segments);
        Ok(self.store_shape(MockShape {
            volume,
            moment: vec3::scale(centroid, volume),
            bbox,
            edges,
        }))
    }

    fn fuse(&mut self, a: &ShapeHandle, b: &ShapeHandle) -> Result<ShapeHandle, KernelError> {
        self.record("fuse");
        let result = Self::combine(self.shape(a)?, self.shape(b)?);
        Ok(self.store_shape(result))
    }

    fn multi_fuse(&mut self, shapes: &[ShapeHandle]) -> Result<ShapeHandle, KernelError> {
        self.record("multi_fuse");
        let (first, rest) = shapes.split_first().ok_or_else(|| KernelError::InvalidInput {
            reason: "multi_fuse needs at least one shape".to_string(),
        })?;
        let mut acc = self.shape(first)?.clone();
        for handle in rest {
            acc = Self::combine(&acc, self.shape(handle)?);
        }
        Ok(self.store_shape(acc))
    }

    fn cut(&mut self, a: &ShapeHandle, b: &ShapeHandle) -> Result<ShapeHandle, KernelError> {
        self.record("cut");
        let body = self.shape(a)?.clone();
        let tool = self.shape(b)?.clone();
        if !body.bbox.overlaps(&tool.bbox, TOL) {
            return Ok(self.store_shape(body));
        }
        let volume = body.volume - tool.volume;
        if volume <= TOL {
            return Err(KernelError::BooleanFailed {
                reason: format!(
                    "cut removes the whole body ({:.3} - {:.3})",
                    body.volume, tool.volume
                ),
            });
        }
        let mut edges = body.edges;
        edges.extend(tool.edges);
        Ok(self.store_shape(MockShape {
            volume,
            moment: vec3::sub(body.moment, tool.moment),
            bbox: body.bbox,
            edges,
        }))
    }

    fn translated(
        &mut self,
        shape: &ShapeHandle,
        vector: Vector3,
    ) -> Result<ShapeHandle, KernelError> {
        self.record("translated");
        let src = self.shape(shape)?.clone();
        let edges = self.remap_edges(&src.edges, |s| s.translated(vector));
        Ok(self.store_shape(MockShape {
            volume: src.volume,
            moment: vec3::add(src.moment, vec3::scale(vector, src.volume)),
            bbox: src.bbox.translated(vector),
            edges,
        }))
    }

    fn rotated(
        &mut self,
        shape: &ShapeHandle,
        origin: Point3,
        axis: Vector3,
        angle_deg: f64,
    ) -> Result<ShapeHandle, KernelError> {
        self.record("rotated");
        let axis = vec3::normalize(axis).ok_or_else(|| KernelError::InvalidInput {
            reason: "rotation axis has zero length".to_string(),
        })?;
        let angle = angle_deg.to_radians();
        let src = self.shape(shape)?.clone();
        let centroid = vec3::scale(src.moment, 1.0 / src.volume);
        let centroid = vec3::rotate_about(centroid, origin, axis, angle);
        let bbox = BoundingBox::from_points(
            src.bbox
                .corners()
                .iter()
                .map(|&c| vec3::rotate_about(c, origin, axis, angle)),
        )
        .unwrap_or(src.bbox);
        let edges = self.remap_edges(&src.edges, |s| s.rotated(origin, axis, angle));
        Ok(self.store_shape(MockShape {
            volume: src.volume,
            moment: vec3::scale(centroid, src.volume),
            bbox,
            edges,
        }))
    }

    fn fillet(
        &mut self,
        shape: &ShapeHandle,
        radius: f64,
        edges: &[KernelId],
    ) -> Result<ShapeHandle, KernelError> {
        self.record("fillet");
        if radius <= 0.0 {
            return Err(KernelError::FilletFailed {
                reason: format!("fillet radius must be positive, got {radius}"),
            });
        }
        if edges.is_empty() {
            return Err(KernelError::FilletFailed {
                reason: "no edges selected".to_string(),
            });
        }
        let src = self.shape(shape)?.clone();
        if let Some(missing) = edges
            .iter()
            .find(|id| !src.edges.iter().any(|e| e.id == **id))
        {
            return Err(KernelError::EntityNotFound { id: *missing });
        }
        Ok(self.store_shape(src))
    }

    fn remove_splitter(&mut self, shape: &ShapeHandle) -> Result<ShapeHandle, KernelError> {
        self.record("remove_splitter");
        let src = self.shape(shape)?.clone();
        Ok(self.store_shape(src))
    }
}

impl KernelIntrospect for MockKernel {
    fn edges(&self, shape: &ShapeHandle) -> Result<Vec<EdgeInfo>, KernelError> {
        Ok(self
            .shape(shape)?
            .edges
            .iter()
            .map(|e| EdgeInfo {
                id: e.id,
                start: e.segment.start(),
                end: e.segment.end(),
                kind: match e.segment {
                    CurveSegment::Line { .. } => EdgeKind::Line,
                    CurveSegment::Arc { .. } => EdgeKind::Arc,
                },
            })
            .collect())
    }

    fn vertices(&self, shape: &ShapeHandle) -> Result<Vec<Point3>, KernelError> {
        let mut points: Vec<Point3> = Vec::new();
        for edge in &self.shape(shape)?.edges {
            for p in [edge.segment.start(), edge.segment.end()] {
                if !points.iter().any(|q| vec3::distance(*q, p) < TOL) {
                    points.push(p);
                }
            }
        }
        Ok(points)
    }

    fn volume(&self, shape: &ShapeHandle) -> Result<f64, KernelError> {
        Ok(self.shape(shape)?.volume)
    }

    fn center_of_gravity(&self, shape: &ShapeHandle) -> Result<Point3, KernelError> {
        let s = self.shape(shape)?;
        Ok(vec3::scale(s.moment, 1.0 / s.volume))
    }

    fn bounding_box(&self, shape: &ShapeHandle) -> Result<BoundingBox, KernelError> {
        Ok(self.shape(shape)?.bbox)
    }
}
