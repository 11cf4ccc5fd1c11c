use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// A point in model space, millimetres, Z up.
pub type Point3 = [f64; 3];

/// A direction or displacement in model space.
pub type Vector3 = [f64; 3];

/// Small free-function vector algebra over `[f64; 3]`.
pub mod vec3 {
    use super::{Point3, Vector3};

    pub fn add(a: Vector3, b: Vector3) -> Vector3 {
        [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
    }

    pub fn sub(a: Point3, b: Point3) -> Vector3 {
        [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
    }

    pub fn scale(a: Vector3, s: f64) -> Vector3 {
        [a[0] * s, a[1] * s, a[2] * s]
    }

    pub fn dot(a: Vector3, b: Vector3) -> f64 {
        a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
    }

    pub fn cross(a: Vector3, b: Vector3) -> Vector3 {
        [
            a[1] * b[2] - a[2] * b[1],
            a[2] * b[0] - a[0] * b[2],
            a[0] * b[1] - a[1] * b[0],
        ]
    }

    pub fn norm(a: Vector3) -> f64 {
        dot(a, a).sqrt()
    }

    pub fn distance(a: Point3, b: Point3) -> f64 {
        norm(sub(a, b))
    }

    /// Unit vector along `a`, or `None` for a (near) zero vector.
    pub fn normalize(a: Vector3) -> Option<Vector3> {
        let n = norm(a);
        if n < 1e-12 {
            None
        } else {
            Some(scale(a, 1.0 / n))
        }
    }

    /// Rotate `p` about the axis through `origin` along unit `axis` by `angle` radians.
    pub fn rotate_about(p: Point3, origin: Point3, axis: Vector3, angle: f64) -> Point3 {
        let v = sub(p, origin);
        let (s, c) = angle.sin_cos();
        let term1 = scale(v, c);
        let term2 = scale(cross(axis, v), s);
        let term3 = scale(axis, dot(axis, v) * (1.0 - c));
        add(origin, add(term1, add(term2, term3)))
    }
}

/// One edge of a wire: a straight line or a circular arc through three points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CurveSegment {
    Line { start: Point3, end: Point3 },
    Arc { start: Point3, mid: Point3, end: Point3 },
}

/// Centre, radius, plane normal and swept angle of a three-point arc.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcGeometry {
    pub center: Point3,
    pub radius: f64,
    /// Unit normal oriented so the arc runs counter-clockwise about it.
    pub normal: Vector3,
    /// Swept angle in radians, in `(0, 2π)`.
    pub sweep: f64,
}

impl ArcGeometry {
    /// Point at fraction `t ∈ [0, 1]` along the arc.
    pub fn point_at(&self, start: Point3, t: f64) -> Point3 {
        let q = vec3::sub(start, self.center);
        let phi = self.sweep * t;
        let perp = vec3::cross(self.normal, q);
        vec3::add(
            self.center,
            vec3::add(vec3::scale(q, phi.cos()), vec3::scale(perp, phi.sin())),
        )
    }
}

impl CurveSegment {
    pub fn line(start: Point3, end: Point3) -> Self {
        CurveSegment::Line { start, end }
    }

    pub fn arc(start: Point3, mid: Point3, end: Point3) -> Self {
        CurveSegment::Arc { start, mid, end }
    }

    pub fn start(&self) -> Point3 {
        match self {
            CurveSegment::Line { start, .. } | CurveSegment::Arc { start, .. } => *start,
        }
    }

    pub fn end(&self) -> Point3 {
        match self {
            CurveSegment::Line { end, .. } | CurveSegment::Arc { end, .. } => *end,
        }
    }

    /// Circle through the three arc points. `None` for lines and collinear points.
    pub fn arc_geometry(&self) -> Option<ArcGeometry> {
        let CurveSegment::Arc { start, mid, end } = *self else {
            return None;
        };
        let a = vec3::sub(start, end);
        let b = vec3::sub(mid, end);
        let axb = vec3::cross(a, b);
        let denom = 2.0 * vec3::dot(axb, axb);
        if denom < 1e-18 {
            return None;
        }
        let num = vec3::cross(
            vec3::sub(vec3::scale(b, vec3::dot(a, a)), vec3::scale(a, vec3::dot(b, b))),
            axb,
        );
        let center = vec3::add(end, vec3::scale(num, 1.0 / denom));
        let radius = vec3::distance(start, center);
        let normal = vec3::normalize(vec3::cross(vec3::sub(mid, start), vec3::sub(end, mid)))?;

        let qs = vec3::sub(start, center);
        let qe = vec3::sub(end, center);
        let mut sweep = vec3::dot(vec3::cross(qs, qe), normal).atan2(vec3::dot(qs, qe));
        if sweep <= 0.0 {
            sweep += 2.0 * PI;
        }
        Some(ArcGeometry {
            center,
            radius,
            normal,
            sweep,
        })
    }

    pub fn length(&self) -> f64 {
        match self {
            CurveSegment::Line { start, end } => vec3::distance(*start, *end),
            CurveSegment::Arc { start, end, .. } => match self.arc_geometry() {
                Some(g) => g.radius * g.sweep,
                None => vec3::distance(*start, *end),
            },
        }
    }

    pub fn translated(&self, v: Vector3) -> Self {
        match *self {
            CurveSegment::Line { start, end } => CurveSegment::Line {
                start: vec3::add(start, v),
                end: vec3::add(end, v),
            },
            CurveSegment::Arc { start, mid, end } => CurveSegment::Arc {
                start: vec3::add(start, v),
                mid: vec3::add(mid, v),
                end: vec3::add(end, v),
            },
        }
    }

    pub fn rotated(&self, origin: Point3, axis: Vector3, angle: f64) -> Self {
        let r = |p| vec3::rotate_about(p, origin, axis, angle);
        match *self {
            CurveSegment::Line { start, end } => CurveSegment::Line {
                start: r(start),
                end: r(end),
            },
            CurveSegment::Arc { start, mid, end } => CurveSegment::Arc {
                start: r(start),
                mid: r(mid),
                end: r(end),
            },
        }
    }

    /// `n + 1` points along the segment, endpoints included.
    pub fn sample(&self, n: usize) -> Vec<Point3> {
        let n = n.max(1);
        match *self {
            CurveSegment::Line { start, end } => (0..=n)
                .map(|i| {
                    let t = i as f64 / n as f64;
                    vec3::add(start, vec3::scale(vec3::sub(end, start), t))
                })
                .collect(),
            CurveSegment::Arc { start, mid, end } => match self.arc_geometry() {
                Some(g) => (0..=n).map(|i| g.point_at(start, i as f64 / n as f64)).collect(),
                None => vec![start, mid, end],
            },
        }
    }

    /// Unit tangent at the start of the segment.
    pub fn start_tangent(&self) -> Option<Vector3> {
        match *self {
            CurveSegment::Line { start, end } => vec3::normalize(vec3::sub(end, start)),
            CurveSegment::Arc { start, .. } => {
                let g = self.arc_geometry()?;
                vec3::normalize(vec3::cross(g.normal, vec3::sub(start, g.center)))
            }
        }
    }
}

/// Area, orientation and centroid of a closed planar loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanarRegion {
    /// `½∮ p × dp`; its length is the enclosed area.
    pub vector_area: Vector3,
    pub area: f64,
    /// Unit normal; the loop runs counter-clockwise about it.
    pub normal: Vector3,
    pub centroid: Point3,
}

/// Exact area properties of a closed loop of lines and arcs.
///
/// The loop is fanned from its first point into triangles, with each arc
/// adding the circular segment between its chord and the arc.
pub fn planar_region(segments: &[CurveSegment]) -> Option<PlanarRegion> {
    let origin = segments.first()?.start();
    let mut pieces: Vec<(Vector3, Point3)> = Vec::with_capacity(segments.len() * 2);

    for seg in segments {
        let a = seg.start();
        let b = seg.end();
        let tri = vec3::scale(vec3::cross(vec3::sub(a, origin), vec3::sub(b, origin)), 0.5);
        let tri_centroid = vec3::scale(vec3::add(origin, vec3::add(a, b)), 1.0 / 3.0);
        pieces.push((tri, tri_centroid));

        if let Some(g) = seg.arc_geometry() {
            let theta = g.sweep;
            let seg_area = 0.5 * g.radius * g.radius * (theta - theta.sin());
            if seg_area > 0.0 {
                let bisector = vec3::sub(g.point_at(a, 0.5), g.center);
                let dist = 4.0 * g.radius * (theta / 2.0).sin().powi(3) / (3.0 * (theta - theta.sin()));
                let dir = vec3::normalize(bisector).unwrap_or([0.0, 0.0, 0.0]);
                let centroid = vec3::add(g.center, vec3::scale(dir, dist));
                pieces.push((vec3::scale(g.normal, seg_area), centroid));
            }
        }
    }

    let vector_area = pieces
        .iter()
        .fold([0.0; 3], |acc, (area, _)| vec3::add(acc, *area));
    let area = vec3::norm(vector_area);
    let normal = vec3::normalize(vector_area)?;

    let mut moment = [0.0; 3];
    for (piece_area, c) in &pieces {
        let signed = vec3::dot(*piece_area, normal);
        moment = vec3::add(moment, vec3::scale(*c, signed));
    }
    Some(PlanarRegion {
        vector_area,
        area,
        normal,
        centroid: vec3::scale(moment, 1.0 / area),
    })
}

/// Total length of a chain of segments.
pub fn total_length(segments: &[CurveSegment]) -> f64 {
    segments.iter().map(CurveSegment::length).sum()
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point3,
    pub max: Point3,
}

impl BoundingBox {
    pub fn from_points<I: IntoIterator<Item = Point3>>(points: I) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bb = BoundingBox {
            min: first,
            max: first,
        };
        for p in iter {
            bb.include(p);
        }
        Some(bb)
    }

    /// Bounding box of curve samples; arcs are sampled densely.
    pub fn from_segments(segments: &[CurveSegment]) -> Option<Self> {
        BoundingBox::from_points(segments.iter().flat_map(|s| match s {
            CurveSegment::Line { .. } => s.sample(1),
            CurveSegment::Arc { .. } => s.sample(64),
        }))
    }

    pub fn include(&mut self, p: Point3) {
        for i in 0..3 {
            self.min[i] = self.min[i].min(p[i]);
            self.max[i] = self.max[i].max(p[i]);
        }
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let mut bb = *self;
        bb.include(other.min);
        bb.include(other.max);
        bb
    }

    pub fn translated(&self, v: Vector3) -> BoundingBox {
        BoundingBox {
            min: vec3::add(self.min, v),
            max: vec3::add(self.max, v),
        }
    }

    pub fn size(&self) -> Vector3 {
        vec3::sub(self.max, self.min)
    }

    pub fn center(&self) -> Point3 {
        vec3::scale(vec3::add(self.min, self.max), 0.5)
    }

    /// True when the interiors intersect (touching faces do not count).
    pub fn overlaps(&self, other: &BoundingBox, tol: f64) -> bool {
        (0..3).all(|i| self.min[i] < other.max[i] - tol && other.min[i] < self.max[i] - tol)
    }

    pub fn corners(&self) -> [Point3; 8] {
        let (a, b) = (self.min, self.max);
        [
            [a[0], a[1], a[2]],
            [b[0], a[1], a[2]],
            [b[0], b[1], a[2]],
            [a[0], b[1], a[2]],
            [a[0], a[1], b[2]],
            [b[0], a[1], b[2]],
            [b[0], b[1], b[2]],
            [a[0], b[1], b[2]],
        ]
    }
}
