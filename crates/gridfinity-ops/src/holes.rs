//! Magnet and screw holes in the underside of a bin.
//!
//! Holes sit in the four corners of each cell, `distance_from_edge` in from
//! the cell boundary. One cell's tool is built and copied to every cell.

use std::f64::consts::{PI, TAU};

use brep_kernel::{CurveSegment, Kernel, ShapeHandle, Vector3};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::constants::CRUSH_RIB_DEPTH;
use crate::kernel_ext::KernelBundle;
use crate::outline::GridSpec;
use crate::shape_ops::{copy_and_translate, multi_fuse};
use crate::sketch::{extrude_outline, regular_polygon};
use crate::types::OpError;

/// Cross-section of a magnet pocket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MagnetShape {
    Round,
    /// Hexagon whose flats are `diameter` apart.
    Hex,
    /// Round pocket with `count` ribs that grip a press-fit magnet.
    CrushRibs { count: u32, waviness: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MagnetHoles {
    pub shape: MagnetShape,
    pub diameter: f64,
    pub depth: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrewHoles {
    pub diameter: f64,
    pub depth: f64,
}

/// Everything that shapes the underside holes of a bin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HoleSpec {
    pub magnet: Option<MagnetHoles>,
    pub screw: Option<ScrewHoles>,
    pub distance_from_edge: f64,
    /// Layer height for sequential bridging over screw holes; `None` disables it.
    pub bridging_layer_height: Option<f64>,
    /// Slot from each magnet pocket to the cell edge for prying magnets out.
    pub remove_channel: bool,
}

impl HoleSpec {
    pub fn is_empty(&self) -> bool {
        self.magnet.is_none() && self.screw.is_none()
    }
}

/// Hole centres relative to a cell centre, counter-clockwise from (−, −).
pub fn hole_offsets(grid: &GridSpec, distance_from_edge: f64) -> [Vector3; 4] {
    let dx = grid.x_pitch / 2.0 - distance_from_edge;
    let dy = grid.y_pitch / 2.0 - distance_from_edge;
    [[-dx, -dy, 0.0], [dx, -dy, 0.0], [dx, dy, 0.0], [-dx, dy, 0.0]]
}

/// One half-pitch of a crush-rib outline, with the rib centred on +x.
///
/// A rib arc touching `radius` and a relief arc reaching `radius +
/// CRUSH_RIB_DEPTH` meet tangentially at `tangent`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct RibWedge {
    half_pitch: f64,
    rib_center: [f64; 2],
    rib_radius: f64,
    relief_center: [f64; 2],
    relief_radius: f64,
    tangent: [f64; 2],
}

impl RibWedge {
    /// Waviness trades rib radius for relief radius: 0 gives broad ribs,
    /// 1 sharp ones, 0.5 equal arcs.
    fn new(radius: f64, count: u32, waviness: f64) -> Result<Self, OpError> {
        if count < 3 {
            return Err(OpError::invalid(format!(
                "crush ribs need at least 3 ribs, got {count}"
            )));
        }
        if !(0.0..=1.0).contains(&waviness) {
            return Err(OpError::invalid(format!(
                "crush rib waviness must be within [0, 1], got {waviness}"
            )));
        }
        if radius <= 0.0 {
            return Err(OpError::invalid(format!(
                "crush rib pocket radius must be positive, got {radius}"
            )));
        }
        let half_pitch = PI / count as f64;
        let ratio = 2f64.powf(1.0 - 2.0 * waviness);
        let inner = radius;
        let outer = radius + CRUSH_RIB_DEPTH;

        // Rib circle centred at inner + ratio·ρ on +x, relief circle at
        // outer − ρ on the half-pitch ray; they touch when the centres are
        // (1 + ratio)·ρ apart.
        let c = half_pitch.cos();
        let a = 2.0 * ratio * (c - 1.0);
        let b = 2.0 * (inner * ratio - outer + c * inner - c * ratio * outer);
        let k = inner * inner + outer * outer - 2.0 * c * inner * outer;
        let relief_radius = (-b - (b * b - 4.0 * a * k).sqrt()) / (2.0 * a);
        if !(relief_radius > 0.0 && relief_radius < outer) {
            return Err(OpError::invalid(format!(
                "{count} crush ribs do not fit a pocket of radius {radius}"
            )));
        }
        let rib_radius = ratio * relief_radius;

        let rib_center = [inner + rib_radius, 0.0];
        let d = outer - relief_radius;
        let relief_center = [d * half_pitch.cos(), d * half_pitch.sin()];
        let t = rib_radius / (rib_radius + relief_radius);
        let tangent = [
            rib_center[0] + t * (relief_center[0] - rib_center[0]),
            rib_center[1] + t * (relief_center[1] - rib_center[1]),
        ];
        Ok(Self {
            half_pitch,
            rib_center,
            rib_radius,
            relief_center,
            relief_radius,
            tangent,
        })
    }

    /// Area between the origin and this half-pitch of the outline.
    fn area(&self) -> f64 {
        let cross = |p: [f64; 2], q: [f64; 2]| p[0] * q[1] - p[1] * q[0];
        let sub = |p: [f64; 2], q: [f64; 2]| [p[0] - q[0], p[1] - q[1]];
        let angle = |p: [f64; 2], q: [f64; 2]| {
            ((p[0] * q[0] + p[1] * q[1]) / ((p[0].hypot(p[1])) * q[0].hypot(q[1])))
                .clamp(-1.0, 1.0)
                .acos()
        };
        let contact = [self.rib_center[0] - self.rib_radius, 0.0];
        let r = self.relief_center[0].hypot(self.relief_center[1]) + self.relief_radius;
        let crest = [r * self.half_pitch.cos(), r * self.half_pitch.sin()];

        // Green's theorem per arc: ½(ρ²·sweep + centre × chord). The rib arc
        // runs clockwise about its centre.
        let rib_sweep = angle(sub(contact, self.rib_center), sub(self.tangent, self.rib_center));
        let relief_sweep = angle(sub(self.tangent, self.relief_center), sub(crest, self.relief_center));
        0.5 * (-self.rib_radius * self.rib_radius * rib_sweep
            + cross(self.rib_center, sub(self.tangent, contact)))
            + 0.5 * (self.relief_radius * self.relief_radius * relief_sweep
                + cross(self.relief_center, sub(crest, self.tangent)))
    }
}

/// Closed outline of a crush-rib pocket at height `z`.
///
/// Rib arcs touching the pocket radius alternate with relief arcs
/// `CRUSH_RIB_DEPTH` further out, each pair meeting tangentially, so the
/// boundary is a smooth wave. Higher waviness sharpens the ribs.
pub fn crush_rib_outline(
    center: [f64; 3],
    radius: f64,
    count: u32,
    waviness: f64,
) -> Result<Vec<CurveSegment>, OpError> {
    let wedge = RibWedge::new(radius, count, waviness)?;
    let outer = radius + CRUSH_RIB_DEPTH;
    let place = |p: [f64; 2], a: f64| {
        let (sin, cos) = a.sin_cos();
        [
            center[0] + p[0] * cos - p[1] * sin,
            center[1] + p[0] * sin + p[1] * cos,
            center[2],
        ]
    };
    let polar = |r: f64, a: f64| place([r, 0.0], a);
    let t = wedge.tangent;
    let mirrored = [t[0], -t[1]];
    let pitch = TAU / count as f64;

    let mut segments = Vec::with_capacity(2 * count as usize);
    for k in 0..count {
        let a = k as f64 * pitch;
        segments.push(CurveSegment::arc(place(mirrored, a), polar(radius, a), place(t, a)));
        segments.push(CurveSegment::arc(
            place(t, a),
            polar(outer, a + wedge.half_pitch),
            place(mirrored, a + pitch),
        ));
    }
    Ok(segments)
}

fn magnet_pocket(
    kb: &mut dyn KernelBundle,
    magnet: &MagnetHoles,
    at: Vector3,
) -> Result<ShapeHandle, OpError> {
    let radius = magnet.diameter / 2.0;
    match magnet.shape {
        MagnetShape::Round => Ok(kb.make_cylinder(at, [0.0, 0.0, 1.0], radius, magnet.depth)?),
        MagnetShape::Hex => {
            let circumradius = radius * 2.0 / 3f64.sqrt();
            let outline = regular_polygon(at, circumradius, 6);
            extrude_outline(kb, &outline, magnet.depth)
        }
        MagnetShape::CrushRibs { count, waviness } => {
            let outline = crush_rib_outline(at, radius, count, waviness)?;
            extrude_outline(kb, &outline, magnet.depth)
        }
    }
}

/// Two stacked layers that let a printer bridge over a magnet pocket
/// into the narrower screw hole: a strip as wide as the screw hole, capped by
/// the magnet circle, then a square of the same width.
fn bridging_layers(
    kb: &mut dyn KernelBundle,
    magnet: &MagnetHoles,
    screw: &ScrewHoles,
    layer_height: f64,
    at: Vector3,
) -> Result<Vec<ShapeHandle>, OpError> {
    let r = magnet.diameter / 2.0;
    let half = screw.diameter / 2.0;
    if half >= r {
        return Err(OpError::invalid(
            "sequential bridging needs a screw hole narrower than the magnet hole",
        ));
    }
    let cap = (r * r - half * half).sqrt();
    let p = |x: f64, y: f64| [at[0] + x, at[1] + y, at[2]];
    let strip = vec![
        CurveSegment::line(p(half, -cap), p(half, cap)),
        CurveSegment::arc(p(half, cap), p(0.0, r), p(-half, cap)),
        CurveSegment::line(p(-half, cap), p(-half, -cap)),
        CurveSegment::arc(p(-half, -cap), p(0.0, -r), p(half, -cap)),
    ];
    let strip = extrude_outline(kb, &strip, magnet.depth + layer_height)?;
    let square = kb.make_box(
        p(-half, -half),
        [screw.diameter, screw.diameter, magnet.depth + 2.0 * layer_height],
    )?;
    Ok(vec![strip, square])
}

/// Slot from a magnet pocket outward along x to the cell edge.
fn remove_channel(
    kb: &mut dyn KernelBundle,
    magnet: &MagnetHoles,
    at: Vector3,
    distance_from_edge: f64,
) -> Result<ShapeHandle, OpError> {
    let width = magnet.diameter / 2.0;
    let x0 = if at[0] < 0.0 {
        at[0] - distance_from_edge
    } else {
        at[0]
    };
    Ok(kb.make_box(
        [x0, at[1] - width / 2.0, 0.0],
        [distance_from_edge, width, magnet.depth],
    )?)
}

/// Every hole tool for one cell, centred on the origin.
fn cell_holes(
    kb: &mut dyn KernelBundle,
    spec: &HoleSpec,
    grid: &GridSpec,
) -> Result<ShapeHandle, OpError> {
    let mut tools = Vec::new();
    for at in hole_offsets(grid, spec.distance_from_edge) {
        if let Some(magnet) = &spec.magnet {
            tools.push(magnet_pocket(kb, magnet, at)?);
            if spec.remove_channel {
                tools.push(remove_channel(kb, magnet, at, spec.distance_from_edge)?);
            }
        }
        if let Some(screw) = &spec.screw {
            tools.push(kb.make_cylinder(at, [0.0, 0.0, 1.0], screw.diameter / 2.0, screw.depth)?);
        }
        if let (Some(magnet), Some(screw), Some(layer)) =
            (&spec.magnet, &spec.screw, spec.bridging_layer_height)
        {
            tools.extend(bridging_layers(kb, magnet, screw, layer, at)?);
        }
    }
    multi_fuse(kb, &tools)
}

/// Hole tool for every cell, or `None` when neither magnets nor screws are on.
#[instrument(skip(kb, spec, grid), fields(cells = cells.len()))]
pub fn make_bottom_holes(
    kb: &mut dyn KernelBundle,
    spec: &HoleSpec,
    grid: &GridSpec,
    cells: &[Vector3],
) -> Result<Option<ShapeHandle>, OpError> {
    if spec.is_empty() {
        debug!("no bottom holes enabled");
        return Ok(None);
    }
    let cell = cell_holes(kb, spec, grid)?;
    copy_and_translate(kb, &cell, cells).map(Some)
}

/// Pocket area of a crush-rib outline, for sizing checks.
pub fn crush_rib_area(radius: f64, count: u32, waviness: f64) -> Result<f64, OpError> {
    let wedge = RibWedge::new(radius, count, waviness)?;
    Ok(2.0 * count as f64 * wedge.area())
}

/// Area of a round magnet pocket.
pub fn round_area(diameter: f64) -> f64 {
    PI * diameter * diameter / 4.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use brep_kernel::{KernelIntrospect, MockKernel};
    use gridfinity_types::planar_region;

    fn magnets(shape: MagnetShape) -> HoleSpec {
        HoleSpec {
            magnet: Some(MagnetHoles {
                shape,
                diameter: 6.5,
                depth: 2.4,
            }),
            screw: None,
            distance_from_edge: 8.0,
            bridging_layer_height: None,
            remove_channel: false,
        }
    }

    // ── Positions ──────────────────────────────────────────────────────────

    #[test]
    fn offsets_are_inset_from_cell_edges() {
        let offsets = hole_offsets(&GridSpec::square(42.0, 0.25), 8.0);
        assert_eq!(offsets[0], [-13.0, -13.0, 0.0]);
        assert_eq!(offsets[2], [13.0, 13.0, 0.0]);
    }

    // ── Shapes ─────────────────────────────────────────────────────────────

    #[test]
    fn round_magnets_for_two_cells() {
        let mut k = MockKernel::new();
        let grid = GridSpec::square(42.0, 0.25);
        let cells = [grid.cell_center(0, 0), grid.cell_center(1, 0)];
        let holes = make_bottom_holes(&mut k, &magnets(MagnetShape::Round), &grid, &cells)
            .unwrap()
            .unwrap();
        let expected = 8.0 * round_area(6.5) * 2.4;
        assert_relative_eq!(k.volume(&holes).unwrap(), expected, epsilon = 1e-9);
    }

    #[test]
    fn hex_pocket_flats_match_diameter() {
        let mut k = MockKernel::new();
        let grid = GridSpec::square(42.0, 0.25);
        let holes = make_bottom_holes(&mut k, &magnets(MagnetShape::Hex), &grid, &[[0.0; 3]])
            .unwrap()
            .unwrap();
        let side = 6.5 / 3f64.sqrt();
        let hex_area = 1.5 * 3f64.sqrt() * side * side;
        assert_relative_eq!(k.volume(&holes).unwrap(), 4.0 * hex_area * 2.4, epsilon = 1e-9);
    }

    #[test]
    fn crush_rib_outline_area() {
        let segs = crush_rib_outline([0.0; 3], 3.25, 12, 0.5).unwrap();
        assert_eq!(segs.len(), 24);
        let region = planar_region(&segs).unwrap();
        let area = crush_rib_area(3.25, 12, 0.5).unwrap();
        assert_relative_eq!(region.area, area, epsilon = 1e-9);
        assert_relative_eq!(area, 38.700575, epsilon = 1e-5);
        assert!(area > round_area(6.5) && area < round_area(7.5));
    }

    #[test]
    fn crush_rib_arcs_meet_tangentially() {
        for waviness in [0.0, 0.5, 1.0] {
            let segs = crush_rib_outline([1.0, 2.0, 0.0], 3.25, 12, waviness).unwrap();
            let n = segs.len();
            for i in 0..n {
                let (a, b) = (&segs[i], &segs[(i + 1) % n]);
                let joint = a.end();
                assert!(gridfinity_types::vec3::distance(joint, b.start()) < 1e-9);
                let ca = a.arc_geometry().unwrap().center;
                let cb = b.arc_geometry().unwrap().center;
                // Tangent circles have their centres in line with the joint.
                let u = gridfinity_types::vec3::sub(ca, joint);
                let v = gridfinity_types::vec3::sub(cb, joint);
                assert!(gridfinity_types::vec3::cross(u, v)[2].abs() < 1e-9, "waviness {waviness}, joint {i}");
            }
            let reach = |s: &CurveSegment| {
                let m = match *s {
                    CurveSegment::Arc { mid, .. } => mid,
                    CurveSegment::Line { start, .. } => start,
                };
                (m[0] - 1.0).hypot(m[1] - 2.0)
            };
            assert_relative_eq!(reach(&segs[0]), 3.25, epsilon = 1e-12);
            assert_relative_eq!(reach(&segs[1]), 3.75, epsilon = 1e-12);
        }
    }

    #[test]
    fn crush_rib_pockets_remove_analytic_volume() {
        let mut k = MockKernel::new();
        let grid = GridSpec::square(42.0, 0.25);
        let spec = magnets(MagnetShape::CrushRibs {
            count: 8,
            waviness: 0.5,
        });
        let holes = make_bottom_holes(&mut k, &spec, &grid, &[[0.0; 3]]).unwrap().unwrap();

        // Equal arcs of radius ρ, centred 3.25 + ρ and 3.75 − ρ out on rays
        // π/8 apart, touch when (3.25 + ρ)² + (3.75 − ρ)² − 2(3.25 + ρ)(3.75 − ρ)cos(π/8) = 4ρ².
        let c = (PI / 8.0).cos();
        let (qa, qb) = (2.0 * (c - 1.0), 2.0 * (3.25 - 3.75 + c * 3.25 - c * 3.75));
        let qc = 3.25f64.powi(2) + 3.75f64.powi(2) - 2.0 * c * 3.25 * 3.75;
        let rho = (-qb - (qb * qb - 4.0 * qa * qc).sqrt()) / (2.0 * qa);
        // Each half pitch sweeps the triangle between the two centres and the
        // origin, minus the rib sector and plus the relief sector cut by the
        // line of centres.
        let (da, db) = (3.25 + rho, 3.75 - rho);
        let triangle = 0.5 * da * db * (PI / 8.0).sin();
        let gap = (da * da + db * db - 2.0 * da * db * c).sqrt();
        let at_rib = ((da * da + gap * gap - db * db) / (2.0 * da * gap)).acos();
        let at_relief = ((db * db + gap * gap - da * da) / (2.0 * db * gap)).acos();
        let half_pitch = triangle - 0.5 * rho * rho * at_rib + 0.5 * rho * rho * (PI - at_relief);
        let area = 16.0 * half_pitch;

        assert_relative_eq!(crush_rib_area(3.25, 8, 0.5).unwrap(), area, epsilon = 1e-9);
        assert_relative_eq!(k.volume(&holes).unwrap(), 4.0 * area * 2.4, epsilon = 1e-9);
    }
    #[test]
    fn crush_ribs_reject_bad_parameters() {
        assert!(crush_rib_outline([0.0; 3], 3.0, 2, 0.5).is_err());
        assert!(crush_rib_outline([0.0; 3], 3.0, 8, 1.5).is_err());
    }

    #[test]
    fn no_holes_is_none() {
        let mut k = MockKernel::new();
        let spec = HoleSpec {
            magnet: None,
            ..magnets(MagnetShape::Round)
        };
        let grid = GridSpec::square(42.0, 0.25);
        assert!(make_bottom_holes(&mut k, &spec, &grid, &[[0.0; 3]]).unwrap().is_none());
    }

    #[test]
    fn bridging_adds_strip_and_square() {
        let mut k = MockKernel::new();
        let spec = HoleSpec {
            screw: Some(ScrewHoles {
                diameter: 3.0,
                depth: 6.0,
            }),
            bridging_layer_height: Some(0.2),
            ..magnets(MagnetShape::Round)
        };
        let grid = GridSpec::square(42.0, 0.25);
        make_bottom_holes(&mut k, &spec, &grid, &[[0.0; 3]]).unwrap();
        // 4 magnet + 4 screw cylinders, 4 strips and 4 squares.
        assert_eq!(k.call_count("make_cylinder"), 8);
        assert_eq!(k.call_count("make_box"), 4);
        assert_eq!(k.call_count("extrude"), 4);
    }

    #[test]
    fn remove_channel_reaches_cell_edge() {
        let mut k = MockKernel::new();
        let spec = HoleSpec {
            remove_channel: true,
            ..magnets(MagnetShape::Round)
        };
        let grid = GridSpec::square(42.0, 0.25);
        let holes = make_bottom_holes(&mut k, &spec, &grid, &[[0.0; 3]])
            .unwrap()
            .unwrap();
        let bb = k.bounding_box(&holes).unwrap();
        assert_relative_eq!(bb.min[0], -21.0, epsilon = 1e-9);
        assert_relative_eq!(bb.max[0], 21.0, epsilon = 1e-9);
    }
}
