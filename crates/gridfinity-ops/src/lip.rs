//! Stacking lip around the top of a bin.
//!
//! Rectangular and L outlines sweep a closed cross-section along the outer
//! edge. Polyomino outlines loft four inset sections into a negative and
//! subtract it from a solid ring instead.

use brep_kernel::{CurveSegment, Kernel, ShapeHandle};
use gridfinity_types::{planar_region, vec3};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::kernel_ext::KernelBundle;
use crate::outline::Footprint;
use crate::sketch::curve_to_wire;
use crate::types::OpError;

/// Cross-section dimensions of the stacking lip.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StackingLip {
    pub top_ledge: f64,
    pub top_chamfer: f64,
    pub vertical_section: f64,
    pub bottom_chamfer: f64,
    pub wall_thickness: f64,
}

impl StackingLip {
    /// Horizontal depth of the lip at its base.
    pub fn inset(&self) -> f64 {
        self.top_ledge + self.top_chamfer + self.bottom_chamfer
    }

    /// Height above the bin's total height.
    pub fn height_above(&self) -> f64 {
        self.top_chamfer + self.vertical_section + self.bottom_chamfer
    }

    fn validate(&self) -> Result<(), OpError> {
        if self.wall_thickness >= self.inset() {
            return Err(OpError::invalid(format!(
                "wall thickness {} must be less than the lip depth {}",
                self.wall_thickness,
                self.inset()
            )));
        }
        if self.top_chamfer <= 0.0 || self.bottom_chamfer <= 0.0 || self.top_ledge < 0.0 {
            return Err(OpError::invalid(format!("invalid stacking lip: {self:?}")));
        }
        Ok(())
    }

    /// Profile corners as (inward, up) offsets from the outer edge at the
    /// bin's total height.
    ///
    /// Above the total height the lip mirrors a bin base: ledge, top
    /// chamfer, vertical section, bottom chamfer. Below it a vertical
    /// section and a 45° foot lead back to the wall.
    pub fn profile(&self) -> [[f64; 2]; 9] {
        let a = self.top_ledge;
        let tc = self.top_chamfer;
        let vs = self.vertical_section;
        let bc = self.bottom_chamfer;
        let depth = self.inset();
        let wt = self.wall_thickness;
        let top = self.height_above();
        let bottom = -self.depth_below();
        [
            [0.0, top],
            [a, top],
            [a + tc, vs + bc],
            [a + tc, bc],
            [depth, 0.0],
            [depth, -vs],
            [wt, bottom],
            [0.0, bottom],
            [0.0, 0.0],
        ]
    }

    /// Lowest point of the lip below the bin's total height.
    pub fn depth_below(&self) -> f64 {
        self.vertical_section + self.inset() - self.wall_thickness
    }
}

/// Stacking lip for `footprint`, sitting on `total_height`.
#[instrument(skip(kb, footprint))]
pub fn make_stacking_lip(
    kb: &mut dyn KernelBundle,
    lip: &StackingLip,
    footprint: &Footprint,
    outer_radius: f64,
    total_height: f64,
) -> Result<ShapeHandle, OpError> {
    lip.validate()?;
    if footprint.sweeps_lip() {
        swept_lip(kb, lip, footprint, outer_radius, total_height)
    } else {
        lofted_lip(kb, lip, footprint, outer_radius, total_height)
    }
}

fn swept_lip(
    kb: &mut dyn KernelBundle,
    lip: &StackingLip,
    footprint: &Footprint,
    outer_radius: f64,
    total_height: f64,
) -> Result<ShapeHandle, OpError> {
    let path = footprint.outline(0.0, outer_radius, total_height)?;
    let first = path
        .first()
        .ok_or_else(|| OpError::invalid("stacking lip path is empty"))?;
    let tangent = first
        .start_tangent()
        .ok_or_else(|| OpError::invalid("stacking lip path starts degenerate"))?;
    let normal = planar_region(&path)
        .ok_or_else(|| OpError::invalid("stacking lip path is not a closed planar loop"))?
        .normal;
    let inward = vec3::cross(normal, tangent);
    let origin = first.start();

    let points: Vec<[f64; 3]> = lip
        .profile()
        .iter()
        .map(|&[u, v]| vec3::add(vec3::add(origin, vec3::scale(inward, u)), [0.0, 0.0, v]))
        .collect();
    let n = points.len();
    let profile: Vec<CurveSegment> = (0..n)
        .map(|i| CurveSegment::line(points[i], points[(i + 1) % n]))
        .collect();

    let path = curve_to_wire(kb, &path)?;
    let profile = curve_to_wire(kb, &profile)?;
    Ok(kb.make_pipe(&path, &profile)?)
}

fn lofted_lip(
    kb: &mut dyn KernelBundle,
    lip: &StackingLip,
    footprint: &Footprint,
    outer_radius: f64,
    total_height: f64,
) -> Result<ShapeHandle, OpError> {
    let t = total_height;
    let a = lip.top_ledge;
    let shelf = a + lip.top_chamfer;
    let depth = lip.inset();
    let bottom = t - lip.depth_below();
    let sections = [
        (bottom, lip.wall_thickness),
        (t - lip.vertical_section, depth),
        (t, depth),
        (t + lip.bottom_chamfer, shelf),
        (t + lip.bottom_chamfer + lip.vertical_section, shelf),
        (t + lip.height_above(), a),
    ];

    let mut wires = Vec::with_capacity(sections.len());
    for (z, inset) in sections {
        let radius = outer_radius - inset;
        if radius <= 0.0 {
            return Err(OpError::invalid(format!(
                "outer radius {outer_radius} is too small for a lip inset of {inset}"
            )));
        }
        let outline = footprint.outline(inset, radius, z)?;
        wires.push(curve_to_wire(kb, &outline)?);
    }
    let negative = kb.make_loft(&wires, true, true)?;

    let ring = footprint.extrude(
        kb,
        0.0,
        outer_radius,
        bottom,
        lip.depth_below() + lip.height_above(),
    )?;
    Ok(kb.cut(&ring, &negative)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use brep_kernel::{KernelIntrospect, MockKernel};
    use gridfinity_types::LayoutMatrix;

    use crate::outline::GridSpec;

    fn lip() -> StackingLip {
        StackingLip {
            top_ledge: 0.4,
            top_chamfer: 1.5,
            vertical_section: 1.8,
            bottom_chamfer: 0.7,
            wall_thickness: 1.0,
        }
    }

    fn polygon_area(p: &[[f64; 2]]) -> f64 {
        let n = p.len();
        (0..n)
            .map(|i| {
                let (a, b) = (p[i], p[(i + 1) % n]);
                a[0] * b[1] - b[0] * a[1]
            })
            .sum::<f64>()
            .abs()
            / 2.0
    }

    fn profile_area(l: &StackingLip) -> f64 {
        polygon_area(&l.profile())
    }

    /// Inward distance of a polygon's centroid from the outer edge.
    fn centroid_inward(p: &[[f64; 2]]) -> f64 {
        let n = p.len();
        let mut signed = 0.0;
        let mut moment = 0.0;
        for i in 0..n {
            let (a, b) = (p[i], p[(i + 1) % n]);
            let c = a[0] * b[1] - b[0] * a[1];
            signed += c;
            moment += (a[0] + b[0]) * c;
        }
        moment / (3.0 * signed)
    }

    #[test]
    fn profile_closes_on_outer_edge() {
        let p = lip().profile();
        assert_eq!(p.len(), 9);
        assert_eq!(p[4], [2.6, 0.0]);
        assert_relative_eq!(p[0][1], 4.0, epsilon = 1e-12);
        assert_relative_eq!(p[6][0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(p[7][1], -3.4, epsilon = 1e-12);
        assert_relative_eq!(lip().depth_below(), 3.4, epsilon = 1e-12);
        // The foot returns to the wall at 45°.
        assert_relative_eq!(p[5][1] - p[6][1], p[5][0] - p[6][0], epsilon = 1e-12);
    }

    #[test]
    fn rim_above_bin_matches_standard_volume() {
        // A default 2x2 bin gains 2162.46 mm³ between its top and the lip rim.
        let p = lip().profile();
        let rim = [p[0], p[1], p[2], p[3], p[4], [0.0, 0.0]];
        let perimeter = 4.0 * (83.5 - 7.5) + std::f64::consts::TAU * 3.75;
        let path = perimeter - std::f64::consts::TAU * centroid_inward(&rim);
        assert_relative_eq!(polygon_area(&rim) * path, 2162.46, max_relative = 1e-5);
    }

    #[test]
    fn wall_thicker_than_lip_rejected() {
        let mut k = MockKernel::new();
        let bad = StackingLip {
            wall_thickness: 2.6,
            ..lip()
        };
        let fp = Footprint::Rectangle {
            x_size: 83.5,
            y_size: 83.5,
            center: [0.0, 0.0],
        };
        assert!(make_stacking_lip(&mut k, &bad, &fp, 3.75, 42.0).is_err());
    }

    #[test]
    fn swept_lip_sits_on_total_height() {
        let mut k = MockKernel::new();
        let fp = Footprint::Rectangle {
            x_size: 83.5,
            y_size: 83.5,
            center: [0.0, 0.0],
        };
        let s = make_stacking_lip(&mut k, &lip(), &fp, 3.75, 42.0).unwrap();
        assert_eq!(k.call_count("make_pipe"), 1);

        let bb = k.bounding_box(&s).unwrap();
        assert_relative_eq!(bb.max[2], 42.0 + 4.0, epsilon = 1e-9);
        assert_relative_eq!(bb.min[2], 42.0 - 3.4, epsilon = 1e-9);

        // Swept volume is bounded by the profile swept along the full outline.
        let area = profile_area(&lip());
        let perimeter = 4.0 * (83.5 - 7.5) + std::f64::consts::TAU * 3.75;
        let v = k.volume(&s).unwrap();
        assert!(v > 0.0 && v < area * perimeter);
    }

    #[test]
    fn polyomino_lip_is_lofted() {
        let mut k = MockKernel::new();
        let fp = Footprint::Polyomino {
            layout: LayoutMatrix::filled(2, 2),
            grid: GridSpec::square(42.0, 0.25),
        };
        let s = make_stacking_lip(&mut k, &lip(), &fp, 3.75, 42.0).unwrap();
        assert_eq!(k.call_count("make_loft"), 1);
        assert_eq!(k.call_count("make_pipe"), 0);
        let bb = k.bounding_box(&s).unwrap();
        assert_relative_eq!(bb.max[2], 46.0, epsilon = 1e-9);
        assert_relative_eq!(bb.min[2], 38.6, epsilon = 1e-9);
        assert!(k.volume(&s).unwrap() > 0.0);
    }
}
