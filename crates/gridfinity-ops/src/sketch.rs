//! Planar outlines with filleted corners, and the solids built from them.

use brep_kernel::{CurveSegment, Kernel, ShapeHandle, WireHandle};
use gridfinity_types::vec3;

use crate::kernel_ext::KernelBundle;
use crate::types::OpError;

const EPS: f64 = 1e-9;

/// Closed outline through `corners` (in the plane `z`) with every corner
/// rounded by `radius`.
///
/// Segments come out line first: the straight run leaving corner `i`, then
/// the arc at corner `i + 1`. Orientation follows the corner order.
pub fn rounded_polygon(
    corners: &[[f64; 2]],
    radius: f64,
    z: f64,
) -> Result<Vec<CurveSegment>, OpError> {
    let n = corners.len();
    if n < 3 {
        return Err(OpError::invalid("a rounded polygon needs at least 3 corners"));
    }
    if radius <= 0.0 {
        return Err(OpError::invalid(format!(
            "corner radius must be positive, got {radius}"
        )));
    }

    struct Corner {
        tangent_in: [f64; 3],
        tangent_out: [f64; 3],
        mid: [f64; 3],
        setback: f64,
    }

    let at = |p: [f64; 2]| [p[0], p[1], z];
    let mut rounded = Vec::with_capacity(n);
    for i in 0..n {
        let prev = at(corners[(i + n - 1) % n]);
        let here = at(corners[i]);
        let next = at(corners[(i + 1) % n]);
        let d_in = vec3::normalize(vec3::sub(here, prev))
            .ok_or_else(|| OpError::invalid(format!("corner {i} repeats its predecessor")))?;
        let d_out = vec3::normalize(vec3::sub(next, here))
            .ok_or_else(|| OpError::invalid(format!("corner {i} repeats its successor")))?;

        let turn = vec3::cross(d_in, d_out)[2];
        let cos = vec3::dot(d_in, d_out).clamp(-1.0, 1.0);
        if turn.abs() < EPS {
            return Err(OpError::invalid(format!("corner {i} is not a corner")));
        }
        let half_turn = cos.acos() / 2.0;
        let setback = radius * half_turn.tan();

        let tangent_in = vec3::sub(here, vec3::scale(d_in, setback));
        let tangent_out = vec3::add(here, vec3::scale(d_out, setback));
        // Fillet centre sits on the turning side of the incoming edge.
        let side = turn.signum();
        let left = [-d_in[1], d_in[0], 0.0];
        let center = vec3::add(tangent_in, vec3::scale(left, side * radius));
        let towards_corner = vec3::normalize(vec3::sub(here, center))
            .ok_or_else(|| OpError::invalid(format!("corner {i} is degenerate")))?;
        let mid = vec3::add(center, vec3::scale(towards_corner, radius));

        rounded.push(Corner {
            tangent_in,
            tangent_out,
            mid,
            setback,
        });
    }

    let mut segments = Vec::with_capacity(2 * n);
    for i in 0..n {
        let j = (i + 1) % n;
        let edge = vec3::distance(at(corners[i]), at(corners[j]));
        if edge - rounded[i].setback - rounded[j].setback <= EPS {
            return Err(OpError::invalid(format!(
                "edge {i} ({edge:.3} mm) is too short for corner radius {radius}"
            )));
        }
        segments.push(CurveSegment::line(rounded[i].tangent_out, rounded[j].tangent_in));
        segments.push(CurveSegment::arc(
            rounded[j].tangent_in,
            rounded[j].mid,
            rounded[j].tangent_out,
        ));
    }
    Ok(segments)
}

/// Rounded rectangle centred on the origin, counter-clockwise.
pub fn rounded_rectangle_segments(
    x_width: f64,
    y_width: f64,
    z: f64,
    radius: f64,
) -> Result<Vec<CurveSegment>, OpError> {
    if radius <= 0.0 || 2.0 * radius >= x_width || 2.0 * radius >= y_width {
        return Err(OpError::invalid(format!(
            "radius {radius} does not fit a {x_width} x {y_width} rectangle"
        )));
    }
    let (hx, hy) = (x_width / 2.0, y_width / 2.0);
    rounded_polygon(&[[-hx, -hy], [hx, -hy], [hx, hy], [-hx, hy]], radius, z)
}

/// L-shaped outline with its outer corner at `origin`.
///
/// `x1 × y1` is the bounding rectangle; the notch removes everything beyond
/// `x2` in x and beyond `y2` in y. The loop runs clockwise.
#[allow(clippy::too_many_arguments)]
pub fn rounded_l_segments(
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    origin: [f64; 2],
    z: f64,
    radius: f64,
) -> Result<Vec<CurveSegment>, OpError> {
    let limit = x2.min(y2).min(x1 - x2).min(y1 - y2);
    if radius <= 0.0 || radius >= limit {
        return Err(OpError::invalid(format!(
            "radius {radius} does not fit L outline {x1}/{y1}/{x2}/{y2}"
        )));
    }
    let [ox, oy] = origin;
    rounded_polygon(
        &[
            [ox, oy],
            [ox, oy + y1],
            [ox + x2, oy + y1],
            [ox + x2, oy + y2],
            [ox + x1, oy + y2],
            [ox + x1, oy],
        ],
        radius,
        z,
    )
}

/// Wire from a list of connected curves.
pub fn curve_to_wire(
    kb: &mut dyn KernelBundle,
    curves: &[CurveSegment],
) -> Result<WireHandle, OpError> {
    if curves.is_empty() {
        return Err(OpError::invalid("cannot build a wire from no curves"));
    }
    Ok(kb.make_wire(curves)?)
}

/// Prism of `height` over a closed outline.
pub fn extrude_outline(
    kb: &mut dyn KernelBundle,
    outline: &[CurveSegment],
    height: f64,
) -> Result<ShapeHandle, OpError> {
    if height <= 0.0 {
        return Err(OpError::invalid(format!(
            "extrusion height must be positive, got {height}"
        )));
    }
    let wire = curve_to_wire(kb, outline)?;
    let face = kb.make_face(&wire)?;
    Ok(kb.extrude(&face, [0.0, 0.0, height])?)
}

/// Rounded rectangle wire centred on the origin at height `z`.
pub fn rounded_rectangle(
    kb: &mut dyn KernelBundle,
    x_width: f64,
    y_width: f64,
    z: f64,
    radius: f64,
) -> Result<WireHandle, OpError> {
    let segments = rounded_rectangle_segments(x_width, y_width, z, radius)?;
    curve_to_wire(kb, &segments)
}

/// Rounded-rectangle prism from `z` up by `height`.
pub fn rounded_rectangle_extrude(
    kb: &mut dyn KernelBundle,
    x_width: f64,
    y_width: f64,
    z: f64,
    height: f64,
    radius: f64,
) -> Result<ShapeHandle, OpError> {
    let segments = rounded_rectangle_segments(x_width, y_width, z, radius)?;
    extrude_outline(kb, &segments, height)
}

/// Chamfered rounded-rectangle frustum.
///
/// The bottom section is `x_width × y_width` with `radius`; the top is
/// `height` larger on every side, its radius grown by the same amount.
pub fn rounded_rectangle_chamfer(
    kb: &mut dyn KernelBundle,
    x_width: f64,
    y_width: f64,
    z: f64,
    height: f64,
    radius: f64,
) -> Result<ShapeHandle, OpError> {
    let bottom = rounded_rectangle(kb, x_width, y_width, z, radius)?;
    let top = rounded_rectangle(
        kb,
        x_width + 2.0 * height,
        y_width + 2.0 * height,
        z + height,
        radius + height,
    )?;
    Ok(kb.make_loft(&[bottom, top], true, true)?)
}

/// L-shaped prism from `z` up by `height`.
#[allow(clippy::too_many_arguments)]
pub fn rounded_l_extrude(
    kb: &mut dyn KernelBundle,
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    origin: [f64; 2],
    z: f64,
    height: f64,
    radius: f64,
) -> Result<ShapeHandle, OpError> {
    let segments = rounded_l_segments(x1, y1, x2, y2, origin, z, radius)?;
    extrude_outline(kb, &segments, height)
}

/// Regular polygon with `sides` vertices on a circle of `circumradius`,
/// the first vertex on +x.
pub fn regular_polygon(center: [f64; 3], circumradius: f64, sides: usize) -> Vec<CurveSegment> {
    let vertex = |k: usize| {
        let a = std::f64::consts::TAU * k as f64 / sides as f64;
        [
            center[0] + circumradius * a.cos(),
            center[1] + circumradius * a.sin(),
            center[2],
        ]
    };
    (0..sides)
        .map(|k| CurveSegment::line(vertex(k), vertex((k + 1) % sides)))
        .collect()
}

/// Translate every segment of an outline.
pub fn translate_segments(segments: &[CurveSegment], v: [f64; 3]) -> Vec<CurveSegment> {
    segments.iter().map(|s| s.translated(v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use brep_kernel::{KernelIntrospect, MockKernel};
    use gridfinity_types::planar_region;
    use std::f64::consts::PI;

    fn corner_cut(r: f64) -> f64 {
        (4.0 - PI) * r * r
    }

    #[test]
    fn rounded_rectangle_is_line_first_and_closed() {
        let segs = rounded_rectangle_segments(10.0, 6.0, 0.0, 1.0).unwrap();
        assert_eq!(segs.len(), 8);
        assert!(matches!(segs[0], CurveSegment::Line { .. }));
        assert!(matches!(segs[1], CurveSegment::Arc { .. }));
        for i in 0..segs.len() {
            let next = &segs[(i + 1) % segs.len()];
            assert!(vec3::distance(segs[i].end(), next.start()) < 1e-12);
        }
    }

    #[test]
    fn rounded_rectangle_area_and_orientation() {
        let segs = rounded_rectangle_segments(10.0, 6.0, 2.0, 1.0).unwrap();
        let region = planar_region(&segs).unwrap();
        assert_relative_eq!(region.area, 60.0 - corner_cut(1.0), epsilon = 1e-9);
        assert_relative_eq!(region.normal[2], 1.0, epsilon = 1e-12);
        assert_relative_eq!(region.centroid[2], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn rounded_rectangle_rejects_oversized_radius() {
        assert!(rounded_rectangle_segments(4.0, 10.0, 0.0, 2.0).is_err());
        assert!(rounded_rectangle_segments(4.0, 10.0, 0.0, 0.0).is_err());
    }

    #[test]
    fn rounded_l_runs_clockwise_with_six_fillets() {
        let segs = rounded_l_segments(3.0, 2.0, 1.0, 1.0, [0.0, 0.0], 0.0, 0.25).unwrap();
        assert_eq!(segs.len(), 12);
        let region = planar_region(&segs).unwrap();
        assert_relative_eq!(region.normal[2], -1.0, epsilon = 1e-12);
        // Five convex corners lose material, the reflex corner gains it.
        let expected = 4.0 - 4.0 * corner_cut(0.25) + corner_cut(0.25);
        assert_relative_eq!(region.area, expected, epsilon = 1e-9);
    }

    #[test]
    fn rounded_l_radius_must_fit_every_arm() {
        assert!(rounded_l_segments(3.0, 2.0, 1.0, 1.0, [0.0, 0.0], 0.0, 1.0).is_err());
        assert!(rounded_l_segments(3.0, 2.0, 2.5, 1.0, [0.0, 0.0], 0.0, 0.6).is_err());
    }

    #[test]
    fn extrude_height_must_be_positive() {
        let mut k = MockKernel::new();
        let segs = rounded_rectangle_segments(10.0, 10.0, 0.0, 1.0).unwrap();
        assert!(extrude_outline(&mut k, &segs, 0.0).is_err());
    }

    #[test]
    fn chamfer_frustum_volume() {
        let mut k = MockKernel::new();
        let s = rounded_rectangle_chamfer(&mut k, 10.0, 10.0, 0.0, 2.0, 1.0).unwrap();
        let area = |w: f64, r: f64| w * w - corner_cut(r);
        let expected = 2.0 / 6.0 * (area(10.0, 1.0) + 4.0 * area(12.0, 2.0) + area(14.0, 3.0));
        assert_relative_eq!(k.volume(&s).unwrap(), expected, epsilon = 1e-6);
        let bb = k.bounding_box(&s).unwrap();
        assert_relative_eq!(bb.max[0], 7.0, epsilon = 1e-9);
    }

    #[test]
    fn hexagon_area() {
        let segs = regular_polygon([0.0; 3], 2.0, 6);
        let region = planar_region(&segs).unwrap();
        assert_relative_eq!(region.area, 1.5 * 3f64.sqrt() * 4.0, epsilon = 1e-9);
    }
}
