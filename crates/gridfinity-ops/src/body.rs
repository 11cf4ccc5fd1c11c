use brep_kernel::ShapeHandle;

use crate::kernel_ext::KernelBundle;
use crate::outline::Footprint;
use crate::types::OpError;

/// Solid block over the whole footprint between `bottom_z` and `top_z`.
pub fn make_solid_center(
    kb: &mut dyn KernelBundle,
    footprint: &Footprint,
    outer_radius: f64,
    bottom_z: f64,
    top_z: f64,
) -> Result<ShapeHandle, OpError> {
    if top_z <= bottom_z {
        return Err(OpError::invalid(format!(
            "bin top {top_z} must be above the base at {bottom_z}"
        )));
    }
    footprint.extrude(kb, 0.0, outer_radius, bottom_z, top_z - bottom_z)
}

/// Pocket sunk into the top face of a solid bin, `inset` in from the outer
/// edge.
pub fn make_recess(
    kb: &mut dyn KernelBundle,
    footprint: &Footprint,
    inset: f64,
    outer_radius: f64,
    total_height: f64,
    depth: f64,
) -> Result<ShapeHandle, OpError> {
    let radius = outer_radius - inset;
    if radius <= 0.0 {
        return Err(OpError::invalid(format!(
            "recess inset {inset} leaves no corner radius"
        )));
    }
    footprint.extrude(kb, inset, radius, total_height - depth, depth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use brep_kernel::{KernelIntrospect, MockKernel};
    use std::f64::consts::PI;

    fn footprint() -> Footprint {
        Footprint::Rectangle {
            x_size: 83.5,
            y_size: 83.5,
            center: [42.0, 42.0],
        }
    }

    #[test]
    fn solid_center_spans_base_to_top() {
        let mut k = MockKernel::new();
        let s = make_solid_center(&mut k, &footprint(), 3.75, 4.75, 42.0).unwrap();
        let area = 83.5 * 83.5 - (4.0 - PI) * 3.75 * 3.75;
        assert_relative_eq!(k.volume(&s).unwrap(), area * 37.25, epsilon = 1e-6);
        let c = k.center_of_gravity(&s).unwrap();
        assert_relative_eq!(c[0], 42.0, epsilon = 1e-9);
    }

    #[test]
    fn inverted_heights_rejected() {
        let mut k = MockKernel::new();
        assert!(make_solid_center(&mut k, &footprint(), 3.75, 10.0, 4.0).is_err());
    }

    #[test]
    fn recess_hangs_from_the_top() {
        let mut k = MockKernel::new();
        let s = make_recess(&mut k, &footprint(), 2.3, 3.75, 42.0, 3.0).unwrap();
        let bb = k.bounding_box(&s).unwrap();
        assert_relative_eq!(bb.min[2], 39.0, epsilon = 1e-9);
        assert_relative_eq!(bb.max[2], 42.0, epsilon = 1e-9);
        assert_relative_eq!(bb.min[0], 0.25 + 2.3, epsilon = 1e-6);
    }
}
