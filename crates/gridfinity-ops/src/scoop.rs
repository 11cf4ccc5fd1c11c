//! Concave finger scoop along the rear (high-y) wall of each compartment.

use brep_kernel::{CurveSegment, Kernel, ShapeHandle};
use tracing::{instrument, warn};

use crate::compartments::Interior;
use crate::fillet::{edges_at_height, fillet_edges};
use crate::kernel_ext::KernelBundle;
use crate::shape_ops::multi_fuse;
use crate::sketch::curve_to_wire;
use crate::types::OpError;

/// Largest scoop radius the interior allows.
///
/// Low x dividers cap the radius so the scoop does not climb over them.
pub fn scoop_radius(requested: f64, interior: &Interior, height_unit: f64) -> Result<f64, OpError> {
    let d = interior.dividers;
    let mut radius = requested
        .min(interior.x_compartment_width()? - 2.0)
        .min(interior.usable_height());
    if d.x_count > 0 && d.x_height > 0.0 {
        radius = radius.min(d.x_height - height_unit - 1.0);
    }
    Ok(radius)
}

/// Scoop fill for every x compartment.
///
/// `setback` is how far the stacking lip overhangs the rear wall; the scoop
/// moves forward by that much with a block filling the gap behind it.
/// Returns `None` with a warning when the interior leaves no room.
#[instrument(skip(kb, interior))]
pub fn make_scoop(
    kb: &mut dyn KernelBundle,
    requested_radius: f64,
    interior: &Interior,
    height_unit: f64,
    setback: f64,
) -> Result<Option<ShapeHandle>, OpError> {
    let r = scoop_radius(requested_radius, interior, height_unit)?;
    if r <= 0.0 {
        warn!(radius = r, "scoop radius is not positive, skipping scoop");
        return Ok(None);
    }

    let floor = interior.floor_z;
    let wall = interior.max[1] - setback.max(0.0);
    let mut parts = Vec::new();
    for (x0, x1) in interior.x_compartments()? {
        let center = [x0, wall - r, floor + r];
        let diag = r * std::f64::consts::FRAC_1_SQRT_2;
        let corner = [x0, wall, floor];
        let up = [x0, wall, floor + r];
        let mid = [x0, center[1] + diag, center[2] - diag];
        let out = [x0, wall - r, floor];
        let profile = vec![
            CurveSegment::line(corner, up),
            CurveSegment::arc(up, mid, out),
            CurveSegment::line(out, corner),
        ];
        let wire = curve_to_wire(kb, &profile)?;
        let face = kb.make_face(&wire)?;
        let mut fill = kb.extrude(&face, [x1 - x0, 0.0, 0.0])?;

        if setback > 0.0 {
            let block = kb.make_box([x0, wall, floor], [x1 - x0, setback, r])?;
            fill = kb.fuse(&fill, &block)?;
            let top = edges_at_height(&*kb, &fill, floor + r)?;
            fill = fillet_edges(kb, fill, setback * 0.99, &top)?;
        }
        parts.push(fill);
    }
    multi_fuse(kb, &parts).map(Some)
}
