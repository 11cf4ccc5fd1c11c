//! Material-saving bins: a thin shell over a hollowed base.

use brep_kernel::{ShapeHandle, Vector3};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::base::BaseProfile;
use crate::compartments::{make_dividers, Interior};
use crate::fillet::{edges_at_height, fillet_edges};
use crate::kernel_ext::KernelBundle;
use crate::outline::Footprint;
use crate::shape_ops::{copy_and_translate, cut_optional, multi_fuse};
use crate::sketch::{rounded_rectangle, rounded_rectangle_extrude};
use crate::types::OpError;

/// Corner radius given to pocket tiers whose offset radius would vanish.
const MIN_POCKET_RADIUS: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EcoShell {
    /// Floor thickness under each cell pocket.
    pub base_thickness: f64,
    /// Horizontal wall left around each cell pocket inside the base profile.
    pub base_wall_thickness: f64,
    pub wall_thickness: f64,
    pub fillet_radius: f64,
}

/// Frustum between two centred rounded rectangles.
fn frustum(
    kb: &mut dyn KernelBundle,
    bottom: ([f64; 2], f64),
    top: ([f64; 2], f64),
    z: f64,
    height: f64,
) -> Result<ShapeHandle, OpError> {
    let lower = rounded_rectangle(kb, bottom.0[0], bottom.0[1], z, bottom.1)?;
    let upper = rounded_rectangle(kb, top.0[0], top.0[1], z + height, top.1)?;
    Ok(kb.make_loft(&[lower, upper], true, true)?)
}

/// One cell's pocket: the base profile raised by the floor thickness and
/// drawn in by the base wall, topped by a prism up to `floor_z`.
fn cell_pocket(
    kb: &mut dyn KernelBundle,
    eco: &EcoShell,
    base: &BaseProfile,
    unit: [f64; 2],
    floor_z: f64,
) -> Result<ShapeHandle, OpError> {
    let (bc, vs, tc) = (base.bottom_chamfer, base.vertical_section, base.top_chamfer);
    let inset = eco.base_wall_thickness;
    let section = |shrink: f64, radius: f64| -> Result<([f64; 2], f64), OpError> {
        let w = [unit[0] - 2.0 * (shrink + inset), unit[1] - 2.0 * (shrink + inset)];
        let r = (radius - inset).max(MIN_POCKET_RADIUS);
        if w[0] <= 2.0 * r || w[1] <= 2.0 * r {
            return Err(OpError::invalid(format!(
                "eco base wall {inset} leaves no pocket in a {} x {} unit",
                unit[0], unit[1]
            )));
        }
        Ok((w, r))
    };
    let narrow = section(bc + tc, base.bottom_radius)?;
    let middle = section(tc, base.bottom_radius + bc)?;
    let wide = section(0.0, base.top_radius())?;

    let z0 = eco.base_thickness;
    let mut tiers = vec![frustum(kb, narrow, middle, z0, bc)?];
    if vs > 0.0 {
        tiers.push(rounded_rectangle_extrude(
            kb,
            middle.0[0],
            middle.0[1],
            z0 + bc,
            vs,
            middle.1,
        )?);
    }
    tiers.push(frustum(kb, middle, wide, z0 + bc + vs, tc)?);
    let top = z0 + base.height();
    if floor_z > top {
        tiers.push(rounded_rectangle_extrude(
            kb,
            wide.0[0],
            wide.0[1],
            top,
            floor_z - top,
            wide.1,
        )?);
    }
    multi_fuse(kb, &tiers)
}

/// Cutting tool for an eco bin: a pocket inside every cell's base plus the
/// interior above it, with dividers and the lip left standing.
///
/// Each pocket follows the base profile, so the base keeps a shell of
/// `base_thickness` underneath and `base_wall_thickness` around the sides.
#[allow(clippy::too_many_arguments)]
#[instrument(skip(kb, footprint, interior, cells, lip))]
pub fn make_eco_inner_cut(
    kb: &mut dyn KernelBundle,
    eco: &EcoShell,
    base: &BaseProfile,
    unit: [f64; 2],
    footprint: &Footprint,
    interior: &Interior,
    outer_radius: f64,
    cells: &[Vector3],
    lip: Option<ShapeHandle>,
) -> Result<ShapeHandle, OpError> {
    if cells.is_empty() {
        return Err(OpError::invalid("eco bin needs at least one grid cell"));
    }
    if eco.base_thickness <= 0.0 || eco.base_thickness >= interior.floor_z {
        return Err(OpError::invalid(format!(
            "eco base thickness {} must lie between 0 and the interior floor at {}",
            eco.base_thickness, interior.floor_z
        )));
    }

    let pocket = cell_pocket(kb, eco, base, unit, interior.floor_z)?;
    let pockets = copy_and_translate(kb, &pocket, cells)?;

    let radius = outer_radius - eco.wall_thickness;
    if radius <= 0.0 {
        return Err(OpError::invalid(format!(
            "eco wall thickness {} leaves no interior corner radius",
            eco.wall_thickness
        )));
    }
    let hollow = footprint.extrude(
        kb,
        eco.wall_thickness,
        radius,
        interior.floor_z,
        interior.usable_height(),
    )?;
    let tool = multi_fuse(kb, &[pockets, hollow])?;

    let dividers = make_dividers(kb, interior)?;
    let tool = cut_optional(kb, tool, dividers)?;

    let floor = edges_at_height(&*kb, &tool, eco.base_thickness)?;
    let tool = fillet_edges(kb, tool, eco.fillet_radius, &floor)?;
    cut_optional(kb, tool, lip)
}
