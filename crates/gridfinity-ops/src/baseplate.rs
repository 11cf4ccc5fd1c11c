//! Baseplates: a block with one bin-receiving pocket per cell, optionally
//! raised on a magnet layer or a thick screw-together layer.

use brep_kernel::{Kernel, ShapeHandle, Vector3};
use gridfinity_types::vec3;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::base::{base_cell, BaseProfile};
use crate::holes::hole_offsets;
use crate::kernel_ext::KernelBundle;
use crate::outline::{Footprint, GridSpec};
use crate::shape_ops::{copy_and_translate, multi_fuse};
use crate::sketch::rounded_rectangle_extrude;
use crate::types::OpError;

/// Pocket profile of a baseplate and the block around it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaseplateProfile {
    pub pocket: BaseProfile,
    pub outer_radius: f64,
    /// Flat rim left between neighbouring pockets at the top.
    pub top_ledge_width: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MagnetLayer {
    pub hole_diameter: f64,
    pub hole_depth: f64,
    pub distance_from_edge: f64,
    /// Floor under each magnet.
    pub base: f64,
    pub base_hole_diameter: f64,
    pub chamfer: f64,
    /// Material kept between the magnet holes and the centre cut.
    pub edge_thickness: f64,
    pub center_cut_radius: f64,
}

impl MagnetLayer {
    pub fn height(&self) -> f64 {
        self.hole_depth + self.base
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrewTogether {
    pub base_thickness: f64,
    pub screw_hole_diameter: f64,
    pub bottom_chamfer: f64,
    pub connection_hole_diameter: f64,
}

/// Block with one pocket per cell. The pocket layer starts at `floor_z`.
#[instrument(skip(kb, footprint, cells))]
pub fn make_baseplate(
    kb: &mut dyn KernelBundle,
    profile: &BaseplateProfile,
    footprint: &Footprint,
    grid: &GridSpec,
    cells: &[Vector3],
    floor_z: f64,
) -> Result<ShapeHandle, OpError> {
    let height = floor_z + profile.pocket.height();
    let block = footprint.extrude(kb, 0.0, profile.outer_radius, 0.0, height)?;

    let pocket = base_cell(
        kb,
        &profile.pocket,
        grid.x_pitch - 2.0 * profile.top_ledge_width,
        grid.y_pitch - 2.0 * profile.top_ledge_width,
    )?;
    let lifted: Vec<Vector3> = cells
        .iter()
        .map(|c| vec3::add(*c, [0.0, 0.0, floor_z]))
        .collect();
    let pockets = copy_and_translate(kb, &pocket, &lifted)?;
    Ok(kb.cut(&block, &pockets)?)
}

/// Cone from `radius + chamfer` at `top_z` down to `radius` at `top_z - chamfer`.
fn chamfer_cone(
    kb: &mut dyn KernelBundle,
    at: Vector3,
    radius: f64,
    chamfer: f64,
    top_z: f64,
    widening_up: bool,
) -> Result<ShapeHandle, OpError> {
    let (low_z, low_r, high_r) = if widening_up {
        (top_z - chamfer, radius, radius + chamfer)
    } else {
        (top_z - chamfer, radius + chamfer, radius)
    };
    let low = kb.make_circle([at[0], at[1], low_z], [0.0, 0.0, 1.0], low_r)?;
    let high = kb.make_circle([at[0], at[1], top_z], [0.0, 0.0, 1.0], high_r)?;
    Ok(kb.make_loft(&[low, high], true, true)?)
}

/// Magnet pockets opening upward at `top_z`, with chamfered mouths and a
/// small through hole underneath each, for every cell.
#[instrument(skip(kb, grid, cells))]
pub fn make_magnet_holes(
    kb: &mut dyn KernelBundle,
    magnet: &MagnetLayer,
    grid: &GridSpec,
    cells: &[Vector3],
    top_z: f64,
) -> Result<ShapeHandle, OpError> {
    let r = magnet.hole_diameter / 2.0;
    let pocket_bottom = top_z - magnet.hole_depth;
    if pocket_bottom <= 0.0 {
        return Err(OpError::invalid(format!(
            "magnet pocket depth {} exceeds the layer under it",
            magnet.hole_depth
        )));
    }
    let mut tools = Vec::new();
    for at in hole_offsets(grid, magnet.distance_from_edge) {
        tools.push(kb.make_cylinder(
            [at[0], at[1], pocket_bottom],
            [0.0, 0.0, 1.0],
            r,
            magnet.hole_depth,
        )?);
        if magnet.base_hole_diameter > 0.0 {
            tools.push(kb.make_cylinder(
                at,
                [0.0, 0.0, 1.0],
                magnet.base_hole_diameter / 2.0,
                pocket_bottom,
            )?);
        }
        if magnet.chamfer > 0.0 {
            tools.push(chamfer_cone(kb, at, r, magnet.chamfer, top_z, true)?);
        }
    }
    let cell = multi_fuse(kb, &tools)?;
    copy_and_translate(kb, &cell, cells)
}

/// Square opening through the magnet layer in the middle of each cell.
pub fn make_center_cuts(
    kb: &mut dyn KernelBundle,
    magnet: &MagnetLayer,
    grid: &GridSpec,
    cells: &[Vector3],
    height: f64,
) -> Result<ShapeHandle, OpError> {
    let keep = 2.0 * (magnet.distance_from_edge + magnet.hole_diameter / 2.0 + magnet.edge_thickness);
    let cut = rounded_rectangle_extrude(
        kb,
        grid.x_pitch - keep,
        grid.y_pitch - keep,
        0.0,
        height,
        magnet.center_cut_radius,
    )?;
    copy_and_translate(kb, &cut, cells)
}

/// Screw holes under every magnet, widened at the bottom, plus four
/// horizontal connection holes per cell at half the base thickness: two
/// running along x and two along y, a quarter pitch off the cell centre.
#[instrument(skip(kb, grid, cells))]
pub fn make_screw_together_holes(
    kb: &mut dyn KernelBundle,
    screw: &ScrewTogether,
    magnet: &MagnetLayer,
    grid: &GridSpec,
    cells: &[Vector3],
) -> Result<ShapeHandle, OpError> {
    let r = screw.screw_hole_diameter / 2.0;
    let through = screw.base_thickness - magnet.hole_depth;
    let mut tools = Vec::new();
    for at in hole_offsets(grid, magnet.distance_from_edge) {
        tools.push(kb.make_cylinder(at, [0.0, 0.0, 1.0], r, through)?);
        if screw.bottom_chamfer > 0.0 {
            tools.push(chamfer_cone(kb, at, r, screw.bottom_chamfer, screw.bottom_chamfer, false)?);
        }
    }

    let z = screw.base_thickness / 2.0;
    let rc = screw.connection_hole_diameter / 2.0;
    let (hx, hy) = (grid.x_pitch / 2.0, grid.y_pitch / 2.0);
    for s in [-1.0, 1.0] {
        tools.push(kb.make_cylinder([-hx, s * hy / 2.0, z], [1.0, 0.0, 0.0], rc, grid.x_pitch)?);
        tools.push(kb.make_cylinder([s * hx / 2.0, -hy, z], [0.0, 1.0, 0.0], rc, grid.y_pitch)?);
    }
    let cell = multi_fuse(kb, &tools)?;
    copy_and_translate(kb, &cell, cells)
}
