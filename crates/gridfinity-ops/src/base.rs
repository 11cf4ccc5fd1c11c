//! The stepped profile under every bin cell, and the matching baseplate pocket.

use brep_kernel::{ShapeHandle, Vector3};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::kernel_ext::KernelBundle;
use crate::shape_ops::{copy_and_translate, multi_fuse};
use crate::sketch::{rounded_rectangle_chamfer, rounded_rectangle_extrude};
use crate::types::OpError;

/// Bottom chamfer, vertical section and top chamfer of a base profile.
///
/// Each tier's corner radius grows with its horizontal offset, so only the
/// bottom radius is free.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaseProfile {
    pub bottom_chamfer: f64,
    pub vertical_section: f64,
    pub top_chamfer: f64,
    pub bottom_radius: f64,
}

impl BaseProfile {
    pub fn height(&self) -> f64 {
        self.bottom_chamfer + self.vertical_section + self.top_chamfer
    }

    /// Corner radius at the top of the profile.
    pub fn top_radius(&self) -> f64 {
        self.bottom_radius + self.bottom_chamfer + self.top_chamfer
    }

    fn validate(&self) -> Result<(), OpError> {
        if self.bottom_chamfer <= 0.0 || self.top_chamfer <= 0.0 || self.vertical_section < 0.0 {
            return Err(OpError::invalid(format!(
                "base profile tiers must be positive: {self:?}"
            )));
        }
        if self.bottom_radius <= 0.0 {
            return Err(OpError::invalid("base profile bottom radius must be positive"));
        }
        Ok(())
    }
}

/// One cell's base, centred on the origin, from z = 0 up to `profile.height()`.
/// The top section measures `unit_x × unit_y`.
pub fn base_cell(
    kb: &mut dyn KernelBundle,
    profile: &BaseProfile,
    unit_x: f64,
    unit_y: f64,
) -> Result<ShapeHandle, OpError> {
    profile.validate()?;
    let (bc, vs, tc, r) = (
        profile.bottom_chamfer,
        profile.vertical_section,
        profile.top_chamfer,
        profile.bottom_radius,
    );
    let shrink = 2.0 * (bc + tc);
    if unit_x - shrink <= 2.0 * r || unit_y - shrink <= 2.0 * r {
        return Err(OpError::invalid(format!(
            "base profile does not fit a {unit_x} x {unit_y} unit"
        )));
    }

    let bottom = rounded_rectangle_chamfer(kb, unit_x - shrink, unit_y - shrink, 0.0, bc, r)?;
    let mut tiers = vec![bottom];
    if vs > 0.0 {
        tiers.push(rounded_rectangle_extrude(
            kb,
            unit_x - 2.0 * tc,
            unit_y - 2.0 * tc,
            bc,
            vs,
            r + bc,
        )?);
    }
    tiers.push(rounded_rectangle_chamfer(
        kb,
        unit_x - 2.0 * tc,
        unit_y - 2.0 * tc,
        bc + vs,
        tc,
        r + bc,
    )?);
    multi_fuse(kb, &tiers)
}

/// Base profile copied under every cell centre.
#[instrument(skip(kb), fields(cells = cells.len()))]
pub fn make_bin_base(
    kb: &mut dyn KernelBundle,
    profile: &BaseProfile,
    unit_x: f64,
    unit_y: f64,
    cells: &[Vector3],
) -> Result<ShapeHandle, OpError> {
    let cell = base_cell(kb, profile, unit_x, unit_y)?;
    copy_and_translate(kb, &cell, cells)
}
