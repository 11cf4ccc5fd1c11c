//! Interior hollows, divider walls, and the compartment grid they create.

use brep_kernel::{Kernel, ShapeHandle};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::fillet::{edges_at_height, fillet_edges};
use crate::kernel_ext::KernelBundle;
use crate::outline::Footprint;
use crate::shape_ops::{cut_optional, multi_fuse};
use crate::types::OpError;

/// Divider layout inside a bin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dividers {
    /// Walls perpendicular to x, splitting the interior along x.
    pub x_count: u32,
    pub y_count: u32,
    pub thickness: f64,
    /// Height above the floor; zero means full usable height.
    pub x_height: f64,
    pub y_height: f64,
}

impl Dividers {
    pub fn none(thickness: f64) -> Self {
        Dividers {
            x_count: 0,
            y_count: 0,
            thickness,
            x_height: 0.0,
            y_height: 0.0,
        }
    }
}

/// Axis-aligned interior box of a bin: inside the walls, above the floor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interior {
    pub min: [f64; 2],
    pub max: [f64; 2],
    pub floor_z: f64,
    pub top_z: f64,
    pub dividers: Dividers,
}

impl Interior {
    /// Interior of `footprint` with walls of `wall` thickness.
    pub fn new(
        footprint: &Footprint,
        wall: f64,
        floor_z: f64,
        top_z: f64,
        dividers: Dividers,
    ) -> Result<Self, OpError> {
        let (lo, hi) = footprint.extent()?;
        let interior = Interior {
            min: [lo[0] + wall, lo[1] + wall],
            max: [hi[0] - wall, hi[1] - wall],
            floor_z,
            top_z,
            dividers,
        };
        interior.x_compartment_width()?;
        interior.y_compartment_width()?;
        if top_z <= floor_z {
            return Err(OpError::invalid(format!(
                "usable height must be positive (floor {floor_z}, top {top_z})"
            )));
        }
        Ok(interior)
    }

    pub fn usable_height(&self) -> f64 {
        self.top_z - self.floor_z
    }

    fn compartment_width(span: f64, count: u32, thickness: f64) -> Result<f64, OpError> {
        let width = (span - count as f64 * thickness) / (count as f64 + 1.0);
        if width <= 0.0 {
            return Err(OpError::invalid(format!(
                "{count} dividers of {thickness} mm do not fit in {span:.2} mm"
            )));
        }
        Ok(width)
    }

    pub fn x_compartment_width(&self) -> Result<f64, OpError> {
        Self::compartment_width(
            self.max[0] - self.min[0],
            self.dividers.x_count,
            self.dividers.thickness,
        )
    }

    pub fn y_compartment_width(&self) -> Result<f64, OpError> {
        Self::compartment_width(
            self.max[1] - self.min[1],
            self.dividers.y_count,
            self.dividers.thickness,
        )
    }

    fn ranges(start: f64, width: f64, count: u32, thickness: f64) -> Vec<(f64, f64)> {
        (0..=count)
            .map(|i| {
                let a = start + i as f64 * (width + thickness);
                (a, a + width)
            })
            .collect()
    }

    /// Spans of the x compartments, low to high.
    pub fn x_compartments(&self) -> Result<Vec<(f64, f64)>, OpError> {
        let w = self.x_compartment_width()?;
        Ok(Self::ranges(self.min[0], w, self.dividers.x_count, self.dividers.thickness))
    }

    pub fn y_compartments(&self) -> Result<Vec<(f64, f64)>, OpError> {
        let w = self.y_compartment_width()?;
        Ok(Self::ranges(self.min[1], w, self.dividers.y_count, self.dividers.thickness))
    }

    fn divider_top(&self, height: f64) -> f64 {
        if height > 0.0 {
            (self.floor_z + height).min(self.top_z)
        } else {
            self.top_z
        }
    }
}

/// Divider walls spanning the interior, or `None` without dividers.
pub fn make_dividers(
    kb: &mut dyn KernelBundle,
    interior: &Interior,
) -> Result<Option<ShapeHandle>, OpError> {
    let d = interior.dividers;
    let mut walls = Vec::new();

    let x_top = interior.divider_top(d.x_height);
    let x_spans = interior.x_compartments()?;
    for span in x_spans.iter().take(d.x_count as usize) {
        walls.push(kb.make_box(
            [span.1, interior.min[1], interior.floor_z],
            [
                d.thickness,
                interior.max[1] - interior.min[1],
                x_top - interior.floor_z,
            ],
        )?);
    }

    let y_top = interior.divider_top(d.y_height);
    let y_spans = interior.y_compartments()?;
    for span in y_spans.iter().take(d.y_count as usize) {
        walls.push(kb.make_box(
            [interior.min[0], span.1, interior.floor_z],
            [
                interior.max[0] - interior.min[0],
                d.thickness,
                y_top - interior.floor_z,
            ],
        )?);
    }

    if walls.is_empty() {
        return Ok(None);
    }
    multi_fuse(kb, &walls).map(Some)
}

/// Cutting tool that hollows a bin into compartments.
///
/// The hollow follows the footprint inset by the wall thickness. Divider
/// walls are removed from it, and a lip region (if given) is kept out of it
/// so the lip is not cut away. Floor edges are rounded by `fillet_radius`.
#[instrument(skip(kb, footprint, lip))]
pub fn make_compartments(
    kb: &mut dyn KernelBundle,
    footprint: &Footprint,
    interior: &Interior,
    wall: f64,
    outer_radius: f64,
    fillet_radius: f64,
    lip: Option<ShapeHandle>,
) -> Result<ShapeHandle, OpError> {
    let radius = outer_radius - wall;
    if radius <= 0.0 {
        return Err(OpError::invalid(format!(
            "wall thickness {wall} leaves no interior corner radius"
        )));
    }
    let hollow = footprint.extrude(
        kb,
        wall,
        radius,
        interior.floor_z,
        interior.usable_height(),
    )?;
    let dividers = make_dividers(kb, interior)?;
    let tool = cut_optional(kb, hollow, dividers)?;

    let floor = edges_at_height(&*kb, &tool, interior.floor_z)?;
    debug!(edges = floor.len(), "filleting compartment floor");
    let tool = fillet_edges(kb, tool, fillet_radius, &floor)?;

    cut_optional(kb, tool, lip)
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

    fn interior(dividers: Dividers) -> Interior {
        Interior::new(&footprint(), 1.2, 5.75, 42.0, dividers).unwrap()
    }

    // ── Compartment grid ───────────────────────────────────────────────────

    #[test]
    fn compartment_widths_share_the_interior() {
        let i = interior(Dividers {
            x_count: 2,
            ..Dividers::none(1.2)
        });
        let span = 83.5 - 2.4;
        assert_relative_eq!(i.x_compartment_width().unwrap(), (span - 2.4) / 3.0, epsilon = 1e-12);
        let spans = i.x_compartments().unwrap();
        assert_eq!(spans.len(), 3);
        assert_relative_eq!(spans[2].1, i.max[0], epsilon = 1e-9);
        assert_relative_eq!(i.y_compartment_width().unwrap(), span, epsilon = 1e-12);
    }

    #[test]
    fn too_many_dividers_rejected() {
        let r = Interior::new(
            &footprint(),
            1.2,
            5.75,
            42.0,
            Dividers {
                x_count: 80,
                ..Dividers::none(1.2)
            },
        );
        assert!(r.is_err());
    }

    // ── Tools ──────────────────────────────────────────────────────────────

    #[test]
    fn dividers_default_to_full_height() {
        let mut k = MockKernel::new();
        let i = interior(Dividers {
            x_count: 1,
            y_count: 1,
            y_height: 10.0,
            ..Dividers::none(1.2)
        });
        let walls = make_dividers(&mut k, &i).unwrap().unwrap();
        let span = 83.5 - 2.4;
        let expected = 1.2 * span * (42.0 - 5.75) + 1.2 * span * 10.0;
        assert_relative_eq!(k.volume(&walls).unwrap(), expected, epsilon = 1e-6);
    }

    #[test]
    fn compartment_tool_removes_dividers() {
        let mut k = MockKernel::new();
        let i = interior(Dividers {
            x_count: 1,
            ..Dividers::none(1.2)
        });
        let tool = make_compartments(&mut k, &footprint(), &i, 1.2, 3.75, 1.85, None).unwrap();
        let span = 83.5 - 2.4;
        let hollow = (span * span - (4.0 - PI) * 2.55 * 2.55) * 36.25;
        let wall = 1.2 * span * 36.25;
        assert_relative_eq!(k.volume(&tool).unwrap(), hollow - wall, epsilon = 1e-6);
        assert_eq!(k.call_count("fillet"), 1);
    }

    #[test]
    fn no_dividers_is_none() {
        let mut k = MockKernel::new();
        assert!(make_dividers(&mut k, &interior(Dividers::none(1.2))).unwrap().is_none());
    }
}
