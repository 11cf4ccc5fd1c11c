//! Angled label shelves hung from the low-x wall of each compartment.

use brep_kernel::{CurveSegment, Kernel, ShapeHandle};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::compartments::Interior;
use crate::fillet::{edges_at_height, fillet_edges, vertical_edges_at_x};
use crate::kernel_ext::KernelBundle;
use crate::shape_ops::multi_fuse;
use crate::sketch::curve_to_wire;
use crate::types::OpError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShelfPlacement {
    FullWidth,
    Center,
    Left,
    Right,
}

impl ShelfPlacement {
    pub const NAMES: [&'static str; 4] = ["Full Width", "Center", "Left", "Right"];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Full Width" => Some(ShelfPlacement::FullWidth),
            "Center" => Some(ShelfPlacement::Center),
            "Left" => Some(ShelfPlacement::Left),
            "Right" => Some(ShelfPlacement::Right),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelShelf {
    pub placement: ShelfPlacement,
    /// Depth of the shelf away from its wall.
    pub width: f64,
    /// Run along the wall when not full width.
    pub length: f64,
    pub angle_deg: f64,
    /// Drop of the shelf top below the bin top.
    pub stacking_offset: f64,
    pub vertical_thickness: f64,
}

/// Shelf cross-section in the plane y = `y`, against the wall at `x`.
fn shelf_profile(
    shelf: &LabelShelf,
    interior: &Interior,
    x: f64,
    y: f64,
) -> Vec<CurveSegment> {
    let top = interior.top_z - shelf.stacking_offset;
    let lip_bottom = top - shelf.vertical_thickness;
    let drop = shelf.width * shelf.angle_deg.to_radians().tan();
    let heel = (lip_bottom - drop).max(interior.floor_z);
    let a = [x, y, top];
    let b = [x + shelf.width, y, top];
    let c = [x + shelf.width, y, lip_bottom];
    let d = [x, y, heel];
    vec![
        CurveSegment::line(a, b),
        CurveSegment::line(b, c),
        CurveSegment::line(c, d),
        CurveSegment::line(d, a),
    ]
}

/// Placement actually built and the y spans the shelves occupy. A shelf
/// longer than a compartment becomes full width.
fn shelf_spans(
    shelf: &LabelShelf,
    interior: &Interior,
) -> Result<(ShelfPlacement, Vec<(f64, f64)>), OpError> {
    let whole = vec![(interior.min[1], interior.max[1])];
    if shelf.placement == ShelfPlacement::FullWidth {
        return Ok((ShelfPlacement::FullWidth, whole));
    }
    if shelf.length > interior.y_compartment_width()? {
        debug!(length = shelf.length, "label shelf longer than compartment, using full width");
        return Ok((ShelfPlacement::FullWidth, whole));
    }
    let spans = interior
        .y_compartments()?
        .into_iter()
        .map(|(lo, hi)| match shelf.placement {
            ShelfPlacement::Left => (lo, lo + shelf.length),
            ShelfPlacement::Right => (hi - shelf.length, hi),
            _ => {
                let mid = (lo + hi) / 2.0;
                (mid - shelf.length / 2.0, mid + shelf.length / 2.0)
            }
        })
        .collect();
    Ok((shelf.placement, spans))
}

/// Label shelves for every compartment.
///
/// Full-width shelves against the outer wall get their vertical edges rounded
/// to the interior corner radius; every shelf's underside edge gets the
/// inside fillet.
#[instrument(skip(kb, interior))]
pub fn make_label_shelf(
    kb: &mut dyn KernelBundle,
    shelf: &LabelShelf,
    interior: &Interior,
    corner_radius: f64,
    fillet_radius: f64,
) -> Result<ShapeHandle, OpError> {
    if shelf.width <= 0.0 || shelf.vertical_thickness <= 0.0 {
        return Err(OpError::invalid(format!("invalid label shelf: {shelf:?}")));
    }
    if !(0.0..90.0).contains(&shelf.angle_deg) {
        return Err(OpError::invalid(format!(
            "label shelf angle must be within [0, 90), got {}",
            shelf.angle_deg
        )));
    }
    if shelf.width >= interior.x_compartment_width()? {
        return Err(OpError::invalid(format!(
            "label shelf width {} does not fit the compartment",
            shelf.width
        )));
    }

    let (placement, spans) = shelf_spans(shelf, interior)?;
    let full_width = placement == ShelfPlacement::FullWidth;
    let underside = interior.top_z - shelf.stacking_offset - shelf.vertical_thickness;
    let mut shelves = Vec::new();
    for (x0, _) in interior.x_compartments()? {
        for &(y0, y1) in &spans {
            let profile = shelf_profile(shelf, interior, x0, y0);
            let wire = curve_to_wire(kb, &profile)?;
            let face = kb.make_face(&wire)?;
            let mut s = kb.extrude(&face, [0.0, y1 - y0, 0.0])?;

            if full_width && (x0 - interior.min[0]).abs() < 1e-9 {
                let outer = vertical_edges_at_x(&*kb, &s, x0)?;
                s = fillet_edges(kb, s, corner_radius, &outer)?;
            }
            if shelf.vertical_thickness > fillet_radius / 2.0 {
                let under = edges_at_height(&*kb, &s, underside)?;
                s = fillet_edges(kb, s, fillet_radius, &under)?;
            }
            shelves.push(s);
        }
    }
    multi_fuse(kb, &shelves)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use brep_kernel::{KernelIntrospect, MockKernel};

    use crate::compartments::Dividers;
    use crate::outline::Footprint;

    fn interior(x: u32, y: u32) -> Interior {
        let fp = Footprint::Rectangle {
            x_size: 83.5,
            y_size: 83.5,
            center: [42.0, 42.0],
        };
        Interior::new(
            &fp,
            1.2,
            5.75,
            42.0,
            Dividers {
                x_count: x,
                y_count: y,
                ..Dividers::none(1.2)
            },
        )
        .unwrap()
    }

    fn shelf(placement: ShelfPlacement) -> LabelShelf {
        LabelShelf {
            placement,
            width: 12.0,
            length: 20.0,
            angle_deg: 45.0,
            stacking_offset: 0.4,
            vertical_thickness: 2.0,
        }
    }

    // 12 × 2 rectangle plus a 12 × 12 right triangle.
    const SECTION: f64 = 24.0 + 72.0;

    #[test]
    fn full_width_shelf_spans_interior() {
        let mut k = MockKernel::new();
        let i = interior(0, 0);
        let s = make_label_shelf(&mut k, &shelf(ShelfPlacement::FullWidth), &i, 2.55, 1.85).unwrap();
        let span = i.max[1] - i.min[1];
        assert_relative_eq!(k.volume(&s).unwrap(), SECTION * span, epsilon = 1e-6);
        let bb = k.bounding_box(&s).unwrap();
        assert_relative_eq!(bb.max[2], 41.6, epsilon = 1e-9);
        assert_relative_eq!(bb.min[0], i.min[0], epsilon = 1e-9);
    }

    #[test]
    fn one_shelf_per_x_compartment() {
        let mut k = MockKernel::new();
        let i = interior(2, 0);
        make_label_shelf(&mut k, &shelf(ShelfPlacement::FullWidth), &i, 2.55, 1.85).unwrap();
        assert_eq!(k.call_count("extrude"), 3);
    }

    #[test]
    fn placements_within_y_compartment() {
        let i = interior(0, 1);
        let (lo, hi) = i.y_compartments().unwrap()[0];
        let (placement, left) = shelf_spans(&shelf(ShelfPlacement::Left), &i).unwrap();
        assert_eq!(placement, ShelfPlacement::Left);
        let (_, right) = shelf_spans(&shelf(ShelfPlacement::Right), &i).unwrap();
        let (_, center) = shelf_spans(&shelf(ShelfPlacement::Center), &i).unwrap();
        assert_eq!(left.len(), 2);
        assert_relative_eq!(left[0].0, lo);
        assert_relative_eq!(right[0].1, hi);
        assert_relative_eq!((center[0].0 + center[0].1) / 2.0, (lo + hi) / 2.0);
    }

    #[test]
    fn long_shelf_becomes_full_width() {
        let i = interior(0, 3);
        let long = LabelShelf {
            length: 42.0,
            ..shelf(ShelfPlacement::Center)
        };
        let (placement, spans) = shelf_spans(&long, &i).unwrap();
        assert_eq!(placement, ShelfPlacement::FullWidth);
        assert_eq!(spans, vec![(i.min[1], i.max[1])]);
    }

    // An inside fillet of 5 skips the underside, leaving only corner rounding.
    const NO_UNDERSIDE: f64 = 5.0;

    #[test]
    fn center_shelf_by_wall_keeps_plain_extrusion() {
        let mut k = MockKernel::new();
        let i = interior(0, 0);
        let s = make_label_shelf(&mut k, &shelf(ShelfPlacement::Center), &i, 2.55, NO_UNDERSIDE).unwrap();
        assert_eq!(k.call_count("fillet"), 0);
        assert_relative_eq!(k.volume(&s).unwrap(), SECTION * 20.0, epsilon = 1e-6);
        let bb = k.bounding_box(&s).unwrap();
        assert_relative_eq!(bb.max[1] - bb.min[1], 20.0, epsilon = 1e-9);
    }

    #[test]
    fn only_full_width_shelves_round_wall_corners() {
        let mut k = MockKernel::new();
        let i = interior(1, 0);
        make_label_shelf(&mut k, &shelf(ShelfPlacement::FullWidth), &i, 2.55, NO_UNDERSIDE).unwrap();
        assert_eq!(k.call_count("fillet"), 1);

        // A long centre shelf is built full width and rounded like one.
        let mut k = MockKernel::new();
        let long = LabelShelf {
            length: 90.0,
            ..shelf(ShelfPlacement::Center)
        };
        make_label_shelf(&mut k, &long, &i, 2.55, NO_UNDERSIDE).unwrap();
        assert_eq!(k.call_count("fillet"), 1);
    }

    #[test]
    fn shelf_wider_than_compartment_rejected() {
        let mut k = MockKernel::new();
        let i = interior(5, 0);
        let wide = LabelShelf {
            width: 20.0,
            ..shelf(ShelfPlacement::FullWidth)
        };
        assert!(make_label_shelf(&mut k, &wide, &i, 2.55, 1.85).is_err());
    }
}
