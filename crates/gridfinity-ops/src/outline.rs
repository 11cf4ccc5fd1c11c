//! Bin footprints: rectangles, L shapes and arbitrary polyominoes.
//!
//! A polyomino is traced along the boundary of its occupied cells, collinear
//! runs are merged, corners are pushed inward by the requested inset, and
//! every remaining corner is filleted.

use std::collections::HashMap;

use brep_kernel::{BoundingBox, CurveSegment, ShapeHandle, Vector3};
use gridfinity_types::LayoutMatrix;
use serde::{Deserialize, Serialize};

use crate::kernel_ext::KernelBundle;
use crate::sketch::{extrude_outline, rounded_l_segments, rounded_polygon, rounded_rectangle_segments};
use crate::types::OpError;

/// Grid pitch per axis and the clearance taken off every outer face.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    pub x_pitch: f64,
    pub y_pitch: f64,
    pub clearance: f64,
}

impl GridSpec {
    pub fn square(pitch: f64, clearance: f64) -> Self {
        GridSpec {
            x_pitch: pitch,
            y_pitch: pitch,
            clearance,
        }
    }

    /// Centre of cell `(x, y)` at z = 0. Cell (0, 0) spans `[0, x_pitch] × [0, y_pitch]`.
    pub fn cell_center(&self, x: usize, y: usize) -> Vector3 {
        [
            (x as f64 + 0.5) * self.x_pitch,
            (y as f64 + 0.5) * self.y_pitch,
            0.0,
        ]
    }

    /// Centres of every occupied cell, x-major.
    pub fn cell_centers(&self, layout: &LayoutMatrix) -> Vec<Vector3> {
        layout
            .occupied_cells()
            .map(|(x, y)| self.cell_center(x, y))
            .collect()
    }

    /// Width of one bin unit along x after clearance.
    pub fn unit_x(&self) -> f64 {
        self.x_pitch - 2.0 * self.clearance
    }

    pub fn unit_y(&self) -> f64 {
        self.y_pitch - 2.0 * self.clearance
    }
}

/// Outer shape of a bin or baseplate in the XY plane.
///
/// Rectangle and L dimensions are final: clearance is already applied.
/// Polyomino outlines apply the grid clearance themselves.
#[derive(Debug, Clone, PartialEq)]
pub enum Footprint {
    Rectangle {
        x_size: f64,
        y_size: f64,
        center: [f64; 2],
    },
    LShape {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        origin: [f64; 2],
    },
    Polyomino {
        layout: LayoutMatrix,
        grid: GridSpec,
    },
}

impl Footprint {
    /// Closed outline moved `inset` inward, corners rounded by `radius`, at height `z`.
    pub fn outline(&self, inset: f64, radius: f64, z: f64) -> Result<Vec<CurveSegment>, OpError> {
        match self {
            Footprint::Rectangle {
                x_size,
                y_size,
                center,
            } => {
                let segments =
                    rounded_rectangle_segments(x_size - 2.0 * inset, y_size - 2.0 * inset, z, radius)?;
                Ok(segments
                    .iter()
                    .map(|s| s.translated([center[0], center[1], 0.0]))
                    .collect())
            }
            Footprint::LShape {
                x1,
                y1,
                x2,
                y2,
                origin,
            } => rounded_l_segments(
                x1 - 2.0 * inset,
                y1 - 2.0 * inset,
                x2 - 2.0 * inset,
                y2 - 2.0 * inset,
                [origin[0] + inset, origin[1] + inset],
                z,
                radius,
            ),
            Footprint::Polyomino { layout, grid } => {
                polyomino_outline(layout, grid, grid.clearance + inset, radius, z)
            }
        }
    }

    /// Prism over the inset outline, from `z` up by `height`.
    pub fn extrude(
        &self,
        kb: &mut dyn KernelBundle,
        inset: f64,
        radius: f64,
        z: f64,
        height: f64,
    ) -> Result<ShapeHandle, OpError> {
        let outline = self.outline(inset, radius, z)?;
        extrude_outline(kb, &outline, height)
    }

    /// Whether the stacking lip can be swept along this outline. Polyomino
    /// outlines may have reflex corners tighter than the lip profile, so they
    /// use stacked sections instead.
    pub fn sweeps_lip(&self) -> bool {
        !matches!(self, Footprint::Polyomino { .. })
    }

    /// XY bounds of the footprint, before any inset.
    pub fn extent(&self) -> Result<([f64; 2], [f64; 2]), OpError> {
        match self {
            Footprint::Rectangle {
                x_size,
                y_size,
                center,
            } => Ok((
                [center[0] - x_size / 2.0, center[1] - y_size / 2.0],
                [center[0] + x_size / 2.0, center[1] + y_size / 2.0],
            )),
            Footprint::LShape { x1, y1, origin, .. } => {
                Ok((*origin, [origin[0] + x1, origin[1] + y1]))
            }
            Footprint::Polyomino { layout, grid } => {
                let corners = traced_corners(layout)?;
                let xs = corners.iter().map(|c| c[0] as f64 * grid.x_pitch);
                let ys = corners.iter().map(|c| c[1] as f64 * grid.y_pitch);
                let (x0, x1) = xs.fold((f64::MAX, f64::MIN), |(lo, hi), v| (lo.min(v), hi.max(v)));
                let (y0, y1) = ys.fold((f64::MAX, f64::MIN), |(lo, hi), v| (lo.min(v), hi.max(v)));
                let c = grid.clearance;
                Ok(([x0 + c, y0 + c], [x1 - c, y1 - c]))
            }
        }
    }

    /// Bounding box of the outline at height `z`.
    pub fn bounding_box(&self, inset: f64, radius: f64, z: f64) -> Result<BoundingBox, OpError> {
        let outline = self.outline(inset, radius, z)?;
        BoundingBox::from_segments(&outline).ok_or_else(|| OpError::invalid("empty footprint"))
    }
}

type Lattice = [i64; 2];

/// Corners of the layout's boundary on the cell lattice, counter-clockwise,
/// starting at the lower-left corner of the lowest row.
pub fn traced_corners(layout: &LayoutMatrix) -> Result<Vec<Lattice>, OpError> {
    layout
        .validate()
        .map_err(|e| OpError::invalid(format!("layout cannot be outlined: {e}")))?;

    // Directed unit edges with the occupied side on the left.
    let mut next: HashMap<Lattice, Lattice> = HashMap::new();
    let mut add = |from: Lattice, to: Lattice| -> Result<(), OpError> {
        if next.insert(from, to).is_some() {
            return Err(OpError::invalid(format!(
                "layout boundary touches itself at lattice point {from:?}"
            )));
        }
        Ok(())
    };
    for (x, y) in layout.occupied_cells() {
        let (xi, yi) = (x as isize, y as isize);
        let (x, y) = (x as i64, y as i64);
        if !layout.get(xi, yi - 1) {
            add([x, y], [x + 1, y])?;
        }
        if !layout.get(xi + 1, yi) {
            add([x + 1, y], [x + 1, y + 1])?;
        }
        if !layout.get(xi, yi + 1) {
            add([x + 1, y + 1], [x, y + 1])?;
        }
        if !layout.get(xi - 1, yi) {
            add([x, y + 1], [x, y])?;
        }
    }

    let start = next
        .keys()
        .copied()
        .min_by_key(|p| (p[1], p[0]))
        .ok_or_else(|| OpError::invalid("layout has no occupied cells"))?;

    let mut loop_points = vec![start];
    let mut at = start;
    loop {
        let to = *next
            .get(&at)
            .ok_or_else(|| OpError::invalid(format!("layout boundary breaks at {at:?}")))?;
        if to == start {
            break;
        }
        loop_points.push(to);
        at = to;
    }
    if loop_points.len() != next.len() {
        return Err(OpError::invalid(
            "layout boundary is not a single loop".to_string(),
        ));
    }

    // Keep only points where the direction changes.
    let n = loop_points.len();
    let corners = (0..n)
        .filter(|&i| {
            let prev = loop_points[(i + n - 1) % n];
            let here = loop_points[i];
            let next = loop_points[(i + 1) % n];
            let d_in = [here[0] - prev[0], here[1] - prev[1]];
            let d_out = [next[0] - here[0], next[1] - here[1]];
            d_in != d_out
        })
        .map(|i| loop_points[i])
        .collect();
    Ok(corners)
}

/// Move the corners of a counter-clockwise rectilinear loop inward by `inset`.
fn inset_rectilinear(corners: &[[f64; 2]], inset: f64) -> Result<Vec<[f64; 2]>, OpError> {
    let n = corners.len();
    let left = |d: [f64; 2]| {
        let len = (d[0] * d[0] + d[1] * d[1]).sqrt();
        [-d[1] / len, d[0] / len]
    };
    let moved: Vec<[f64; 2]> = (0..n)
        .map(|i| {
            let prev = corners[(i + n - 1) % n];
            let here = corners[i];
            let next = corners[(i + 1) % n];
            let n_in = left([here[0] - prev[0], here[1] - prev[1]]);
            let n_out = left([next[0] - here[0], next[1] - here[1]]);
            [
                here[0] + inset * (n_in[0] + n_out[0]),
                here[1] + inset * (n_in[1] + n_out[1]),
            ]
        })
        .collect();

    for i in 0..n {
        let j = (i + 1) % n;
        let before = [corners[j][0] - corners[i][0], corners[j][1] - corners[i][1]];
        let after = [moved[j][0] - moved[i][0], moved[j][1] - moved[i][1]];
        if before[0] * after[0] + before[1] * after[1] <= 0.0 {
            return Err(OpError::invalid(format!(
                "inset {inset} collapses boundary edge {i}"
            )));
        }
    }
    Ok(moved)
}

/// Filleted outline of a polyomino layout, `inset` inside the cell boundary.
pub fn polyomino_outline(
    layout: &LayoutMatrix,
    grid: &GridSpec,
    inset: f64,
    radius: f64,
    z: f64,
) -> Result<Vec<CurveSegment>, OpError> {
    let lattice = traced_corners(layout)?;
    let corners: Vec<[f64; 2]> = lattice
        .iter()
        .map(|p| [p[0] as f64 * grid.x_pitch, p[1] as f64 * grid.y_pitch])
        .collect();
    let corners = inset_rectilinear(&corners, inset)?;
    rounded_polygon(&corners, radius, z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use gridfinity_types::planar_region;

    fn layout(columns: &[&[bool]]) -> LayoutMatrix {
        LayoutMatrix::from_columns(columns.iter().map(|c| c.to_vec()).collect()).unwrap()
    }

    #[test]
    fn single_cell_has_four_corners() {
        let corners = traced_corners(&LayoutMatrix::filled(1, 1)).unwrap();
        assert_eq!(corners, vec![[0, 0], [1, 0], [1, 1], [0, 1]]);
    }

    #[test]
    fn filled_rectangle_merges_collinear_edges() {
        let corners = traced_corners(&LayoutMatrix::filled(3, 2)).unwrap();
        assert_eq!(corners, vec![[0, 0], [3, 0], [3, 2], [0, 2]]);
    }

    #[test]
    fn l_layout_has_six_corners() {
        // x = 0 column full height, x = 1..2 only on the bottom row.
        let l = layout(&[&[true, true], &[true, false], &[true, false]]);
        let corners = traced_corners(&l).unwrap();
        assert_eq!(corners.len(), 6);
        assert_eq!(corners[0], [0, 0]);
    }

    #[test]
    fn disconnected_layout_rejected() {
        let l = layout(&[&[true], &[false], &[true]]);
        assert!(traced_corners(&l).is_err());
    }

    #[test]
    fn diagonal_touch_rejected() {
        let l = layout(&[&[true, false], &[false, true]]);
        assert!(traced_corners(&l).is_err());
    }

    #[test]
    fn outline_of_block_matches_rectangle() {
        let grid = GridSpec::square(42.0, 0.25);
        let poly = polyomino_outline(&LayoutMatrix::filled(2, 2), &grid, 0.25, 3.75, 0.0).unwrap();
        let rect = Footprint::Rectangle {
            x_size: 83.5,
            y_size: 83.5,
            center: [42.0, 42.0],
        }
        .outline(0.0, 3.75, 0.0)
        .unwrap();
        let a = planar_region(&poly).unwrap();
        let b = planar_region(&rect).unwrap();
        assert_relative_eq!(a.area, b.area, epsilon = 1e-9);
        assert_relative_eq!(a.centroid[0], b.centroid[0], epsilon = 1e-9);
        assert_relative_eq!(a.centroid[1], b.centroid[1], epsilon = 1e-9);
    }

    #[test]
    fn excessive_inset_rejected() {
        let grid = GridSpec::square(42.0, 0.0);
        let l = layout(&[&[true, true], &[true, false]]);
        assert!(polyomino_outline(&l, &grid, 22.0, 1.0, 0.0).is_err());
    }

    #[test]
    fn polyomino_extent_applies_clearance() {
        let fp = Footprint::Polyomino {
            layout: LayoutMatrix::filled(3, 1),
            grid: GridSpec::square(42.0, 0.25),
        };
        let (lo, hi) = fp.extent().unwrap();
        assert_relative_eq!(lo[0], 0.25);
        assert_relative_eq!(hi[0], 125.75);
        assert_relative_eq!(hi[1], 41.75);
    }
}
