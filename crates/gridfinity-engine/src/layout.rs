//! Turns layout parameters into an occupancy matrix, grid and footprint.

use gridfinity_ops::{Footprint, GridSpec};
use gridfinity_types::{LayoutMatrix, Vector3};
use tracing::debug;

use crate::params::ParamSet;
use crate::schema::LayoutShape;
use crate::types::{EngineError, ObjectKind};

/// Occupancy and pitch of one object's grid.
#[derive(Debug, Clone, PartialEq)]
pub struct GridLayout {
    pub shape: LayoutShape,
    pub matrix: LayoutMatrix,
    pub grid: GridSpec,
}

/// Matrix of an L with overall size `x1 × y1` cells and arms `x2` and `y2`
/// cells wide. Cell (x, y) is occupied iff `x < x2 || y < y2`.
pub fn l_layout(x1: i64, y1: i64, x2: i64, y2: i64) -> Result<LayoutMatrix, EngineError> {
    if x2 < 1 || y2 < 1 || x2 >= x1 || y2 >= y1 {
        return Err(EngineError::invalid(format!(
            "L layout needs 1 <= x2 < x1 and 1 <= y2 < y1, got x1={x1} y1={y1} x2={x2} y2={y2}"
        )));
    }
    let mut m = LayoutMatrix::new(x1 as usize, y1 as usize);
    for x in 0..x1 {
        for y in 0..y1 {
            if x < x2 || y < y2 {
                m.set(x as usize, y as usize, true);
            }
        }
    }
    Ok(m)
}

fn whole_units(params: &ParamSet, name: &str) -> Result<i64, EngineError> {
    let units = params.integer(name).map_err(|_| {
        EngineError::invalid(format!(
            "{name} must be a whole number of grid cells, got {}",
            params.number(name).unwrap_or(f64::NAN)
        ))
    })?;
    if units < 1 {
        return Err(EngineError::invalid(format!("{name} must be at least 1, got {units}")));
    }
    Ok(units)
}

/// Builds the occupancy matrix for `kind` and writes `xMaxGrids` /
/// `yMaxGrids` back to the parameters.
pub fn apply_layout(kind: ObjectKind, params: &mut ParamSet) -> Result<GridLayout, EngineError> {
    let shape = kind.layout_shape();
    let matrix = match shape {
        LayoutShape::Rectangle => {
            let x = whole_units(params, "xGridUnits")?;
            let y = whole_units(params, "yGridUnits")?;
            LayoutMatrix::filled(x as usize, y as usize)
        }
        LayoutShape::LShape => l_layout(
            whole_units(params, "x1GridUnits")?,
            whole_units(params, "y1GridUnits")?,
            whole_units(params, "x2GridUnits")?,
            whole_units(params, "y2GridUnits")?,
        )?,
        LayoutShape::Custom => params.layout("Layout")?.clone(),
    };
    matrix
        .validate()
        .map_err(|e| EngineError::invalid(e.to_string()))?;

    params.set_computed("xMaxGrids", matrix.x_len() as f64)?;
    params.set_computed("yMaxGrids", matrix.y_len() as f64)?;

    let clearance = if params.has_property("Clearance") {
        params.number("Clearance")?
    } else {
        0.0
    };
    let grid = GridSpec {
        x_pitch: params.number("xGridSize")?,
        y_pitch: params.number("yGridSize")?,
        clearance,
    };
    if grid.x_pitch <= 2.0 * clearance || grid.y_pitch <= 2.0 * clearance {
        return Err(EngineError::invalid(format!(
            "grid pitch {}×{} leaves no room inside a clearance of {clearance}",
            grid.x_pitch, grid.y_pitch
        )));
    }
    debug!(
        cells = matrix.count(),
        x = matrix.x_len(),
        y = matrix.y_len(),
        "layout resolved"
    );
    Ok(GridLayout {
        shape,
        matrix,
        grid,
    })
}

impl GridLayout {
    pub fn cell_centers(&self) -> Vec<Vector3> {
        self.grid.cell_centers(&self.matrix)
    }

    /// Size of the whole layout, cell pitch times matrix size.
    pub fn extent(&self) -> [f64; 2] {
        [
            self.matrix.x_len() as f64 * self.grid.x_pitch,
            self.matrix.y_len() as f64 * self.grid.y_pitch,
        ]
    }

    /// Outer outline of the object. Needs the reference widths, so call it
    /// after expressions are evaluated.
    pub fn footprint(&self, params: &ParamSet) -> Result<Footprint, EngineError> {
        let c = self.grid.clearance;
        match self.shape {
            LayoutShape::Rectangle => {
                let [ex, ey] = self.extent();
                Ok(Footprint::Rectangle {
                    x_size: params.number("xTotalWidth")?,
                    y_size: params.number("yTotalWidth")?,
                    center: [ex / 2.0, ey / 2.0],
                })
            }
            LayoutShape::LShape => {
                let (gx, gy) = (self.grid.x_pitch, self.grid.y_pitch);
                Ok(Footprint::LShape {
                    x1: params.number("xTotalWidth")?,
                    y1: params.number("yTotalWidth")?,
                    x2: params.number("x2GridUnits")? * gx - 2.0 * c,
                    y2: params.number("y2GridUnits")? * gy - 2.0 * c,
                    origin: [c, c],
                })
            }
            LayoutShape::Custom => Ok(Footprint::Polyomino {
                layout: self.matrix.clone(),
                grid: self.grid,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::PreferenceStore;
    use crate::schema::install_all;
    use gridfinity_types::ParamValue;
    use proptest::prelude::*;

    fn params(kind: ObjectKind) -> ParamSet {
        let mut p = ParamSet::new();
        install_all(kind, &mut p, &PreferenceStore::factory()).unwrap();
        p
    }

    #[test]
    fn rectangle_writes_max_grids() {
        let mut p = params(ObjectKind::BinBlank);
        p.set("xGridUnits", ParamValue::Float(3.0)).unwrap();
        let layout = apply_layout(ObjectKind::BinBlank, &mut p).unwrap();
        assert_eq!(layout.matrix.count(), 6);
        assert_eq!(p.integer("xMaxGrids").unwrap(), 3);
        assert_eq!(p.integer("yMaxGrids").unwrap(), 2);
        assert_eq!(layout.grid.clearance, 0.25);
    }

    #[test]
    fn fractional_units_are_invalid_geometry() {
        let mut p = params(ObjectKind::BinBlank);
        p.set("xGridUnits", ParamValue::Float(1.5)).unwrap();
        assert!(matches!(
            apply_layout(ObjectKind::BinBlank, &mut p),
            Err(EngineError::InvalidGeometry { .. })
        ));
    }

    #[test]
    fn l_layout_matches_hand_drawn() {
        let m = l_layout(3, 2, 1, 1).unwrap();
        let expected = LayoutMatrix::from_columns(vec![
            vec![true, true],
            vec![true, false],
            vec![true, false],
        ])
        .unwrap();
        assert_eq!(m, expected);
        assert!(l_layout(2, 2, 2, 1).is_err());
    }

    #[test]
    fn baseplate_grid_has_no_clearance() {
        let mut p = params(ObjectKind::Baseplate);
        let layout = apply_layout(ObjectKind::Baseplate, &mut p).unwrap();
        assert_eq!(layout.grid.clearance, 0.0);
        assert_eq!(layout.extent(), [84.0, 84.0]);
    }

    proptest! {
        #[test]
        fn l_layouts_are_valid(x1 in 2i64..8, y1 in 2i64..8, dx in 1i64..7, dy in 1i64..7) {
            prop_assume!(dx < x1 && dy < y1);
            let m = l_layout(x1, y1, dx, dy).unwrap();
            prop_assert!(m.validate().is_ok());
            let expected = x1 * y1 - (x1 - dx) * (y1 - dy);
            prop_assert_eq!(m.count() as i64, expected);
        }
    }
}
