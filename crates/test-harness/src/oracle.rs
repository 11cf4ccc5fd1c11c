//! Verification oracles: pure functions returning pass/fail verdicts.
//!
//! Each oracle returns an `OracleVerdict` with diagnostic detail, not panics.
//! This lets a test collect all failures in one pass.

use brep_kernel::{KernelIntrospect, ShapeHandle};
use gridfinity_engine::{GenerationLocation, GridfinityObject, ParamSet};

/// The result of a single oracle check.
#[derive(Debug, Clone)]
pub struct OracleVerdict {
    pub oracle_name: String,
    pub passed: bool,
    pub detail: String,
    pub value: Option<f64>,
}

impl OracleVerdict {
    fn pass(name: &str, detail: String) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: true,
            detail,
            value: None,
        }
    }

    fn pass_val(name: &str, detail: String, value: f64) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: true,
            detail,
            value: Some(value),
        }
    }

    fn fail(name: &str, detail: String) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: false,
            detail,
            value: None,
        }
    }

    fn fail_val(name: &str, detail: String, value: f64) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: false,
            detail,
            value: Some(value),
        }
    }
}

const TOL: f64 = 1e-6;

/// Grid-unit parameter that spans the x width for each layout shape.
fn x_units(params: &ParamSet) -> Option<f64> {
    ["xGridUnits", "x1GridUnits", "xMaxGrids"]
        .iter()
        .find_map(|name| params.number(name).ok())
}

fn clearance(params: &ParamSet) -> f64 {
    params.number("Clearance").unwrap_or(0.0)
}

// ── Parameter Oracles ───────────────────────────────────────────────────────

/// Check `xTotalWidth = units · xGridSize − 2 · Clearance`.
pub fn check_total_width(params: &ParamSet) -> OracleVerdict {
    let (Some(units), Ok(size), Ok(total)) = (
        x_units(params),
        params.number("xGridSize"),
        params.number("xTotalWidth"),
    ) else {
        return OracleVerdict::fail("total_width", "missing layout parameters".to_string());
    };
    let expected = units * size - 2.0 * clearance(params);
    if (total - expected).abs() < TOL {
        OracleVerdict::pass_val(
            "total_width",
            format!("{units} × {size} − 2 × {} = {total:.3}", clearance(params)),
            total,
        )
    } else {
        OracleVerdict::fail_val(
            "total_width",
            format!("xTotalWidth {total:.3}, expected {expected:.3}"),
            total,
        )
    }
}

/// Check `UsableHeight + HeightUnitValue = TotalHeight`. Objects without a
/// usable height pass trivially.
pub fn check_height_split(params: &ParamSet) -> OracleVerdict {
    let Ok(usable) = params.number("UsableHeight") else {
        return OracleVerdict::pass("height_split", "no usable height".to_string());
    };
    let (Ok(unit), Ok(total)) = (params.number("HeightUnitValue"), params.number("TotalHeight")) else {
        return OracleVerdict::fail("height_split", "missing height parameters".to_string());
    };
    if (usable + unit - total).abs() < TOL {
        OracleVerdict::pass_val(
            "height_split",
            format!("{usable:.3} + {unit:.3} = {total:.3}"),
            usable,
        )
    } else {
        OracleVerdict::fail_val(
            "height_split",
            format!("{usable:.3} + {unit:.3} ≠ {total:.3}"),
            usable,
        )
    }
}

// ── Solid Oracles ───────────────────────────────────────────────────────────

/// Check that the solid has positive volume.
pub fn check_positive_volume(kernel: &dyn KernelIntrospect, solid: &ShapeHandle) -> OracleVerdict {
    match kernel.volume(solid) {
        Ok(v) if v > 0.0 => OracleVerdict::pass_val("positive_volume", format!("{v:.2} mm³"), v),
        Ok(v) => OracleVerdict::fail_val("positive_volume", format!("volume {v:.2} mm³"), v),
        Err(e) => OracleVerdict::fail("positive_volume", e.to_string()),
    }
}

/// Check that the solid's x extent equals `xTotalWidth`.
pub fn check_footprint_width(
    kernel: &dyn KernelIntrospect,
    solid: &ShapeHandle,
    params: &ParamSet,
) -> OracleVerdict {
    let Ok(total) = params.number("xTotalWidth") else {
        return OracleVerdict::fail("footprint_width", "missing xTotalWidth".to_string());
    };
    match kernel.bounding_box(solid) {
        Ok(bb) => {
            let width = bb.max[0] - bb.min[0];
            if (width - total).abs() < 1e-3 {
                OracleVerdict::pass_val("footprint_width", format!("{width:.3} mm"), width)
            } else {
                OracleVerdict::fail_val(
                    "footprint_width",
                    format!("solid is {width:.3} mm wide, xTotalWidth is {total:.3}"),
                    width,
                )
            }
        }
        Err(e) => OracleVerdict::fail("footprint_width", e.to_string()),
    }
}

/// Check the solid sits where its generation location says: in the positive
/// quadrant, or with its footprint centred on the origin.
pub fn check_placement(
    kernel: &dyn KernelIntrospect,
    solid: &ShapeHandle,
    params: &ParamSet,
) -> OracleVerdict {
    let location = params
        .selection("GenerationLocation")
        .ok()
        .and_then(GenerationLocation::from_name);
    let Some(location) = location else {
        return OracleVerdict::fail("placement", "unknown generation location".to_string());
    };
    let bb = match kernel.bounding_box(solid) {
        Ok(bb) => bb,
        Err(e) => return OracleVerdict::fail("placement", e.to_string()),
    };
    match location {
        GenerationLocation::PositiveFromOrigin => {
            if bb.min[0] > -TOL && bb.min[1] > -TOL {
                OracleVerdict::pass("placement", "positive quadrant".to_string())
            } else {
                OracleVerdict::fail(
                    "placement",
                    format!("min corner ({:.3}, {:.3}) below origin", bb.min[0], bb.min[1]),
                )
            }
        }
        GenerationLocation::CenteredAtOrigin => {
            let cx = (bb.min[0] + bb.max[0]) / 2.0;
            let cy = (bb.min[1] + bb.max[1]) / 2.0;
            if cx.abs() < 1e-3 && cy.abs() < 1e-3 {
                OracleVerdict::pass("placement", "centred".to_string())
            } else {
                OracleVerdict::fail("placement", format!("centre at ({cx:.3}, {cy:.3})"))
            }
        }
    }
}

// ── Aggregation ─────────────────────────────────────────────────────────────

/// Run every applicable oracle on an object.
pub fn run_all(kernel: &dyn KernelIntrospect, object: &GridfinityObject) -> Vec<OracleVerdict> {
    let params = &object.params;
    let mut verdicts = vec![check_total_width(params), check_height_split(params)];
    match &object.shape {
        Some(solid) => {
            verdicts.push(check_positive_volume(kernel, solid));
            verdicts.push(check_footprint_width(kernel, solid, params));
            verdicts.push(check_placement(kernel, solid, params));
        }
        None => verdicts.push(OracleVerdict::fail("has_solid", "object has no solid".to_string())),
    }
    verdicts
}

/// Verdicts that failed.
pub fn failures(verdicts: &[OracleVerdict]) -> Vec<&OracleVerdict> {
    verdicts.iter().filter(|v| !v.passed).collect()
}
