//! Rich assertion helpers with diagnostic output.
//!
//! Every failure names the context and reports expected vs actual values.

use brep_kernel::{KernelIntrospect, ShapeHandle};
use gridfinity_engine::GridfinityObject;

use crate::helpers::{relative_diff, HarnessError};

/// Assert a solid's volume within a relative tolerance.
pub fn assert_volume_close(
    kernel: &dyn KernelIntrospect,
    solid: &ShapeHandle,
    expected: f64,
    rel_tol: f64,
    ctx: &str,
) -> Result<(), HarnessError> {
    let actual = kernel.volume(solid)?;
    let diff = relative_diff(actual, expected);
    if diff <= rel_tol {
        Ok(())
    } else {
        Err(HarnessError::AssertionFailed {
            detail: format!(
                "[{}] volume: expected {:.2}, got {:.2} (rel diff {:.2e} > {:.0e})",
                ctx, expected, actual, diff, rel_tol,
            ),
        })
    }
}

/// Assert the solid's bounding box matches expected values within tolerance.
pub fn assert_bounding_box(
    kernel: &dyn KernelIntrospect,
    solid: &ShapeHandle,
    expected_min: [f64; 3],
    expected_max: [f64; 3],
    tol: f64,
    ctx: &str,
) -> Result<(), HarnessError> {
    let bb = kernel.bounding_box(solid)?;
    for i in 0..3 {
        if (bb.min[i] - expected_min[i]).abs() > tol {
            return Err(HarnessError::AssertionFailed {
                detail: format!(
                    "[{}] bounding box min[{}]: expected {:.3}, got {:.3} (tol={})",
                    ctx, i, expected_min[i], bb.min[i], tol,
                ),
            });
        }
        if (bb.max[i] - expected_max[i]).abs() > tol {
            return Err(HarnessError::AssertionFailed {
                detail: format!(
                    "[{}] bounding box max[{}]: expected {:.3}, got {:.3} (tol={})",
                    ctx, i, expected_max[i], bb.max[i], tol,
                ),
            });
        }
    }
    Ok(())
}

/// Assert the solid's centre of gravity within an absolute tolerance.
pub fn assert_center_of_gravity(
    kernel: &dyn KernelIntrospect,
    solid: &ShapeHandle,
    expected: [f64; 3],
    tol: f64,
    ctx: &str,
) -> Result<(), HarnessError> {
    let cog = kernel.center_of_gravity(solid)?;
    let off: Vec<usize> = (0..3)
        .filter(|&i| (cog[i] - expected[i]).abs() > tol)
        .collect();
    if off.is_empty() {
        Ok(())
    } else {
        Err(HarnessError::AssertionFailed {
            detail: format!(
                "[{}] centre of gravity: expected {:?}, got {:?} (axes {:?} off by more than {})",
                ctx, expected, cog, off, tol,
            ),
        })
    }
}

/// Assert an object carries no diagnostics, listing them if it does.
pub fn assert_no_diagnostics(object: &GridfinityObject) -> Result<(), HarnessError> {
    if object.diagnostics.is_empty() {
        return Ok(());
    }
    let lines: Vec<String> = object
        .diagnostics
        .iter()
        .map(|d| format!("  {:?}: {}", d.severity, d.message))
        .collect();
    Err(HarnessError::AssertionFailed {
        detail: format!(
            "[{}] expected no diagnostics, got:\n{}",
            object.name,
            lines.join("\n"),
        ),
    })
}
