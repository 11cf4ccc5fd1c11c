//! Helper functions: error type, command mapping, float comparison.

use command_bridge::Command;
use gridfinity_engine::ObjectKind;

// ── Error Type ──────────────────────────────────────────────────────────────

/// Unified error type for the test harness.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("object not found: {name}")]
    ObjectNotFound { name: String },

    #[error("dispatch error: {message}")]
    DispatchError { message: String },

    #[error("no solid for object: {name}")]
    NoSolid { name: String },

    #[error("assertion failed: {detail}")]
    AssertionFailed { detail: String },

    #[error("oracle failure ({oracle}): {detail}")]
    OracleFailure { oracle: String, detail: String },

    #[error("kernel error: {0}")]
    Kernel(String),

    #[error("duplicate name: {name}")]
    DuplicateName { name: String },
}

impl From<brep_kernel::KernelError> for HarnessError {
    fn from(e: brep_kernel::KernelError) -> Self {
        HarnessError::Kernel(e.to_string())
    }
}

// ── Commands ────────────────────────────────────────────────────────────────

/// The creation command for an object kind.
pub fn create_command(kind: ObjectKind) -> Command {
    match kind {
        ObjectKind::BinBlank => Command::CreateBinBlank,
        ObjectKind::BinBase => Command::CreateBinBase,
        ObjectKind::SimpleStorageBin => Command::CreateSimpleStorageBin,
        ObjectKind::EcoBin => Command::CreateEcoBin,
        ObjectKind::PartsBin => Command::CreatePartsBin,
        ObjectKind::Baseplate => Command::CreateBaseplate,
        ObjectKind::MagnetBaseplate => Command::CreateMagnetBaseplate,
        ObjectKind::ScrewTogetherBaseplate => Command::CreateScrewTogetherBaseplate,
        ObjectKind::LBinBlank => Command::CreateLBinBlank,
        ObjectKind::CustomBin => Command::CreateCustomBin,
        ObjectKind::CustomBaseplate => Command::CreateCustomBaseplate,
    }
}

// ── Float Math ──────────────────────────────────────────────────────────────

/// Relative difference of `actual` from `expected`, falling back to the
/// absolute difference near zero.
pub fn relative_diff(actual: f64, expected: f64) -> f64 {
    let diff = (actual - expected).abs();
    if expected.abs() < 1e-12 {
        diff
    } else {
        diff / expected.abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_command_round_trips_kind() {
        for kind in ObjectKind::ALL {
            assert_eq!(create_command(kind).creates(), Some(kind));
        }
    }

    #[test]
    fn relative_diff_near_zero_is_absolute() {
        assert_eq!(relative_diff(0.5, 0.0), 0.5);
        assert!((relative_diff(101.0, 100.0) - 0.01).abs() < 1e-12);
    }
}
