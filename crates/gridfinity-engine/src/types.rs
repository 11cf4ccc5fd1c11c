use serde::{Deserialize, Serialize};
use uuid::Uuid;

use brep_kernel::KernelError;
use gridfinity_ops::OpError;

use crate::params::ParamError;
use crate::preferences::PreferenceError;

/// Every object type the engine can build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    BinBlank,
    BinBase,
    SimpleStorageBin,
    EcoBin,
    PartsBin,
    Baseplate,
    MagnetBaseplate,
    ScrewTogetherBaseplate,
    LBinBlank,
    CustomBin,
    CustomBaseplate,
}

impl ObjectKind {
    pub const ALL: [ObjectKind; 11] = [
        ObjectKind::BinBlank,
        ObjectKind::BinBase,
        ObjectKind::SimpleStorageBin,
        ObjectKind::EcoBin,
        ObjectKind::PartsBin,
        ObjectKind::Baseplate,
        ObjectKind::MagnetBaseplate,
        ObjectKind::ScrewTogetherBaseplate,
        ObjectKind::LBinBlank,
        ObjectKind::CustomBin,
        ObjectKind::CustomBaseplate,
    ];

    /// Default label for new objects.
    pub fn label(&self) -> &'static str {
        match self {
            ObjectKind::BinBlank => "BinBlank",
            ObjectKind::BinBase => "BinBase",
            ObjectKind::SimpleStorageBin => "SimpleStorageBin",
            ObjectKind::EcoBin => "EcoBin",
            ObjectKind::PartsBin => "PartsBin",
            ObjectKind::Baseplate => "Baseplate",
            ObjectKind::MagnetBaseplate => "MagnetBaseplate",
            ObjectKind::ScrewTogetherBaseplate => "ScrewTogetherBaseplate",
            ObjectKind::LBinBlank => "LBinBlank",
            ObjectKind::CustomBin => "CustomBin",
            ObjectKind::CustomBaseplate => "CustomBaseplate",
        }
    }

    pub fn is_baseplate(&self) -> bool {
        matches!(
            self,
            ObjectKind::Baseplate
                | ObjectKind::MagnetBaseplate
                | ObjectKind::ScrewTogetherBaseplate
                | ObjectKind::CustomBaseplate
        )
    }
}

/// Where the finished solid is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationLocation {
    PositiveFromOrigin,
    CenteredAtOrigin,
}

impl GenerationLocation {
    pub const NAMES: [&'static str; 2] = ["Positive from origin", "Centered at Origin"];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Positive from origin" => Some(GenerationLocation::PositiveFromOrigin),
            "Centered at Origin" => Some(GenerationLocation::CenteredAtOrigin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Warning,
    Error,
}

/// A message attached to an object by its last recompute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

impl Diagnostic {
    pub fn warning(message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

/// Errors from the engine.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EngineError {
    #[error("invalid geometry: {reason}")]
    InvalidGeometry { reason: String },

    #[error("copy_and_translate needs at least one translation vector")]
    EmptyVectorList,

    #[error("multi_fuse needs at least one shape")]
    EmptyShapeList,

    #[error("unknown value '{value}' for {name}")]
    UnknownEnumValue { name: String, value: String },

    #[error("kernel failure: {0}")]
    KernelFailure(#[from] KernelError),

    #[error("missing preference: {key}")]
    MissingPreference { key: String },

    #[error("preference error: {0}")]
    Preference(PreferenceError),

    #[error("object not found: {id}")]
    ObjectNotFound { id: Uuid },

    #[error("parameter error: {0}")]
    Parameter(ParamError),

    #[error("expression for {name} failed: {reason}")]
    Expression { name: String, reason: String },
}

impl EngineError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        EngineError::InvalidGeometry {
            reason: reason.into(),
        }
    }

    /// Errors that are also recorded on the object they came from.
    pub fn is_diagnostic(&self) -> bool {
        matches!(
            self,
            EngineError::InvalidGeometry { .. } | EngineError::UnknownEnumValue { .. }
        )
    }
}

impl From<OpError> for EngineError {
    fn from(e: OpError) -> Self {
        match e {
            OpError::Kernel(k) => EngineError::KernelFailure(k),
            OpError::InvalidGeometry { reason } => EngineError::InvalidGeometry { reason },
            OpError::EmptyVectorList => EngineError::EmptyVectorList,
            OpError::EmptyShapeList => EngineError::EmptyShapeList,
        }
    }
}

impl From<ParamError> for EngineError {
    fn from(e: ParamError) -> Self {
        match e {
            ParamError::UnknownEnumValue { name, value } => {
                EngineError::UnknownEnumValue { name, value }
            }
            other => EngineError::Parameter(other),
        }
    }
}

impl From<PreferenceError> for EngineError {
    fn from(e: PreferenceError) -> Self {
        match e {
            PreferenceError::Missing { key } => EngineError::MissingPreference { key },
            other => EngineError::Preference(other),
        }
    }
}
