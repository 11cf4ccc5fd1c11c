use gridfinity_engine::{Diagnostic, ObjectKind};
use gridfinity_types::ParamValue;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Commands from a host application to the engine.
/// Serialized as JSON with a `type` tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Command {
    // -- Object creation (needs an open document) --
    CreateBinBlank,
    CreateBinBase,
    CreateSimpleStorageBin,
    CreateEcoBin,
    CreatePartsBin,
    CreateBaseplate,
    CreateMagnetBaseplate,
    CreateScrewTogetherBaseplate,
    CreateLBinBlank,
    CreateCustomBin,
    CreateCustomBaseplate,

    // -- Object editing --
    /// Set one parameter and rebuild its object.
    SetParameter {
        object_id: Uuid,
        name: String,
        value: ParamValue,
    },
    /// Bind a parameter to an expression and rebuild its object.
    SetExpression {
        object_id: Uuid,
        name: String,
        expression: String,
    },
    DeleteObject {
        object_id: Uuid,
    },
    /// Rebuild one object, or every object when `object_id` is absent.
    Recompute {
        #[serde(default)]
        object_id: Option<Uuid>,
    },

    // -- Document --
    OpenDocument {
        name: String,
    },
    CloseDocument,
    SaveDocument,
    LoadDocument {
        data: String,
    },
}

impl Command {
    /// Object kind a creation command instantiates.
    pub fn creates(&self) -> Option<ObjectKind> {
        let kind = match self {
            Command::CreateBinBlank => ObjectKind::BinBlank,
            Command::CreateBinBase => ObjectKind::BinBase,
            Command::CreateSimpleStorageBin => ObjectKind::SimpleStorageBin,
            Command::CreateEcoBin => ObjectKind::EcoBin,
            Command::CreatePartsBin => ObjectKind::PartsBin,
            Command::CreateBaseplate => ObjectKind::Baseplate,
            Command::CreateMagnetBaseplate => ObjectKind::MagnetBaseplate,
            Command::CreateScrewTogetherBaseplate => ObjectKind::ScrewTogetherBaseplate,
            Command::CreateLBinBlank => ObjectKind::LBinBlank,
            Command::CreateCustomBin => ObjectKind::CustomBin,
            Command::CreateCustomBaseplate => ObjectKind::CustomBaseplate,
            _ => return None,
        };
        Some(kind)
    }

    /// Whether the command only makes sense with a document open.
    pub fn needs_document(&self) -> bool {
        !matches!(self, Command::OpenDocument { .. } | Command::LoadDocument { .. })
    }
}

/// Snapshot of one object after a rebuild.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSummary {
    pub id: Uuid,
    pub name: String,
    pub kind: ObjectKind,
    /// Solid volume, absent when the last rebuild failed.
    pub volume: Option<f64>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Responses from the engine to the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Response {
    DocumentOpened {
        name: String,
    },
    DocumentClosed,

    /// A new object was created and built.
    ObjectCreated {
        object: ObjectSummary,
    },
    ObjectUpdated {
        object: ObjectSummary,
    },
    ObjectDeleted {
        object_id: Uuid,
    },
    Recomputed {
        objects: Vec<ObjectSummary>,
    },

    /// Save is ready.
    SaveReady {
        json_data: String,
    },
    DocumentLoaded {
        name: String,
        objects: Vec<ObjectSummary>,
    },

    /// A command failed.
    Error {
        message: String,
        object_id: Option<Uuid>,
    },
}
