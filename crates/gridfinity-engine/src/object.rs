use brep_kernel::ShapeHandle;
use gridfinity_types::SchemaVersion;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::migrate::current_version;
use crate::params::ParamSet;
use crate::preferences::PreferenceStore;
use crate::schema::install_all;
use crate::types::{Diagnostic, EngineError, ObjectKind};

/// One Gridfinity object in a document: its parameters and, after a
/// successful recompute, its solid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridfinityObject {
    pub id: Uuid,
    pub name: String,
    pub kind: ObjectKind,
    pub version: SchemaVersion,
    pub params: ParamSet,
    /// Never persisted; rebuilt by recompute.
    #[serde(skip)]
    pub shape: Option<ShapeHandle>,
    #[serde(skip)]
    pub diagnostics: Vec<Diagnostic>,
}

impl GridfinityObject {
    /// A new object of `kind` with every parameter seeded from `prefs`.
    pub fn new(kind: ObjectKind, prefs: &PreferenceStore) -> Result<Self, EngineError> {
        let mut params = ParamSet::new();
        install_all(kind, &mut params, prefs)?;
        Ok(Self {
            id: Uuid::new_v4(),
            name: kind.label().to_string(),
            kind,
            version: current_version(),
            params,
            shape: None,
            diagnostics: Vec::new(),
        })
    }

    /// Rebuilds an object from stored parts, as loaded from a file.
    pub fn restore(
        id: Uuid,
        name: String,
        kind: ObjectKind,
        version: SchemaVersion,
        params: ParamSet,
    ) -> Self {
        Self {
            id,
            name,
            kind,
            version,
            params,
            shape: None,
            diagnostics: Vec::new(),
        }
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == crate::types::Severity::Error)
    }
}
