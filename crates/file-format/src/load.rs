use gridfinity_engine::migrate::current_version;
use gridfinity_engine::{Document, GridfinityObject};
use gridfinity_types::SchemaVersion;
use serde::Deserialize;

use crate::errors::LoadError;
use crate::metadata::DocumentMetadata;
use crate::migrate::migrate_objects;
use crate::save::FORMAT_ID;

/// The top-level file structure for deserialization.
#[derive(Debug, Clone, Deserialize)]
pub struct GridfinityFileRaw {
    pub format: String,
    pub version: SchemaVersion,
    pub document: DocumentMetadata,
    #[serde(default)]
    pub objects: Vec<GridfinityObject>,
}

/// Deserialize a document from a JSON string.
///
/// Validates the format identifier and version and migrates older objects.
/// Solids are not built; recompute the returned document to get them.
pub fn load_document(json: &str) -> Result<(Document, DocumentMetadata), LoadError> {
    let raw: GridfinityFileRaw =
        serde_json::from_str(json).map_err(|e| LoadError::ParseError(e.to_string()))?;

    if raw.format != FORMAT_ID {
        return Err(LoadError::UnknownFormat(raw.format));
    }

    let supported = current_version();
    if raw.version > supported {
        return Err(LoadError::FutureVersion {
            file_version: raw.version.to_string(),
            supported_version: supported.to_string(),
        });
    }

    let mut objects = raw.objects;
    migrate_objects(&mut objects)?;

    let mut doc = Document::new(raw.document.name.clone());
    for object in objects {
        doc.insert_object(object);
    }
    Ok((doc, raw.document))
}
