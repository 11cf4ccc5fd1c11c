use gridfinity_engine::migrate::current_version;
use gridfinity_engine::{Document, GridfinityObject};
use gridfinity_types::SchemaVersion;
use serde::Serialize;

use crate::errors::SaveError;
use crate::metadata::DocumentMetadata;

/// Format identifier written to every file.
pub const FORMAT_ID: &str = "gridfinity";

/// The top-level file structure. Geometry is never stored; objects are
/// rebuilt from their parameters on load.
#[derive(Debug, Clone, Serialize)]
pub struct GridfinityFile<'a> {
    /// Format identifier.
    pub format: &'static str,
    /// Schema version of the library that wrote the file.
    pub version: SchemaVersion,
    pub document: &'a DocumentMetadata,
    pub objects: &'a [GridfinityObject],
}

/// Serialize a document to a pretty-printed JSON string.
pub fn save_document(doc: &Document, metadata: &DocumentMetadata) -> Result<String, SaveError> {
    let file = GridfinityFile {
        format: FORMAT_ID,
        version: current_version(),
        document: metadata,
        objects: doc.objects(),
    };
    serde_json::to_string_pretty(&file).map_err(|e| SaveError::Serialize(e.to_string()))
}
