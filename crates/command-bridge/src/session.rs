use brep_kernel::KernelIntrospect;
use file_format::DocumentMetadata;
use gridfinity_engine::{Document, GridfinityObject};
use gridfinity_ops::KernelBundle;

use crate::messages::ObjectSummary;

/// The document session commands run against.
///
/// Holds at most one open document and its file metadata.
#[derive(Debug, Default)]
pub struct Session {
    document: Option<Document>,
    metadata: Option<DocumentMetadata>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.document.is_some()
    }

    /// Open a fresh document, replacing any open one.
    pub fn open(&mut self, name: impl Into<String>) -> &mut Document {
        let name = name.into();
        self.metadata = Some(DocumentMetadata::new(name.clone()));
        self.document.insert(Document::new(name))
    }

    /// Install a loaded document with its stored metadata.
    pub fn install(&mut self, document: Document, metadata: DocumentMetadata) -> &mut Document {
        self.metadata = Some(metadata);
        self.document.insert(document)
    }

    pub fn close(&mut self) -> Result<Document, BridgeError> {
        self.metadata = None;
        self.document.take().ok_or(BridgeError::NoDocument)
    }

    pub fn document(&self) -> Result<&Document, BridgeError> {
        self.document.as_ref().ok_or(BridgeError::NoDocument)
    }

    pub fn document_mut(&mut self) -> Result<&mut Document, BridgeError> {
        self.document.as_mut().ok_or(BridgeError::NoDocument)
    }

    /// Document and metadata together, with the modification time stamped.
    pub fn for_save(&mut self) -> Result<(&Document, &DocumentMetadata), BridgeError> {
        let doc = self.document.as_ref().ok_or(BridgeError::NoDocument)?;
        let meta = self
            .metadata
            .get_or_insert_with(|| DocumentMetadata::new(doc.name.clone()));
        meta.touch();
        Ok((doc, meta))
    }
}

/// Summarize an object, measuring its solid if it has one.
pub fn summarize(object: &GridfinityObject, kb: &dyn KernelBundle) -> ObjectSummary {
    ObjectSummary {
        id: object.id,
        name: object.name.clone(),
        kind: object.kind,
        volume: object.shape.and_then(|s| kb.volume(&s).ok()),
        diagnostics: object.diagnostics.clone(),
    }
}

/// Errors from the command layer.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BridgeError {
    #[error("no document is open")]
    NoDocument,

    #[error("engine error: {0}")]
    Engine(#[from] gridfinity_engine::EngineError),

    #[error("load error: {0}")]
    Load(#[from] file_format::LoadError),

    #[error("save error: {0}")]
    Save(#[from] file_format::SaveError),

    #[error("object {id} failed to build: {source}")]
    ObjectFailed {
        id: uuid::Uuid,
        #[source]
        source: gridfinity_engine::EngineError,
    },

    #[error("unsupported command: {command}")]
    Unsupported { command: String },
}
