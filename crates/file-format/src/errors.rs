use uuid::Uuid;

/// Errors during document loading.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LoadError {
    #[error("failed to parse file: {0}")]
    ParseError(String),

    #[error("unknown file format: {0}")]
    UnknownFormat(String),

    #[error("file version {file_version} is newer than supported version {supported_version}")]
    FutureVersion {
        file_version: String,
        supported_version: String,
    },

    #[error("migration of object {id} failed: {reason}")]
    MigrationFailed { id: Uuid, reason: String },
}

/// Errors during document saving.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SaveError {
    #[error("failed to serialize document: {0}")]
    Serialize(String),
}
