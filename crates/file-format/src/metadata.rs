use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Document metadata stored alongside the objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Human-readable document name.
    pub name: String,
    /// When the document was first created.
    pub created: DateTime<Utc>,
    /// When the document was last saved.
    pub modified: DateTime<Utc>,
}

impl DocumentMetadata {
    /// Create metadata with the given name and current timestamp.
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            created: now,
            modified: now,
        }
    }

    /// Stamp the modification time.
    pub fn touch(&mut self) {
        self.modified = Utc::now();
    }
}
