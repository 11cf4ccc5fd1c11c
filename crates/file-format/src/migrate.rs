use gridfinity_engine::migrate::{current_version, migrate};
use gridfinity_engine::GridfinityObject;

use crate::errors::LoadError;

/// Bring every loaded object up to the library's schema version.
///
/// Objects newer than the library are rejected rather than guessed at.
/// Returns how many objects needed migration.
pub fn migrate_objects(objects: &mut [GridfinityObject]) -> Result<usize, LoadError> {
    let current = current_version();
    let mut migrated = 0;
    for object in objects.iter_mut() {
        if object.version > current {
            return Err(LoadError::FutureVersion {
                file_version: object.version.to_string(),
                supported_version: current.to_string(),
            });
        }
        let steps = migrate(object).map_err(|e| LoadError::MigrationFailed {
            id: object.id,
            reason: e.to_string(),
        })?;
        if !steps.is_empty() {
            migrated += 1;
        }
    }
    Ok(migrated)
}
