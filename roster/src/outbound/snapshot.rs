//! Flat-JSON document store.
//!
//! One deployment variant persists the whole roster as a single JSON file
//! instead of the relational store. Loading distinguishes a missing file
//! from corrupt content instead of silently falling back to empty state.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::domain::snapshot::RosterSnapshot;

/// Errors raised while loading a snapshot document.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotLoadError {
    /// The snapshot file does not exist.
    #[error("snapshot file {path} does not exist")]
    Missing {
        /// Path that was probed.
        path: PathBuf,
    },

    /// The file exists but its content is not a valid snapshot document.
    #[error("snapshot file {path} holds corrupt content: {message}")]
    Corrupt {
        /// Path that was read.
        path: PathBuf,
        /// Parser or validation message.
        message: String,
    },

    /// The file could not be read for another reason.
    #[error("failed to read snapshot file {path}: {message}")]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O message.
        message: String,
    },
}

/// Errors raised while saving a snapshot document.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotSaveError {
    /// The snapshot could not be serialised.
    #[error("failed to serialise snapshot: {message}")]
    Serialize {
        /// Serialiser message.
        message: String,
    },

    /// The file could not be written.
    #[error("failed to write snapshot file {path}: {message}")]
    Io {
        /// Path that was written.
        path: PathBuf,
        /// Underlying I/O message.
        message: String,
    },
}

/// File-backed store for [`RosterSnapshot`] documents.
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    /// Create a store over the given file path. Nothing is read or written
    /// until [`SnapshotStore::load`] or [`SnapshotStore::save`] is called.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and validate the snapshot document.
    ///
    /// # Errors
    ///
    /// [`SnapshotLoadError::Missing`] when the file is absent,
    /// [`SnapshotLoadError::Corrupt`] when its content does not parse or
    /// fails entity validation, [`SnapshotLoadError::Io`] otherwise.
    pub fn load(&self) -> Result<RosterSnapshot, SnapshotLoadError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                return Err(SnapshotLoadError::Missing {
                    path: self.path.clone(),
                });
            }
            Err(error) => {
                return Err(SnapshotLoadError::Io {
                    path: self.path.clone(),
                    message: error.to_string(),
                });
            }
        };

        serde_json::from_str(&contents).map_err(|error| {
            warn!(path = %self.path.display(), %error, "snapshot content is corrupt");
            SnapshotLoadError::Corrupt {
                path: self.path.clone(),
                message: error.to_string(),
            }
        })
    }

    /// As [`SnapshotStore::load`], but a missing file yields an empty
    /// snapshot. Corrupt content still fails.
    ///
    /// # Errors
    ///
    /// [`SnapshotLoadError::Corrupt`] or [`SnapshotLoadError::Io`] as for
    /// [`SnapshotStore::load`].
    pub fn load_or_default(&self) -> Result<RosterSnapshot, SnapshotLoadError> {
        match self.load() {
            Ok(snapshot) => Ok(snapshot),
            Err(SnapshotLoadError::Missing { .. }) => Ok(RosterSnapshot::new()),
            Err(error) => Err(error),
        }
    }

    /// Serialise and write the snapshot document, replacing the file.
    ///
    /// # Errors
    ///
    /// [`SnapshotSaveError::Serialize`] or [`SnapshotSaveError::Io`].
    pub fn save(&self, snapshot: &RosterSnapshot) -> Result<(), SnapshotSaveError> {
        let payload =
            serde_json::to_string_pretty(snapshot).map_err(|error| {
                SnapshotSaveError::Serialize {
                    message: error.to_string(),
                }
            })?;
        fs::write(&self.path, payload).map_err(|error| SnapshotSaveError::Io {
            path: self.path.clone(),
            message: error.to_string(),
        })?;
        debug!(
            path = %self.path.display(),
            records = snapshot.record_count(),
            "snapshot saved"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::rstest;

    use super::*;
    use crate::domain::student::Student;

    fn store_in(dir: &tempfile::TempDir) -> SnapshotStore {
        SnapshotStore::new(dir.path().join("data.json"))
    }

    #[rstest]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().expect("temp dir should create");
        let store = store_in(&dir);
        let snapshot = RosterSnapshot {
            students: vec![
                Student::try_from_fields("Alice", 20, "alice@x.com", "S1")
                    .expect("student should validate"),
            ],
            instructors: Vec::new(),
            courses: Vec::new(),
        };

        store.save(&snapshot).expect("save should succeed");
        let loaded = store.load().expect("load should succeed");

        assert_eq!(loaded, snapshot);
    }

    #[rstest]
    fn missing_file_is_distinguishable() {
        let dir = tempfile::tempdir().expect("temp dir should create");
        let store = store_in(&dir);

        let error = store.load().expect_err("missing file should fail");
        assert!(matches!(error, SnapshotLoadError::Missing { .. }));

        let defaulted = store
            .load_or_default()
            .expect("missing file should default");
        assert!(defaulted.is_empty());
    }

    #[rstest]
    #[case::not_json("definitely not json")]
    #[case::wrong_shape(r#"{"students": 3}"#)]
    #[case::invalid_entity(
        r#"{"students":[{"name":"","age":20,"email":"a@x.com","student_id":"S1","registered_courses":[]}],"instructors":[],"courses":[]}"#
    )]
    fn corrupt_content_is_distinguishable(#[case] contents: &str) {
        let dir = tempfile::tempdir().expect("temp dir should create");
        let store = store_in(&dir);
        std::fs::write(store.path(), contents).expect("write should succeed");

        let error = store.load().expect_err("corrupt content should fail");
        assert!(matches!(error, SnapshotLoadError::Corrupt { .. }));

        let defaulted = store.load_or_default();
        assert!(defaulted.is_err());
    }
}
