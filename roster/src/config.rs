//! Runtime settings loaded via OrthoConfig.
//!
//! The core defines no CLI flags of its own; shells pass their argument
//! vector through and OrthoConfig layers CLI, environment (`ROSTER_*`),
//! and configuration-file values.

use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_DATABASE_PATH: &str = "roster.db";
const DEFAULT_SNAPSHOT_PATH: &str = "data.json";

/// Configuration values for the backing stores.
#[derive(Debug, Clone, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "ROSTER")]
pub struct RosterSettings {
    /// SQLite database file path.
    pub database_path: Option<PathBuf>,
    /// Flat-JSON snapshot file path.
    pub snapshot_path: Option<PathBuf>,
}

impl RosterSettings {
    /// Return the configured database path, falling back to the default.
    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH))
    }

    /// Return the configured snapshot path, falling back to the default.
    pub fn snapshot_path(&self) -> PathBuf {
        self.snapshot_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SNAPSHOT_PATH))
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for configuration parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    fn load_from_empty_args() -> RosterSettings {
        RosterSettings::load_from_iter([OsString::from("roster")]).expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env([
            ("ROSTER_DATABASE_PATH", None::<String>),
            ("ROSTER_SNAPSHOT_PATH", None::<String>),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.database_path(), PathBuf::from("roster.db"));
        assert_eq!(settings.snapshot_path(), PathBuf::from("data.json"));
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("ROSTER_DATABASE_PATH", Some("/tmp/campus.db".to_owned())),
            ("ROSTER_SNAPSHOT_PATH", Some("/tmp/campus.json".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.database_path(), PathBuf::from("/tmp/campus.db"));
        assert_eq!(settings.snapshot_path(), PathBuf::from("/tmp/campus.json"));
    }
}
