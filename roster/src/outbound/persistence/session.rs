//! Single-connection SQLite session for Diesel.
//!
//! The process is single-threaded and synchronous, so the persistence layer
//! owns exactly one connection shared by every adapter. `Session` wraps it
//! in a checkout handle: adapters borrow the connection for the duration of
//! one operation and must release it before the next begins.

use std::cell::{RefCell, RefMut};
use std::rc::Rc;

use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::debug;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// Errors that can occur while opening or borrowing the session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// The database connection could not be opened.
    #[error("failed to open database connection: {message}")]
    Connect {
        /// Underlying driver message.
        message: String,
    },

    /// Embedded migrations failed to apply.
    #[error("failed to run embedded migrations: {message}")]
    Migration {
        /// Underlying migration message.
        message: String,
    },

    /// The connection is already checked out.
    #[error("database session is already in use")]
    Busy,
}

impl SessionError {
    /// Create a connect error with the given message.
    pub fn connect(message: impl Into<String>) -> Self {
        Self::Connect {
            message: message.into(),
        }
    }

    /// Create a migration error with the given message.
    pub fn migration(message: impl Into<String>) -> Self {
        Self::Migration {
            message: message.into(),
        }
    }
}

/// Shared handle to the process-wide SQLite connection.
///
/// Cloning the handle shares the same underlying connection; the handle is
/// deliberately not `Send`, matching the single-writer resource model.
#[derive(Clone)]
pub struct Session {
    conn: Rc<RefCell<SqliteConnection>>,
}

impl Session {
    /// Open (creating if needed) the database at `database_url`, enable
    /// foreign keys, and apply pending embedded migrations.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Connect`] when the file cannot be opened and
    /// [`SessionError::Migration`] when the schema cannot be brought up to
    /// date.
    pub fn establish(database_url: &str) -> Result<Self, SessionError> {
        let mut conn = SqliteConnection::establish(database_url)
            .map_err(|error| SessionError::connect(error.to_string()))?;
        diesel::sql_query("PRAGMA foreign_keys = ON")
            .execute(&mut conn)
            .map_err(|error| SessionError::connect(error.to_string()))?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|error| SessionError::migration(error.to_string()))?;
        if !applied.is_empty() {
            debug!(count = applied.len(), "applied pending migrations");
        }
        Ok(Self {
            conn: Rc::new(RefCell::new(conn)),
        })
    }

    /// Open a fresh in-memory database with the full schema applied.
    ///
    /// # Errors
    ///
    /// As [`Session::establish`].
    pub fn in_memory() -> Result<Self, SessionError> {
        Self::establish(":memory:")
    }

    /// Borrow the connection for one operation.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Busy`] when the connection is already
    /// checked out, which indicates a re-entrant adapter call.
    pub fn connection(&self) -> Result<RefMut<'_, SqliteConnection>, SessionError> {
        self.conn.try_borrow_mut().map_err(|_| SessionError::Busy)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn in_memory_session_applies_schema() {
        let session = Session::in_memory().expect("session should establish");
        let mut conn = session.connection().expect("connection should check out");

        // The students table exists once migrations ran.
        let count: i64 = super::super::schema::students::table
            .count()
            .get_result(&mut *conn)
            .expect("count should run against the migrated schema");
        assert_eq!(count, 0);
    }

    #[rstest]
    fn concurrent_checkout_reports_busy() {
        let session = Session::in_memory().expect("session should establish");
        let _held = session.connection().expect("first checkout should succeed");

        let second = session.connection();
        assert!(matches!(second, Err(SessionError::Busy)));
    }

    #[rstest]
    fn error_constructors_preserve_messages() {
        assert!(
            SessionError::connect("no such directory")
                .to_string()
                .contains("no such directory")
        );
        assert!(
            SessionError::migration("bad schema")
                .to_string()
                .contains("bad schema")
        );
    }
}
