//! Port abstraction for student persistence adapters and their errors.

use crate::domain::person::EmailAddress;
use crate::domain::student::{Student, StudentId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by student repository adapters.
    pub enum StudentPersistenceError {
        /// Store connection could not be established or checked out.
        Connection { message: String } => "student repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "student repository query failed: {message}",
        /// A unique constraint rejected the write.
        DuplicateRecord { message: String } => "student record conflicts with an existing row: {message}",
    }
}

/// Port for student record storage and retrieval.
///
/// Reads hydrate `registered_courses` from the enrollment join rows in
/// insertion order. Writes commit immediately.
#[cfg_attr(test, mockall::automock)]
pub trait StudentRepository {
    /// Insert a new student record.
    fn insert(&self, student: &Student) -> Result<(), StudentPersistenceError>;

    /// Fetch every student record.
    fn find_all(&self) -> Result<Vec<Student>, StudentPersistenceError>;

    /// Fetch a student by natural identifier.
    fn find_by_student_id(
        &self,
        student_id: &StudentId,
    ) -> Result<Option<Student>, StudentPersistenceError>;

    /// Fetch a student by exact display name.
    fn find_by_name(&self, name: &str) -> Result<Option<Student>, StudentPersistenceError>;

    /// Fetch a student by exact email address.
    fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Student>, StudentPersistenceError>;

    /// Fetch any student sharing the given natural id or email address
    /// (logical OR, case-sensitive). Used for duplicate detection before
    /// [`StudentRepository::insert`].
    fn find_conflict(
        &self,
        student_id: &StudentId,
        email: &EmailAddress,
    ) -> Result<Option<Student>, StudentPersistenceError>;

    /// Update the identity fields of the row keyed by the student's natural
    /// id.
    fn update(&self, student: &Student) -> Result<(), StudentPersistenceError>;

    /// Delete the row keyed by the given natural id, removing its join rows.
    fn delete(&self, student_id: &StudentId) -> Result<(), StudentPersistenceError>;

    /// All students whose name contains `term` or whose natural id equals
    /// `term` exactly. An empty result is a valid empty sequence.
    fn search(&self, term: &str) -> Result<Vec<Student>, StudentPersistenceError>;
}

/// Fixture implementation behaving as a permanently empty store.
///
/// Use it in unit tests where student persistence is not under test.
#[derive(Debug, Default)]
pub struct FixtureStudentRepository;

impl StudentRepository for FixtureStudentRepository {
    fn insert(&self, _student: &Student) -> Result<(), StudentPersistenceError> {
        Ok(())
    }

    fn find_all(&self) -> Result<Vec<Student>, StudentPersistenceError> {
        Ok(Vec::new())
    }

    fn find_by_student_id(
        &self,
        _student_id: &StudentId,
    ) -> Result<Option<Student>, StudentPersistenceError> {
        Ok(None)
    }

    fn find_by_name(&self, _name: &str) -> Result<Option<Student>, StudentPersistenceError> {
        Ok(None)
    }

    fn find_by_email(
        &self,
        _email: &EmailAddress,
    ) -> Result<Option<Student>, StudentPersistenceError> {
        Ok(None)
    }

    fn find_conflict(
        &self,
        _student_id: &StudentId,
        _email: &EmailAddress,
    ) -> Result<Option<Student>, StudentPersistenceError> {
        Ok(None)
    }

    fn update(&self, _student: &Student) -> Result<(), StudentPersistenceError> {
        Ok(())
    }

    fn delete(&self, _student_id: &StudentId) -> Result<(), StudentPersistenceError> {
        Ok(())
    }

    fn search(&self, _term: &str) -> Result<Vec<Student>, StudentPersistenceError> {
        Ok(Vec::new())
    }
}
