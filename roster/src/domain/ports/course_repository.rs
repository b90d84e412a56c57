//! Port abstraction for course persistence adapters and their errors.

use crate::domain::course::{Course, CourseId};
use crate::domain::instructor::InstructorId;

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by course repository adapters.
    pub enum CoursePersistenceError {
        /// Store connection could not be established or checked out.
        Connection { message: String } => "course repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "course repository query failed: {message}",
        /// A unique constraint rejected the write.
        DuplicateRecord { message: String } => "course record conflicts with an existing row: {message}",
        /// The referenced instructor row does not exist.
        MissingInstructor { instructor_id: String } => "instructor {instructor_id} does not exist",
    }
}

/// Port for course record storage and retrieval.
///
/// Reads hydrate `enrolled_students` from the enrollment join rows in
/// insertion order and resolve the instructor reference to its natural id.
/// Duplicate detection for courses is on the course id only; name
/// collisions are permitted.
#[cfg_attr(test, mockall::automock)]
pub trait CourseRepository {
    /// Insert a new course record, resolving its optional instructor
    /// reference.
    fn insert(&self, course: &Course) -> Result<(), CoursePersistenceError>;

    /// Fetch every course record.
    fn find_all(&self) -> Result<Vec<Course>, CoursePersistenceError>;

    /// Fetch a course by natural identifier.
    fn find_by_course_id(
        &self,
        course_id: &CourseId,
    ) -> Result<Option<Course>, CoursePersistenceError>;

    /// Fetch a course by exact title.
    fn find_by_name(&self, name: &str) -> Result<Option<Course>, CoursePersistenceError>;

    /// Update the title and instructor reference of the row keyed by the
    /// course's natural id.
    fn update(&self, course: &Course) -> Result<(), CoursePersistenceError>;

    /// Delete the row keyed by the given natural id, removing its join
    /// rows.
    fn delete(&self, course_id: &CourseId) -> Result<(), CoursePersistenceError>;

    /// All courses whose title contains `term` or whose natural id equals
    /// `term` exactly.
    fn search(&self, term: &str) -> Result<Vec<Course>, CoursePersistenceError>;

    /// Set or replace the instructor reference on an existing course.
    fn assign_instructor<'a>(
        &self,
        course_id: &CourseId,
        instructor_id: Option<&'a InstructorId>,
    ) -> Result<(), CoursePersistenceError>;
}

/// Fixture implementation behaving as a permanently empty store.
#[derive(Debug, Default)]
pub struct FixtureCourseRepository;

impl CourseRepository for FixtureCourseRepository {
    fn insert(&self, _course: &Course) -> Result<(), CoursePersistenceError> {
        Ok(())
    }

    fn find_all(&self) -> Result<Vec<Course>, CoursePersistenceError> {
        Ok(Vec::new())
    }

    fn find_by_course_id(
        &self,
        _course_id: &CourseId,
    ) -> Result<Option<Course>, CoursePersistenceError> {
        Ok(None)
    }

    fn find_by_name(&self, _name: &str) -> Result<Option<Course>, CoursePersistenceError> {
        Ok(None)
    }

    fn update(&self, _course: &Course) -> Result<(), CoursePersistenceError> {
        Ok(())
    }

    fn delete(&self, _course_id: &CourseId) -> Result<(), CoursePersistenceError> {
        Ok(())
    }

    fn search(&self, _term: &str) -> Result<Vec<Course>, CoursePersistenceError> {
        Ok(Vec::new())
    }

    fn assign_instructor<'a>(
        &self,
        _course_id: &CourseId,
        _instructor_id: Option<&'a InstructorId>,
    ) -> Result<(), CoursePersistenceError> {
        Ok(())
    }
}
