//! SQLite-backed `EnrollmentRepository` implementation using Diesel ORM.
//!
//! The join table stores row keys; this adapter resolves natural ids on the
//! way in and back out. The (student, course) pair is checked before
//! insertion so the port reports `AlreadyEnrolled` instead of a bare
//! constraint violation.

use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::domain::course::CourseId;
use crate::domain::enrollment::Enrollment;
use crate::domain::ports::{EnrollmentPersistenceError, EnrollmentRepository};
use crate::domain::student::StudentId;

use super::error_mapping::{map_diesel_error, map_session_error};
use super::models::NewEnrollmentRow;
use super::schema::{courses, student_course, students};
use super::session::{Session, SessionError};

/// Diesel-backed implementation of the `EnrollmentRepository` port.
#[derive(Clone)]
pub struct DieselEnrollmentRepository {
    session: Session,
}

impl DieselEnrollmentRepository {
    /// Create a new repository over the shared session.
    pub const fn new(session: Session) -> Self {
        Self { session }
    }
}

/// Map session checkout errors to enrollment persistence errors.
fn map_session(error: SessionError) -> EnrollmentPersistenceError {
    map_session_error(error, EnrollmentPersistenceError::connection)
}

/// Map Diesel errors to enrollment persistence errors.
fn map_error(error: diesel::result::Error) -> EnrollmentPersistenceError {
    map_diesel_error(
        error,
        EnrollmentPersistenceError::query,
        EnrollmentPersistenceError::connection,
        EnrollmentPersistenceError::query,
    )
}

/// Row keys for both sides of the pair, if both exist.
fn participant_row_ids(
    conn: &mut SqliteConnection,
    student_id: &StudentId,
    course_id: &CourseId,
) -> Result<(Option<i32>, Option<i32>), EnrollmentPersistenceError> {
    let student_row: Option<i32> = students::table
        .filter(students::student_id.eq(student_id.as_ref()))
        .select(students::id)
        .first(&mut *conn)
        .optional()
        .map_err(map_error)?;
    let course_row: Option<i32> = courses::table
        .filter(courses::course_id.eq(course_id.as_ref()))
        .select(courses::id)
        .first(&mut *conn)
        .optional()
        .map_err(map_error)?;
    Ok((student_row, course_row))
}

impl EnrollmentRepository for DieselEnrollmentRepository {
    fn enroll(
        &self,
        student_id: &StudentId,
        course_id: &CourseId,
    ) -> Result<(), EnrollmentPersistenceError> {
        let mut conn = self.session.connection().map_err(map_session)?;
        let (student_row, course_row) = participant_row_ids(&mut conn, student_id, course_id)?;
        let student_row = student_row.ok_or_else(|| {
            EnrollmentPersistenceError::missing_participant(format!(
                "student {student_id} does not exist"
            ))
        })?;
        let course_row = course_row.ok_or_else(|| {
            EnrollmentPersistenceError::missing_participant(format!(
                "course {course_id} does not exist"
            ))
        })?;

        let existing: Option<i32> = student_course::table
            .filter(
                student_course::student_id
                    .eq(student_row)
                    .and(student_course::course_id.eq(course_row)),
            )
            .select(student_course::id)
            .first(&mut *conn)
            .optional()
            .map_err(map_error)?;
        if existing.is_some() {
            return Err(EnrollmentPersistenceError::already_enrolled(
                student_id.as_ref(),
                course_id.as_ref(),
            ));
        }

        let new_row = NewEnrollmentRow {
            student_id: student_row,
            course_id: course_row,
        };
        diesel::insert_into(student_course::table)
            .values(&new_row)
            .execute(&mut *conn)
            .map(|_| ())
            .map_err(|error| {
                // The unique pair index can still fire; report it as the
                // port-level duplicate.
                if matches!(
                    error,
                    diesel::result::Error::DatabaseError(
                        diesel::result::DatabaseErrorKind::UniqueViolation,
                        _,
                    )
                ) {
                    EnrollmentPersistenceError::already_enrolled(
                        student_id.as_ref(),
                        course_id.as_ref(),
                    )
                } else {
                    map_error(error)
                }
            })
    }

    fn is_enrolled(
        &self,
        student_id: &StudentId,
        course_id: &CourseId,
    ) -> Result<bool, EnrollmentPersistenceError> {
        let mut conn = self.session.connection().map_err(map_session)?;
        let (student_row, course_row) = participant_row_ids(&mut conn, student_id, course_id)?;
        let (Some(student_row), Some(course_row)) = (student_row, course_row) else {
            return Ok(false);
        };

        let existing: Option<i32> = student_course::table
            .filter(
                student_course::student_id
                    .eq(student_row)
                    .and(student_course::course_id.eq(course_row)),
            )
            .select(student_course::id)
            .first(&mut *conn)
            .optional()
            .map_err(map_error)?;
        Ok(existing.is_some())
    }

    fn find_all(&self) -> Result<Vec<Enrollment>, EnrollmentPersistenceError> {
        let mut conn = self.session.connection().map_err(map_session)?;
        let pairs: Vec<(String, String)> = student_course::table
            .inner_join(students::table)
            .inner_join(courses::table)
            .order(student_course::id.asc())
            .select((students::student_id, courses::course_id))
            .load(&mut *conn)
            .map_err(map_error)?;

        pairs
            .into_iter()
            .map(|(student_id, course_id)| {
                let student_id = StudentId::new(student_id).map_err(|error| {
                    EnrollmentPersistenceError::query(format!(
                        "stored enrollment failed validation: {error}"
                    ))
                })?;
                let course_id = CourseId::new(course_id).map_err(|error| {
                    EnrollmentPersistenceError::query(format!(
                        "stored enrollment failed validation: {error}"
                    ))
                })?;
                Ok(Enrollment::new(student_id, course_id))
            })
            .collect()
    }
}
