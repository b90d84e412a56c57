//! SQLite-backed `InstructorRepository` implementation using Diesel ORM.
//!
//! Reads rebuild the assignment list from the courses that reference the
//! instructor; deletes clear that reference before removing the row.

use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::domain::course::CourseId;
use crate::domain::instructor::{Instructor, InstructorId};
use crate::domain::person::{EmailAddress, Person};
use crate::domain::ports::{InstructorPersistenceError, InstructorRepository};

use super::error_mapping::{map_diesel_error, map_session_error};
use super::models::{InstructorRow, InstructorRowChanges, NewInstructorRow};
use super::schema::{courses, instructors};
use super::session::{Session, SessionError};

/// Diesel-backed implementation of the `InstructorRepository` port.
#[derive(Clone)]
pub struct DieselInstructorRepository {
    session: Session,
}

impl DieselInstructorRepository {
    /// Create a new repository over the shared session.
    pub const fn new(session: Session) -> Self {
        Self { session }
    }
}

/// Map session checkout errors to instructor persistence errors.
fn map_session(error: SessionError) -> InstructorPersistenceError {
    map_session_error(error, InstructorPersistenceError::connection)
}

/// Map Diesel errors to instructor persistence errors.
fn map_error(error: diesel::result::Error) -> InstructorPersistenceError {
    map_diesel_error(
        error,
        InstructorPersistenceError::query,
        InstructorPersistenceError::connection,
        InstructorPersistenceError::duplicate_record,
    )
}

/// Course ids taught by the instructor row, in course-row order.
fn assigned_course_ids(
    conn: &mut SqliteConnection,
    instructor_row_id: i32,
) -> Result<Vec<String>, InstructorPersistenceError> {
    courses::table
        .filter(courses::instructor_id.eq(instructor_row_id))
        .order(courses::id.asc())
        .select(courses::course_id)
        .load::<String>(conn)
        .map_err(map_error)
}

/// Convert a database row to a domain instructor.
fn row_to_instructor(
    conn: &mut SqliteConnection,
    row: InstructorRow,
) -> Result<Instructor, InstructorPersistenceError> {
    let course_ids = assigned_course_ids(conn, row.id)?;
    let person = Person::try_from_fields(row.name, row.age, row.email).map_err(|error| {
        InstructorPersistenceError::query(format!("stored instructor failed validation: {error}"))
    })?;
    let instructor_id = InstructorId::new(row.instructor_id).map_err(|error| {
        InstructorPersistenceError::query(format!("stored instructor failed validation: {error}"))
    })?;
    let assigned_courses = course_ids
        .into_iter()
        .map(CourseId::new)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|error| {
            InstructorPersistenceError::query(format!(
                "stored assignment failed validation: {error}"
            ))
        })?;
    Ok(Instructor::with_assigned_courses(
        person,
        instructor_id,
        assigned_courses,
    ))
}

impl InstructorRepository for DieselInstructorRepository {
    fn insert(&self, instructor: &Instructor) -> Result<(), InstructorPersistenceError> {
        let mut conn = self.session.connection().map_err(map_session)?;
        let new_row = NewInstructorRow {
            name: instructor.person().name().as_ref(),
            age: instructor.person().age().value(),
            email: instructor.person().email().as_ref(),
            instructor_id: instructor.instructor_id().as_ref(),
        };

        diesel::insert_into(instructors::table)
            .values(&new_row)
            .execute(&mut *conn)
            .map(|_| ())
            .map_err(map_error)
    }

    fn find_all(&self) -> Result<Vec<Instructor>, InstructorPersistenceError> {
        let mut conn = self.session.connection().map_err(map_session)?;
        let rows: Vec<InstructorRow> = instructors::table
            .order(instructors::id.asc())
            .select(InstructorRow::as_select())
            .load(&mut *conn)
            .map_err(map_error)?;

        rows.into_iter()
            .map(|row| row_to_instructor(&mut conn, row))
            .collect()
    }

    fn find_by_instructor_id(
        &self,
        instructor_id: &InstructorId,
    ) -> Result<Option<Instructor>, InstructorPersistenceError> {
        let mut conn = self.session.connection().map_err(map_session)?;
        let row: Option<InstructorRow> = instructors::table
            .filter(instructors::instructor_id.eq(instructor_id.as_ref()))
            .select(InstructorRow::as_select())
            .first(&mut *conn)
            .optional()
            .map_err(map_error)?;

        row.map(|row| row_to_instructor(&mut conn, row)).transpose()
    }

    fn find_by_name(&self, name: &str) -> Result<Option<Instructor>, InstructorPersistenceError> {
        let mut conn = self.session.connection().map_err(map_session)?;
        let row: Option<InstructorRow> = instructors::table
            .filter(instructors::name.eq(name))
            .order(instructors::id.asc())
            .select(InstructorRow::as_select())
            .first(&mut *conn)
            .optional()
            .map_err(map_error)?;

        row.map(|row| row_to_instructor(&mut conn, row)).transpose()
    }

    fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Instructor>, InstructorPersistenceError> {
        let mut conn = self.session.connection().map_err(map_session)?;
        let row: Option<InstructorRow> = instructors::table
            .filter(instructors::email.eq(email.as_ref()))
            .select(InstructorRow::as_select())
            .first(&mut *conn)
            .optional()
            .map_err(map_error)?;

        row.map(|row| row_to_instructor(&mut conn, row)).transpose()
    }

    fn find_conflict(
        &self,
        instructor_id: &InstructorId,
        email: &EmailAddress,
    ) -> Result<Option<Instructor>, InstructorPersistenceError> {
        let mut conn = self.session.connection().map_err(map_session)?;
        let row: Option<InstructorRow> = instructors::table
            .filter(
                instructors::instructor_id
                    .eq(instructor_id.as_ref())
                    .or(instructors::email.eq(email.as_ref())),
            )
            .select(InstructorRow::as_select())
            .first(&mut *conn)
            .optional()
            .map_err(map_error)?;

        row.map(|row| row_to_instructor(&mut conn, row)).transpose()
    }

    fn update(&self, instructor: &Instructor) -> Result<(), InstructorPersistenceError> {
        let mut conn = self.session.connection().map_err(map_session)?;
        let changes = InstructorRowChanges {
            name: instructor.person().name().as_ref(),
            age: instructor.person().age().value(),
            email: instructor.person().email().as_ref(),
        };

        diesel::update(
            instructors::table
                .filter(instructors::instructor_id.eq(instructor.instructor_id().as_ref())),
        )
        .set(&changes)
        .execute(&mut *conn)
        .map(|_| ())
        .map_err(map_error)
    }

    fn delete(&self, instructor_id: &InstructorId) -> Result<(), InstructorPersistenceError> {
        let mut conn = self.session.connection().map_err(map_session)?;
        let row_id: Option<i32> = instructors::table
            .filter(instructors::instructor_id.eq(instructor_id.as_ref()))
            .select(instructors::id)
            .first(&mut *conn)
            .optional()
            .map_err(map_error)?;

        if let Some(row_id) = row_id {
            // Orphan the instructor's courses rather than deleting them.
            diesel::update(courses::table.filter(courses::instructor_id.eq(row_id)))
                .set(courses::instructor_id.eq(None::<i32>))
                .execute(&mut *conn)
                .map_err(map_error)?;
            diesel::delete(instructors::table.filter(instructors::id.eq(row_id)))
                .execute(&mut *conn)
                .map_err(map_error)?;
        }
        Ok(())
    }

    fn search(&self, term: &str) -> Result<Vec<Instructor>, InstructorPersistenceError> {
        let mut conn = self.session.connection().map_err(map_session)?;
        let pattern = format!("%{term}%");
        let rows: Vec<InstructorRow> = instructors::table
            .filter(
                instructors::name
                    .like(pattern)
                    .or(instructors::instructor_id.eq(term)),
            )
            .order(instructors::id.asc())
            .select(InstructorRow::as_select())
            .load(&mut *conn)
            .map_err(map_error)?;

        rows.into_iter()
            .map(|row| row_to_instructor(&mut conn, row))
            .collect()
    }
}
