//! SQLite-backed `CourseRepository` implementation using Diesel ORM.
//!
//! The instructor reference travels as a natural id in the domain and as a
//! row key in the store; this adapter resolves in both directions. Reads
//! rebuild the enrollment list from the join rows in insertion order.

use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::domain::course::{Course, CourseId, CourseName};
use crate::domain::instructor::InstructorId;
use crate::domain::ports::{CoursePersistenceError, CourseRepository};
use crate::domain::student::StudentId;

use super::error_mapping::{map_diesel_error, map_session_error};
use super::models::{CourseRow, CourseRowChanges, NewCourseRow};
use super::schema::{courses, instructors, student_course, students};
use super::session::{Session, SessionError};

/// Diesel-backed implementation of the `CourseRepository` port.
#[derive(Clone)]
pub struct DieselCourseRepository {
    session: Session,
}

impl DieselCourseRepository {
    /// Create a new repository over the shared session.
    pub const fn new(session: Session) -> Self {
        Self { session }
    }
}

/// Map session checkout errors to course persistence errors.
fn map_session(error: SessionError) -> CoursePersistenceError {
    map_session_error(error, CoursePersistenceError::connection)
}

/// Map Diesel errors to course persistence errors.
fn map_error(error: diesel::result::Error) -> CoursePersistenceError {
    map_diesel_error(
        error,
        CoursePersistenceError::query,
        CoursePersistenceError::connection,
        CoursePersistenceError::duplicate_record,
    )
}

/// Row key of the instructor with the given natural id, if present.
fn instructor_row_id(
    conn: &mut SqliteConnection,
    instructor_id: &InstructorId,
) -> Result<Option<i32>, CoursePersistenceError> {
    instructors::table
        .filter(instructors::instructor_id.eq(instructor_id.as_ref()))
        .select(instructors::id)
        .first(conn)
        .optional()
        .map_err(map_error)
}

/// Resolve an optional instructor reference to its row key.
///
/// A present reference that does not resolve is a
/// [`CoursePersistenceError::MissingInstructor`].
fn resolve_instructor_reference(
    conn: &mut SqliteConnection,
    instructor_id: Option<&InstructorId>,
) -> Result<Option<i32>, CoursePersistenceError> {
    match instructor_id {
        Some(instructor_id) => instructor_row_id(conn, instructor_id)?
            .map(Some)
            .ok_or_else(|| {
                CoursePersistenceError::missing_instructor(instructor_id.as_ref())
            }),
        None => Ok(None),
    }
}

/// Student ids enrolled in the course row, in join-row order.
fn enrolled_student_ids(
    conn: &mut SqliteConnection,
    course_row_id: i32,
) -> Result<Vec<String>, CoursePersistenceError> {
    student_course::table
        .inner_join(students::table)
        .filter(student_course::course_id.eq(course_row_id))
        .order(student_course::id.asc())
        .select(students::student_id)
        .load::<String>(conn)
        .map_err(map_error)
}

/// Convert a database row to a domain course.
fn row_to_course(
    conn: &mut SqliteConnection,
    row: CourseRow,
) -> Result<Course, CoursePersistenceError> {
    let student_ids = enrolled_student_ids(conn, row.id)?;
    let instructor_natural_id: Option<String> = match row.instructor_id {
        Some(instructor_row_id) => instructors::table
            .filter(instructors::id.eq(instructor_row_id))
            .select(instructors::instructor_id)
            .first(conn)
            .optional()
            .map_err(map_error)?,
        None => None,
    };

    let course_id = CourseId::new(row.course_id).map_err(|error| {
        CoursePersistenceError::query(format!("stored course failed validation: {error}"))
    })?;
    let course_name = CourseName::new(row.course_name).map_err(|error| {
        CoursePersistenceError::query(format!("stored course failed validation: {error}"))
    })?;
    let instructor = instructor_natural_id
        .map(InstructorId::new)
        .transpose()
        .map_err(|error| {
            CoursePersistenceError::query(format!("stored course failed validation: {error}"))
        })?;
    let enrolled_students = student_ids
        .into_iter()
        .map(StudentId::new)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|error| {
            CoursePersistenceError::query(format!(
                "stored enrollment failed validation: {error}"
            ))
        })?;

    Ok(Course::with_parts(
        course_id,
        course_name,
        instructor,
        enrolled_students,
    ))
}

impl CourseRepository for DieselCourseRepository {
    fn insert(&self, course: &Course) -> Result<(), CoursePersistenceError> {
        let mut conn = self.session.connection().map_err(map_session)?;
        let instructor_row = resolve_instructor_reference(&mut conn, course.instructor())?;
        let new_row = NewCourseRow {
            course_name: course.course_name().as_ref(),
            course_id: course.course_id().as_ref(),
            instructor_id: instructor_row,
        };

        diesel::insert_into(courses::table)
            .values(&new_row)
            .execute(&mut *conn)
            .map(|_| ())
            .map_err(map_error)
    }

    fn find_all(&self) -> Result<Vec<Course>, CoursePersistenceError> {
        let mut conn = self.session.connection().map_err(map_session)?;
        let rows: Vec<CourseRow> = courses::table
            .order(courses::id.asc())
            .select(CourseRow::as_select())
            .load(&mut *conn)
            .map_err(map_error)?;

        rows.into_iter()
            .map(|row| row_to_course(&mut conn, row))
            .collect()
    }

    fn find_by_course_id(
        &self,
        course_id: &CourseId,
    ) -> Result<Option<Course>, CoursePersistenceError> {
        let mut conn = self.session.connection().map_err(map_session)?;
        let row: Option<CourseRow> = courses::table
            .filter(courses::course_id.eq(course_id.as_ref()))
            .select(CourseRow::as_select())
            .first(&mut *conn)
            .optional()
            .map_err(map_error)?;

        row.map(|row| row_to_course(&mut conn, row)).transpose()
    }

    fn find_by_name(&self, name: &str) -> Result<Option<Course>, CoursePersistenceError> {
        let mut conn = self.session.connection().map_err(map_session)?;
        let row: Option<CourseRow> = courses::table
            .filter(courses::course_name.eq(name))
            .order(courses::id.asc())
            .select(CourseRow::as_select())
            .first(&mut *conn)
            .optional()
            .map_err(map_error)?;

        row.map(|row| row_to_course(&mut conn, row)).transpose()
    }

    fn update(&self, course: &Course) -> Result<(), CoursePersistenceError> {
        let mut conn = self.session.connection().map_err(map_session)?;
        let instructor_row = resolve_instructor_reference(&mut conn, course.instructor())?;
        let changes = CourseRowChanges {
            course_name: course.course_name().as_ref(),
            instructor_id: instructor_row,
        };

        diesel::update(
            courses::table.filter(courses::course_id.eq(course.course_id().as_ref())),
        )
        .set(&changes)
        .execute(&mut *conn)
        .map(|_| ())
        .map_err(map_error)
    }

    fn delete(&self, course_id: &CourseId) -> Result<(), CoursePersistenceError> {
        let mut conn = self.session.connection().map_err(map_session)?;
        let row_id: Option<i32> = courses::table
            .filter(courses::course_id.eq(course_id.as_ref()))
            .select(courses::id)
            .first(&mut *conn)
            .optional()
            .map_err(map_error)?;

        if let Some(row_id) = row_id {
            diesel::delete(student_course::table.filter(student_course::course_id.eq(row_id)))
                .execute(&mut *conn)
                .map_err(map_error)?;
            diesel::delete(courses::table.filter(courses::id.eq(row_id)))
                .execute(&mut *conn)
                .map_err(map_error)?;
        }
        Ok(())
    }

    fn search(&self, term: &str) -> Result<Vec<Course>, CoursePersistenceError> {
        let mut conn = self.session.connection().map_err(map_session)?;
        let pattern = format!("%{term}%");
        let rows: Vec<CourseRow> = courses::table
            .filter(
                courses::course_name
                    .like(pattern)
                    .or(courses::course_id.eq(term)),
            )
            .order(courses::id.asc())
            .select(CourseRow::as_select())
            .load(&mut *conn)
            .map_err(map_error)?;

        rows.into_iter()
            .map(|row| row_to_course(&mut conn, row))
            .collect()
    }

    fn assign_instructor(
        &self,
        course_id: &CourseId,
        instructor_id: Option<&InstructorId>,
    ) -> Result<(), CoursePersistenceError> {
        let mut conn = self.session.connection().map_err(map_session)?;
        let instructor_row = resolve_instructor_reference(&mut conn, instructor_id)?;

        let updated = diesel::update(
            courses::table.filter(courses::course_id.eq(course_id.as_ref())),
        )
        .set(courses::instructor_id.eq(instructor_row))
        .execute(&mut *conn)
        .map_err(map_error)?;

        if updated == 0 {
            return Err(CoursePersistenceError::query("course not found"));
        }
        Ok(())
    }
}
