//! SQLite-backed `StudentRepository` implementation using Diesel ORM.
//!
//! This adapter implements the domain's `StudentRepository` port. Reads
//! rebuild the registration list from the enrollment join rows in insertion
//! order; deletes remove those join rows before the student row itself.

use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::domain::course::CourseId;
use crate::domain::person::{EmailAddress, Person};
use crate::domain::ports::{StudentPersistenceError, StudentRepository};
use crate::domain::student::{Student, StudentId};

use super::error_mapping::{map_diesel_error, map_session_error};
use super::models::{NewStudentRow, StudentRow, StudentRowChanges};
use super::schema::{courses, student_course, students};
use super::session::{Session, SessionError};

/// Diesel-backed implementation of the `StudentRepository` port.
#[derive(Clone)]
pub struct DieselStudentRepository {
    session: Session,
}

impl DieselStudentRepository {
    /// Create a new repository over the shared session.
    pub const fn new(session: Session) -> Self {
        Self { session }
    }
}

/// Map session checkout errors to student persistence errors.
fn map_session(error: SessionError) -> StudentPersistenceError {
    map_session_error(error, StudentPersistenceError::connection)
}

/// Map Diesel errors to student persistence errors.
fn map_error(error: diesel::result::Error) -> StudentPersistenceError {
    map_diesel_error(
        error,
        StudentPersistenceError::query,
        StudentPersistenceError::connection,
        StudentPersistenceError::duplicate_record,
    )
}

/// Course ids the student row is enrolled in, in join-row order.
fn registered_course_ids(
    conn: &mut SqliteConnection,
    student_row_id: i32,
) -> Result<Vec<String>, StudentPersistenceError> {
    student_course::table
        .inner_join(courses::table)
        .filter(student_course::student_id.eq(student_row_id))
        .order(student_course::id.asc())
        .select(courses::course_id)
        .load::<String>(conn)
        .map_err(map_error)
}

/// Convert a database row to a domain student.
fn row_to_student(
    conn: &mut SqliteConnection,
    row: StudentRow,
) -> Result<Student, StudentPersistenceError> {
    let course_ids = registered_course_ids(conn, row.id)?;
    let person = Person::try_from_fields(row.name, row.age, row.email).map_err(|error| {
        StudentPersistenceError::query(format!("stored student failed validation: {error}"))
    })?;
    let student_id = StudentId::new(row.student_id).map_err(|error| {
        StudentPersistenceError::query(format!("stored student failed validation: {error}"))
    })?;
    let registered_courses = course_ids
        .into_iter()
        .map(CourseId::new)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|error| {
            StudentPersistenceError::query(format!(
                "stored registration failed validation: {error}"
            ))
        })?;
    Ok(Student::with_registered_courses(
        person,
        student_id,
        registered_courses,
    ))
}

impl StudentRepository for DieselStudentRepository {
    fn insert(&self, student: &Student) -> Result<(), StudentPersistenceError> {
        let mut conn = self.session.connection().map_err(map_session)?;
        let new_row = NewStudentRow {
            name: student.person().name().as_ref(),
            age: student.person().age().value(),
            email: student.person().email().as_ref(),
            student_id: student.student_id().as_ref(),
        };

        diesel::insert_into(students::table)
            .values(&new_row)
            .execute(&mut *conn)
            .map(|_| ())
            .map_err(map_error)
    }

    fn find_all(&self) -> Result<Vec<Student>, StudentPersistenceError> {
        let mut conn = self.session.connection().map_err(map_session)?;
        let rows: Vec<StudentRow> = students::table
            .order(students::id.asc())
            .select(StudentRow::as_select())
            .load(&mut *conn)
            .map_err(map_error)?;

        rows.into_iter()
            .map(|row| row_to_student(&mut conn, row))
            .collect()
    }

    fn find_by_student_id(
        &self,
        student_id: &StudentId,
    ) -> Result<Option<Student>, StudentPersistenceError> {
        let mut conn = self.session.connection().map_err(map_session)?;
        let row: Option<StudentRow> = students::table
            .filter(students::student_id.eq(student_id.as_ref()))
            .select(StudentRow::as_select())
            .first(&mut *conn)
            .optional()
            .map_err(map_error)?;

        row.map(|row| row_to_student(&mut conn, row)).transpose()
    }

    fn find_by_name(&self, name: &str) -> Result<Option<Student>, StudentPersistenceError> {
        let mut conn = self.session.connection().map_err(map_session)?;
        let row: Option<StudentRow> = students::table
            .filter(students::name.eq(name))
            .order(students::id.asc())
            .select(StudentRow::as_select())
            .first(&mut *conn)
            .optional()
            .map_err(map_error)?;

        row.map(|row| row_to_student(&mut conn, row)).transpose()
    }

    fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Student>, StudentPersistenceError> {
        let mut conn = self.session.connection().map_err(map_session)?;
        let row: Option<StudentRow> = students::table
            .filter(students::email.eq(email.as_ref()))
            .select(StudentRow::as_select())
            .first(&mut *conn)
            .optional()
            .map_err(map_error)?;

        row.map(|row| row_to_student(&mut conn, row)).transpose()
    }

    fn find_conflict(
        &self,
        student_id: &StudentId,
        email: &EmailAddress,
    ) -> Result<Option<Student>, StudentPersistenceError> {
        let mut conn = self.session.connection().map_err(map_session)?;
        let row: Option<StudentRow> = students::table
            .filter(
                students::student_id
                    .eq(student_id.as_ref())
                    .or(students::email.eq(email.as_ref())),
            )
            .select(StudentRow::as_select())
            .first(&mut *conn)
            .optional()
            .map_err(map_error)?;

        row.map(|row| row_to_student(&mut conn, row)).transpose()
    }

    fn update(&self, student: &Student) -> Result<(), StudentPersistenceError> {
        let mut conn = self.session.connection().map_err(map_session)?;
        let changes = StudentRowChanges {
            name: student.person().name().as_ref(),
            age: student.person().age().value(),
            email: student.person().email().as_ref(),
        };

        diesel::update(
            students::table.filter(students::student_id.eq(student.student_id().as_ref())),
        )
        .set(&changes)
        .execute(&mut *conn)
        .map(|_| ())
        .map_err(map_error)
    }

    fn delete(&self, student_id: &StudentId) -> Result<(), StudentPersistenceError> {
        let mut conn = self.session.connection().map_err(map_session)?;
        let row_id: Option<i32> = students::table
            .filter(students::student_id.eq(student_id.as_ref()))
            .select(students::id)
            .first(&mut *conn)
            .optional()
            .map_err(map_error)?;

        if let Some(row_id) = row_id {
            diesel::delete(student_course::table.filter(student_course::student_id.eq(row_id)))
                .execute(&mut *conn)
                .map_err(map_error)?;
            diesel::delete(students::table.filter(students::id.eq(row_id)))
                .execute(&mut *conn)
                .map_err(map_error)?;
        }
        Ok(())
    }

    fn search(&self, term: &str) -> Result<Vec<Student>, StudentPersistenceError> {
        let mut conn = self.session.connection().map_err(map_session)?;
        let pattern = format!("%{term}%");
        let rows: Vec<StudentRow> = students::table
            .filter(
                students::name
                    .like(pattern)
                    .or(students::student_id.eq(term)),
            )
            .order(students::id.asc())
            .select(StudentRow::as_select())
            .load(&mut *conn)
            .map_err(map_error)?;

        rows.into_iter()
            .map(|row| row_to_student(&mut conn, row))
            .collect()
    }
}
