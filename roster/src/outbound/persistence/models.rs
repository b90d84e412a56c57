//! Diesel row structs used by the repository adapters.
//!
//! Rows are internal implementation details; adapters translate between
//! them and the domain entities and never expose them outward.

use diesel::prelude::*;

use super::schema::{courses, instructors, student_course, students};

/// Queryable row for students.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = students)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct StudentRow {
    pub id: i32,
    pub name: String,
    pub age: i32,
    pub email: String,
    pub student_id: String,
}

/// Insertable row for students.
#[derive(Debug, Insertable)]
#[diesel(table_name = students)]
pub(crate) struct NewStudentRow<'a> {
    pub name: &'a str,
    pub age: i32,
    pub email: &'a str,
    pub student_id: &'a str,
}

/// Changeset replacing a student's identity fields.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = students)]
pub(crate) struct StudentRowChanges<'a> {
    pub name: &'a str,
    pub age: i32,
    pub email: &'a str,
}

/// Queryable row for instructors.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = instructors)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct InstructorRow {
    pub id: i32,
    pub name: String,
    pub age: i32,
    pub email: String,
    pub instructor_id: String,
}

/// Insertable row for instructors.
#[derive(Debug, Insertable)]
#[diesel(table_name = instructors)]
pub(crate) struct NewInstructorRow<'a> {
    pub name: &'a str,
    pub age: i32,
    pub email: &'a str,
    pub instructor_id: &'a str,
}

/// Changeset replacing an instructor's identity fields.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = instructors)]
pub(crate) struct InstructorRowChanges<'a> {
    pub name: &'a str,
    pub age: i32,
    pub email: &'a str,
}

/// Queryable row for courses.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = courses)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct CourseRow {
    pub id: i32,
    pub course_name: String,
    pub course_id: String,
    pub instructor_id: Option<i32>,
}

/// Insertable row for courses.
#[derive(Debug, Insertable)]
#[diesel(table_name = courses)]
pub(crate) struct NewCourseRow<'a> {
    pub course_name: &'a str,
    pub course_id: &'a str,
    pub instructor_id: Option<i32>,
}

/// Changeset replacing a course's title and instructor reference.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = courses)]
pub(crate) struct CourseRowChanges<'a> {
    pub course_name: &'a str,
    // `None` must clear the assignment, not skip the column.
    #[diesel(treat_none_as_null = true)]
    pub instructor_id: Option<i32>,
}

/// Insertable row for enrollment joins.
#[derive(Debug, Insertable)]
#[diesel(table_name = student_course)]
pub(crate) struct NewEnrollmentRow {
    pub student_id: i32,
    pub course_id: i32,
}
