//! Diesel table definitions for the SQLite schema.
//!
//! These definitions must match the embedded migrations exactly. They are
//! used by Diesel for compile-time query validation and type-safe SQL
//! generation.

diesel::table! {
    /// Student records.
    ///
    /// `email` and `student_id` carry unique indexes; `id` is the surrogate
    /// row key referenced by the enrollment join table.
    students (id) {
        /// Surrogate primary key.
        id -> Integer,
        /// Display name.
        name -> Text,
        /// Age in whole years.
        age -> Integer,
        /// Email address (unique).
        email -> Text,
        /// Natural identifier (unique).
        student_id -> Text,
    }
}

diesel::table! {
    /// Instructor records.
    instructors (id) {
        /// Surrogate primary key.
        id -> Integer,
        /// Display name.
        name -> Text,
        /// Age in whole years.
        age -> Integer,
        /// Email address (unique).
        email -> Text,
        /// Natural identifier (unique).
        instructor_id -> Text,
    }
}

diesel::table! {
    /// Course records.
    courses (id) {
        /// Surrogate primary key.
        id -> Integer,
        /// Course title; collisions permitted.
        course_name -> Text,
        /// Natural identifier (unique).
        course_id -> Text,
        /// Optional reference to the teaching instructor's row.
        instructor_id -> Nullable<Integer>,
    }
}

diesel::table! {
    /// Student↔course enrollment join rows.
    ///
    /// The surrogate `id` preserves insertion order; the (student, course)
    /// pair is unique.
    student_course (id) {
        /// Surrogate primary key; orders enrollments.
        id -> Integer,
        /// Enrolled student's row key.
        student_id -> Integer,
        /// Course's row key.
        course_id -> Integer,
    }
}

diesel::joinable!(courses -> instructors (instructor_id));
diesel::joinable!(student_course -> students (student_id));
diesel::joinable!(student_course -> courses (course_id));

diesel::allow_tables_to_appear_in_same_query!(students, instructors, courses, student_course);
