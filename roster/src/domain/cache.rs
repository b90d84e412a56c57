//! Repository-backed cache of entity listings.
//!
//! The original design kept ad hoc module-level lists alongside the store;
//! this cache replaces them with an owned object and an explicit
//! fill/invalidate contract. A slot is rebuilt from its repository on the
//! next read after invalidation; it is never mutated in place.

use super::course::Course;
use super::instructor::Instructor;
use super::student::Student;

/// Lazily filled listings for the three entity types.
///
/// The repositories stay the source of truth; every write path must
/// invalidate the slots it may have affected.
#[derive(Debug, Default)]
pub struct RosterCache {
    students: Option<Vec<Student>>,
    instructors: Option<Vec<Instructor>>,
    courses: Option<Vec<Course>>,
}

impl RosterCache {
    /// Create a cache with every slot unfilled.
    pub const fn new() -> Self {
        Self {
            students: None,
            instructors: None,
            courses: None,
        }
    }

    /// Drop every slot.
    pub fn invalidate(&mut self) {
        self.students = None;
        self.instructors = None;
        self.courses = None;
    }

    /// Drop the student listing.
    pub fn invalidate_students(&mut self) {
        self.students = None;
    }

    /// Drop the instructor listing.
    pub fn invalidate_instructors(&mut self) {
        self.instructors = None;
    }

    /// Drop the course listing.
    pub fn invalidate_courses(&mut self) {
        self.courses = None;
    }

    /// Student listing, filling the slot through `fill` when unfilled.
    ///
    /// # Errors
    ///
    /// Propagates the fill closure's error; the slot stays unfilled.
    pub fn students_or_fill<E>(
        &mut self,
        fill: impl FnOnce() -> Result<Vec<Student>, E>,
    ) -> Result<&[Student], E> {
        if self.students.is_none() {
            self.students = Some(fill()?);
        }
        Ok(self.students.as_deref().unwrap_or_default())
    }

    /// Instructor listing, filling the slot through `fill` when unfilled.
    ///
    /// # Errors
    ///
    /// Propagates the fill closure's error; the slot stays unfilled.
    pub fn instructors_or_fill<E>(
        &mut self,
        fill: impl FnOnce() -> Result<Vec<Instructor>, E>,
    ) -> Result<&[Instructor], E> {
        if self.instructors.is_none() {
            self.instructors = Some(fill()?);
        }
        Ok(self.instructors.as_deref().unwrap_or_default())
    }

    /// Course listing, filling the slot through `fill` when unfilled.
    ///
    /// # Errors
    ///
    /// Propagates the fill closure's error; the slot stays unfilled.
    pub fn courses_or_fill<E>(
        &mut self,
        fill: impl FnOnce() -> Result<Vec<Course>, E>,
    ) -> Result<&[Course], E> {
        if self.courses.is_none() {
            self.courses = Some(fill()?);
        }
        Ok(self.courses.as_deref().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::rstest;

    use super::*;
    use crate::domain::student::Student;

    fn one_student() -> Vec<Student> {
        vec![
            Student::try_from_fields("Alice", 20, "alice@x.com", "S1")
                .expect("student should validate"),
        ]
    }

    #[rstest]
    fn fill_runs_once_until_invalidated() {
        let mut cache = RosterCache::new();
        let mut calls = 0_u32;

        for _ in 0..3 {
            let students = cache
                .students_or_fill(|| {
                    calls += 1;
                    Ok::<_, ()>(one_student())
                })
                .expect("fill should succeed");
            assert_eq!(students.len(), 1);
        }
        assert_eq!(calls, 1);

        cache.invalidate_students();
        cache
            .students_or_fill(|| {
                calls += 1;
                Ok::<_, ()>(one_student())
            })
            .expect("fill should succeed");
        assert_eq!(calls, 2);
    }

    #[rstest]
    fn failed_fill_leaves_slot_unfilled() {
        let mut cache = RosterCache::new();

        let result = cache.students_or_fill(|| Err("store down"));
        assert_eq!(result, Err("store down"));

        let mut calls = 0_u32;
        cache
            .students_or_fill(|| {
                calls += 1;
                Ok::<_, &str>(Vec::new())
            })
            .expect("fill should succeed");
        assert_eq!(calls, 1);
    }

    #[rstest]
    fn invalidate_drops_every_slot() {
        let mut cache = RosterCache::new();
        cache
            .students_or_fill(|| Ok::<_, ()>(one_student()))
            .expect("fill should succeed");
        cache
            .courses_or_fill(|| Ok::<_, ()>(Vec::new()))
            .expect("fill should succeed");

        cache.invalidate();

        let mut calls = 0_u32;
        cache
            .students_or_fill(|| {
                calls += 1;
                Ok::<_, ()>(Vec::new())
            })
            .expect("fill should succeed");
        assert_eq!(calls, 1);
    }
}
