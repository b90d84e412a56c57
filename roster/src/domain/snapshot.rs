//! Flat snapshot document of every entity.

use serde::{Deserialize, Serialize};

use super::course::Course;
use super::instructor::Instructor;
use super::student::Student;

/// The flat-JSON document variant of the store:
/// `{ "students": [...], "instructors": [...], "courses": [...] }`.
///
/// Entities use their standard serialized shapes, so the document
/// round-trips losslessly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RosterSnapshot {
    /// Every student record.
    pub students: Vec<Student>,
    /// Every instructor record.
    pub instructors: Vec<Instructor>,
    /// Every course record.
    pub courses: Vec<Course>,
}

impl RosterSnapshot {
    /// Create an empty snapshot.
    pub const fn new() -> Self {
        Self {
            students: Vec::new(),
            instructors: Vec::new(),
            courses: Vec::new(),
        }
    }

    /// Total number of entity records in the document.
    pub fn record_count(&self) -> usize {
        self.students.len() + self.instructors.len() + self.courses.len()
    }

    /// Whether the document holds no records at all.
    pub fn is_empty(&self) -> bool {
        self.record_count() == 0
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::rstest;

    use super::*;
    use crate::domain::student::Student;

    #[rstest]
    fn document_uses_contract_keys() {
        let snapshot = RosterSnapshot {
            students: vec![
                Student::try_from_fields("Alice", 20, "alice@x.com", "S1")
                    .expect("student should validate"),
            ],
            instructors: Vec::new(),
            courses: Vec::new(),
        };

        let json = serde_json::to_value(&snapshot).expect("snapshot should serialise");

        assert!(json.get("students").is_some());
        assert!(json.get("instructors").is_some());
        assert!(json.get("courses").is_some());
        assert_eq!(json["students"][0]["student_id"], "S1");
    }

    #[rstest]
    fn empty_snapshot_reports_no_records() {
        assert!(RosterSnapshot::new().is_empty());
        assert_eq!(RosterSnapshot::new().record_count(), 0);
    }
}
