//! Snapshot export/restore flows between the SQLite store and the
//! flat-JSON document store.

use roster::domain::registrar::CourseSubmission;
use roster::outbound::snapshot::{SnapshotLoadError, SnapshotStore};
use roster::test_support::{fixtures, init_tracing, memory_session, registrar_over};
use rstest::rstest;

#[rstest]
fn snapshot_travels_through_the_file_store_losslessly() {
    init_tracing();
    let mut source = registrar_over(&memory_session());
    source
        .submit_instructor(fixtures::john())
        .expect("instructor submission should succeed");
    source
        .submit_course(CourseSubmission {
            instructor_id: Some("I1".to_owned()),
            ..fixtures::cs101()
        })
        .expect("course submission should succeed");
    source
        .submit_student(fixtures::alice())
        .expect("student submission should succeed");
    source
        .register("S1", "C1")
        .expect("registration should succeed");

    let dir = tempfile::tempdir().expect("temp dir should create");
    let store = SnapshotStore::new(dir.path().join("data.json"));
    let snapshot = source.snapshot().expect("snapshot should succeed");
    store.save(&snapshot).expect("save should succeed");

    let loaded = store.load().expect("load should succeed");
    assert_eq!(loaded, snapshot);

    let mut target = registrar_over(&memory_session());
    let report = target
        .restore_snapshot(loaded)
        .expect("restore should succeed");
    assert_eq!(report.students_added, 1);
    assert_eq!(report.instructors_added, 1);
    assert_eq!(report.courses_added, 1);
    assert_eq!(report.enrollments_added, 1);
    assert_eq!(report.skipped_duplicates, 0);

    let students = target.list_students().expect("listing should succeed");
    assert_eq!(students, source.list_students().expect("listing should succeed"));

    let courses = target.list_courses().expect("listing should succeed");
    assert_eq!(
        courses[0].instructor().map(AsRef::as_ref),
        Some("I1"),
    );
    assert_eq!(
        courses[0]
            .enrolled_students()
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>(),
        ["S1"]
    );
}

#[rstest]
fn restoring_twice_skips_every_existing_record() {
    init_tracing();
    let mut source = registrar_over(&memory_session());
    source
        .submit_student(fixtures::alice())
        .expect("student submission should succeed");
    source
        .submit_course(fixtures::cs101())
        .expect("course submission should succeed");
    let snapshot = source.snapshot().expect("snapshot should succeed");

    let mut target = registrar_over(&memory_session());
    target
        .restore_snapshot(snapshot.clone())
        .expect("first restore should succeed");
    let report = target
        .restore_snapshot(snapshot)
        .expect("second restore should succeed");

    assert_eq!(report.students_added, 0);
    assert_eq!(report.courses_added, 0);
    assert_eq!(report.skipped_duplicates, 2);

    assert_eq!(
        target.list_students().expect("listing should succeed").len(),
        1
    );
}

#[rstest]
fn missing_and_corrupt_files_stay_distinguishable_end_to_end() {
    let dir = tempfile::tempdir().expect("temp dir should create");
    let store = SnapshotStore::new(dir.path().join("data.json"));

    assert!(matches!(
        store.load(),
        Err(SnapshotLoadError::Missing { .. })
    ));

    std::fs::write(store.path(), "{not json").expect("write should succeed");
    assert!(matches!(
        store.load(),
        Err(SnapshotLoadError::Corrupt { .. })
    ));
}
