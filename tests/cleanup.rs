//! Cleanup undoes a checkin: the result and its top-level directory disappear.

use assert_fs::prelude::*;
use checkin_control::{Backend, CheckinError, LocalFs, MemoryFs, TransferMode, checkin, checkin_paths, cleanup};

type TestResult = Result<(), Box<dyn std::error::Error>>;

#[test]
fn cleanup_restores_local_destination() -> TestResult {
    let temp = assert_fs::TempDir::new()?;
    temp.child("src/file.txt").write_str("f")?;
    temp.child("dest/keep.txt").write_str("k")?;

    let done = checkin_paths(
        &temp.path().join("src/file.txt"),
        &temp.path().join("dest/tgt/file.txt"),
        TransferMode::Copy,
    )?;
    assert_eq!(done.path, "tgt/file.txt");

    cleanup(&done.backend, &done.path)?;
    assert!(!temp.path().join("dest/tgt").exists());
    temp.child("dest/keep.txt").assert("k");
    Ok(())
}

#[test]
fn cleanup_of_directory_result() -> TestResult {
    let src = MemoryFs::new();
    src.make_dirs("data/sub")?;
    src.write_text("data/sub/x", "x")?;
    let dst = MemoryFs::new();

    let done = checkin(&src, "data", &dst, "tgt/data", TransferMode::Copy)?;
    cleanup(&dst, &done.path)?;
    assert_eq!(dst.list_dir("")?, Vec::<String>::new());
    Ok(())
}

#[test]
fn nested_result_reports_inconsistency() -> TestResult {
    let temp = assert_fs::TempDir::new()?;
    temp.child("a/b/c.txt").write_str("c")?;
    let fs = LocalFs::new(temp.path())?;

    let err = cleanup(&fs, "a/b/c.txt").expect_err("a/b remains");
    match err {
        CheckinError::CleanupInconsistency { top, .. } => assert_eq!(top, "a"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!temp.path().join("a/b/c.txt").exists());
    assert!(temp.path().join("a/b").is_dir());
    Ok(())
}

#[test]
fn missing_result_is_not_found() -> TestResult {
    let fs = MemoryFs::new();
    let err = cleanup(&fs, "tgt/nothing").expect_err("nothing to clean");
    assert!(matches!(err, CheckinError::NotFound { .. }));
    assert_eq!(err.code(), 10);
    Ok(())
}
