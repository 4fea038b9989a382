use std::io;
use std::path::Path;

use checkin_control::BackendError;
use checkin_control::backend::{io_error_with_help, io_error_with_help_io};

#[test]
fn notfound_hint_includes_op_and_path() {
    let p = Path::new("/nonexistent/path/for/test");
    let err = io_error_with_help("open", p)(io::Error::from(io::ErrorKind::NotFound));
    let msg = err.to_string();
    assert!(msg.contains("open"));
    assert!(msg.contains(p.to_string_lossy().as_ref()));
    assert!(msg.contains("path not found"));
    assert!(err.is_not_found());
}

#[test]
fn io_variant_keeps_source() {
    let err = io_error_with_help("write", Path::new("/tmp"))(io::Error::from(io::ErrorKind::PermissionDenied));
    match &err {
        BackendError::Io { source, .. } => assert_eq!(source.kind(), io::ErrorKind::PermissionDenied),
        other => panic!("unexpected variant: {other:?}"),
    }
    assert!(std::error::Error::source(&err).is_some());
}

#[cfg(unix)]
#[test]
fn enospc_hint_and_os_code() {
    let err = io_error_with_help("write", Path::new("/tmp"))(io::Error::from_raw_os_error(libc::ENOSPC));
    let msg = err.to_string();
    assert!(msg.contains("insufficient space"), "msg was: {msg}");
    assert!(msg.contains("os code"), "msg was: {msg}");
}

#[cfg(unix)]
#[test]
fn exdev_hint_mentions_cross_filesystem() {
    let err = io_error_with_help("rename", Path::new("/tmp"))(io::Error::from_raw_os_error(libc::EXDEV));
    assert!(err.to_string().contains("cross-filesystem"));
}

#[test]
fn io_adapter_preserves_kind() {
    let p = Path::new("/tmp/test.txt");
    let wrapped = io_error_with_help_io("create", p)(io::Error::from(io::ErrorKind::AlreadyExists));
    assert_eq!(wrapped.kind(), io::ErrorKind::AlreadyExists);
    assert!(wrapped.to_string().contains("already exists"));
}
