//! Checkin events reach a tracing subscriber with their structured fields.
//! Subscribers are installed per test with `dispatcher::with_default`, so no global
//! state is touched.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use checkin_control::{Backend, MarkerOutcome, MemoryFs, TransferMode, checkin};
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt as tsfmt, registry};

/// Appends everything written into a shared buffer.
#[derive(Clone)]
struct BufferWriter(Arc<Mutex<Vec<u8>>>);

impl Write for BufferWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn capture<F: FnOnce()>(filter: &str, json: bool, f: F) -> String {
    let buf = Arc::new(Mutex::new(Vec::new()));
    let make_writer = {
        let buf = buf.clone();
        move || BufferWriter(buf.clone())
    };
    let dispatch = if json {
        let layer = tsfmt::layer()
            .event_format(tsfmt::format().json())
            .with_writer(make_writer);
        tracing::Dispatch::new(registry().with(EnvFilter::new(filter)).with(layer))
    } else {
        let layer = tsfmt::layer().with_writer(make_writer).with_ansi(false).compact();
        tracing::Dispatch::new(registry().with(EnvFilter::new(filter)).with(layer))
    };
    tracing::dispatcher::with_default(&dispatch, f);
    let guard = buf.lock().unwrap();
    String::from_utf8_lossy(&guard[..]).to_string()
}

fn seeded() -> MemoryFs {
    let fs = MemoryFs::new();
    fs.make_dirs("src").unwrap();
    fs.write_text("src/file.txt", "f").unwrap();
    fs
}

#[test]
fn completed_checkin_logs_at_info() {
    let src = seeded();
    let dst = MemoryFs::new();
    let out = capture("info", false, || {
        checkin(&src, "src/file.txt", &dst, "tgt/file.txt", TransferMode::Copy).unwrap();
    });
    assert!(out.contains("Checkin completed"), "contents={out}");
    assert!(out.contains("tgt/file.txt"), "contents={out}");
    assert!(!out.contains("dispatch checkin"), "debug events must be filtered: {out}");
}

#[test]
fn json_output_carries_fields() {
    let src = seeded();
    let dst = MemoryFs::new();
    let out = capture("debug", true, || {
        checkin(&src, "src/file.txt", &dst, "tgt/file.txt", TransferMode::Move).unwrap();
    });
    let completed = out
        .lines()
        .filter_map(|l| serde_json::from_str::<serde_json::Value>(l).ok())
        .find(|v| v["fields"]["message"] == "Checkin completed")
        .expect("completion event present");
    assert_eq!(completed["fields"]["mode"], "move");
    assert_eq!(completed["fields"]["dest"], "tgt/file.txt");
    assert_eq!(completed["level"], "INFO");
}

#[test]
fn marker_failure_is_a_warning() {
    let src = seeded();
    src.make_dirs("src/file.txt.checkin").unwrap();
    let dst = MemoryFs::new();
    let mut outcome = None;
    let out = capture("warn", false, || {
        outcome = Some(checkin(&src, "src/file.txt", &dst, "tgt/file.txt", TransferMode::Move).unwrap());
    });
    assert!(matches!(outcome.unwrap().marker, MarkerOutcome::Failed(_)));
    assert!(out.contains("WARN"), "contents={out}");
    assert!(out.contains("marker was not written"), "contents={out}");
}

#[test]
fn file_logging_writes_to_custom_path() {
    let td = tempfile::tempdir().expect("tempdir");
    let log_path = td.path().join("checkin_control_test.log");
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .expect("open log file");
    let (writer, guard) = tracing_appender::non_blocking(file);
    let layer = tsfmt::layer()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .compact();
    let dispatch = tracing::Dispatch::new(registry().with(EnvFilter::new("info")).with(layer));

    let src = seeded();
    let dst = MemoryFs::new();
    tracing::dispatcher::with_default(&dispatch, || {
        checkin(&src, "src/file.txt", &dst, "tgt/file.txt", TransferMode::Copy).unwrap();
    });
    drop(guard);

    let contents = std::fs::read_to_string(&log_path).expect("read log file");
    assert!(contents.contains("Checkin completed"), "contents={contents}");
}
