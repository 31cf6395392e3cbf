// tests/logging.rs

use fam8_progress::log;

#[test]
fn init_twice_keeps_working() {
    let dir = tempfile::tempdir().unwrap();
    let log_dir = dir.path().join("log");

    let first = log::init(&log_dir, "fetch").unwrap();
    let second = log::init(&log_dir, "transcribe").unwrap();
    drop(second);
    drop(first);

    assert!(log_dir.join(log::log_file_name()).is_file());
}
