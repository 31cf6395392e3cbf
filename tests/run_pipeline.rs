// tests/run_pipeline.rs
//
// fetch → month check → transcribe against a fake browser and a recording
// workbook.
//
mod common;

use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;

use common::{FakeBrowser, RecordingExcel, test_options};
use fam8_progress::config::AppOptions;
use fam8_progress::core::parse_date_range;
use fam8_progress::pipeline;
use fam8_progress::report::ReportMode;
use fam8_progress::rollover::{YearMonth, book_path};
use fam8_progress::Error;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 5, 13).unwrap()
}

fn may_book(opts: &AppOptions) -> PathBuf {
    let path = book_path(&opts.paths.book_dir, YearMonth::of(today()));
    fs::create_dir_all(&opts.paths.book_dir).unwrap();
    fs::write(&path, vec![0u8; 64]).unwrap();
    path
}

#[test]
fn run_transcribes_into_this_months_workbook() {
    let dir = tempfile::tempdir().unwrap();
    let opts = test_options(dir.path());
    let book = may_book(&opts);
    let range = parse_date_range("20250512", today()).unwrap();
    let excel = RecordingExcel::default();

    let outcome = pipeline::run(&FakeBrowser::new(), &excel, &opts, &range, today(), None).unwrap();

    assert_eq!(outcome.workbook(), Some(book.as_path()));
    assert_eq!(outcome.csv_dir, opts.paths.csv_base_dir.join("20250512"));
    let (_, summary) = outcome.transcribed.as_ref().unwrap();
    assert_eq!(summary.totals_row, 16);
    assert_eq!(summary.rows_written, 1);

    let calls = excel.calls();
    assert!(calls.contains(&format!("open {}", book.display())));
    assert!(calls.contains(&"一般その他!J16=1".to_string()));
    assert!(calls.contains(&"アダルトその他!K16=2".to_string()));
    assert!(calls.contains(&"macro fam8progress_calling".to_string()));
}

#[test]
fn batch_run_reads_the_prefixed_files() {
    let dir = tempfile::tempdir().unwrap();
    let opts = test_options(dir.path());
    assert!(opts.batch_mode);
    may_book(&opts);
    let range = parse_date_range("20250512-20250514", today()).unwrap();

    let layout = pipeline::transcribe_layout(&opts, &range);
    let general = layout.path(ReportMode::General);
    assert!(general.ends_with("20250512-20250514/20250512-20250514_general_campane.csv"));

    let excel = RecordingExcel::default();
    let outcome = pipeline::run(&FakeBrowser::new(), &excel, &opts, &range, today(), None).unwrap();
    assert!(general.is_file());
    assert_eq!(outcome.csv_dir, opts.paths.csv_base_dir.join("20250512-20250514"));
    assert!(outcome.workbook().is_some());
    assert!(excel.calls().contains(&"一般その他!J16=1".to_string()));
}

#[test]
fn individual_mode_transcribes_the_first_day() {
    let dir = tempfile::tempdir().unwrap();
    let mut opts = test_options(dir.path());
    opts.batch_mode = false;
    let range = parse_date_range("20250512-20250513", today()).unwrap();

    let layout = pipeline::transcribe_layout(&opts, &range);
    assert_eq!(layout.dir, opts.paths.csv_base_dir.join("20250512"));
    assert!(layout.path(ReportMode::Advertiser).ends_with("20250512/advertiser.csv"));
}

#[test]
fn failed_session_stops_before_the_workbook() {
    let dir = tempfile::tempdir().unwrap();
    let opts = test_options(dir.path());
    may_book(&opts);
    let range = parse_date_range("20250512", today()).unwrap();
    let mut browser = FakeBrowser::new();
    browser.broken_sessions.insert(0);
    let excel = RecordingExcel::default();

    let err = pipeline::run(&browser, &excel, &opts, &range, today(), None).unwrap_err();
    assert!(matches!(err, Error::Download(_)), "{err:?}");
    assert!(excel.calls().is_empty());
    assert!(browser.calls().iter().any(|c| c == "close"));
}

#[test]
fn missing_workbook_keeps_the_csvs_and_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let opts = test_options(dir.path());
    let range = parse_date_range("20250512", today()).unwrap();
    let excel = RecordingExcel::default();

    let outcome = pipeline::run(&FakeBrowser::new(), &excel, &opts, &range, today(), None).unwrap();

    assert!(outcome.workbook().is_none());
    assert!(outcome.csv_dir.join("general_campane.csv").is_file());
    assert!(excel.calls().is_empty());
}

#[test]
fn transcribe_alone_needs_a_workbook() {
    let dir = tempfile::tempdir().unwrap();
    let opts = test_options(dir.path());
    let range = parse_date_range("20250512", today()).unwrap();
    let excel = RecordingExcel::default();
    let fetched = pipeline::fetch(&FakeBrowser::new(), &opts, &range, None);
    assert!(fetched.all_ok());

    let err = pipeline::transcribe(&excel, &opts, &range, today()).unwrap_err();
    assert!(matches!(err, Error::Resource(_)), "{err:?}");

    let book = may_book(&opts);
    let (used, summary) = pipeline::transcribe(&excel, &opts, &range, today()).unwrap();
    assert_eq!(used, book);
    assert_eq!(summary.general.gross, 1);
    assert_eq!(summary.adult.net, 2);
}
