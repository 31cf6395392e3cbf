// tests/rollover.rs
use std::fs;

use chrono::NaiveDate;

use fam8_progress::config::PathOptions;
use fam8_progress::rollover::{
    Provision, YearMonth, book_path, check_month, find_latest_book, parse_book_file_name, read_last_created,
    resolve_workbook,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn layout(root: &std::path::Path) -> PathOptions {
    let paths = PathOptions::rooted_at(root);
    fs::create_dir_all(&paths.book_dir).unwrap();
    fs::create_dir_all(&paths.meta_dir).unwrap();
    paths
}

fn write_template(paths: &PathOptions, size: usize) {
    fs::write(paths.template_path(), vec![0u8; size]).unwrap();
}

#[test]
fn book_names_have_no_leading_zero() {
    assert_eq!(YearMonth::of(d(2025, 5, 31)).book_file_name(), "新2025年5月fam8進捗.xlsm");
    assert_eq!(YearMonth::of(d(2025, 12, 1)).next().book_file_name(), "新2026年1月fam8進捗.xlsm");
    assert_eq!(parse_book_file_name("新2025年11月fam8進捗.xlsm"), Some(YearMonth { year: 2025, month: 11 }));
    assert_eq!(parse_book_file_name("新2025年13月fam8進捗.xlsm"), None);
    assert_eq!(parse_book_file_name("2025年5月fam8進捗.xlsm"), None);
}

#[test]
fn month_end_creates_next_workbook_and_marker() {
    let dir = tempfile::tempdir().unwrap();
    let paths = layout(dir.path());
    write_template(&paths, 12_000);
    fs::write(book_path(&paths.book_dir, YearMonth { year: 2025, month: 5 }), b"may").unwrap();

    let check = check_month(&paths, d(2025, 5, 31));
    let june = book_path(&paths.book_dir, YearMonth { year: 2025, month: 6 });
    assert_eq!(check.provision, Provision::Created { path: june.clone(), bytes: 12_000 });
    assert_eq!(fs::metadata(&june).unwrap().len(), 12_000);
    assert_eq!(fs::read_to_string(paths.last_created_path()).unwrap(), "2025-06");
    assert_eq!(read_last_created(&paths), Some(YearMonth { year: 2025, month: 6 }));
    // The date's own month still wins.
    assert_eq!(check.workbook, Some(book_path(&paths.book_dir, YearMonth { year: 2025, month: 5 })));
}

#[test]
fn ordinary_day_creates_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let paths = layout(dir.path());
    write_template(&paths, 12_000);

    let check = check_month(&paths, d(2025, 5, 15));
    assert_eq!(check.provision, Provision::NotMonthEnd);
    assert!(!book_path(&paths.book_dir, YearMonth { year: 2025, month: 6 }).exists());
    assert!(!paths.last_created_path().exists());
    assert_eq!(check.workbook, None);
}

#[test]
fn small_or_missing_template_is_not_copied() {
    let dir = tempfile::tempdir().unwrap();
    let paths = layout(dir.path());
    let june = book_path(&paths.book_dir, YearMonth { year: 2025, month: 6 });

    let check = check_month(&paths, d(2025, 5, 31));
    assert!(matches!(check.provision, Provision::TemplateMissing(_)));

    write_template(&paths, 9_999);
    let check = check_month(&paths, d(2025, 5, 31));
    assert!(matches!(check.provision, Provision::TemplateTooSmall { bytes: 9_999, .. }));
    assert!(!june.exists());
    assert!(!paths.last_created_path().exists());
}

#[test]
fn existing_next_workbook_is_left_alone() {
    let dir = tempfile::tempdir().unwrap();
    let paths = layout(dir.path());
    write_template(&paths, 12_000);
    let june = book_path(&paths.book_dir, YearMonth { year: 2025, month: 6 });
    fs::write(&june, b"june").unwrap();

    let check = check_month(&paths, d(2025, 5, 31));
    assert_eq!(check.provision, Provision::AlreadyExists(june.clone()));
    assert_eq!(fs::read(&june).unwrap(), b"june");
    // No May workbook: month-end falls through to June.
    assert_eq!(check.workbook, Some(june));
}

#[test]
fn falls_back_to_newest_workbook() {
    let dir = tempfile::tempdir().unwrap();
    let paths = layout(dir.path());
    for (y, m) in [(2024, 12), (2025, 2), (2025, 10), (2024, 11)] {
        fs::write(book_path(&paths.book_dir, YearMonth { year: y, month: m }), b"x").unwrap();
    }
    fs::write(paths.book_dir.join("notes.txt"), b"x").unwrap();

    let newest = book_path(&paths.book_dir, YearMonth { year: 2025, month: 10 });
    assert_eq!(find_latest_book(&paths.book_dir), Some(newest.clone()));
    assert_eq!(resolve_workbook(&paths, d(2025, 5, 12)), Some(newest));
}

#[test]
fn missing_book_dir_is_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let mut paths = PathOptions::rooted_at(dir.path());
    paths.book_dir = dir.path().join("share-offline");

    let check = check_month(&paths, d(2025, 5, 12));
    assert_eq!(check.workbook, None);
}
