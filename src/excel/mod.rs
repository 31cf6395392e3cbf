// src/excel/mod.rs
//! Spreadsheet seam. Transcription talks to [`SpreadsheetApp`] and
//! [`Workbook`]; the shipped backend drives Excel through PowerShell COM.
use std::fmt;
use std::path::Path;

use crate::Result;

pub mod com;
pub mod transcribe;

pub use com::ComExcel;
pub use transcribe::{TranscribeInputs, TranscribeSummary, transcribe};

/// A single cell address, 1-based column and row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellRef {
    pub column: u32,
    pub row: u32,
}

impl CellRef {
    pub fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// `B2` style address.
    pub fn a1(&self) -> String {
        format!("{}{}", column_name(self.column), self.row)
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.a1())
    }
}

/// 1 → A, 26 → Z, 27 → AA.
pub fn column_name(mut n: u32) -> String {
    let mut out = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        out.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

#[derive(Clone, Debug, PartialEq)]
pub enum CellValue {
    /// Written as typed text; Excel still converts numeric-looking strings.
    Text(String),
    Int(i64),
    Empty,
}

impl From<&str> for CellValue {
    fn from(v: &str) -> Self {
        CellValue::Text(s!(v))
    }
}

impl From<String> for CellValue {
    fn from(v: String) -> Self {
        CellValue::Text(v)
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        CellValue::Int(v)
    }
}

/// An open workbook.
pub trait Workbook {
    fn clear_contents(&mut self, sheet: &str, range: &str) -> Result<()>;
    fn set_value(&mut self, sheet: &str, cell: CellRef, value: CellValue) -> Result<()>;
    /// Run a VBA macro stored in this workbook.
    fn run_macro(&mut self, name: &str) -> Result<()>;
    fn save(&mut self) -> Result<()>;
    fn close(&mut self) -> Result<()>;
}

/// The spreadsheet application.
pub trait SpreadsheetApp {
    type Book: Workbook;

    /// Kill every running instance, including ones the user opened.
    fn terminate_running(&self) -> Result<()>;
    /// Open invisibly with alerts off.
    fn open(&self, path: &Path) -> Result<Self::Book>;
    fn quit(&self) -> Result<()>;
}
