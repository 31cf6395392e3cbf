// src/error.rs
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Bad date token or range. Raised before any browser or workbook work.
    #[error("invalid date input: {0}")]
    Validation(String),

    /// The date fields still disagree after the direct-write retry.
    #[error(
        "date range not accepted by the form: expected {expected_start}..{expected_end}, \
         field shows {actual_start:?}..{actual_end:?}"
    )]
    Verification {
        expected_start: String,
        expected_end: String,
        actual_start: String,
        actual_end: String,
    },

    #[error("download failed: {0}")]
    Download(String),

    #[error("{context}: {message}")]
    Parse { context: String, message: String },

    /// The export no longer has the shape the field indices were written for.
    #[error("report layout changed: {0}")]
    Layout(String),

    /// Workbook, template, or input file that should exist does not.
    #[error("missing resource: {}", .0.display())]
    Resource(PathBuf),

    #[error("webdriver {command} failed: {message}")]
    Driver { command: String, message: String },

    #[error("spreadsheet: {0}")]
    Spreadsheet(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl Error {
    pub fn parse(context: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Parse { context: context.into(), message: message.into() }
    }

    pub fn driver(command: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Driver { command: command.into(), message: message.into() }
    }
}
