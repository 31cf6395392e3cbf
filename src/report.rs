// src/report.rs
use std::fmt;
use std::path::{Path, PathBuf};

use crate::core::DateRange;

/// The three exports pulled from the portal for each date (or range).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReportMode {
    General,
    Adult,
    Advertiser,
}

impl ReportMode {
    pub const ALL: [ReportMode; 3] = [ReportMode::General, ReportMode::Adult, ReportMode::Advertiser];

    /// File name inside the per-date CSV directory.
    pub fn file_name(self) -> &'static str {
        match self {
            ReportMode::General => "general_campane.csv",
            ReportMode::Adult => "adult_campane.csv",
            ReportMode::Advertiser => "advertiser.csv",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ReportMode::General => "general",
            ReportMode::Adult => "adult",
            ReportMode::Advertiser => "advertiser",
        }
    }

    pub fn is_campaign(self) -> bool {
        !matches!(self, ReportMode::Advertiser)
    }
}

impl fmt::Display for ReportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Where the three exports of one date range live.
///
/// Single day: `csv/20250512/general_campane.csv`.
/// Batch range: `csv/20250512-20250515/20250512-20250515_general_campane.csv`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CsvLayout {
    pub dir: PathBuf,
    prefix: String,
}

impl CsvLayout {
    pub fn for_range(csv_base_dir: &Path, range: &DateRange) -> Self {
        Self {
            dir: csv_base_dir.join(range.token()),
            prefix: range.file_prefix(),
        }
    }

    pub fn path(&self, mode: ReportMode) -> PathBuf {
        self.dir.join(format!("{}{}", self.prefix, mode.file_name()))
    }
}

/// One export, as captured from the browser and copied into place.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloadedArtifact {
    pub mode: ReportMode,
    /// Copy in the staging directory.
    pub source_path: PathBuf,
    /// Canonical copy in the CSV directory.
    pub final_path: PathBuf,
    pub range: DateRange,
    pub bytes: u64,
}
