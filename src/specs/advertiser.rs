// src/specs/advertiser.rs
//! Advertiser export: a header block of unknown height, then one row per
//! advertiser whose width drifts between exports.
//!
//! Row shape as exported with the agency-name column enabled:
//! `ID, advertiser, agency, display rate, ..., net` (11 fields when nothing
//! drifted). Older or partially configured exports shift the agency name one
//! or more columns to the right, hence the three-tier lookup in
//! [`AdvertiserRow::agency_name`].
use std::path::Path;

use crate::core::encoding::{self, TextEncoding};
use crate::Result;

/// Tokens that mark a header line (lowercased match).
const HEADER_ID_TOKEN: &str = "id";
const HEADER_ADVERTISER_TOKEN: &str = "広告主";
const HEADER_MANAGEMENT_TOKEN: &str = "広告管理";

/// Rows narrower than this carry no usable advertiser data.
pub const MIN_ROW_FIELDS: usize = 3;

/// Fields 3..=10 map onto the eight metric columns.
pub const METRIC_FIELDS: std::ops::Range<usize> = 3..11;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdvertiserRow {
    fields: Vec<String>,
}

impl AdvertiserRow {
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.fields.len() >= MIN_ROW_FIELDS
    }

    pub fn id(&self) -> &str {
        self.fields.first().map(String::as_str).unwrap_or("")
    }

    pub fn name(&self) -> &str {
        self.fields.get(1).map(String::as_str).unwrap_or("")
    }

    /// Agency name, corrected for column drift:
    /// 1. field 2 if non-blank
    /// 2. field 3 if non-blank
    /// 3. with 5+ fields, every non-blank field from 2 on, space-joined
    pub fn agency_name(&self) -> String {
        let f = &self.fields;
        if let Some(v) = f.get(2).map(|s| s.trim()).filter(|s| !s.is_empty()) {
            return s!(v);
        }
        if let Some(v) = f.get(3).map(|s| s.trim()).filter(|s| !s.is_empty()) {
            return s!(v);
        }
        if f.len() >= 5 {
            return f[2..]
                .iter()
                .map(|c| c.trim())
                .filter(|c| !c.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
        }
        s!()
    }

    /// Metric fields 3..=10 with their offset (0 = first metric column).
    /// Blank values are left out so they never overwrite a cell.
    pub fn metrics(&self) -> impl Iterator<Item = (usize, &str)> {
        self.fields
            .iter()
            .enumerate()
            .skip(METRIC_FIELDS.start)
            .take(METRIC_FIELDS.len())
            .map(|(i, v)| (i - METRIC_FIELDS.start, v.as_str()))
            .filter(|(_, v)| !v.trim().is_empty())
    }
}

/// Parsed advertiser export.
#[derive(Clone, Debug, Default)]
pub struct AdvertiserSheet {
    /// Non-blank rows in file order, header block included.
    pub all_rows: Vec<Vec<String>>,
    /// Index into `all_rows` of the first data row.
    pub data_start: usize,
}

impl AdvertiserSheet {
    pub fn data_rows(&self) -> impl Iterator<Item = (usize, AdvertiserRow)> + '_ {
        self.all_rows[self.data_start..]
            .iter()
            .enumerate()
            .map(|(i, r)| (i + self.data_start, AdvertiserRow::new(r.clone())))
    }

    pub fn data_len(&self) -> usize {
        self.all_rows.len() - self.data_start
    }
}

pub fn read_advertiser_csv(path: &Path) -> Result<AdvertiserSheet> {
    let (text, enc) = encoding::read_to_string_detected(path)?;
    logf!("advertiser CSV {} decoded as {}", path.display(), enc);
    log_text_shape(&text, enc);
    let sheet = parse_advertiser_text(&text)?;
    for (i, row) in sheet.all_rows.iter().take(5).enumerate() {
        logf!("advertiser CSV row {i}: {row:?}");
    }
    logf!(
        "advertiser CSV: {} non-blank rows, {} data rows after header",
        sheet.all_rows.len(),
        sheet.data_len()
    );
    Ok(sheet)
}

pub fn parse_advertiser_text(text: &str) -> Result<AdvertiserSheet> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut all_rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: Vec<String> = record.iter().map(|c| s!(c)).collect();
        if row.iter().any(|c| !c.trim().is_empty()) {
            all_rows.push(row);
        }
    }

    let data_start = find_data_start(&all_rows);
    Ok(AdvertiserSheet { all_rows, data_start })
}

pub fn is_header_row(row: &[String]) -> bool {
    let text = row.join(" ").to_lowercase();
    (text.contains(HEADER_ID_TOKEN) && text.contains(HEADER_ADVERTISER_TOKEN))
        || text.contains(HEADER_MANAGEMENT_TOKEN)
}

/// Data starts after the *last* header-looking row. Rows between an earlier
/// match and the last one are dropped.
pub fn find_data_start(rows: &[Vec<String>]) -> usize {
    let mut start = 0;
    for (i, row) in rows.iter().enumerate() {
        if is_header_row(row) {
            logd!("header row detected at {i}: {row:?}");
            start = i + 1;
        }
    }
    start
}

fn log_text_shape(text: &str, enc: TextEncoding) {
    let head: String = text.chars().take(50).collect();
    logf!("advertiser CSV head ({enc}): {head:?}");
    let endings = if text.contains("\r\n") {
        "CRLF"
    } else if text.contains('\r') {
        "CR"
    } else if text.contains('\n') {
        "LF"
    } else {
        "none"
    };
    logf!("advertiser CSV line endings: {endings}");
}
