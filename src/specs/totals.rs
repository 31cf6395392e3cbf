// src/specs/totals.rs
//! GROSS/NET from the `[total]` row of a campaign export.
//!
//! Layout contract (campaign report CSV, export layout v1):
//! - one header line, then one line per campaign, then a `[total]` line;
//! - at least 15 comma-separated fields per line;
//! - field 13 is GROSS, field 14 is NET, numbers possibly quoted.
//!
//! If the portal reorders columns these indices silently point at the wrong
//! numbers. The width guard below catches dropped columns; a reorder still
//! needs a human to notice.
use std::path::Path;

use crate::core::encoding;
use crate::{Error, Result};

pub const TOTAL_MARKER: &str = "[total]";

/// Layout v1 field positions.
pub const GROSS_FIELD: usize = 13;
pub const NET_FIELD: usize = 14;
pub const MIN_TOTAL_FIELDS: usize = 15;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TotalsRecord {
    pub gross: i64,
    pub net: i64,
}

/// Which campaign export a totals figure came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CampaignKind {
    General,
    Adult,
}

impl CampaignKind {
    pub fn label(self) -> &'static str {
        match self {
            CampaignKind::General => "general",
            CampaignKind::Adult => "adult",
        }
    }
}

/// Read `path` under its detected encoding and pull GROSS/NET from the
/// last `[total]` line.
pub fn extract_totals(path: &Path, kind: CampaignKind) -> Result<TotalsRecord> {
    let (text, enc) = encoding::read_to_string_detected(path)?;
    logf!("{} campaign CSV {} decoded as {}", kind.label(), path.display(), enc);
    let totals = totals_from_text(&text, kind)?;
    logf!("{} campaign totals: GROSS={} NET={}", kind.label(), totals.gross, totals.net);
    Ok(totals)
}

pub fn totals_from_text(text: &str, kind: CampaignKind) -> Result<TotalsRecord> {
    let context = format!("{} campaign CSV", kind.label());
    let lines: Vec<&str> = text.lines().collect();
    logd!("{context}: {} lines", lines.len());

    check_header_width(&lines, &context)?;

    let total_line = lines
        .iter()
        .rev()
        .find(|l| l.contains(TOTAL_MARKER))
        .ok_or_else(|| Error::parse(&context, format!("no {TOTAL_MARKER} row")))?;
    logd!("{context}: total row {}", total_line.trim());

    let fields: Vec<&str> = total_line.split(',').collect();
    if fields.len() < MIN_TOTAL_FIELDS {
        return Err(Error::parse(
            &context,
            format!("{TOTAL_MARKER} row has {} fields, need {MIN_TOTAL_FIELDS}", fields.len()),
        ));
    }

    Ok(TotalsRecord {
        gross: parse_amount(fields[GROSS_FIELD], "GROSS", &context)?,
        net: parse_amount(fields[NET_FIELD], "NET", &context)?,
    })
}

/// At least one non-total line (normally the header) must be as wide as the
/// layout. A narrower export means columns were dropped and field 13/14 no
/// longer hold GROSS/NET.
fn check_header_width(lines: &[&str], context: &str) -> Result<()> {
    let widest = lines
        .iter()
        .filter(|l| !l.trim().is_empty() && !l.contains(TOTAL_MARKER))
        .map(|l| l.split(',').count())
        .max();
    match widest {
        Some(width) if width < MIN_TOTAL_FIELDS => Err(Error::Layout(format!(
            "{context}: widest row has {width} columns, layout v1 needs at least {MIN_TOTAL_FIELDS}"
        ))),
        _ => Ok(()),
    }
}

/// `"1,000"` never reaches here: fields are split on raw commas, so quoted
/// thousands separators would already have shifted the row.
fn parse_amount(field: &str, name: &str, context: &str) -> Result<i64> {
    let raw = field.trim().trim_matches('"').trim();
    let value: f64 = raw
        .parse()
        .map_err(|_| Error::parse(context, format!("{name} field {raw:?} is not a number")))?;
    if !value.is_finite() {
        return Err(Error::parse(context, format!("{name} field {raw:?} is not finite")));
    }
    Ok(round_half_away(value))
}

/// Nearest integer, halves away from zero: 500.5 → 501, -0.5 → -1.
pub fn round_half_away(v: f64) -> i64 {
    v.round() as i64
}
