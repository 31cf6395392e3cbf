// src/core/dates.rs
//! Date tokens from the command line and the calendar arithmetic that the
//! workbook layout depends on.
use std::fmt;

use chrono::{Datelike, Duration, NaiveDate};

use crate::{Error, Result};

const TOKEN_FMT: &str = "%Y%m%d";

/// Inclusive day range. `start <= end` always holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(Error::Validation(format!(
                "end date {} is before start date {}",
                end.format(TOKEN_FMT),
                start.format(TOKEN_FMT)
            )));
        }
        Ok(Self { start, end })
    }

    pub fn single(day: NaiveDate) -> Self {
        Self { start: day, end: day }
    }

    pub fn start(&self) -> NaiveDate { self.start }
    pub fn end(&self) -> NaiveDate { self.end }
    pub fn is_single(&self) -> bool { self.start == self.end }

    /// Every day from start to end, inclusive.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    pub fn len_days(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }

    /// `YYYYMMDD` or `YYYYMMDD-YYYYMMDD`; also the CSV directory name.
    pub fn token(&self) -> String {
        if self.is_single() {
            token_of(self.start)
        } else {
            format!("{}-{}", token_of(self.start), token_of(self.end))
        }
    }

    /// Output file-name prefix: empty for one day, `start-end_` otherwise.
    pub fn file_prefix(&self) -> String {
        if self.is_single() { s!() } else { format!("{}_", self.token()) }
    }

    /// Both ends as the portal's date-field text.
    pub fn site_strings(&self) -> (String, String) {
        (site_string_of(self.start), site_string_of(self.end))
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token())
    }
}

pub fn token_of(day: NaiveDate) -> String {
    day.format(TOKEN_FMT).to_string()
}

fn site_string_of(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

/// Strict `YYYYMMDD`: eight ASCII digits forming a real calendar date.
pub fn parse_day(token: &str) -> Result<NaiveDate> {
    if token.len() != 8 || !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::Validation(format!("expected YYYYMMDD, got {token:?}")));
    }
    NaiveDate::parse_from_str(token, TOKEN_FMT)
        .map_err(|_| Error::Validation(format!("not a calendar date: {token:?}")))
}

/// Parse a command-line date token.
///
/// - `"default"` or empty: yesterday relative to `today`
/// - `YYYYMMDD`: that day
/// - `YYYYMMDD-YYYYMMDD`: inclusive range, end not before start
pub fn parse_date_range(token: &str, today: NaiveDate) -> Result<DateRange> {
    let token = token.trim();
    if token.is_empty() || token == "default" {
        return Ok(DateRange::single(today - Duration::days(1)));
    }

    if token.contains('-') {
        let parts: Vec<&str> = token.split('-').collect();
        if parts.len() != 2 {
            return Err(Error::Validation(format!("expected START-END, got {token:?}")));
        }
        let start = parse_day(parts[0])?;
        let end = parse_day(parts[1])?;
        return DateRange::new(start, end);
    }

    Ok(DateRange::single(parse_day(token)?))
}

/// `YYYYMMDD` → `YYYY-MM-DD`, the text the portal's date fields hold.
/// Pure re-slicing; no calendar validation.
pub fn format_date_for_site(token: &str) -> Result<String> {
    if token.len() != 8 || !token.is_ascii() {
        return Err(Error::Validation(format!("expected 8 characters, got {token:?}")));
    }
    Ok(format!("{}-{}-{}", &token[..4], &token[4..6], &token[6..8]))
}

pub fn is_last_day_of_month(day: NaiveDate) -> bool {
    (day + Duration::days(1)).day() == 1
}

pub fn first_of_next_month(day: NaiveDate) -> NaiveDate {
    let (y, m) = if day.month() == 12 { (day.year() + 1, 1) } else { (day.year(), day.month() + 1) };
    // Day 1 of a valid month always exists.
    NaiveDate::from_ymd_opt(y, m, 1).unwrap_or(day)
}

pub fn last_day_of_previous_month(day: NaiveDate) -> NaiveDate {
    day.with_day(1).unwrap_or(day) - Duration::days(1)
}

/// Worksheet row that receives the day's totals.
///
/// Row 4 is the 1st of the month, so a day lands at `day + 3`. On the 1st the
/// row belongs to the previous month's last day, one row further down.
/// Keyed on the processing day, not the report's target date.
pub fn totals_row_for(today: NaiveDate) -> u32 {
    if today.day() == 1 {
        last_day_of_previous_month(today).day() + 4
    } else {
        today.day() + 3
    }
}
