// src/rollover.rs
//! Which progress workbook a date belongs to, and creating next month's
//! workbook from the template on the last day of a month.
//!
//! Nothing here is fatal: a missing share, template or workbook is logged and
//! the caller gets `None`.
use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use chrono::{Datelike, NaiveDate};
use regex::Regex;

use crate::config::consts::MIN_TEMPLATE_BYTES;
use crate::config::options::PathOptions;
use crate::core::dates::{first_of_next_month, is_last_day_of_month};
use crate::file;
use crate::Result;

const BOOK_NAME_PATTERN: &str = r"^新(\d{4})年(\d{1,2})月fam8進捗\.xlsm$";

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(day: NaiveDate) -> Self {
        Self { year: day.year(), month: day.month() }
    }

    pub fn next(self) -> Self {
        if self.month == 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }

    /// `新2025年5月fam8進捗.xlsm`; the month has no leading zero.
    pub fn book_file_name(self) -> String {
        format!("新{}年{}月fam8進捗.xlsm", self.year, self.month)
    }

    /// Marker form, `YYYY-MM`.
    pub fn parse(text: &str) -> Option<Self> {
        let (y, m) = text.trim().split_once('-')?;
        let year = y.parse().ok()?;
        let month = m.parse().ok()?;
        (1..=12).contains(&month).then_some(Self { year, month })
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

pub fn book_path(book_dir: &Path, ym: YearMonth) -> PathBuf {
    book_dir.join(ym.book_file_name())
}

/// Year and month encoded in a workbook file name, if it is one.
pub fn parse_book_file_name(name: &str) -> Option<YearMonth> {
    let re = Regex::new(BOOK_NAME_PATTERN).ok()?;
    let caps = re.captures(name)?;
    let year = caps.get(1)?.as_str().parse().ok()?;
    let month: u32 = caps.get(2)?.as_str().parse().ok()?;
    (1..=12).contains(&month).then_some(YearMonth { year, month })
}

/// Newest workbook in `book_dir` by the year/month in its name.
pub fn find_latest_book(book_dir: &Path) -> Option<PathBuf> {
    let entries = match fs::read_dir(book_dir) {
        Ok(rd) => rd,
        Err(e) => {
            loge!("workbook directory {} not readable: {e}", book_dir.display());
            return None;
        }
    };
    let latest = entries
        .filter_map(|e| e.ok())
        .filter_map(|e| {
            let name = e.file_name().to_string_lossy().into_owned();
            parse_book_file_name(&name).map(|ym| (ym, e.path()))
        })
        .max_by_key(|(ym, _)| *ym);
    match latest {
        Some((ym, path)) => {
            logf!("latest workbook is {ym}: {}", path.display());
            Some(path)
        }
        None => {
            loge!("no progress workbook in {}", book_dir.display());
            None
        }
    }
}

/// Outcome of the month-end provisioning step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Provision {
    NotMonthEnd,
    AlreadyExists(PathBuf),
    TemplateMissing(PathBuf),
    TemplateTooSmall { template: PathBuf, bytes: u64 },
    Created { path: PathBuf, bytes: u64 },
    CopyFailed(String),
}

pub fn read_last_created(paths: &PathOptions) -> Option<YearMonth> {
    let text = fs::read_to_string(paths.last_created_path()).ok()?;
    YearMonth::parse(&text)
}

pub fn write_last_created(paths: &PathOptions, ym: YearMonth) -> Result<()> {
    file::ensure_directory(&paths.meta_dir)?;
    fs::write(paths.last_created_path(), ym.to_string())?;
    logf!("marker updated: {ym}");
    Ok(())
}

/// On the last day of a month, copy the template to next month's workbook
/// unless it already exists. The marker is written only after a verified copy.
pub fn provision_next_month(paths: &PathOptions, day: NaiveDate) -> Provision {
    if !is_last_day_of_month(day) {
        return Provision::NotMonthEnd;
    }
    let next = YearMonth::of(first_of_next_month(day));
    let target = book_path(&paths.book_dir, next);
    logf!("{day} is month-end; checking {}", target.display());

    if target.exists() {
        logf!("next month's workbook already exists");
        return Provision::AlreadyExists(target);
    }

    let template = paths.template_path();
    let Some(bytes) = file::file_size(&template) else {
        loge!("template not found: {}; next month's workbook not created", template.display());
        return Provision::TemplateMissing(template);
    };
    logf!("template {} is {bytes} bytes", template.display());
    if bytes < MIN_TEMPLATE_BYTES {
        logw!("template is under {MIN_TEMPLATE_BYTES} bytes, not copying it");
        return Provision::TemplateTooSmall { template, bytes };
    }

    match file::copy_verified(&template, &target) {
        Ok(copied) => {
            logf!("created {} ({copied} bytes)", target.display());
            if let Err(e) = write_last_created(paths, next) {
                logw!("marker not written: {e}");
            }
            Provision::Created { path: target, bytes: copied }
        }
        Err(e) => {
            loge!("copying template to {} failed: {e}", target.display());
            Provision::CopyFailed(e.to_string())
        }
    }
}

/// Workbook for `day`: its own month's, else next month's on month-end,
/// else the newest one present, else none.
pub fn resolve_workbook(paths: &PathOptions, day: NaiveDate) -> Option<PathBuf> {
    let own = book_path(&paths.book_dir, YearMonth::of(day));
    if own.is_file() {
        logf!("using this month's workbook: {}", own.display());
        return Some(own);
    }
    if is_last_day_of_month(day) {
        let next = book_path(&paths.book_dir, YearMonth::of(first_of_next_month(day)));
        if next.is_file() {
            logf!("this month's workbook missing on month-end; using {}", next.display());
            return Some(next);
        }
    }
    if !paths.book_dir.is_dir() {
        loge!("workbook directory not found: {}", paths.book_dir.display());
        return None;
    }
    let latest = find_latest_book(&paths.book_dir);
    if let Some(p) = &latest {
        logw!("no workbook for {day}'s month; falling back to {}", p.display());
    } else {
        logw!("no workbook found; continuing without one");
    }
    latest
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonthCheck {
    pub provision: Provision,
    pub workbook: Option<PathBuf>,
}

/// Month-end provisioning followed by workbook resolution.
pub fn check_month(paths: &PathOptions, day: NaiveDate) -> MonthCheck {
    match read_last_created(paths) {
        Some(ym) => logf!("last provisioned month: {ym}"),
        None => logd!("no provisioning marker yet"),
    }
    logf!("target month workbook: {}", book_path(&paths.book_dir, YearMonth::of(day)).display());
    let provision = provision_next_month(paths, day);
    let workbook = resolve_workbook(paths, day);
    MonthCheck { provision, workbook }
}
