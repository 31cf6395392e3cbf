// src/pipeline.rs
//! Sequencing: fetch the exports, pick the workbook, transcribe.
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::{
    browser::{Browser, ReportSession},
    config::AppOptions,
    core::DateRange,
    excel::{SpreadsheetApp, TranscribeInputs, TranscribeSummary},
    file,
    progress::Progress,
    report::{CsvLayout, DownloadedArtifact},
    rollover::{self, MonthCheck},
    Error, Result,
};

/// One browser session's worth of work: a single day, or the whole range in
/// batch mode.
#[derive(Debug)]
pub struct UnitResult {
    pub range: DateRange,
    pub layout: CsvLayout,
    pub result: Result<Vec<DownloadedArtifact>>,
}

impl UnitResult {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

#[derive(Debug)]
pub struct FetchOutcome {
    pub batch: bool,
    pub units: Vec<UnitResult>,
}

impl FetchOutcome {
    pub fn succeeded(&self) -> usize {
        self.units.iter().filter(|u| u.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.units.len() - self.succeeded()
    }

    pub fn all_ok(&self) -> bool {
        !self.units.is_empty() && self.failed() == 0
    }

    /// Directory to report: the batch directory, or the first date's
    /// directory in individual mode. `None` when that unit failed.
    pub fn primary_dir(&self) -> Option<&Path> {
        self.units.first().filter(|u| u.is_ok()).map(|u| u.layout.dir.as_path())
    }
}

/// Sessions a range is split into.
pub fn plan_units(range: &DateRange, batch: bool) -> Vec<DateRange> {
    if batch || range.is_single() {
        vec![*range]
    } else {
        range.days().map(DateRange::single).collect()
    }
}

/// Download all three exports for `range`, per the configured processing mode.
/// Failures are recorded per unit; later units still run.
pub fn fetch<B: Browser>(
    browser: &B,
    opts: &AppOptions,
    range: &DateRange,
    mut progress: Option<&mut dyn Progress>,
) -> FetchOutcome {
    let batch = opts.batch_mode;
    let plan = plan_units(range, batch);
    logf!(
        "fetching {range} in {} mode ({} session(s))",
        if batch { "batch" } else { "individual" },
        plan.len()
    );
    if let Some(p) = progress.as_deref_mut() {
        p.begin(plan.len());
    }

    let mut units = Vec::with_capacity(plan.len());
    for (i, unit) in plan.into_iter().enumerate() {
        if i > 0 {
            settle!(opts.waits.between_steps, "between sessions");
        }
        let layout = CsvLayout::for_range(&opts.paths.csv_base_dir, &unit);
        let result = fetch_unit(browser, opts, &unit, &layout);
        if let Some(p) = progress.as_deref_mut() {
            match &result {
                Ok(_) => p.item_done(&unit),
                Err(e) => p.item_failed(&unit, e),
            }
        }
        units.push(UnitResult { range: unit, layout, result });
    }

    let outcome = FetchOutcome { batch, units };
    if let Some(p) = progress.as_deref_mut() {
        if !batch {
            p.log(&format!("individual mode: {} succeeded, {} failed", outcome.succeeded(), outcome.failed()));
        }
        p.finish();
    }
    outcome
}

fn fetch_unit<B: Browser>(
    browser: &B,
    opts: &AppOptions,
    range: &DateRange,
    layout: &CsvLayout,
) -> Result<Vec<DownloadedArtifact>> {
    let staging = &opts.paths.tmp_dir;
    file::clear_dir_files(staging)?;
    file::ensure_directory(&layout.dir)?;

    let mut session = ReportSession::open(browser, opts, *range, staging)?;
    let artifacts = session.fetch_all(layout, opts)?;
    settle!(opts.waits.before_close, "before closing the browser");
    session.close()?;
    logf!("{range}: {} exports in {}", artifacts.len(), layout.dir.display());
    Ok(artifacts)
}

/// Month-end provisioning and workbook resolution for the range's start date.
pub fn check_month(opts: &AppOptions, range: &DateRange) -> MonthCheck {
    rollover::check_month(&opts.paths, range.start())
}

/// CSV layout transcription reads: the batch files for a multi-day range in
/// batch mode, otherwise the start date's directory.
pub fn transcribe_layout(opts: &AppOptions, range: &DateRange) -> CsvLayout {
    if opts.batch_mode || range.is_single() {
        CsvLayout::for_range(&opts.paths.csv_base_dir, range)
    } else {
        CsvLayout::for_range(&opts.paths.csv_base_dir, &DateRange::single(range.start()))
    }
}

/// Resolve the workbook for `range` and transcribe into it.
pub fn transcribe<A: SpreadsheetApp>(
    app: &A,
    opts: &AppOptions,
    range: &DateRange,
    today: NaiveDate,
) -> Result<(PathBuf, TranscribeSummary)> {
    let workbook = rollover::resolve_workbook(&opts.paths, range.start()).ok_or_else(|| {
        Error::Resource(rollover::book_path(
            &opts.paths.book_dir,
            rollover::YearMonth::of(range.start()),
        ))
    })?;
    let inputs = TranscribeInputs::from_layout(&transcribe_layout(opts, range), &workbook);
    let summary = crate::excel::transcribe(app, &inputs, today)?;
    Ok((workbook, summary))
}

/// What a full run produced. `transcribed` is `None` when no workbook
/// resolved; the CSVs are still in `csv_dir`.
#[derive(Debug)]
pub struct RunOutcome {
    pub csv_dir: PathBuf,
    pub transcribed: Option<(PathBuf, TranscribeSummary)>,
}

impl RunOutcome {
    pub fn workbook(&self) -> Option<&Path> {
        self.transcribed.as_ref().map(|(p, _)| p.as_path())
    }
}

/// fetch → month check → transcribe. A failed fetch or transcription is an
/// error; a missing workbook is not.
pub fn run<B: Browser, A: SpreadsheetApp>(
    browser: &B,
    app: &A,
    opts: &AppOptions,
    range: &DateRange,
    today: NaiveDate,
    progress: Option<&mut dyn Progress>,
) -> Result<RunOutcome> {
    let fetched = fetch(browser, opts, range, progress);
    if !fetched.all_ok() {
        return Err(Error::Download(format!(
            "{} of {} session(s) failed for {range}",
            fetched.failed(),
            fetched.units.len()
        )));
    }

    let layout = transcribe_layout(opts, range);
    let csv_dir = layout.dir.clone();

    let month = check_month(opts, range);
    logd!("month check: {:?}", month.provision);
    let Some(workbook) = month.workbook else {
        logw!("no workbook to transcribe into; CSVs kept in {}", csv_dir.display());
        return Ok(RunOutcome { csv_dir, transcribed: None });
    };

    let inputs = TranscribeInputs::from_layout(&layout, &workbook);
    let summary = crate::excel::transcribe(app, &inputs, today)?;
    Ok(RunOutcome { csv_dir, transcribed: Some((workbook, summary)) })
}
