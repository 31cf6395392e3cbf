// src/excel/transcribe.rs
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use super::{CellRef, CellValue, SpreadsheetApp, Workbook};
use crate::config::consts::*;
use crate::core::dates::totals_row_for;
use crate::report::{CsvLayout, ReportMode};
use crate::specs::advertiser::{self, AdvertiserRow};
use crate::specs::totals::{self, CampaignKind, TotalsRecord};
use crate::Result;

// Reference sheet columns.
const COL_ID: u32 = 2; // B
const COL_NAME: u32 = 3; // C
const COL_PLACEHOLDER: u32 = 4; // D
const COL_AGENCY: u32 = 5; // E
const COL_FIRST_METRIC: u32 = 6; // F..=M

// Campaign sheets.
const COL_GROSS: u32 = 10; // J
const COL_NET: u32 = 11; // K

/// The three exports of one date and the workbook they go into.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TranscribeInputs {
    pub advertiser_csv: PathBuf,
    pub general_csv: PathBuf,
    pub adult_csv: PathBuf,
    pub workbook: PathBuf,
}

impl TranscribeInputs {
    pub fn from_layout(layout: &CsvLayout, workbook: &Path) -> Self {
        Self {
            advertiser_csv: layout.path(ReportMode::Advertiser),
            general_csv: layout.path(ReportMode::General),
            adult_csv: layout.path(ReportMode::Adult),
            workbook: workbook.to_path_buf(),
        }
    }

    /// Expected CSVs that are not on disk. Each one is logged.
    pub fn missing_csvs(&self) -> Vec<&Path> {
        let missing: Vec<&Path> = [&self.advertiser_csv, &self.general_csv, &self.adult_csv]
            .into_iter()
            .map(PathBuf::as_path)
            .filter(|p| !p.is_file())
            .collect();
        for p in &missing {
            logw!("expected CSV not found: {}", p.display());
        }
        missing
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TranscribeSummary {
    pub rows_written: usize,
    pub rows_skipped: usize,
    pub totals_row: u32,
    pub general: TotalsRecord,
    pub adult: TotalsRecord,
}

/// Quits and kills the application however transcription ends.
struct AppCleanup<'a, A: SpreadsheetApp>(&'a A);

impl<A: SpreadsheetApp> Drop for AppCleanup<'_, A> {
    fn drop(&mut self) {
        if let Err(e) = self.0.quit() {
            logw!("spreadsheet quit failed: {e}");
        }
        if let Err(e) = self.0.terminate_running() {
            logw!("spreadsheet cleanup failed: {e}");
        }
    }
}

/// Write one date's exports into the progress workbook and run its macro.
///
/// Totals are extracted before the workbook is opened, so a bad campaign
/// export never leaves a half-written workbook. `today` picks the totals row.
pub fn transcribe<A: SpreadsheetApp>(app: &A, inputs: &TranscribeInputs, today: NaiveDate) -> Result<TranscribeSummary> {
    logf!("transcribing into {}", inputs.workbook.display());
    app.terminate_running()?;
    let _cleanup = AppCleanup(app);

    let missing = inputs.missing_csvs().len();
    if missing > 0 {
        logw!("{missing} expected CSV(s) missing; continuing");
    }
    let general = totals::extract_totals(&inputs.general_csv, CampaignKind::General)?;
    let adult = totals::extract_totals(&inputs.adult_csv, CampaignKind::Adult)?;
    let sheet = advertiser::read_advertiser_csv(&inputs.advertiser_csv)?;

    let mut book = app.open(&inputs.workbook)?;

    book.clear_contents(SHEET_REFERENCE, REFERENCE_CLEAR_RANGE)?;
    logf!("cleared {SHEET_REFERENCE}!{REFERENCE_CLEAR_RANGE}");

    let mut row = REFERENCE_FIRST_ROW;
    let mut rows_skipped = 0;
    for (idx, adv) in sheet.data_rows() {
        if !adv.is_complete() {
            logw!("row {idx} has {} fields, skipped: {:?}", adv.len(), adv.fields());
            rows_skipped += 1;
            continue;
        }
        write_advertiser_row(&mut book, row, &adv)?;
        row += 1;
    }
    let rows_written = (row - REFERENCE_FIRST_ROW) as usize;
    logf!("{rows_written} advertiser rows written, {rows_skipped} skipped");

    let totals_row = totals_row_for(today);
    logf!("totals row {totals_row} (today {today})");
    for (sheet_name, t) in [(SHEET_GENERAL, general), (SHEET_ADULT, adult)] {
        book.set_value(sheet_name, CellRef::new(COL_GROSS, totals_row), t.gross.into())?;
        book.set_value(sheet_name, CellRef::new(COL_NET, totals_row), t.net.into())?;
        logf!("{sheet_name} row {totals_row}: GROSS={} NET={}", t.gross, t.net);
    }

    logf!("running macro {POST_PROCESS_MACRO}");
    book.run_macro(POST_PROCESS_MACRO)?;
    book.save()?;
    book.close()?;

    Ok(TranscribeSummary { rows_written, rows_skipped, totals_row, general, adult })
}

fn write_advertiser_row<W: Workbook>(book: &mut W, row: u32, adv: &AdvertiserRow) -> Result<()> {
    let agency = adv.agency_name();
    book.set_value(SHEET_REFERENCE, CellRef::new(COL_ID, row), adv.id().into())?;
    book.set_value(SHEET_REFERENCE, CellRef::new(COL_NAME, row), adv.name().into())?;
    book.set_value(SHEET_REFERENCE, CellRef::new(COL_PLACEHOLDER, row), CellValue::Empty)?;
    book.set_value(SHEET_REFERENCE, CellRef::new(COL_AGENCY, row), agency.as_str().into())?;
    for (offset, value) in adv.metrics() {
        book.set_value(SHEET_REFERENCE, CellRef::new(COL_FIRST_METRIC + offset as u32, row), value.into())?;
    }
    logd!("reference row {row}: {} / {} / {agency}", adv.id(), adv.name());
    Ok(())
}
