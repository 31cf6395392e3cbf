// src/browser/session.rs
use std::path::{Path, PathBuf};

use super::{Browser, Page, download, protocol};
use crate::config::AppOptions;
use crate::core::DateRange;
use crate::report::{CsvLayout, DownloadedArtifact, ReportMode};
use crate::Result;

/// One logged-in browser session covering one date range.
///
/// The session is closed on every path out: explicitly through
/// [`ReportSession::close`], or on drop after an error.
pub struct ReportSession<P: Page> {
    page: P,
    range: DateRange,
    staging_dir: PathBuf,
    closed: bool,
}

impl<P: Page> ReportSession<P> {
    /// Launch a browser downloading into `staging_dir` and log in.
    pub fn open<B>(browser: &B, opts: &AppOptions, range: DateRange, staging_dir: &Path) -> Result<Self>
    where
        B: Browser<Page = P>,
    {
        let page = browser.launch(opts, staging_dir)?;
        Self::start(page, opts, range, staging_dir)
    }

    /// Log in on an already open page.
    pub fn start(page: P, opts: &AppOptions, range: DateRange, staging_dir: &Path) -> Result<Self> {
        let mut session = Self { page, range, staging_dir: staging_dir.to_path_buf(), closed: false };
        protocol::login(&mut session.page, opts)?;
        Ok(session)
    }

    pub fn range(&self) -> &DateRange {
        &self.range
    }

    pub fn page_mut(&mut self) -> &mut P {
        &mut self.page
    }

    /// Prepare and export one report.
    pub fn fetch(&mut self, mode: ReportMode, layout: &CsvLayout, opts: &AppOptions) -> Result<DownloadedArtifact> {
        protocol::prepare_report(&mut self.page, mode, &self.range, opts)?;
        download::capture(&mut self.page, mode, &self.range, layout, &self.staging_dir, opts)
    }

    /// General, Adult, Advertiser in that order. The first failure ends the
    /// session: the date counts as failed.
    pub fn fetch_all(&mut self, layout: &CsvLayout, opts: &AppOptions) -> Result<Vec<DownloadedArtifact>> {
        let mut out = Vec::with_capacity(ReportMode::ALL.len());
        for (i, mode) in ReportMode::ALL.into_iter().enumerate() {
            if i > 0 {
                settle!(opts.waits.between_steps, "between exports");
            }
            let artifact = self.fetch(mode, layout, opts).inspect_err(|e| {
                loge!("{mode} export for {} failed: {e}", self.range);
            })?;
            out.push(artifact);
        }
        Ok(out)
    }

    pub fn close(mut self) -> Result<()> {
        self.closed = true;
        self.page.close()
    }
}

impl<P: Page> Drop for ReportSession<P> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(e) = self.page.close() {
            logw!("closing browser session after failure: {e}");
        }
    }
}
