// src/browser/download.rs
use std::path::Path;

use super::{Page, protocol};
use crate::config::AppOptions;
use crate::core::DateRange;
use crate::file;
use crate::report::{CsvLayout, DownloadedArtifact, ReportMode};
use crate::{Error, Result};

/// Trigger the export on the current screen and put the file in place:
/// staging copy under `staging_dir/<suggested name>`, checked for presence
/// and non-zero size, then copied to its name in `layout`.
pub fn capture<P: Page + ?Sized>(
    page: &mut P,
    mode: ReportMode,
    range: &DateRange,
    layout: &CsvLayout,
    staging_dir: &Path,
    opts: &AppOptions,
) -> Result<DownloadedArtifact> {
    logf!("{mode}: exporting CSV");
    let download = page.export_download(protocol::EXPORT_SCRIPT, opts.timeouts.download)?;
    if download.suggested_filename.is_empty() {
        return Err(Error::Download(format!("{mode}: browser reported a download with no name")));
    }

    // The driver reports absolute paths; a relative staging dir must match them.
    let source_path = std::path::absolute(staging_dir)?.join(&download.suggested_filename);
    if std::path::absolute(&download.path)? != source_path {
        file::copy_verified(&download.path, &source_path)?;
    }

    let bytes = match file::file_size(&source_path) {
        None => {
            return Err(Error::Download(format!("{mode}: {} does not exist", source_path.display())));
        }
        Some(0) => {
            return Err(Error::Download(format!("{mode}: {} is empty", source_path.display())));
        }
        Some(n) => n,
    };
    logf!("{mode}: staged {} ({bytes} bytes)", source_path.display());

    let final_path = layout.path(mode);
    file::copy_verified(&source_path, &final_path)?;
    logf!("{mode}: saved {}", final_path.display());

    let wait = if mode.is_campaign() { opts.waits.after_export } else { opts.waits.before_close };
    settle!(wait, "after export");

    Ok(DownloadedArtifact { mode, source_path, final_path, range: *range, bytes })
}
