// src/progress.rs
use crate::core::DateRange;
use crate::Error;

/// Lightweight progress reporting for multi-date fetches.
/// Frontends implement this to surface status to users.
pub trait Progress {
    /// Called at the start with the number of browser sessions planned.
    fn begin(&mut self, _total: usize) {}

    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    /// One date (or batch range) exported all three reports.
    fn item_done(&mut self, _range: &DateRange) {}

    fn item_failed(&mut self, _range: &DateRange, _err: &Error) {}

    /// Called at the end, successful or not.
    fn finish(&mut self) {}
}

/// Counts and logs `[n/total]` lines.
#[derive(Debug, Default)]
pub struct LogProgress {
    total: usize,
    pub done: usize,
    pub failed: usize,
}

impl Progress for LogProgress {
    fn begin(&mut self, total: usize) {
        self.total = total;
        if total > 1 { logf!("{total} sessions planned"); }
    }

    fn log(&mut self, msg: &str) {
        logf!("{msg}");
    }

    fn item_done(&mut self, range: &DateRange) {
        self.done += 1;
        logf!("[{}/{}] {range} done", self.done + self.failed, self.total);
    }

    fn item_failed(&mut self, range: &DateRange, err: &Error) {
        self.failed += 1;
        loge!("[{}/{}] {range} failed: {err}", self.done + self.failed, self.total);
    }

    fn finish(&mut self) {
        logf!("finished: {} succeeded, {} failed", self.done, self.failed);
    }
}
