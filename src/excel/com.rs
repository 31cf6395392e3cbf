// src/excel/com.rs
//! Excel through PowerShell COM automation.
//!
//! Workbook operations are queued and run as one script when the workbook is
//! closed. A workbook dropped before [`Workbook::close`] never touches the
//! file, so a failure mid-transcription leaves no partial writes.
use std::{
    fs,
    path::{Path, PathBuf},
    process::Command,
    thread,
    time::Duration,
};

use super::{CellRef, CellValue, SpreadsheetApp, Workbook};
use crate::config::consts::SPREADSHEET_PROCESS;
use crate::{Error, Result};

const POWERSHELL: &str = "powershell.exe";
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
/// Time for a killed process to release its file locks.
const KILL_SETTLE: Duration = Duration::from_secs(1);

#[derive(Clone, Debug)]
pub struct ComExcel {
    script_dir: PathBuf,
}

impl Default for ComExcel {
    fn default() -> Self {
        Self { script_dir: std::env::temp_dir() }
    }
}

impl ComExcel {
    pub fn new(script_dir: &Path) -> Self {
        Self { script_dir: script_dir.to_path_buf() }
    }
}

impl SpreadsheetApp for ComExcel {
    type Book = ComWorkbook;

    fn terminate_running(&self) -> Result<()> {
        logd!("terminating running {SPREADSHEET_PROCESS} instances");
        match Command::new("taskkill").args(["/F", "/IM", SPREADSHEET_PROCESS]).output() {
            Ok(out) if out.status.success() => {
                logf!("{SPREADSHEET_PROCESS} terminated");
                thread::sleep(KILL_SETTLE);
            }
            // Exit 128: no such process.
            Ok(_) => logd!("no {SPREADSHEET_PROCESS} running"),
            Err(e) => logd!("taskkill unavailable: {e}"),
        }
        Ok(())
    }

    fn open(&self, path: &Path) -> Result<ComWorkbook> {
        if !path.is_file() {
            return Err(Error::Resource(path.to_path_buf()));
        }
        let path = std::path::absolute(path)?;
        logf!("workbook queued for {}", path.display());
        Ok(ComWorkbook {
            path,
            script_dir: self.script_dir.clone(),
            ops: Vec::new(),
            closed: false,
        })
    }

    /// Each script quits its own Excel instance; nothing to do here.
    fn quit(&self) -> Result<()> {
        Ok(())
    }
}

pub struct ComWorkbook {
    path: PathBuf,
    script_dir: PathBuf,
    ops: Vec<String>,
    closed: bool,
}

impl ComWorkbook {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Queued statements, in order.
    pub fn ops(&self) -> &[String] {
        &self.ops
    }

    fn book_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Full script: open, queued ops, close, quit, release.
    pub fn script(&self) -> String {
        let mut s = String::new();
        s.push_str("$ErrorActionPreference = 'Stop'\n");
        s.push_str("$code = 0\n");
        s.push_str("$excel = New-Object -ComObject Excel.Application\n");
        s.push_str("$excel.Visible = $false\n");
        s.push_str("$excel.DisplayAlerts = $false\n");
        s.push_str("$wb = $null\n");
        s.push_str("try {\n");
        s.push_str(&format!(
            "  $wb = $excel.Workbooks.Open({})\n",
            ps_quote(&self.path.to_string_lossy())
        ));
        for op in &self.ops {
            s.push_str("  ");
            s.push_str(op);
            s.push('\n');
        }
        s.push_str("} catch {\n");
        s.push_str("  [Console]::Error.WriteLine($_.Exception.Message)\n");
        s.push_str("  $code = 1\n");
        s.push_str("} finally {\n");
        s.push_str("  if ($wb -ne $null) { $wb.Close($false) | Out-Null }\n");
        s.push_str("  $excel.Quit()\n");
        s.push_str("  [System.Runtime.InteropServices.Marshal]::ReleaseComObject($excel) | Out-Null\n");
        s.push_str("}\n");
        s.push_str("exit $code\n");
        s
    }

    fn run_script(&self) -> Result<()> {
        let script_path = self.script_dir.join(format!("fam8_transcribe_{}.ps1", std::process::id()));
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice(self.script().as_bytes());
        fs::write(&script_path, bytes)?;
        logd!("running {} ({} ops)", script_path.display(), self.ops.len());

        let output = Command::new(POWERSHELL)
            .args(["-NoProfile", "-NonInteractive", "-ExecutionPolicy", "Bypass", "-File"])
            .arg(&script_path)
            .output();
        if let Err(e) = fs::remove_file(&script_path) {
            logd!("could not remove {}: {e}", script_path.display());
        }
        let output = output.map_err(|e| Error::Spreadsheet(format!("failed to run {POWERSHELL}: {e}")))?;

        for line in String::from_utf8_lossy(&output.stdout).lines().filter(|l| !l.trim().is_empty()) {
            logd!("excel: {line}");
        }
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Spreadsheet(format!(
                "{} (exit {}): {}",
                self.book_name(),
                output.status.code().unwrap_or(-1),
                stderr.trim()
            )));
        }
        Ok(())
    }
}

/// Characters PowerShell accepts as a single quote.
const PS_SINGLE_QUOTES: [char; 5] = ['\'', '\u{2018}', '\u{2019}', '\u{201A}', '\u{201B}'];

/// PowerShell single-quoted literal. Every quote-like character is doubled.
pub fn ps_quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        if PS_SINGLE_QUOTES.contains(&c) {
            out.push(c);
        }
        out.push(c);
    }
    out.push('\'');
    out
}

fn ps_value(v: &CellValue) -> String {
    match v {
        CellValue::Text(t) => ps_quote(t),
        CellValue::Int(n) => n.to_string(),
        CellValue::Empty => s!("$null"),
    }
}

impl Workbook for ComWorkbook {
    fn clear_contents(&mut self, sheet: &str, range: &str) -> Result<()> {
        self.ops.push(format!(
            "$wb.Worksheets.Item({}).Range({}).ClearContents() | Out-Null",
            ps_quote(sheet),
            ps_quote(range)
        ));
        Ok(())
    }

    fn set_value(&mut self, sheet: &str, cell: CellRef, value: CellValue) -> Result<()> {
        self.ops.push(format!(
            "$wb.Worksheets.Item({}).Range({}).Value2 = {}",
            ps_quote(sheet),
            ps_quote(&cell.a1()),
            ps_value(&value)
        ));
        Ok(())
    }

    fn run_macro(&mut self, name: &str) -> Result<()> {
        // Excel's own quoting for the book name, then PowerShell's.
        let target = format!("'{}'!{name}", self.book_name().replace('\'', "''"));
        self.ops.push(format!("$excel.Run({}) | Out-Null", ps_quote(&target)));
        Ok(())
    }

    fn save(&mut self) -> Result<()> {
        self.ops.push(s!("$wb.Save()"));
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.run_script()?;
        logf!("workbook {} written and closed", self.book_name());
        Ok(())
    }
}

impl Drop for ComWorkbook {
    fn drop(&mut self) {
        if !self.closed && !self.ops.is_empty() {
            logw!("{} queued workbook operations discarded", self.ops.len());
        }
    }
}
