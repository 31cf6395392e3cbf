// tests/common/mod.rs
//
// In-memory stand-ins for chromedriver and Excel.
//
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::{Duration, Instant};

use serde_json::Value;

use fam8_progress::browser::protocol::sel;
use fam8_progress::browser::{Browser, Download, Locator, Page};
use fam8_progress::config::{AppOptions, PathOptions, Waits};
use fam8_progress::excel::{CellRef, CellValue, SpreadsheetApp, Workbook};
use fam8_progress::{Error, Result};

pub type CallLog = Rc<RefCell<Vec<String>>>;

/// Options with every wait at zero and a local directory layout.
pub fn test_options(root: &Path) -> AppOptions {
    let mut opts = AppOptions::default();
    opts.waits = Waits::none();
    opts.timeouts.selector_probe = Duration::ZERO;
    opts.timeouts.download = Duration::from_secs(1);
    opts.paths = PathOptions::rooted_at(root);
    opts.portal.credentials.login_id = "tester".into();
    opts.portal.credentials.password = "secret".into();
    opts
}

pub struct FakePage {
    pub log: CallLog,
    pub fields: HashMap<Locator, String>,
    pub checked: HashMap<Locator, bool>,
    /// Typed dates never reach the field (date picker eats them).
    pub date_picker_swallows: bool,
    /// Script writes to the date fields take effect.
    pub direct_write_works: bool,
    /// Index into the search candidates that is present on the page.
    pub search_button: Option<usize>,
    pub download_dir: PathBuf,
    pub download_body: Vec<u8>,
    pub downloads: usize,
    /// When the page body was last clicked.
    pub body_clicked_at: Option<Instant>,
    /// Time between the first body click and the next field read.
    pub read_after_commit: Option<Duration>,
}

impl FakePage {
    pub fn new(log: CallLog, download_dir: &Path) -> Self {
        Self {
            log,
            fields: HashMap::new(),
            checked: HashMap::new(),
            date_picker_swallows: false,
            direct_write_works: true,
            search_button: Some(0),
            download_dir: download_dir.to_path_buf(),
            download_body: b"[total],,,,,,,,,,,,,1,2\n".to_vec(),
            downloads: 0,
            body_clicked_at: None,
            read_after_commit: None,
        }
    }

    fn record(&self, call: String) {
        self.log.borrow_mut().push(call);
    }

    fn is_date_field(loc: Locator) -> bool {
        loc == sel::DATE_FROM || loc == sel::DATE_TO
    }
}

/// Values assigned with `= '...'` in a script, in order.
fn assigned_literals(script: &str) -> Vec<String> {
    script
        .split("= '")
        .skip(1)
        .filter_map(|rest| rest.split('\'').next())
        .map(str::to_string)
        .collect()
}

impl Page for FakePage {
    fn goto(&mut self, url: &str) -> Result<()> {
        self.record(format!("goto {url}"));
        Ok(())
    }

    fn fill(&mut self, loc: Locator, value: &str) -> Result<()> {
        self.record(format!("fill {loc}={value}"));
        let stored = if Self::is_date_field(loc) && self.date_picker_swallows { String::new() } else { value.to_string() };
        self.fields.insert(loc, stored);
        Ok(())
    }

    fn clear(&mut self, loc: Locator) -> Result<()> {
        self.record(format!("clear {loc}"));
        self.fields.insert(loc, String::new());
        Ok(())
    }

    fn focus(&mut self, loc: Locator) -> Result<()> {
        self.record(format!("focus {loc}"));
        Ok(())
    }

    fn click(&mut self, loc: Locator) -> Result<()> {
        self.record(format!("click {loc}"));
        if loc == sel::BODY {
            self.body_clicked_at = Some(Instant::now());
        }
        if let Some(state) = self.checked.get_mut(&loc) {
            *state = !*state;
        }
        Ok(())
    }

    fn try_click(&mut self, loc: Locator, _probe: Duration) -> Result<bool> {
        self.record(format!("try_click {loc}"));
        let present = self.search_button.map(|i| sel::SEARCH_CANDIDATES[i] == loc).unwrap_or(false);
        Ok(present)
    }

    fn is_checked(&mut self, loc: Locator) -> Result<bool> {
        Ok(self.checked.get(&loc).copied().unwrap_or(false))
    }

    fn input_value(&mut self, loc: Locator) -> Result<String> {
        if let (Some(at), None) = (self.body_clicked_at, self.read_after_commit) {
            self.read_after_commit = Some(at.elapsed());
        }
        Ok(self.fields.get(&loc).cloned().unwrap_or_default())
    }

    fn evaluate(&mut self, script: &str) -> Result<Value> {
        self.record(format!("eval {script}"));
        if script.contains("#cal_input_from") {
            if self.direct_write_works {
                let vals = assigned_literals(script);
                if let [from, to] = vals.as_slice() {
                    self.fields.insert(sel::DATE_FROM, from.clone());
                    self.fields.insert(sel::DATE_TO, to.clone());
                }
            }
            return Ok(Value::Null);
        }
        Ok(Value::Bool(true))
    }

    fn press_enter(&mut self) -> Result<()> {
        self.record("enter".to_string());
        Ok(())
    }

    fn wait_for_idle(&mut self, _timeout: Duration) -> Result<()> {
        Ok(())
    }

    fn export_download(&mut self, script: &str, _timeout: Duration) -> Result<Download> {
        self.record(format!("export {script}"));
        self.downloads += 1;
        let name = format!("report_{}.csv", self.downloads);
        fs::create_dir_all(&self.download_dir).map_err(Error::Io)?;
        let path = self.download_dir.join(&name);
        fs::write(&path, &self.download_body).map_err(Error::Io)?;
        Ok(Download { suggested_filename: name, path })
    }

    fn close(&mut self) -> Result<()> {
        self.record("close".to_string());
        Ok(())
    }
}

/// Launches [`FakePage`]s; the sessions listed in `broken_sessions` (0-based
/// launch order) have a date picker that rejects every write.
pub struct FakeBrowser {
    pub log: CallLog,
    pub launches: RefCell<usize>,
    pub broken_sessions: HashSet<usize>,
}

impl FakeBrowser {
    pub fn new() -> Self {
        Self { log: CallLog::default(), launches: RefCell::new(0), broken_sessions: HashSet::new() }
    }

    pub fn calls(&self) -> Vec<String> {
        self.log.borrow().clone()
    }
}

impl Browser for FakeBrowser {
    type Page = FakePage;

    /// Downloads land in the absolute form of `download_dir`, as with chromedriver.
    fn launch(&self, _opts: &AppOptions, download_dir: &Path) -> Result<FakePage> {
        let download_dir = std::path::absolute(download_dir)?;
        let download_dir = download_dir.as_path();
        let n = *self.launches.borrow();
        *self.launches.borrow_mut() += 1;
        self.log.borrow_mut().push(format!("launch {n}"));
        let mut page = FakePage::new(self.log.clone(), download_dir);
        if self.broken_sessions.contains(&n) {
            page.date_picker_swallows = true;
            page.direct_write_works = false;
        }
        Ok(page)
    }
}

/// Records workbook operations as text lines.
#[derive(Clone, Default)]
pub struct RecordingExcel {
    pub log: CallLog,
}

impl RecordingExcel {
    pub fn calls(&self) -> Vec<String> {
        self.log.borrow().clone()
    }

    /// `sheet!A1=value` lines only.
    pub fn writes(&self) -> Vec<String> {
        self.calls().into_iter().filter(|c| c.contains('!') && c.contains('=')).collect()
    }
}

pub struct RecordingBook {
    log: CallLog,
}

impl Workbook for RecordingBook {
    fn clear_contents(&mut self, sheet: &str, range: &str) -> Result<()> {
        self.log.borrow_mut().push(format!("clear {sheet}:{range}"));
        Ok(())
    }

    fn set_value(&mut self, sheet: &str, cell: CellRef, value: CellValue) -> Result<()> {
        let v = match value {
            CellValue::Text(t) => t,
            CellValue::Int(n) => n.to_string(),
            CellValue::Empty => "<empty>".to_string(),
        };
        self.log.borrow_mut().push(format!("{sheet}!{cell}={v}"));
        Ok(())
    }

    fn run_macro(&mut self, name: &str) -> Result<()> {
        self.log.borrow_mut().push(format!("macro {name}"));
        Ok(())
    }

    fn save(&mut self) -> Result<()> {
        self.log.borrow_mut().push("save".to_string());
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.log.borrow_mut().push("close".to_string());
        Ok(())
    }
}

impl SpreadsheetApp for RecordingExcel {
    type Book = RecordingBook;

    fn terminate_running(&self) -> Result<()> {
        self.log.borrow_mut().push("terminate".to_string());
        Ok(())
    }

    fn open(&self, path: &Path) -> Result<RecordingBook> {
        if !path.is_file() {
            return Err(Error::Resource(path.to_path_buf()));
        }
        self.log.borrow_mut().push(format!("open {}", path.display()));
        Ok(RecordingBook { log: self.log.clone() })
    }

    fn quit(&self) -> Result<()> {
        self.log.borrow_mut().push("quit".to_string());
        Ok(())
    }
}

/// A campaign export with the given GROSS/NET in its total row.
pub fn campaign_csv(gross: &str, net: &str) -> String {
    let header = "日付,ID,キャンペーン,表示,クリック,CTR,CV,CVR,単価,費用,売上,利益,率,GROSS,NET";
    format!("{header}\r\n[total],,,100,10,10%,1,10%,0,0,0,0,0,\"{gross}\",\"{net}\"\r\n")
}

pub fn write_sjis(path: &Path, text: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let (bytes, _, _) = encoding_rs::SHIFT_JIS.encode(text);
    fs::write(path, &bytes).unwrap();
}
