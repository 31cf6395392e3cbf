// src/browser/webdriver.rs
//! Minimal W3C WebDriver client for chromedriver: JSON over HTTP, one session
//! per [`WebDriverPage`]. Only the commands the portal protocol needs.
use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
    thread,
    time::{Duration, Instant},
};

use serde::Deserialize;
use serde_json::{Value, json};

use super::{Browser, Download, Locator, Page};
use crate::config::AppOptions;
use crate::{Error, Result};

/// Key under which W3C drivers return element references.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";
/// WebDriver key code for Enter.
const KEY_ENTER: &str = "\u{E007}";
const POLL: Duration = Duration::from_millis(250);
const PARTIAL_SUFFIXES: [&str; 2] = [".crdownload", ".tmp"];

/// chromedriver endpoint.
#[derive(Clone, Debug)]
pub struct ChromeDriver {
    base_url: String,
}

impl ChromeDriver {
    pub fn new(base_url: &str) -> Self {
        Self { base_url: s!(base_url.trim_end_matches('/')) }
    }

    pub fn from_options(opts: &AppOptions) -> Self {
        Self::new(&opts.browser.webdriver_url)
    }
}

impl Browser for ChromeDriver {
    type Page = WebDriverPage;

    fn launch(&self, opts: &AppOptions, download_dir: &Path) -> Result<WebDriverPage> {
        crate::file::ensure_directory(download_dir)?;
        let download_dir = std::path::absolute(download_dir)?;
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(10))
            .timeout_read(opts.timeouts.navigation + opts.timeouts.download)
            .build();

        let (w, h) = opts.browser.window_size;
        let mut args = vec![format!("--window-size={w},{h}"), s!("--disable-gpu")];
        if opts.browser.headless {
            args.push(s!("--headless=new"));
        }
        let dir = download_dir.to_string_lossy().into_owned();
        let caps = json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "timeouts": {
                        "pageLoad": opts.timeouts.navigation.as_millis() as u64,
                        "script": opts.timeouts.navigation.as_millis() as u64,
                        "implicit": 0
                    },
                    "goog:chromeOptions": {
                        "args": args,
                        "prefs": {
                            "download.default_directory": dir,
                            "download.prompt_for_download": false,
                            "download.directory_upgrade": true,
                            "safebrowsing.enabled": true
                        }
                    }
                }
            }
        });

        let url = format!("{}/session", self.base_url);
        let value = send(&agent, "POST", &url, Some(caps)).map_err(|e| e.into_error("new session"))?;
        let NewSession { session_id } = serde_json::from_value(value)
            .map_err(|e| Error::driver("new session", format!("unexpected response: {e}")))?;
        logf!("webdriver session {session_id} started (headless={})", opts.browser.headless);

        let mut page = WebDriverPage {
            agent,
            session_url: format!("{}/session/{session_id}", self.base_url),
            download_dir,
            element_timeout: opts.timeouts.page,
            closed: false,
        };
        if opts.browser.headless {
            page.allow_headless_downloads(&dir);
        }
        Ok(page)
    }
}

#[derive(Debug, Deserialize)]
struct NewSession {
    #[serde(rename = "sessionId")]
    session_id: String,
}

/// Error as reported by the driver, before it becomes a crate error.
#[derive(Debug)]
struct WireError {
    status: Option<u16>,
    error: String,
    message: String,
}

impl WireError {
    fn is_no_such_element(&self) -> bool {
        self.error == "no such element" || self.error == "stale element reference"
    }

    fn is_not_interactable(&self) -> bool {
        matches!(
            self.error.as_str(),
            "element not interactable" | "element click intercepted"
        )
    }

    fn into_error(self, command: &str) -> Error {
        let status = self.status.map(|s| format!(" (HTTP {s})")).unwrap_or_default();
        Error::driver(command, format!("{}: {}{status}", self.error, self.message))
    }
}

fn send(
    agent: &ureq::Agent,
    method: &str,
    url: &str,
    body: Option<Value>,
) -> std::result::Result<Value, WireError> {
    let req = agent.request(method, url).set("Accept", "application/json");
    let resp = match body {
        Some(b) => req.send_json(b),
        None => req.call(),
    };
    match resp {
        Ok(r) => {
            let v: Value = serde_json::from_reader(r.into_reader()).map_err(|e| WireError {
                status: None,
                error: s!("invalid response"),
                message: e.to_string(),
            })?;
            Ok(v.get("value").cloned().unwrap_or(Value::Null))
        }
        Err(ureq::Error::Status(code, r)) => {
            let v: Value = serde_json::from_reader(r.into_reader()).unwrap_or(Value::Null);
            let field = |k: &str| {
                v.pointer(&format!("/value/{k}"))
                    .and_then(Value::as_str)
                    .unwrap_or("")
                    .to_string()
            };
            Err(WireError { status: Some(code), error: field("error"), message: field("message") })
        }
        Err(ureq::Error::Transport(t)) => Err(WireError {
            status: None,
            error: s!("transport"),
            message: t.to_string(),
        }),
    }
}

pub struct WebDriverPage {
    agent: ureq::Agent,
    session_url: String,
    download_dir: PathBuf,
    element_timeout: Duration,
    closed: bool,
}

impl WebDriverPage {
    fn cmd(&self, method: &str, path: &str, body: Option<Value>) -> Result<Value> {
        let url = format!("{}{path}", self.session_url);
        send(&self.agent, method, &url, body).map_err(|e| e.into_error(path))
    }

    fn find_once(&self, loc: Locator) -> std::result::Result<String, WireError> {
        let (using, value) = loc.strategy();
        let url = format!("{}/element", self.session_url);
        let v = send(&self.agent, "POST", &url, Some(json!({ "using": using, "value": value })))?;
        v.get(ELEMENT_KEY)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| WireError {
                status: None,
                error: s!("invalid response"),
                message: format!("no element reference for {loc}"),
            })
    }

    /// Poll for the element until `timeout`. `Ok(None)` on timeout.
    fn find_within(&self, loc: Locator, timeout: Duration) -> Result<Option<String>> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.find_once(loc) {
                Ok(id) => return Ok(Some(id)),
                Err(e) if e.is_no_such_element() => {
                    if Instant::now() >= deadline {
                        return Ok(None);
                    }
                    thread::sleep(POLL);
                }
                Err(e) => return Err(e.into_error(&format!("find {loc}"))),
            }
        }
    }

    fn find(&self, loc: Locator) -> Result<String> {
        self.find_within(loc, self.element_timeout)?
            .ok_or_else(|| Error::driver(format!("find {loc}"), "element did not appear"))
    }

    fn click_element(&self, id: &str) -> std::result::Result<(), WireError> {
        let url = format!("{}/element/{id}/click", self.session_url);
        send(&self.agent, "POST", &url, Some(json!({}))).map(|_| ())
    }

    fn allow_headless_downloads(&mut self, dir: &str) {
        let body = json!({
            "cmd": "Page.setDownloadBehavior",
            "params": { "behavior": "allow", "downloadPath": dir }
        });
        if let Err(e) = self.cmd("POST", "/chromium/send_command", Some(body)) {
            logw!("headless download behaviour not set: {e}");
        }
    }

    fn download_dir_entries(&self) -> HashSet<PathBuf> {
        fs::read_dir(&self.download_dir)
            .map(|rd| rd.filter_map(|e| e.ok().map(|e| e.path())).collect())
            .unwrap_or_default()
    }
}

fn is_partial(path: &Path) -> bool {
    let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
    PARTIAL_SUFFIXES.iter().any(|s| name.ends_with(s))
}

impl Page for WebDriverPage {
    fn goto(&mut self, url: &str) -> Result<()> {
        logd!("goto {url}");
        self.cmd("POST", "/url", Some(json!({ "url": url })))?;
        Ok(())
    }

    fn fill(&mut self, loc: Locator, value: &str) -> Result<()> {
        let id = self.find(loc)?;
        self.cmd("POST", &format!("/element/{id}/clear"), Some(json!({})))?;
        self.cmd("POST", &format!("/element/{id}/value"), Some(json!({ "text": value })))?;
        Ok(())
    }

    fn clear(&mut self, loc: Locator) -> Result<()> {
        let id = self.find(loc)?;
        self.cmd("POST", &format!("/element/{id}/clear"), Some(json!({})))?;
        Ok(())
    }

    fn focus(&mut self, loc: Locator) -> Result<()> {
        self.click(loc)
    }

    fn click(&mut self, loc: Locator) -> Result<()> {
        let id = self.find(loc)?;
        self.click_element(&id).map_err(|e| e.into_error(&format!("click {loc}")))
    }

    fn try_click(&mut self, loc: Locator, probe: Duration) -> Result<bool> {
        let Some(id) = self.find_within(loc, probe)? else {
            logd!("{loc} not present");
            return Ok(false);
        };
        match self.click_element(&id) {
            Ok(()) => Ok(true),
            Err(e) if e.is_not_interactable() || e.is_no_such_element() => {
                logd!("{loc} not clickable: {}", e.message);
                Ok(false)
            }
            Err(e) => Err(e.into_error(&format!("click {loc}"))),
        }
    }

    fn is_checked(&mut self, loc: Locator) -> Result<bool> {
        let id = self.find(loc)?;
        let v = self.cmd("GET", &format!("/element/{id}/selected"), None)?;
        Ok(v.as_bool().unwrap_or(false))
    }

    fn input_value(&mut self, loc: Locator) -> Result<String> {
        let id = self.find(loc)?;
        let v = self.cmd("GET", &format!("/element/{id}/property/value"), None)?;
        Ok(v.as_str().map(str::to_string).unwrap_or_default())
    }

    fn evaluate(&mut self, script: &str) -> Result<Value> {
        self.cmd("POST", "/execute/sync", Some(json!({ "script": script, "args": [] })))
    }

    fn press_enter(&mut self) -> Result<()> {
        let actions = json!({
            "actions": [{
                "type": "key",
                "id": "keyboard",
                "actions": [
                    { "type": "keyDown", "value": KEY_ENTER },
                    { "type": "keyUp", "value": KEY_ENTER }
                ]
            }]
        });
        self.cmd("POST", "/actions", Some(actions))?;
        self.cmd("DELETE", "/actions", None)?;
        Ok(())
    }

    fn wait_for_idle(&mut self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            let state = self.evaluate("return document.readyState")?;
            if state.as_str() == Some("complete") {
                return Ok(());
            }
            if Instant::now() >= deadline {
                logw!("page still {state} after {timeout:?}; continuing");
                return Ok(());
            }
            thread::sleep(POLL);
        }
    }

    fn export_download(&mut self, script: &str, timeout: Duration) -> Result<Download> {
        let before = self.download_dir_entries();
        // The export submits a form; a script timeout here still starts the download.
        if let Err(e) = self.evaluate(script) {
            logw!("export script reported an error, still watching for the file: {e}");
        }

        let deadline = Instant::now() + timeout;
        let mut candidate: Option<(PathBuf, u64)> = None;
        loop {
            let fresh = self
                .download_dir_entries()
                .into_iter()
                .filter(|p| !before.contains(p) && p.is_file() && !is_partial(p))
                .max_by_key(|p| fs::metadata(p).and_then(|m| m.modified()).ok());

            if let Some(path) = fresh {
                let size = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
                // Same size on two polls in a row: the write has finished.
                let stable = matches!(&candidate, Some((prev, prev_size)) if *prev == path && *prev_size == size);
                if stable {
                    let suggested_filename = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    logf!("download complete: {} ({size} bytes)", path.display());
                    return Ok(Download { suggested_filename, path });
                }
                candidate = Some((path, size));
            }

            if Instant::now() >= deadline {
                return Err(Error::Download(format!(
                    "no file appeared in {} within {timeout:?}",
                    self.download_dir.display()
                )));
            }
            thread::sleep(POLL);
        }
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.cmd("DELETE", "", None)?;
        logf!("webdriver session closed");
        Ok(())
    }
}
