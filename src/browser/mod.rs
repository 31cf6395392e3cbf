// src/browser/mod.rs
//! Browser seam. The portal protocol is written against [`Page`]; the real
//! implementation talks W3C WebDriver to chromedriver, tests use a fake.
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::Value;

use crate::config::AppOptions;
use crate::Result;

pub mod download;
pub mod protocol;
pub mod session;
pub mod webdriver;

pub use session::ReportSession;
pub use webdriver::{ChromeDriver, WebDriverPage};

/// How an element is found. All portal selectors are compile-time constants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Locator {
    XPath(&'static str),
    Css(&'static str),
    LinkText(&'static str),
}

impl Locator {
    /// W3C `using` strategy and selector value.
    pub fn strategy(self) -> (&'static str, &'static str) {
        match self {
            Locator::XPath(v) => ("xpath", v),
            Locator::Css(v) => ("css selector", v),
            Locator::LinkText(v) => ("link text", v),
        }
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (using, value) = self.strategy();
        write!(f, "{using}={value}")
    }
}

/// A finished browser download.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Download {
    /// Name the portal gave the file.
    pub suggested_filename: String,
    /// Where the browser wrote it.
    pub path: PathBuf,
}

/// One open tab, already past launch.
///
/// Element lookups wait up to the page timeout unless stated otherwise.
pub trait Page {
    fn goto(&mut self, url: &str) -> Result<()>;

    /// Clear the field and type `value`.
    fn fill(&mut self, loc: Locator, value: &str) -> Result<()>;

    fn clear(&mut self, loc: Locator) -> Result<()>;

    /// Give the element focus (clicks it, which also opens date pickers).
    fn focus(&mut self, loc: Locator) -> Result<()>;

    fn click(&mut self, loc: Locator) -> Result<()>;

    /// Click if the element shows up within `probe`. `Ok(false)` when it
    /// never appears or refuses the click.
    fn try_click(&mut self, loc: Locator, probe: Duration) -> Result<bool>;

    fn is_checked(&mut self, loc: Locator) -> Result<bool>;

    /// Current `value` property of an input.
    fn input_value(&mut self, loc: Locator) -> Result<String>;

    /// Run `script` as a function body; `return` hands a value back.
    fn evaluate(&mut self, script: &str) -> Result<Value>;

    /// Enter key to whatever has focus.
    fn press_enter(&mut self) -> Result<()>;

    /// Wait for the document to finish loading. A timeout is logged, not
    /// raised: the portal keeps long-polling requests open.
    fn wait_for_idle(&mut self, timeout: Duration) -> Result<()>;

    /// Run `script` (which starts an export) and wait for the file.
    fn export_download(&mut self, script: &str, timeout: Duration) -> Result<Download>;

    /// End the browser session. Calling it twice is harmless.
    fn close(&mut self) -> Result<()>;
}

/// Starts browser sessions whose downloads land in `download_dir`.
pub trait Browser {
    type Page: Page;

    fn launch(&self, opts: &AppOptions, download_dir: &Path) -> Result<Self::Page>;
}
