// src/config/options.rs
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::consts::*;

/// Everything a run needs, resolved once at startup and then only borrowed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppOptions {
    pub portal: PortalOptions,
    pub timeouts: Timeouts,
    pub waits: Waits,
    pub browser: BrowserOptions,
    pub paths: PathOptions,
    /// true: one browser session for the whole range.
    /// false: one session per day.
    pub batch_mode: bool,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            portal: PortalOptions::default(),
            timeouts: Timeouts::default(),
            waits: Waits::default(),
            browser: BrowserOptions::default(),
            paths: PathOptions::default(),
            batch_mode: true,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Default)]
pub struct Credentials {
    pub login_id: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("login_id", &self.login_id)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PortalOptions {
    pub login_url: String,
    pub credentials: Credentials,
}

impl Default for PortalOptions {
    fn default() -> Self {
        Self { login_url: s!(LOGIN_URL), credentials: Credentials::default() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Timeouts {
    /// Upper bound for locating an element.
    pub page: Duration,
    /// Upper bound for a page load to reach `complete`.
    pub navigation: Duration,
    /// Upper bound for an export to land on disk.
    pub download: Duration,
    /// Element lookup bound for optional selectors (search-button candidates).
    pub selector_probe: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            page: Duration::from_millis(PAGE_TIMEOUT_MS),
            navigation: Duration::from_millis(NAVIGATION_TIMEOUT_MS),
            download: Duration::from_millis(DOWNLOAD_TIMEOUT_MS),
            selector_probe: Duration::from_millis(SELECTOR_PROBE_MS),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Waits {
    /// Between the General, Adult and Advertiser exports.
    pub between_steps: Duration,
    /// After each field write or click that triggers portal-side scripts.
    pub after_click: Duration,
    /// Search results on the campaign screen.
    pub after_search: Duration,
    /// Report display mode re-renders the whole filter form.
    pub after_report_mode: Duration,
    /// Between clearing the date fields and the direct write, and after it.
    pub retry_settle: Duration,
    /// Search results on the advertiser screen.
    pub advertiser_search: Duration,
    /// After an export lands, before the next form interaction.
    pub after_export: Duration,
    /// After the last export, before the session is closed.
    pub before_close: Duration,
}

impl Default for Waits {
    fn default() -> Self {
        let secs = Duration::from_secs;
        Self {
            between_steps: secs(WAIT_BETWEEN_STEPS),
            after_click: secs(WAIT_AFTER_CLICK),
            after_search: secs(WAIT_AFTER_SEARCH),
            after_report_mode: secs(WAIT_AFTER_REPORT_MODE),
            retry_settle: secs(WAIT_RETRY_SETTLE),
            advertiser_search: secs(WAIT_ADVERTISER_SEARCH),
            after_export: secs(WAIT_AFTER_EXPORT),
            before_close: secs(WAIT_BEFORE_CLOSE),
        }
    }
}

impl Waits {
    /// All waits zero. Used by tests and dry runs against a local fake.
    pub fn none() -> Self {
        let z = Duration::ZERO;
        Self {
            between_steps: z,
            after_click: z,
            after_search: z,
            after_report_mode: z,
            retry_settle: z,
            advertiser_search: z,
            after_export: z,
            before_close: z,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BrowserOptions {
    pub headless: bool,
    pub webdriver_url: String,
    pub window_size: (u32, u32),
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            headless: false,
            webdriver_url: s!(DEFAULT_WEBDRIVER_URL),
            window_size: WINDOW_SIZE,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathOptions {
    pub tmp_dir: PathBuf,
    pub csv_base_dir: PathBuf,
    pub log_dir: PathBuf,
    pub meta_dir: PathBuf,
    pub template_file: String,
    pub last_created_file: String,
    pub book_dir: PathBuf,
}

impl Default for PathOptions {
    fn default() -> Self {
        Self {
            tmp_dir: PathBuf::from(TMP_DIR),
            csv_base_dir: PathBuf::from(CSV_BASE_DIR),
            log_dir: PathBuf::from(LOG_DIR),
            meta_dir: PathBuf::from(META_DIR),
            template_file: s!(TEMPLATE_FILE),
            last_created_file: s!(LAST_CREATED_FILE),
            book_dir: PathBuf::from(BOOK_DIR),
        }
    }
}

impl PathOptions {
    /// Local layout under `root`, with the workbook share replaced by `<root>/books`.
    pub fn rooted_at(root: &Path) -> Self {
        let d = Self::default();
        Self {
            tmp_dir: root.join(d.tmp_dir),
            csv_base_dir: root.join(d.csv_base_dir),
            log_dir: root.join(d.log_dir),
            meta_dir: root.join(d.meta_dir),
            book_dir: root.join("books"),
            ..d
        }
    }

    pub fn template_path(&self) -> PathBuf {
        self.meta_dir.join(&self.template_file)
    }

    pub fn last_created_path(&self) -> PathBuf {
        self.meta_dir.join(&self.last_created_file)
    }
}
