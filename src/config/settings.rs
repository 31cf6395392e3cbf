// src/config/settings.rs
//! Optional `fam8.conf` next to the executable's working directory.
//!
//! ```text
//! # fam8.conf
//! login_id = admin
//! password = ...
//! webdriver_url = http://127.0.0.1:9515
//! book_dir = \\rin\rep\...\fam8進捗
//! headless = true
//! mode = individual
//! ```
//!
//! Layering: defaults, then this file, then environment, then CLI flags.
use std::{fs, path::{Path, PathBuf}, time::Duration};

use super::consts::*;
use super::options::AppOptions;

/// Apply a settings file if it exists. A missing file is not an error.
pub fn load_into(opts: &mut AppOptions, path: &Path) -> crate::Result<()> {
    if !path.exists() {
        return Ok(());
    }
    let text = fs::read_to_string(path)?;
    apply_text(opts, &text)?;
    logd!("settings loaded from {}", path.display());
    Ok(())
}

pub fn apply_text(opts: &mut AppOptions, text: &str) -> crate::Result<()> {
    for (n, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') { continue; }
        let Some(eq) = line.find('=') else {
            return Err(crate::Error::parse(
                "settings",
                format!("line {}: expected key = value", n + 1),
            ));
        };
        let key = line[..eq].trim();
        let val = line[eq + 1..].trim();
        apply_one(opts, key, val)
            .map_err(|msg| crate::Error::parse("settings", format!("line {}: {msg}", n + 1)))?;
    }
    Ok(())
}

fn apply_one(opts: &mut AppOptions, key: &str, val: &str) -> Result<(), String> {
    match key {
        "login_url" => opts.portal.login_url = s!(val),
        "login_id" => opts.portal.credentials.login_id = s!(val),
        "password" => opts.portal.credentials.password = s!(val),
        "webdriver_url" => opts.browser.webdriver_url = s!(val),
        "headless" => opts.browser.headless = parse_bool(val)?,
        "mode" => opts.batch_mode = parse_mode(val)?,
        "book_dir" => opts.paths.book_dir = PathBuf::from(val),
        "tmp_dir" => opts.paths.tmp_dir = PathBuf::from(val),
        "csv_dir" => opts.paths.csv_base_dir = PathBuf::from(val),
        "log_dir" => opts.paths.log_dir = PathBuf::from(val),
        "meta_dir" => opts.paths.meta_dir = PathBuf::from(val),
        "wait_between_steps" => opts.waits.between_steps = parse_secs(val)?,
        "wait_after_click" => opts.waits.after_click = parse_secs(val)?,
        "wait_after_search" => opts.waits.after_search = parse_secs(val)?,
        "wait_after_report_mode" => opts.waits.after_report_mode = parse_secs(val)?,
        "timeout_download_ms" => opts.timeouts.download = parse_ms(val)?,
        "timeout_navigation_ms" => opts.timeouts.navigation = parse_ms(val)?,
        "timeout_page_ms" => opts.timeouts.page = parse_ms(val)?,
        other => return Err(format!("unknown key {other:?}")),
    }
    Ok(())
}

/// Environment overrides. Credentials normally arrive this way.
pub fn apply_env(opts: &mut AppOptions) {
    apply_env_from(opts, |k| std::env::var(k).ok());
}

pub fn apply_env_from(opts: &mut AppOptions, get: impl Fn(&str) -> Option<String>) {
    if let Some(v) = get(ENV_LOGIN_ID) { opts.portal.credentials.login_id = v; }
    if let Some(v) = get(ENV_PASSWORD) { opts.portal.credentials.password = v; }
    if let Some(v) = get(ENV_WEBDRIVER_URL) { opts.browser.webdriver_url = v; }
    if let Some(v) = get(ENV_BOOK_DIR) { opts.paths.book_dir = PathBuf::from(v); }
}

pub fn parse_bool(val: &str) -> Result<bool, String> {
    match val.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(format!("not a boolean: {other:?}")),
    }
}

/// `batch`/`range`/`1` → true, `individual`/`each`/`0` → false.
pub fn parse_mode(val: &str) -> Result<bool, String> {
    match val.to_ascii_lowercase().as_str() {
        "batch" | "range" | "1" => Ok(true),
        "individual" | "each" | "0" => Ok(false),
        other => Err(format!("unknown processing mode: {other:?}")),
    }
}

fn parse_secs(val: &str) -> Result<Duration, String> {
    val.parse::<u64>().map(Duration::from_secs).map_err(|_| format!("not a number of seconds: {val:?}"))
}

fn parse_ms(val: &str) -> Result<Duration, String> {
    val.parse::<u64>().map(Duration::from_millis).map_err(|_| format!("not a number of ms: {val:?}"))
}

pub fn default_path() -> PathBuf {
    PathBuf::from(SETTINGS_FILE)
}
