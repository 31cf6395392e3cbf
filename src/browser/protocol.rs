// src/browser/protocol.rs
//! The portal's form protocol: login, screen navigation, date range with
//! verification, per-report filters, search.
//!
//! The portal gives no readiness signal after most interactions, so the
//! steps are separated by the named waits in [`Waits`](crate::config::Waits).
use super::{Locator, Page};
use crate::config::AppOptions;
use crate::core::DateRange;
use crate::report::ReportMode;
use crate::{Error, Result};

/// Portal element locators.
pub mod sel {
    use super::Locator;

    pub const LOGIN_ID: Locator =
        Locator::XPath("//*[@id='topmenu']/tbody/tr[2]/td/div[1]/form/div/table/tbody/tr[1]/td/input");
    pub const LOGIN_PASSWORD: Locator =
        Locator::XPath("//*[@id='topmenu']/tbody/tr[2]/td/div[1]/form/div/table/tbody/tr[2]/td/input");
    pub const LOGIN_SUBMIT: Locator =
        Locator::XPath("//*[@id='topmenu']/tbody/tr[2]/td/div[1]/form/div/table/tbody/tr[3]/td/input[2]");

    pub const MENU_CAMPAIGN: Locator = Locator::XPath("//*[@id='sidemenu']/div[1]/a[8]/div");
    pub const MENU_ADVERTISER: Locator = Locator::XPath("//*[@id='sidemenu']/div[1]/a[3]/div");
    pub const REPORT_MODE: Locator = Locator::XPath("//*[@id='display_modesummary_mode']");

    pub const DATE_FROM: Locator = Locator::XPath("//*[@id='cal_input_from']");
    pub const DATE_TO: Locator = Locator::XPath("//*[@id='cal_input_to']");
    pub const BODY: Locator = Locator::Css("body");

    pub const GENERAL_CHECKBOX: Locator =
        Locator::XPath("//*[@id='main_area']/form/div[1]/table/tbody/tr[1]/td[1]/input[2]");
    pub const ADULT_CHECKBOX: Locator =
        Locator::XPath("//*[@id='main_area']/form/div[1]/table/tbody/tr[2]/td[1]/input[2]");
    pub const KEYWORD: Locator = Locator::Css("#main_area > form > div.where > input:nth-child(43)");

    pub const COLUMNS_PANEL: Locator = Locator::LinkText("表示項目設定");
    pub const COL_AGENCY_NAME: Locator = Locator::XPath("//*[@id='display_itemsagency_name']");
    pub const COL_PROFIT: Locator = Locator::XPath("//*[@id='display_itemsprofit']");
    pub const COL_CPC_GROSS: Locator = Locator::XPath("//*[@id='display_itemscpc_gross']");
    pub const COL_ECPM_GROSS: Locator = Locator::XPath("//*[@id='display_itemscpm_gross']");

    /// Tried in order; the first that clicks wins.
    pub const SEARCH_CANDIDATES: [Locator; 4] = [
        Locator::XPath("//*[@id='main_area']/form/div[1]/input[@value='検索']"),
        Locator::XPath("//*[@id='main_area']/form/div[1]/input[11]"),
        Locator::Css("input.btn[value='検索']"),
        Locator::Css("#main_area > form > div.where > input.btn"),
    ];
}

pub const EXPORT_SCRIPT: &str = "sub_export('csv');";

const AGENCY_SELECT: &str = "#main_area > form > div.where > select:nth-child(41)";
const CONDITION_SELECT: &str = "#main_area > form > div.where > select:nth-child(42)";
/// 7th agency option, 5th condition option.
const AGENCY_OPTION: usize = 6;
const CONDITION_OPTION: usize = 4;

pub const GENERAL_KEYWORD: &str = "9999_EC自社運用";
pub const ADULT_KEYWORD: &str = "9999_フィングネットワーク広告";

/// Rebuilds the hidden comma list the advertiser form submits from the
/// column checkboxes that are currently ticked.
pub const SYNC_DISPLAY_ITEMS_SCRIPT: &str = "const form = document.forms['mainform']; \
     if (!form || !form.display_items) { return false; } \
     form.display_items.value = Array.from(form.querySelectorAll('input[name=\"check_display_items\"]:checked')) \
     .map(cb => cb.value).join(','); \
     return true;";

/// Fill id/password, submit, wait for the landing page.
pub fn login<P: Page + ?Sized>(page: &mut P, opts: &AppOptions) -> Result<()> {
    let creds = &opts.portal.credentials;
    if creds.login_id.is_empty() || creds.password.is_empty() {
        return Err(Error::Validation(s!("portal credentials are not configured")));
    }
    logf!("logging in to {}", opts.portal.login_url);
    page.goto(&opts.portal.login_url)?;
    page.wait_for_idle(opts.timeouts.navigation)?;
    page.fill(sel::LOGIN_ID, &creds.login_id)?;
    page.fill(sel::LOGIN_PASSWORD, &creds.password)?;
    page.click(sel::LOGIN_SUBMIT)?;
    page.wait_for_idle(opts.timeouts.navigation)?;
    settle!(opts.waits.after_click, "login landing page");
    Ok(())
}

/// Campaign screen for General/Adult, advertiser screen for Advertiser,
/// then switch to report display mode.
pub fn open_report_screen<P: Page + ?Sized>(page: &mut P, mode: ReportMode, opts: &AppOptions) -> Result<()> {
    let menu = if mode.is_campaign() { sel::MENU_CAMPAIGN } else { sel::MENU_ADVERTISER };
    logd!("{mode}: opening report screen");
    page.click(menu)?;
    page.wait_for_idle(opts.timeouts.navigation)?;
    settle!(opts.waits.after_click, "report screen");

    page.click(sel::REPORT_MODE)?;
    page.wait_for_idle(opts.timeouts.navigation)?;
    settle!(opts.waits.after_report_mode, "report display mode re-renders the filter form");
    Ok(())
}

/// Script that writes both date fields directly, bypassing the date picker.
pub fn direct_write_script(from: &str, to: &str) -> String {
    format!(
        "document.querySelector('#cal_input_from').value = '{from}'; \
         document.querySelector('#cal_input_to').value = '{to}';"
    )
}

/// What the two date fields currently hold.
pub fn read_date_fields<P: Page + ?Sized>(page: &mut P) -> Result<(String, String)> {
    Ok((page.input_value(sel::DATE_FROM)?, page.input_value(sel::DATE_TO)?))
}

/// Type the range into the date fields, commit, verify. On mismatch clear
/// both, write them through script and verify once more. A second mismatch
/// is [`Error::Verification`].
pub fn set_date_range<P: Page + ?Sized>(page: &mut P, range: &DateRange, opts: &AppOptions) -> Result<()> {
    let (from, to) = range.site_strings();
    logf!("setting date range {from} .. {to}");

    page.focus(sel::DATE_FROM)?;
    page.fill(sel::DATE_FROM, &from)?;
    settle!(opts.waits.after_click, "date picker (from)");
    page.focus(sel::DATE_TO)?;
    page.fill(sel::DATE_TO, &to)?;
    settle!(opts.waits.after_click, "date picker (to)");
    page.click(sel::BODY)?;
    settle!(opts.waits.after_click, "commit date fields");

    let (got_from, got_to) = read_date_fields(page)?;
    if got_from == from && got_to == to {
        logd!("date range verified");
        return Ok(());
    }

    logw!("date fields show {got_from:?} .. {got_to:?}, expected {from} .. {to}; retrying with direct write");
    page.clear(sel::DATE_FROM)?;
    page.clear(sel::DATE_TO)?;
    settle!(opts.waits.retry_settle, "cleared date fields");
    page.evaluate(&direct_write_script(&from, &to))?;
    settle!(opts.waits.retry_settle, "direct date write");

    let (got_from, got_to) = read_date_fields(page)?;
    if got_from == from && got_to == to {
        logf!("date range verified after direct write");
        return Ok(());
    }
    loge!("date fields still show {got_from:?} .. {got_to:?}");
    Err(Error::Verification {
        expected_start: from,
        expected_end: to,
        actual_start: got_from,
        actual_end: got_to,
    })
}

/// Click `loc` only when its checked state differs from `want`.
pub fn ensure_checked<P: Page + ?Sized>(page: &mut P, loc: Locator, want: bool, opts: &AppOptions) -> Result<bool> {
    if page.is_checked(loc)? == want {
        return Ok(false);
    }
    logd!("{} {loc}", if want { "checking" } else { "unchecking" });
    page.click(loc)?;
    settle!(opts.waits.after_click, "checkbox toggle");
    Ok(true)
}

/// Select `index` in the dropdown at `css` if it has that many options.
/// Returns whether the selection happened.
pub fn select_option_script(css: &str, index: usize) -> String {
    format!(
        "const s = document.querySelector('{css}'); \
         if (!s || s.options.length <= {index}) {{ return false; }} \
         s.selectedIndex = {index}; \
         s.dispatchEvent(new Event('change', {{ bubbles: true }})); \
         return true;"
    )
}

/// Checkbox filters, both dropdowns, keyword.
pub fn configure_campaign_filters<P: Page + ?Sized>(page: &mut P, mode: ReportMode, opts: &AppOptions) -> Result<()> {
    let keyword = match mode {
        ReportMode::General => {
            ensure_checked(page, sel::ADULT_CHECKBOX, false, opts)?;
            GENERAL_KEYWORD
        }
        ReportMode::Adult => {
            ensure_checked(page, sel::GENERAL_CHECKBOX, false, opts)?;
            ensure_checked(page, sel::ADULT_CHECKBOX, true, opts)?;
            ADULT_KEYWORD
        }
        ReportMode::Advertiser => return Ok(()),
    };

    for (name, css, idx) in [("agency", AGENCY_SELECT, AGENCY_OPTION), ("condition", CONDITION_SELECT, CONDITION_OPTION)] {
        let applied = page.evaluate(&select_option_script(css, idx))?;
        if applied.as_bool() == Some(true) {
            logd!("{mode}: {name} dropdown set to option {}", idx + 1);
            settle!(opts.waits.after_click, "dropdown change handler");
        } else {
            logw!("{mode}: {name} dropdown missing or short, left as is");
        }
    }

    page.fill(sel::KEYWORD, keyword)?;
    settle!(opts.waits.after_click, "keyword filter");
    Ok(())
}

/// Agency-name column on; profit, CPC(gross), eCPM(gross) off. The hidden
/// `display_items` field is rebuilt after every toggle.
pub fn configure_advertiser_columns<P: Page + ?Sized>(page: &mut P, opts: &AppOptions) -> Result<()> {
    page.click(sel::COLUMNS_PANEL)?;
    settle!(opts.waits.after_click, "display-columns panel");

    let wanted = [
        (sel::COL_AGENCY_NAME, true),
        (sel::COL_PROFIT, false),
        (sel::COL_CPC_GROSS, false),
        (sel::COL_ECPM_GROSS, false),
    ];
    for (loc, want) in wanted {
        if ensure_checked(page, loc, want, opts)? {
            let synced = page.evaluate(SYNC_DISPLAY_ITEMS_SCRIPT)?;
            if synced.as_bool() != Some(true) {
                logw!("display_items field not found; column selection may not be submitted");
            }
        }
    }
    Ok(())
}

/// Click the first search-button candidate that responds, else press Enter.
/// Returns the index of the candidate used, `None` for the Enter fallback.
pub fn submit_search<P: Page + ?Sized>(page: &mut P, mode: ReportMode, opts: &AppOptions) -> Result<Option<usize>> {
    let mut used = None;
    for (i, loc) in sel::SEARCH_CANDIDATES.iter().enumerate() {
        if page.try_click(*loc, opts.timeouts.selector_probe)? {
            logd!("{mode}: search submitted via {loc}");
            used = Some(i);
            break;
        }
    }
    if used.is_none() {
        logw!("{mode}: no search button matched, sending Enter");
        page.press_enter()?;
    }

    let wait = if mode.is_campaign() { opts.waits.after_search } else { opts.waits.advertiser_search };
    settle!(wait, "search results");
    page.wait_for_idle(opts.timeouts.navigation)?;
    Ok(used)
}

/// Everything between an authenticated session and the export click.
pub fn prepare_report<P: Page + ?Sized>(
    page: &mut P,
    mode: ReportMode,
    range: &DateRange,
    opts: &AppOptions,
) -> Result<()> {
    open_report_screen(page, mode, opts)?;
    set_date_range(page, range, opts)?;
    if mode.is_campaign() {
        configure_campaign_filters(page, mode, opts)?;
    } else {
        configure_advertiser_columns(page, opts)?;
    }
    submit_search(page, mode, opts)?;
    Ok(())
}
