// src/config/consts.rs

// Portal
pub const LOGIN_URL: &str = "https://admin.fam-8.net/report/index.php";
pub const DEFAULT_WEBDRIVER_URL: &str = "http://127.0.0.1:9515";
pub const WINDOW_SIZE: (u32, u32) = (1280, 800);

// Local layout
pub const TMP_DIR: &str = "tmp";
pub const CSV_BASE_DIR: &str = "csv";
pub const LOG_DIR: &str = "log";
pub const META_DIR: &str = "meta";
pub const TEMPLATE_FILE: &str = "template.xlsm";
pub const LAST_CREATED_FILE: &str = "last_created.txt";
pub const SETTINGS_FILE: &str = "fam8.conf";

// Shared progress workbooks
pub const BOOK_DIR: &str = r"\\rin\rep\営業本部\プロジェクト\fam\ADN\各ADN進捗表\fam8進捗";
/// Anything smaller is not a real .xlsm copy.
pub const MIN_TEMPLATE_BYTES: u64 = 10_000;

// Timeouts (ms)
pub const PAGE_TIMEOUT_MS: u64 = 600_000;
pub const NAVIGATION_TIMEOUT_MS: u64 = 90_000;
pub const DOWNLOAD_TIMEOUT_MS: u64 = 120_000;
pub const SELECTOR_PROBE_MS: u64 = 5_000;

// Waits (s)
pub const WAIT_BETWEEN_STEPS: u64 = 5;
pub const WAIT_AFTER_CLICK: u64 = 2;
pub const WAIT_AFTER_SEARCH: u64 = 15;
pub const WAIT_AFTER_REPORT_MODE: u64 = 10;
pub const WAIT_RETRY_SETTLE: u64 = 1;
pub const WAIT_ADVERTISER_SEARCH: u64 = 5;
pub const WAIT_AFTER_EXPORT: u64 = 5;
pub const WAIT_BEFORE_CLOSE: u64 = 2;

// Environment overrides
pub const ENV_LOGIN_ID: &str = "FAM8_LOGIN_ID";
pub const ENV_PASSWORD: &str = "FAM8_PASSWORD";
pub const ENV_WEBDRIVER_URL: &str = "FAM8_WEBDRIVER_URL";
pub const ENV_BOOK_DIR: &str = "FAM8_BOOK_DIR";

// Progress workbook layout
pub const SHEET_REFERENCE: &str = "参照";
pub const SHEET_GENERAL: &str = "一般その他";
pub const SHEET_ADULT: &str = "アダルトその他";
/// Advertiser block on the reference sheet. Column N holds formulas and stays.
pub const REFERENCE_CLEAR_RANGE: &str = "B2:M1000";
pub const REFERENCE_FIRST_ROW: u32 = 2;
pub const POST_PROCESS_MACRO: &str = "fam8progress_calling";
pub const SPREADSHEET_PROCESS: &str = "EXCEL.EXE";
