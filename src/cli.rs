// src/cli.rs
use std::path::PathBuf;
use std::time::Duration;

use chrono::Local;
use clap::{Args, Parser, Subcommand};

use crate::browser::ChromeDriver;
use crate::config::{AppOptions, settings};
use crate::core::parse_date_range;
use crate::excel::ComExcel;
use crate::pipeline;
use crate::progress::LogProgress;

#[derive(Debug, Parser)]
#[command(name = "fam8_progress", version, about = "fam8 daily report download and progress-workbook update")]
pub struct Cli {
    /// Settings file (key = value). Defaults to ./fam8.conf when present.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Download the General, Adult and Advertiser CSVs. Prints the CSV directory.
    Fetch(FetchArgs),
    /// Provision next month's workbook on month-end. Prints the workbook to use.
    CheckMonth(DateArg),
    /// Write the downloaded CSVs into the progress workbook.
    Transcribe(DateArg),
    /// fetch, check-month and transcribe in one go.
    Run(FetchArgs),
}

#[derive(Debug, Args)]
pub struct DateArg {
    /// `default` (yesterday), YYYYMMDD or YYYYMMDD-YYYYMMDD
    #[arg(default_value = "default")]
    pub date: String,
}

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// `default` (yesterday), YYYYMMDD or YYYYMMDD-YYYYMMDD
    #[arg(default_value = "default")]
    pub date: String,

    /// Seconds between exports
    pub between_steps: Option<u64>,
    /// Seconds after clicks and field writes
    pub after_click: Option<u64>,
    /// Seconds for campaign search results
    pub after_search: Option<u64>,
    /// Seconds after switching to report display mode
    pub after_report_mode: Option<u64>,

    /// Range handling: batch (one session) or individual (one per day)
    #[arg(long, value_parser = parse_mode_arg, value_name = "MODE")]
    pub mode: Option<ProcessingMode>,

    #[arg(long)]
    pub headless: bool,

    #[arg(long, value_name = "URL")]
    pub webdriver_url: Option<String>,
}

/// `--mode` value; `batch`/`range`/`1` or `individual`/`each`/`0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProcessingMode {
    pub batch: bool,
}

fn parse_mode_arg(s: &str) -> Result<ProcessingMode, String> {
    settings::parse_mode(s).map(|batch| ProcessingMode { batch })
}

impl FetchArgs {
    /// Positional waits and flags over whatever the settings produced.
    pub fn apply(&self, opts: &mut AppOptions) {
        let overrides = [
            ("between_steps", self.between_steps, &mut opts.waits.between_steps),
            ("after_click", self.after_click, &mut opts.waits.after_click),
            ("after_search", self.after_search, &mut opts.waits.after_search),
            ("after_report_mode", self.after_report_mode, &mut opts.waits.after_report_mode),
        ];
        for (name, secs, slot) in overrides {
            if let Some(secs) = secs {
                *slot = Duration::from_secs(secs);
                logf!("wait override: {name} = {secs}s");
            }
        }
        if let Some(mode) = self.mode {
            opts.batch_mode = mode.batch;
        }
        if self.headless {
            opts.browser.headless = true;
        }
        if let Some(url) = &self.webdriver_url {
            opts.browser.webdriver_url = url.clone();
        }
    }
}

impl Command {
    fn component(&self) -> &'static str {
        match self {
            Command::Fetch(_) => "fetch",
            Command::CheckMonth(_) => "month",
            Command::Transcribe(_) => "transcribe",
            Command::Run(_) => "run",
        }
    }
}

/// Defaults, then the settings file, then the environment.
pub fn load_options(config: Option<&PathBuf>) -> crate::Result<AppOptions> {
    let mut opts = AppOptions::default();
    let path = config.cloned().unwrap_or_else(settings::default_path);
    settings::load_into(&mut opts, &path)?;
    settings::apply_env(&mut opts);
    Ok(opts)
}

/// Parse the command line and run it. Returns the process exit code.
pub fn run() -> color_eyre::Result<i32> {
    let cli = Cli::parse();
    let mut opts = load_options(cli.config.as_ref())?;

    let component = cli.command.component();
    let _guard = crate::log::init(&opts.paths.log_dir, component)?;
    let _span = tracing::info_span!("fam8", component).entered();

    if let Command::Fetch(a) | Command::Run(a) = &cli.command {
        a.apply(&mut opts);
    }
    let opts = opts;
    let today = Local::now().date_naive();

    match &cli.command {
        Command::Fetch(a) => {
            let range = parse_date_range(&a.date, today)?;
            let browser = ChromeDriver::from_options(&opts);
            let mut progress = LogProgress::default();
            let outcome = pipeline::fetch(&browser, &opts, &range, Some(&mut progress));
            if let Some(dir) = outcome.primary_dir() {
                println!("{}", dir.display());
            }
            Ok(if outcome.all_ok() { 0 } else { 1 })
        }
        Command::CheckMonth(a) => {
            // Never fails the caller: a missing workbook is handled downstream.
            match parse_date_range(&a.date, today) {
                Ok(range) => {
                    if let Some(path) = pipeline::check_month(&opts, &range).workbook {
                        println!("{}", path.display());
                    }
                }
                Err(e) => loge!("{e}"),
            }
            Ok(0)
        }
        Command::Transcribe(a) => {
            let range = parse_date_range(&a.date, today)?;
            match pipeline::transcribe(&ComExcel::default(), &opts, &range, today) {
                Ok((workbook, summary)) => {
                    logf!("{summary:?}");
                    println!("{}", workbook.display());
                    Ok(0)
                }
                Err(e) => {
                    loge!("transcription failed: {e}");
                    Ok(1)
                }
            }
        }
        Command::Run(a) => {
            let range = parse_date_range(&a.date, today)?;
            let browser = ChromeDriver::from_options(&opts);
            let mut progress = LogProgress::default();
            let outcome = pipeline::run(&browser, &ComExcel::default(), &opts, &range, today, Some(&mut progress))?;
            match outcome.workbook() {
                Some(workbook) => println!("{}", workbook.display()),
                None => println!("{}", outcome.csv_dir.display()),
            }
            Ok(0)
        }
    }
}
