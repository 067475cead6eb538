//! Processing shared between the flatten and publish commands.

use super::config::Config;
use super::{Host, ProgressReporter};
use crate::Result;
use crate::hierarchy::{Flattener, SentinelStyle, UnnamedSentinels};
use crate::progress::Progress;
use crate::reports::{generate_console, generate_csv, generate_json};
use crate::source::{SourceLocation, SourceProvider};
use crate::table::Table;
use camino::Utf8PathBuf;
use clap::{Args, ValueEnum};
use core::time::Duration;
use ohno::{IntoAppError, app_err};
use std::fs;
use std::io::Write;

/// Color mode configuration for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Always use colors
    Always,

    /// Never use colors
    Never,

    /// Use colors if the output is a terminal, otherwise don't use colors
    Auto,
}

impl ColorMode {
    fn enabled(self, is_terminal: impl FnOnce() -> bool) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => is_terminal(),
        }
    }
}

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    None,

    /// Only error messages
    Error,

    /// Warning and error messages
    Warn,

    /// Info, warning, and error messages
    Info,

    /// Debug, info, warning, and error messages
    Debug,

    /// Trace, debug, info, warning, and error messages
    Trace,
}

/// Arguments shared between the flatten and publish commands
#[derive(Args, Debug)]
pub struct CommonArgs {
    /// URL or local path of the PI AF XML export
    #[arg(value_name = "SOURCE")]
    pub source: String,

    /// Path to configuration file (default is `af-flatten.toml`)
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,

    /// Control when to use colored output
    #[arg(long, value_name = "WHEN", default_value = "auto")]
    pub color: ColorMode,

    /// Set the logging level for diagnostic output
    #[arg(long, value_name = "LEVEL", default_value = "none", global = true)]
    pub log_level: LogLevel,

    /// Placeholder names used for unnamed elements and attributes
    #[arg(long, value_name = "STYLE")]
    pub sentinels: Option<SentinelStyle>,

    /// Keep a local copy of the fetched AF export
    #[arg(long, value_name = "PATH")]
    pub save_source: Option<Utf8PathBuf>,

    /// Write the flattened table to a CSV file
    #[arg(long, value_name = "PATH", help_heading = "Report Output")]
    pub csv: Option<Utf8PathBuf>,

    /// Write the flattened table to a JSON file
    #[arg(long, value_name = "PATH", help_heading = "Report Output")]
    pub json: Option<Utf8PathBuf>,

    /// Show a summary and a preview of the first ROWS rows on the console.
    /// If omitted entirely, console output is shown only when no other reports are generated.
    #[arg(long, value_name = "ROWS", num_args = 0..=1, require_equals = true, help_heading = "Report Output")]
    pub console: Option<Option<usize>>,
}

pub struct Common<'a, H: Host> {
    pub config: Config,
    pub progress: ProgressReporter,
    host: &'a mut H,
    source: SourceLocation,
    save_source: Option<Utf8PathBuf>,
    color: ColorMode,
    console: Option<Option<usize>>,
    csv: Option<Utf8PathBuf>,
    json: Option<Utf8PathBuf>,
}

impl<'a, H: Host> Common<'a, H> {
    /// Set up logging, load the configuration, and resolve the source location
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or the source location is invalid
    pub fn new(host: &'a mut H, args: &CommonArgs) -> Result<Self> {
        init_logging(args.log_level);

        let mut config = Config::load(&Utf8PathBuf::from("."), args.config.as_ref())?;
        if let Some(style) = args.sentinels {
            config.sentinels = style;
        }

        let source: SourceLocation = args.source.parse()?;

        let delay = if args.log_level == LogLevel::None {
            Duration::from_millis(300)
        } else {
            Duration::from_hours(365 * 24)
        };

        let use_colors_for_progress = args.color.enabled(|| {
            use std::io::{IsTerminal, stderr};
            stderr().is_terminal()
        });

        Ok(Self {
            config,
            progress: ProgressReporter::new(delay, use_colors_for_progress),
            host,
            source,
            save_source: args.save_source.clone(),
            color: args.color,
            console: args.console,
            csv: args.csv.clone(),
            json: args.json.clone(),
        })
    }

    pub fn host(&mut self) -> &mut H {
        &mut *self.host
    }

    /// Fetch, parse, and flatten the source document
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be fetched or parsed, or is not an AF export
    pub async fn load_table(&self) -> Result<Table> {
        self.progress.set_phase("Fetching");
        let location = self.source.to_string();
        self.progress.set_indeterminate(Box::new(move || location.clone()));

        let mut provider = SourceProvider::new(self.config.request_timeout)?;
        if let Some(path) = &self.save_source {
            provider = provider.save_to(path.clone());
        }

        let document = provider.load(&self.source).await?;

        let flattener = Flattener::new(UnnamedSentinels::for_style(self.config.sentinels));
        let records = flattener
            .flatten_document(&document)
            .map_err(|e| app_err!("unable to flatten '{}': {e}", self.source))?;

        log::info!("flattened {} attributes from {}", records.len(), self.source);
        Ok(Table::assemble(records))
    }

    /// Write every requested report for `table`
    ///
    /// # Errors
    ///
    /// Returns an error if a report file cannot be written
    pub fn report(&mut self, table: &Table) -> Result<()> {
        let generating_reports = self.csv.is_some() || self.json.is_some();

        let preview_rows = match self.console {
            Some(rows) => Some(rows.unwrap_or(self.config.preview_rows)),
            None if !generating_reports => Some(self.config.preview_rows),
            None => None,
        };

        if let Some(rows) = preview_rows {
            let use_colors = self.color.enabled(|| {
                use std::io::{IsTerminal, stdout};
                stdout().is_terminal()
            });

            let mut console_output = String::new();
            generate_console(table, rows, use_colors, &mut console_output)?;
            self.progress.suspend(|| {
                let _ = write!(self.host.output(), "{console_output}");
            });
        }

        if let Some(filename) = &self.csv {
            let mut csv_output = String::new();
            generate_csv(table, &mut csv_output)?;
            fs::write(filename, csv_output).into_app_err_with(|| format!("writing CSV report to '{filename}'"))?;
            log::info!("wrote CSV report to '{filename}'");
        }

        if let Some(filename) = &self.json {
            let mut json_output = String::new();
            generate_json(table, &mut json_output)?;
            fs::write(filename, json_output).into_app_err_with(|| format!("writing JSON report to '{filename}'"))?;
            log::info!("wrote JSON report to '{filename}'");
        }

        Ok(())
    }
}

/// Initialize logger based on log level
fn init_logging(log_level: LogLevel) {
    let level = match log_level {
        LogLevel::None => return,
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    };

    let env = env_logger::Env::default().filter_or("RUST_LOG", level);

    // A second command in the same process keeps the first logger.
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(matches!(log_level, LogLevel::Debug | LogLevel::Trace))
        .try_init();
}
