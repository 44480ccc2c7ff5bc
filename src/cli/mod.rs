//! Command-line front end for running projections.
//!
//! ```text
//! forecast_core_cli project --input defs.json --start 2024-01-01 [--end 2024-12-31]
//!                           [--balance '$1,000.00'] [--csv out.csv|-] [--stats]
//! forecast_core_cli version
//! forecast_core_cli help
//! ```

pub mod output;

use std::{
    env, fs,
    io::{self, Write},
    path::PathBuf,
    thread,
    time::Duration,
};

use chrono::NaiveDate;
use thiserror::Error;
use tracing::warn;

use crate::{
    config::{Config, ConfigError, ConfigManager},
    currency::parse_dollars,
    errors::{DefinitionsError, ProjectionError},
    execution::{progress_channel, ExecutionContext, ProgressInbox, ProjectionHandle},
    export,
    ledger::{calendar::add_days, parse_date},
    projection::{Projection, ProjectionEngine, ProjectionRequest},
    utils::{build_info, persistence},
};

use output::OutputPreferences;

const POLL_INTERVAL: Duration = Duration::from_millis(20);
const STDOUT_TARGET: &str = "-";

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("could not load transactions: {0}")]
    Definitions(#[from] DefinitionsError),
    #[error(transparent)]
    Projection(#[from] ProjectionError),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("a projection is already running")]
    Busy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ProjectArgs {
    input: PathBuf,
    start: NaiveDate,
    end: Option<NaiveDate>,
    balance: i64,
    csv: Option<String>,
    stats: bool,
}

/// Entry point used by the `forecast_core_cli` binary.
pub fn run_cli() -> Result<(), CliError> {
    run_with_args(env::args().skip(1).collect())
}

pub fn run_with_args(args: Vec<String>) -> Result<(), CliError> {
    let mut args = args.into_iter();
    let Some(command) = args.next() else {
        print_usage();
        return Err(CliError::Usage("missing command".into()));
    };

    match command.as_str() {
        "project" => {
            let parsed = parse_project_args(args.collect())?;
            let config = load_config();
            run_project(&config, parsed)
        }
        "version" | "--version" => {
            println!("{}", build_info::current().summary());
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            print_usage();
            Err(CliError::Usage(format!("unknown command `{other}`")))
        }
    }
}

fn load_config() -> Config {
    match ConfigManager::from_env().and_then(|manager| manager.load()) {
        Ok(config) => config,
        Err(err) => {
            warn!("falling back to default configuration: {err}");
            Config::default()
        }
    }
}

fn parse_project_args(args: Vec<String>) -> Result<ProjectArgs, CliError> {
    let mut input = None;
    let mut start = None;
    let mut end = None;
    let mut balance = 0;
    let mut csv = None;
    let mut stats = false;

    let mut iter = args.into_iter();
    while let Some(flag) = iter.next() {
        match flag.as_str() {
            "--stats" => stats = true,
            "--input" | "--start" | "--end" | "--balance" | "--csv" => {
                let value = iter
                    .next()
                    .ok_or_else(|| CliError::Usage(format!("{flag} needs a value")))?;
                match flag.as_str() {
                    "--input" => input = Some(PathBuf::from(value)),
                    "--start" => start = Some(parse_flag_date(&flag, &value)?),
                    "--end" => end = Some(parse_flag_date(&flag, &value)?),
                    "--balance" => balance = parse_dollars(&value, true),
                    _ => csv = Some(value),
                }
            }
            other => return Err(CliError::Usage(format!("unknown option `{other}`"))),
        }
    }

    Ok(ProjectArgs {
        input: input.ok_or_else(|| CliError::Usage("--input is required".into()))?,
        start: start.ok_or_else(|| CliError::Usage("--start is required".into()))?,
        end,
        balance,
        csv,
        stats,
    })
}

fn parse_flag_date(flag: &str, value: &str) -> Result<NaiveDate, CliError> {
    parse_date(value)
        .ok_or_else(|| CliError::Usage(format!("{flag} expects YYYY-MM-DD, got `{value}`")))
}

fn run_project(config: &Config, args: ProjectArgs) -> Result<(), CliError> {
    let csv_to_stdout = args.csv.as_deref() == Some(STDOUT_TARGET);
    output::set_preferences(OutputPreferences {
        color: config.ui_color_enabled,
        quiet_mode: csv_to_stdout,
    });

    let transactions = persistence::load_definitions_from_file(&args.input)?;
    let end = match args.end {
        Some(end) => end,
        None => add_days(args.start, i64::from(config.default_window_days.max(1)) - 1)
            .ok_or_else(|| CliError::Usage("window end is out of range".into()))?,
    };
    let request = ProjectionRequest::new(transactions, args.start, end, args.balance);

    let context = ExecutionContext::new(ProjectionEngine::with_options(
        config.projection_options(),
    ));
    let (sink, mut inbox) = progress_channel();
    let handle = context.submit(request, sink).ok_or(CliError::Busy)?;
    let mut projection = pump_until_done(handle, &mut inbox)?;

    if let Some(target) = args.csv.as_deref() {
        write_csv(&projection, target)?;
    }
    print_summary(&projection);
    if args.stats {
        match projection.stats() {
            Ok(stats) => {
                output::section("Stats");
                output::info(format!("\n{stats}"));
            }
            Err(err) => output::warning(err),
        }
    }
    projection.release();
    Ok(())
}

/// Polls the worker from this thread, which owns the terminal.
fn pump_until_done(
    mut handle: ProjectionHandle,
    inbox: &mut ProgressInbox,
) -> Result<Projection, CliError> {
    loop {
        inbox.drain(|update| output::status(update));
        match handle.try_finish() {
            Ok(result) => {
                inbox.drain(|update| output::status(update));
                return Ok(result?);
            }
            Err(pending) => {
                handle = pending;
                thread::sleep(POLL_INTERVAL);
            }
        }
    }
}

fn write_csv(projection: &Projection, target: &str) -> Result<(), CliError> {
    if target == STDOUT_TARGET {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        export::write_rows(&projection.rows, &mut lock)?;
        lock.flush()?;
    } else {
        let file = fs::File::create(target)?;
        export::write_rows(&projection.rows, file)?;
        output::success(format!("wrote {} rows to {}", projection.len(), target));
    }
    Ok(())
}

fn print_summary(projection: &Projection) {
    let (Some(first), Some(last)) = (projection.rows.first(), projection.rows.last()) else {
        return;
    };
    output::section("Projection");
    output::info(format!(
        "{} to {} ({} days)",
        first.date,
        last.date,
        projection.len()
    ));
    output::info(format!(
        "balance {} -> {}",
        output::amount(projection.starting_balance),
        output::amount(last.balance)
    ));
    output::info(format!(
        "income {}  expenses {}",
        output::amount(last.cumulative_income),
        output::amount(last.cumulative_expenses)
    ));
    if let Some(lowest) = projection.rows.iter().min_by_key(|row| row.balance) {
        output::info(format!(
            "lowest balance {} on {}",
            output::amount(lowest.balance),
            lowest.date
        ));
    }
}

fn print_usage() {
    eprintln!(
        "Usage: forecast_core_cli <command>\n\
         Commands:\n  \
         project --input <file.json> --start <YYYY-MM-DD> [--end <YYYY-MM-DD>]\n          \
         [--balance <dollars>] [--csv <file.csv>|-] [--stats]\n  \
         version\n  \
         help"
    );
}
