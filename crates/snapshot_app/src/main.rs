mod config;
mod logging;
mod progress;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use engine_logging::{engine_error, engine_info};
use log::LevelFilter;
use snapshot_engine::run_snapshot;

use crate::config::{build_engine_config, CliOverrides, FileConfig};
use crate::logging::LogDestination;
use crate::progress::LogProgressSink;

#[derive(Parser)]
/// Builds the course data script from the institution API and the timetable report.
///
/// The personnel cache is kept between runs and only refetched when an
/// instructor is missing from it.
struct Args {
    /// Static API key exchanged for a session token.
    #[arg(long, env = "DARTMOUTH_API_KEY", hide_env_values = true)]
    key: String,

    /// RON file with endpoint, timeout and path overrides.
    #[arg(long, short, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Where to write the data script [default: data.js].
    #[arg(long, short, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Personnel cache file [default: people.json].
    #[arg(long, value_name = "FILE")]
    cache: Option<PathBuf>,

    /// Parse the timetable report without running its scripts.
    #[arg(long, default_value_t = false)]
    static_render: bool,

    /// Also write the log to ./snapshot.log.
    #[arg(long, default_value_t = false)]
    log_file: bool,

    /// Log at debug level.
    #[arg(long, short, default_value_t = false)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let destination = if args.log_file {
        LogDestination::Both
    } else {
        LogDestination::Terminal
    };
    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    logging::initialize(destination, level);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            engine_error!("Snapshot failed: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let file = match args.config.as_deref() {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let config = build_engine_config(
        file,
        CliOverrides {
            output: args.output,
            people_cache: args.cache,
            static_render: args.static_render,
        },
    );

    let runtime = tokio::runtime::Runtime::new().context("starting tokio runtime")?;
    let summary = runtime.block_on(run_snapshot(&config, &args.key, Arc::new(LogProgressSink)))?;
    engine_info!(
        "Wrote {:?} ({} sections, {} courses, {} people, {} timetable entries)",
        summary.output_path,
        summary.sections,
        summary.courses,
        summary.people,
        summary.timetable_entries
    );
    Ok(())
}
