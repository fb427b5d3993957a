//! cgar-collect - cgroup snapshot collector.
//!
//! Walks the configured cgroup subtrees once and appends the resulting
//! snapshot as a single JSON line to the configured log file.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;
#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{Level, debug, error, info};
use tracing_subscriber::EnvFilter;

use cgar::collector::{Collector, RealFs};
use cgar::config::{Config, DEFAULT_CONFIG_PATH};
use cgar::storage::{SnapshotAppender, render_line};
use cgar::util::{LogSink, TracingSink};

/// Exit code for an unusable configuration.
const EXIT_CONFIG: u8 = 2;

/// cgroup snapshot collector.
#[derive(Parser)]
#[command(name = "cgar-collect", about = "Collects cgroup data and writes them to a log file", version)]
struct Args {
    /// Path to the JSON configuration file.
    #[arg(default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,

    /// Print the JSON line to stdout instead of appending it to the log file.
    #[arg(long)]
    dry_run: bool,
}

/// Initializes the tracing subscriber with the appropriate log level.
/// Default level is INFO. Use -q for quiet mode (errors only).
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };
    let level = level.as_str().to_ascii_lowercase();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("cgar={level},cgar_collect={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Args) -> ExitCode {
    let config = match Config::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    info!(
        "Config: cgroup_root={}, roots={}, channel_capacity={}, logfile={}",
        config.cgroup_root.display(),
        config.collect.len(),
        config.channel_capacity,
        config.logfile.display()
    );
    for request in &config.collect {
        debug!(
            "Scan: cgroup=\"{}\" depth={} controllers={:?}",
            request.cgroup, request.depth, request.controllers
        );
    }

    let sink: Arc<dyn LogSink> = Arc::new(TracingSink);
    let mut collector = Collector::new(RealFs::new(), &config.cgroup_root, sink)
        .with_registry(config.registry())
        .with_channel_capacity(config.channel_capacity);
    if let Some(timeout) = config.timeout() {
        collector = collector.with_timeout(timeout);
    }

    let snapshot = match collector.collect(&config.collect) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            error!("Collection failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if args.dry_run {
        match render_line(&snapshot) {
            Ok(line) => print!("{}", line),
            Err(e) => error!("{}", e),
        }
        return ExitCode::SUCCESS;
    }

    let appender = SnapshotAppender::new(&config.logfile);
    match appender.append(&snapshot) {
        Ok(bytes) => info!(
            "Snapshot {}: {} nodes appended to {} ({} bytes)",
            snapshot.timestamp_key(),
            snapshot.len(),
            appender.path().display(),
            bytes
        ),
        Err(e) => error!("{}", e),
    }

    ExitCode::SUCCESS
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    let argv: Vec<String> = std::env::args().collect();
    info!("Called as: {}", argv.join(" "));

    let code = run(&args);

    info!("Terminated.");
    code
}
