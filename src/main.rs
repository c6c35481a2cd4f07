//! pencil-relay - Stylus input relay harness
//!
//! Entry point for the replay binary. Drives a relay from a JSON Lines trace or a
//! synthetic stroke and reports what the consumer saw.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pencil_relay::config::{Config, Overrides};
use pencil_relay::record::{PenEvent, SampleRecord};
use pencil_relay::relay::PencilRelay;
use pencil_relay::replay::{
    read_trace, replay_threaded, synthetic_stroke, write_trace, RecordingSink, ReplayDriver,
    StrokeShape, TraceEvent,
};
use pencil_relay::utils::{format_user_error, MetricsCollector};

/// Command-line arguments for pencil-relay
#[derive(Parser, Debug)]
#[command(name = "pencil-relay")]
#[command(version, about = "Stylus input relay replay harness", long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, env = "PENCIL_RELAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// JSON Lines trace to replay (default: synthetic stroke)
    #[arg(short, long)]
    pub trace: Option<PathBuf>,

    /// Shared buffer capacity in records
    #[arg(long, env = "PENCIL_RELAY_CAPACITY")]
    pub capacity: Option<usize>,

    /// Records written between automatic flushes
    #[arg(long, env = "PENCIL_RELAY_FLUSH_EVERY")]
    pub flush_every: Option<usize>,

    /// Samples in the synthetic stroke
    #[arg(long)]
    pub points: Option<usize>,

    /// Append a barrel tap after the synthetic stroke
    #[arg(long)]
    pub barrel_tap: bool,

    /// Run the producer on its own thread with tick-driven flushes
    #[arg(long)]
    pub threaded: bool,

    /// Write the replayed events as a JSON Lines trace and continue
    #[arg(long)]
    pub dump_trace: Option<PathBuf>,

    /// Print every decoded event
    #[arg(long)]
    pub print_events: bool,

    /// Metrics output (prometheus|json)
    #[arg(long, default_value = "prometheus")]
    pub metrics_format: String,

    /// Verbose logging (can be specified multiple times)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log format (json|pretty|compact)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Write logs to file (in addition to stderr)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration before logging so the file can pick the format
    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", format_user_error(&e));
            return Err(e);
        }
    };

    // Initialize logging
    let _log_guard = init_logging(&config, args.verbose)?;

    info!("════════════════════════════════════════════════════════");
    info!("  pencil-relay v{}", env!("CARGO_PKG_VERSION"));
    info!("  Built: {} {}", env!("BUILD_DATE"), env!("BUILD_TIME"));
    info!("  Commit: {}", env!("GIT_HASH"));
    info!("  Profile: {}", if cfg!(debug_assertions) { "debug" } else { "release" });
    info!("════════════════════════════════════════════════════════");
    debug!("Config: {:?}", config);

    if let Err(e) = run(&config, &args) {
        eprintln!("{}", format_user_error(&e));
        return Err(e);
    }

    Ok(())
}

fn load_config(args: &Args) -> Result<Config> {
    let config = Config::load_or_default(args.config.as_deref())?.with_overrides(Overrides {
        capacity: args.capacity,
        flush_every: args.flush_every,
        trace: args.trace.clone(),
        points: args.points,
        barrel_tap: args.barrel_tap,
        threaded: args.threaded,
        log_format: args.log_format.clone(),
        log_file: args.log_file.clone(),
    });

    // Overrides can push values out of range
    config.validate().context("Invalid config after CLI overrides")?;
    Ok(config)
}

fn load_events(config: &Config) -> Result<Vec<TraceEvent>> {
    if let Some(path) = &config.replay.trace {
        let file = File::open(path)
            .with_context(|| format!("Failed to open trace: {}", path.display()))?;
        let events = read_trace(BufReader::new(file))
            .with_context(|| format!("Failed to load trace: {}", path.display()))?;
        info!("Loaded {} events from {}", events.len(), path.display());
        return Ok(events);
    }

    let mut events = synthetic_stroke(config.replay.points, StrokeShape::default());
    if config.replay.barrel_tap {
        events.push(TraceEvent::BarrelTap);
    }
    info!(
        "Generated synthetic stroke: {} points, {} events",
        config.replay.points,
        events.len()
    );
    Ok(events)
}

fn dump_events(path: &Path, events: &[TraceEvent]) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create trace: {}", path.display()))?;
    write_trace(events, std::io::BufWriter::new(file))
        .with_context(|| format!("Failed to write trace: {}", path.display()))?;
    info!("Wrote {} events to {}", events.len(), path.display());
    Ok(())
}

fn run(config: &Config, args: &Args) -> Result<()> {
    let events = load_events(config)?;
    if let Some(path) = &args.dump_trace {
        dump_events(path, &events)?;
    }

    let mut metrics = MetricsCollector::new();
    let capacity = config.relay.capacity;

    let (summary, sink, stats) = if config.replay.threaded {
        let tick = Duration::from_millis(config.replay.tick_ms);
        info!("Threaded replay: capacity {}, tick {:?}", capacity, tick);
        let run = replay_threaded(events, capacity, tick);
        (run.summary, run.sink, run.stats)
    } else {
        info!(
            "Inline replay: capacity {}, flush every {}",
            capacity, config.relay.flush_every
        );
        let mut storage = vec![SampleRecord::default(); capacity];
        let mut relay = PencilRelay::new();
        relay.register(RecordingSink::new(), &mut storage);

        let summary = ReplayDriver::new(config.relay.flush_every).run(&mut relay, events);
        let stats = relay.stats();
        let sink = relay.unregister().unwrap_or_default();
        (summary, sink, stats)
    };

    if stats.lapped_records > 0 {
        warn!(
            "{} records were overwritten before the consumer was notified; raise --capacity or flush more often",
            stats.lapped_records
        );
    }

    if args.print_events {
        for event in &sink.events {
            match event {
                PenEvent::Sample(s) => println!(
                    "sample pos=({:.1},{:.1}) pressure={:.3} tilt=({:.2},{:.2}) tip={} pending={} update={} predicted={} idx={}",
                    s.position.0,
                    s.position.1,
                    s.pressure,
                    s.tilt.0,
                    s.tilt.1,
                    s.buttons.tip,
                    s.buttons.pending_estimates,
                    s.buttons.estimation_update,
                    s.buttons.predicted,
                    s.estimation_update_index
                ),
                PenEvent::BarrelTap => println!("barrel_tap"),
            }
        }
    }

    info!(
        "Replayed {} events: {} records written, {} notified in {} flushes ({:?})",
        summary.events,
        summary.records_written(),
        summary.records_notified(),
        summary.notifying_flushes,
        summary.elapsed
    );

    if config.logging.metrics {
        metrics.record_relay_stats(&stats);
        metrics.record_replay(&summary);
        match args.metrics_format.as_str() {
            "json" => println!("{}", metrics.export_json()?),
            _ => print!("{}", metrics.export_prometheus()),
        }
    }

    Ok(())
}

fn init_logging(config: &Config, verbose: u8) -> Result<Option<WorkerGuard>> {
    let log_level = match verbose {
        0 => config.logging.level.to_lowercase(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "pencil_relay={level},warn",
            level = log_level
        ))
    });

    // Stdout carries events and metrics, so logs go to stderr
    let mut guard = None;
    let file_writer = match &config.logging.log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file: {}", path.display()))?;
            let (writer, worker_guard) = tracing_appender::non_blocking(file);
            guard = Some(worker_guard);
            Some(writer)
        }
        None => None,
    };

    match config.logging.format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .with(file_writer.map(|writer| {
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(writer)
                        .with_ansi(false)
                }))
                .init();
        }
        "compact" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .compact()
                        .with_writer(std::io::stderr),
                )
                .with(file_writer.map(|writer| {
                    tracing_subscriber::fmt::layer()
                        .compact()
                        .with_writer(writer)
                        .with_ansi(false)
                }))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .pretty()
                        .with_writer(std::io::stderr),
                )
                .with(file_writer.map(|writer| {
                    tracing_subscriber::fmt::layer()
                        .with_writer(writer)
                        .with_ansi(false)
                }))
                .init();
        }
    }

    if let Some(path) = &config.logging.log_file {
        info!("Logging to file: {}", path.display());
    }

    Ok(guard)
}
