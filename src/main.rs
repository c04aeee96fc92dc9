//! keyheat CLI
//!
//! Records a key-press session and renders the press-frequency heatmap.

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use keyheat::{
    collector::{Collector, CollectorConfig, KeyId},
    config::Config,
    core::{colorize, drive, format_report, SessionEnd, SessionSummary, SessionTracker},
    keylog::{list_logs, save_session, SessionLog},
    layout::{paint, render_ansi, KeyboardLayout},
    Histogram, SESSION_BANNER, VERSION,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "keyheat")]
#[command(version = VERSION)]
#[command(about = "Keyboard usage tracker with a press-frequency heatmap", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a session from JSON-lines key events
    Record {
        /// Event file to replay (defaults to stdin)
        #[arg(long, short)]
        input: Option<PathBuf>,

        /// Consecutive termination-key releases that end the session
        #[arg(long)]
        threshold: Option<u32>,

        /// Key that ends the session when released repeatedly
        #[arg(long)]
        termination_key: Option<String>,

        /// Directory for the session log
        #[arg(long)]
        log_dir: Option<PathBuf>,

        /// Don't write a session log
        #[arg(long)]
        no_save: bool,

        /// Don't render the heatmap at the end
        #[arg(long)]
        no_heatmap: bool,
    },

    /// Render the heatmap for a saved session log
    Show {
        /// Session log file
        log: PathBuf,
    },

    /// Print statistics for a saved session log
    Stats {
        /// Session log file
        log: PathBuf,
    },

    /// List saved session logs
    Logs {
        /// Directory to search (defaults to the configured log directory)
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Show configuration
    Config,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Record {
            input,
            threshold,
            termination_key,
            log_dir,
            no_save,
            no_heatmap,
        } => cmd_record(RecordOptions {
            input,
            threshold,
            termination_key,
            log_dir,
            save: !no_save,
            heatmap: !no_heatmap,
        }),
        Commands::Show { log } => cmd_show(&log),
        Commands::Stats { log } => cmd_stats(&log),
        Commands::Logs { dir } => cmd_logs(dir),
        Commands::Config => cmd_config(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("keyheat=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

struct RecordOptions {
    input: Option<PathBuf>,
    threshold: Option<u32>,
    termination_key: Option<String>,
    log_dir: Option<PathBuf>,
    save: bool,
    heatmap: bool,
}

fn load_config() -> Config {
    match Config::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, "could not load config, using defaults");
            Config::default()
        }
    }
}

fn cmd_record(options: RecordOptions) -> Result<()> {
    let mut config = load_config();
    if let Some(threshold) = options.threshold {
        config.termination_threshold = threshold;
    }
    if let Some(key) = options.termination_key {
        config.termination_key = KeyId::from(key);
    }
    if let Some(dir) = options.log_dir {
        config.log_dir = dir;
    }
    config.validate()?;

    let tracker_config = config.tracker_config();

    println!("keyheat v{VERSION}");
    println!("{SESSION_BANNER}");
    println!(
        "  Termination: release '{}' {} times in a row",
        tracker_config.termination_key, tracker_config.termination_threshold
    );
    println!(
        "  Input: {}",
        options
            .input
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "stdin".to_string())
    );
    println!();

    let mut collector = match &options.input {
        Some(path) => Collector::from_path(CollectorConfig::default(), path)
            .with_context(|| format!("opening {}", path.display()))?,
        None => Collector::stdin(CollectorConfig::default()),
    };

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .context("setting Ctrl+C handler")?;

    let mut tracker = SessionTracker::new(tracker_config);
    tracing::info!(started_at = %tracker.started_at(), "session started");
    collector.start()?;

    let receiver = collector.receiver().clone();
    let end = drive(&mut tracker, &receiver, &running);
    collector.stop();

    match end {
        SessionEnd::Gesture => println!("Stopping keyboard tracker."),
        SessionEnd::Interrupted => println!("Interrupted, finishing session."),
        SessionEnd::SourceClosed => println!("Input ended before the exit gesture, finishing session."),
    }

    let session = tracker.finish(Utc::now());
    println!();
    print!("{}", session.report());

    if options.save {
        let path = save_session(&session, &config.log_dir)?;
        println!();
        println!("Saved session log to {path:?}");
    }

    if options.heatmap {
        println!();
        print_heatmap(&config, &session.histogram)?;
    }

    Ok(())
}

fn print_heatmap(config: &Config, histogram: &Histogram) -> Result<()> {
    if histogram.is_empty() {
        println!("No keys were pressed; nothing to draw.");
        return Ok(());
    }

    let heatmap = colorize(histogram, &config.palette())?;
    let painted = paint(&KeyboardLayout::qwerty(), &heatmap.assignment, config.unseen_color);
    print!("{}", render_ansi(&painted));
    println!(
        "Scale: {} press(es) = {}  ...  {} press(es) = {}",
        heatmap.lowest, config.low_color, heatmap.highest, config.high_color
    );
    if !painted.skipped.is_empty() {
        let skipped: Vec<String> = painted.skipped.iter().map(|k| k.to_string()).collect();
        println!("Not on layout: {}", skipped.join(", "));
    }
    Ok(())
}

fn load_log(path: &Path) -> Result<SessionLog> {
    SessionLog::load(path).with_context(|| format!("reading session log {}", path.display()))
}

fn cmd_show(path: &Path) -> Result<()> {
    let config = load_config();
    let log = load_log(path)?;

    println!("Session of {} ({})", log.date, log.duration);
    println!();
    if log.keylog.is_empty() {
        bail!("session log {} has no key counts", path.display());
    }
    print_heatmap(&config, &log.keylog)
}

fn cmd_stats(path: &Path) -> Result<()> {
    let log = load_log(path)?;
    let counted = log.counted_total();
    if counted != log.total_count {
        tracing::warn!(
            stored = log.total_count,
            counted,
            "total_count does not match per-key counts"
        );
    }

    // Only the totals and duration survive in the log, so rebuild a summary
    // around them for the shared report format.
    let now = Utc::now();
    let summary = SessionSummary {
        started_at: now,
        ended_at: now,
        total_count: log.total_count,
        distinct_keys: log.keylog.len(),
        elapsed: log.duration,
    };

    println!("Session of {}", log.date);
    print!("{}", format_report(&summary, &log.keylog));
    Ok(())
}

fn cmd_logs(dir: Option<PathBuf>) -> Result<()> {
    let dir = dir.unwrap_or_else(|| load_config().log_dir);
    let logs = list_logs(&dir)?;

    if logs.is_empty() {
        println!("No session logs found in {dir:?}");
        println!("Run 'keyheat record' to begin a session.");
        return Ok(());
    }

    println!("Found {} session log(s) in {:?}", logs.len(), dir);
    for path in logs {
        match SessionLog::load(&path) {
            Ok(log) => println!(
                "  {}  {}  {}  {} presses",
                path.file_name().and_then(|n| n.to_str()).unwrap_or("?"),
                log.date,
                log.duration,
                log.total_count
            ),
            Err(e) => println!("  {}  (unreadable: {e})", path.display()),
        }
    }
    Ok(())
}

fn cmd_config() -> Result<()> {
    let config = load_config();

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
