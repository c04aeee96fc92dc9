//! Demonstration of a full keyheat session.
//!
//! This example shows how to:
//! 1. Replay recorded key events through a collector
//! 2. Drive a session tracker until the exit gesture
//! 3. Print the end-of-session report
//! 4. Colorize the counts and paint them onto a keyboard layout
//!
//! Run with: cargo run --example replay_demo [events.jsonl]
//!
//! Without an argument the bundled `demos/sample_session.jsonl` is used.

use std::io::Cursor;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use keyheat::{
    collector::{Collector, CollectorConfig},
    core::{colorize, drive, Palette, SessionEnd, SessionTracker, TrackerConfig},
    layout::{paint, render_ansi, KeyboardLayout, DEFAULT_UNSEEN_COLOR},
    Color, SESSION_BANNER,
};

const SAMPLE: &str = include_str!("sample_session.jsonl");

fn main() {
    println!("keyheat - Replay Demo");
    println!("=====================");
    println!("{SESSION_BANNER}");

    let mut collector = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => match Collector::from_path(CollectorConfig::default(), &path) {
            Ok(collector) => {
                println!("Replaying {}", path.display());
                collector
            }
            Err(e) => {
                eprintln!("Error opening {}: {e}", path.display());
                return;
            }
        },
        None => {
            println!("Replaying bundled sample session");
            Collector::new(CollectorConfig::default(), Cursor::new(SAMPLE))
        }
    };
    println!();

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl+C handler");

    if let Err(e) = collector.start() {
        eprintln!("Error starting collector: {e}");
        return;
    }

    let mut tracker = SessionTracker::new(TrackerConfig::default());
    let end = drive(&mut tracker, collector.receiver(), &running);
    collector.stop();

    match end {
        SessionEnd::Gesture => println!("Exit gesture seen."),
        SessionEnd::Interrupted => println!("Interrupted."),
        SessionEnd::SourceClosed => println!("Input ended without the exit gesture."),
    }

    let session = tracker.finish(chrono::Utc::now());
    println!();
    print!("{}", session.report());
    println!();

    let heatmap = match colorize(&session.histogram, &Palette::default()) {
        Ok(heatmap) => heatmap,
        Err(e) => {
            eprintln!("Nothing to draw: {e}");
            return;
        }
    };

    let unseen = Color::from_hex(DEFAULT_UNSEEN_COLOR).expect("valid default color");
    let painted = paint(&KeyboardLayout::qwerty(), &heatmap.assignment, unseen);
    print!("{}", render_ansi(&painted));
    println!();
    println!(
        "Gradient: {} colors for counts {}..={}",
        heatmap.range_size(),
        heatmap.lowest,
        heatmap.highest
    );
    println!("Demo complete!");
}
