//! Logger setup for the `scrape-monitor` binary.
//!
//! Diagnostics go to stderr so stdout carries only the rendered session.

use std::path::PathBuf;

use monitor_logging::{LevelFilter, LogDestination};

pub(crate) fn initialize(log_file: Option<PathBuf>, verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let destination = match log_file {
        Some(path) => LogDestination::Both(path),
        None => LogDestination::Terminal,
    };
    monitor_logging::initialize(destination, level);
}
