// File: ./src/logging.rs
//! Logger setup.
//!
//! The TUI owns the terminal, so it logs to `agenda.log` in the data directory.
//! One-shot subcommands log to stderr instead.
use crate::context::AppContext;
use anyhow::{Context, Result};
use log::LevelFilter;
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode, WriteLogger};
use std::fs::OpenOptions;

fn log_config() -> simplelog::Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Off)
        .set_thread_level(LevelFilter::Off)
        .add_filter_allow_str("agenda")
        .build()
}

pub fn init_file_logger(ctx: &dyn AppContext, level: LevelFilter) -> Result<()> {
    let path = ctx.get_log_path()?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;
    WriteLogger::init(level, log_config(), file).context("Logger already initialized")?;
    Ok(())
}

pub fn init_term_logger(level: LevelFilter) -> Result<()> {
    TermLogger::init(level, log_config(), TerminalMode::Stderr, ColorChoice::Auto)
        .context("Logger already initialized")?;
    Ok(())
}
