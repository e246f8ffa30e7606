//! Exit Options
//!
//! A borderless dialog offering cancel, lock, logout, reboot and shutdown
//! as icon buttons. Each button shells out to the matching system command
//! and the dialog closes.

mod config;
mod display;
mod session;
mod shell;

use anyhow::{Context, Result};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::Config;
use display::DisplayInfo;

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "exit_options=info,warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run() {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    if display::window_already_open(shell::WINDOW_TITLE) {
        info!("{} window already active; exiting.", shell::WINDOW_TITLE);
        return Ok(());
    }

    let config = Config::load()?;

    let display = DisplayInfo::query().unwrap_or_else(|e| {
        warn!("Display query failed, assuming 96 DPI without compositor: {:#}", e);
        DisplayInfo::default()
    });

    info!("Starting {}", shell::WINDOW_TITLE);
    shell::run(config, display).context("Failed to run dialog")
}
