//! osr-host: off-screen browser rendering demo
//!
//! Opens a window, composites a test-pattern engine's paints into it
//! through the OSR bridge, and forwards window input back to the engine.
//!
//! Usage: `osr-host [config.toml]`

mod app;
mod config;
mod input;
mod pattern;
mod surface;

use anyhow::Result;
use config::HostConfig;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

// Use mimalloc as the global allocator for reduced memory fragmentation
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> Result<()> {
    let config = match std::env::args_os().nth(1) {
        Some(path) => HostConfig::load(path)?,
        None => HostConfig::default(),
    };

    // RUST_LOG wins over the configured filter
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.browser.log_filter));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    info!("osr-host starting...");
    info!("Start URL: {}", config.browser.start_url);

    app::run(config)?;

    info!("osr-host shutting down");
    Ok(())
}
