mod menu;

use anyhow::Result;
use std::fs::{self, OpenOptions};

use tracing_subscriber::{prelude::*, EnvFilter};

use cozysync_core::{config, AppConfig, SaveSync};

fn main() -> Result<()> {
    init_logging()?;

    if config::ensure_default_config()? {
        println!("Wrote a starter config.toml next to the binary.");
        println!("Fill in the remote settings and your save paths, then run again.");
        return Ok(());
    }

    let config = AppConfig::load()?;
    let sync = SaveSync::new(&config)?;

    menu::run(&config, &sync)
}

fn init_logging() -> Result<()> {
    let log_dir = std::env::current_dir()?.join("logs");
    fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join("cozysync.log");

    let env_filter = EnvFilter::from_default_env();

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .compact()
        .with_writer(std::io::stdout);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .compact()
        .with_writer(move || {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_path)
                .expect("failed to open log file")
        });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    Ok(())
}
