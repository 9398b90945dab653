//! Tracing setup.
//!
//! The terminal belongs to the game, so log output goes to a file or
//! nowhere. The filter comes from `MATHMAGIC_LOG` and defaults to `info`.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const LOG_ENV: &str = "MATHMAGIC_LOG";

pub fn init_tracing(log_file: Option<&Path>) -> std::io::Result<()> {
    let env_filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    let Some(path) = log_file else {
        tracing_subscriber::registry().with(env_filter).init();
        return Ok(());
    };

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    tracing_subscriber::registry()
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        .with(env_filter)
        .init();
    tracing::info!(path = %path.display(), "logging initialized");
    Ok(())
}
