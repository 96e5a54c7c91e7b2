mod config;
mod core;
mod error;
mod render;
mod spatial;
mod types;
mod ui;

use std::sync::Mutex;

use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::{config::Settings, error::Error};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::parse();
    settings.validate()?;
    init_logging(&settings)?;
    info!("meshdrift v{}", env!("CARGO_PKG_VERSION"));
    ui::run(settings)?;
    Ok(())
}

/// Logs go to a file because the terminal is taken over by the canvas.
fn init_logging(settings: &Settings) -> Result<(), Error> {
    let Some(path) = &settings.log_file else {
        return Ok(());
    };
    let file = std::fs::File::create(path)?;
    let subscriber = FmtSubscriber::builder()
        .with_max_level(parse_level(&settings.log_level))
        .with_target(true)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Logging(e.to_string()))
}

fn parse_level(name: &str) -> Level {
    match name.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_levels() {
        assert_eq!(parse_level("DEBUG"), Level::DEBUG);
        assert_eq!(parse_level("trace"), Level::TRACE);
    }

    #[test]
    fn unknown_level_falls_back_to_info() {
        assert_eq!(parse_level("loud"), Level::INFO);
    }
}
