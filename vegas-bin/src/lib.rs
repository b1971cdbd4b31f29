//! Bits shared by the terminal drivers.

use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use vegas_core::{GameConfig, Round};

/// Send logs to stderr, filtered by `RUST_LOG` or else `default_filter`
pub fn init_logging(default_filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// The standard rules, or those read from a JSON file, with any command line overrides on top
pub fn load_config(
    path: Option<&Path>,
    max_rounds: Option<Round>,
) -> Result<GameConfig, Box<dyn Error>> {
    let mut config = match path {
        Some(p) => serde_json::from_reader(BufReader::new(File::open(p)?))?,
        None => GameConfig::default(),
    };
    if let Some(r) = max_rounds {
        config.max_rounds = r;
    }
    config.validate()?;
    Ok(config)
}
