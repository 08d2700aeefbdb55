use std::fs;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use anyhow::{Context, Result};
use log::{LevelFilter, info, warn};
use serde::Serialize;

use crate::EPOCH;
use crate::config::WaveConfig;

pub mod cli;
pub mod output;

/// Reads a [`WaveConfig`] from a JSON file, missing fields take their default value
pub fn read_config(path: &Path) -> Result<WaveConfig> {
    let file = File::open(path)
        .with_context(|| format!("could not open config file: {}", path.display()))?;
    let reader = BufReader::new(file);
    let config: WaveConfig = serde_json::from_reader(reader)
        .with_context(|| format!("incorrect config file format: {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("invalid config file: {}", path.display()))?;
    Ok(config)
}

/// Loads the config file if one is given, the default config otherwise
pub fn load_config(path: Option<&Path>) -> Result<WaveConfig> {
    match path {
        Some(path) => read_config(path),
        None => {
            warn!("[MAIN] no config file provided, use --config-file to provide a custom config");
            Ok(WaveConfig::default())
        }
    }
}

pub fn write_json(json: &impl Serialize, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("could not open file: {}", path.display()))?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, json)
        .with_context(|| format!("could not write json file: {}", path.display()))?;

    info!("[IO] json written to {}", canonical_display(path));
    Ok(())
}

/// Canonical form of `path` for log lines, falls back to the path as given
pub fn canonical_display(path: &Path) -> String {
    fs::canonicalize(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}

pub fn init_logger(level_filter: LevelFilter) -> Result<()> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            let duration = EPOCH.elapsed();
            let sec = duration.as_secs() % 60;
            let min = (duration.as_secs() / 60) % 60;
            let hours = (duration.as_secs() / 60) / 60;

            let prefix = format!(
                "[{}] [{:0>2}:{:0>2}:{:0>2}]",
                record.level(),
                hours,
                min,
                sec,
            );

            out.finish(format_args!("{prefix:<20}{message}"))
        })
        .level(level_filter)
        .chain(std::io::stdout())
        .apply()
        .context("could not initialize logger")?;
    info!("[MAIN] epoch: {}", jiff::Timestamp::now());
    Ok(())
}
