use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Instance in the plain text format
    #[arg(short, long, value_name = "FILE")]
    pub input_file: PathBuf,
    /// Destination of the solution in the plain text format
    #[arg(short, long, value_name = "FILE")]
    pub output_file: PathBuf,
    #[arg(short, long, value_name = "FILE")]
    pub config_file: Option<PathBuf>,
    /// Optional JSON report with the instance summary, solution, config and iteration trace
    #[arg(short, long, value_name = "FILE")]
    pub report_file: Option<PathBuf>,
    /// Overrides the time budget of the config file
    #[arg(short, long, value_name = "SECONDS")]
    pub time_budget: Option<u64>,
    #[arg(
        short,
        long,
        value_name = "[off, error, warn, info, debug, trace]",
        default_value = "info"
    )]
    pub log_level: LevelFilter,
}
