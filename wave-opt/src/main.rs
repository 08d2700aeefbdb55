use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use log::{info, warn};
use wave_core::entities::DecisionAssignment;
use wave_core::index::DemandSupplyIndex;
use wave_core::io::export::write_solution;
use wave_core::io::ext_repr::ExtInstanceSummary;
use wave_core::io::import::read_instance;
use wave_opt::io::cli::Cli;
use wave_opt::io::output::WaveOutput;
use wave_opt::opt::WaveOptimizer;
use wave_opt::time::Stopwatch;
use wave_opt::{EPOCH, io};

fn main() -> Result<()> {
    let args = Cli::parse();
    io::init_logger(args.log_level)?;

    let mut config = io::load_config(args.config_file.as_deref())?;
    if let Some(time_budget) = args.time_budget {
        config.time_budget_s = time_budget;
    }
    config.validate().context("invalid configuration")?;
    info!("[MAIN] successfully parsed WaveConfig: {config:?}");

    let instance = read_instance(&args.input_file)?;

    //the budget covers the whole run, including reading the instance
    let clock = Stopwatch::since(*EPOCH);
    let mut optimizer = WaveOptimizer::new(config.clone())?;
    let report = optimizer.solve_timed(&instance, &clock)?;

    let assignment = match report.assignment() {
        Some(assignment) => assignment.clone(),
        None => {
            warn!("[MAIN] no valid wave found, writing an empty solution");
            DecisionAssignment::empty()
        }
    };
    write_solution(&assignment, &args.output_file)?;

    if let Some(report_file) = &args.report_file {
        let index = DemandSupplyIndex::new(&instance);
        let output = WaveOutput::new(ExtInstanceSummary::new(&instance, &index), &report, config);
        io::write_json(&output, report_file)?;
    }

    Ok(())
}
