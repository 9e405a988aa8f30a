use clap::Parser;
use kd_index::kd3d::log::LogSeverity;
use kd_index::kd3d::Diagnostics;
use kd_index::{kd_error, kd_info};
use marble_demo::{Args, Simulation};
use std::process::ExitCode;

const SOURCE: &str = "marbles::main";

fn main() -> ExitCode {
    let args = Args::parse();
    if args.verbose {
        Diagnostics::set_min_severity(LogSeverity::Debug);
    }

    let mut simulation = match Simulation::new(args.to_config()) {
        Ok(simulation) => simulation,
        Err(error) => {
            kd_error!(SOURCE, "Cannot start simulation: {}", error);
            return ExitCode::FAILURE;
        }
    };

    let report = simulation.run(args.ticks);

    kd_info!(SOURCE, "Ran {} ticks, {} marbles in play", report.ticks, report.marbles);
    kd_info!(
        SOURCE,
        "{} claims, {} targets lost to other hunters",
        report.claims,
        report.lost_targets
    );
    kd_info!(
        SOURCE,
        "Index: {} rebuilds, avg search length {:.2}, avg result depth {:.2}",
        report.rebuilds,
        report.average_search_length,
        report.average_search_depth
    );
    if let Some((_, score)) = report.best_hunter {
        kd_info!(SOURCE, "Best hunter scored {:.1}", score);
    }

    ExitCode::SUCCESS
}
