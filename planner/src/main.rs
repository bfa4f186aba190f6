use anyhow::Context;
use clap::Parser;
use generator::profile::build_scenario_from_seed;
use gui_bridge::bridge::GuiBridge;
use gui_bridge::model::SarViewModel;
use log::info;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::ScenarioConfig;
use workflow::runner::Runner;

mod generator;
mod gui_bridge;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Search-and-rescue datum and search-area planner")]
struct Args {
    /// Compute the scenario once and append a summary to the offline report
    #[arg(long, default_value_t = false)]
    offline: bool,
    /// Load a scenario from YAML
    #[arg(long)]
    scenario: Option<PathBuf>,
    /// Also compute the future datum projections
    #[arg(long, default_value_t = false)]
    project: bool,
    /// Worker threads for the projection pool (overrides the scenario)
    #[arg(long)]
    workers: Option<usize>,
    /// Seed for the synthetic scenario used when no file is given
    #[arg(long, default_value_t = 7)]
    seed: u64,
    /// Keep the HTTP bridge alive for incoming scenarios
    #[arg(long, default_value_t = false)]
    serve: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut scenario = if let Some(path) = args.scenario {
        ScenarioConfig::load(path)?
    } else {
        build_scenario_from_seed(args.seed)?
    };
    if let Some(workers) = args.workers {
        scenario.projection.workers = workers;
    }

    let runner = Runner::new(args.project);
    let gui_bridge = GuiBridge::new();

    if args.offline || !args.serve {
        let result = runner.execute(&scenario)?;

        println!(
            "Offline run -> {:?} datum {}, area {:.2} nm2, polygon vertices {}, projections {}",
            scenario.operation,
            result.outcome.datum(),
            result.search_area_nm2,
            result.outcome.search_polygon().len(),
            result.projections.len()
        );
        for (name, row) in &result.effort {
            println!(
                "  {}: spacing {:.2} nm, coverage {:.2}, area {:.1} nm2, {:.1} h for whole area",
                name,
                row.allocation.track_spacing_nm,
                row.allocation.coverage_factor,
                row.allocation.effective_area_nm2,
                row.hours_for_area
            );
        }

        let model = SarViewModel::from_result(&result);
        gui_bridge.publish(&model)?;
        gui_bridge.publish_status("Offline SAR results ready.");

        let projected: Vec<String> = result
            .projections
            .iter()
            .map(|p| format!("+{}min {}", p.offset_minutes, p.outcome.datum()))
            .collect();
        let report = format!(
            "operation={:?} datum={} area_nm2={:.3} units={} projections={:?}\n",
            scenario.operation,
            result.outcome.datum(),
            result.search_area_nm2,
            result.effort.len(),
            projected
        );
        let report_path = PathBuf::from("tools/data/sar_report.log");
        if let Some(parent) = report_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating report directory {}", parent.display()))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&report_path)
            .with_context(|| format!("opening report {}", report_path.display()))?;
        file.write_all(report.as_bytes())
            .context("writing offline report")?;

        let metrics = runner.calculator().metrics().snapshot();
        info!(
            "calculator processed {} requests, {} failed",
            metrics.processed, metrics.failed
        );
    }
    if args.serve {
        gui_bridge.serve(Arc::new(runner.clone()));
        gui_bridge.publish_status("HTTP bridge running on 127.0.0.1:9000 (Ctrl+C to stop)...");
        let runtime = TokioBuilder::new_current_thread()
            .enable_all()
            .build()
            .context("creating runtime for signal handling")?;
        runtime.block_on(async {
            signal::ctrl_c().await.context("awaiting Ctrl+C to exit")?;
            Ok::<(), anyhow::Error>(())
        })?;
    }

    Ok(())
}
