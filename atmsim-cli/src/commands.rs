use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use atmsim_config::AtmSimConfig;
use atmsim_core::table::TableCounts;
use atmsim_core::types::{CrossConnect, Interface, Vc};
use atmsim_engine::{Scenario, ScenarioRunner, Simulator, Transcript};
use atmsim_telemetry::init_logging;

#[derive(Parser)]
#[command(name = "atmsim", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Play a scenario and print the transcript as YAML
    Run(RunArgs),
    /// Play a scenario and print the resulting resource tables
    Dump(RunArgs),
    /// Print the effective configuration
    Config(ConfigArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[arg(short, long)]
    pub scenario: PathBuf,

    #[command(flatten)]
    pub config: ConfigArgs,

    /// Append the Prometheus metrics collected during the run
    #[arg(long)]
    pub metrics: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Configuration file; the layered defaults are used when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Serialize)]
struct TableDump {
    counts: TableCounts,
    interfaces: Vec<Interface>,
    vcs: Vec<Vc>,
    cross_connects: Vec<CrossConnect>,
}

fn load_config(args: &ConfigArgs) -> anyhow::Result<AtmSimConfig> {
    let config = match &args.config {
        Some(path) => AtmSimConfig::load_from_path(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => AtmSimConfig::load()?,
    };
    Ok(config)
}

fn play(args: &RunArgs) -> anyhow::Result<(Simulator, Transcript)> {
    let config = load_config(&args.config)?;
    // an already installed subscriber keeps logging
    let _ = init_logging(config.telemetry.log_level.as_str());

    let scenario = Scenario::load_from_file(&args.scenario)?;
    let sim = Simulator::with_manual_scheduler(config)?;
    let transcript = ScenarioRunner::new(&sim).run(&scenario)?;
    Ok((sim, transcript))
}

fn table_dump(sim: &Simulator) -> TableDump {
    let table = sim.manager().table();
    TableDump {
        counts: table.counts(),
        interfaces: table.interfaces(),
        vcs: table.vcs(),
        cross_connects: table.cross_connects(),
    }
}

fn print_metrics(sim: &Simulator) -> anyhow::Result<()> {
    match sim.manager().metrics() {
        Some(metrics) => print!("{}", metrics.gather_metrics()?),
        None => info!("Metrics are disabled in the configuration"),
    }
    Ok(())
}

pub fn run_scenario(args: RunArgs) -> anyhow::Result<()> {
    let (sim, transcript) = play(&args)?;
    print!("{}", transcript.to_yaml()?);
    if args.metrics {
        print_metrics(&sim)?;
    }
    Ok(())
}

pub fn dump_tables(args: RunArgs) -> anyhow::Result<()> {
    let (sim, _) = play(&args)?;
    print!("{}", serde_yaml::to_string(&table_dump(&sim))?);
    if args.metrics {
        print_metrics(&sim)?;
    }
    Ok(())
}

pub fn print_config(args: ConfigArgs) -> anyhow::Result<()> {
    let config = load_config(&args)?;
    print!("{}", serde_yaml::to_string(&config)?);
    Ok(())
}
