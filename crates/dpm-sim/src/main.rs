use std::error::Error;

use clap::{Parser, Subcommand};
use commands::{
    check::{self, CheckArgs},
    graph::{self, GraphArgs},
    run::{self, RunArgs},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "dpm-sim", about = "Dynamic-positioning contract monitor CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Monitor a recorded trajectory and export its violations.
    Run(RunArgs),
    /// Print the subsystem graph as evaluated by the monitor.
    Graph(GraphArgs),
    /// Validate data-defined contracts without running them.
    Check(CheckArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => run::run(&args),
        Command::Graph(args) => graph::run(&args),
        Command::Check(args) => check::run(&args),
    }
}

/// Logs go to stderr so stdout stays machine readable.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dpm_monitor=info,dpm_sim=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
