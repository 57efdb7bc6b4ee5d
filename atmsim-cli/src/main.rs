//! ## atmsim-cli
//! **Command line front end of the ATM configuration manager simulator**
//!
//! Runs scenario files against a freshly wired manager and prints what the
//! client side observed.

use clap::Parser;

mod commands;

use commands::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => commands::run_scenario(args),
        Commands::Dump(args) => commands::dump_tables(args),
        Commands::Config(args) => commands::print_config(args),
    }
}
