
mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::{correlate, cost, equity, rank, transport};

pub fn run() -> anyhow::Result<()> {
    use clap::Parser;

    let cli = Cli::parse();
    commands::init_logging(cli.verbose);
    match &cli.command {
        Commands::Rank(args) => rank::run(&cli, args),
        Commands::Equity(args) => equity::run(&cli, args),
        Commands::Transport(args) => transport::run(&cli, args),
        Commands::Cost(args) => cost::run(&cli, args),
        Commands::Correlate(args) => correlate::run(&cli, args),
    }
}

fn main() -> anyhow::Result<()> { run() }
