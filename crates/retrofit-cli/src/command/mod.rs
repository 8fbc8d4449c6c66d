use clap::{Parser, Subcommand};

use self::{inspect::InspectArg, partitions::PartitionsArg, recommend::RecommendArg};
use crate::util;

mod inspect;
mod partitions;
mod recommend;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Find the best renovation measure groups for a building
    Recommend(#[clap(flatten)] RecommendArg),
    /// List construction-era partitions
    Partitions(#[clap(flatten)] PartitionsArg),
    /// Summarize the simulations of one dataset partition
    Inspect(#[clap(flatten)] InspectArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    util::init_logging(args.verbose);
    match args.mode {
        Mode::Recommend(arg) => recommend::run(&arg)?,
        Mode::Partitions(arg) => partitions::run(&arg)?,
        Mode::Inspect(arg) => inspect::run(&arg)?,
    }
    Ok(())
}
