use clap::{Parser, Subcommand};

use self::{pieces::PiecesArg, simulate::SimulateArg, stream::StreamArg};

mod pieces;
mod report;
mod script;
mod session;
mod simulate;
mod stream;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Replay a command script against a synthetic clock and print the result
    Simulate(#[clap(flatten)] SimulateArg),
    /// Read commands from stdin and play them in real time
    Stream(#[clap(flatten)] StreamArg),
    /// Print every piece kind with its color and rotation states
    Pieces(#[clap(flatten)] PiecesArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Simulate(arg) => simulate::run(&arg)?,
        Mode::Stream(arg) => stream::run(&arg)?,
        Mode::Pieces(arg) => pieces::run(&arg)?,
    }
    Ok(())
}
