//! Binary for the combinational fault diagnoser

#![warn(missing_docs)]

mod cmd;

use clap::Parser;

#[doc(hidden)]
fn main() {
    let cli = cmd::Cli::parse();
    cli.init_tracing();

    match cli.command {
        cmd::Commands::Show(a) => a.run(),
        cmd::Commands::Replay(a) => a.run(),
    }
}
