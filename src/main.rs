use autosorter::cli::{Cli, run_cli};
use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    run_cli(Cli::parse())
}
