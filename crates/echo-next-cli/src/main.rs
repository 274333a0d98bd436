use std::io;

use anyhow::Result;
use echo_next_cli::{command, run, CliArgs};

fn main() -> Result<()> {
    let matches = command().get_matches();
    let args = CliArgs::from_matches(&matches);

    echo_next_core::init_tracing_with(args.debug);

    run(&args, io::stdin().lock(), io::stdout().lock(), io::stderr().lock())
}
