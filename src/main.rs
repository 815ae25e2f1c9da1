//! Dirhop CLI entrypoint

use clap::Parser;

use dirhop::cli::Cli;
use dirhop::output;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = cli.execute() {
        output::error(&format!("Error: {:#}", e));
        std::process::exit(1);
    }
}
