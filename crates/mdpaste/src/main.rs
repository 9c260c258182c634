//! mdpaste CLI - markdown to paste-ready HTML.
//!
//! Converts a markdown document into inline-styled HTML that survives
//! pasting into rich-text editors, rendering diagram blocks to hosted
//! images along the way.

mod config;
mod convert;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use convert::ConvertArgs;
use output::Output;

/// mdpaste - markdown to paste-ready HTML.
#[derive(Parser)]
#[command(name = "mdpaste", version, about)]
struct Cli {
    #[command(flatten)]
    args: ConvertArgs,
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.args.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(err) = cli.args.execute(&output) {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
