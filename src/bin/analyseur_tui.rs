//! `analyseur_tui` - interactive burglary data analyzer
//!
//! Loads the extracted dataset and opens the terminal viewer. Run
//! `download_data` first.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use analyseur_cambriolages::data::DatasetLayout;
use analyseur_cambriolages::{init_logging, tui, Verbosity};

/// analyseur_tui - Analyseur de cambriolages dans le terminal
#[derive(Debug, Parser)]
#[command(name = "analyseur_tui")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding the extracted dataset
    #[arg(long, value_name = "DIR", default_value = ".")]
    data_dir: PathBuf,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(Verbosity::from_flags(cli.verbose, cli.quiet));

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let layout = DatasetLayout::new(&cli.data_dir);

    // Check the dataset before taking over the terminal so the operator
    // gets a plain, actionable message
    layout.ensure_present()?;

    tui::run(layout)
}
