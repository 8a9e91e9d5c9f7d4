//! `download_data` - fetch the burglary dataset
//!
//! Downloads the per-year archives and the chronological series from
//! data.gouv.fr and extracts them into the data directory.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use analyseur_cambriolages::data::DatasetLayout;
use analyseur_cambriolages::fetch::Fetcher;
use analyseur_cambriolages::{init_logging, Verbosity};

/// download_data - Télécharge les données de cambriolages
///
/// One-shot fetcher: on success the extracted dataset files are present in
/// the data directory, ready for analyseur_tui.
#[derive(Debug, Parser)]
#[command(name = "download_data")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory the dataset is extracted into
    #[arg(long, value_name = "DIR", default_value = ".")]
    data_dir: PathBuf,

    /// Re-download files that already exist
    #[arg(short, long)]
    force: bool,

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
    let fetcher = Fetcher::new(layout, cli.force)?;
    let report = fetcher.fetch_all()?;

    if !report.fetched.is_empty() {
        println!("Téléchargé : {}", report.fetched.join(", "));
    }
    if !report.skipped.is_empty() {
        println!("Déjà présent : {}", report.skipped.join(", "));
    }
    println!("Jeu de données prêt dans {}", cli.data_dir.display());
    Ok(())
}
