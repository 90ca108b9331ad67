//! Compare two wide CSV datasets and print the per-category report.
//!
//! ```text
//! skycheck-compare golden.csv candidate.csv --config tolerances.toml -vv
//! ```
//!
//! Exit status is 1 when no time key matches, when a category exceeds its tolerance, or
//! on any I/O or parse error.
use std::process;

use camino::Utf8PathBuf;
use clap::Parser;
use skycheck::{
    config::SkycheckConfig,
    golden::WideTable,
    harness::{compare, Tolerances},
    logging, SkycheckError,
};
use tracing::info;

/// Cross-implementation validator for astronomical quantity tables.
#[derive(Debug, Parser)]
#[command(name = "skycheck-compare", version)]
struct Cli {
    /// Reference dataset.
    left: Utf8PathBuf,

    /// Candidate dataset.
    right: Utf8PathBuf,

    /// TOML file whose `[tolerances.<category>]` sections replace the defaults.
    #[arg(short, long)]
    config: Option<Utf8PathBuf>,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(&cli) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> Result<bool, SkycheckError> {
    let tolerances = match &cli.config {
        Some(path) => SkycheckConfig::from_path(path)?.tolerances,
        None => Tolerances::default(),
    };
    let left = WideTable::from_path(&cli.left)?;
    let right = WideTable::from_path(&cli.right)?;
    info!(left = %cli.left, right = %cli.right, "datasets loaded");

    let report = compare(&left, &right, &tolerances)?;
    println!("{report}");
    Ok(report.passed())
}
