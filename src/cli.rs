//! Command-line interface argument parsing.

use std::path::PathBuf;

use clap::Parser;

/// Listing Lens - U.S. short-term rental dashboard (2020 vs 2023)
///
/// Examples:
///   listing-lens
///   listing-lens --data-2020 AB_US_2020.csv --data-2023 AB_US_2023.parquet
///   listing-lens --config ./listing-lens.toml --verbose
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    ///
    /// If not specified, looks for listing-lens.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// 2020 snapshot (.csv or .parquet)
    #[arg(long = "data-2020", value_name = "FILE", env = "LISTING_LENS_DATA_2020")]
    pub data_2020: Option<PathBuf>,

    /// 2023 snapshot (.csv or .parquet)
    #[arg(long = "data-2023", value_name = "FILE", env = "LISTING_LENS_DATA_2023")]
    pub data_2023: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Default log filter; `RUST_LOG` takes precedence.
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}
