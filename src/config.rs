//! Configuration file handling.
//!
//! Settings come from an optional `listing-lens.toml`, then CLI flags
//! override individual values.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cli::Args;
use crate::dashboard::DashboardOptions;
use crate::data::aggregate::{DEFAULT_HISTOGRAM_BINS, DEFAULT_TOP_CITIES};
use crate::data::loader::SnapshotSources;

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "listing-lens.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub dashboard: DashboardConfig,
}

/// Where the two snapshots live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_snapshot_2020")]
    pub snapshot_2020: PathBuf,

    #[serde(default = "default_snapshot_2023")]
    pub snapshot_2023: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            snapshot_2020: default_snapshot_2020(),
            snapshot_2023: default_snapshot_2023(),
        }
    }
}

fn default_snapshot_2020() -> PathBuf {
    PathBuf::from("AB_US_2020.csv")
}

fn default_snapshot_2023() -> PathBuf {
    PathBuf::from("AB_US_2023.csv")
}

/// Chart sizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Cities shown in the average-price ranking.
    #[serde(default = "default_top_cities")]
    pub top_cities: usize,

    #[serde(default = "default_histogram_bins")]
    pub histogram_bins: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            top_cities: default_top_cities(),
            histogram_bins: default_histogram_bins(),
        }
    }
}

fn default_top_cities() -> usize {
    DEFAULT_TOP_CITIES
}

fn default_histogram_bins() -> usize {
    DEFAULT_HISTOGRAM_BINS
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Resolve the configuration for a run: an explicit `--config` must
    /// exist, otherwise the default file is used if present.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::from_file(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Apply CLI overrides.
    pub fn merge_with_args(&mut self, args: &Args) {
        if let Some(path) = &args.data_2020 {
            self.data.snapshot_2020 = path.clone();
        }
        if let Some(path) = &args.data_2023 {
            self.data.snapshot_2023 = path.clone();
        }
    }

    pub fn sources(&self) -> SnapshotSources {
        SnapshotSources {
            snapshot_2020: self.data.snapshot_2020.clone(),
            snapshot_2023: self.data.snapshot_2023.clone(),
        }
    }

    pub fn dashboard_options(&self) -> DashboardOptions {
        DashboardOptions {
            top_cities: self.dashboard.top_cities,
            histogram_bins: self.dashboard.histogram_bins,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn defaults_match_original_files_and_sizes() {
        let config = Config::default();
        assert_eq!(config.data.snapshot_2020, PathBuf::from("AB_US_2020.csv"));
        assert_eq!(config.data.snapshot_2023, PathBuf::from("AB_US_2023.csv"));
        assert_eq!(config.dashboard_options(), DashboardOptions::default());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config: Config = toml::from_str(
            r#"
            [data]
            snapshot_2023 = "/data/listings_2023.parquet"

            [dashboard]
            top_cities = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.data.snapshot_2020, PathBuf::from("AB_US_2020.csv"));
        assert_eq!(config.data.snapshot_2023, PathBuf::from("/data/listings_2023.parquet"));
        assert_eq!(config.dashboard.top_cities, 10);
        assert_eq!(config.dashboard.histogram_bins, 50);
    }

    #[test]
    fn legacy_row_cap_key_is_ignored() {
        let config: Config = toml::from_str("[dashboard]\nraw_table_limit = 5000\n").unwrap();
        assert_eq!(config.dashboard, DashboardConfig::default());
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load(Some(&dir.path().join("missing.toml"))).is_err());
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[dashboard]\ntop_cities = \"many\"\n").unwrap();
        assert!(Config::from_file(&path).is_err());
    }

    #[test]
    fn cli_paths_override_file_values() {
        let args = Args::parse_from(["listing-lens", "--data-2020", "old.csv"]);
        let mut config = Config::default();
        config.merge_with_args(&args);
        assert_eq!(config.sources().snapshot_2020, PathBuf::from("old.csv"));
        assert_eq!(config.sources().snapshot_2023, PathBuf::from("AB_US_2023.csv"));
    }
}
