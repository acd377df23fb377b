//! Configuration module
//!
//! Handles CLI argument parsing, TOML configuration files, and validation.

pub mod cli;
pub mod toml;

use crate::patient::NUM_PATIENTS;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete session configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub group: GroupConfig,
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Group configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupConfig {
    /// Number of cooperating members (rank 0 is the coordinator)
    ///
    /// Fixed for the program's lifetime. Need not divide the dataset
    /// evenly; the remainder is dropped from distributed rounds.
    #[serde(default = "default_processes")]
    pub processes: usize,
}

/// Record generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Records per generated dataset
    #[serde(default = "default_patients")]
    pub patients: usize,
    /// Fixed RNG seed; wall-clock seeded when absent
    pub seed: Option<u64>,
}

/// Output configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Write a JSON session report to this path on exit
    pub json_output: Option<PathBuf>,
    /// Print debug diagnostics to stderr
    #[serde(default)]
    pub debug: bool,
}

fn default_processes() -> usize {
    1
}

fn default_patients() -> usize {
    NUM_PATIENTS
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            processes: default_processes(),
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            patients: default_patients(),
            seed: None,
        }
    }
}

/// Validate a complete configuration
///
/// Rejects values the group cannot be built from. An uneven
/// patients/processes split is allowed; it drops the remainder rather than
/// failing.
pub fn validate_config(config: &Config) -> Result<()> {
    if config.group.processes == 0 {
        anyhow::bail!("Group size must be at least 1");
    }
    if config.generator.patients == 0 {
        anyhow::bail!("Dataset must hold at least 1 patient record");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.group.processes, 1);
        assert_eq!(config.generator.patients, NUM_PATIENTS);
        assert_eq!(config.generator.seed, None);
        assert!(config.output.json_output.is_none());
        assert!(!config.output.debug);
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_group() {
        let mut config = Config::default();
        config.group.processes = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_rejects_empty_dataset() {
        let mut config = Config::default();
        config.generator.patients = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_allows_uneven_split() {
        let mut config = Config::default();
        config.group.processes = 7;
        assert!(validate_config(&config).is_ok());
    }
}
