//! CLI argument parsing using clap

use crate::Result;
use clap::Parser;
use std::path::PathBuf;

/// VitalPulse - Distributed patient vitals processing
#[derive(Parser, Debug)]
#[command(name = "vitalpulse")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Number of cooperating processes in the group (rank 0 coordinates)
    #[arg(short = 'p', long, default_value = "1")]
    pub processes: usize,

    /// Number of patient records per generated dataset
    #[arg(long, default_value = "50")]
    pub patients: usize,

    /// Fixed RNG seed for reproducible datasets (wall-clock seeded when omitted)
    #[arg(long)]
    pub seed: Option<u64>,

    /// TOML configuration file (command-line flags take precedence)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Write a JSON session report to this path on exit
    #[arg(long)]
    pub json_output: Option<PathBuf>,

    /// Validate the configuration and exit without launching the group
    #[arg(long)]
    pub dry_run: bool,

    /// Print debug diagnostics to stderr
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate argument combinations clap cannot express
    pub fn validate(&self) -> Result<()> {
        if self.processes == 0 {
            anyhow::bail!("--processes must be at least 1");
        }
        if self.patients == 0 {
            anyhow::bail!("--patients must be at least 1");
        }
        Ok(())
    }
}
