//! JSON session report
//!
//! With `--json-output <path>` the coordinator writes a report on exit: one
//! entry per command round, plus enough context (group size, dataset size,
//! timestamp) to interpret the numbers later. Partition accounting is
//! explicit - a "bmi" round records both the shard length and how many tail
//! records were dropped when the group size did not divide the dataset.

use crate::Result;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// One command round as recorded by the coordinator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRound {
    /// Command name: "generate", "bmi", "average", or "invalid"
    pub command: String,
    /// Whether the round's handler ran (false when the generated-data guard
    /// rejected it or the choice was invalid)
    pub accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_heart_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shard_len: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dropped_records: Option<usize>,
}

/// Complete session report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonSessionReport {
    pub version: String,
    pub timestamp: String,
    pub group_size: usize,
    pub patients: usize,
    pub rounds: Vec<JsonRound>,
}

impl JsonSessionReport {
    /// Create an empty report stamped with the current time
    pub fn new(group_size: usize, patients: usize) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            group_size,
            patients,
            rounds: Vec::new(),
        }
    }
}

/// Write a session report as pretty-printed JSON
pub fn write_json_report(path: &Path, report: &JsonSessionReport) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create report file: {}", path.display()))?;

    serde_json::to_writer_pretty(file, report)
        .context("Failed to serialize session report")?;

    Ok(())
}
