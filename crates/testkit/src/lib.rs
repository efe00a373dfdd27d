#![warn(missing_docs)]
//! Test fixtures and metrics sinks shared across the workspace.

mod fixtures;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

pub use fixtures::*;

/// Cache metrics for one decorated variant after a bake pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BakeMetric {
    /// Variant block name.
    pub variant: String,
    /// Render type key.
    pub render_type: String,
    /// Quads served for the default signature across all sides.
    pub quads: usize,
    /// Populated cache entries.
    pub entries: usize,
    /// Computations run.
    pub computations: u64,
    /// Requests answered from the cache.
    pub hits: u64,
    /// Digest (hex string) of the default-signature geometry.
    pub hash: String,
}

/// Report written by [`BakeMetricSink`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BakeReport {
    /// Timestamp when metrics were collected (RFC 3339).
    pub timestamp: String,
    /// Per-variant metrics.
    pub metrics: Vec<BakeMetric>,
}

impl BakeReport {
    /// Stamp `metrics` with the current time.
    pub fn now(metrics: Vec<BakeMetric>) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            metrics,
        }
    }
}

/// Writes bake metrics to JSON for CI artifacts.
pub struct BakeMetricSink {
    file: File,
}

impl BakeMetricSink {
    /// Create a sink pointed at the supplied path, creating parent dirs if needed.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(Self {
            file: File::create(path)?,
        })
    }

    /// Persist the report as pretty JSON.
    pub fn write(&mut self, report: &BakeReport) -> Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        self.file.write_all(json.as_bytes())?;
        Ok(())
    }
}
