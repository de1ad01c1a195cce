use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::ui::prelude::*;

/// One record in the append-only metadata log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MetadataEntry {
    Download {
        theme: String,
        filepath: PathBuf,
        source_url: String,
        downloaded_at: DateTime<Utc>,
    },
    Run {
        timestamp: DateTime<Utc>,
        image: PathBuf,
        duration: u64,
        shuffle: bool,
        /// Position of this application within its run, starting at 1
        #[serde(alias = "sequence_count")]
        count: u64,
    },
}

impl MetadataEntry {
    pub fn download(theme: &str, filepath: PathBuf, source_url: &str) -> Self {
        MetadataEntry::Download {
            theme: theme.to_string(),
            filepath,
            source_url: source_url.to_string(),
            downloaded_at: Utc::now(),
        }
    }

    pub fn run(image: PathBuf, duration: u64, shuffle: bool, count: u64) -> Self {
        MetadataEntry::Run {
            timestamp: Utc::now(),
            image,
            duration,
            shuffle,
            count,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            MetadataEntry::Download { .. } => "download",
            MetadataEntry::Run { .. } => "run",
        }
    }

    pub fn time(&self) -> DateTime<Utc> {
        match self {
            MetadataEntry::Download { downloaded_at, .. } => *downloaded_at,
            MetadataEntry::Run { timestamp, .. } => *timestamp,
        }
    }
}

/// JSON array of [`MetadataEntry`] values, rewritten in full on every append.
///
/// Not safe for concurrent writers: the last process to write wins.
#[derive(Debug, Clone)]
pub struct MetadataStore {
    path: PathBuf,
}

impl MetadataStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Raw array contents. Unreadable or malformed files count as empty.
    fn read_raw(&self) -> Vec<serde_json::Value> {
        let Ok(text) = fs::read_to_string(&self.path) else {
            return Vec::new();
        };
        if text.trim().is_empty() {
            return Vec::new();
        }
        match serde_json::from_str(&text) {
            Ok(values) => values,
            Err(e) => {
                emit(
                    Level::Debug,
                    "metadata.parse_failed",
                    &format!("Ignoring malformed metadata file {}: {}", self.path.display(), e),
                    None,
                );
                Vec::new()
            }
        }
    }

    pub fn append(&self, entry: &MetadataEntry) -> Result<()> {
        let mut values = self.read_raw();
        values.push(serde_json::to_value(entry).context("serializing metadata entry")?);

        let text = serde_json::to_string_pretty(&values).context("serializing metadata log")?;
        fs::write(&self.path, text)
            .with_context(|| format!("writing metadata file {}", self.path.display()))?;
        Ok(())
    }

    /// Append and report a failure instead of returning it.
    pub fn record(&self, entry: &MetadataEntry) {
        if let Err(e) = self.append(entry) {
            emit(
                Level::Warn,
                "metadata.write_failed",
                &format!("Could not write metadata: {:#}", e),
                None,
            );
        }
    }

    /// Every entry in append order. Records that do not match a known entry
    /// shape are skipped.
    pub fn entries(&self) -> Vec<MetadataEntry> {
        self.read_raw()
            .into_iter()
            .filter_map(|v| serde_json::from_value(v).ok())
            .collect()
    }

    /// Up to `limit` entries, newest first.
    pub fn recent(&self, limit: usize) -> Vec<MetadataEntry> {
        let mut entries = self.entries();
        entries.reverse();
        entries.truncate(limit);
        entries
    }
}
