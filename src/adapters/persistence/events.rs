//! Event Log - Append-only JSONL Records of Committed Events
//!
//! Persists committed contract events to daily JSONL files named
//! `events/YYYY-MM-DD.jsonl`. Each line is a self-contained JSON record
//! for easy parsing, streaming, and crash recovery.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{info, instrument, warn};

use crate::ports::repository::EventRecord;

/// Append-only JSONL event log with daily file rotation.
pub struct EventLog {
    /// Base directory for event files.
    events_dir: PathBuf,
}

impl EventLog {
    /// Create a new event log in the given data directory.
    pub async fn new(data_dir: &str) -> Result<Self> {
        let events_dir = Path::new(data_dir).join("events");

        fs::create_dir_all(&events_dir)
            .await
            .context("Failed to create events directory")?;

        Ok(Self { events_dir })
    }

    /// Append records to today's JSONL file in one write.
    #[instrument(skip(self, records), fields(count = records.len()))]
    pub async fn append(&self, records: &[EventRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let date = Utc::now().format("%Y-%m-%d").to_string();
        let path = self.events_dir.join(format!("{date}.jsonl"));

        let mut buf = String::new();
        for record in records {
            buf.push_str(
                &serde_json::to_string(record).context("Failed to serialize event record")?,
            );
            buf.push('\n');
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .context("Failed to open event log file")?;

        file.write_all(buf.as_bytes())
            .await
            .context("Failed to write event records")?;

        file.flush().await.context("Failed to flush event log")?;

        Ok(())
    }

    /// Load all event records from all daily files, ordered by block.
    #[instrument(skip(self))]
    pub async fn load_all(&self) -> Result<Vec<EventRecord>> {
        let mut records = Vec::new();
        let mut entries = fs::read_dir(&self.events_dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "jsonl") {
                let content = fs::read_to_string(&path).await?;
                for line in content.lines() {
                    if line.trim().is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<EventRecord>(line) {
                        Ok(record) => records.push(record),
                        Err(e) => {
                            warn!(
                                file = %path.display(),
                                error = %e,
                                "Skipping malformed event record"
                            );
                        }
                    }
                }
            }
        }

        // stable: events of one block keep their emission order
        records.sort_by_key(|r| r.block);
        info!(count = records.len(), "Loaded event records");
        Ok(records)
    }
}
