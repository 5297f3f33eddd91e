//! Progress checkpoint for output routing
//!
//! The checkpoint is informational: it tells a user which run crashed and
//! how far it got. A run is always restarted from scratch.

use crate::constants::{CHECKPOINT_FILE, CHECKPOINT_INTERVAL};
use crate::{Error, Result};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Contents of `.komm_fmt_checkpoint.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub station: String,
    pub output_file: PathBuf,
    pub start_time: String,
    pub lines_processed: usize,
}

impl Checkpoint {
    /// Read a checkpoint left behind by an earlier run, if any
    pub fn load(dir: &Path) -> Result<Option<Self>> {
        let path = dir.join(CHECKPOINT_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&path)
            .map_err(|e| Error::io(format!("Failed to read {}", path.display()), e))?;
        serde_json::from_str(&contents).map(Some).map_err(|e| {
            Error::configuration(format!("Malformed checkpoint {}: {}", path.display(), e))
        })
    }
}

/// Writes the checkpoint at the start and every [`CHECKPOINT_INTERVAL`] lines
#[derive(Debug)]
pub struct CheckpointWriter {
    path: PathBuf,
    checkpoint: Checkpoint,
    interval: usize,
}

impl CheckpointWriter {
    pub fn new(dir: &Path, station: &str, output_file: &Path) -> Self {
        Self {
            path: dir.join(CHECKPOINT_FILE),
            checkpoint: Checkpoint {
                station: station.to_string(),
                output_file: output_file.to_path_buf(),
                start_time: Local::now().to_rfc3339(),
                lines_processed: 0,
            },
            interval: CHECKPOINT_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: usize) -> Self {
        self.interval = interval.max(1);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the initial checkpoint
    pub fn start(&self) {
        self.write();
    }

    /// Record progress, writing on every interval boundary
    pub fn record(&mut self, lines_processed: usize) {
        self.checkpoint.lines_processed = lines_processed;
        if lines_processed > 0 && lines_processed % self.interval == 0 {
            self.write();
        }
    }

    /// Remove the checkpoint after a successful run
    pub fn complete(self) {
        if self.path.exists() {
            if let Err(e) = fs::remove_file(&self.path) {
                warn!("Could not remove checkpoint {}: {}", self.path.display(), e);
            }
        }
    }

    fn write(&self) {
        let result = serde_json::to_string_pretty(&self.checkpoint)
            .map_err(std::io::Error::other)
            .and_then(|json| fs::write(&self.path, json));
        match result {
            Ok(()) => debug!(
                lines = self.checkpoint.lines_processed,
                "Checkpoint written to {}",
                self.path.display()
            ),
            Err(e) => warn!("Could not write checkpoint {}: {}", self.path.display(), e),
        }
    }
}
