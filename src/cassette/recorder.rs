//! Accumulates port interactions for a recording session.

use std::path::{Path, PathBuf};

use chrono::Utc;

use super::format::{Cassette, Interaction};
use crate::error::CardError;

/// Collects interactions in call order and writes them out as one cassette.
#[derive(Debug)]
pub struct CassetteRecorder {
    path: PathBuf,
    name: String,
    commit: String,
    interactions: Vec<Interaction>,
}

impl CassetteRecorder {
    /// Start a session named after the directory it records into.
    #[must_use]
    pub fn new(dir: &Path, commit: impl Into<String>) -> Self {
        let name = dir
            .file_name()
            .map_or_else(|| "session".to_string(), |n| format!("{}-session", n.to_string_lossy()));
        Self {
            path: dir.join("session.cassette.yaml"),
            name,
            commit: commit.into(),
            interactions: Vec::new(),
        }
    }

    /// Append one call; sequence numbers follow insertion order.
    pub fn record(
        &mut self,
        port: &str,
        method: &str,
        input: serde_json::Value,
        output: serde_json::Value,
    ) {
        let seq = self.interactions.len() as u64;
        self.interactions.push(Interaction {
            seq,
            port: port.to_string(),
            method: method.to_string(),
            input,
            output,
        });
    }

    /// Write the cassette and return where it landed.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette cannot be written.
    pub fn finish(self) -> Result<PathBuf, CardError> {
        let cassette = Cassette {
            name: self.name,
            recorded_at: Utc::now(),
            commit: self.commit,
            interactions: self.interactions,
        };
        cassette.save(&self.path)?;
        Ok(self.path)
    }
}
