//! Durable record of review ids already announced, per application.
//!
//! This file is the only state the notifier keeps between runs. Reads
//! degrade to an empty state (a fresh run must never be blocked by missing
//! or mangled history); writes propagate their error, because silently
//! losing one means duplicate announcements on the next run.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;

pub const ENV_STATE_PATH: &str = "REVIEW_NOTIFIER_STATE_PATH";
const DEFAULT_STATE_PATH: &str = "storage.json";

/// Per-app cap on retained ids; oldest entries are evicted first.
pub const MAX_PROCESSED_PER_APP: usize = 1000;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedState {
    #[serde(default)]
    pub processed_reviews: HashMap<String, Vec<String>>,
}

impl ProcessedState {
    pub fn is_processed(&self, app_id: &str, review_id: &str) -> bool {
        self.processed_reviews
            .get(app_id)
            .is_some_and(|ids| ids.iter().any(|id| id == review_id))
    }

    /// Append newly announced ids (newest last), then drop the oldest past
    /// the cap.
    pub fn append(&mut self, app_id: &str, ids: impl IntoIterator<Item = String>) {
        let entry = self.processed_reviews.entry(app_id.to_string()).or_default();
        entry.extend(ids);
        if entry.len() > MAX_PROCESSED_PER_APP {
            let excess = entry.len() - MAX_PROCESSED_PER_APP;
            entry.drain(0..excess);
        }
    }
}

pub struct ProcessedStore {
    path: PathBuf,
}

impl ProcessedStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `$REVIEW_NOTIFIER_STATE_PATH`, falling back to `storage.json` in the
    /// working directory.
    pub fn from_env() -> Self {
        let path =
            std::env::var(ENV_STATE_PATH).unwrap_or_else(|_| DEFAULT_STATE_PATH.to_string());
        Self::new(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> ProcessedState {
        match fs::read_to_string(&self.path).await {
            Ok(s) => serde_json::from_str(&s).unwrap_or_else(|e| {
                tracing::warn!(error = %e, path = %self.path.display(), "corrupt state file, starting empty");
                ProcessedState::default()
            }),
            Err(_) => ProcessedState::default(),
        }
    }

    pub async fn save(&self, state: &ProcessedState) -> Result<()> {
        let json = serde_json::to_vec_pretty(state).context("serializing processed state")?;
        fs::write(&self.path, json)
            .await
            .with_context(|| format!("writing processed state to {}", self.path.display()))
    }
}
