// src/source/types.rs
use chrono::{DateTime, Utc};

/// One customer review, flattened from whichever source produced it.
/// Identity is `id`, scoped per application.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct Review {
    pub id: String,
    pub rating: u8,
    pub title: String,
    pub body: String,
    pub author_name: String,
    pub created_at: DateTime<Utc>,
    pub territory: String,
}

/// Seam between the orchestrator and the review acquisition strategy.
/// Returns most-recent-first; empty means no source yielded anything,
/// failures are handled (and logged) inside the implementation.
#[async_trait::async_trait]
pub trait ReviewSource {
    async fn fetch(&self, app_id: &str, limit: usize) -> Vec<Review>;
}
