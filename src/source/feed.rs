//! Unauthenticated fallback: the public iTunes customer-reviews feed,
//! scraped across regional mirrors in a fixed priority order.

use anyhow::{Context, Result};
use chrono::Utc;
use metrics::counter;
use serde::Deserialize;
use std::time::Duration;

use crate::source::types::Review;

/// Regions tried in order; the first one yielding reviews wins.
pub const REGION_PRIORITY: &[&str] = &["kr", "us", "jp"];

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

pub struct FeedClient {
    client: reqwest::Client,
}

impl FeedClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Best-effort region fallback: try each region in priority order and
    /// short-circuit on the first non-empty result. Region failures are
    /// logged and skipped; nothing anywhere means an empty vec.
    pub async fn fetch_any_region(&self, app_id: &str) -> Vec<Review> {
        for region in REGION_PRIORITY {
            match self.fetch_region(region, app_id).await {
                Ok(reviews) if !reviews.is_empty() => {
                    tracing::info!(region, count = reviews.len(), "feed yielded reviews");
                    return reviews;
                }
                Ok(_) => {
                    tracing::debug!(region, app_id, "feed empty for region");
                }
                Err(e) => {
                    tracing::warn!(error = ?e, region, app_id, "feed fetch failed");
                    counter!("feed_region_errors_total").increment(1);
                }
            }
        }
        Vec::new()
    }

    async fn fetch_region(&self, region: &str, app_id: &str) -> Result<Vec<Review>> {
        let url = format!(
            "https://itunes.apple.com/{region}/rss/customerreviews/id={app_id}/sortBy=mostRecent/json"
        );
        let body = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .timeout(FETCH_TIMEOUT)
            .send()
            .await
            .context("feed get")?
            .error_for_status()
            .context("feed non-2xx")?
            .text()
            .await
            .context("feed body")?;
        parse_feed(&body, region, app_id)
    }
}

impl Default for FeedClient {
    fn default() -> Self {
        Self::new()
    }
}

// The feed wraps every scalar in `{"label": ...}`.
#[derive(Debug, Deserialize)]
struct Label {
    label: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FeedEnvelope {
    feed: Option<FeedDocument>,
}

#[derive(Debug, Deserialize)]
struct FeedDocument {
    entry: Option<Vec<FeedEntry>>,
}

#[derive(Debug, Deserialize)]
struct FeedEntry {
    id: Option<Label>,
    #[serde(rename = "im:rating")]
    rating: Option<Label>,
    title: Option<Label>,
    content: Option<Label>,
    author: Option<FeedAuthor>,
    updated: Option<Label>,
    // Present only on the leading app-metadata entry, never on a review.
    #[serde(rename = "im:name")]
    im_name: Option<Label>,
}

#[derive(Debug, Deserialize)]
struct FeedAuthor {
    name: Option<Label>,
}

impl FeedEntry {
    fn label_of(field: &Option<Label>) -> Option<&str> {
        field.as_ref().and_then(|l| l.label.as_deref())
    }

    fn into_review(self, region: &str, app_id: &str, index: usize, now_ms: i64) -> Review {
        Review {
            id: Self::label_of(&self.id)
                .map(str::to_string)
                .unwrap_or_else(|| format!("rss-{region}-{app_id}-{index}-{now_ms}")),
            rating: Self::label_of(&self.rating)
                .and_then(|s| s.parse().ok())
                .unwrap_or(0),
            title: Self::label_of(&self.title).unwrap_or("Untitled").to_string(),
            body: Self::label_of(&self.content)
                .unwrap_or("No content")
                .to_string(),
            author_name: self
                .author
                .as_ref()
                .and_then(|a| Self::label_of(&a.name))
                .unwrap_or("Anonymous")
                .to_string(),
            created_at: crate::source::parse_timestamp(Self::label_of(&self.updated)),
            territory: region.to_ascii_uppercase(),
        }
    }
}

/// Map one region's feed body to reviews. The leading entry is skipped when
/// it is app metadata (carries `im:name`) rather than a review. Missing
/// fields get fixed placeholders; a missing id is synthesized from region,
/// app, position and the current time, which is not reproducible across runs.
pub fn parse_feed(body: &str, region: &str, app_id: &str) -> Result<Vec<Review>> {
    let envelope: FeedEnvelope =
        serde_json::from_str(body).context("parsing customer reviews feed")?;
    let mut entries = envelope.feed.and_then(|f| f.entry).unwrap_or_default();
    if entries.first().is_some_and(|e| e.im_name.is_some()) {
        entries.remove(0);
    }

    let now_ms = Utc::now().timestamp_millis();
    let reviews: Vec<Review> = entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| entry.into_review(region, app_id, index, now_ms))
        .collect();
    counter!("reviews_fetched_total").increment(reviews.len() as u64);
    Ok(reviews)
}
