// src/source/mod.rs
pub mod connect;
pub mod feed;
pub mod types;

use chrono::{DateTime, Utc};
use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;

use crate::auth::ConnectTokenProvider;
use crate::config::ConnectCredentials;
use crate::source::connect::ConnectClient;
use crate::source::feed::FeedClient;
use crate::source::types::{Review, ReviewSource};

/// One-time metrics registration (so series show up with descriptions).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "reviews_fetched_total",
            "Reviews parsed from either source."
        );
        describe_counter!(
            "source_api_errors_total",
            "Authenticated API fetches that failed and fell back."
        );
        describe_counter!(
            "feed_region_errors_total",
            "Fallback feed fetch/parse errors, per region attempt."
        );
    });
}

/// RFC 3339 source timestamps, degrading to "now" when absent or mangled.
pub(crate) fn parse_timestamp(ts: Option<&str>) -> DateTime<Utc> {
    ts.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(Utc::now)
}

/// Dual-source acquisition: the authenticated Connect API when credentials
/// are configured and working, otherwise the public regional feed. An empty
/// (but successful) API result also falls through to the feed.
pub struct AppStoreSource {
    connect: Option<ConnectClient>,
    feed: FeedClient,
}

impl AppStoreSource {
    pub fn new(credentials: Option<&ConnectCredentials>) -> Self {
        Self {
            connect: credentials.map(|c| ConnectClient::new(ConnectTokenProvider::new(c))),
            feed: FeedClient::new(),
        }
    }
}

#[async_trait::async_trait]
impl ReviewSource for AppStoreSource {
    async fn fetch(&self, app_id: &str, limit: usize) -> Vec<Review> {
        ensure_metrics_described();

        if let Some(connect) = &self.connect {
            match connect.fetch_reviews(app_id, limit).await {
                Ok(reviews) if !reviews.is_empty() => return reviews,
                Ok(_) => {
                    tracing::info!(app_id, "API returned no reviews, trying public feed");
                }
                Err(e) => {
                    tracing::warn!(error = %e, app_id, "API fetch failed, trying public feed");
                    counter!("source_api_errors_total").increment(1);
                }
            }
        }

        self.feed.fetch_any_region(app_id).await
    }
}
