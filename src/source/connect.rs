//! Authenticated review fetches against the App Store Connect API.

use anyhow::{Context, Result};
use metrics::counter;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

use crate::auth::ConnectTokenProvider;
use crate::source::types::Review;

const BASE_URL: &str = "https://api.appstoreconnect.apple.com/v1";
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);
const REVIEW_FIELDS: &str = "rating,title,body,reviewerNickname,createdDate,territory";

#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("invalid credentials (401)")]
    InvalidCredentials,
    #[error("access denied (403)")]
    AccessDenied,
    #[error("app id {0} not found (404)")]
    UnknownApp(String),
    #[error("unexpected API status {0}")]
    Api(StatusCode),
    #[error("token unavailable: {0}")]
    Token(#[source] anyhow::Error),
    #[error("malformed API response: {0}")]
    Malformed(#[source] anyhow::Error),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
}

pub struct ConnectClient {
    client: Client,
    tokens: ConnectTokenProvider,
}

impl ConnectClient {
    pub fn new(tokens: ConnectTokenProvider) -> Self {
        Self {
            client: Client::new(),
            tokens,
        }
    }

    /// Up to `limit` reviews, newest first, with a fixed field projection.
    /// Every failure is typed so the caller can log why it fell back.
    pub async fn fetch_reviews(
        &self,
        app_id: &str,
        limit: usize,
    ) -> Result<Vec<Review>, ConnectError> {
        let token = self.tokens.generate().map_err(ConnectError::Token)?;

        let url = format!("{BASE_URL}/apps/{app_id}/customerReviews");
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("limit", limit.to_string()),
                ("sort", "-createdDate".to_string()),
                ("fields[customerReviews]", REVIEW_FIELDS.to_string()),
            ])
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, "application/json")
            .timeout(FETCH_TIMEOUT)
            .send()
            .await?;

        match resp.status() {
            s if s.is_success() => {}
            StatusCode::UNAUTHORIZED => return Err(ConnectError::InvalidCredentials),
            StatusCode::FORBIDDEN => return Err(ConnectError::AccessDenied),
            StatusCode::NOT_FOUND => return Err(ConnectError::UnknownApp(app_id.to_string())),
            s => return Err(ConnectError::Api(s)),
        }

        let body = resp.text().await?;
        parse_envelope(&body).map_err(ConnectError::Malformed)
    }
}

#[derive(Debug, Deserialize)]
struct ReviewsEnvelope {
    #[serde(default)]
    data: Vec<ReviewResource>,
}

#[derive(Debug, Deserialize)]
struct ReviewResource {
    id: String,
    attributes: ReviewAttributes,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReviewAttributes {
    #[serde(default)]
    rating: u8,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    reviewer_nickname: Option<String>,
    #[serde(default)]
    created_date: Option<String>,
    #[serde(default)]
    territory: Option<String>,
}

impl ReviewResource {
    fn into_review(self) -> Review {
        let attrs = self.attributes;
        Review {
            id: self.id,
            rating: attrs.rating,
            title: attrs.title.unwrap_or_default(),
            body: attrs.body.unwrap_or_default(),
            author_name: attrs.reviewer_nickname.unwrap_or_default(),
            created_at: super::parse_timestamp(attrs.created_date.as_deref()),
            territory: attrs.territory.unwrap_or_default(),
        }
    }
}

/// Parse the `data` envelope of a customerReviews response, preserving the
/// server's ordering.
pub fn parse_envelope(body: &str) -> Result<Vec<Review>> {
    let envelope: ReviewsEnvelope =
        serde_json::from_str(body).context("parsing customerReviews envelope")?;
    let reviews: Vec<Review> = envelope
        .data
        .into_iter()
        .map(ReviewResource::into_review)
        .collect();
    counter!("reviews_fetched_total").increment(reviews.len() as u64);
    Ok(reviews)
}
