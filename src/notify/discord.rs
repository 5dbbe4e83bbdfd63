//! Discord webhook delivery: one embed per review, sent sequentially with
//! fixed spacing so a burst of reviews never trips the webhook rate limit.

use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use super::ReviewNotifier;
use crate::source::types::Review;

const POST_TIMEOUT: Duration = Duration::from_secs(10);
const SEND_SPACING: Duration = Duration::from_secs(1);
const FIELD_MAX_CHARS: usize = 1024;

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("notify_sent_total", "Reviews delivered to the webhook.");
        describe_counter!("notify_failed_total", "Webhook deliveries that failed.");
    });
}

#[derive(Clone)]
pub struct DiscordNotifier {
    client: Client,
}

impl DiscordNotifier {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

impl Default for DiscordNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ReviewNotifier for DiscordNotifier {
    async fn send_review(&self, webhook_url: &str, review: &Review, app_name: &str) -> bool {
        ensure_metrics_described();

        let payload = WebhookPayload {
            embeds: vec![review_embed(review, app_name)],
        };

        let res = self
            .client
            .post(webhook_url)
            .timeout(POST_TIMEOUT)
            .json(&payload)
            .send()
            .await;

        match res.and_then(|rsp| rsp.error_for_status()) {
            Ok(_) => {
                counter!("notify_sent_total").increment(1);
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, app = app_name, review = %review.id, "webhook delivery failed");
                counter!("notify_failed_total").increment(1);
                false
            }
        }
    }

    async fn send_reviews(&self, webhook_url: &str, reviews: &[Review], app_name: &str) -> usize {
        let mut sent = 0usize;
        for (idx, review) in reviews.iter().enumerate() {
            if idx > 0 {
                tokio::time::sleep(SEND_SPACING).await;
            }
            if self.send_review(webhook_url, review, app_name).await {
                sent += 1;
            }
        }
        sent
    }
}

#[derive(Debug, Serialize)]
struct WebhookPayload {
    embeds: Vec<Embed>,
}

#[derive(Debug, Serialize)]
struct Embed {
    title: String,
    description: String,
    color: u32,
    fields: Vec<EmbedField>,
    timestamp: String,
}

#[derive(Debug, Serialize)]
struct EmbedField {
    name: String,
    value: String,
    inline: bool,
}

fn review_embed(review: &Review, app_name: &str) -> Embed {
    Embed {
        title: app_name.to_string(),
        description: "---".to_string(),
        color: rating_color(review.rating),
        fields: vec![
            EmbedField {
                name: "Rating".into(),
                value: format!("{} ({}/5)", star_bar(review.rating), review.rating),
                inline: true,
            },
            EmbedField {
                name: "Author".into(),
                value: review.author_name.clone(),
                inline: true,
            },
            EmbedField {
                name: "Territory".into(),
                value: review.territory.clone(),
                inline: true,
            },
            EmbedField {
                name: "Title".into(),
                value: truncate(&review.title, FIELD_MAX_CHARS),
                inline: false,
            },
            EmbedField {
                name: "Review".into(),
                value: truncate(&review.body, FIELD_MAX_CHARS),
                inline: false,
            },
        ],
        timestamp: review.created_at.to_rfc3339(),
    }
}

fn star_bar(rating: u8) -> String {
    let filled = rating.min(5) as usize;
    let mut bar = "⭐".repeat(filled);
    bar.push_str(&"☆".repeat(5 - filled));
    bar
}

fn rating_color(rating: u8) -> u32 {
    if rating >= 4 {
        0x00ff00
    } else if rating >= 3 {
        0xffff00
    } else if rating >= 2 {
        0xff8800
    } else {
        0xff0000
    }
}

// Character-based so multi-byte review text never splits mid-codepoint.
fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    out.push_str("...");
    out
}
