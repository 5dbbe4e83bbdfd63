pub mod discord;

use crate::source::types::Review;

/// Seam between the orchestrator and the delivery channel. One review maps
/// to one outbound message.
#[async_trait::async_trait]
pub trait ReviewNotifier {
    /// Deliver one review; failures are logged and reported as `false`,
    /// never propagated.
    async fn send_review(&self, webhook_url: &str, review: &Review, app_name: &str) -> bool;

    /// Deliver a batch strictly sequentially, in the order given, with
    /// pacing between consecutive sends. A failure does not abort the rest;
    /// the return value is the number of successful sends.
    async fn send_reviews(&self, webhook_url: &str, reviews: &[Review], app_name: &str) -> usize;
}
