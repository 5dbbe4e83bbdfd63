//! Per-application review check: fetch, filter against the processed set,
//! dispatch chronologically, persist what was confirmed.

use anyhow::{Context, Result};
use std::time::Duration;

use crate::config::{AppConfig, Config};
use crate::notify::discord::DiscordNotifier;
use crate::notify::ReviewNotifier;
use crate::source::types::ReviewSource;
use crate::source::AppStoreSource;
use crate::store::ProcessedStore;

const APP_SPACING: Duration = Duration::from_secs(2);
const FETCH_LIMIT: usize = 200;

pub struct ReviewChecker<S, N> {
    source: S,
    notifier: N,
    store: ProcessedStore,
}

impl ReviewChecker<AppStoreSource, DiscordNotifier> {
    pub fn new(config: &Config, store: ProcessedStore) -> Self {
        Self {
            source: AppStoreSource::new(config.app_store_connect.as_ref()),
            notifier: DiscordNotifier::new(),
            store,
        }
    }
}

impl<S: ReviewSource + Sync, N: ReviewNotifier + Sync> ReviewChecker<S, N> {
    pub fn with_parts(source: S, notifier: N, store: ProcessedStore) -> Self {
        Self {
            source,
            notifier,
            store,
        }
    }

    /// One full pass over one application. Returns how many reviews were
    /// announced and persisted.
    pub async fn check_app(&self, app: &AppConfig) -> Result<usize> {
        let mut state = self.store.load().await;

        let reviews = self.source.fetch(&app.app_id, FETCH_LIMIT).await;
        if reviews.is_empty() {
            tracing::debug!(app = %app.app_name, "no reviews available");
            return Ok(0);
        }

        // Sources return newest-first; announce the new batch oldest-first.
        let mut fresh: Vec<_> = reviews
            .into_iter()
            .filter(|r| !state.is_processed(&app.app_id, &r.id))
            .collect();
        fresh.reverse();

        if fresh.is_empty() {
            tracing::debug!(app = %app.app_name, "all reviews already announced");
            return Ok(0);
        }

        tracing::info!(app = %app.app_name, count = fresh.len(), "announcing new reviews");

        let sent = self
            .notifier
            .send_reviews(&app.discord_webhook_url, &fresh, &app.app_name)
            .await;

        if sent == 0 {
            return Ok(0);
        }

        // Dispatch is sequential, so the success count is taken as a prefix
        // of the dispatched order when advancing state.
        let announced: Vec<String> = fresh.iter().take(sent).map(|r| r.id.clone()).collect();
        state.append(&app.app_id, announced);
        self.store
            .save(&state)
            .await
            .with_context(|| format!("persisting state for {}", app.app_name))?;

        Ok(sent)
    }

    /// Sequential pass over every configured application, with a courtesy
    /// pause between apps. A failing app is logged and the rest still run.
    pub async fn check_all(&self, apps: &[AppConfig]) {
        for (idx, app) in apps.iter().enumerate() {
            if idx > 0 {
                tokio::time::sleep(APP_SPACING).await;
            }
            match self.check_app(app).await {
                Ok(0) => {}
                Ok(sent) => tracing::info!(app = %app.app_name, sent, "review check finished"),
                Err(e) => tracing::error!(error = %e, app = %app.app_name, "review check failed"),
            }
        }
    }
}
