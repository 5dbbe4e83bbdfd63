//! App Store review notifier — binary entrypoint.
//!
//! One full pass over the configured applications, then exit; scheduling
//! recurring runs is the operator's job (cron or similar). Concurrent runs
//! against the same state file are unsafe (last writer wins).

use appstore_review_notifier::checker::ReviewChecker;
use appstore_review_notifier::config::Config;
use appstore_review_notifier::store::ProcessedStore;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op where it does not exist.
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = Config::load_default()?;
    if config.apps.is_empty() {
        tracing::warn!("no applications configured, nothing to do");
        return Ok(());
    }

    match &config.app_store_connect {
        Some(credentials) if credentials.validate() => {
            tracing::info!("App Store Connect credentials look usable");
        }
        Some(_) => {
            tracing::warn!("App Store Connect credentials unusable, running off the public feed");
        }
        None => {
            tracing::info!("no App Store Connect credentials configured, running off the public feed");
        }
    }

    let store = ProcessedStore::from_env();
    let checker = ReviewChecker::new(&config, store);
    checker.check_all(&config.apps).await;

    tracing::info!("review pass complete");
    Ok(())
}
