//! Run configuration loaded from `config.json`.
//!
//! The whole document is parsed once at startup into an explicit [`Config`]
//! struct and passed by reference into the components that need it; nothing
//! reads configuration ambiently after that point.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_CONFIG_PATH: &str = "REVIEW_NOTIFIER_CONFIG_PATH";
const DEFAULT_CONFIG_PATH: &str = "config.json";

/// App Store Connect API credentials. Optional: without them the notifier
/// runs entirely off the public customer-reviews feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectCredentials {
    pub key_id: String,
    pub issuer_id: String,
    pub private_key_path: String,
}

impl ConnectCredentials {
    /// Startup sanity check, logged once. A `false` here does not disable
    /// anything by itself; token generation failing at fetch time is what
    /// actually forces the feed fallback.
    pub fn validate(&self) -> bool {
        if self.key_id.is_empty() {
            tracing::error!("App Store Connect key id is not set");
            return false;
        }
        if self.issuer_id.is_empty() {
            tracing::error!("App Store Connect issuer id is not set");
            return false;
        }
        if !Path::new(&self.private_key_path).exists() {
            tracing::error!(path = %self.private_key_path, "private key file not found");
            return false;
        }
        true
    }
}

/// One monitored app listing and the webhook its reviews go to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    pub app_id: String,
    pub app_name: String,
    pub discord_webhook_url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub app_store_connect: Option<ConnectCredentials>,
    #[serde(default)]
    pub apps: Vec<AppConfig>,
}

impl Config {
    /// Load from `$REVIEW_NOTIFIER_CONFIG_PATH`, falling back to
    /// `config.json` in the working directory. Errors here are fatal to the
    /// run; there is nothing useful to do without a config.
    pub fn load_default() -> Result<Self> {
        let path = std::env::var(ENV_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self::load(&path)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config_with_camel_case_keys() {
        let doc = r#"{
            "appStoreConnect": {
                "keyId": "ABC123",
                "issuerId": "issuer-1",
                "privateKeyPath": "keys/AuthKey_ABC123.p8"
            },
            "apps": [
                { "appId": "123456789", "appName": "My App", "discordWebhookUrl": "https://discord.com/api/webhooks/1/x" }
            ]
        }"#;
        let cfg: Config = serde_json::from_str(doc).unwrap();
        let creds = cfg.app_store_connect.unwrap();
        assert_eq!(creds.key_id, "ABC123");
        assert_eq!(creds.issuer_id, "issuer-1");
        assert_eq!(cfg.apps.len(), 1);
        assert_eq!(cfg.apps[0].app_id, "123456789");
        assert_eq!(cfg.apps[0].app_name, "My App");
    }

    #[test]
    fn credentials_are_optional() {
        let doc = r#"{ "apps": [] }"#;
        let cfg: Config = serde_json::from_str(doc).unwrap();
        assert!(cfg.app_store_connect.is_none());
        assert!(cfg.apps.is_empty());
    }

    #[test]
    fn validate_rejects_blank_ids_and_missing_key_file() {
        let creds = ConnectCredentials {
            key_id: String::new(),
            issuer_id: "issuer-1".into(),
            private_key_path: "/nonexistent/key.p8".into(),
        };
        assert!(!creds.validate());

        let creds = ConnectCredentials {
            key_id: "ABC123".into(),
            issuer_id: "issuer-1".into(),
            private_key_path: "/nonexistent/key.p8".into(),
        };
        assert!(!creds.validate());
    }
}
