//! App Store Connect bearer tokens.
//!
//! Tokens are ES256-signed JWTs built from the configured key id, issuer id
//! and `.p8` private key, valid for twenty minutes. Any failure here means
//! "authenticated source unavailable" to the caller, never a hard stop.

use anyhow::{Context, Result};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::ConnectCredentials;

pub const TOKEN_AUDIENCE: &str = "appstoreconnect-v1";
pub const TOKEN_TTL_SECS: u64 = 20 * 60;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub iss: String,
    pub iat: u64,
    pub exp: u64,
    pub aud: String,
}

impl Claims {
    pub fn new(issuer_id: &str, now_unix: u64) -> Self {
        Self {
            iss: issuer_id.to_string(),
            iat: now_unix,
            exp: now_unix + TOKEN_TTL_SECS,
            aud: TOKEN_AUDIENCE.to_string(),
        }
    }
}

pub struct ConnectTokenProvider {
    key_id: String,
    issuer_id: String,
    private_key_path: PathBuf,
}

impl ConnectTokenProvider {
    pub fn new(credentials: &ConnectCredentials) -> Self {
        Self {
            key_id: credentials.key_id.clone(),
            issuer_id: credentials.issuer_id.clone(),
            private_key_path: PathBuf::from(&credentials.private_key_path),
        }
    }

    /// Sign a fresh short-lived bearer token. Reads the key file on every
    /// call; the only state this component has is on disk.
    pub fn generate(&self) -> Result<String> {
        let pem = std::fs::read(&self.private_key_path).with_context(|| {
            format!("reading private key {}", self.private_key_path.display())
        })?;
        let key = EncodingKey::from_ec_pem(&pem).context("parsing EC private key")?;

        let now = chrono::Utc::now().timestamp().max(0) as u64;
        let claims = Claims::new(&self.issuer_id, now);

        let mut header = Header::new(Algorithm::ES256);
        header.kid = Some(self.key_id.clone());

        encode(&header, &claims, &key).context("signing App Store Connect token")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials(path: &str) -> ConnectCredentials {
        ConnectCredentials {
            key_id: "ABC123".into(),
            issuer_id: "issuer-1".into(),
            private_key_path: path.into(),
        }
    }

    #[test]
    fn claims_carry_fixed_audience_and_twenty_minute_window() {
        let claims = Claims::new("issuer-1", 1_700_000_000);
        assert_eq!(claims.iss, "issuer-1");
        assert_eq!(claims.aud, TOKEN_AUDIENCE);
        assert_eq!(claims.iat, 1_700_000_000);
        assert_eq!(claims.exp, 1_700_000_000 + 1200);
    }

    #[test]
    fn missing_key_file_is_an_error_not_a_panic() {
        let provider = ConnectTokenProvider::new(&credentials("/nonexistent/AuthKey.p8"));
        assert!(provider.generate().is_err());
    }

    #[test]
    fn garbage_key_material_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("AuthKey.p8");
        std::fs::write(&path, "not a pem at all").unwrap();
        let provider = ConnectTokenProvider::new(&credentials(path.to_str().unwrap()));
        assert!(provider.generate().is_err());
    }
}
