//! Short-lived service-to-service bearer tokens.
//!
//! Tokens come from the auth service and are cached until shortly before
//! expiry; concurrent callers share one cached token and one refresh.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;

use watchtower_core::config::AuthConfig;

use crate::error::RegistryError;

/// Refresh this long before the advertised expiry.
const EXPIRY_MARGIN_SECS: i64 = 30;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    token: String,
    /// Lifetime in seconds.
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_MARGIN_SECS) < self.expires_at
    }
}

/// Fetches and caches the service account's bearer token.
pub struct ServiceTokenProvider {
    config: AuthConfig,
    client: reqwest::Client,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceTokenProvider {
    pub fn new(config: AuthConfig, client: reqwest::Client) -> Self {
        Self {
            config,
            client,
            cached: Mutex::new(None),
        }
    }

    /// Return a valid bearer token, refreshing if the cached one is stale.
    pub async fn token(&self) -> Result<String, RegistryError> {
        let (service_id, service_secret) = match (
            self.config.service_id.as_deref(),
            self.config.service_secret.as_deref(),
        ) {
            (Some(id), Some(secret)) => (id, secret),
            _ => {
                return Err(RegistryError::Auth(
                    "service account credentials not configured".to_string(),
                ))
            }
        };

        let mut cached = self.cached.lock().await;
        if let Some(existing) = cached.as_ref() {
            if existing.is_fresh(Utc::now()) {
                return Ok(existing.token.clone());
            }
        }

        debug!(url = %self.config.token_url, "requesting service token");
        let response = self
            .client
            .post(&self.config.token_url)
            .json(&serde_json::json!({
                "serviceId": service_id,
                "serviceSecret": service_secret,
            }))
            .send()
            .await
            .map_err(|e| RegistryError::Auth(format!("token request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(RegistryError::Auth(format!(
                "auth service returned {status}: {body}"
            )));
        }

        let parsed: TokenResponse = response
            .json()
            .await
            .map_err(|e| RegistryError::Auth(format!("bad token response: {e}")))?;

        let token = CachedToken {
            token: parsed.token,
            expires_at: Utc::now() + Duration::seconds(parsed.expires_in),
        };
        let result = token.token.clone();
        *cached = Some(token);

        Ok(result)
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn auth(id: Option<&str>, secret: Option<&str>) -> AuthConfig {
        AuthConfig {
            token_url: "http://localhost:0/auth/service-token".to_string(),
            service_id: id.map(String::from),
            service_secret: secret.map(String::from),
        }
    }

    #[test]
    fn test_token_response_camel_case() {
        let json = r#"{"token":"abc.def.ghi","expiresIn":900}"#;
        let parsed: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.token, "abc.def.ghi");
        assert_eq!(parsed.expires_in, 900);
    }

    #[test]
    fn test_cached_token_freshness_margin() {
        let now = Utc::now();
        let fresh = CachedToken {
            token: "t".to_string(),
            expires_at: now + Duration::seconds(120),
        };
        assert!(fresh.is_fresh(now));

        // Inside the refresh margin counts as stale even though not expired.
        let stale = CachedToken {
            token: "t".to_string(),
            expires_at: now + Duration::seconds(EXPIRY_MARGIN_SECS - 1),
        };
        assert!(!stale.is_fresh(now));
    }

    #[tokio::test]
    async fn test_token_fails_without_credentials() {
        let provider = ServiceTokenProvider::new(auth(None, None), reqwest::Client::new());
        let err = provider.token().await.unwrap_err();
        assert!(matches!(err, RegistryError::Auth(_)));
        assert!(err.to_string().contains("not configured"));
    }

    #[tokio::test]
    async fn test_token_fails_with_partial_credentials() {
        let provider =
            ServiceTokenProvider::new(auth(Some("module-service"), None), reqwest::Client::new());
        assert!(provider.token().await.is_err());
    }
}
