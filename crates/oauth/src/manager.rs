//! Access-token lifecycle: validity check, refresh-token grant, persistence.
//!
//! Each call walks the same short state machine:
//!
//! ```text
//! CHECKING ──valid──────────────────────────────▶ VALID
//!    │
//!    └─stale / forced / unreadable─▶ REFRESHING ─▶ REFRESHED
//!                                        │
//!                                        └───────▶ REFRESH_FAILED
//! ```
//!
//! Nothing is cached between calls and nothing is retried; callers that want
//! backoff loop on their own.

use std::sync::Arc;

use {
    nestread_config::Settings,
    reqwest::{Client, StatusCode},
    serde::Deserialize,
    tracing::{debug, info, warn},
};

use crate::{
    error::{AuthError, Unavailable},
    storage::SecretStore,
    types::{Lifetime, Secret, SecretKind, now_secs},
};

/// Receives the raw body of a successful-status token response that did not
/// contain a usable grant, typically a provider error payload.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, body: &str);
}

/// Default reporter, ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl ErrorReporter for NoopReporter {
    fn report(&self, _body: &str) {}
}

/// Validity of the stored access token, as seen without touching the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStatus {
    NeverExpires,
    Valid { expires_at: i64 },
    /// Past expiry, or inside the jitter window before it.
    Expired { expires_at: i64 },
    /// The record carries no timing data, or a zero lifetime.
    Unknown,
}

#[derive(Debug, Deserialize)]
struct TokenGrant {
    access_token: Option<String>,
    expires_in: Option<u64>,
}

impl TokenGrant {
    /// Returns the access token and its lifetime, or the name of the first
    /// missing or out-of-range field.
    fn parse(body: &str) -> Result<(String, i64), &'static str> {
        let grant: Self = serde_json::from_str(body).map_err(|_| "access_token")?;
        let access_token = grant
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or("access_token")?;
        let expires_in = grant
            .expires_in
            .and_then(|secs| i64::try_from(secs).ok())
            .ok_or("expires_in")?;
        Ok((access_token, expires_in))
    }
}

/// Hands out a currently valid access token, refreshing it when needed.
pub struct TokenManager<'a> {
    store: SecretStore<'a>,
    client: Client,
    token_url: String,
    jitter: i64,
    reporter: Arc<dyn ErrorReporter>,
}

impl<'a> TokenManager<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self {
            store: SecretStore::new(settings),
            client: Client::new(),
            token_url: settings.token_url.clone(),
            jitter: settings.token_jitter_secs,
            reporter: Arc::new(NoopReporter),
        }
    }

    /// Use a preconfigured HTTP client (e.g. one with a request timeout).
    #[must_use]
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Treat tokens as expired this many seconds before their real expiry.
    #[must_use]
    pub fn with_jitter(mut self, secs: i64) -> Self {
        self.jitter = secs;
        self
    }

    #[must_use]
    pub fn with_error_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn store(&self) -> &SecretStore<'a> {
        &self.store
    }

    /// Return a valid access token, refreshing it first if it is stale or
    /// `force_refresh` is set.
    ///
    /// At most one refresh request is made. Every failure is reported as
    /// [`Unavailable`].
    pub async fn get_valid_token(&self, force_refresh: bool) -> Result<Secret, Unavailable> {
        self.acquire(force_refresh).await.map_err(|e| {
            warn!(error = %e, "access token unavailable");
            Unavailable::from(e)
        })
    }

    /// The access token value, ready for an `Authorization: Bearer` header.
    pub async fn bearer_token(&self, force_refresh: bool) -> Result<String, Unavailable> {
        let token = self.get_valid_token(force_refresh).await?;
        Ok(token.expose().to_string())
    }

    /// Inspect the stored access token without refreshing it.
    pub fn status(&self) -> Result<TokenStatus, AuthError> {
        let token = self.store.load_kind(SecretKind::AccessToken)?;
        let Some(timing) = token.timing.filter(|t| t.lifetime != Lifetime::Seconds(0)) else {
            return Ok(TokenStatus::Unknown);
        };
        let Some(expires_at) = timing.expires_at() else {
            return Ok(TokenStatus::NeverExpires);
        };
        if token.is_valid_at(now_secs(), self.jitter) {
            Ok(TokenStatus::Valid { expires_at })
        } else {
            Ok(TokenStatus::Expired { expires_at })
        }
    }

    async fn acquire(&self, force_refresh: bool) -> Result<Secret, AuthError> {
        let current = match self.store.load_kind(SecretKind::AccessToken) {
            Ok(token) if force_refresh => {
                debug!("forced refresh requested");
                token
            },
            Ok(token) if token.is_valid_at(now_secs(), self.jitter) => {
                debug!("access token still valid");
                return Ok(token);
            },
            Ok(token) => {
                debug!(has_timing = token.timing.is_some(), "access token stale");
                token
            },
            Err(e) => {
                warn!(error = %e, "cannot read access token, requesting a new one");
                Secret::new(String::new(), SecretKind::AccessToken)
            },
        };
        self.refresh(current).await
    }

    async fn refresh(&self, mut token: Secret) -> Result<Secret, AuthError> {
        info!("refreshing access token");

        let load = |kind: SecretKind| {
            self.store
                .load_kind(kind)
                .map_err(|source| AuthError::MissingCredential {
                    kind,
                    source: Box::new(source),
                })
        };
        let client_id = load(SecretKind::ClientId)?;
        let client_secret = load(SecretKind::ClientSecret)?;
        let refresh_token = load(SecretKind::RefreshToken)?;
        load(SecretKind::ProjectId)?;

        let params = [
            ("client_id", client_id.expose()),
            ("client_secret", client_secret.expose()),
            ("refresh_token", refresh_token.expose()),
            ("grant_type", "refresh_token"),
        ];
        let response = self
            .client
            .post(&self.token_url)
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            debug!(status = status.as_u16(), body = %body, "token endpoint error body");
            return Err(AuthError::RefreshRejected {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let (access_token, expires_in) = match TokenGrant::parse(&body) {
            Ok(grant) => grant,
            Err(missing) => {
                self.reporter.report(&body);
                return Err(AuthError::RefreshResponseInvalid { missing });
            },
        };

        token.reissue(access_token, Lifetime::Seconds(expires_in), now_secs());
        token.kind = Some(SecretKind::AccessToken);
        self.store.save_kind(SecretKind::AccessToken, &token)?;

        info!(expires_in, "access token refreshed");
        Ok(token)
    }
}
