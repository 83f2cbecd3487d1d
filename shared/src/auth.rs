//! Email/password sessions against the hosted auth service.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::{config::SupabaseConfig, Result, StudioError};

/// A signed-in administrator session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token sent with store writes.
    pub access_token: String,
    /// Refresh token issued with the session.
    pub refresh_token: String,
    /// Absolute expiry computed from the token's `expires_in`.
    pub expires_at: DateTime<Utc>,
    /// Email of the signed-in user, when the service returns one.
    pub user_email: Option<String>,
}

impl Session {
    /// True once `now` has reached the expiry.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Gate for CMS operations: passes only a present, unexpired session.
pub fn require_session(session: Option<&Session>, now: DateTime<Utc>) -> Result<&Session> {
    match session {
        Some(session) if !session.is_expired(now) => Ok(session),
        _ => Err(StudioError::AuthRequired),
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
    #[serde(default)]
    user: Option<TokenUser>,
}

#[derive(Debug, Deserialize)]
struct TokenUser {
    email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct AuthErrorBody {
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
}

impl AuthErrorBody {
    fn into_message(self) -> Option<String> {
        self.error_description.or(self.msg).or(self.message)
    }
}

#[derive(Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

fn session_from_token(token: TokenResponse, issued_at: DateTime<Utc>) -> Session {
    Session {
        access_token: token.access_token,
        refresh_token: token.refresh_token,
        expires_at: issued_at + Duration::seconds(token.expires_in),
        user_email: token.user.and_then(|user| user.email),
    }
}

/// Auth client that publishes every session change on a watch channel.
pub struct SupabaseAuth {
    config: SupabaseConfig,
    client: reqwest::Client,
    session: watch::Sender<Option<Session>>,
}

impl SupabaseAuth {
    /// Builds the HTTP client; no session until sign-in or [`Self::restore`].
    pub fn new(config: SupabaseConfig) -> Result<Self> {
        let client = config.http_client()?;
        let (session, _) = watch::channel(None);
        Ok(Self {
            config,
            client,
            session,
        })
    }

    /// Snapshot of the session currently published.
    pub fn current_session(&self) -> Option<Session> {
        self.session.borrow().clone()
    }

    /// Session changes (sign-in, sign-out, restore). The route guard
    /// listens here.
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.session.subscribe()
    }

    /// Adopts a session persisted by an earlier run.
    pub fn restore(&self, session: Option<Session>) {
        self.session.send_replace(session);
    }

    /// Password sign-in. Publishes the new session to subscribers.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let response = self
            .client
            .post(format!("{}/auth/v1/token", self.config.url))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.config.anon_key)
            .json(&PasswordGrant {
                email,
                password,
            })
            .send()
            .await
            .map_err(|err| StudioError::StoreUnavailable(format!("auth request failed: {err}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| StudioError::StoreUnavailable(format!("failed to read body: {err}")))?;
        if status.is_server_error() {
            return Err(StudioError::StoreUnavailable(format!("auth service returned {status}")));
        }
        if !status.is_success() {
            let message = serde_json::from_str::<AuthErrorBody>(&body)
                .unwrap_or_default()
                .into_message()
                .unwrap_or_else(|| format!("HTTP {status}"));
            return Err(StudioError::Auth(message));
        }

        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|err| StudioError::StoreUnavailable(format!("undecodable token: {err}")))?;
        let session = session_from_token(token, Utc::now());
        tracing::info!(
            "signed in as {}",
            session.user_email.as_deref().unwrap_or(email)
        );
        self.session.send_replace(Some(session.clone()));
        Ok(session)
    }

    /// Revokes the current session remotely (best effort) and clears it.
    pub async fn sign_out(&self) -> Result<()> {
        let Some(session) = self.current_session() else {
            return Ok(());
        };
        let result = self
            .client
            .post(format!("{}/auth/v1/logout", self.config.url))
            .header("apikey", &self.config.anon_key)
            .bearer_auth(&session.access_token)
            .send()
            .await;
        match result {
            Ok(response) if !response.status().is_success() => {
                tracing::warn!("remote logout returned {}", response.status());
            },
            Err(err) => tracing::warn!("remote logout failed: {err}"),
            Ok(_) => {},
        }
        self.session.send_replace(None);
        tracing::info!("signed out");
        Ok(())
    }
}
