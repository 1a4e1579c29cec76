//! Explicit authentication state: the JWT issued at login plus its decoded expiry.
//!
//! Expiry is evaluated lazily whenever the session is consulted, so a token that
//! has lapsed simply stops being offered; nothing runs in the background.

use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{DecodingKey, Validation};
use serde::Deserialize;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::error::ClientError;

/// Answers whether the current caller may see privacy-sensitive relation hints.
pub trait AuthContext: Send + Sync {
    fn is_authenticated(&self) -> bool;
}

/// Fixed answer, for embedding without a login flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticAuth(pub bool);

impl AuthContext for StaticAuth {
    fn is_authenticated(&self) -> bool {
        self.0
    }
}

#[derive(Debug, Deserialize)]
struct Claims {
    #[serde(default)]
    sub: Option<String>,
    exp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SessionToken {
    jwt: String,
    subject: Option<String>,
    expires_at: DateTime<Utc>,
}

pub struct Session {
    token: RwLock<Option<SessionToken>>,
    changes: watch::Sender<bool>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        let (changes, _) = watch::channel(false);
        Self {
            token: RwLock::new(None),
            changes,
        }
    }

    /// Stores a freshly issued token. The payload is decoded but not verified; the
    /// server remains the authority on signatures.
    pub fn set_token(&self, jwt: &str) -> Result<(), ClientError> {
        let claims = decode_claims(jwt)?;
        let expires_at = Utc
            .timestamp_opt(claims.exp, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        info!(subject = ?claims.sub, %expires_at, "session established");
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(SessionToken {
            jwt: jwt.to_string(),
            subject: claims.sub,
            expires_at,
        });
        self.changes.send_replace(self.is_authenticated());
        Ok(())
    }

    pub fn clear(&self) {
        let previous = self
            .token
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if previous.is_some() {
            debug!("session cleared");
        }
        self.changes.send_replace(false);
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.read(|token| token.expires_at)
    }

    pub fn subject(&self) -> Option<String> {
        self.read(|token| token.subject.clone()).flatten()
    }

    /// The raw JWT, only while it is unexpired.
    pub fn bearer_token(&self) -> Option<String> {
        let now = Utc::now();
        self.read(|token| (now < token.expires_at).then(|| token.jwt.clone()))
            .flatten()
    }

    /// Notified with the new authentication state on login and logout.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.changes.subscribe()
    }

    fn read<T>(&self, f: impl FnOnce(&SessionToken) -> T) -> Option<T> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(f)
    }
}

impl AuthContext for Session {
    fn is_authenticated(&self) -> bool {
        self.expires_at()
            .is_some_and(|expires_at| Utc::now() < expires_at)
    }
}

fn decode_claims(jwt: &str) -> Result<Claims, ClientError> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    let data = jsonwebtoken::decode::<Claims>(jwt, &DecodingKey::from_secret(&[]), &validation)?;
    Ok(data.claims)
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
