use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Session key holding the logged-in user's internal ID (cross-site scope).
pub const USER_ID_KEY: &str = "user_id";

/// Session key holding the base64 return URL (same-site scope).
pub const NEXT_KEY: &str = "next";

/// Where the callback lands when no return URL was requested.
pub const DEFAULT_LANDING_PATH: &str = "/profile";

/// Cryptographically random session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: String) -> Self {
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Namespace a session lives in.
///
/// Each scope has its own cookie; the same ID in two scopes names two
/// unrelated sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionScope {
    /// Long-lived authenticated session. Its cookie is sent cross-site.
    CrossSite,
    /// Short-lived session carrying `next` across the provider round trip.
    SameSite,
}

impl SessionScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CrossSite => "cross_site",
            Self::SameSite => "same_site",
        }
    }
}

impl std::fmt::Display for SessionScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SessionScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cross_site" => Ok(Self::CrossSite),
            "same_site" => Ok(Self::SameSite),
            other => Err(format!("unknown session scope: {other}")),
        }
    }
}

/// Server-side key/value state attached to a browser cookie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub scope: SessionScope,
    #[serde(default)]
    pub values: BTreeMap<String, Value>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Creates an empty session.
    pub fn new(
        id: SessionId,
        scope: SessionScope,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            scope,
            values: BTreeMap::new(),
            created_at,
            expires_at,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Returns the value under `key` when it is a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }
}

/// Identity returned by a provider after a successful code exchange.
///
/// Missing claims are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderIdentity {
    /// Name of the provider that issued the identity (e.g. `google`).
    pub provider: String,
    /// Provider's stable user identifier (the OIDC `sub` claim).
    pub provider_user_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub nickname: String,
}

/// CSRF state and PKCE verifier kept while the browser is at the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthFlowState {
    pub pkce_verifier: String,
    /// Provider name from the login path; the callback must name the same one.
    pub provider: String,
    pub created_at: DateTime<Utc>,
}
