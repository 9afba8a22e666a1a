use std::time::Duration;

use url::Url;

use crate::error::AuthError;

/// Name the Google provider is registered under (`/login/google`).
pub const GOOGLE_PROVIDER: &str = "google";

/// Cookie carrying the authenticated (cross-site) session ID.
pub const SESSION_COOKIE: &str = "regit_session";

/// Cookie carrying the same-site session used for the return URL.
pub const NEXT_COOKIE: &str = "regit_next";

/// Cookie binding an in-flight OAuth login to the browser.
pub const OAUTH_COOKIE: &str = "regit_oauth";

/// Configuration for a single OAuth provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub client_id: String,
    pub client_secret: Option<String>,
    pub redirect_uri: Url,
}

/// Complete auth configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub google: Option<ProviderConfig>,
    pub session_ttl: Duration,
    /// How long a login may stay at the provider before its state is rejected.
    pub flow_ttl: Duration,
    pub base_url: Url,
    pub cookie_secure: bool,
    pub cookie_domain: Option<String>,
    /// Mock IdP location, used by the `mock` feature only.
    pub mock_idp_url: Url,
}

impl AuthConfig {
    /// Defaults for the given callback base URL, with no provider configured.
    pub fn new(base_url: Url) -> Self {
        Self {
            google: None,
            session_ttl: Duration::from_secs(7 * 24 * 60 * 60),
            flow_ttl: Duration::from_secs(10 * 60),
            base_url,
            cookie_secure: false,
            cookie_domain: None,
            mock_idp_url: Url::parse("http://localhost:3001").expect("static URL is valid"),
        }
    }

    /// Load from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `AUTH_BASE_URL`: Base URL for callback redirects (default: `http://127.0.0.1:3388`)
    /// - `OAUTH_KEY`: Google OAuth client ID (optional, enables Google login)
    /// - `OAUTH_SECRET`: Google OAuth client secret (required if `OAUTH_KEY` is set)
    /// - `SESSION_TTL_DAYS`: Session TTL in days (default: 7)
    /// - `FLOW_TTL_MINUTES`: Pending login TTL in minutes (default: 10)
    /// - `COOKIE_SECURE`: Whether to set the secure flag on cookies (default: false)
    /// - `COOKIE_DOMAIN`: Domain attribute for the session cookie (optional)
    /// - `MOCK_IDP_URL`: Mock IdP base URL (default: `http://localhost:3001`)
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Config` if a URL or number does not parse, or if
    /// the Google provider is partially configured.
    pub fn from_env() -> Result<Self, AuthError> {
        let base_url = parse_url_var("AUTH_BASE_URL", "http://127.0.0.1:3388")?;
        let mut config = Self::new(base_url);

        config.google = match std::env::var("OAUTH_KEY") {
            Ok(client_id) => Some(ProviderConfig {
                client_id,
                client_secret: Some(std::env::var("OAUTH_SECRET").map_err(|_| {
                    AuthError::Config("OAUTH_SECRET is required when OAUTH_KEY is set".to_string())
                })?),
                redirect_uri: config.callback_url(GOOGLE_PROVIDER)?,
            }),
            Err(_) => None,
        };

        if let Some(days) = parse_number_var("SESSION_TTL_DAYS")? {
            config.session_ttl = Duration::from_secs(days * 24 * 60 * 60);
        }

        if let Some(minutes) = parse_number_var("FLOW_TTL_MINUTES")? {
            config.flow_ttl = Duration::from_secs(minutes * 60);
        }

        config.cookie_secure = std::env::var("COOKIE_SECURE")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        config.cookie_domain = std::env::var("COOKIE_DOMAIN")
            .ok()
            .filter(|d| !d.is_empty());

        config.mock_idp_url = parse_url_var("MOCK_IDP_URL", "http://localhost:3001")?;

        Ok(config)
    }

    /// Callback URL the provider redirects back to.
    pub fn callback_url(&self, provider: &str) -> Result<Url, AuthError> {
        self.base_url
            .join(&format!("/auth/callback/{provider}"))
            .map_err(|e| AuthError::Config(e.to_string()))
    }
}

fn parse_url_var(name: &str, default: &str) -> Result<Url, AuthError> {
    std::env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map_err(|e| AuthError::Config(format!("{name} must be a valid URL: {e}")))
}

fn parse_number_var(name: &str) -> Result<Option<u64>, AuthError> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse::<u64>()
            .map(Some)
            .map_err(|e| AuthError::Config(format!("{name} must be a number: {e}"))),
        Err(_) => Ok(None),
    }
}
