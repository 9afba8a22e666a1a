//! Mock OAuth provider for development and testing.
//!
//! Authorization URLs point at the mock IdP, and authorization codes are
//! base64 JSON carrying the identity the mock IdP's form submitted.

use async_trait::async_trait;
use base64::Engine;
use regit_core::auth::{AuthError, OAuthProviderClient, ProviderIdentity, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// Identity embedded in a mock authorization code.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MockCode {
    pub sub: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub nickname: String,
}

impl MockCode {
    /// Encode as an authorization code.
    pub fn encode(&self) -> String {
        let json = serde_json::to_vec(self).unwrap_or_default();
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(json)
    }

    /// Decode an authorization code produced by [`encode`](Self::encode).
    pub fn decode(code: &str) -> Result<Self> {
        let decoded = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(code)
            .map_err(|e| AuthError::CodeExchange(e.to_string()))?;

        serde_json::from_slice(&decoded).map_err(|e| AuthError::CodeExchange(e.to_string()))
    }
}

/// Mock provider that works with the mock IdP server.
pub struct MockProvider {
    name: String,
    mock_idp_url: Url,
    redirect_uri: Url,
}

impl MockProvider {
    /// Create a new MockProvider.
    ///
    /// # Arguments
    /// * `name` - Provider name to answer to (e.g. `google`)
    /// * `mock_idp_url` - The URL of the mock IdP server (e.g. http://localhost:3001)
    /// * `redirect_uri` - The callback URL for the main app
    pub fn new(name: impl Into<String>, mock_idp_url: Url, redirect_uri: Url) -> Self {
        Self {
            name: name.into(),
            mock_idp_url,
            redirect_uri,
        }
    }
}

#[async_trait]
impl OAuthProviderClient for MockProvider {
    async fn authorization_url(&self, state: &str, _pkce_challenge: &str) -> Result<Url> {
        let mut url = self
            .mock_idp_url
            .join(&format!("/{}/authorize", self.name))
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        url.query_pairs_mut()
            .append_pair("state", state)
            .append_pair("redirect_uri", self.redirect_uri.as_str());

        Ok(url)
    }

    async fn exchange_code(&self, code: &str, _pkce_verifier: &str) -> Result<ProviderIdentity> {
        let code = MockCode::decode(code)?;

        if code.sub.is_empty() {
            return Err(AuthError::InvalidIdentity("missing subject".to_string()));
        }

        Ok(ProviderIdentity {
            provider: self.name.clone(),
            provider_user_id: code.sub,
            email: code.email,
            first_name: code.first_name,
            last_name: code.last_name,
            nickname: code.nickname,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> MockProvider {
        MockProvider::new(
            "google",
            Url::parse("http://localhost:3001").unwrap(),
            Url::parse("http://localhost:3388/auth/callback/google").unwrap(),
        )
    }

    #[tokio::test]
    async fn test_authorization_url() {
        let url = provider()
            .authorization_url("test-state", "test-challenge")
            .await
            .unwrap();

        assert_eq!(url.path(), "/google/authorize");
        let query = url.query().unwrap();
        assert!(query.contains("state=test-state"));
        assert!(query.contains("redirect_uri="));
    }

    #[tokio::test]
    async fn test_exchange_code() {
        let code = MockCode {
            sub: "mock-1".to_string(),
            email: "test@example.com".to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            nickname: "tester".to_string(),
        }
        .encode();

        let identity = provider().exchange_code(&code, "verifier").await.unwrap();

        assert_eq!(identity.provider, "google");
        assert_eq!(identity.provider_user_id, "mock-1");
        assert_eq!(identity.email, "test@example.com");
        assert_eq!(identity.nickname, "tester");
    }

    #[tokio::test]
    async fn test_exchange_code_invalid() {
        let result = provider().exchange_code("invalid-code!", "verifier").await;
        assert!(matches!(result, Err(AuthError::CodeExchange(_))));
    }

    #[tokio::test]
    async fn test_exchange_code_without_subject() {
        let code = MockCode::default().encode();
        let result = provider().exchange_code(&code, "verifier").await;
        assert!(matches!(result, Err(AuthError::InvalidIdentity(_))));
    }
}
