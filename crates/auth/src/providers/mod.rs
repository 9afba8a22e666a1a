//! OAuth provider implementations and the registry that looks them up by
//! the `{provider}` path segment.

mod google;
#[cfg(feature = "mock")]
mod mock;

use std::collections::HashMap;
use std::sync::Arc;

use regit_core::auth::OAuthProviderClient;

use crate::config::AuthConfig;
#[cfg(feature = "mock")]
use crate::config::GOOGLE_PROVIDER;
use crate::error::AuthError;

pub use google::GoogleProvider;
#[cfg(feature = "mock")]
pub use mock::{MockCode, MockProvider};

/// Providers available for login, keyed by name.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn OAuthProviderClient>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider under its own [`name`](OAuthProviderClient::name).
    pub fn register(&mut self, provider: Arc<dyn OAuthProviderClient>) {
        self.providers.insert(provider.name().to_string(), provider);
    }

    pub fn with(mut self, provider: Arc<dyn OAuthProviderClient>) -> Self {
        self.register(provider);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn OAuthProviderClient>> {
        self.providers.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(String::as_str)
    }

    /// Build the registry for the configured providers.
    ///
    /// With the `mock` feature every provider is served by the mock IdP.
    pub async fn from_config(config: &AuthConfig) -> Result<Self, AuthError> {
        let mut registry = Self::new();

        #[cfg(feature = "mock")]
        {
            registry.register(Arc::new(MockProvider::new(
                GOOGLE_PROVIDER,
                config.mock_idp_url.clone(),
                config.callback_url(GOOGLE_PROVIDER)?,
            )));
        }

        #[cfg(not(feature = "mock"))]
        if let Some(google) = &config.google {
            registry.register(Arc::new(GoogleProvider::new(google).await?));
        }

        if registry.providers.is_empty() {
            tracing::warn!("No OAuth providers configured; set OAUTH_KEY and OAUTH_SECRET");
        }

        Ok(registry)
    }
}
