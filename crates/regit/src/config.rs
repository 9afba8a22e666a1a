use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to SQLite database file (default: "regit.db")
    /// Note: Only used when the `sqlite` or `auth-sqlite` feature is enabled.
    #[allow(dead_code)]
    pub database_url: String,
    /// Redis connection URL (default: "redis://localhost:6379")
    /// Note: Only used when the `auth-redis` feature is enabled.
    #[allow(dead_code)]
    pub redis_url: String,
    /// Origins allowed to make credentialed cross-origin requests.
    /// Empty means any origin is mirrored back.
    pub cors_allowed_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `DATABASE_URL` - SQLite database path (default: "regit.db")
    /// - `REDIS_URL` - Redis connection URL (default: "redis://localhost:6379")
    /// - `CORS_ALLOWED_ORIGINS` - Comma-separated origin list (default: any origin)
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "regit.db".to_string()),
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .map(|v| parse_origins(&v))
                .unwrap_or_default(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "regit.db".to_string(),
            redis_url: "redis://localhost:6379".to_string(),
            cors_allowed_origins: Vec::new(),
        }
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(|o| o.trim_end_matches('/').to_string())
        .collect()
}
