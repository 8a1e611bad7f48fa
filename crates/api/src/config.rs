use marginalia_core::mute_token::{MuteTokenConfig, DEFAULT_TTL_SECS};
use marginalia_notify::DispatchConfig;

use crate::mailer::MailerConfig;

/// Server configuration loaded from environment variables.
///
/// Everything except the mute-token secret has a default suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Frontend origin used for paper and mute links.
    pub frontend_url: String,
    /// Mute-link signing secret and lifetime.
    pub mute_token: MuteTokenConfig,
    /// Concurrency and timeout for outgoing email.
    pub dispatch: DispatchConfig,
    /// Which mail provider to use, if any.
    pub mailer: MailerConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `FRONTEND_URL`         | `http://localhost:5173`    |
    /// | `MUTE_TOKEN_SECRET`    | **required**               |
    /// | `MUTE_TOKEN_TTL_SECS`  | `2592000` (30 days)        |
    ///
    /// Dispatch and mailer settings are documented on [`DispatchConfig`] and
    /// [`MailerConfig`].
    ///
    /// # Panics
    ///
    /// Panics if `MUTE_TOKEN_SECRET` is missing or empty, or if a numeric
    /// variable does not parse.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let frontend_url =
            std::env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:5173".into());

        let secret = std::env::var("MUTE_TOKEN_SECRET")
            .expect("MUTE_TOKEN_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "MUTE_TOKEN_SECRET must not be empty");

        let ttl_secs: i64 = std::env::var("MUTE_TOKEN_TTL_SECS")
            .unwrap_or_else(|_| DEFAULT_TTL_SECS.to_string())
            .parse()
            .expect("MUTE_TOKEN_TTL_SECS must be a valid i64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            frontend_url,
            mute_token: MuteTokenConfig::new(secret).with_ttl(chrono::Duration::seconds(ttl_secs)),
            dispatch: DispatchConfig::from_env(),
            mailer: MailerConfig::from_env(),
        }
    }
}
