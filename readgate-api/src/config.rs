/// Configuration management for the API server
///
/// This module loads configuration from environment variables and provides
/// a type-safe configuration struct.
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 127.0.0.1)
/// - `API_PORT`: Port to bind to (default: 5555)
/// - `APP_DEBUG`: Enable debug logging (default: false)
/// - `DATABASE_URL`: SQLite connection string (default: sqlite://app.db)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 5)
/// - `SESSION_SECRET`: Secret used to sign session cookies (required)
/// - `SESSION_MAX_AGE_SECONDS`: Session lifetime (default: 31 days)
/// - `SESSION_COOKIE_SECURE`: Mark the session cookie `Secure` (default: false)
/// - `RUST_LOG`: Log filter, overrides `APP_DEBUG`
///
/// # Example
///
/// ```no_run
/// use readgate_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::env;

/// Default session lifetime: 31 days
pub const DEFAULT_SESSION_MAX_AGE_SECONDS: i64 = 31 * 24 * 60 * 60;

/// Minimum accepted length of `SESSION_SECRET`
pub const MIN_SESSION_SECRET_LEN: usize = 32;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Session cookie configuration
    pub session: SessionConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Debug mode (verbose logging)
    pub debug: bool,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// Session cookie configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Secret key for signing session cookies
    ///
    /// IMPORTANT: This must be kept secret and should be at least 32 bytes.
    /// Generate with: `openssl rand -hex 32`
    pub secret: String,

    /// Seconds a session cookie remains valid after it was last written
    pub max_age_seconds: i64,

    /// Whether the cookie is restricted to HTTPS
    pub secure: bool,
}

impl SessionConfig {
    /// Session lifetime as a duration
    ///
    /// `from_env` rejects lifetimes chrono cannot represent; a hand-built
    /// config with such a value is clamped to the largest one it can.
    pub fn max_age(&self) -> Duration {
        Duration::try_seconds(self.max_age_seconds).unwrap_or(Duration::MAX)
    }
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("secret", &"<redacted>")
            .field("max_age_seconds", &self.max_age_seconds)
            .field("secure", &self.secure)
            .finish()
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `SESSION_SECRET` is missing or shorter than 32 characters
    /// - Environment variables have invalid values
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let api_port = env::var("API_PORT")
            .unwrap_or_else(|_| "5555".to_string())
            .parse::<u16>()?;
        let debug = parse_flag(env::var("APP_DEBUG").ok().as_deref())?;

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://app.db".to_string());
        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u32>()?;

        let session_secret = env::var("SESSION_SECRET")
            .map_err(|_| anyhow::anyhow!("SESSION_SECRET environment variable is required"))?;

        if session_secret.len() < MIN_SESSION_SECRET_LEN {
            anyhow::bail!(
                "SESSION_SECRET must be at least {} characters long",
                MIN_SESSION_SECRET_LEN
            );
        }

        let max_age_seconds =
            parse_max_age(env::var("SESSION_MAX_AGE_SECONDS").ok().as_deref())?;

        let secure = parse_flag(env::var("SESSION_COOKIE_SECURE").ok().as_deref())?;

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                debug,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            session: SessionConfig {
                secret: session_secret,
                max_age_seconds,
                secure,
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Default tracing filter when `RUST_LOG` is unset
    pub fn default_log_filter(&self) -> &'static str {
        if self.api.debug {
            "readgate_api=debug,readgate_shared=debug,tower_http=debug"
        } else {
            "readgate_api=info,readgate_shared=info,tower_http=info"
        }
    }
}

/// Parses the session lifetime in seconds; unset means 31 days
fn parse_max_age(value: Option<&str>) -> anyhow::Result<i64> {
    let Some(value) = value else {
        return Ok(DEFAULT_SESSION_MAX_AGE_SECONDS);
    };

    let seconds = value.trim().parse::<i64>()?;

    if seconds <= 0 {
        anyhow::bail!("SESSION_MAX_AGE_SECONDS must be positive");
    }

    if Duration::try_seconds(seconds).is_none() {
        anyhow::bail!("SESSION_MAX_AGE_SECONDS is out of range: {}", seconds);
    }

    Ok(seconds)
}

/// Parses a boolean toggle; unset means false
fn parse_flag(value: Option<&str>) -> anyhow::Result<bool> {
    match value.map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(false),
        Some(v) => match v.as_str() {
            "" | "0" | "false" | "no" | "off" => Ok(false),
            "1" | "true" | "yes" | "on" => Ok(true),
            other => anyhow::bail!("Invalid boolean value: {}", other),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(debug: bool) -> Config {
        Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 5555,
                debug,
            },
            database: DatabaseConfig {
                url: "sqlite::memory:".to_string(),
                max_connections: 1,
            },
            session: SessionConfig {
                secret: "test-secret-key-at-least-32-bytes-long".to_string(),
                max_age_seconds: DEFAULT_SESSION_MAX_AGE_SECONDS,
                secure: false,
            },
        }
    }

    #[test]
    fn test_bind_address() {
        assert_eq!(test_config(false).bind_address(), "127.0.0.1:5555");
    }

    #[test]
    fn test_log_filter_follows_debug_toggle() {
        assert!(test_config(true).default_log_filter().contains("readgate_api=debug"));
        assert!(test_config(false).default_log_filter().contains("readgate_api=info"));
    }

    #[test]
    fn test_parse_flag() {
        assert!(!parse_flag(None).unwrap());
        assert!(!parse_flag(Some("0")).unwrap());
        assert!(parse_flag(Some("TRUE")).unwrap());
        assert!(parse_flag(Some(" yes ")).unwrap());
        assert!(parse_flag(Some("maybe")).is_err());
    }

    #[test]
    fn test_parse_max_age() {
        assert_eq!(parse_max_age(None).unwrap(), DEFAULT_SESSION_MAX_AGE_SECONDS);
        assert_eq!(parse_max_age(Some(" 3600 ")).unwrap(), 3600);
        assert!(parse_max_age(Some("0")).is_err());
        assert!(parse_max_age(Some("-5")).is_err());
        assert!(parse_max_age(Some("soon")).is_err());
    }

    #[test]
    fn test_parse_max_age_rejects_unrepresentable_lifetime() {
        let err = parse_max_age(Some("10000000000000000")).unwrap_err();
        assert!(err.to_string().contains("out of range"));

        let largest = Duration::MAX.num_seconds();
        assert_eq!(parse_max_age(Some(&largest.to_string())).unwrap(), largest);
    }

    #[test]
    fn test_max_age_never_panics() {
        let mut config = test_config(false);
        assert_eq!(config.session.max_age(), Duration::days(31));

        config.session.max_age_seconds = i64::MAX;
        assert_eq!(config.session.max_age(), Duration::MAX);
    }

    #[test]
    fn test_debug_output_hides_secret() {
        let rendered = format!("{:?}", test_config(false));
        assert!(!rendered.contains("test-secret-key"));
        assert!(rendered.contains("<redacted>"));
    }
}
