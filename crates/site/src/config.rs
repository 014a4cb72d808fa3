//! Site configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Backend (optional as a pair)
//! - `SUPABASE_URL` - Project URL (e.g., https://abcd.supabase.co)
//! - `SUPABASE_ANON_KEY` - Public anon key
//!
//! When either is missing the site runs in mock mode: every backend call
//! degrades immediately and sign-in issues demo sessions.
//!
//! ## Optional
//! - `SITE_HOST` - Bind address (default: 127.0.0.1)
//! - `SITE_PORT` - Listen port (default: 3000)
//! - `SITE_BASE_URL` - Public URL (default: http://localhost:3000)
//! - `SITE_BACKEND_FALLBACK` - `degrade` (default) or `strict`
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Anon key values that only ever come from templates and samples.
const PLACEHOLDER_KEYS: &[&str] = &[
    "your-anon-key",
    "your_anon_key",
    "your-supabase-anon-key",
    "supabase-anon-key",
    "anon-key",
    "mock-anon-key",
    "changeme",
    "placeholder",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// What the gateway does when a backend call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FallbackPolicy {
    /// Return mock or optimistic data tagged as degraded.
    #[default]
    Degrade,
    /// Return the error.
    Strict,
}

impl FromStr for FallbackPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "degrade" => Ok(Self::Degrade),
            "strict" => Ok(Self::Strict),
            other => Err(format!("expected `degrade` or `strict`, got `{other}`")),
        }
    }
}

/// Site configuration.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL; `https://` enables secure cookies
    pub base_url: String,
    /// Hosted backend, or `None` for mock mode
    pub supabase: Option<SupabaseConfig>,
    /// Gateway behavior on backend failure
    pub fallback: FallbackPolicy,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions sent to Sentry
    pub sentry_traces_sample_rate: f32,
}

/// Hosted backend configuration.
///
/// Implements `Debug` manually to redact the key.
#[derive(Clone)]
pub struct SupabaseConfig {
    /// Project URL
    pub url: Url,
    /// Anon key, sent as `apikey` on every request
    pub anon_key: SecretString,
}

impl std::fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("url", &self.url.as_str())
            .field("anon_key", &"[REDACTED]")
            .finish()
    }
}

impl SiteConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid. A
    /// placeholder anon key is not an error: the site runs in mock mode.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// See [`SiteConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = parse_or_default(get("SITE_HOST"), "SITE_HOST", "127.0.0.1")?;
        let port = parse_or_default(get("SITE_PORT"), "SITE_PORT", "3000")?;
        let base_url =
            get("SITE_BASE_URL").unwrap_or_else(|| "http://localhost:3000".to_string());
        let fallback = get("SITE_BACKEND_FALLBACK")
            .map(|v| v.parse::<FallbackPolicy>())
            .transpose()
            .map_err(|e| ConfigError::InvalidEnvVar("SITE_BACKEND_FALLBACK".to_string(), e))?
            .unwrap_or_default();

        let supabase = match (get("SUPABASE_URL"), get("SUPABASE_ANON_KEY")) {
            (Some(url), Some(key)) => match SupabaseConfig::new(&url, key) {
                Ok(config) => Some(config),
                Err(ConfigError::InsecureSecret(var, reason)) => {
                    tracing::warn!(var = %var, reason = %reason, "Ignoring backend configuration, running in mock mode");
                    None
                }
                Err(err) => return Err(err),
            },
            _ => None,
        };

        Ok(Self {
            host,
            port,
            base_url,
            supabase,
            fallback,
            sentry_dsn: get("SENTRY_DSN"),
            sentry_environment: get("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_or_default(
                get("SENTRY_SAMPLE_RATE"),
                "SENTRY_SAMPLE_RATE",
                "1.0",
            )?,
            sentry_traces_sample_rate: parse_or_default(
                get("SENTRY_TRACES_SAMPLE_RATE"),
                "SENTRY_TRACES_SAMPLE_RATE",
                "0.0",
            )?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the hosted backend is configured.
    #[must_use]
    pub const fn is_mock_mode(&self) -> bool {
        self.supabase.is_none()
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl SupabaseConfig {
    /// Validate and build a backend configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for an unparseable URL or a placeholder key.
    pub fn new(url: &str, anon_key: String) -> Result<Self, ConfigError> {
        let url = Url::parse(url)
            .map_err(|e| ConfigError::InvalidEnvVar("SUPABASE_URL".to_string(), e.to_string()))?;
        reject_placeholder(&anon_key, "SUPABASE_ANON_KEY")?;

        Ok(Self {
            url,
            anon_key: SecretString::from(anon_key),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn parse_or_default<T>(value: Option<String>, key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .as_deref()
        .unwrap_or(default)
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Reject a key whose whole value is a known placeholder.
fn reject_placeholder(key: &str, var_name: &str) -> Result<(), ConfigError> {
    let normalized = key.trim().to_ascii_lowercase();
    let normalized = normalized.trim_matches(|c: char| c == '<' || c == '>');
    if PLACEHOLDER_KEYS.contains(&normalized) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("`{normalized}` is a placeholder"),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    const KEY: &str = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.aB3xY9mK2nL5pQ7rT0uW4zC6";

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_backend_is_mock_mode() {
        let config = SiteConfig::from_lookup(lookup(&[])).unwrap();
        assert!(config.is_mock_mode());
        assert_eq!(config.fallback, FallbackPolicy::Degrade);
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert!(!config.is_secure());
        assert!((config.sentry_sample_rate - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_half_configured_backend_is_mock_mode() {
        let config =
            SiteConfig::from_lookup(lookup(&[("SUPABASE_URL", "https://x.supabase.co")])).unwrap();
        assert!(config.is_mock_mode());
    }

    #[test]
    fn test_backend_and_strict_policy() {
        let config = SiteConfig::from_lookup(lookup(&[
            ("SUPABASE_URL", "https://abcd.supabase.co"),
            ("SUPABASE_ANON_KEY", KEY),
            ("SITE_BACKEND_FALLBACK", "Strict"),
            ("SITE_BASE_URL", "https://teens.example.org"),
            ("SITE_PORT", "8080"),
        ]))
        .unwrap();

        assert!(!config.is_mock_mode());
        assert_eq!(config.fallback, FallbackPolicy::Strict);
        assert!(config.is_secure());
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = SiteConfig::from_lookup(lookup(&[("SITE_PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "SITE_PORT"));

        let err =
            SiteConfig::from_lookup(lookup(&[("SITE_BACKEND_FALLBACK", "maybe")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_placeholder_key_is_rejected() {
        for key in ["your-anon-key", " <YOUR_ANON_KEY> ", "changeme"] {
            let result = SupabaseConfig::new("https://abcd.supabase.co", key.to_string());
            assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))), "{key}");
        }
    }

    #[test]
    fn test_real_keys_with_placeholder_words_are_accepted() {
        let jwt = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.\
                   eyJyb2xlIjoiYW5vbiIsImlzcyI6InN1cGFiYXNlIn0.\
                   q7XxXtodoInsertReplaceZ9kLm2";
        assert!(SupabaseConfig::new("https://abcd.supabase.co", jwt.to_string()).is_ok());

        let short = SupabaseConfig::new("https://abcd.supabase.co", "aaaaaaaaaaaa".to_string());
        assert!(short.is_ok());
    }

    #[test]
    fn test_placeholder_key_falls_back_to_mock_mode() {
        let config = SiteConfig::from_lookup(lookup(&[
            ("SUPABASE_URL", "https://abcd.supabase.co"),
            ("SUPABASE_ANON_KEY", "your-anon-key"),
        ]))
        .unwrap();
        assert!(config.is_mock_mode());
    }

    #[test]
    fn test_invalid_backend_url_is_rejected() {
        let err = SiteConfig::from_lookup(lookup(&[
            ("SUPABASE_URL", "not a url"),
            ("SUPABASE_ANON_KEY", KEY),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "SUPABASE_URL"));
    }

    #[test]
    fn test_supabase_config_debug_redacts_key() {
        let config = SupabaseConfig::new("https://abcd.supabase.co", KEY.to_string()).unwrap();
        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("abcd.supabase.co"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains(KEY));
    }
}
