use axum::http::HeaderValue;
use licensing_core::hashing::sha256_hex;
use licensing_core::licence::DEFAULT_LICENCE_DAYS;

/// Default bind port, matching the managed container platform convention.
pub const DEFAULT_PORT: u16 = 8080;

/// Errors raised while reading configuration at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} has invalid value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Server configuration loaded from environment variables.
///
/// Everything except the MeuDanfe API key has a default suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8080`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// MeuDanfe API key handed to every licence holder.
    pub meudanfe_api_key: String,
    /// Validity of a newly issued licence in days (default: `30`).
    pub licence_days: u32,
    /// SHA-256 hex digest of `ADMIN_TOKEN`. Admin routes reject every
    /// request when unset.
    pub admin_token_hash: Option<String>,
    /// Interval of the background expiry sweep in seconds (default: `3600`).
    pub sweep_interval_secs: u64,
    /// Emit JSON log lines instead of human-readable text.
    pub log_json: bool,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default       |
    /// |-------------------------------|---------------|
    /// | `HOST`                        | `0.0.0.0`     |
    /// | `PORT`                        | `8080`        |
    /// | `CORS_ORIGINS`                | (none)        |
    /// | `REQUEST_TIMEOUT_SECS`        | `30`          |
    /// | `MEUDANFE_API_KEY`            | required      |
    /// | `LICENCE_DAYS`                | `30`          |
    /// | `ADMIN_TOKEN`                 | (none)        |
    /// | `LICENCE_SWEEP_INTERVAL_SECS` | `3600`        |
    /// | `LOG_FORMAT`                  | `text`        |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let host = get("HOST").unwrap_or_else(|| "0.0.0.0".into());
        if host.parse::<std::net::IpAddr>().is_err() {
            return Err(ConfigError::Invalid {
                var: "HOST",
                value: host,
                reason: "not an IP address".into(),
            });
        }

        let port = parse_or("PORT", get("PORT"), DEFAULT_PORT)?;

        let cors_origins: Vec<String> = get("CORS_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        for origin in &cors_origins {
            if let Err(e) = origin.parse::<HeaderValue>() {
                return Err(ConfigError::Invalid {
                    var: "CORS_ORIGINS",
                    value: origin.clone(),
                    reason: e.to_string(),
                });
            }
        }

        let request_timeout_secs = parse_or("REQUEST_TIMEOUT_SECS", get("REQUEST_TIMEOUT_SECS"), 30)?;

        let meudanfe_api_key = get("MEUDANFE_API_KEY")
            .map(|v| v.trim().to_string())
            .ok_or(ConfigError::Missing("MEUDANFE_API_KEY"))?;

        let licence_days = parse_or("LICENCE_DAYS", get("LICENCE_DAYS"), DEFAULT_LICENCE_DAYS)?;
        if licence_days == 0 {
            return Err(ConfigError::Invalid {
                var: "LICENCE_DAYS",
                value: "0".into(),
                reason: "must be at least 1".into(),
            });
        }

        let admin_token_hash = get("ADMIN_TOKEN").map(|t| sha256_hex(t.trim().as_bytes()));

        let sweep_interval_secs = parse_or(
            "LICENCE_SWEEP_INTERVAL_SECS",
            get("LICENCE_SWEEP_INTERVAL_SECS"),
            3600,
        )?
        .max(1);

        let log_json = get("LOG_FORMAT").is_some_and(|f| f.trim().eq_ignore_ascii_case("json"));

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            meudanfe_api_key,
            licence_days,
            admin_token_hash,
            sweep_interval_secs,
            log_json,
        })
    }
}

fn parse_or<T>(var: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: e.to_string(),
            value,
        }),
    }
}
