use std::num::NonZeroU32;

/// Upper bound for `METRICS_LOOKBACK_DAYS` (about a century).
pub const MAX_METRICS_LOOKBACK_DAYS: u32 = 36_500;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
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
    /// Threshold given to sensors registered without one (default: `2000`).
    pub default_threshold: i32,
    /// How far back the metrics endpoint looks (default: `30` days, at most
    /// [`MAX_METRICS_LOOKBACK_DAYS`]).
    pub metrics_lookback_days: NonZeroU32,
    /// Whether this process also runs the evaluation scheduler (default: `true`).
    pub monitor_enabled: bool,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default                    |
    /// |----------------------------|----------------------------|
    /// | `HOST`                     | `0.0.0.0`                  |
    /// | `PORT`                     | `3000`                     |
    /// | `CORS_ORIGINS`             | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`     | `30`                       |
    /// | `SENSOR_DEFAULT_THRESHOLD` | `2000`                     |
    /// | `METRICS_LOOKBACK_DAYS`    | `30`                       |
    /// | `MONITOR_ENABLED`          | `true`                     |
    ///
    /// Panics on malformed values so misconfiguration fails at startup.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ServerConfig::from_env`], reading values through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".into());

        let port: u16 = lookup("PORT")
            .unwrap_or_else(|| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = lookup("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let default_threshold: i32 = lookup("SENSOR_DEFAULT_THRESHOLD")
            .unwrap_or_else(|| "2000".into())
            .parse()
            .expect("SENSOR_DEFAULT_THRESHOLD must be a valid i32");

        let metrics_lookback_days: NonZeroU32 = lookup("METRICS_LOOKBACK_DAYS")
            .unwrap_or_else(|| "30".into())
            .parse()
            .expect("METRICS_LOOKBACK_DAYS must be a positive integer");
        assert!(
            metrics_lookback_days.get() <= MAX_METRICS_LOOKBACK_DAYS,
            "METRICS_LOOKBACK_DAYS must be at most {MAX_METRICS_LOOKBACK_DAYS}"
        );

        let monitor_enabled: bool = lookup("MONITOR_ENABLED")
            .unwrap_or_else(|| "true".into())
            .parse()
            .expect("MONITOR_ENABLED must be `true` or `false`");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            default_threshold,
            metrics_lookback_days,
            monitor_enabled,
        }
    }
}
