use chrono::{FixedOffset, Offset, Utc};
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{var}: {reason} (got '{value}')")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

fn invalid(var: &'static str, value: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason: reason.into(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub max_workers: usize,
    /// Price history origin.
    pub api_base: String,
    /// Search, quote and deals origin.
    pub legacy_api_base: String,
    pub graphql_url: String,
    /// Sent as `Origin` on deals requests.
    pub origin: Option<String>,
    /// Name of the environment variable holding the bearer token.
    pub token_var: String,
    pub fetch_timeout: Duration,
    pub deals_page_size: u32,
    pub table_page_size: u32,
    pub market_offset: FixedOffset,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            max_workers: 8,
            api_base: "https://api-prod-v21.strike.money/v2/api".into(),
            legacy_api_base: "https://api-prod.strike.money/v1/api".into(),
            graphql_url: "https://api-prod.strike.money/v1/graphql".into(),
            origin: Some("https://web.strike.money".into()),
            token_var: "STRIKE_API_TOKEN".into(),
            fetch_timeout: Duration::from_secs(20),
            deals_page_size: 1500,
            table_page_size: 250,
            market_offset: FixedOffset::east_opt(5 * 3600 + 30 * 60)
                .unwrap_or_else(|| Utc.fix()),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = AppConfig::default();
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(v) = get("BIND_ADDR") {
            cfg.bind_addr = v
                .parse()
                .map_err(|_| invalid("BIND_ADDR", &v, "expected host:port"))?;
        }
        if let Some(v) = get("MAX_WORKERS") {
            cfg.max_workers = positive("MAX_WORKERS", &v)?;
        }
        if let Some(v) = get("STRIKE_API_BASE") {
            cfg.api_base = http_url("STRIKE_API_BASE", &v)?;
        }
        if let Some(v) = get("STRIKE_LEGACY_API_BASE") {
            cfg.legacy_api_base = http_url("STRIKE_LEGACY_API_BASE", &v)?;
        }
        if let Some(v) = get("STRIKE_GRAPHQL_URL") {
            cfg.graphql_url = http_url("STRIKE_GRAPHQL_URL", &v)?;
        }
        if let Some(v) = get("STRIKE_ORIGIN") {
            // "none" disables the header entirely.
            cfg.origin = if v.eq_ignore_ascii_case("none") {
                None
            } else {
                Some(http_url("STRIKE_ORIGIN", &v)?)
            };
        }
        if let Some(v) = get("STRIKE_TOKEN_VAR") {
            cfg.token_var = v;
        }
        if let Some(v) = get("FETCH_TIMEOUT_SECS") {
            cfg.fetch_timeout = Duration::from_secs(positive("FETCH_TIMEOUT_SECS", &v)? as u64);
        }
        if let Some(v) = get("DEALS_PAGE_SIZE") {
            cfg.deals_page_size = positive("DEALS_PAGE_SIZE", &v)? as u32;
        }
        if let Some(v) = get("TABLE_PAGE_SIZE") {
            cfg.table_page_size = positive("TABLE_PAGE_SIZE", &v)? as u32;
        }
        if let Some(v) = get("MARKET_UTC_OFFSET") {
            cfg.market_offset = parse_offset(&v)
                .ok_or_else(|| invalid("MARKET_UTC_OFFSET", &v, "expected +HH:MM"))?;
        }

        Ok(cfg)
    }
}

fn positive(var: &'static str, raw: &str) -> Result<usize, ConfigError> {
    match raw.parse::<u32>() {
        Ok(0) | Err(_) => Err(invalid(var, raw, "expected a positive integer")),
        Ok(n) => Ok(n as usize),
    }
}

fn http_url(var: &'static str, raw: &str) -> Result<String, ConfigError> {
    let parsed = url::Url::parse(raw)
        .map_err(|e| invalid(var, raw, e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(raw.trim_end_matches('/').to_string()),
        other => Err(invalid(var, raw, format!("unsupported scheme {other}"))),
    }
}

/// `+05:30`, `-04:00`, `Z`.
pub fn parse_offset(raw: &str) -> Option<FixedOffset> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("z") {
        return FixedOffset::east_opt(0);
    }

    let (sign, rest) = if let Some(rest) = raw.strip_prefix('+') {
        (1, rest)
    } else if let Some(rest) = raw.strip_prefix('-') {
        (-1, rest)
    } else {
        return None;
    };
    let (hours, minutes) = rest.split_once(':')?;
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if !(0..=14).contains(&hours) || !(0..60).contains(&minutes) {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
