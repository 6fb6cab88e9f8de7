use std::{env, fmt::Display, path::PathBuf, str::FromStr, time::Duration};

use anyhow::{Context, Result, anyhow};

const DEFAULT_CORS_ORIGINS: &str = "http://localhost:5173,http://localhost:3000";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub bind_addr: String,
    pub analytics_file: PathBuf,
    pub cors_origins: Vec<String>,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub admin_username: String,
    pub admin_password_hash: Option<String>,
    pub report_cache_ttl: Duration,
    pub store_lock_timeout: Duration,
}

impl Config {
    /// Read configuration from the process environment (after `.env` is loaded).
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            port: required("PORT")?
                .parse()
                .context("PORT must be a valid port number")?,
            bind_addr: try_load("BIND_ADDR", "127.0.0.1".to_string())?,
            analytics_file: try_load("ANALYTICS_FILE", PathBuf::from("data/analytics.json"))?,
            cors_origins: parse_origins(
                &env::var("CORS_ORIGINS").unwrap_or_else(|_| DEFAULT_CORS_ORIGINS.to_string()),
            ),
            jwt_secret: required("JWT_SECRET")?,
            jwt_ttl_hours: try_load("JWT_TTL_HOURS", 24)?,
            admin_username: try_load("ADMIN_USERNAME", "admin".to_string())?,
            admin_password_hash: env::var("ADMIN_PASSWORD_HASH").ok().filter(|h| !h.is_empty()),
            report_cache_ttl: Duration::from_secs(try_load("REPORT_CACHE_TTL_SECS", 30)?),
            store_lock_timeout: Duration::from_millis(try_load("STORE_LOCK_TIMEOUT_MS", 2000)?),
        })
    }
}

fn required(key: &str) -> Result<String> {
    env::var(key).map_err(|_| anyhow!("{key} not set"))
}

fn try_load<T: FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| anyhow!("Invalid {key} value {raw:?}: {e}")),
        Err(_) => {
            log::debug!("{key} not set, using default");
            Ok(default)
        }
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|o| o.trim().trim_end_matches('/'))
        .filter(|o| !o.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
impl Config {
    pub fn for_tests(analytics_file: PathBuf) -> Self {
        Self {
            port: 0,
            bind_addr: "127.0.0.1".to_string(),
            analytics_file,
            cors_origins: parse_origins(DEFAULT_CORS_ORIGINS),
            jwt_secret: "test-secret".to_string(),
            jwt_ttl_hours: 1,
            admin_username: "admin".to_string(),
            admin_password_hash: bcrypt::hash("hunter22", 4).ok(),
            report_cache_ttl: Duration::from_secs(60),
            store_lock_timeout: Duration::from_secs(2),
        }
    }
}
