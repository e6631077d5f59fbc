use thiserror::Error;

use crate::app_config::{AppConfig, Environment};

/// Default User-Agent for marketplace fetches. Some marketplaces reject
/// non-browser clients outright, so this must look like a real browser.
const DEFAULT_SCRAPER_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    MissingEnvVar(String),
    #[error("environment variable {var} has an invalid value: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the
/// process, without touching `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// The parsing and validation logic is decoupled from the actual environment
/// so tests can drive it with a plain `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default =
        |var: &str, default: &str| -> String { lookup(var).unwrap_or_else(|_| default.to_string()) };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("DEALGRID_ENV", "development"));

    let cron_secret = lookup("DEALGRID_CRON_SECRET")
        .ok()
        .filter(|s| !s.trim().is_empty());
    if cron_secret.is_none() && env != Environment::Development {
        return Err(ConfigError::MissingEnvVar(
            "DEALGRID_CRON_SECRET".to_string(),
        ));
    }

    let bind_addr = parse_addr("DEALGRID_BIND_ADDR", "0.0.0.0:8088")?;
    let log_level = or_default("DEALGRID_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("DEALGRID_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("DEALGRID_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("DEALGRID_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let scraper_request_timeout_secs = parse_u64("DEALGRID_SCRAPER_TIMEOUT_SECS", "30")?;
    let scraper_user_agent = or_default("DEALGRID_SCRAPER_USER_AGENT", DEFAULT_SCRAPER_USER_AGENT);
    let scraper_max_retries = parse_u32("DEALGRID_SCRAPER_MAX_RETRIES", "2")?;
    let scraper_retry_backoff_base_secs = parse_u64("DEALGRID_SCRAPER_BACKOFF_BASE_SECS", "1")?;
    let scraper_max_concurrent_sources = parse_usize("DEALGRID_SCRAPER_MAX_CONCURRENT", "4")?;

    let appsumo_partner_id = lookup("DEALGRID_APPSUMO_PARTNER_ID")
        .ok()
        .filter(|s| !s.trim().is_empty());
    let scrape_cron = lookup("DEALGRID_SCRAPE_CRON")
        .ok()
        .filter(|s| !s.trim().is_empty());
    let expire_cron = lookup("DEALGRID_EXPIRE_CRON")
        .ok()
        .filter(|s| !s.trim().is_empty());

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        cron_secret,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        scraper_request_timeout_secs,
        scraper_user_agent,
        scraper_max_retries,
        scraper_retry_backoff_base_secs,
        scraper_max_concurrent_sources,
        appsumo_partner_id,
        scrape_cron,
        expire_cron,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
