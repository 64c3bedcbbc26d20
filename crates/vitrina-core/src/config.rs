use std::path::PathBuf;

use crate::app_config::AppConfig;
use crate::ConfigError;

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
/// The parsing/validation logic is decoupled from the actual environment so
/// it can be tested with a pure `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default =
        |var: &str, default: &str| -> String { lookup(var).unwrap_or_else(|_| default.to_string()) };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
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

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_bool = |var: &str, default: bool| -> Result<bool, ConfigError> {
        match lookup(var) {
            Err(_) => Ok(default),
            Ok(raw) => match raw.to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(true),
                "0" | "false" | "no" | "off" => Ok(false),
                other => Err(ConfigError::InvalidEnvVar {
                    var: var.to_string(),
                    reason: format!("expected a boolean, got '{other}'"),
                }),
            },
        }
    };

    let database_url = require("DATABASE_URL")?;
    let brands_path = PathBuf::from(or_default("VITRINA_BRANDS_PATH", "./config/brands.yaml"));
    let log_level = or_default("VITRINA_LOG_LEVEL", "info");
    let user_agent = or_default("VITRINA_USER_AGENT", "vitrina/0.1 (showcase-monitor)");

    let nav_timeout_secs = parse_u64("VITRINA_NAV_TIMEOUT_SECS", "60")?;
    let redirect_timeout_secs = parse_u64("VITRINA_REDIRECT_TIMEOUT_SECS", "15")?;
    let max_concurrent_showcases = parse_usize("VITRINA_MAX_CONCURRENT_SHOWCASES", "1")?;
    let max_run_attempts = parse_u32("VITRINA_MAX_RUN_ATTEMPTS", "2")?;
    let second_stage_enabled = parse_bool("VITRINA_SECOND_STAGE", false)?;
    let screenshot_dir = PathBuf::from(or_default("VITRINA_SCREENSHOT_DIR", "./screenshots"));

    let telegram_bot_token = lookup("TELEGRAM_BOT_TOKEN").ok().filter(|t| !t.is_empty());
    let telegram_chat_id = lookup("TELEGRAM_CHAT_ID").ok().filter(|t| !t.is_empty());

    Ok(AppConfig {
        database_url,
        brands_path,
        log_level,
        user_agent,
        nav_timeout_secs,
        redirect_timeout_secs,
        max_concurrent_showcases,
        max_run_attempts,
        second_stage_enabled,
        screenshot_dir,
        telegram_bot_token,
        telegram_chat_id,
    })
}
