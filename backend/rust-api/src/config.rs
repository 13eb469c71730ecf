use serde::Deserialize;
use std::env;
use std::str::FromStr;

use crate::services::context_service::DEFAULT_CONTEXT_TTL_SECONDS;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8081";
pub const DEFAULT_RECORD_ANSWER_ATTEMPTS: usize = 5;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub bind_addr: String,
    pub context_cache_ttl_seconds: i64,
    /// JSON file of candidate questions for the in-memory store
    pub question_bank_path: Option<String>,
    pub record_answer_attempts: usize,
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            context_cache_ttl_seconds: DEFAULT_CONTEXT_TTL_SECONDS,
            question_bank_path: None,
            record_answer_attempts: DEFAULT_RECORD_ANSWER_ATTEMPTS,
            log_json: false,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        // Root .env first, then the local one
        let skip_root_env = env::var("SKIP_ROOT_ENV").is_ok();
        if skip_root_env {
            dotenvy::dotenv().ok();
        } else if dotenvy::from_path("../../.env").is_err() {
            dotenvy::dotenv().ok();
        }

        let app_env = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());

        // config/*.toml + APP__* overrides
        let settings = config::Config::builder()
            .add_source(config::File::with_name(&format!("config/{}", app_env)).required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        let defaults = Config::default();

        let bind_addr = settings
            .get_string("bind_addr")
            .or_else(|_| env::var("BIND_ADDR"))
            .unwrap_or(defaults.bind_addr);

        let context_cache_ttl_seconds = match settings.get_int("context_cache_ttl_seconds") {
            Ok(value) => value,
            Err(_) => env_or("CONTEXT_CACHE_TTL_SECONDS", defaults.context_cache_ttl_seconds)?,
        };
        if context_cache_ttl_seconds < 0 {
            return Err(config::ConfigError::Message(format!(
                "context_cache_ttl_seconds must not be negative, got {}",
                context_cache_ttl_seconds
            )));
        }

        let question_bank_path = settings
            .get_string("question_bank_path")
            .or_else(|_| env::var("QUESTION_BANK_PATH"))
            .ok()
            .filter(|path| !path.trim().is_empty());

        let record_answer_attempts = match settings.get_int("record_answer_attempts") {
            Ok(value) => usize::try_from(value).map_err(|_| {
                config::ConfigError::Message(format!(
                    "record_answer_attempts must not be negative, got {}",
                    value
                ))
            })?,
            Err(_) => env_or("RECORD_ANSWER_ATTEMPTS", defaults.record_answer_attempts)?,
        };

        let log_json = match settings.get_bool("log_json") {
            Ok(value) => value,
            Err(_) => env_or("LOG_JSON", defaults.log_json)?,
        };

        Ok(Config {
            bind_addr,
            context_cache_ttl_seconds,
            question_bank_path,
            record_answer_attempts,
            log_json,
        })
    }
}

/// Plain env fallback; unset means default, unparsable is an error
fn env_or<T: FromStr>(key: &str, default: T) -> Result<T, config::ConfigError> {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|_| {
            config::ConfigError::Message(format!("{} has an invalid value: {}", key, raw))
        }),
        Err(_) => Ok(default),
    }
}
