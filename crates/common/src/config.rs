//! Configuration management following 12-factor app principles
//!
//! All configuration is loaded from environment variables to ensure
//! clean separation between code and config.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;

/// Hour of day (business time) a date-only booking is scheduled at.
pub const DEFAULT_BOOKING_HOUR: u32 = 12;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Database connection URL (PostgreSQL)
    pub database_url: String,

    /// LLM provider configuration
    pub llm_provider: String,
    pub anthropic_api_key: String,
    pub llm_model: String,
    pub llm_max_tokens: u32,
    pub llm_temperature: f32,
    pub llm_timeout_secs: u64,

    /// WhatsApp gateway configuration
    pub gateway_provider: String,
    pub gateway_base_url: String,
    pub gateway_api_key: String,
    pub gateway_session: String,
    pub gateway_timeout_secs: u64,

    /// Dialogue configuration
    pub history_limit: usize,
    pub fallback_reply: String,

    /// Fixed business timezone, hours east of UTC. Date-only booking
    /// requests are interpreted in this offset.
    pub business_utc_offset_hours: i32,

    /// Runtime configuration
    pub rust_log: String,
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        let config = Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL is required"))?,

            llm_provider: env::var("LLM_PROVIDER").unwrap_or_else(|_| "anthropic".to_string()),
            anthropic_api_key: env::var("ANTHROPIC_API_KEY")
                .map_err(|_| anyhow::anyhow!("ANTHROPIC_API_KEY is required"))?,
            llm_model: env::var("LLM_MODEL")
                .unwrap_or_else(|_| "claude-sonnet-4-5-20250929".to_string()),
            llm_max_tokens: env::var("LLM_MAX_TOKENS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1024),
            llm_temperature: env::var("LLM_TEMPERATURE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.7),
            llm_timeout_secs: env::var("LLM_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),

            gateway_provider: env::var("GATEWAY_PROVIDER").unwrap_or_else(|_| "waha".to_string()),
            gateway_base_url: env::var("GATEWAY_BASE_URL")
                .map_err(|_| anyhow::anyhow!("GATEWAY_BASE_URL is required"))?,
            gateway_api_key: env::var("GATEWAY_API_KEY").unwrap_or_default(),
            gateway_session: env::var("GATEWAY_SESSION").unwrap_or_else(|_| "default".to_string()),
            gateway_timeout_secs: env::var("GATEWAY_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(15),

            history_limit: env::var("HISTORY_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            fallback_reply: env::var("FALLBACK_REPLY").unwrap_or_else(|_| {
                "Lo siento, tuve un problema técnico. ¿Podrías repetir tu mensaje?".to_string()
            }),

            business_utc_offset_hours: env::var("BUSINESS_UTC_OFFSET_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(-6),

            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "retiro=debug".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
        };

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[ignore] // Requires .env file with all config vars - run locally only
    fn test_config_from_env_loads_successfully() {
        let result = Config::from_env();
        assert!(
            result.is_ok(),
            "Config should load successfully in development environment: {}",
            result
                .err()
                .map_or("Unknown error".to_string(), |e| e.to_string())
        );

        let config = result.unwrap();
        assert!(
            !config.database_url.is_empty(),
            "DATABASE_URL should be populated"
        );
        assert!(
            !config.gateway_base_url.is_empty(),
            "GATEWAY_BASE_URL should be populated"
        );
        assert!(config.port > 0, "PORT should be a valid port number");
    }
}
