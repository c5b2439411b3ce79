//! Server configuration from environment variables.
//!
//! ```bash
//! # How a giver's "done" is handled: verified (default) or direct
//! DEEDS_COMPLETION_POLICY=verified
//!
//! # Let group owners approve/reject deeds too (default false)
//! DEEDS_OWNER_CAN_VERIFY=true
//!
//! # Comma-separated list of allowed browser origins
//! DEEDS_CORS_ORIGINS=http://localhost:5173,http://localhost:3000
//! ```

use std::env;

use axum::http::HeaderValue;
use deeds_engine::{CompletionPolicy, EngineConfig};
use thiserror::Error;

pub const DEFAULT_CORS_ORIGINS: &str = "http://localhost:5173,http://localhost:3000";

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub completion_policy: CompletionPolicy,
    pub owner_can_verify: bool,
    pub cors_origins: Vec<HeaderValue>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            completion_policy: CompletionPolicy::default(),
            owner_can_verify: false,
            cors_origins: DEFAULT_CORS_ORIGINS
                .split(',')
                .map(HeaderValue::from_static)
                .collect(),
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid DEEDS_COMPLETION_POLICY: {0}. Expected 'direct' or 'verified'")]
    InvalidCompletionPolicy(String),

    #[error("Invalid boolean for {var}: {value}")]
    InvalidBool { var: &'static str, value: String },

    #[error("Invalid CORS origin: {0}")]
    InvalidCorsOrigin(String),
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            var,
            value: value.to_string(),
        }),
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let completion_policy = match env::var("DEEDS_COMPLETION_POLICY") {
            Ok(v) => v
                .parse::<CompletionPolicy>()
                .map_err(|_| ConfigError::InvalidCompletionPolicy(v))?,
            Err(_) => CompletionPolicy::default(),
        };

        let owner_can_verify = match env::var("DEEDS_OWNER_CAN_VERIFY") {
            Ok(v) => parse_bool("DEEDS_OWNER_CAN_VERIFY", &v)?,
            Err(_) => false,
        };

        let origins =
            env::var("DEEDS_CORS_ORIGINS").unwrap_or_else(|_| DEFAULT_CORS_ORIGINS.to_string());
        let cors_origins = origins
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(|o| {
                HeaderValue::from_str(o).map_err(|_| ConfigError::InvalidCorsOrigin(o.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            completion_policy,
            owner_can_verify,
            cors_origins,
        })
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            completion_policy: self.completion_policy,
            owner_can_verify: self.owner_can_verify,
        }
    }
}
