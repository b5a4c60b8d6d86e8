use std::env;
use tracing::{debug, error, info, warn};

use crate::config::ConfigError;

/// JWT configuration structure
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for signing session tokens
    pub jwt_secret: String,
    /// Session token lifetime in hours
    pub token_expiration_hours: i64,
}

impl JwtConfig {
    /// Load JWT configuration from environment variables
    ///
    /// Expected environment variables:
    /// - JWT_SECRET: secret key for signing tokens (required, >= 32 chars)
    /// - JWT_EXPIRES_IN_HOURS: session token lifetime in hours (defaults to 24)
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading JWT configuration from environment variables");

        let jwt_secret = env::var("JWT_SECRET").map_err(|_| {
            error!("JWT_SECRET environment variable not found");
            ConfigError::EnvVarNotFound("JWT_SECRET".to_string())
        })?;

        if jwt_secret.len() < 32 {
            error!("JWT_SECRET is too short (minimum 32 characters required)");
            return Err(ConfigError::InvalidValue(
                "JWT_SECRET must be at least 32 characters long".to_string(),
            ));
        }
        debug!("JWT secret loaded (length: {} chars)", jwt_secret.len());

        let token_expiration_hours = env::var("JWT_EXPIRES_IN_HOURS")
            .unwrap_or_else(|_| {
                warn!("JWT_EXPIRES_IN_HOURS not set, using default: 24 hours");
                "24".to_string()
            })
            .parse::<i64>()
            .map_err(|e| {
                error!("Invalid JWT_EXPIRES_IN_HOURS value: {}", e);
                ConfigError::InvalidValue(format!("JWT_EXPIRES_IN_HOURS: {}", e))
            })?;
        debug!("JWT token expiration: {} hours", token_expiration_hours);

        let config = JwtConfig {
            jwt_secret,
            token_expiration_hours,
        };
        config.validate()?;

        info!("JWT configuration loaded successfully");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.len() < 32 {
            return Err(ConfigError::ValidationError(
                "JWT secret must be at least 32 characters long".to_string(),
            ));
        }
        if self.token_expiration_hours <= 0 {
            return Err(ConfigError::ValidationError(
                "Token expiration must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Default values are only meant for tests
impl Default for JwtConfig {
    fn default() -> Self {
        JwtConfig {
            jwt_secret: "test_secret_key_for_jwt_testing_should_be_long_enough".to_string(),
            token_expiration_hours: 24,
        }
    }
}
