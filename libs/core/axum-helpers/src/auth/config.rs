//! JWT signing configuration.

use core_config::{ConfigError, FromEnv, env_required};

/// Minimum accepted length of the HMAC signing secret.
pub const MIN_SECRET_LEN: usize = 32;

/// HMAC signing secret for issued and verified tokens, from `JWT_SECRET`.
#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: String,
}

impl JwtConfig {
    /// Builds a config from a literal secret.
    ///
    /// # Panics
    /// Panics if the secret is shorter than [`MIN_SECRET_LEN`]. Use
    /// [`JwtConfig::try_new`] for untrusted input.
    pub fn new(secret: impl Into<String>) -> Self {
        match Self::try_new(secret) {
            Ok(config) => config,
            Err(e) => panic!("{}", e),
        }
    }

    pub fn try_new(secret: impl Into<String>) -> Result<Self, ConfigError> {
        let secret = secret.into();
        let len = secret.chars().count();

        if len < MIN_SECRET_LEN {
            return Err(ConfigError::ParseError {
                key: "JWT_SECRET".to_string(),
                details: format!(
                    "secret must be at least {} characters, got {}",
                    MIN_SECRET_LEN, len
                ),
            });
        }

        Ok(Self { secret })
    }
}

impl FromEnv for JwtConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Self::try_new(env_required("JWT_SECRET")?)
    }
}
