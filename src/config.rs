use thiserror::Error;

use crate::constants::*;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("SESSION_SECRET must be set")]
    MissingSessionSecret,
    #[error("SESSION_SECRET must be at least {0} bytes long")]
    ShortSessionSecret(usize),
    #[error("PORT must be a valid port number, got '{0}'")]
    InvalidPort(String),
}

/// Runtime settings read from the environment
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub data_path: String,
    pub session_secret: String,
    pub production: bool,
    pub frontend_origin: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup; `from_env` uses the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let raw_port = lookup("PORT").unwrap_or_else(|| DEFAULT_PORT.to_string());
        let port = raw_port
            .trim()
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort(raw_port.clone()))?;
        let data_path = lookup("DATA_PATH").unwrap_or_else(|| DEFAULT_DATA_PATH.to_string());

        let session_secret = lookup("SESSION_SECRET").ok_or(ConfigError::MissingSessionSecret)?;
        if session_secret.len() < MIN_SESSION_SECRET_LENGTH {
            return Err(ConfigError::ShortSessionSecret(MIN_SESSION_SECRET_LENGTH));
        }

        let production = lookup("PRODUCTION")
            .map(|val| val.to_lowercase() == "true")
            .unwrap_or(false);
        let frontend_origin =
            lookup("FRONTEND_ORIGIN").unwrap_or_else(|| DEFAULT_FRONTEND_ORIGIN.to_string());

        Ok(Self {
            host,
            port,
            data_path,
            session_secret,
            production,
            frontend_origin,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let secret = "s".repeat(MIN_SESSION_SECRET_LENGTH);
        let config = Config::from_lookup(lookup_from(&[("SESSION_SECRET", secret.as_str())])).unwrap();
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
        assert_eq!(config.data_path, DEFAULT_DATA_PATH);
        assert!(!config.production);
    }

    #[test]
    fn secret_is_required_and_long() {
        assert!(matches!(
            Config::from_lookup(lookup_from(&[])),
            Err(ConfigError::MissingSessionSecret)
        ));
        assert!(matches!(
            Config::from_lookup(lookup_from(&[("SESSION_SECRET", "short")])),
            Err(ConfigError::ShortSessionSecret(_))
        ));
    }

    #[test]
    fn bad_port_is_rejected() {
        let secret = "s".repeat(MIN_SESSION_SECRET_LENGTH);
        assert!(matches!(
            Config::from_lookup(lookup_from(&[("SESSION_SECRET", secret.as_str()), ("PORT", "http")])),
            Err(ConfigError::InvalidPort(_))
        ));
    }
}
