//! Runtime configuration from environment variables (a `.env` file is
//! loaded by the binaries before this is read).

use crate::error::{CompatError, Result};
use std::time::Duration;

pub const ENV_BIND: &str = "KIT_COMPAT_BIND";
pub const ENV_GEOMETRY_URL: &str = "KIT_COMPAT_GEOMETRY_URL";
pub const ENV_ENABLE_GEOMETRY: &str = "KIT_COMPAT_ENABLE_GEOMETRY";
pub const ENV_GEOMETRY_TIMEOUT: &str = "KIT_COMPAT_GEOMETRY_TIMEOUT_SECS";
pub const ENV_LOG_LEVEL: &str = "KIT_COMPAT_LOG_LEVEL";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub bind_addr: String,
    pub geometry_url: Option<String>,
    pub enable_geometry: bool,
    pub geometry_timeout: Duration,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:5000".to_string(),
            geometry_url: None,
            enable_geometry: true,
            geometry_timeout: Duration::from_secs(5),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(bind) = get(ENV_BIND) {
            config.bind_addr = bind;
        }
        config.geometry_url = get(ENV_GEOMETRY_URL);
        if let Some(flag) = get(ENV_ENABLE_GEOMETRY) {
            config.enable_geometry = parse_bool(ENV_ENABLE_GEOMETRY, &flag)?;
        }
        if let Some(secs) = get(ENV_GEOMETRY_TIMEOUT) {
            let secs: u64 = secs.parse().map_err(|_| {
                CompatError::Config(format!(
                    "{} must be a whole number of seconds, got '{}'",
                    ENV_GEOMETRY_TIMEOUT, secs
                ))
            })?;
            config.geometry_timeout = Duration::from_secs(secs);
        }
        if let Some(level) = get(ENV_LOG_LEVEL) {
            config.log_level = level;
        }

        Ok(config)
    }

    /// Geometry endpoint to query, if fetching is switched on.
    pub fn geometry_endpoint(&self) -> Option<&str> {
        if self.enable_geometry {
            self.geometry_url.as_deref()
        } else {
            None
        }
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(CompatError::Config(format!("{} must be a boolean, got '{}'", key, other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.geometry_endpoint(), None);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            (ENV_BIND, "127.0.0.1:8080"),
            (ENV_GEOMETRY_URL, "http://geo.local/api/compat"),
            (ENV_GEOMETRY_TIMEOUT, "2"),
            (ENV_LOG_LEVEL, "debug"),
        ])
        .unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.geometry_endpoint(), Some("http://geo.local/api/compat"));
        assert_eq!(config.geometry_timeout, Duration::from_secs(2));
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_geometry_switch() {
        let config = config_from(&[
            (ENV_GEOMETRY_URL, "http://geo.local"),
            (ENV_ENABLE_GEOMETRY, "False"),
        ])
        .unwrap();
        assert_eq!(config.geometry_endpoint(), None);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            config_from(&[(ENV_GEOMETRY_TIMEOUT, "soon")]),
            Err(CompatError::Config(_))
        ));
        assert!(matches!(
            config_from(&[(ENV_ENABLE_GEOMETRY, "maybe")]),
            Err(CompatError::Config(_))
        ));
    }

    #[test]
    fn test_blank_is_unset() {
        let config = config_from(&[(ENV_GEOMETRY_URL, "  ")]).unwrap();
        assert!(config.geometry_url.is_none());
    }
}
