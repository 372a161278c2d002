use std::env;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_STREAM_URL: &str = "http://localhost:3001";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be a port number, got {value:?}")]
    Port { key: &'static str, value: String },

    #[error("{key} must be true or false, got {value:?}")]
    Flag { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub stream_url: String,
    pub close_when_idle: bool,
    pub enforce_order: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            stream_url: DEFAULT_STREAM_URL.to_string(),
            close_when_idle: false,
            enforce_order: true,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::Port { key: "PORT", value })?,
            None => defaults.port,
        };

        let stream_url = lookup("EVENT_STREAM_URL")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or(defaults.stream_url);

        Ok(Self {
            port,
            stream_url,
            close_when_idle: flag(&lookup, "STREAM_CLOSE_WHEN_IDLE", defaults.close_when_idle)?,
            enforce_order: flag(&lookup, "STREAM_ENFORCE_ORDER", defaults.enforce_order)?,
        })
    }
}

fn flag<F>(lookup: &F, key: &'static str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup(key) else {
        return Ok(default);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Flag { key, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_point_at_local_stream() {
        let config = load(&[]).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.stream_url, "http://localhost:3001");
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn reads_overrides() {
        let config = load(&[
            ("PORT", "9000"),
            ("EVENT_STREAM_URL", "http://counter.local:3001"),
            ("STREAM_CLOSE_WHEN_IDLE", "yes"),
            ("STREAM_ENFORCE_ORDER", "false"),
        ])
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.stream_url, "http://counter.local:3001");
        assert!(config.close_when_idle);
        assert!(!config.enforce_order);
    }

    #[test]
    fn rejects_bad_values() {
        assert_eq!(
            load(&[("PORT", "eighty")]),
            Err(ConfigError::Port {
                key: "PORT",
                value: "eighty".into()
            })
        );
        assert!(matches!(
            load(&[("STREAM_ENFORCE_ORDER", "maybe")]),
            Err(ConfigError::Flag { .. })
        ));
    }
}
