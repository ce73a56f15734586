use std::env;

use anyhow::{Context, Result};

const DEFAULT_DATABASE_URL: &str = "sqlite:glossary.db";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Process configuration, read from the environment (and `.env` via dotenvy).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub max_connections: u32,
    pub seed_on_start: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            port: DEFAULT_PORT,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            seed_on_start: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let database_url = lookup("DATABASE_URL")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.database_url);

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("PORT must be a port number, got {raw:?}"))?,
            None => defaults.port,
        };

        let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .with_context(|| {
                    format!("DATABASE_MAX_CONNECTIONS must be a positive integer, got {raw:?}")
                })?,
            None => defaults.max_connections,
        };

        let seed_on_start = lookup("SEED_ON_START")
            .map(|v| parse_flag(&v))
            .unwrap_or(defaults.seed_on_start);

        Ok(Self {
            database_url,
            port,
            max_connections,
            seed_on_start,
        })
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn falls_back_to_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).expect("config");
        assert_eq!(config.database_url, "sqlite:glossary.db");
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_connections, 5);
        assert!(!config.seed_on_start);
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite:/tmp/terms.db"),
            ("PORT", "3000"),
            ("DATABASE_MAX_CONNECTIONS", "2"),
            ("SEED_ON_START", "Yes"),
        ]))
        .expect("config");
        assert_eq!(config.database_url, "sqlite:/tmp/terms.db");
        assert_eq!(config.port, 3000);
        assert_eq!(config.max_connections, 2);
        assert!(config.seed_on_start);
    }

    #[test]
    fn rejects_bad_port() {
        assert!(Config::from_lookup(lookup_from(&[("PORT", "http")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("DATABASE_MAX_CONNECTIONS", "0")])).is_err());
    }
}
