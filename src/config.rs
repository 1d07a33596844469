use std::{env, str::FromStr, time::Duration};

use crate::errors::AppError;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://sylva_enquiries.db";
pub const DEFAULT_OWNER_PASSWORD: &str = "sylva123";

/// Process-wide settings, read once at start-up.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub connect_timeout: Duration,
    pub host: String,
    pub port: u16,
    pub session_key: Option<String>,
    pub cookie_secure: bool,
    pub owner_default_password: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_owned(),
            connect_timeout: Duration::from_secs(5),
            host: "0.0.0.0".to_owned(),
            port: 8080,
            session_key: None,
            cookie_secure: true,
            owner_default_password: DEFAULT_OWNER_PASSWORD.to_owned(),
        }
    }
}

impl Config {
    /// Reads `.env` (if present) and then the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup, falling back to defaults
    /// for absent keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let timeout_secs: u64 = parse_or(&lookup, "DB_CONNECT_TIMEOUT_SECS", 5)?;

        Ok(Config {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            connect_timeout: Duration::from_secs(timeout_secs),
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_or(&lookup, "PORT", defaults.port)?,
            session_key: lookup("SESSION_KEY").filter(|k| !k.is_empty()),
            cookie_secure: parse_or(&lookup, "COOKIE_SECURE", defaults.cookie_secure)?,
            owner_default_password: lookup("OWNER_DEFAULT_PASSWORD")
                .filter(|p| !p.is_empty())
                .unwrap_or(defaults.owner_default_password),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("{key}={raw:?}: {e}"))),
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
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let cfg = Config::from_lookup(|_| None).unwrap();
        assert_eq!(cfg.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.owner_default_password, "sylva123");
        assert!(cfg.session_key.is_none());
        assert!(cfg.cookie_secure);
    }

    #[test]
    fn environment_overrides_defaults() {
        let cfg = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite://other.db"),
            ("PORT", "9000"),
            ("DB_CONNECT_TIMEOUT_SECS", "12"),
            ("COOKIE_SECURE", "false"),
        ]))
        .unwrap();
        assert_eq!(cfg.database_url, "sqlite://other.db");
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.connect_timeout, Duration::from_secs(12));
        assert!(!cfg.cookie_secure);
    }

    #[test]
    fn malformed_port_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, AppError::Config(msg) if msg.starts_with("PORT=")));
    }
}
