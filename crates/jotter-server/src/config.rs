use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};

/// Ten years.
const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365 * 10;

/// Secrets that ship in docs and sample `.env` files and must never be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
];

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup, so parsing is testable without touching
    /// the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JOTTER_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("JOTTER_JWT_SECRET is unset or still a placeholder; set it in your environment or .env file");
        }

        let port: u16 = match lookup("JOTTER_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("JOTTER_PORT is not a valid port: {raw}"))?,
            None => 3000,
        };

        let token_ttl_hours: i64 = match lookup("JOTTER_TOKEN_TTL_HOURS") {
            Some(raw) => raw
                .parse::<i64>()
                .with_context(|| format!("JOTTER_TOKEN_TTL_HOURS is not a number: {raw}"))?,
            None => 24 * 30,
        };
        if !(1..=MAX_TOKEN_TTL_HOURS).contains(&token_ttl_hours) {
            bail!("JOTTER_TOKEN_TTL_HOURS must be between 1 and {MAX_TOKEN_TTL_HOURS}");
        }

        Ok(Self {
            host: lookup("JOTTER_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            db_path: lookup("JOTTER_DB_PATH")
                .unwrap_or_else(|| "jotter.db".into())
                .into(),
            jwt_secret,
            token_ttl_hours,
        })
    }

    pub fn addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse::<SocketAddr>()
            .with_context(|| format!("invalid bind address {}:{}", self.host, self.port))
    }
}
