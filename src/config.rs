use std::{fmt::Display, str::FromStr};

use anyhow::Context;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    pub public_url: String,
    pub database_url: String,
    pub database_max_connections: u32,
    pub client_secret_path: String,
    pub admin_emails: Vec<String>,
    pub session_inactivity: time::Duration,
}

impl Config {
    /// Reads the process environment, after loading `.env` if there is one.
    pub fn load() -> anyhow::Result<Self> {
        if let Err(err) = dotenv::dotenv() {
            info!("no .env loaded: {err}");
        }

        Ok(Self {
            bind_address: try_load("BIND_ADDRESS", "0.0.0.0:8080")?,
            public_url: try_load::<String>("PUBLIC_URL", "http://localhost:8080")?
                .trim_end_matches('/')
                .to_owned(),
            database_url: try_load("DATABASE_URL", "sqlite://socialid.db?mode=rwc")?,
            database_max_connections: try_load("DATABASE_MAX_CONNECTIONS", "16")?,
            client_secret_path: try_load("CLIENT_SECRET_PATH", "client_secret.json")?,
            admin_emails: parse_emails(&dotenv::var("ADMIN_EMAILS").unwrap_or_default()),
            session_inactivity: time::Duration::minutes(try_load("SESSION_INACTIVITY_MINUTES", "60")?),
        })
    }

    pub fn is_admin(&self, email: &str) -> bool {
        let email = email.trim().to_lowercase();
        self.admin_emails.iter().any(|admin| *admin == email)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_owned(),
            public_url: "http://localhost:8080".to_owned(),
            database_url: "sqlite::memory:".to_owned(),
            database_max_connections: 1,
            client_secret_path: "client_secret.json".to_owned(),
            admin_emails: Vec::new(),
            session_inactivity: time::Duration::minutes(60),
        }
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> anyhow::Result<T>
where
    T::Err: Display,
{
    let raw = dotenv::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_owned()
    });

    raw.parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
            anyhow::anyhow!("{e}")
        })
        .with_context(|| format!("environment variable {key}"))
}

pub fn parse_emails(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|email| email.trim().to_lowercase())
        .filter(|email| !email.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_emails_are_case_insensitive() {
        let config = Config {
            admin_emails: parse_emails(" Root@Example.com, ,ops@example.com"),
            ..Config::default()
        };

        assert_eq!(config.admin_emails, ["root@example.com", "ops@example.com"]);
        assert!(config.is_admin("ROOT@example.com"));
        assert!(!config.is_admin("someone@example.com"));
    }

    #[test]
    fn empty_allowlist_admits_nobody() {
        assert!(!Config::default().is_admin(""));
    }
}
