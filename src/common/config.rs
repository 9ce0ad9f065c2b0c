// src/common/config.rs
//! Process configuration read from the environment (after `.env` is loaded)

use anyhow::{bail, Context};
use std::env;

const DEFAULT_DB_NAME: &str = "foodshare";
const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone)]
pub struct Config {
    pub mongo_uri: String,
    pub db_name: String,
    /// Base64-encoded identity provider service account JSON
    pub service_key: Option<String>,
    /// Overrides where the identity provider's signing keys are fetched from
    pub jwks_url: Option<String>,
    pub port: u16,
    /// `None` allows any origin
    pub cors_origins: Option<Vec<String>>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup so tests don't touch the process env
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mongo_uri = match non_empty("MONGO_URI") {
            Some(uri) => uri,
            None => bail!("MONGO_URI must be set"),
        };

        let db_name = non_empty("DB_NAME").unwrap_or_else(|| DEFAULT_DB_NAME.to_string());

        let port = match non_empty("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("PORT is not a valid port number: {}", raw))?,
            None => DEFAULT_PORT,
        };

        let cors_origins = non_empty("CORS_ORIGINS").map(|raw| {
            raw.split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect::<Vec<_>>()
        });

        Ok(Self {
            mongo_uri,
            db_name,
            service_key: non_empty("FB_SERVICE_KEY"),
            jwks_url: non_empty("FIREBASE_JWKS_URL"),
            port,
            cors_origins,
        })
    }
}
