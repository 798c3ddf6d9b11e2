use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::short_code;
use crate::storage::records;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub api_server: ServerConfig,
    pub api: ApiConfig,
    pub short_code: ShortCodeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: DatabaseBackend,
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    Sqlite,
    Postgres,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Path the resource routes are mounted under. Empty means root.
    pub prefix: String,
    /// Allowed CORS origins. Empty allows any origin.
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortCodeConfig {
    pub length: usize,
    pub max_attempts: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            prefix: "/api".to_string(),
            cors_allowed_origins: Vec::new(),
        }
    }
}

impl Default for ShortCodeConfig {
    fn default() -> Self {
        Self {
            length: short_code::DEFAULT_LENGTH,
            max_attempts: records::DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let backend = match var("DATABASE_BACKEND", "sqlite").to_lowercase().as_str() {
            "postgres" | "postgresql" => DatabaseBackend::Postgres,
            "sqlite" => DatabaseBackend::Sqlite,
            other => {
                tracing::warn!(
                    "Unknown DATABASE_BACKEND '{other}', falling back to 'sqlite'. Supported values: sqlite, postgres"
                );
                DatabaseBackend::Sqlite
            }
        };

        let database_url = var("DATABASE_URL", "sqlite://./brevity.db?mode=rwc");
        let max_connections = var("DATABASE_MAX_CONNECTIONS", "10")
            .parse::<u32>()
            .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?;
        if max_connections == 0 {
            anyhow::bail!("DATABASE_MAX_CONNECTIONS must be at least 1");
        }

        let api_host = var("API_HOST", "127.0.0.1");
        let api_port = var("API_PORT", "5000")
            .parse::<u16>()
            .context("API_PORT must be a valid port number")?;

        let prefix = normalize_prefix(&var("API_PREFIX", "/api"));

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .map(|origins| {
                origins
                    .split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let length = var("SHORT_CODE_LENGTH", &short_code::DEFAULT_LENGTH.to_string())
            .parse::<usize>()
            .context("SHORT_CODE_LENGTH must be a positive integer")?;
        if length == 0 || length > short_code::MAX_LENGTH {
            anyhow::bail!(
                "SHORT_CODE_LENGTH must be between 1 and {}",
                short_code::MAX_LENGTH
            );
        }

        let max_attempts = var(
            "SHORT_CODE_MAX_ATTEMPTS",
            &records::DEFAULT_MAX_ATTEMPTS.to_string(),
        )
        .parse::<u32>()
        .context("SHORT_CODE_MAX_ATTEMPTS must be a positive integer")?;
        if max_attempts == 0 {
            anyhow::bail!("SHORT_CODE_MAX_ATTEMPTS must be at least 1");
        }

        Ok(Config {
            database: DatabaseConfig {
                backend,
                url: database_url,
                max_connections,
            },
            api_server: ServerConfig {
                host: api_host,
                port: api_port,
            },
            api: ApiConfig {
                prefix,
                cors_allowed_origins,
            },
            short_code: ShortCodeConfig {
                length,
                max_attempts,
            },
        })
    }
}

/// `"api/"` -> `"/api"`, `"/"` -> `""`
fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.database.backend, DatabaseBackend::Sqlite);
        assert_eq!(config.database.url, "sqlite://./brevity.db?mode=rwc");
        assert_eq!(config.api_server.port, 5000);
        assert_eq!(config.api.prefix, "/api");
        assert!(config.api.cors_allowed_origins.is_empty());
        assert_eq!(config.short_code.length, 6);
        assert_eq!(config.short_code.max_attempts, 10);
    }

    #[test]
    fn test_postgres_backend_and_origins() {
        let config = config_from(&[
            ("DATABASE_BACKEND", "PostgreSQL"),
            ("DATABASE_URL", "postgres://localhost/brevity"),
            ("CORS_ALLOWED_ORIGINS", "http://localhost:3000, https://app.example.com,"),
        ])
        .unwrap();

        assert_eq!(config.database.backend, DatabaseBackend::Postgres);
        assert_eq!(
            config.api.cors_allowed_origins,
            vec!["http://localhost:3000", "https://app.example.com"]
        );
    }

    #[test]
    fn test_prefix_normalization() {
        assert_eq!(normalize_prefix("/api"), "/api");
        assert_eq!(normalize_prefix("api/"), "/api");
        assert_eq!(normalize_prefix("/v1/links/"), "/v1/links");
        assert_eq!(normalize_prefix("/"), "");
        assert_eq!(normalize_prefix(""), "");
    }

    #[test]
    fn test_invalid_numbers_are_errors() {
        assert!(config_from(&[("API_PORT", "http")]).is_err());
        assert!(config_from(&[("SHORT_CODE_LENGTH", "0")]).is_err());
        assert!(config_from(&[("SHORT_CODE_LENGTH", "65")]).is_err());
        assert!(config_from(&[("SHORT_CODE_MAX_ATTEMPTS", "0")]).is_err());
        assert!(config_from(&[("DATABASE_MAX_CONNECTIONS", "-1")]).is_err());
        assert!(config_from(&[("DATABASE_MAX_CONNECTIONS", "0")]).is_err());
    }
}
