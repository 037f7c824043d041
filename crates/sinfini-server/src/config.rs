use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD as B64;
use rand::RngCore;
use tracing::warn;

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "jwt-secret-key-change-in-production",
    "your-secret-key-change-in-production",
];

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub db_path: PathBuf,
    pub upload_dir: PathBuf,
    pub jwt_secret: String,
    /// Empty means any origin is allowed.
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let host = get("SINFINI_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = get("SINFINI_PORT")
            .unwrap_or_else(|| "5000".into())
            .parse()
            .context("SINFINI_PORT must be a port number")?;
        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", host, port))?;

        let db_path = get("SINFINI_DB_PATH")
            .unwrap_or_else(|| "data/sinfini.db".into())
            .into();
        let upload_dir = get("SINFINI_UPLOAD_DIR")
            .unwrap_or_else(|| "data/uploads".into())
            .into();

        let jwt_secret = match get("SINFINI_JWT_SECRET") {
            Some(secret) if !secret.is_empty() && !PLACEHOLDER_SECRETS.contains(&secret.as_str()) => {
                secret
            }
            _ => {
                warn!("SINFINI_JWT_SECRET is unset or a placeholder; using an ephemeral secret");
                warn!("Admin tokens will not survive a restart");
                ephemeral_secret()
            }
        };

        let cors_origins = get("SINFINI_CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            addr,
            db_path,
            upload_dir,
            jwt_secret,
            cors_origins,
        })
    }
}

fn ephemeral_secret() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    B64.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.addr.port(), 5000);
        assert_eq!(cfg.db_path, PathBuf::from("data/sinfini.db"));
        assert_eq!(cfg.upload_dir, PathBuf::from("data/uploads"));
        assert!(cfg.cors_origins.is_empty());
        assert!(cfg.jwt_secret.len() >= 40);
    }

    #[test]
    fn placeholder_secret_is_replaced() {
        let cfg = config(&[("SINFINI_JWT_SECRET", "jwt-secret-key-change-in-production")]).unwrap();
        assert_ne!(cfg.jwt_secret, "jwt-secret-key-change-in-production");

        let cfg = config(&[("SINFINI_JWT_SECRET", "s3cr3t-from-env")]).unwrap();
        assert_eq!(cfg.jwt_secret, "s3cr3t-from-env");
    }

    #[test]
    fn parses_overrides() {
        let cfg = config(&[
            ("SINFINI_HOST", "127.0.0.1"),
            ("SINFINI_PORT", "8080"),
            ("SINFINI_CORS_ORIGINS", "https://a.example, https://b.example,"),
        ])
        .unwrap();
        assert_eq!(cfg.addr.to_string(), "127.0.0.1:8080");
        assert_eq!(cfg.cors_origins, vec!["https://a.example", "https://b.example"]);
    }

    #[test]
    fn rejects_bad_port() {
        assert!(config(&[("SINFINI_PORT", "http")]).is_err());
    }
}
