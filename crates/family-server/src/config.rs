use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};

/// Runtime configuration, read from the environment (after `.env`).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub private_key_pem: String,
    pub public_key_pem: String,
    pub users_db: PathBuf,
    pub events_db: PathBuf,
    pub addr: SocketAddr,
    pub token_ttl_hours: i64,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |primary: &str, legacy: &str| {
            lookup(primary)
                .or_else(|| lookup(legacy))
                .filter(|v| !v.trim().is_empty())
        };

        let Some(private_key) = var("FAMILY_RSA_PRIVATE_KEY", "RSA_PRIVATE_KEY") else {
            bail!("FAMILY_RSA_PRIVATE_KEY is not set");
        };
        let Some(public_key) = var("FAMILY_RSA_PUBLIC_KEY", "RSA_PUBLIC_KEY") else {
            bail!("FAMILY_RSA_PUBLIC_KEY is not set");
        };

        let host = lookup("FAMILY_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = lookup("FAMILY_PORT")
            .unwrap_or_else(|| "3000".into())
            .parse()
            .context("FAMILY_PORT must be a port number")?;
        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", host, port))?;

        let token_ttl_hours: i64 = match lookup("FAMILY_TOKEN_TTL_HOURS") {
            Some(v) => v.parse().context("FAMILY_TOKEN_TTL_HOURS must be a whole number")?,
            None => 24,
        };
        if token_ttl_hours <= 0 {
            bail!("FAMILY_TOKEN_TTL_HOURS must be positive");
        }

        let (users_db, events_db) = store_paths(&lookup);

        Ok(Self {
            private_key_pem: unescape_pem(&private_key),
            public_key_pem: unescape_pem(&public_key),
            users_db,
            events_db,
            addr,
            token_ttl_hours,
        })
    }
}

/// Locations of the credential and event store files.
pub fn store_paths<F>(lookup: &F) -> (PathBuf, PathBuf)
where
    F: Fn(&str) -> Option<String>,
{
    let users = lookup("FAMILY_USERS_DB").unwrap_or_else(|| "data/users.db".into());
    let events = lookup("FAMILY_EVENTS_DB").unwrap_or_else(|| "data/events.db".into());
    (users.into(), events.into())
}

/// PEM values kept on one line in `.env` files carry literal `\n` escapes.
pub fn unescape_pem(value: &str) -> String {
    value.trim().trim_matches('"').replace("\\n", "\n")
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<ServerConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn escaped_newlines_are_restored() {
        let pem = unescape_pem("\"-----BEGIN KEY-----\\nabc\\n-----END KEY-----\\n\"");
        assert_eq!(pem, "-----BEGIN KEY-----\nabc\n-----END KEY-----\n");
    }

    #[test]
    fn defaults_apply_when_only_keys_are_set() {
        let cfg = config(&[
            ("FAMILY_RSA_PRIVATE_KEY", "priv"),
            ("FAMILY_RSA_PUBLIC_KEY", "pub"),
        ])
        .unwrap();

        assert_eq!(cfg.addr, "0.0.0.0:3000".parse().unwrap());
        assert_eq!(cfg.users_db, PathBuf::from("data/users.db"));
        assert_eq!(cfg.events_db, PathBuf::from("data/events.db"));
        assert_eq!(cfg.token_ttl_hours, 24);
    }

    #[test]
    fn legacy_key_names_are_accepted() {
        let cfg = config(&[("RSA_PRIVATE_KEY", "priv"), ("RSA_PUBLIC_KEY", "pub")]).unwrap();
        assert_eq!(cfg.private_key_pem, "priv");
        assert_eq!(cfg.public_key_pem, "pub");
    }

    #[test]
    fn missing_keys_or_bad_numbers_fail() {
        assert!(config(&[("FAMILY_RSA_PUBLIC_KEY", "pub")]).is_err());
        assert!(
            config(&[
                ("FAMILY_RSA_PRIVATE_KEY", "priv"),
                ("FAMILY_RSA_PUBLIC_KEY", "pub"),
                ("FAMILY_PORT", "http"),
            ])
            .is_err()
        );
        assert!(
            config(&[
                ("FAMILY_RSA_PRIVATE_KEY", "priv"),
                ("FAMILY_RSA_PUBLIC_KEY", "pub"),
                ("FAMILY_TOKEN_TTL_HOURS", "0"),
            ])
            .is_err()
        );
    }
}
