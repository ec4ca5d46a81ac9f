//! Server configuration loaded from environment variables.
//!
//! All settings have defaults so the server can start with zero
//! configuration next to a locally running client.

use std::net::SocketAddr;
use std::path::PathBuf;

use azdocs_shared::constants::{DEFAULT_CALLBACK_URL, MAX_UPLOAD_SIZE};
use azdocs_shared::types::AccessLevel;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address for the HTTP API.
    /// Env: `HTTP_ADDR`
    /// Default: `127.0.0.1:5000`
    pub http_addr: SocketAddr,

    /// Directory where uploaded PDFs are written.
    /// Env: `UPLOAD_STORAGE_PATH`
    /// Default: `./uploads`
    pub upload_storage_path: PathBuf,

    /// Maximum accepted upload size in bytes.
    /// Env: `MAX_UPLOAD_SIZE`
    /// Default: 50 MiB
    pub max_upload_size: usize,

    /// Secret the token signing key is derived from.
    /// Env: `TOKEN_SECRET`
    pub token_secret: String,

    /// Lifetime of minted tokens, in seconds.
    /// Env: `TOKEN_TTL_SECS`
    /// Default: one hour
    pub token_ttl_secs: i64,

    /// Where `/login` redirects to, with `?token=` appended.
    /// Env: `FRONTEND_CALLBACK_URL`
    pub frontend_callback_url: String,

    /// Public origin used to build `blobUrl`s. When unset the request's
    /// `Host` header is used.
    /// Env: `PUBLIC_URL`
    pub public_url: Option<String>,

    /// Identity issued by `/login`.
    /// Env: `DEV_USER_ID`, `DEV_USER_NAME`, `DEV_USER_EMAIL`
    pub dev_user_id: String,
    pub dev_user_name: String,
    pub dev_user_email: String,

    /// Highest access level the dev user may read.
    /// Env: `DEV_USER_CLEARANCE` (1-5)
    /// Default: 5 (Top Secret)
    pub dev_user_clearance: AccessLevel,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: ([127, 0, 0, 1], 5000).into(),
            upload_storage_path: PathBuf::from("./uploads"),
            max_upload_size: MAX_UPLOAD_SIZE,
            token_secret: "change-this-key-in-prod".to_string(),
            token_ttl_secs: 3600,
            frontend_callback_url: DEFAULT_CALLBACK_URL.to_string(),
            public_url: None,
            dev_user_id: "dev-user".to_string(),
            dev_user_name: "Dev User".to_string(),
            dev_user_email: "dev@example.com".to_string(),
            dev_user_clearance: AccessLevel::TOP_SECRET,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(addr) = lookup("HTTP_ADDR") {
            match addr.parse::<SocketAddr>() {
                Ok(parsed) => config.http_addr = parsed,
                Err(_) => tracing::warn!(value = %addr, "Invalid HTTP_ADDR, using default"),
            }
        }

        if let Some(path) = lookup("UPLOAD_STORAGE_PATH") {
            config.upload_storage_path = PathBuf::from(path);
        }

        if let Some(val) = lookup("MAX_UPLOAD_SIZE") {
            match val.parse::<usize>() {
                Ok(n) if n > 0 => config.max_upload_size = n,
                _ => tracing::warn!(value = %val, "Invalid MAX_UPLOAD_SIZE, using default"),
            }
        }

        if let Some(secret) = lookup("TOKEN_SECRET") {
            if secret.is_empty() {
                tracing::warn!("Empty TOKEN_SECRET, using the development default");
            } else {
                config.token_secret = secret;
            }
        }

        if let Some(val) = lookup("TOKEN_TTL_SECS") {
            match val.parse::<i64>() {
                Ok(n) if n > 0 => config.token_ttl_secs = n,
                _ => tracing::warn!(value = %val, "Invalid TOKEN_TTL_SECS, using default"),
            }
        }

        if let Some(url) = lookup("FRONTEND_CALLBACK_URL") {
            config.frontend_callback_url = url;
        }

        if let Some(url) = lookup("PUBLIC_URL") {
            if !url.is_empty() {
                config.public_url = Some(url.trim_end_matches('/').to_string());
            }
        }

        if let Some(id) = lookup("DEV_USER_ID") {
            config.dev_user_id = id;
        }
        if let Some(name) = lookup("DEV_USER_NAME") {
            config.dev_user_name = name;
        }
        if let Some(email) = lookup("DEV_USER_EMAIL") {
            config.dev_user_email = email;
        }
        if let Some(val) = lookup("DEV_USER_CLEARANCE") {
            match val.parse::<AccessLevel>() {
                Ok(level) => config.dev_user_clearance = level,
                Err(_) => tracing::warn!(value = %val, "Invalid DEV_USER_CLEARANCE, using default"),
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.http_addr, ([127, 0, 0, 1], 5000).into());
        assert_eq!(config.max_upload_size, MAX_UPLOAD_SIZE);
        assert!(config.public_url.is_none());
    }

    #[test]
    fn test_lookup_overrides() {
        let vars: HashMap<&str, &str> = [
            ("HTTP_ADDR", "0.0.0.0:8080"),
            ("MAX_UPLOAD_SIZE", "1024"),
            ("PUBLIC_URL", "https://docs.example.com/"),
            ("DEV_USER_NAME", "Ada"),
            ("DEV_USER_CLEARANCE", "2"),
        ]
        .into_iter()
        .collect();

        let config = ServerConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.http_addr, ([0, 0, 0, 0], 8080).into());
        assert_eq!(config.max_upload_size, 1024);
        assert_eq!(config.public_url.as_deref(), Some("https://docs.example.com"));
        assert_eq!(config.dev_user_name, "Ada");
        assert_eq!(config.dev_user_clearance, AccessLevel::INTERNAL);
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let config = ServerConfig::from_lookup(|k| match k {
            "HTTP_ADDR" => Some("not-an-addr".into()),
            "MAX_UPLOAD_SIZE" => Some("0".into()),
            "TOKEN_SECRET" => Some(String::new()),
            "DEV_USER_CLEARANCE" => Some("6".into()),
            _ => None,
        });
        let default = ServerConfig::default();
        assert_eq!(config.http_addr, default.http_addr);
        assert_eq!(config.max_upload_size, default.max_upload_size);
        assert_eq!(config.token_secret, default.token_secret);
        assert_eq!(config.dev_user_clearance, default.dev_user_clearance);
    }
}
