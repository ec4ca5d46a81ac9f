//! Client configuration.
//!
//! Resolution order: built-in defaults, then environment variables, then
//! command-line flags.

use std::path::PathBuf;

use azdocs_shared::constants::DEFAULT_API_URL;
use reqwest::Url;
use tracing::warn;

use crate::error::{ApiError, Result};

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend origin every API call is made against.
    /// Env: `AZDOCS_API_URL`
    /// Default: `http://localhost:5000`
    pub api_url: Url,

    /// Directory holding the session database.
    /// Env: `AZDOCS_DATA_DIR`
    /// Default: the platform data directory
    pub data_dir: Option<PathBuf>,
}

impl ClientConfig {
    /// Built-in defaults.
    pub fn defaults() -> Result<Self> {
        Ok(Self {
            api_url: parse_api_url(DEFAULT_API_URL)?,
            data_dir: None,
        })
    }

    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::defaults()?;

        if let Some(url) = lookup("AZDOCS_API_URL") {
            match parse_api_url(&url) {
                Ok(parsed) => config.api_url = parsed,
                Err(_) => warn!(value = %url, "Invalid AZDOCS_API_URL, using default"),
            }
        }

        if let Some(dir) = lookup("AZDOCS_DATA_DIR") {
            if dir.is_empty() {
                warn!("Empty AZDOCS_DATA_DIR, using the platform data directory");
            } else {
                config.data_dir = Some(PathBuf::from(dir));
            }
        }

        Ok(config)
    }

    /// Apply command-line overrides. An invalid URL given explicitly is an
    /// error rather than a silent fallback.
    pub fn with_overrides(
        mut self,
        api_url: Option<&str>,
        data_dir: Option<PathBuf>,
    ) -> Result<Self> {
        if let Some(url) = api_url {
            self.api_url = parse_api_url(url)?;
        }
        if let Some(dir) = data_dir {
            self.data_dir = Some(dir);
        }
        Ok(self)
    }
}

/// Parse a backend origin. Only `http` and `https` are accepted.
pub fn parse_api_url(input: &str) -> Result<Url> {
    let url = Url::parse(input.trim())
        .map_err(|e| ApiError::InvalidUrl(format!("{input}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ApiError::InvalidUrl(format!(
            "{input}: unsupported scheme '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::defaults().unwrap();
        assert_eq!(config.api_url.as_str(), "http://localhost:5000/");
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn test_env_then_flags() {
        let vars: HashMap<&str, &str> = [
            ("AZDOCS_API_URL", "https://docs.example.com"),
            ("AZDOCS_DATA_DIR", "/tmp/azdocs"),
        ]
        .into_iter()
        .collect();

        let config = ClientConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.api_url.host_str(), Some("docs.example.com"));
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/azdocs")));

        let config = config
            .with_overrides(Some("http://127.0.0.1:9000"), None)
            .unwrap();
        assert_eq!(config.api_url.port(), Some(9000));
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/azdocs")));
    }

    #[test]
    fn test_invalid_values() {
        let config = ClientConfig::from_lookup(|k| match k {
            "AZDOCS_API_URL" => Some("ftp://nope".into()),
            "AZDOCS_DATA_DIR" => Some(String::new()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.api_url, ClientConfig::defaults().unwrap().api_url);
        assert!(config.data_dir.is_none());

        assert!(matches!(
            ClientConfig::defaults().unwrap().with_overrides(Some("not a url"), None),
            Err(ApiError::InvalidUrl(_))
        ));
    }
}
