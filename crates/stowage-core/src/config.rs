//! Configuration module
//!
//! Storage settings are read from the environment (a `.env` file is loaded first when
//! present). Missing required values are a fatal startup condition.

use std::env;

use crate::storage_types::StorageBackend;

const DEFAULT_REGION: &str = "auto";

/// Storage configuration
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub storage_backend: StorageBackend,
    pub bucket: String,
    /// Public base URL that stored keys are appended to
    pub public_url: String,
    /// Host (or full URL) of an S3-compatible endpoint; `None` means AWS S3
    pub endpoint: Option<String>,
    pub port: Option<u16>,
    pub use_ssl: bool,
    pub region: String,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    /// Skip the startup bucket check; bucket policy is managed out of band
    pub skip_bucket_check: bool,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<StorageConfig>);

impl Config {
    fn as_storage(&self) -> &StorageConfig {
        &self.0
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = StorageConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.as_storage().storage_backend
    }

    pub fn bucket(&self) -> &str {
        &self.as_storage().bucket
    }

    pub fn public_url(&self) -> &str {
        self.as_storage().public_url.trim_end_matches('/')
    }

    pub fn region(&self) -> &str {
        &self.as_storage().region
    }

    pub fn access_key(&self) -> Option<&str> {
        self.as_storage().access_key.as_deref()
    }

    pub fn secret_key(&self) -> Option<&str> {
        self.as_storage().secret_key.as_deref()
    }

    pub fn skip_bucket_check(&self) -> bool {
        self.as_storage().skip_bucket_check
    }

    /// Full endpoint URL for S3-compatible providers.
    ///
    /// A bare host is combined with the scheme implied by `STORAGE_USE_SSL` and the
    /// optional `STORAGE_PORT`; a value that already carries a scheme is used as-is.
    pub fn endpoint_url(&self) -> Option<String> {
        let cfg = self.as_storage();
        let endpoint = cfg.endpoint.as_deref()?.trim_end_matches('/');
        if endpoint.contains("://") {
            return Some(endpoint.to_string());
        }
        let scheme = if cfg.use_ssl { "https" } else { "http" };
        Some(match cfg.port {
            Some(port) => format!("{}://{}:{}", scheme, endpoint, port),
            None => format!("{}://{}", scheme, endpoint),
        })
    }
}

fn parse_bool(value: Option<String>, default: bool) -> bool {
    value
        .map(|v| v.trim().to_lowercase())
        .and_then(|v| match v.as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

impl StorageConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let storage_backend = match non_empty("STORAGE_BACKEND") {
            Some(s) => s.parse()?,
            None => StorageBackend::S3,
        };

        let port = match non_empty("STORAGE_PORT") {
            Some(p) => Some(
                p.trim()
                    .parse::<u16>()
                    .map_err(|_| anyhow::anyhow!("STORAGE_PORT must be a valid port number"))?,
            ),
            None => None,
        };

        let config = StorageConfig {
            storage_backend,
            bucket: non_empty("STORAGE_BUCKET")
                .ok_or_else(|| anyhow::anyhow!("STORAGE_BUCKET must be set"))?,
            public_url: non_empty("STORAGE_URL")
                .ok_or_else(|| anyhow::anyhow!("STORAGE_URL must be set"))?,
            endpoint: non_empty("STORAGE_ENDPOINT"),
            port,
            use_ssl: parse_bool(lookup("STORAGE_USE_SSL"), true),
            region: non_empty("STORAGE_REGION")
                .or_else(|| non_empty("AWS_REGION"))
                .unwrap_or_else(|| DEFAULT_REGION.to_string()),
            access_key: non_empty("STORAGE_ACCESS_KEY"),
            secret_key: non_empty("STORAGE_SECRET_KEY"),
            skip_bucket_check: parse_bool(lookup("STORAGE_SKIP_BUCKET_CHECK"), false),
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), anyhow::Error> {
        if self.bucket.trim().is_empty() {
            return Err(anyhow::anyhow!("STORAGE_BUCKET must not be empty"));
        }

        if !(self.public_url.starts_with("http://") || self.public_url.starts_with("https://")) {
            return Err(anyhow::anyhow!(
                "STORAGE_URL must be an absolute http(s) URL"
            ));
        }

        if self.access_key.is_some() != self.secret_key.is_some() {
            return Err(anyhow::anyhow!(
                "STORAGE_ACCESS_KEY and STORAGE_SECRET_KEY must be set together"
            ));
        }

        Ok(())
    }
}
