//! Application settings loaded via OrthoConfig.
//!
//! Values layer from a config file, `WANDERLUST_*` environment variables and
//! command-line flags. Optional fields fall back to defaults through the
//! accessor methods; required ones report [`SettingsError::Missing`].

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::domain::RetryPolicy;
use crate::outbound::persistence::PoolConfig;
use crate::inbound::http::state::DEFAULT_UPLOAD_MAX_BYTES;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_MAPBOX_BASE_URL: &str = "https://api.mapbox.com";
const DEFAULT_CLOUDINARY_BASE_URL: &str = "https://api.cloudinary.com";
const DEFAULT_CLOUDINARY_FOLDER: &str = "wanderlust_DEV";
const DEFAULT_GEOCODER_TIMEOUT_SECS: u64 = 10;
const DEFAULT_STORAGE_TIMEOUT_SECS: u64 = 30;
const DEFAULT_RETRY_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_DB_POOL_MAX_SIZE: u32 = 10;
const DEFAULT_DB_CHECKOUT_TIMEOUT_SECS: u64 = 30;

/// Invalid or missing configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// A required value was not supplied.
    #[error("missing required setting WANDERLUST_{name}")]
    Missing { name: &'static str },
    /// A value was supplied but could not be parsed.
    #[error("invalid value for WANDERLUST_{name}='{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Process-wide settings for the Wanderlust server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "WANDERLUST")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection string.
    pub database_url: Option<String>,
    /// Mapbox access token, shared by server geocoding and the browser map.
    pub map_token: Option<String>,
    /// Mapbox API origin.
    pub mapbox_base_url: Option<String>,
    /// Cloudinary cloud name.
    pub cloudinary_cloud_name: Option<String>,
    /// Cloudinary API key.
    pub cloudinary_key: Option<String>,
    /// Cloudinary API secret.
    pub cloudinary_secret: Option<String>,
    /// Cloudinary API origin.
    pub cloudinary_base_url: Option<String>,
    /// Cloudinary folder receiving uploads.
    pub cloudinary_folder: Option<String>,
    /// Largest accepted image upload.
    pub upload_max_bytes: Option<usize>,
    /// Geocoding request timeout.
    pub geocoder_timeout_secs: Option<u64>,
    /// Upload request timeout.
    pub storage_timeout_secs: Option<u64>,
    /// Attempts per external call, including the first.
    pub retry_max_attempts: Option<u32>,
    /// Largest number of pooled database connections.
    pub db_pool_max_size: Option<u32>,
    /// How long a request waits for a pooled connection.
    pub db_checkout_timeout_secs: Option<u64>,
}

fn required<'a>(value: Option<&'a String>, name: &'static str) -> Result<&'a str, SettingsError> {
    value
        .map(String::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(SettingsError::Missing { name })
}

fn parse_url(
    value: Option<&String>,
    default: &str,
    name: &'static str,
) -> Result<Url, SettingsError> {
    let raw = value.map_or(default, String::as_str);
    Url::parse(raw).map_err(|error| SettingsError::Invalid {
        name,
        value: raw.to_owned(),
        reason: error.to_string(),
    })
}

impl AppSettings {
    /// Listen address, `0.0.0.0:8080` by default.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|error: std::net::AddrParseError| SettingsError::Invalid {
            name: "BIND_ADDR",
            value: raw.to_owned(),
            reason: error.to_string(),
        })
    }

    /// Database connection string.
    pub fn database_url(&self) -> Result<&str, SettingsError> {
        required(self.database_url.as_ref(), "DATABASE_URL")
    }

    /// Mapbox access token.
    pub fn map_token(&self) -> Result<&str, SettingsError> {
        required(self.map_token.as_ref(), "MAP_TOKEN")
    }

    /// Mapbox API origin.
    pub fn mapbox_base_url(&self) -> Result<Url, SettingsError> {
        parse_url(
            self.mapbox_base_url.as_ref(),
            DEFAULT_MAPBOX_BASE_URL,
            "MAPBOX_BASE_URL",
        )
    }

    /// Cloudinary cloud name.
    pub fn cloudinary_cloud_name(&self) -> Result<&str, SettingsError> {
        required(self.cloudinary_cloud_name.as_ref(), "CLOUDINARY_CLOUD_NAME")
    }

    /// Cloudinary API key.
    pub fn cloudinary_key(&self) -> Result<&str, SettingsError> {
        required(self.cloudinary_key.as_ref(), "CLOUDINARY_KEY")
    }

    /// Cloudinary API secret.
    pub fn cloudinary_secret(&self) -> Result<&str, SettingsError> {
        required(self.cloudinary_secret.as_ref(), "CLOUDINARY_SECRET")
    }

    /// Cloudinary API origin.
    pub fn cloudinary_base_url(&self) -> Result<Url, SettingsError> {
        parse_url(
            self.cloudinary_base_url.as_ref(),
            DEFAULT_CLOUDINARY_BASE_URL,
            "CLOUDINARY_BASE_URL",
        )
    }

    /// Upload folder, `wanderlust_DEV` by default.
    pub fn cloudinary_folder(&self) -> &str {
        self.cloudinary_folder
            .as_deref()
            .unwrap_or(DEFAULT_CLOUDINARY_FOLDER)
    }

    /// Upload size cap, 10 MiB by default.
    pub fn upload_max_bytes(&self) -> usize {
        self.upload_max_bytes.unwrap_or(DEFAULT_UPLOAD_MAX_BYTES)
    }

    /// Geocoding request timeout.
    pub fn geocoder_timeout(&self) -> Duration {
        Duration::from_secs(
            self.geocoder_timeout_secs
                .unwrap_or(DEFAULT_GEOCODER_TIMEOUT_SECS),
        )
    }

    /// Upload request timeout.
    pub fn storage_timeout(&self) -> Duration {
        Duration::from_secs(
            self.storage_timeout_secs
                .unwrap_or(DEFAULT_STORAGE_TIMEOUT_SECS),
        )
    }

    /// Retry policy for external providers.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::default()
            .with_max_attempts(self.retry_max_attempts.unwrap_or(DEFAULT_RETRY_MAX_ATTEMPTS))
    }

    /// Connection pool settings for [`Self::database_url`].
    pub fn pool_config(&self) -> Result<PoolConfig, SettingsError> {
        Ok(PoolConfig::new(self.database_url()?)
            .with_max_size(self.db_pool_max_size.unwrap_or(DEFAULT_DB_POOL_MAX_SIZE))
            .with_connection_timeout(Duration::from_secs(
                self.db_checkout_timeout_secs
                    .unwrap_or(DEFAULT_DB_CHECKOUT_TIMEOUT_SECS),
            )))
    }
}
