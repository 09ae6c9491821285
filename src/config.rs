//! Configuration loading and management.
//!
//! Loads configuration from embedded config.toml with environment variable overrides.
//! Credentials are kept apart from the config and read on their own.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::time::Duration;
use url::Url;

use crate::error::CredentialsError;
use crate::secure::SecureString;

/// Embedded configuration file content.
const CONFIG_TOML: &str = include_str!("../config.toml");

/// Environment variable holding the app registration id.
pub const CLIENT_ID_VAR: &str = "AZURE_AUTH_CLIENT_ID";
/// Environment variable holding the app registration secret.
pub const CLIENT_SECRET_VAR: &str = "AZURE_AUTH_CLIENT_SECRET";
/// Environment variable holding the tenant id.
pub const TENANT_ID_VAR: &str = "AZURE_TENANT_ID";

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub identity: IdentityConfig,
    pub graph: GraphConfig,
    pub http: HttpConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    pub login_base_url: String,
    pub resource: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphConfig {
    pub base_url: String,
    pub api_version: String,
    pub search_attribute: String,
    pub select: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub timeout_seconds: u64,
    pub connect_timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Config {
    /// Load configuration from embedded config.toml with environment variable overrides.
    pub fn load() -> Result<Self> {
        Self::load_with(|key| env::var(key).ok())
    }

    /// Same as [`Config::load`], reading overrides through `lookup`.
    pub fn load_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::embedded()?;

        if let Some(url) = lookup("AZURE_LOGIN_BASE_URL") {
            config.identity.login_base_url = url;
        }

        if let Some(url) = lookup("GRAPH_BASE_URL") {
            config.graph.base_url = url;
        }

        if let Some(log_level) = lookup("RUST_LOG") {
            config.logging.level = log_level;
        }

        config.validate()?;

        Ok(config)
    }

    /// Parse the embedded defaults without overrides.
    pub fn embedded() -> Result<Self> {
        toml::from_str(CONFIG_TOML).context("Failed to parse embedded config.toml")
    }

    fn validate(&self) -> Result<()> {
        Url::parse(&self.identity.login_base_url).with_context(|| {
            format!(
                "Invalid identity login_base_url '{}'",
                self.identity.login_base_url
            )
        })?;

        Url::parse(&self.graph.base_url)
            .with_context(|| format!("Invalid graph base_url '{}'", self.graph.base_url))?;

        if self.graph.select.is_empty() {
            anyhow::bail!("graph.select must name at least one attribute");
        }

        Ok(())
    }

    /// Users collection endpoint, without query string.
    ///
    /// The base URL keeps its trailing slash, so the default renders as
    /// `https://graph.microsoft.com//v1.0/users`.
    pub fn users_url(&self) -> String {
        format!("{}/{}/users", self.graph.base_url, self.graph.api_version)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_seconds)
    }

    pub fn http_connect_timeout(&self) -> Duration {
        Duration::from_secs(self.http.connect_timeout_seconds)
    }
}

/// Client credentials for the identity provider.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: SecureString,
    pub tenant_id: String,
}

impl Credentials {
    /// Read credentials through `lookup`. Values are not validated beyond presence.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CredentialsError> {
        let require = |variable: &'static str| {
            lookup(variable).ok_or(CredentialsError::Missing { variable })
        };

        Ok(Self {
            client_id: require(CLIENT_ID_VAR)?,
            client_secret: require(CLIENT_SECRET_VAR)?.into(),
            tenant_id: require(TENANT_ID_VAR)?,
        })
    }
}
