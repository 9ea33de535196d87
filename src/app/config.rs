use std::fmt::Display;

use thiserror::Error;
use url::Url;

/// Settings needed to talk to the scanning service. Built once at startup and
/// handed to every component that needs it.
#[derive(Clone, Debug)]
pub struct Config {
    pub group: String,
    pub api_endpoint: Url,
    pub token: ApiToken,
}

#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken(pub String);

impl std::fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[redacted]")
    }
}

impl Display for ApiToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[redacted]")
    }
}

/// Raw values as read from a config file, before validation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawConfig {
    pub group: Option<String>,
    pub api_endpoint: Option<String>,
    pub token: Option<String>,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("configuration file config.yaml not found, searched: {searched}")]
    NotFound { searched: String },

    #[error("reading configuration {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("reading configuration {path}: invalid yaml: {reason}")]
    InvalidYaml { path: String, reason: String },

    #[error("{0} field of config.yaml is not set")]
    MissingField(&'static str),

    #[error("while parsing apiEndpoint url {endpoint:?}: {source}")]
    InvalidEndpoint {
        endpoint: String,
        source: url::ParseError,
    },
}

impl TryFrom<RawConfig> for Config {
    type Error = ConfigError;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        let endpoint = raw
            .api_endpoint
            .filter(|e| !e.trim().is_empty())
            .ok_or(ConfigError::MissingField("apiEndpoint"))?;

        let api_endpoint =
            Url::parse(endpoint.trim()).map_err(|source| ConfigError::InvalidEndpoint {
                endpoint: endpoint.clone(),
                source,
            })?;

        let token = raw
            .token
            .filter(|t| !t.is_empty())
            .ok_or(ConfigError::MissingField("token"))?;

        Ok(Config {
            group: raw.group.unwrap_or_default(),
            api_endpoint,
            token: ApiToken(token),
        })
    }
}
