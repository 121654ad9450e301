//! Runtime configuration, read from a TOML file.
//!
//! Every field has a default, so an empty file (or no file at all) gives
//! the stock behaviour:
//!
//! ```toml
//! credentials_name = "azure-creds"
//! response_ttl_secs = 60
//! query_timeout_secs = 30
//! annotation_prefix = "function-msgraph"
//! log_filter = "info"
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FunctionConfig {
    /// Name of the credential secret in the request.
    pub credentials_name: String,
    pub response_ttl_secs: u64,
    /// Upper bound on one directory query; `0` disables the bound.
    pub query_timeout_secs: u64,
    /// Prefix of the annotations written in operation mode.
    pub annotation_prefix: String,
    /// Default `tracing` filter when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for FunctionConfig {
    fn default() -> Self {
        Self {
            credentials_name: "azure-creds".to_string(),
            response_ttl_secs: 60,
            query_timeout_secs: 30,
            annotation_prefix: "function-msgraph".to_string(),
            log_filter: "info".to_string(),
        }
    }
}

impl FunctionConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn response_ttl(&self) -> Duration {
        Duration::from_secs(self.response_ttl_secs)
    }

    pub fn query_timeout(&self) -> Option<Duration> {
        (self.query_timeout_secs > 0).then(|| Duration::from_secs(self.query_timeout_secs))
    }

    pub fn last_execution_annotation(&self) -> String {
        format!("{}/last-execution", self.annotation_prefix)
    }

    pub fn drift_annotation(&self) -> String {
        format!("{}/last-execution-query-drift-detected", self.annotation_prefix)
    }
}
