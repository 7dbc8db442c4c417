//! Configuration for the probe and patch flows

use std::path::PathBuf;

use serde::Deserialize;
use url::Url;

use crate::error::{Error, Result};
use crate::retry::RetryPolicy;
use crate::types::Credentials;

/// Connection settings for one run against a management server.
///
/// All fields can come from a TOML file, environment variables or
/// command-line flags; merging happens in the CLI layer. Only `server`,
/// `user` and `password` are required.
#[derive(Debug, Clone, Deserialize)]
pub struct ProbeConfig {
    /// Server host name, without scheme or API path
    pub server: String,
    pub user: String,
    pub password: String,
    /// PEM CA certificate used to validate the server identity
    #[serde(default)]
    pub ca_cert: Option<PathBuf>,
    /// Skip server certificate validation entirely
    #[serde(default)]
    pub insecure: bool,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub retry: RetryPolicy,
}

fn default_timeout_secs() -> u64 {
    10
}

impl ProbeConfig {
    /// Base URL of the management API on the configured server
    pub fn manager_url(&self) -> Result<Url> {
        Url::parse(&format!("https://{}/rhn/manager/api", self.server))
            .map_err(|e| Error::Config(format!("invalid server {:?}: {}", self.server, e)))
    }

    /// Login payload for this configuration
    pub fn credentials(&self) -> Credentials {
        Credentials {
            login: self.user.clone(),
            password: self.password.clone(),
        }
    }
}
