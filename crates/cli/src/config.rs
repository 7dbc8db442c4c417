//! Connection configuration: flags, environment, and the TOML file
//!
//! Precedence is flag > environment > config file > default. Flags and
//! environment are already merged by clap; this module merges the result
//! with the file.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Deserialize;

use sumaprobe_api_core::{ProbeConfig, RetryPolicy};

const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Args)]
pub struct ConnectionArgs {
    /// Path to a TOML configuration file
    #[arg(long, global = true, env = "SUMAPROBE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Server host name, without scheme or API path
    #[arg(long, global = true, env = "SUMAPROBE_SERVER")]
    pub server: Option<String>,

    /// API user
    #[arg(long, global = true, env = "SUMAPROBE_USER")]
    pub user: Option<String>,

    /// API password
    #[arg(long, global = true, env = "SUMAPROBE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// PEM CA certificate validating the server identity
    #[arg(long, global = true, env = "SUMAPROBE_CA_CERT")]
    pub ca_cert: Option<PathBuf>,

    /// Skip server certificate validation
    #[arg(long, global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,
}

/// The subset of [`ProbeConfig`] a config file may provide
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    server: Option<String>,
    user: Option<String>,
    password: Option<String>,
    ca_cert: Option<PathBuf>,
    insecure: Option<bool>,
    timeout_secs: Option<u64>,
    retry: Option<RetryPolicy>,
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("sumaprobe").join("config.toml"))
}

fn load_file(explicit: Option<&Path>) -> Result<FileConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        // The default location is optional; an explicitly named file is not.
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(FileConfig::default()),
        },
    };

    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("cannot read config file {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("cannot parse config file {}", path.display()))
}

fn merge(args: &ConnectionArgs, file: FileConfig) -> Result<ProbeConfig> {
    let Some(server) = args.server.clone().or(file.server) else {
        bail!("no server configured; pass --server or set it in the config file");
    };
    let Some(user) = args.user.clone().or(file.user) else {
        bail!("no user configured; pass --user or set it in the config file");
    };
    let Some(password) = args.password.clone().or(file.password) else {
        bail!("no password configured; pass --password or set it in the config file");
    };

    Ok(ProbeConfig {
        server,
        user,
        password,
        ca_cert: args.ca_cert.clone().or(file.ca_cert),
        insecure: args.insecure || file.insecure.unwrap_or(false),
        timeout_secs: args
            .timeout_secs
            .or(file.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS),
        retry: file.retry.unwrap_or_default(),
    })
}

impl ConnectionArgs {
    /// Resolve the effective configuration for this invocation.
    pub fn resolve(&self) -> Result<ProbeConfig> {
        merge(self, load_file(self.config.as_deref())?)
    }
}
