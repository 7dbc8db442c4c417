//! # sumaprobe-api-core
//!
//! Session probe and patch client for SUSE Manager / Uyuni style HTTP
//! APIs (`/rhn/manager/api`).
//!
//! This crate provides:
//! - Login / logout session lifecycle with cookie-level control
//! - The channel-listing probe with guaranteed single teardown
//! - Active-system and upgradable-package inspection
//! - Package-install job scheduling
//!
//! ## Architecture
//!
//! [`ApiClient`] owns the HTTP transport (trust anchor, timeout, no
//! redirects); [`probe::run`] and the [`patch`] flows orchestrate the
//! call sequences on top of it. All flows are strictly sequential: one
//! session per run, logout attempted before returning on every path.

pub mod client;
pub mod config;
pub mod error;
pub mod patch;
pub mod probe;
pub mod retry;
pub mod session;
pub mod types;

pub use client::{ApiClient, LogoutScope};
pub use config::ProbeConfig;
pub use error::{Error, Result};
pub use probe::{ProbeOutcome, ProbeReport};
pub use retry::RetryPolicy;
pub use session::{Session, SESSION_COOKIE};
pub use types::{ActiveSystem, ApiResponse, Channel, Credentials, UpgradablePackage};
