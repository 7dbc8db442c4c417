//! HTTP client for the management API
//!
//! One client per run. Requests are strictly sequential; the only state
//! shared between calls is the [`Session`] captured at login. Cookies are
//! attached by hand because the probe must control exactly which cookies
//! each request carries.

use std::time::Duration;

use reqwest::header::{COOKIE, SET_COOKIE};
use reqwest::{redirect, Certificate, Response};
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::ProbeConfig;
use crate::error::{Error, Result};
use crate::session::{Session, SessionCookie};
use crate::types::{
    ActiveSystem, ApiResponse, ApiResult, Channel, Credentials, ScheduleRequest, ScheduledJob,
    UpgradablePackage,
};

/// Which cookies a logout request carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutScope {
    /// Only the session cookie (failure-path teardown)
    SessionOnly,
    /// The complete original login cookie set (final teardown)
    Full,
}

pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
}

impl ApiClient {
    /// Wrap an existing HTTP client; `base` is the API root, e.g.
    /// `https://suma1.example.org/rhn/manager/api`.
    pub fn new(base: Url, http: reqwest::Client) -> Self {
        Self { http, base }
    }

    /// Build a client from configuration: trust anchor, timeout, and the
    /// no-redirect policy the API expects.
    pub fn from_config(config: &ProbeConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(redirect::Policy::none());

        if let Some(path) = &config.ca_cert {
            let pem = std::fs::read(path).map_err(|source| Error::TrustAnchor {
                path: path.clone(),
                source,
            })?;
            builder = builder.add_root_certificate(Certificate::from_pem(&pem)?);
        }
        if config.insecure {
            warn!("server certificate validation is disabled");
            builder = builder.danger_accept_invalid_certs(true);
        }

        Ok(Self::new(config.manager_url()?, builder.build()?))
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Authenticate and capture the session cookies.
    ///
    /// A non-2xx answer fails immediately instead of letting a dead
    /// session limp into the next call.
    pub async fn login(&self, credentials: &Credentials) -> Result<(Session, ApiResponse)> {
        let response = self
            .http
            .post(self.endpoint("/auth/login"))
            .json(credentials)
            .send()
            .await?;

        let status = response.status();
        let cookies: Vec<SessionCookie> = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .filter_map(SessionCookie::parse)
            .collect();
        let body = read_json_body(response).await?;

        if !status.is_success() {
            return Err(Error::LoginFailed {
                status: status.as_u16(),
            });
        }

        let session = Session::from_login_cookies(cookies)?;
        info!(status = status.as_u16(), "login established a session");

        Ok((
            session,
            ApiResponse {
                status: status.as_u16(),
                body,
            },
        ))
    }

    /// List all software channels visible to the session.
    pub async fn list_channels(&self, session: &Session) -> Result<Vec<Channel>> {
        let response = self
            .http
            .get(self.endpoint("/channel/listAllChannels"))
            .header(COOKIE, session.session_cookie_header())
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() != 200 {
            return Err(Error::ListingFailed {
                status: status.as_u16(),
            });
        }

        let parsed: ApiResult<Vec<Channel>> = response.json().await?;
        let channels = parsed.into_result("channel/listAllChannels", status.as_u16())?;
        debug!(count = channels.len(), "channel listing succeeded");
        Ok(channels)
    }

    /// List systems that have checked in recently.
    pub async fn list_active_systems(&self, session: &Session) -> Result<Vec<ActiveSystem>> {
        self.get_list(session, "/system/listActiveSystems", "system/listActiveSystems", &[])
            .await
    }

    /// List the latest upgradable packages for one system.
    pub async fn list_upgradable_packages(
        &self,
        session: &Session,
        sid: i64,
    ) -> Result<Vec<UpgradablePackage>> {
        self.get_list(
            session,
            "/system/listLatestUpgradablePackages",
            "system/listLatestUpgradablePackages",
            &[("sid", sid.to_string())],
        )
        .await
    }

    /// Schedule a package-install job for one system.
    pub async fn schedule_package_install(
        &self,
        session: &Session,
        request: &ScheduleRequest,
    ) -> Result<ScheduledJob> {
        let response = self
            .http
            .post(self.endpoint("/system/schedulePackageInstall"))
            .header(COOKIE, session.session_cookie_header())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() != 200 {
            return Err(Error::ApiFailure {
                endpoint: "system/schedulePackageInstall",
                status: status.as_u16(),
            });
        }

        let job: ScheduledJob = response.json().await?;
        if !job.success || job.job_id == 0 {
            return Err(Error::ScheduleRejected { sid: request.sid });
        }
        info!(sid = request.sid, job = job.job_id, "scheduled package install");
        Ok(job)
    }

    /// Log the session out, once.
    ///
    /// Returns `None` when the session already logged out; a non-200
    /// answer is reported in the receipt, never escalated.
    pub async fn logout(
        &self,
        session: &mut Session,
        scope: LogoutScope,
    ) -> Result<Option<ApiResponse>> {
        if session.is_logged_out() {
            debug!("logout skipped, session already torn down");
            return Ok(None);
        }

        let cookie_header = match scope {
            LogoutScope::SessionOnly => session.session_cookie_header(),
            LogoutScope::Full => session.full_cookie_header(),
        };

        let response = self
            .http
            .post(self.endpoint("/auth/logout"))
            .header(COOKIE, cookie_header)
            .send()
            .await?;
        session.mark_logged_out();

        let status = response.status().as_u16();
        if status != 200 {
            warn!(status, "logout answered with a non-200 status");
        }
        let body = read_json_body(response).await?;

        Ok(Some(ApiResponse { status, body }))
    }

    async fn get_list<T: serde::de::DeserializeOwned>(
        &self,
        session: &Session,
        path: &str,
        endpoint: &'static str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let response = self
            .http
            .get(self.endpoint(path))
            .query(query)
            .header(COOKIE, session.session_cookie_header())
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() != 200 {
            return Err(Error::ApiFailure {
                endpoint,
                status: status.as_u16(),
            });
        }

        let parsed: ApiResult<Vec<T>> = response.json().await?;
        parsed.into_result(endpoint, status.as_u16())
    }
}

/// Read a response body as JSON, falling back to the raw text for bodies
/// that are not JSON (error pages, proxies).
async fn read_json_body(response: Response) -> Result<Value> {
    let text = response.text().await?;
    Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
}
