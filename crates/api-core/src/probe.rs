//! The session probe: login, channel listing, guaranteed teardown

use tracing::{info, warn};

use crate::client::{ApiClient, LogoutScope};
use crate::error::{Error, Result};
use crate::retry::{retry_with_backoff, RetryPolicy};
use crate::types::{ApiResponse, Channel, Credentials};

/// Outcome of one probe run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Success,
    /// The channel listing ended non-200 after retries
    ListingFailed { status: u16 },
}

impl ProbeOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ProbeOutcome::Success)
    }
}

/// Everything one probe run observed, for reporting
#[derive(Debug)]
pub struct ProbeReport {
    pub login: ApiResponse,
    pub session_token: String,
    pub listing_status: u16,
    pub channels: Vec<Channel>,
    pub logout: Option<ApiResponse>,
    pub outcome: ProbeOutcome,
}

/// Run the probe sequence against `client`.
///
/// Invariants:
/// - at most one session is established;
/// - once established, logout is attempted before returning, on every
///   path, and fires at most once;
/// - a failed listing logs out with only the session cookie, a clean run
///   tears down with the complete original cookie set.
///
/// An HTTP 401 on the listing is retried per `retry` — a freshly issued
/// token can lose the race against its own login. Any other non-200 is a
/// failure outcome; transport errors are fatal and propagate after a
/// best-effort teardown.
pub async fn run(
    client: &ApiClient,
    credentials: &Credentials,
    retry: &RetryPolicy,
) -> Result<ProbeReport> {
    let (mut session, login) = client.login(credentials).await?;
    let session_token = session.token().to_string();

    let listing = retry_with_backoff(
        retry,
        || client.list_channels(&session),
        |err| matches!(err, Error::ListingFailed { status: 401 }),
    )
    .await;

    match listing {
        Ok(channels) => {
            info!(channels = channels.len(), "probe listing succeeded");
            let logout = client.logout(&mut session, LogoutScope::Full).await?;
            Ok(ProbeReport {
                login,
                session_token,
                listing_status: 200,
                channels,
                logout,
                outcome: ProbeOutcome::Success,
            })
        }
        Err(Error::ListingFailed { status }) => {
            warn!(status, "channel listing failed, logging out");
            let logout = client
                .logout(&mut session, LogoutScope::SessionOnly)
                .await?;
            Ok(ProbeReport {
                login,
                session_token,
                listing_status: status,
                channels: Vec::new(),
                logout,
                outcome: ProbeOutcome::ListingFailed { status },
            })
        }
        Err(err) => {
            // Transport-level failure: still try to tear the session down
            // before propagating.
            if let Err(teardown) = client.logout(&mut session, LogoutScope::SessionOnly).await {
                warn!(%teardown, "teardown after transport failure also failed");
            }
            Err(err)
        }
    }
}
