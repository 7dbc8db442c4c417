//! Patch inspection and scheduling flows
//!
//! Same session skeleton as the probe, different middle: list the active
//! systems, fetch each system's upgradable packages, and optionally
//! schedule install jobs for everything outstanding.

use chrono::{SecondsFormat, Utc};
use tracing::{debug, info, warn};

use crate::client::{ApiClient, LogoutScope};
use crate::error::Result;
use crate::session::Session;
use crate::types::{ActiveSystem, Credentials, ScheduleRequest, UpgradablePackage};

/// One system together with its outstanding updates
#[derive(Debug)]
pub struct SystemPatchState {
    pub system: ActiveSystem,
    pub packages: Vec<UpgradablePackage>,
}

/// A job created for one system
#[derive(Debug)]
pub struct ScheduledUpdate {
    pub system: ActiveSystem,
    pub package_count: usize,
    pub job_id: i64,
}

/// RFC 3339 timestamp `hours` from now, the earliest occurrence accepted
/// by the scheduler.
pub fn earliest_occurrence(hours: i64) -> String {
    (Utc::now() + chrono::Duration::hours(hours)).to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Login, collect every active system with its upgradable packages, and
/// tear the session down.
pub async fn inspect_systems(
    client: &ApiClient,
    credentials: &Credentials,
) -> Result<Vec<SystemPatchState>> {
    let (mut session, _login) = client.login(credentials).await?;

    let result = collect_patch_state(client, &session).await;

    if let Err(teardown) = client.logout(&mut session, LogoutScope::Full).await {
        warn!(%teardown, "logout failed after system inspection");
    }
    result
}

/// Login, schedule a package-install job for every system with
/// outstanding updates, and tear the session down.
///
/// Systems without upgradable packages are skipped, not errored.
pub async fn schedule_updates(
    client: &ApiClient,
    credentials: &Credentials,
    hours_ahead: i64,
) -> Result<Vec<ScheduledUpdate>> {
    let (mut session, _login) = client.login(credentials).await?;

    let result = schedule_all(client, &session, hours_ahead).await;

    if let Err(teardown) = client.logout(&mut session, LogoutScope::Full).await {
        warn!(%teardown, "logout failed after scheduling");
    }
    result
}

async fn collect_patch_state(
    client: &ApiClient,
    session: &Session,
) -> Result<Vec<SystemPatchState>> {
    let systems = client.list_active_systems(session).await?;
    info!(count = systems.len(), "active systems listed");

    let mut states = Vec::with_capacity(systems.len());
    for system in systems {
        let packages = client.list_upgradable_packages(session, system.id).await?;
        debug!(system = %system.name, packages = packages.len(), "upgradable packages listed");
        states.push(SystemPatchState { system, packages });
    }
    Ok(states)
}

async fn schedule_all(
    client: &ApiClient,
    session: &Session,
    hours_ahead: i64,
) -> Result<Vec<ScheduledUpdate>> {
    let occurrence = earliest_occurrence(hours_ahead);
    let states = collect_patch_state(client, session).await?;

    let mut scheduled = Vec::new();
    for state in states {
        if state.packages.is_empty() {
            info!(system = %state.system.name, "no updates to install, skipping");
            continue;
        }

        let request = ScheduleRequest {
            sid: state.system.id,
            package_ids: state.packages.iter().map(|p| p.to_package_id).collect(),
            earliest_occurrence: occurrence.clone(),
        };
        let job = client.schedule_package_install(session, &request).await?;
        scheduled.push(ScheduledUpdate {
            package_count: state.packages.len(),
            system: state.system,
            job_id: job.job_id,
        });
    }
    Ok(scheduled)
}
