//! Wire types for the management API

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// Login payload, serialized exactly as the API expects it
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}

/// Status code and JSON body of one API call
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

/// Response envelope used by list endpoints.
///
/// Depending on server version the same endpoint answers either with a
/// `{"success": ..., "result": ...}` wrapper or with the bare payload.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ApiResult<T> {
    Enveloped {
        success: bool,
        #[serde(default)]
        result: Option<T>,
    },
    Bare(T),
}

impl<T> ApiResult<T> {
    /// Unwrap the payload, treating an unsuccessful envelope as an API failure.
    pub fn into_result(self, endpoint: &'static str, status: u16) -> Result<T> {
        match self {
            ApiResult::Bare(value) => Ok(value),
            ApiResult::Enveloped {
                success: true,
                result: Some(value),
            } => Ok(value),
            ApiResult::Enveloped { .. } => Err(Error::ApiFailure { endpoint, status }),
        }
    }
}

/// Software channel descriptor from `channel/listAllChannels`
#[derive(Debug, Clone, Deserialize)]
pub struct Channel {
    pub label: String,
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub arch_name: Option<String>,
    #[serde(default)]
    pub provider_name: Option<String>,
    #[serde(default)]
    pub packages: Option<i64>,
    #[serde(default)]
    pub systems: Option<i64>,
}

/// Registered system from `system/listActiveSystems`
#[derive(Debug, Clone, Deserialize)]
pub struct ActiveSystem {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub last_boot: Option<String>,
    #[serde(default)]
    pub last_checkin: Option<String>,
}

/// One upgradable package reported for a system
#[derive(Debug, Clone, Deserialize)]
pub struct UpgradablePackage {
    pub name: String,
    #[serde(default)]
    pub arch: Option<String>,
    #[serde(default)]
    pub from_version: Option<String>,
    #[serde(default)]
    pub from_release: Option<String>,
    #[serde(default)]
    pub from_epoch: Option<String>,
    #[serde(default)]
    pub from_arch: Option<String>,
    #[serde(default)]
    pub to_version: Option<String>,
    #[serde(default)]
    pub to_release: Option<String>,
    #[serde(default)]
    pub to_epoch: Option<String>,
    #[serde(default)]
    pub to_arch: Option<String>,
    pub to_package_id: i64,
}

/// Request body for `system/schedulePackageInstall`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRequest {
    pub sid: i64,
    pub package_ids: Vec<i64>,
    /// RFC 3339 timestamp for the earliest job occurrence
    pub earliest_occurrence: String,
}

/// Answer to a schedule request
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduledJob {
    #[serde(default)]
    pub success: bool,
    #[serde(rename = "result", default)]
    pub job_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn credentials_serialize_with_api_field_names() {
        let creds = Credentials {
            login: "admin".into(),
            password: "suselinux".into(),
        };
        assert_eq!(
            serde_json::to_value(&creds).unwrap(),
            json!({"login": "admin", "password": "suselinux"})
        );
    }

    #[test]
    fn channel_list_deserializes_from_bare_array() {
        let parsed: ApiResult<Vec<Channel>> =
            serde_json::from_value(json!([{"label": "test-channel"}])).unwrap();
        let channels = parsed.into_result("channel/listAllChannels", 200).unwrap();
        assert_eq!(channels.len(), 1);
        assert_eq!(channels[0].label, "test-channel");
    }

    #[test]
    fn channel_list_deserializes_from_envelope() {
        let parsed: ApiResult<Vec<Channel>> = serde_json::from_value(json!({
            "success": true,
            "result": [{"label": "sles15-sp6-pool", "name": "SLES15 SP6 Pool", "packages": 41210}]
        }))
        .unwrap();
        let channels = parsed.into_result("channel/listAllChannels", 200).unwrap();
        assert_eq!(channels[0].packages, Some(41210));
    }

    #[test]
    fn unsuccessful_envelope_is_an_api_failure() {
        let parsed: ApiResult<Vec<Channel>> =
            serde_json::from_value(json!({"success": false})).unwrap();
        let err = parsed
            .into_result("channel/listAllChannels", 200)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::ApiFailure {
                endpoint: "channel/listAllChannels",
                status: 200
            }
        ));
    }

    #[test]
    fn schedule_request_serializes_camel_case() {
        let request = ScheduleRequest {
            sid: 1000010001,
            package_ids: vec![42, 43],
            earliest_occurrence: "2026-08-06T12:00:00Z".into(),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "sid": 1000010001_i64,
                "packageIds": [42, 43],
                "earliestOccurrence": "2026-08-06T12:00:00Z"
            })
        );
    }
}
