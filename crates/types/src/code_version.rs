//! Code versions deployed on a sandbox instance.
//!
//! These come from the instance's OCAPI data API rather than the admin API,
//! so field names are snake_case on the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A deployable code version on an instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeVersion {
    pub id: String,

    /// At most one version per instance is active at a time
    #[serde(default)]
    pub active: bool,

    #[serde(
        default,
        rename = "last_modification_time",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_modified: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activation_time: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compatibility_mode: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_dav_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_size: Option<u64>,
}

/// Request body for `PATCH /code_versions/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivationRequest {
    pub active: bool,
}

/// Sort code versions by last modification time, oldest first.
///
/// Versions without a modification time sort first.
pub fn sort_by_last_modified(versions: &mut [CodeVersion]) {
    versions.sort_by(|a, b| a.last_modified.cmp(&b.last_modified));
}
