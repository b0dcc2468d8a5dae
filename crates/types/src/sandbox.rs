//! Sandbox records as returned by the platform admin API.
//!
//! A sandbox is identified by its `id`. The `host_name` is the human-facing
//! lookup key and is what users type on the command line.
//!
//! # Example JSON
//!
//! ```json
//! {
//!   "id": "4a7ae2c1-2b44-4d6d-9b7e-62b6e2b0a7c1",
//!   "realm": "zzzz",
//!   "instance": "s01",
//!   "state": "started",
//!   "hostName": "zzzz-s01.dx.commercecloud.salesforce.com",
//!   "createdAt": "2024-03-01T09:12:44Z",
//!   "createdBy": "ci@example.com",
//!   "links": { "bm": "https://zzzz-s01.dx.commercecloud.salesforce.com/on/demandware.store/Sites-Site" }
//! }
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A provisioned sandbox on the platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sandbox {
    /// Unique sandbox identifier
    pub id: String,

    /// Host name of the sandbox instance, e.g. `zzzz-s01.dx.example.com`
    #[serde(default)]
    pub host_name: String,

    /// Four character realm the sandbox is billed to
    #[serde(default)]
    pub realm: String,

    /// Instance name within the realm, e.g. `s01`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,

    pub state: SandboxState,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,

    /// Named links to the sandbox tooling (business manager, ocapi, webdav...)
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub links: IndexMap<String, serde_json::Value>,
}

impl Sandbox {
    /// Returns true if `find` is a substring of the host name or equals the id.
    pub fn matches(&self, find: &str) -> bool {
        self.host_name.contains(find) || self.id == find
    }
}

/// Lifecycle state of a sandbox.
///
/// Only `started` and `stopped` are stable; every other state the platform
/// reports (`starting`, `stopping`, `creating`, `deleting`, `failed`...) is
/// kept verbatim as a transitional state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SandboxState {
    Started,
    Stopped,
    Transitional(String),
}

impl SandboxState {
    pub fn as_str(&self) -> &str {
        match self {
            SandboxState::Started => "started",
            SandboxState::Stopped => "stopped",
            SandboxState::Transitional(state) => state.as_str(),
        }
    }

    pub fn is_transitional(&self) -> bool {
        matches!(self, SandboxState::Transitional(_))
    }
}

impl From<String> for SandboxState {
    fn from(value: String) -> Self {
        match value.as_str() {
            "started" => SandboxState::Started,
            "stopped" => SandboxState::Stopped,
            _ => SandboxState::Transitional(value),
        }
    }
}

impl From<SandboxState> for String {
    fn from(value: SandboxState) -> Self {
        match value {
            SandboxState::Transitional(state) => state,
            stable => stable.as_str().to_string(),
        }
    }
}

impl fmt::Display for SandboxState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle operation that can be issued against a sandbox
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SandboxOperation {
    Start,
    Stop,
    Restart,
}

impl SandboxOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            SandboxOperation::Start => "start",
            SandboxOperation::Stop => "stop",
            SandboxOperation::Restart => "restart",
        }
    }
}

impl fmt::Display for SandboxOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SandboxOperation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "start" => Ok(SandboxOperation::Start),
            "stop" => Ok(SandboxOperation::Stop),
            "restart" => Ok(SandboxOperation::Restart),
            _ => Err(format!(
                "Invalid operation: {}. Valid options are: start, stop, restart",
                s
            )),
        }
    }
}

/// Request body for `POST /sandboxes/{id}/operations`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationRequest {
    pub operation: SandboxOperation,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sandbox_json(state: &str) -> String {
        format!(
            r#"{{
                "id": "abc-123",
                "realm": "zzzz",
                "instance": "s01",
                "state": "{state}",
                "hostName": "zzzz-s01.dx.example.com",
                "createdAt": "2024-03-01T09:12:44Z",
                "createdBy": "ci@example.com",
                "links": {{ "bm": "https://zzzz-s01.dx.example.com/bm" }}
            }}"#
        )
    }

    #[test]
    fn test_parse_sandbox() {
        let sandbox: Sandbox = serde_json::from_str(&sandbox_json("started")).unwrap();
        assert_eq!(sandbox.id, "abc-123");
        assert_eq!(sandbox.host_name, "zzzz-s01.dx.example.com");
        assert_eq!(sandbox.realm, "zzzz");
        assert_eq!(sandbox.state, SandboxState::Started);
        assert_eq!(sandbox.created_by.as_deref(), Some("ci@example.com"));
        assert!(sandbox.links.contains_key("bm"));
    }

    #[test]
    fn test_transitional_state_is_kept_verbatim() {
        let sandbox: Sandbox = serde_json::from_str(&sandbox_json("starting")).unwrap();
        assert_eq!(
            sandbox.state,
            SandboxState::Transitional("starting".to_string())
        );
        assert!(sandbox.state.is_transitional());

        let json = serde_json::to_value(&sandbox).unwrap();
        assert_eq!(json["state"], "starting");
    }

    #[test]
    fn test_matches_host_substring_or_exact_id() {
        let sandbox: Sandbox = serde_json::from_str(&sandbox_json("stopped")).unwrap();
        assert!(sandbox.matches("s01"));
        assert!(sandbox.matches("zzzz-s01.dx"));
        assert!(sandbox.matches("abc-123"));
        // ids only match exactly
        assert!(!sandbox.matches("abc"));
        assert!(!sandbox.matches("s02"));
    }

    #[test]
    fn test_operation_request_body() {
        let body = serde_json::to_value(OperationRequest {
            operation: SandboxOperation::Restart,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "operation": "restart" }));
        assert_eq!(
            "STOP".parse::<SandboxOperation>().unwrap(),
            SandboxOperation::Stop
        );
        assert!("delete".parse::<SandboxOperation>().is_err());
    }
}
