//! Response envelopes used by the two remote APIs.
//!
//! The admin API wraps every payload in `{ code, status, data, error }` and
//! signals success through the body-level `code`, independent of the HTTP
//! status. The instance data API returns `{ data }` on success and
//! `{ fault: { message } }` on failure.

use serde::{Deserialize, Serialize};

/// Admin API response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminEnvelope<T> {
    #[serde(default)]
    pub code: u16,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiErrorBody>,
}

impl<T> AdminEnvelope<T> {
    /// Human readable error message carried by the body, if any
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_ref().and_then(|e| e.message.as_deref())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Instance data API list response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataEnvelope<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fault: Option<Fault>,
}

/// Instance data API error body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FaultEnvelope {
    #[serde(default)]
    pub fault: Option<Fault>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fault {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
