//! Data model shared by the sbxctl crates.
//!
//! - [`Sandbox`] and [`SandboxState`] - sandbox records from the admin API
//! - [`CodeVersion`] - code versions deployed on an instance
//! - [`RealmUsage`] - realm usage summaries and the credit formula
//! - [`AdminEnvelope`] / [`DataEnvelope`] - the response wrappers of both APIs

pub mod code_version;
pub mod envelope;
pub mod sandbox;
pub mod usage;

pub use code_version::{ActivationRequest, CodeVersion, sort_by_last_modified};
pub use envelope::{AdminEnvelope, ApiErrorBody, DataEnvelope, Fault, FaultEnvelope};
pub use sandbox::{OperationRequest, Sandbox, SandboxOperation, SandboxState};
pub use usage::{RealmUsage, credits};

/// Name of the binary, used for cache and config directories
pub const APP_NAME: &str = "sbxctl";
