//! Executes operations against resolved entities.
//!
//! Sandbox lifecycle operations run as a fail-partial batch: targets are
//! processed one at a time in the given order and a failed target is
//! recorded, never aborting the rest. Code activation and usage retrieval
//! are single calls whose errors are returned to the caller.

use sbxctl_types::{CodeVersion, RealmUsage, Sandbox, SandboxOperation};
use tracing::{error, info};

use crate::{
    api::ApiClient,
    auth::TokenProvider,
    error::{Result, SbxError},
    registry::Registry,
    resolver::latest_code_version_matching,
    timerange::DateRange,
};

/// Result of one operation on one sandbox
#[derive(Debug, Clone)]
pub struct OperationOutcome {
    pub sandbox: Sandbox,
    /// Remote error message, `None` on success
    pub error: Option<String>,
}

impl OperationOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Per-target results of a batch, in dispatch order
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub operation: SandboxOperation,
    pub outcomes: Vec<OperationOutcome>,
}

impl BatchReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &OperationOutcome> {
        self.outcomes.iter().filter(|o| o.is_success())
    }

    pub fn failed(&self) -> impl Iterator<Item = &OperationOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    pub fn has_failures(&self) -> bool {
        self.failed().next().is_some()
    }
}

/// What `activate_code_version` did
#[derive(Debug, Clone, PartialEq)]
pub enum ActivationOutcome {
    /// The matched version was already active; nothing was sent
    AlreadyActive(CodeVersion),
    Activated(CodeVersion),
}

impl ActivationOutcome {
    pub fn version(&self) -> &CodeVersion {
        match self {
            ActivationOutcome::AlreadyActive(version) | ActivationOutcome::Activated(version) => {
                version
            }
        }
    }
}

#[derive(Clone, Copy)]
pub struct Dispatcher<'a> {
    api: &'a ApiClient,
    tokens: TokenProvider<'a>,
    registry: Registry<'a>,
}

impl<'a> Dispatcher<'a> {
    pub fn new(api: &'a ApiClient, tokens: TokenProvider<'a>, registry: Registry<'a>) -> Self {
        Self {
            api,
            tokens,
            registry,
        }
    }

    /// Run `operation` on every target, sequentially.
    ///
    /// Only a failure to obtain a token aborts the batch; remote failures are
    /// reported per target in the returned [`BatchReport`].
    pub async fn dispatch(
        &self,
        operation: SandboxOperation,
        targets: &[Sandbox],
    ) -> Result<BatchReport> {
        let mut outcomes = Vec::with_capacity(targets.len());
        if targets.is_empty() {
            return Ok(BatchReport {
                operation,
                outcomes,
            });
        }

        let token = self.tokens.get_token().await?;
        for sandbox in targets {
            let result = self
                .api
                .sandbox_operation(&token, &sandbox.id, operation)
                .await;
            let error = match result {
                Ok(()) => {
                    info!(sandbox_id = %sandbox.id, host = %sandbox.host_name, %operation, "Operation accepted");
                    None
                }
                Err(e) => {
                    error!(sandbox_id = %sandbox.id, host = %sandbox.host_name, %operation, error = %e, "Operation failed");
                    Some(failure_message(e))
                }
            };
            outcomes.push(OperationOutcome {
                sandbox: sandbox.clone(),
                error,
            });
        }

        Ok(BatchReport {
            operation,
            outcomes,
        })
    }

    /// Activate the most recently modified code version on `host` whose id
    /// contains `find`.
    ///
    /// No match is an error. A match that is already active is reported as
    /// [`ActivationOutcome::AlreadyActive`] without calling the instance.
    pub async fn activate_code_version(&self, host: &str, find: &str) -> Result<ActivationOutcome> {
        let versions = self.registry.get_code_versions(host).await?;
        let version = latest_code_version_matching(find, &versions)
            .cloned()
            .ok_or_else(|| SbxError::CodeVersionNotFound {
                host: host.to_string(),
                find: find.to_string(),
            })?;

        if version.active {
            info!(host, version = %version.id, "Code version already active");
            return Ok(ActivationOutcome::AlreadyActive(version));
        }

        let token = self.tokens.get_token().await?;
        self.api
            .activate_code_version(&token, host, &version.id)
            .await?;
        info!(host, version = %version.id, "Code version activated");
        Ok(ActivationOutcome::Activated(version))
    }

    /// Usage of `realm` over `range`.
    pub async fn realm_usage(&self, realm: &str, range: &DateRange) -> Result<RealmUsage> {
        validate_realm(realm)?;
        let token = self.tokens.get_token().await?;
        self.api
            .realm_usage(&token, realm, range)
            .await
    }
}

/// Realms are exactly four alphanumeric characters
pub fn validate_realm(realm: &str) -> Result<()> {
    if realm.len() == 4 && realm.chars().all(|c| c.is_ascii_alphanumeric()) {
        Ok(())
    } else {
        Err(SbxError::InvalidRealm(realm.to_string()))
    }
}

/// The remote message alone, without the error-kind prefix
fn failure_message(error: SbxError) -> String {
    match error {
        SbxError::Api { message, .. } => message,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_realm() {
        assert!(validate_realm("zzzz").is_ok());
        assert!(validate_realm("ab12").is_ok());
        assert!(matches!(
            validate_realm("zzz"),
            Err(SbxError::InvalidRealm(_))
        ));
        assert!(validate_realm("zzzzz").is_err());
        assert!(validate_realm("zz-z").is_err());
    }

    #[test]
    fn test_failure_message_strips_prefix() {
        assert_eq!(
            failure_message(SbxError::Api {
                status: 400,
                message: "Sandbox is busy".to_string()
            }),
            "Sandbox is busy"
        );
        assert_eq!(
            failure_message(SbxError::Store("x".to_string())),
            "Cache store error: x"
        );
    }
}
