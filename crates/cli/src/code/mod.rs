//! Code version commands: code-list and code-activate.

use clap::Parser;
use sbxctl_core::ActivationOutcome;

use crate::{Context, output};

#[derive(Parser, PartialEq, Clone, Debug)]
pub struct ListCommand {
    /// Instance host name, or a full base URL
    pub host: String,
}

impl ListCommand {
    pub async fn execute(&self, ctx: &Context) -> Result<(), String> {
        let session = ctx.session()?;
        let versions = session
            .registry()
            .get_code_versions(&self.host)
            .await
            .map_err(|e| format!("Failed to list code versions on {}: {}", self.host, e))?;

        if ctx.json {
            return output::print_json(&versions);
        }
        if versions.is_empty() {
            output::notice(&format!("No code versions on {}", self.host));
            return Ok(());
        }
        output::print_code_versions(&versions);
        Ok(())
    }
}

#[derive(Parser, PartialEq, Clone, Debug)]
pub struct ActivateCommand {
    /// Instance host name, or a full base URL
    pub host: String,

    /// Fragment of the code version id; the most recently modified match wins
    pub code_version: String,
}

impl ActivateCommand {
    pub async fn execute(&self, ctx: &Context) -> Result<(), String> {
        let session = ctx.session()?;
        let outcome = session
            .dispatcher()
            .activate_code_version(&self.host, &self.code_version)
            .await
            .map_err(|e| format!("Failed to activate code version: {}", e))?;

        if ctx.json {
            return output::print_json(&serde_json::json!({
                "host": self.host,
                "codeVersion": outcome.version().id,
                "changed": matches!(outcome, ActivationOutcome::Activated(_)),
            }));
        }

        match outcome {
            ActivationOutcome::AlreadyActive(version) => output::notice(&format!(
                "Code version {} is already active on {}",
                version.id, self.host
            )),
            ActivationOutcome::Activated(version) => output::success(&format!(
                "Activated code version {} on {}",
                version.id, self.host
            )),
        }
        Ok(())
    }
}
