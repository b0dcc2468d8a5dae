//! Sandbox commands: list, start/stop/restart and s-info.

use clap::Parser;
use console::{Term, style};
use dialoguer::Confirm;
use sbxctl_core::BatchReport;
use sbxctl_types::{Sandbox, SandboxOperation};
use serde::Serialize;

use crate::{Context, output};

#[derive(Parser, PartialEq, Clone, Debug)]
pub struct ListCommand {}

impl ListCommand {
    pub async fn execute(&self, ctx: &Context) -> Result<(), String> {
        let session = ctx.session()?;
        let sandboxes = session
            .registry()
            .get_sandboxes(true)
            .await
            .map_err(|e| format!("Failed to list sandboxes: {}", e))?;

        if ctx.json {
            return output::print_json(&sandboxes);
        }
        if sandboxes.is_empty() {
            output::notice("No sandboxes found");
            return Ok(());
        }
        output::print_sandboxes(&sandboxes);
        Ok(())
    }
}

#[derive(Parser, PartialEq, Clone, Debug)]
pub struct OperateCommand {
    /// Host name fragment or exact sandbox id
    pub sandbox: String,
}

impl OperateCommand {
    pub async fn execute(&self, operation: SandboxOperation, ctx: &Context) -> Result<(), String> {
        let session = ctx.session()?;
        let targets = session
            .resolver()
            .resolve(&self.sandbox)
            .await
            .map_err(|e| format!("Failed to resolve '{}': {}", self.sandbox, e))?;

        if let Some(message) = nothing_to_do(&self.sandbox, operation, &targets) {
            output::notice(&message);
            return Ok(());
        }

        if !confirm_batch(operation, &targets, ctx)? {
            output::notice("Aborted");
            return Ok(());
        }

        let report = session
            .dispatcher()
            .dispatch(operation, &targets)
            .await
            .map_err(|e| format!("Failed to {} sandboxes: {}", operation, e))?;

        if ctx.json {
            output::print_json(&BatchSummary::from(&report))?;
        } else {
            print_report(&report);
        }

        batch_status(&report)
    }
}

/// Notice for a query that matched nothing; zero matches is not an error
fn nothing_to_do(find: &str, operation: SandboxOperation, targets: &[Sandbox]) -> Option<String> {
    targets
        .is_empty()
        .then(|| format!("No sandbox matches '{find}', nothing to {operation}"))
}

/// Exit status of a finished batch: any failed target fails the command
fn batch_status(report: &BatchReport) -> Result<(), String> {
    let failed = report.failed().count();
    if failed > 0 {
        return Err(format!(
            "{} of {} sandbox(es) failed to {}",
            failed,
            report.outcomes.len(),
            report.operation
        ));
    }
    Ok(())
}

/// Ask before touching several sandboxes at once
fn confirm_batch(
    operation: SandboxOperation,
    targets: &[Sandbox],
    ctx: &Context,
) -> Result<bool, String> {
    if targets.len() < 2 || ctx.assume_yes || !Term::stderr().is_term() {
        return Ok(true);
    }

    println!(
        "{} sandboxes match:",
        style(targets.len()).bold()
    );
    for sandbox in targets {
        println!(
            "  {} ({})",
            sandbox.host_name,
            output::styled_state(&sandbox.state)
        );
    }

    Confirm::new()
        .with_prompt(format!("{} all of them?", capitalize(operation.as_str())))
        .default(false)
        .interact()
        .map_err(|e| format!("Failed to get user input: {}", e))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn print_report(report: &BatchReport) {
    for outcome in &report.outcomes {
        match &outcome.error {
            None => output::success(&format!(
                "{} {} ({})",
                report.operation, outcome.sandbox.host_name, outcome.sandbox.id
            )),
            Some(error) => output::failure(&format!(
                "{} {} ({}): {}",
                report.operation, outcome.sandbox.host_name, outcome.sandbox.id, error
            )),
        }
    }
}

#[derive(Debug, Serialize)]
struct BatchSummary<'a> {
    operation: SandboxOperation,
    results: Vec<OutcomeSummary<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OutcomeSummary<'a> {
    id: &'a str,
    host_name: &'a str,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

impl<'a> From<&'a BatchReport> for BatchSummary<'a> {
    fn from(report: &'a BatchReport) -> Self {
        BatchSummary {
            operation: report.operation,
            results: report
                .outcomes
                .iter()
                .map(|outcome| OutcomeSummary {
                    id: &outcome.sandbox.id,
                    host_name: &outcome.sandbox.host_name,
                    success: outcome.is_success(),
                    error: outcome.error.as_deref(),
                })
                .collect(),
        }
    }
}

#[derive(Parser, PartialEq, Clone, Debug)]
pub struct InfoCommand {
    /// Host name fragment or exact sandbox id
    pub sandbox: String,
}

impl InfoCommand {
    pub async fn execute(&self, ctx: &Context) -> Result<(), String> {
        let session = ctx.session()?;
        let matches = session
            .resolver()
            .resolve(&self.sandbox)
            .await
            .map_err(|e| format!("Failed to resolve '{}': {}", self.sandbox, e))?;

        if matches.is_empty() {
            if ctx.json {
                return output::print_json(&matches);
            }
            output::notice(&format!("No sandbox matches '{}'", self.sandbox));
            return Ok(());
        }

        let mut details = Vec::with_capacity(matches.len());
        for sandbox in &matches {
            let detail = session
                .registry()
                .get_sandbox(&sandbox.id)
                .await
                .map_err(|e| format!("Failed to fetch sandbox {}: {}", sandbox.host_name, e))?;
            details.push(detail);
        }

        if ctx.json {
            return output::print_json(&details);
        }
        for (i, detail) in details.iter().enumerate() {
            if i > 0 {
                println!();
            }
            output::print_sandbox_detail(detail);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use sbxctl_core::OperationOutcome;

    use super::*;

    fn sandbox(id: &str) -> Sandbox {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "hostName": format!("zzzz-{id}.dx"),
            "state": "started"
        }))
        .unwrap()
    }

    fn report(operation: SandboxOperation, errors: &[Option<&str>]) -> BatchReport {
        BatchReport {
            operation,
            outcomes: errors
                .iter()
                .enumerate()
                .map(|(i, error)| OperationOutcome {
                    sandbox: sandbox(&format!("s{}", i + 1)),
                    error: error.map(str::to_string),
                })
                .collect(),
        }
    }

    #[test]
    fn test_batch_status_all_succeeded() {
        let report = report(SandboxOperation::Start, &[None, None, None]);
        assert_eq!(batch_status(&report), Ok(()));
    }

    #[test]
    fn test_batch_status_fails_on_any_failed_target() {
        let report = report(
            SandboxOperation::Stop,
            &[None, Some("Sandbox is busy"), None, None],
        );
        assert_eq!(
            batch_status(&report),
            Err("1 of 4 sandbox(es) failed to stop".to_string())
        );
    }

    #[test]
    fn test_empty_match_is_a_notice_not_an_error() {
        let message = nothing_to_do("zzzz-x", SandboxOperation::Restart, &[]).unwrap();
        assert_eq!(message, "No sandbox matches 'zzzz-x', nothing to restart");
        assert!(nothing_to_do("zzzz", SandboxOperation::Restart, &[sandbox("s1")]).is_none());

        // an empty batch never fails the command
        assert_eq!(batch_status(&report(SandboxOperation::Restart, &[])), Ok(()));
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("restart"), "Restart");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_batch_summary_json() {
        let report = BatchReport {
            operation: SandboxOperation::Stop,
            outcomes: vec![
                OperationOutcome {
                    sandbox: sandbox("s1"),
                    error: None,
                },
                OperationOutcome {
                    sandbox: sandbox("s2"),
                    error: Some("Sandbox is busy".to_string()),
                },
            ],
        };

        let json = serde_json::to_value(BatchSummary::from(&report)).unwrap();
        assert_eq!(json["operation"], "stop");
        assert_eq!(json["results"][0]["hostName"], "zzzz-s1.dx");
        assert_eq!(json["results"][0]["success"], true);
        assert!(json["results"][0].get("error").is_none());
        assert_eq!(json["results"][1]["error"], "Sandbox is busy");
    }
}
