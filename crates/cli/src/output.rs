//! Console presentation: aligned tables, detail blocks and JSON.

use chrono::{DateTime, Utc};
use console::{StyledObject, style};
use sbxctl_types::{CodeVersion, Sandbox, SandboxState};
use serde::Serialize;

/// Column-aligned plain text table
pub struct Table {
    headers: Vec<&'static str>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<&'static str>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    /// Header line followed by one line per row
    pub fn render(&self) -> Vec<String> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.len()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if let Some(width) = widths.get_mut(i) {
                    *width = (*width).max(cell.chars().count());
                }
            }
        }

        let line = |cells: Vec<&str>| {
            cells
                .iter()
                .zip(&widths)
                .map(|(cell, &width)| format!("{cell:<width$}"))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        let mut lines = vec![line(self.headers.clone())];
        for row in &self.rows {
            lines.push(line(row.iter().map(String::as_str).collect()));
        }
        lines
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to serialize output: {}", e))?;
    println!("{}", json);
    Ok(())
}

pub fn format_timestamp(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

pub fn styled_state(state: &SandboxState) -> StyledObject<&str> {
    let text = style(state.as_str());
    match state {
        SandboxState::Started => text.green(),
        SandboxState::Stopped => text.red(),
        SandboxState::Transitional(_) => text.yellow(),
    }
}

pub fn sandbox_table(sandboxes: &[Sandbox]) -> Table {
    let mut table = Table::new(vec!["HOST", "STATE", "REALM", "ID", "CREATED"]);
    for sandbox in sandboxes {
        table.push(vec![
            sandbox.host_name.clone(),
            sandbox.state.to_string(),
            sandbox.realm.clone(),
            sandbox.id.clone(),
            format_timestamp(sandbox.created_at),
        ]);
    }
    table
}

pub fn print_sandboxes(sandboxes: &[Sandbox]) {
    let lines = sandbox_table(sandboxes).render();
    if let Some((header, rows)) = lines.split_first() {
        println!("{}", style(header).bold());
        for row in rows {
            println!("{}", row);
        }
    }
    println!("\n{} sandbox(es)", sandboxes.len());
}

pub fn print_sandbox_detail(sandbox: &Sandbox) {
    println!("{}", style(&sandbox.host_name).bold().cyan());
    println!("  {} {}", style("ID:").bold(), sandbox.id);
    println!("  {} {}", style("State:").bold(), styled_state(&sandbox.state));
    println!("  {} {}", style("Realm:").bold(), sandbox.realm);
    if let Some(instance) = &sandbox.instance {
        println!("  {} {}", style("Instance:").bold(), instance);
    }
    println!(
        "  {} {}",
        style("Created:").bold(),
        format_timestamp(sandbox.created_at)
    );
    if let Some(created_by) = &sandbox.created_by {
        println!("  {} {}", style("Created by:").bold(), created_by);
    }
    if !sandbox.links.is_empty() {
        println!("  {}", style("Links:").bold());
        for (name, link) in &sandbox.links {
            let link = link
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| link.to_string());
            println!("    {} {}", style(format!("{name}:")).dim(), link);
        }
    }
}

pub fn code_version_table(versions: &[CodeVersion]) -> Table {
    let mut table = Table::new(vec!["", "ID", "LAST MODIFIED", "ACTIVATED"]);
    for version in versions {
        table.push(vec![
            if version.active { "*" } else { "" }.to_string(),
            version.id.clone(),
            format_timestamp(version.last_modified),
            format_timestamp(version.activation_time),
        ]);
    }
    table
}

pub fn print_code_versions(versions: &[CodeVersion]) {
    let lines = code_version_table(versions).render();
    let Some((header, rows)) = lines.split_first() else {
        return;
    };
    println!("{}", style(header).bold());
    for (row, version) in rows.iter().zip(versions) {
        if version.active {
            println!("{}", style(row).green());
        } else {
            println!("{}", row);
        }
    }
}

/// A yellow notice on stdout for "nothing happened" outcomes
pub fn notice(message: &str) {
    println!("{} {}", style("-").yellow(), message);
}

pub fn success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

pub fn failure(message: &str) {
    println!("{} {}", style("✗").red(), message);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sandbox(id: &str, host_name: &str, state: &str) -> Sandbox {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "hostName": host_name,
            "realm": "zzzz",
            "state": state
        }))
        .unwrap()
    }

    #[test]
    fn test_table_columns_are_aligned() {
        let table = sandbox_table(&[
            sandbox("a1", "zzzz-001.dx", "started"),
            sandbox("b22", "zzzz-0002.dx", "stopping"),
        ]);
        let lines = table.render();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("HOST          STATE"));
        assert!(lines[1].starts_with("zzzz-001.dx   started "));
        assert!(lines[2].starts_with("zzzz-0002.dx  stopping"));
        // created_at is missing
        assert!(lines[1].ends_with('-'));
    }

    #[test]
    fn test_active_code_version_is_marked() {
        let versions: Vec<CodeVersion> = serde_json::from_value(serde_json::json!([
            { "id": "v1", "active": false },
            { "id": "v2", "active": true, "last_modification_time": "2024-03-01T10:30:00Z" }
        ]))
        .unwrap();
        let lines = code_version_table(&versions).render();
        assert!(lines[1].starts_with("   v1"));
        assert!(lines[2].starts_with("*  v2  2024-03-01 10:30"));
    }
}
