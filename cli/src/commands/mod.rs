//! CLI Commands

pub mod analytics;
pub mod config;
pub mod tickets;

use colored::{ColoredString, Colorize};
use govpoint_client::{ClientConfig, PortalClient, Priority, StageStatus, TicketStatus};

/// Build the portal client all commands share
pub fn portal_client(portal_url: &str, iam_only: bool) -> PortalClient {
    let config = ClientConfig {
        portal_url: portal_url.to_string(),
        iam_only,
        ..ClientConfig::default()
    };
    PortalClient::new(config)
}

pub fn status_label(status: TicketStatus) -> ColoredString {
    match status {
        TicketStatus::NotStarted => "not-started".dimmed(),
        TicketStatus::InProgress => "in-progress".blue(),
        TicketStatus::Completed => "completed".green(),
    }
}

pub fn priority_label(priority: Priority) -> ColoredString {
    match priority {
        Priority::Low => "low".dimmed(),
        Priority::Medium => "medium".blue(),
        Priority::High => "high".yellow(),
        Priority::Urgent => "urgent".red().bold(),
    }
}

pub fn stage_marker(status: StageStatus) -> ColoredString {
    match status {
        StageStatus::Pending => "○".dimmed(),
        StageStatus::InProgress => "◐".blue(),
        StageStatus::Completed => "●".green(),
        StageStatus::Error => "✗".red(),
    }
}

/// Parse a priority override from the command line
pub fn parse_priority(value: &str) -> Result<Priority, String> {
    match value.to_lowercase().as_str() {
        "low" => Ok(Priority::Low),
        "medium" => Ok(Priority::Medium),
        "high" => Ok(Priority::High),
        "urgent" => Ok(Priority::Urgent),
        other => Err(format!(
            "Invalid priority '{}' (expected low, medium, high, or urgent)",
            other
        )),
    }
}

/// Interactive y/N confirmation, bypassed by --yes
pub fn confirm(prompt: &str, assume_yes: bool) -> Result<bool, String> {
    if assume_yes {
        return Ok(true);
    }
    print!("{} [y/N] ", prompt);
    use std::io::Write;
    std::io::stdout().flush().map_err(|e| e.to_string())?;
    let mut answer = String::new();
    std::io::stdin()
        .read_line(&mut answer)
        .map_err(|e| e.to_string())?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
