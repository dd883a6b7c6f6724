//! Ticket commands

use super::{confirm, parse_priority, priority_label, stage_marker, status_label};
use crate::{output::OutputFormat, TicketCommands};
use colored::Colorize;
use govpoint_client::{
    decide_action, PortalClient, StreamNotice, Ticket, WorkflowAction,
};
use serde::Serialize;
use tabled::Tabled;

#[derive(Debug, Serialize, Tabled)]
pub struct TicketRow {
    pub id: String,
    pub category: String,
    pub priority: String,
    pub status: String,
    pub stage: String,
    pub action: String,
    pub title: String,
}

impl From<&Ticket> for TicketRow {
    fn from(ticket: &Ticket) -> Self {
        Self {
            id: ticket.id.clone(),
            category: ticket.category.clone().unwrap_or_else(|| "-".into()),
            priority: ticket.priority.as_str().to_string(),
            status: status_label(ticket.status).to_string(),
            stage: format!("{}/{}", ticket.current_stage + 1, ticket.stages.len()),
            action: decide_action(ticket).to_string(),
            title: ticket.title.clone(),
        }
    }
}

pub async fn handle(
    action: TicketCommands,
    client: &PortalClient,
    format: OutputFormat,
) -> Result<(), String> {
    match action {
        TicketCommands::List => {
            client.refresh().await.map_err(|e| e.to_string())?;
            let tickets = client.store.all();
            let rows: Vec<TicketRow> = tickets.iter().map(TicketRow::from).collect();
            format.print_rows(&rows);
        }
        TicketCommands::Get { id } => {
            let ticket = client.api.fetch_ticket(&id).await.map_err(|e| e.to_string())?;
            match format {
                OutputFormat::Table => print_detail(&ticket),
                _ => format.print(&ticket),
            }
        }
        TicketCommands::Action { id } => {
            let ticket = client.api.fetch_ticket(&id).await.map_err(|e| e.to_string())?;
            let action = decide_action(&ticket);
            println!("{}: {}", ticket.id, action_hint(action));
        }
        TicketCommands::Process { id } => {
            let ticket = fetch_for(client, &id, WorkflowAction::StartProcessing).await?;
            let ack = client
                .dispatcher
                .dispatch(&ticket, WorkflowAction::StartProcessing)
                .await
                .map_err(|e| e.to_string())?;
            println!("{}", ack.message.unwrap_or_else(|| "Processing started".into()));
        }
        TicketCommands::ConfirmPriority { id, priority } => {
            let mut ticket = fetch_for(client, &id, WorkflowAction::ConfirmPriority).await?;
            if let Some(value) = priority {
                ticket.priority = parse_priority(&value)?;
            }
            println!(
                "Confirming priority {} for {}",
                priority_label(ticket.priority),
                ticket.id
            );
            let ack = client
                .dispatcher
                .dispatch(&ticket, WorkflowAction::ConfirmPriority)
                .await
                .map_err(|e| e.to_string())?;
            println!("{}", ack.message.unwrap_or_else(|| "Priority confirmed".into()));
        }
        TicketCommands::ApproveReview { id, yes } => {
            let ticket = fetch_for(client, &id, WorkflowAction::ReviewAndApprove).await?;
            let preview = client.api.email_preview(&ticket).await;
            println!("{}", "Evidence email".bold());
            println!("  To:      {}", preview.to);
            println!("  Subject: {}", preview.subject);
            println!("{}", "---".dimmed());
            println!("{}", preview.body);
            println!("{}", "---".dimmed());
            if !confirm("Approve & send?", yes)? {
                println!("Review left pending");
                return Ok(());
            }
            let ack = client
                .dispatcher
                .dispatch(&ticket, WorkflowAction::ReviewAndApprove)
                .await
                .map_err(|e| e.to_string())?;
            println!("{}", ack.message.unwrap_or_else(|| "Review approved".into()));
        }
        TicketCommands::ConfirmClosure { id, yes } => {
            let ticket = fetch_for(client, &id, WorkflowAction::ConfirmClosure).await?;
            println!(
                "Closing {} will archive the collected evidence and notify the requester.",
                ticket.id
            );
            if !confirm("Confirm closure?", yes)? {
                println!("Closure left pending");
                return Ok(());
            }
            let ack = client
                .dispatcher
                .dispatch(&ticket, WorkflowAction::ConfirmClosure)
                .await
                .map_err(|e| e.to_string())?;
            println!("{}", ack.message.unwrap_or_else(|| "Closure confirmed".into()));
        }
        TicketCommands::Watch => watch(client).await?,
    }
    Ok(())
}

/// Fetch a ticket and warn when the requested action is not the one the
/// workflow engine would present. The backend stays authoritative: the
/// dispatch still goes out and a stale request is rejected server-side.
async fn fetch_for(
    client: &PortalClient,
    id: &str,
    requested: WorkflowAction,
) -> Result<Ticket, String> {
    let ticket = client.api.fetch_ticket(id).await.map_err(|e| e.to_string())?;
    let expected = decide_action(&ticket);
    if expected != requested {
        eprintln!(
            "{}",
            format!("Note: ticket {} currently expects '{}'", id, expected).yellow()
        );
    }
    Ok(ticket)
}

fn print_detail(ticket: &Ticket) {
    println!("{}  {}", ticket.id.bold(), ticket.title);
    println!(
        "  priority: {}   status: {}   customer: {}",
        priority_label(ticket.priority),
        status_label(ticket.status),
        ticket.customer
    );
    println!("  created:  {}", ticket.created_at);
    if let Some(category) = &ticket.category {
        println!("  category: {}", category);
    }
    if let Some(deadline) = &ticket.sla_deadline {
        println!("  SLA:      {}", deadline);
    }
    if let Some(app) = &ticket.application_name {
        println!("  app:      {}", app);
    }
    println!("  next:     {}", action_hint(decide_action(ticket)));
    println!();
    println!("  {}", ticket.description);
    println!();
    for stage in &ticket.stages {
        let line = format!("  {} {}", stage_marker(stage.status), stage.name);
        if stage.message.is_empty() {
            println!("{}", line);
        } else {
            println!("{}  {}", line, stage.message.dimmed());
        }
    }
}

fn action_hint(action: WorkflowAction) -> String {
    match action {
        WorkflowAction::ConfirmPriority => {
            "confirm-priority (run `govpoint tickets confirm-priority <id>`)".into()
        }
        WorkflowAction::ReviewAndApprove => {
            "review-and-approve (run `govpoint tickets approve-review <id>`)".into()
        }
        WorkflowAction::ConfirmClosure => {
            "confirm-closure (run `govpoint tickets confirm-closure <id>`)".into()
        }
        WorkflowAction::StartProcessing => {
            "start-processing (run `govpoint tickets process <id>`)".into()
        }
        WorkflowAction::ProcessingInProgress => "processing, no action needed".into(),
        WorkflowAction::Completed => "completed".into(),
    }
}

async fn watch(client: &PortalClient) -> Result<(), String> {
    let mut notices = client.connect().await.map_err(|e| e.to_string())?;
    println!(
        "Watching {} tickets (Ctrl-C to stop)",
        client.store.len()
    );

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            notice = notices.recv() => {
                let Some(notice) = notice else { break };
                let at = chrono::Local::now().format("%H:%M:%S");
                match notice {
                    StreamNotice::Connected => {
                        println!("{} {}", at, "connected".green());
                    }
                    StreamNotice::Disconnected => {
                        println!("{} {}", at, "disconnected, retrying".red());
                    }
                    StreamNotice::Status(message) => {
                        println!("{} {}", at, message.dimmed());
                    }
                    StreamNotice::TicketChanged(id) => {
                        if let Some(ticket) = client.store.get(&id) {
                            println!(
                                "{} {} stage {}/{} {} next: {}",
                                at,
                                ticket.id.bold(),
                                ticket.current_stage + 1,
                                ticket.stages.len(),
                                status_label(ticket.status),
                                decide_action(&ticket)
                            );
                        }
                    }
                    StreamNotice::Error(message) => {
                        println!("{} {} {}", at, "error:".red(), message);
                    }
                }
            }
        }
    }

    client.shutdown().await;
    Ok(())
}
