//! Analytics commands

use crate::{output::OutputFormat, AnalyticsCommands};
use colored::Colorize;
use govpoint_client::PortalClient;

pub async fn handle(
    action: AnalyticsCommands,
    client: &PortalClient,
    format: OutputFormat,
) -> Result<(), String> {
    match action {
        AnalyticsCommands::Summary => {
            client.refresh().await.map_err(|e| e.to_string())?;
            let summary = client.summary();
            match format {
                OutputFormat::Table => {
                    println!("{}", "Tickets".bold());
                    println!("  total        {}", summary.total);
                    println!("  not started  {}", summary.not_started);
                    println!("  in progress  {}", summary.in_progress);
                    println!("  completed    {}", summary.completed);
                    println!("{}", "Priority".bold());
                    println!("  urgent {}  high {}  medium {}  low {}",
                        summary.urgent, summary.high, summary.medium, summary.low);
                    println!("{}", "Awaiting action".bold());
                    println!("  priority gate  {}", summary.awaiting_priority);
                    println!("  review gate    {}", summary.awaiting_review);
                    println!("  closure gate   {}", summary.awaiting_closure);
                    if summary.with_errors > 0 {
                        println!("{}", format!("  {} with stage errors", summary.with_errors).red());
                    }
                }
                _ => format.print(&summary),
            }
        }
    }
    Ok(())
}
