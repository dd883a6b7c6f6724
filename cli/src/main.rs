//! Govpoint CLI
//!
//! Command-line interface for the governance ticket portal.
//!
//! # Usage
//!
//! ```bash
//! govpoint tickets list --iam
//! govpoint tickets get GOV-1001
//! govpoint tickets action GOV-1001
//! govpoint tickets process GOV-1001
//! govpoint tickets approve-review GOV-1001 --yes
//! govpoint tickets watch
//! govpoint analytics summary --format json
//! ```

use clap::{Parser, Subcommand};

mod commands;
mod config;
mod output;

#[derive(Parser)]
#[command(name = "govpoint")]
#[command(author = "Govpoint")]
#[command(version = "0.1.0")]
#[command(about = "Governance Ticket Portal CLI", long_about = None)]
struct Cli {
    /// Portal backend base URL
    #[arg(long, env = "GOVPOINT_PORTAL_URL")]
    portal_url: Option<String>,

    /// Only work with the server-side IAM-filtered ticket set
    #[arg(long)]
    iam: bool,

    /// Output format
    #[arg(long, short, default_value = "table")]
    format: output::OutputFormat,

    /// Profile name from config file
    #[arg(long, short)]
    profile: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Track and act on tickets
    Tickets {
        #[command(subcommand)]
        action: TicketCommands,
    },
    /// View KPI summaries
    Analytics {
        #[command(subcommand)]
        action: AnalyticsCommands,
    },
    /// Configure CLI
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum TicketCommands {
    /// List tickets
    List,
    /// Get ticket details
    Get { id: String },
    /// Show the next workflow action for a ticket
    Action { id: String },
    /// Start agent processing
    Process { id: String },
    /// Confirm the calculated priority and resume the pipeline
    ConfirmPriority {
        id: String,
        /// Override the priority to confirm (low/medium/high/urgent)
        #[arg(long)]
        priority: Option<String>,
    },
    /// Review the evidence email and approve sending it
    ApproveReview {
        id: String,
        /// Approve without the interactive prompt
        #[arg(long, short)]
        yes: bool,
    },
    /// Confirm final ticket closure
    ConfirmClosure {
        id: String,
        /// Confirm without the interactive prompt
        #[arg(long, short)]
        yes: bool,
    },
    /// Follow live ticket updates from the event stream
    Watch,
}

#[derive(Subcommand)]
enum AnalyticsCommands {
    /// Ticket counts by status, priority, and gate
    Summary,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Set configuration value
    Set { key: String, value: String },
    /// Get configuration value
    Get { key: String },
    /// List all configuration
    List,
    /// Initialize configuration
    Init,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = config::Config::load(cli.profile.as_deref()).unwrap_or_default();
    let portal_url = cli
        .portal_url
        .or(config.portal_url)
        .unwrap_or_else(|| "http://localhost:8000".into());
    let iam = cli.iam || config.iam_only.unwrap_or(false);

    let client = commands::portal_client(&portal_url, iam);

    let result = match cli.command {
        Commands::Tickets { action } => commands::tickets::handle(action, &client, cli.format).await,
        Commands::Analytics { action } => {
            commands::analytics::handle(action, &client, cli.format).await
        }
        Commands::Config { action } => commands::config::handle(action).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
