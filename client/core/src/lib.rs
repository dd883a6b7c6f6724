//! Govpoint Client - Governance Ticket Portal Client Core
//!
//! Real-time client for the governance ticket portal: tracks tickets over
//! the backend event stream, decides the next human-in-the-loop workflow
//! action per ticket, and dispatches approvals and confirmations.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                        GOVPOINT CLIENT                           │
//! │                                                                  │
//! │  ┌────────────┐  ┌────────────┐  ┌────────────┐  ┌────────────┐ │
//! │  │   Event    │  │   Ticket   │  │  Workflow  │  │   Action   │ │
//! │  │   Stream   │  │   Store    │  │  Decision  │  │ Dispatcher │ │
//! │  │ (WS+retry) │  │  (cache)   │  │  (5 gates) │  │ (REST/ack) │ │
//! │  └─────┬──────┘  └─────┬──────┘  └─────┬──────┘  └─────┬──────┘ │
//! │        │               │               │               │        │
//! │  ┌─────▼───────────────▼───────────────▼───────────────▼──────┐ │
//! │  │                       PortalClient                         │ │
//! │  └────────────────────────────────────────────────────────────┘ │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![allow(dead_code)]

pub mod actions;
pub mod analytics;
pub mod config;
pub mod model;
pub mod store;
pub mod stream;
pub mod workflow;

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;

pub use actions::{ActionDispatcher, EmailPreview, PortalApi};
pub use analytics::TicketSummary;
pub use config::ClientConfig;
pub use model::{Priority, Stage, StageStatus, Ticket, TicketStatus};
pub use store::TicketStore;
pub use stream::{EventStreamClient, StreamNotice};
pub use workflow::{decide_action, WorkflowAction};

/// Client error types
#[derive(Debug, Error)]
pub enum ClientError {
    /// Event stream connection failure
    #[error("connection error: {0}")]
    Connection(String),
    /// Event stream protocol failure
    #[error("stream error: {0}")]
    Stream(String),
    /// Backend rejected a request with a non-success status
    #[error("request failed ({status}): {message}")]
    Request {
        /// HTTP status code
        status: u16,
        /// Message extracted from the error body
        message: String,
    },
    /// HTTP transport failure
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    /// JSON decoding failure
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
    /// Configuration failure
    #[error("config error: {0}")]
    Config(String),
    /// Dispatch rejected before any request went out
    #[error("dispatch error: {0}")]
    Dispatch(String),
}

/// Connection state of the event stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No live connection, no reconnect pending
    Disconnected,
    /// Connection attempt in flight
    Connecting,
    /// Stream established
    Connected,
}

/// Main portal client
pub struct PortalClient {
    /// Portal REST API
    pub api: Arc<PortalApi>,
    /// Ticket cache
    pub store: Arc<TicketStore>,
    /// Event stream connection
    pub stream: Arc<EventStreamClient>,
    /// Action dispatcher
    pub dispatcher: Arc<ActionDispatcher>,
    config: ClientConfig,
}

impl PortalClient {
    /// Create a new client from configuration
    pub fn new(config: ClientConfig) -> Self {
        let api = Arc::new(PortalApi::new(&config.portal_url));
        let store = Arc::new(TicketStore::new());
        let stream = Arc::new(EventStreamClient::new(
            config.stream_url(),
            Duration::from_secs(config.reconnect_delay_secs),
            Arc::clone(&store),
        ));
        let dispatcher = Arc::new(ActionDispatcher::new(Arc::clone(&api)));
        Self {
            api,
            store,
            stream,
            dispatcher,
            config,
        }
    }

    /// Populate the cache via the REST fetch and open the event stream.
    /// The fetch owns initial population so the IAM filter is respected;
    /// the stream keeps the cache current afterwards.
    pub async fn connect(&self) -> Result<mpsc::Receiver<StreamNotice>, ClientError> {
        tracing::info!("Connecting to portal at {}", self.config.portal_url);
        let notices = self.stream.start();
        self.refresh().await?;
        Ok(notices)
    }

    /// Refetch the ticket list and refresh the cache
    pub async fn refresh(&self) -> Result<usize, ClientError> {
        let tickets = self.api.fetch_tickets(self.config.iam_only).await?;
        let count = tickets.len();
        self.store.replace_all(tickets);
        tracing::info!("Loaded {} tickets", count);
        Ok(count)
    }

    /// The next action the portal should present for a ticket
    pub fn next_action(&self, ticket: &Ticket) -> WorkflowAction {
        decide_action(ticket)
    }

    /// KPI summary over the current cache
    pub fn summary(&self) -> TicketSummary {
        TicketSummary::from_tickets(&self.store.all())
    }

    /// Connection state of the event stream
    pub fn connection_state(&self) -> ConnectionState {
        self.stream.state()
    }

    /// Client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Tear down the stream connection and any pending reconnect
    pub async fn shutdown(&self) {
        tracing::info!("Shutting down portal client");
        self.stream.stop().await;
    }
}
