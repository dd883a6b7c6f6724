//! Event stream client
//!
//! Maintains one WebSocket connection to the portal backend, parses the
//! tagged JSON envelopes it broadcasts, and routes them into the ticket
//! cache and the transient status line. On any drop it schedules exactly
//! one reconnect after a fixed delay, forever, until `stop()`.

use crate::model::Ticket;
use crate::store::TicketStore;
use crate::{ClientError, ConnectionState};
use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use parking_lot::RwLock;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

/// Wire envelope broadcast by the backend, tagged by `type`
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Connection greeting; informational only. The HTTP fetch owns initial
    /// cache population so the server-side IAM filter is respected.
    InitialState {
        #[serde(default)]
        tickets: Vec<Ticket>,
    },
    /// Authoritative ticket snapshot; upsert into the cache
    TicketUpdate { ticket: Ticket },
    /// Pipeline kicked off; status line only
    ProcessingStart { message: String },
    /// One stage reported progress; status line only
    StageUpdate { stage: String, message: String },
    /// Pipeline finished; may carry the final ticket snapshot
    ProcessingComplete {
        message: String,
        #[serde(default)]
        ticket: Option<Ticket>,
    },
    /// Backend-side failure; surfaced, never mutates the cache
    Error { message: String },
}

/// Transient status line shown alongside the ticket list
#[derive(Debug, Clone, PartialEq)]
pub struct StatusLine {
    pub message: String,
    pub at: DateTime<Utc>,
}

impl StatusLine {
    fn now(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            at: Utc::now(),
        }
    }
}

/// Notices forwarded to the presentation layer (`watch` command)
#[derive(Debug, Clone, PartialEq)]
pub enum StreamNotice {
    Connected,
    Disconnected,
    Status(String),
    TicketChanged(String),
    Error(String),
}

/// Routes parsed envelopes into shared client state
#[derive(Clone)]
pub(crate) struct StreamRouter {
    pub store: Arc<TicketStore>,
    pub status: Arc<RwLock<Option<StatusLine>>>,
    pub notices: mpsc::Sender<StreamNotice>,
}

impl StreamRouter {
    fn set_status(&self, message: String) {
        let _ = self.notices.try_send(StreamNotice::Status(message.clone()));
        *self.status.write() = Some(StatusLine::now(message));
    }

    /// Transport-level failure. Users get a connection indicator and a
    /// status line, never an error alert, and the cache is untouched;
    /// the reconnect loop owns recovery.
    fn connection_lost(&self, err: ClientError) {
        tracing::warn!("{}", err);
        *self.status.write() = Some(StatusLine::now(err.to_string()));
    }

    fn apply_ticket(&self, ticket: Ticket) {
        let id = ticket.id.clone();
        self.store.upsert(ticket);
        let _ = self.notices.try_send(StreamNotice::TicketChanged(id));
    }

    /// Handle one raw frame. A message that fails to parse is dropped;
    /// it must never take the connection down.
    pub(crate) fn route_text(&self, text: &str) {
        match serde_json::from_str::<StreamEvent>(text) {
            Ok(event) => self.route(event),
            Err(e) => tracing::warn!("Dropping malformed stream message: {}", e),
        }
    }

    pub(crate) fn route(&self, event: StreamEvent) {
        match event {
            StreamEvent::InitialState { tickets } => {
                tracing::debug!("Initial state received ({} tickets), cache untouched", tickets.len());
            }
            StreamEvent::TicketUpdate { ticket } => {
                tracing::debug!("Ticket update for {}", ticket.id);
                self.apply_ticket(ticket);
            }
            StreamEvent::ProcessingStart { message } => {
                self.set_status(message);
            }
            StreamEvent::StageUpdate { stage, message } => {
                self.set_status(format!("{}: {}", stage, message));
            }
            StreamEvent::ProcessingComplete { message, ticket } => {
                self.set_status(message);
                if let Some(ticket) = ticket {
                    self.apply_ticket(ticket);
                }
            }
            StreamEvent::Error { message } => {
                tracing::warn!("Backend error event: {}", message);
                self.set_status(format!("Error: {}", message));
                let _ = self.notices.try_send(StreamNotice::Error(message));
            }
        }
    }
}

/// Persistent event stream connection with auto-reconnect
pub struct EventStreamClient {
    ws_url: String,
    reconnect_delay: Duration,
    store: Arc<TicketStore>,
    state: Arc<RwLock<ConnectionState>>,
    status: Arc<RwLock<Option<StatusLine>>>,
    shutdown: RwLock<Option<watch::Sender<bool>>>,
    task: RwLock<Option<JoinHandle<()>>>,
}

impl EventStreamClient {
    pub fn new(ws_url: String, reconnect_delay: Duration, store: Arc<TicketStore>) -> Self {
        Self {
            ws_url,
            reconnect_delay,
            store,
            state: Arc::new(RwLock::new(ConnectionState::Disconnected)),
            status: Arc::new(RwLock::new(None)),
            shutdown: RwLock::new(None),
            task: RwLock::new(None),
        }
    }

    /// Current connection state
    pub fn state(&self) -> ConnectionState {
        *self.state.read()
    }

    /// Last transient status line, if any
    pub fn status(&self) -> Option<StatusLine> {
        self.status.read().clone()
    }

    /// Open the connection and keep it alive until `stop()`. Returns a
    /// receiver for presentation-layer notices. Calling `start` again
    /// replaces the previous connection.
    pub fn start(&self) -> mpsc::Receiver<StreamNotice> {
        self.abort_task();

        let (notice_tx, notice_rx) = mpsc::channel(256);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let router = StreamRouter {
            store: Arc::clone(&self.store),
            status: Arc::clone(&self.status),
            notices: notice_tx,
        };

        let ws_url = self.ws_url.clone();
        let delay = self.reconnect_delay;
        let state = Arc::clone(&self.state);
        let handle = tokio::spawn(async move {
            run_loop(ws_url, delay, state, router, shutdown_rx).await;
        });

        *self.shutdown.write() = Some(shutdown_tx);
        *self.task.write() = Some(handle);
        notice_rx
    }

    /// Tear the connection down deterministically, cancelling any pending
    /// reconnect timer.
    pub async fn stop(&self) {
        let shutdown = self.shutdown.write().take();
        let task = self.task.write().take();
        if let Some(tx) = shutdown {
            let _ = tx.send(true);
        }
        if let Some(handle) = task {
            let _ = handle.await;
        }
        *self.state.write() = ConnectionState::Disconnected;
    }

    fn abort_task(&self) {
        if let Some(tx) = self.shutdown.write().take() {
            let _ = tx.send(true);
        }
        if let Some(handle) = self.task.write().take() {
            handle.abort();
        }
    }
}

async fn run_loop(
    ws_url: String,
    reconnect_delay: Duration,
    state: Arc<RwLock<ConnectionState>>,
    router: StreamRouter,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        *state.write() = ConnectionState::Connecting;
        tracing::info!("Connecting to event stream at {}", ws_url);

        match connect_async(ws_url.as_str()).await {
            Ok((mut ws, _)) => {
                *state.write() = ConnectionState::Connected;
                let _ = router.notices.try_send(StreamNotice::Connected);
                tracing::info!("Event stream connected");

                loop {
                    tokio::select! {
                        _ = shutdown.changed() => {
                            let _ = ws.close(None).await;
                            return;
                        }
                        msg = ws.next() => match msg {
                            Some(Ok(Message::Text(text))) => router.route_text(&text),
                            Some(Ok(Message::Close(_))) | None => break,
                            Some(Ok(_)) => {}
                            Some(Err(e)) => {
                                router.connection_lost(ClientError::Stream(e.to_string()));
                                break;
                            }
                        }
                    }
                }
            }
            Err(e) => {
                router.connection_lost(ClientError::Connection(e.to_string()));
            }
        }

        *state.write() = ConnectionState::Disconnected;
        let _ = router.notices.try_send(StreamNotice::Disconnected);

        // Exactly one pending reconnect at a time, fixed delay, no ceiling
        tracing::info!("Reconnecting in {:?}", reconnect_delay);
        tokio::select! {
            _ = shutdown.changed() => return,
            _ = tokio::time::sleep(reconnect_delay) => {}
        }
    }
}
