//! Portal REST API and action dispatcher
//!
//! Every workflow action is a single request/response exchange with no
//! local retry. Nothing is mutated optimistically: a failed request leaves
//! the ticket cache untouched and the confirmed state only ever arrives
//! through the event stream or a fresh fetch.

use crate::model::{Priority, Ticket};
use crate::workflow::WorkflowAction;
use crate::ClientError;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// Acknowledgment body returned by the action endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct ActionAck {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TicketsResponse {
    #[serde(default)]
    tickets: Vec<Ticket>,
}

#[derive(Debug, Deserialize)]
struct EmailResponse {
    email: EmailPreview,
}

/// Evidence email shown in the review step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailPreview {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Thin JSON client over the portal backend
pub struct PortalApi {
    base_url: String,
    client: reqwest::Client,
}

impl PortalApi {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Fetch the ticket list; `iam_only` selects the server-side filter
    pub async fn fetch_tickets(&self, iam_only: bool) -> Result<Vec<Ticket>, ClientError> {
        let path = if iam_only { "/api/tickets/iam" } else { "/api/tickets" };
        let resp: TicketsResponse = self.get(path).await?;
        Ok(resp.tickets)
    }

    /// Fetch a single ticket by id
    pub async fn fetch_ticket(&self, id: &str) -> Result<Ticket, ClientError> {
        self.get(&format!("/api/tickets/{id}")).await
    }

    /// Kick off agent processing for a ticket
    pub async fn start_processing(&self, id: &str) -> Result<ActionAck, ClientError> {
        self.post(&format!("/api/tickets/{id}/process"), None).await
    }

    /// Confirm the backend-calculated priority and resume the pipeline
    pub async fn confirm_priority(
        &self,
        id: &str,
        priority: Priority,
    ) -> Result<ActionAck, ClientError> {
        let body = serde_json::json!({ "priority": priority.as_str() });
        self.post(&format!("/api/tickets/{id}/confirm-priority"), Some(body))
            .await
    }

    /// Approve the evidence email review
    pub async fn approve_review(&self, id: &str) -> Result<ActionAck, ClientError> {
        self.post(&format!("/api/tickets/{id}/approve-review"), None)
            .await
    }

    /// Confirm final closure
    pub async fn confirm_closure(&self, id: &str) -> Result<ActionAck, ClientError> {
        self.post(&format!("/api/tickets/{id}/confirm-closure"), None)
            .await
    }

    /// Fetch the evidence email preview. The preview is advisory: any
    /// failure degrades to a locally synthesized template instead of an
    /// error, so the review modal always has something to show.
    pub async fn email_preview(&self, ticket: &Ticket) -> EmailPreview {
        match self
            .get::<EmailResponse>(&format!("/api/tickets/{}/email-preview", ticket.id))
            .await
        {
            Ok(resp) => resp.email,
            Err(e) => {
                tracing::debug!("Email preview fetch failed ({}), using fallback", e);
                fallback_email_preview(ticket)
            }
        }
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self.client.get(&url).send().await?;
        Self::decode(resp).await
    }

    async fn post<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<T, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.client.post(&url);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let resp = req.send().await?;
        Self::decode(resp).await
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(ClientError::Request {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }
        Ok(serde_json::from_str(&text)?)
    }
}

/// Pull a human-readable message out of an error body, falling back to the
/// raw body when it is not the expected JSON shape
fn error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["error", "message", "detail"] {
            if let Some(msg) = value.get(key).and_then(|v| v.as_str()) {
                return msg.to_string();
            }
        }
    }
    body.to_string()
}

/// Deterministic preview built from already-known ticket fields
pub fn fallback_email_preview(ticket: &Ticket) -> EmailPreview {
    let to = if ticket.contacts.is_empty() {
        "app.owner@company.com".to_string()
    } else {
        ticket.contacts.join(", ")
    };
    let na = || "N/A".to_string();
    EmailPreview {
        to,
        subject: format!("Evidence Required: {} - {}", ticket.title, ticket.id),
        body: format!(
            "Dear Application Owner,\n\n\
             We are processing ticket {} regarding {}.\n\n\
             Application Details:\n\
             - Application Name: {}\n\
             - AIT Number: {}\n\
             - LOB Owner: {}\n\n\
             We require evidence of the following actions:\n\
             1. User access review\n\
             2. Compliance verification\n\
             3. Security approval\n\n\
             Please provide the requested evidence within 48 hours.\n\n\
             Best regards,\nGovernance Team",
            ticket.id,
            ticket.title,
            ticket.application_name.clone().unwrap_or_else(na),
            ticket.ait_number.clone().unwrap_or_else(na),
            ticket.lob_owner.clone().unwrap_or_else(na),
        ),
    }
}

/// Releases a ticket's pending mark when the dispatch ends, including a
/// dispatch future dropped mid-flight by a consumer timeout.
struct PendingGuard<'a> {
    pending: &'a RwLock<HashSet<String>>,
    id: String,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.pending.write().remove(&self.id);
    }
}

/// Dispatches workflow actions with explicit two-phase state: a ticket with
/// a request in flight is marked pending until the backend acknowledges or
/// rejects it. Confirmed state arrives separately via the stream.
pub struct ActionDispatcher {
    api: Arc<PortalApi>,
    pending: Arc<RwLock<HashSet<String>>>,
}

impl ActionDispatcher {
    pub fn new(api: Arc<PortalApi>) -> Self {
        Self {
            api,
            pending: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    /// True while a dispatch for this ticket awaits acknowledgment
    pub fn is_pending(&self, ticket_id: &str) -> bool {
        self.pending.read().contains(ticket_id)
    }

    /// Dispatch the given action for a ticket. Rejects informational
    /// actions and double-dispatch for a ticket already in flight.
    pub async fn dispatch(
        &self,
        ticket: &Ticket,
        action: WorkflowAction,
    ) -> Result<ActionAck, ClientError> {
        if !action.is_dispatchable() {
            return Err(ClientError::Dispatch(format!(
                "action '{}' is informational, nothing to dispatch",
                action
            )));
        }
        if !self.pending.write().insert(ticket.id.clone()) {
            return Err(ClientError::Dispatch(format!(
                "ticket {} already has a request in flight",
                ticket.id
            )));
        }
        let _guard = PendingGuard {
            pending: &*self.pending,
            id: ticket.id.clone(),
        };

        tracing::info!("Dispatching {} for ticket {}", action, ticket.id);
        let result = match action {
            WorkflowAction::StartProcessing => self.api.start_processing(&ticket.id).await,
            WorkflowAction::ConfirmPriority => {
                self.api.confirm_priority(&ticket.id, ticket.priority).await
            }
            WorkflowAction::ReviewAndApprove => self.api.approve_review(&ticket.id).await,
            WorkflowAction::ConfirmClosure => self.api.confirm_closure(&ticket.id).await,
            WorkflowAction::ProcessingInProgress | WorkflowAction::Completed => unreachable!(),
        };

        match &result {
            Ok(ack) => {
                if let Some(message) = &ack.message {
                    tracing::info!("{}", message);
                }
            }
            Err(e) => tracing::warn!("Dispatch {} for {} failed: {}", action, ticket.id, e),
        }
        result
    }
}
