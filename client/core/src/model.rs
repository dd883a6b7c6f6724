//! Ticket wire model
//!
//! Field names match the portal backend's JSON payloads (camelCase).
//! Tickets arrive over the REST fetch and the event stream; the client
//! never constructs one from scratch.

use serde::{Deserialize, Serialize};

/// Ticket priority / risk level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    /// Lowercase wire spelling, as the confirm-priority endpoint expects
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }
}

/// Overall ticket processing status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TicketStatus {
    NotStarted,
    InProgress,
    Completed,
}

/// Status of a single pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageStatus {
    Pending,
    InProgress,
    Completed,
    Error,
}

/// One step of the agent pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub id: u32,
    pub name: String,
    pub status: StageStatus,
    #[serde(default)]
    pub message: String,
}

/// Governance ticket as announced by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: String,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub status: TicketStatus,
    pub customer: String,
    /// Creation timestamp, backend-formatted string
    pub created_at: String,
    /// Zero-based index of the active (or most recently touched) stage
    pub current_stage: usize,
    /// Ordered pipeline; the workflow gates assume the full 8-stage pipeline
    pub stages: Vec<Stage>,
    #[serde(default)]
    pub waiting_for_review: bool,
    #[serde(default)]
    pub waiting_for_priority_confirmation: bool,
    #[serde(default)]
    pub waiting_for_closure_confirmation: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sla_deadline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ait_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lob_owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ait_owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arm_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deliverable_type: Option<String>,
    #[serde(default)]
    pub contacts: Vec<String>,
}

impl Ticket {
    /// Status of the stage at `index`, if the pipeline carries one there
    pub fn stage_status(&self, index: usize) -> Option<StageStatus> {
        self.stages.get(index).map(|s| s.status)
    }

    /// True when the ticket is parked at any human-confirmation gate
    pub fn at_gate(&self) -> bool {
        self.waiting_for_review
            || self.waiting_for_priority_confirmation
            || self.waiting_for_closure_confirmation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticket_wire_roundtrip() {
        let json = r#"{
            "id": "GOV-1001",
            "title": "Access review for payroll app",
            "description": "Quarterly IAM access review",
            "priority": "high",
            "status": "in-progress",
            "customer": "Jordan Blake",
            "createdAt": "2026-08-01",
            "currentStage": 2,
            "category": "IAM",
            "waitingForPriorityConfirmation": true,
            "contacts": ["owner@example.com"],
            "stages": [
                {"id": 1, "name": "Ticket Fetching", "status": "completed", "message": "ok"},
                {"id": 2, "name": "Category Check", "status": "completed", "message": ""},
                {"id": 3, "name": "SLA Prioritization", "status": "completed", "message": ""}
            ]
        }"#;

        let ticket: Ticket = serde_json::from_str(json).unwrap();
        assert_eq!(ticket.priority, Priority::High);
        assert_eq!(ticket.status, TicketStatus::InProgress);
        assert_eq!(ticket.current_stage, 2);
        assert!(ticket.waiting_for_priority_confirmation);
        assert!(!ticket.waiting_for_review);
        assert_eq!(ticket.stage_status(1), Some(StageStatus::Completed));
        assert_eq!(ticket.stage_status(7), None);
        assert!(ticket.at_gate());

        // Flags serialize back in camelCase
        let out = serde_json::to_value(&ticket).unwrap();
        assert_eq!(out["waitingForPriorityConfirmation"], true);
        assert_eq!(out["createdAt"], "2026-08-01");
    }

    #[test]
    fn test_missing_optionals_default() {
        let json = r#"{
            "id": "GOV-2",
            "title": "t",
            "description": "d",
            "priority": "low",
            "status": "not-started",
            "customer": "c",
            "createdAt": "2026-08-02",
            "currentStage": 0,
            "stages": []
        }"#;
        let ticket: Ticket = serde_json::from_str(json).unwrap();
        assert!(!ticket.at_gate());
        assert!(ticket.contacts.is_empty());
        assert!(ticket.category.is_none());
    }
}
