//! Ticket KPI aggregation
//!
//! Client-side counterpart of the executive dashboard cards: counts by
//! status, priority, and human gate, computed from the live cache.

use crate::model::{StageStatus, Ticket, TicketStatus};
use crate::workflow::{decide_action, WorkflowAction};
use serde::Serialize;

/// KPI summary over a set of tickets
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TicketSummary {
    pub total: usize,
    pub not_started: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    pub urgent: usize,
    /// Tickets parked at the priority-confirmation gate
    pub awaiting_priority: usize,
    /// Tickets parked at the email-review gate
    pub awaiting_review: usize,
    /// Tickets parked at the closure gate
    pub awaiting_closure: usize,
    /// Tickets with at least one stage in error
    pub with_errors: usize,
}

impl TicketSummary {
    pub fn from_tickets(tickets: &[Ticket]) -> Self {
        let mut summary = Self {
            total: tickets.len(),
            ..Self::default()
        };
        for ticket in tickets {
            match ticket.status {
                TicketStatus::NotStarted => summary.not_started += 1,
                TicketStatus::InProgress => summary.in_progress += 1,
                TicketStatus::Completed => summary.completed += 1,
            }
            match ticket.priority {
                crate::model::Priority::Low => summary.low += 1,
                crate::model::Priority::Medium => summary.medium += 1,
                crate::model::Priority::High => summary.high += 1,
                crate::model::Priority::Urgent => summary.urgent += 1,
            }
            match decide_action(ticket) {
                WorkflowAction::ConfirmPriority => summary.awaiting_priority += 1,
                WorkflowAction::ReviewAndApprove => summary.awaiting_review += 1,
                WorkflowAction::ConfirmClosure => summary.awaiting_closure += 1,
                _ => {}
            }
            if ticket.stages.iter().any(|s| s.status == StageStatus::Error) {
                summary.with_errors += 1;
            }
        }
        summary
    }

    /// Tickets blocked on a human, across all three gates
    pub fn awaiting_action(&self) -> usize {
        self.awaiting_priority + self.awaiting_review + self.awaiting_closure
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Priority, Stage};

    fn ticket(id: &str, status: TicketStatus, priority: Priority) -> Ticket {
        Ticket {
            id: id.into(),
            title: "t".into(),
            description: "d".into(),
            priority,
            status,
            customer: "c".into(),
            created_at: "2026-08-01".into(),
            current_stage: 0,
            stages: (1..=8)
                .map(|i| Stage {
                    id: i,
                    name: format!("Stage {i}"),
                    status: StageStatus::Pending,
                    message: String::new(),
                })
                .collect(),
            waiting_for_review: false,
            waiting_for_priority_confirmation: false,
            waiting_for_closure_confirmation: false,
            category: None,
            sla_deadline: None,
            ait_number: None,
            application_name: None,
            lob_owner: None,
            ait_owner: None,
            arm_id: None,
            deliverable_type: None,
            contacts: vec![],
        }
    }

    #[test]
    fn test_summary_counts() {
        let mut review = ticket("GOV-2", TicketStatus::InProgress, Priority::High);
        review.waiting_for_review = true;
        let mut errored = ticket("GOV-3", TicketStatus::InProgress, Priority::Urgent);
        errored.stages[1].status = StageStatus::Error;

        let tickets = vec![
            ticket("GOV-1", TicketStatus::NotStarted, Priority::Low),
            review,
            errored,
            ticket("GOV-4", TicketStatus::Completed, Priority::Medium),
        ];

        let summary = TicketSummary::from_tickets(&tickets);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.not_started, 1);
        assert_eq!(summary.in_progress, 2);
        assert_eq!(summary.completed, 1);
        assert_eq!(summary.urgent, 1);
        assert_eq!(summary.awaiting_review, 1);
        assert_eq!(summary.awaiting_action(), 1);
        assert_eq!(summary.with_errors, 1);
    }

    #[test]
    fn test_empty_summary() {
        let summary = TicketSummary::from_tickets(&[]);
        assert_eq!(summary, TicketSummary::default());
    }
}
