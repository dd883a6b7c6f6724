//! Workflow decision engine
//!
//! Maps a ticket's stage statuses and wait-flags to the single next UI
//! action. The agent pipeline pauses at three human gates (priority
//! confirmation after SLA scoring, email review before evidence goes out,
//! final closure sign-off); those gates pre-empt the coarser status-based
//! cases because the pipeline cannot advance past them on its own.

use crate::model::{StageStatus, Ticket, TicketStatus};
use serde::{Deserialize, Serialize};

/// Stage index checked for the priority gate (SLA Prioritization)
const PRIORITY_STAGE: usize = 2;
/// Stage index checked for the review gate (Evidence Collection)
const REVIEW_STAGE: usize = 5;
/// Stage index checked for the closure gate (Ticket Closure)
const CLOSURE_STAGE: usize = 6;

/// The one action the portal presents for a ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkflowAction {
    /// Confirm the backend-calculated priority to resume the pipeline
    ConfirmPriority,
    /// Review the evidence email and approve sending it
    ReviewAndApprove,
    /// Confirm final ticket closure
    ConfirmClosure,
    /// Kick off agent processing
    StartProcessing,
    /// Pipeline is running, nothing to dispatch
    ProcessingInProgress,
    /// Terminal, nothing to dispatch
    Completed,
}

impl WorkflowAction {
    /// True for the three human-in-the-loop gates
    pub fn is_gate(&self) -> bool {
        matches!(
            self,
            WorkflowAction::ConfirmPriority
                | WorkflowAction::ReviewAndApprove
                | WorkflowAction::ConfirmClosure
        )
    }

    /// True when the action posts a request to the backend
    pub fn is_dispatchable(&self) -> bool {
        !matches!(
            self,
            WorkflowAction::ProcessingInProgress | WorkflowAction::Completed
        )
    }
}

impl std::fmt::Display for WorkflowAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            WorkflowAction::ConfirmPriority => "confirm-priority",
            WorkflowAction::ReviewAndApprove => "review-and-approve",
            WorkflowAction::ConfirmClosure => "confirm-closure",
            WorkflowAction::StartProcessing => "start-processing",
            WorkflowAction::ProcessingInProgress => "processing",
            WorkflowAction::Completed => "completed",
        };
        f.write_str(label)
    }
}

/// Decide the single next action for a ticket. First match wins.
///
/// The backend signals each gate two ways: an explicit `waitingFor*` flag
/// and the position the pipeline stopped at. The flag wins when they
/// disagree; the stage-position check only covers payloads broadcast
/// before the flag landed, and only applies when the ticket carries the
/// full pipeline (shorter stage vectors fall through to the status cases).
pub fn decide_action(ticket: &Ticket) -> WorkflowAction {
    let gated = ticket.stages.len() > CLOSURE_STAGE;

    // 1. Priority gate: SLA stage done but enrichment never started
    if ticket.waiting_for_priority_confirmation
        || (gated
            && ticket.stage_status(PRIORITY_STAGE) == Some(StageStatus::Completed)
            && !matches!(
                ticket.stage_status(PRIORITY_STAGE + 1),
                Some(StageStatus::InProgress) | Some(StageStatus::Completed)
            ))
    {
        return WorkflowAction::ConfirmPriority;
    }

    // 2. Review gate: evidence emails drafted, awaiting approval
    if (gated && ticket.stage_status(REVIEW_STAGE) == Some(StageStatus::InProgress))
        || ticket.waiting_for_review
    {
        return WorkflowAction::ReviewAndApprove;
    }

    // 3. Closure gate
    if (gated && ticket.stage_status(CLOSURE_STAGE) == Some(StageStatus::InProgress))
        || ticket.waiting_for_closure_confirmation
    {
        return WorkflowAction::ConfirmClosure;
    }

    match ticket.status {
        TicketStatus::NotStarted => WorkflowAction::StartProcessing,
        TicketStatus::InProgress => WorkflowAction::ProcessingInProgress,
        TicketStatus::Completed => WorkflowAction::Completed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Priority, Stage};

    fn stage(id: u32, status: StageStatus) -> Stage {
        Stage {
            id,
            name: format!("Stage {id}"),
            status,
            message: String::new(),
        }
    }

    fn ticket_with_stages(statuses: [StageStatus; 8]) -> Ticket {
        Ticket {
            id: "GOV-1".into(),
            title: "t".into(),
            description: "d".into(),
            priority: Priority::Medium,
            status: TicketStatus::InProgress,
            customer: "c".into(),
            created_at: "2026-08-01".into(),
            current_stage: 0,
            stages: statuses
                .iter()
                .enumerate()
                .map(|(i, s)| stage(i as u32 + 1, *s))
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

    fn all_pending() -> Ticket {
        ticket_with_stages([StageStatus::Pending; 8])
    }

    #[test]
    fn test_priority_gate_from_stage_positions() {
        // stages[2] completed, stages[3] pending, flag not yet set
        let mut t = all_pending();
        t.stages[0].status = StageStatus::Completed;
        t.stages[1].status = StageStatus::Completed;
        t.stages[2].status = StageStatus::Completed;
        assert_eq!(decide_action(&t), WorkflowAction::ConfirmPriority);
    }

    #[test]
    fn test_priority_gate_from_flag() {
        let mut t = all_pending();
        t.waiting_for_priority_confirmation = true;
        assert_eq!(decide_action(&t), WorkflowAction::ConfirmPriority);
    }

    #[test]
    fn test_priority_gate_wins_over_other_gates() {
        // Even with every flag raised, the priority gate is first
        let mut t = all_pending();
        t.waiting_for_priority_confirmation = true;
        t.waiting_for_review = true;
        t.waiting_for_closure_confirmation = true;
        assert_eq!(decide_action(&t), WorkflowAction::ConfirmPriority);
    }

    #[test]
    fn test_priority_gate_closes_when_enrichment_starts() {
        let mut t = all_pending();
        t.stages[2].status = StageStatus::Completed;
        t.stages[3].status = StageStatus::InProgress;
        assert_eq!(decide_action(&t), WorkflowAction::ProcessingInProgress);
    }

    #[test]
    fn test_review_gate() {
        let mut t = all_pending();
        t.stages[5].status = StageStatus::InProgress;
        assert_eq!(decide_action(&t), WorkflowAction::ReviewAndApprove);

        let mut t = all_pending();
        t.waiting_for_review = true;
        assert_eq!(decide_action(&t), WorkflowAction::ReviewAndApprove);
    }

    #[test]
    fn test_closure_gate() {
        let mut t = all_pending();
        t.stages[6].status = StageStatus::InProgress;
        assert_eq!(decide_action(&t), WorkflowAction::ConfirmClosure);

        let mut t = all_pending();
        t.waiting_for_closure_confirmation = true;
        assert_eq!(decide_action(&t), WorkflowAction::ConfirmClosure);
    }

    #[test]
    fn test_status_fallbacks() {
        let mut t = all_pending();
        t.status = TicketStatus::NotStarted;
        assert_eq!(decide_action(&t), WorkflowAction::StartProcessing);

        t.status = TicketStatus::InProgress;
        assert_eq!(decide_action(&t), WorkflowAction::ProcessingInProgress);

        t.status = TicketStatus::Completed;
        assert_eq!(decide_action(&t), WorkflowAction::Completed);
    }

    #[test]
    fn test_short_stage_vector_falls_through() {
        // 3-stage ticket with stages[2] completed would look like the
        // priority gate; without the full pipeline it must not gate.
        let mut t = all_pending();
        t.stages.truncate(3);
        t.stages[2].status = StageStatus::Completed;
        t.status = TicketStatus::NotStarted;
        assert_eq!(decide_action(&t), WorkflowAction::StartProcessing);
    }

    #[test]
    fn test_flag_gates_regardless_of_vector_length() {
        let mut t = all_pending();
        t.stages.clear();
        t.waiting_for_review = true;
        assert_eq!(decide_action(&t), WorkflowAction::ReviewAndApprove);
    }

    #[test]
    fn test_exactly_one_action_for_every_ticket() {
        // Totality: decide_action is a plain function over a closed enum;
        // sweep a grid of stage statuses and make sure nothing panics.
        let statuses = [
            StageStatus::Pending,
            StageStatus::InProgress,
            StageStatus::Completed,
            StageStatus::Error,
        ];
        for s2 in statuses {
            for s5 in statuses {
                for s6 in statuses {
                    let mut t = all_pending();
                    t.stages[2].status = s2;
                    t.stages[5].status = s5;
                    t.stages[6].status = s6;
                    let _ = decide_action(&t);
                }
            }
        }
    }

    #[test]
    fn test_gate_classification() {
        assert!(WorkflowAction::ConfirmPriority.is_gate());
        assert!(WorkflowAction::ConfirmClosure.is_gate());
        assert!(!WorkflowAction::StartProcessing.is_gate());
        assert!(WorkflowAction::StartProcessing.is_dispatchable());
        assert!(!WorkflowAction::Completed.is_dispatchable());
    }
}
