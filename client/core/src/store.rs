//! In-memory ticket cache
//!
//! Ordered collection keyed by ticket id, fed by both REST fetches and
//! streamed updates. The backend owns write authority; this cache only
//! mirrors what it announces, last write wins.

use crate::model::Ticket;
use parking_lot::RwLock;
use std::sync::Arc;

/// Shared ticket cache with an optional current selection
#[derive(Default)]
pub struct TicketStore {
    tickets: Arc<RwLock<Vec<Ticket>>>,
    selected: Arc<RwLock<Option<Ticket>>>,
}

impl TicketStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or update by id. An existing ticket is replaced in place
    /// (position preserved); a new id is appended.
    pub fn upsert(&self, ticket: Ticket) {
        {
            let mut tickets = self.tickets.write();
            match tickets.iter_mut().find(|t| t.id == ticket.id) {
                Some(slot) => *slot = ticket,
                None => tickets.push(ticket),
            }
        }
        self.sync_selection();
    }

    /// Replace the whole cache from a fetch response
    pub fn replace_all(&self, tickets: Vec<Ticket>) {
        *self.tickets.write() = tickets;
        self.sync_selection();
    }

    /// Select a ticket by id; returns the selected ticket when found
    pub fn select(&self, id: &str) -> Option<Ticket> {
        let found = self.get(id);
        *self.selected.write() = found.clone();
        found
    }

    pub fn clear_selection(&self) {
        *self.selected.write() = None;
    }

    /// Current selection, if any
    pub fn selected(&self) -> Option<Ticket> {
        self.selected.read().clone()
    }

    /// Look up a ticket by id
    pub fn get(&self, id: &str) -> Option<Ticket> {
        self.tickets.read().iter().find(|t| t.id == id).cloned()
    }

    /// Snapshot of the full cache, in order
    pub fn all(&self) -> Vec<Ticket> {
        self.tickets.read().clone()
    }

    pub fn len(&self) -> usize {
        self.tickets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.read().is_empty()
    }

    /// Re-resolve the selection against the cache so a detail view never
    /// shows stale stage data after a background update. Structural
    /// inequality triggers the replacement.
    fn sync_selection(&self) {
        let mut selected = self.selected.write();
        if let Some(current) = selected.as_ref() {
            if let Some(fresh) = self.tickets.read().iter().find(|t| t.id == current.id) {
                if fresh != current {
                    *selected = Some(fresh.clone());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Priority, Stage, StageStatus, TicketStatus};

    fn ticket(id: &str, title: &str) -> Ticket {
        Ticket {
            id: id.into(),
            title: title.into(),
            description: "d".into(),
            priority: Priority::Medium,
            status: TicketStatus::NotStarted,
            customer: "c".into(),
            created_at: "2026-08-01".into(),
            current_stage: 0,
            stages: vec![Stage {
                id: 1,
                name: "Ticket Fetching".into(),
                status: StageStatus::Completed,
                message: String::new(),
            }],
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
    fn test_upsert_appends_new_id() {
        let store = TicketStore::new();
        store.upsert(ticket("GOV-1", "first"));
        store.upsert(ticket("GOV-2", "second"));
        assert_eq!(store.len(), 2);
        assert_eq!(store.all()[1].id, "GOV-2");
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let store = TicketStore::new();
        store.upsert(ticket("GOV-1", "first"));
        store.upsert(ticket("GOV-2", "second"));
        store.upsert(ticket("GOV-1", "updated"));
        // Length unchanged, position preserved
        assert_eq!(store.len(), 2);
        assert_eq!(store.all()[0].title, "updated");
        assert_eq!(store.all()[1].id, "GOV-2");
    }

    #[test]
    fn test_selection_resyncs_after_upsert() {
        let store = TicketStore::new();
        store.upsert(ticket("GOV-1", "first"));
        store.select("GOV-1").unwrap();

        let mut updated = ticket("GOV-1", "first");
        updated.status = TicketStatus::InProgress;
        updated.stages[0].message = "running".into();
        store.upsert(updated.clone());

        let selected = store.selected().unwrap();
        assert_eq!(selected, updated);
        assert_eq!(selected, store.get("GOV-1").unwrap());
    }

    #[test]
    fn test_selection_survives_replace_all() {
        let store = TicketStore::new();
        store.upsert(ticket("GOV-1", "first"));
        store.select("GOV-1");

        let mut refreshed = ticket("GOV-1", "renamed");
        refreshed.priority = Priority::Urgent;
        store.replace_all(vec![ticket("GOV-0", "zero"), refreshed]);

        let selected = store.selected().unwrap();
        assert_eq!(selected.title, "renamed");
        assert_eq!(selected.priority, Priority::Urgent);
    }

    #[test]
    fn test_select_unknown_id() {
        let store = TicketStore::new();
        assert!(store.select("GOV-404").is_none());
        assert!(store.selected().is_none());
    }
}
