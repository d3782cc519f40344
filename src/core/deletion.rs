//! Two-state deletion flow: offer a bounded list of recent entries, then
//! resolve exactly one selection (or a cancel) against the store.

use serde::Serialize;
use tracing::{debug, info};

use crate::{
    domain::{Displayable, Expense, Period},
    errors::LedgerError,
    storage::{LedgerStore, Result},
};

/// One entry offered for deletion, tagged with its own record id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub id: i64,
    pub label: String,
}

/// Terminal outcome of a deletion flow.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Deleted(Expense),
    /// The id vanished between listing and selection; nothing was removed.
    NotFound(i64),
    Cancelled,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectorState {
    Listing {
        period: Period,
        candidates: Vec<Candidate>,
        /// More entries matched the window than were offered.
        truncated: bool,
    },
    Resolved(Resolution),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeletionSelector {
    state: SelectorState,
}

impl DeletionSelector {
    /// Starts in `Listing` with at most `limit` of the newest `expenses`.
    /// `expenses` must already be newest first, as the store returns them.
    pub fn list(period: Period, expenses: &[Expense], limit: usize) -> Self {
        let candidates: Vec<Candidate> = expenses
            .iter()
            .take(limit)
            .map(|expense| Candidate {
                id: expense.id,
                label: format!("{} ({})", expense.display_label(), expense.category),
            })
            .collect();
        debug!(
            %period,
            offered = candidates.len(),
            matched = expenses.len(),
            "listing deletion candidates"
        );
        Self {
            state: SelectorState::Listing {
                period,
                truncated: expenses.len() > candidates.len(),
                candidates,
            },
        }
    }

    pub fn state(&self) -> &SelectorState {
        &self.state
    }

    pub fn candidates(&self) -> &[Candidate] {
        match &self.state {
            SelectorState::Listing { candidates, .. } => candidates,
            SelectorState::Resolved(_) => &[],
        }
    }

    /// More entries matched the window than the list offers.
    pub fn is_truncated(&self) -> bool {
        matches!(self.state, SelectorState::Listing { truncated: true, .. })
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.state, SelectorState::Resolved(_))
    }

    pub fn offers(&self, id: i64) -> bool {
        self.candidates().iter().any(|c| c.id == id)
    }

    /// Resolves the flow by deleting candidate `id`. Ids that were never
    /// offered are rejected and leave the selector listing.
    pub fn select<S>(&mut self, id: i64, store: &S) -> Result<Resolution>
    where
        S: LedgerStore + ?Sized,
    {
        if self.is_resolved() {
            return Err(LedgerError::InvalidSelection(
                "deletion already resolved".into(),
            ));
        }
        if !self.offers(id) {
            return Err(LedgerError::InvalidSelection(format!(
                "#{id} is not among the listed entries"
            )));
        }
        let resolution = Self::remove(store, id)?;
        Ok(self.resolve(resolution))
    }

    pub fn cancel(&mut self) -> Result<Resolution> {
        if self.is_resolved() {
            return Err(LedgerError::InvalidSelection(
                "deletion already resolved".into(),
            ));
        }
        Ok(self.resolve(Resolution::Cancelled))
    }

    /// Deletes `id` directly, reporting the removed record or not-found.
    /// Never touches any other record.
    pub fn remove<S>(store: &S, id: i64) -> Result<Resolution>
    where
        S: LedgerStore + ?Sized,
    {
        let Some(expense) = store.get(id)? else {
            debug!(id, "delete target absent");
            return Ok(Resolution::NotFound(id));
        };
        if store.delete(id)? {
            info!(id, amount = expense.amount, "deleted expense");
            Ok(Resolution::Deleted(expense))
        } else {
            // Removed by someone else between the read and the delete.
            Ok(Resolution::NotFound(id))
        }
    }

    fn resolve(&mut self, resolution: Resolution) -> Resolution {
        self.state = SelectorState::Resolved(resolution.clone());
        resolution
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{NewExpense, TimeWindow},
        storage::MemoryLedgerStore,
    };
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(10, minute, 0)
            .unwrap()
    }

    fn seeded(count: u32) -> (MemoryLedgerStore, Vec<Expense>) {
        let store = MemoryLedgerStore::new();
        for minute in 0..count {
            store
                .insert(&NewExpense::new(
                    f64::from(minute + 1),
                    format!("entry {minute}"),
                    "Разное",
                    at(minute),
                ))
                .unwrap();
        }
        let rows = store
            .query(&TimeWindow::new(at(0), at(59)).unwrap())
            .unwrap();
        (store, rows)
    }

    #[test]
    fn listing_is_bounded_to_most_recent() {
        let (_, rows) = seeded(12);
        let selector = DeletionSelector::list(Period::All, &rows, 10);
        let ids: Vec<i64> = selector.candidates().iter().map(|c| c.id).collect();
        assert_eq!(ids.len(), 10);
        assert_eq!(ids[0], 12);
        assert_eq!(ids[9], 3);
        assert!(selector.is_truncated());
        assert!(!DeletionSelector::list(Period::All, &rows, 12).is_truncated());
    }

    #[test]
    fn selecting_a_candidate_deletes_only_that_record() {
        let (store, rows) = seeded(3);
        let mut selector = DeletionSelector::list(Period::All, &rows, 10);
        let resolution = selector.select(2, &store).unwrap();
        assert!(matches!(resolution, Resolution::Deleted(ref e) if e.id == 2));
        assert_eq!(store.count().unwrap(), 2);
        assert!(store.get(1).unwrap().is_some());
        assert!(store.get(3).unwrap().is_some());
        assert!(selector.is_resolved());
    }

    #[test]
    fn vanished_candidate_resolves_as_not_found() {
        let (store, rows) = seeded(2);
        let mut selector = DeletionSelector::list(Period::All, &rows, 10);
        assert!(store.delete(1).unwrap());
        let resolution = selector.select(1, &store).unwrap();
        assert_eq!(resolution, Resolution::NotFound(1));
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn unknown_selection_keeps_listing() {
        let (store, rows) = seeded(2);
        let mut selector = DeletionSelector::list(Period::All, &rows, 10);
        let err = selector.select(99, &store).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidSelection(_)));
        assert!(!selector.is_resolved());
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn resolved_selector_rejects_further_input() {
        let (store, rows) = seeded(2);
        let mut selector = DeletionSelector::list(Period::All, &rows, 10);
        assert_eq!(selector.cancel().unwrap(), Resolution::Cancelled);
        assert!(selector.select(1, &store).is_err());
        assert!(selector.cancel().is_err());
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn direct_remove_twice_reports_not_found_second_time() {
        let (store, _) = seeded(1);
        assert!(matches!(
            DeletionSelector::remove(&store, 1).unwrap(),
            Resolution::Deleted(_)
        ));
        assert_eq!(
            DeletionSelector::remove(&store, 1).unwrap(),
            Resolution::NotFound(1)
        );
        assert_eq!(store.count().unwrap(), 0);
    }
}
