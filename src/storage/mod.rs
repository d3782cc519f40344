pub mod memory_backend;
pub mod sqlite_backend;

use crate::{
    domain::{CategoryTable, Expense, NewExpense, TimeWindow},
    errors::LedgerError,
};

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Per-category sums for a window as reported by the store itself, ordered
/// the same way the aggregator orders its breakdown.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategorySums {
    pub totals: Vec<(String, f64)>,
    pub grand_total: f64,
}

impl CategorySums {
    /// Sorts `totals` descending, equal totals in `table` order.
    pub fn ranked(mut totals: Vec<(String, f64)>, table: &CategoryTable) -> Self {
        totals.sort_by(|a, b| {
            b.1.total_cmp(&a.1)
                .then_with(|| table.compare_labels(&a.0, &b.0))
        });
        let grand_total = totals.iter().map(|(_, total)| total).sum();
        Self {
            totals,
            grand_total,
        }
    }

    pub fn labels(&self) -> Vec<&str> {
        self.totals.iter().map(|(label, _)| label.as_str()).collect()
    }
}

/// Ordered, filterable, appendable record store for expenses.
///
/// Every call is atomic with respect to the others: implementations hold their
/// lock for the whole operation and never expose a half-written record.
pub trait LedgerStore: Send + Sync {
    /// Appends a record and returns its newly assigned id.
    fn insert(&self, expense: &NewExpense) -> Result<i64>;
    fn get(&self, id: i64) -> Result<Option<Expense>>;
    /// Records whose timestamp lies in `window`, newest first, ties by id descending.
    fn query(&self, window: &TimeWindow) -> Result<Vec<Expense>>;
    /// Removes at most one record; `false` when `id` does not exist.
    fn delete(&self, id: i64) -> Result<bool>;
    /// Removes every record, returning how many were dropped.
    fn clear(&self) -> Result<usize>;
    /// Totals per category in `window`, ranked with `table`'s tie-break order.
    fn sum_by_category(&self, window: &TimeWindow, table: &CategoryTable)
        -> Result<CategorySums>;
    fn count(&self) -> Result<usize>;
}

pub use memory_backend::MemoryLedgerStore;
pub use sqlite_backend::SqliteLedgerStore;
