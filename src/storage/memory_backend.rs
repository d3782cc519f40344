use std::{
    cmp::Reverse,
    collections::HashMap,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use crate::{
    domain::{CategoryTable, Expense, NewExpense, TimeWindow},
    errors::LedgerError,
};

use super::{CategorySums, LedgerStore, Result};

#[derive(Debug, Default)]
struct MemoryState {
    expenses: Vec<Expense>,
    last_id: i64,
}

/// Non-durable store kept entirely in process memory.
#[derive(Debug, Default)]
pub struct MemoryLedgerStore {
    state: RwLock<MemoryState>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryState>> {
        self.state
            .read()
            .map_err(|_| LedgerError::poisoned("memory store"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryState>> {
        self.state
            .write()
            .map_err(|_| LedgerError::poisoned("memory store"))
    }
}

impl LedgerStore for MemoryLedgerStore {
    fn insert(&self, expense: &NewExpense) -> Result<i64> {
        let mut state = self.write()?;
        state.last_id += 1;
        let id = state.last_id;
        state.expenses.push(expense.clone().into_expense(id));
        Ok(id)
    }

    fn get(&self, id: i64) -> Result<Option<Expense>> {
        let state = self.read()?;
        Ok(state.expenses.iter().find(|e| e.id == id).cloned())
    }

    fn query(&self, window: &TimeWindow) -> Result<Vec<Expense>> {
        let state = self.read()?;
        let mut rows: Vec<Expense> = state
            .expenses
            .iter()
            .filter(|e| window.contains(e.timestamp))
            .cloned()
            .collect();
        rows.sort_by_key(|e| Reverse((e.timestamp, e.id)));
        Ok(rows)
    }

    fn delete(&self, id: i64) -> Result<bool> {
        let mut state = self.write()?;
        match state.expenses.iter().position(|e| e.id == id) {
            Some(index) => {
                state.expenses.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn clear(&self) -> Result<usize> {
        let mut state = self.write()?;
        let removed = state.expenses.len();
        state.expenses.clear();
        Ok(removed)
    }

    fn sum_by_category(
        &self,
        window: &TimeWindow,
        table: &CategoryTable,
    ) -> Result<CategorySums> {
        let state = self.read()?;
        let mut grouped: HashMap<&str, f64> = HashMap::new();
        for expense in state.expenses.iter().filter(|e| window.contains(e.timestamp)) {
            *grouped.entry(expense.category.as_str()).or_insert(0.0) += expense.amount;
        }
        let totals = grouped
            .into_iter()
            .map(|(category, total)| (category.to_string(), total))
            .collect();
        Ok(CategorySums::ranked(totals, table))
    }

    fn count(&self) -> Result<usize> {
        Ok(self.read()?.expenses.len())
    }
}
