//! SQLite persistence over the single `expenses` table.

use std::{
    fs,
    path::Path,
    sync::{Mutex, MutexGuard},
    time::Duration,
};

use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info};

use crate::{
    domain::{
        expense::{format_timestamp, parse_timestamp},
        CategoryTable, Expense, NewExpense, TimeWindow,
    },
    errors::LedgerError,
};

use super::{CategorySums, LedgerStore, Result};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS expenses (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    amount REAL,
    description TEXT,
    category TEXT,
    date TEXT
)";

const SELECT_EXPENSES: &str = "SELECT id, amount, description, category, date FROM expenses";
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

type RawRow = (
    i64,
    Option<f64>,
    Option<String>,
    Option<String>,
    Option<String>,
);

/// Expense store backed by one SQLite connection.
///
/// The connection lives behind a mutex: each operation acquires the guard,
/// runs to completion and releases it on every exit path, so concurrent
/// callers observe whole operations only.
pub struct SqliteLedgerStore {
    conn: Mutex<Connection>,
}

impl SqliteLedgerStore {
    /// Opens (creating if needed) the database file at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        info!(path = %path.display(), "opened expense database");
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| LedgerError::poisoned("sqlite connection"))
    }
}

impl LedgerStore for SqliteLedgerStore {
    fn insert(&self, expense: &NewExpense) -> Result<i64> {
        let conn = self.connection()?;
        conn.execute(
            "INSERT INTO expenses (amount, description, category, date) VALUES (?1, ?2, ?3, ?4)",
            params![
                expense.amount,
                expense.description,
                expense.category,
                format_timestamp(expense.timestamp)
            ],
        )?;
        let id = conn.last_insert_rowid();
        debug!(id, category = %expense.category, "inserted expense");
        Ok(id)
    }

    fn get(&self, id: i64) -> Result<Option<Expense>> {
        let conn = self.connection()?;
        let raw = conn
            .query_row(
                &format!("{SELECT_EXPENSES} WHERE id = ?1"),
                params![id],
                read_row,
            )
            .optional()?;
        raw.map(into_expense).transpose()
    }

    fn query(&self, window: &TimeWindow) -> Result<Vec<Expense>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(&format!(
            "{SELECT_EXPENSES} WHERE date >= ?1 AND date <= ?2 ORDER BY date DESC, id DESC"
        ))?;
        let rows = stmt.query_map(
            params![format_timestamp(window.start), format_timestamp(window.end)],
            read_row,
        )?;
        let expenses = rows
            .map(|row| into_expense(row?))
            .collect::<Result<Vec<_>>>()?;
        Ok(expenses)
    }

    fn delete(&self, id: i64) -> Result<bool> {
        let conn = self.connection()?;
        let removed = conn.execute("DELETE FROM expenses WHERE id = ?1", params![id])?;
        debug!(id, removed, "delete by id");
        Ok(removed > 0)
    }

    fn clear(&self) -> Result<usize> {
        let conn = self.connection()?;
        let removed = conn.execute("DELETE FROM expenses", [])?;
        info!(removed, "cleared expense table");
        Ok(removed)
    }

    fn sum_by_category(
        &self,
        window: &TimeWindow,
        table: &CategoryTable,
    ) -> Result<CategorySums> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(
            "SELECT category, SUM(amount) FROM expenses
             WHERE date >= ?1 AND date <= ?2
             GROUP BY category",
        )?;
        let rows = stmt.query_map(
            params![format_timestamp(window.start), format_timestamp(window.end)],
            |row| {
                let category: Option<String> = row.get(0)?;
                let total: Option<f64> = row.get(1)?;
                Ok((category.unwrap_or_default(), total.unwrap_or(0.0)))
            },
        )?;
        let totals = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(CategorySums::ranked(totals, table))
    }

    fn count(&self) -> Result<usize> {
        let conn = self.connection()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM expenses", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<RawRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
    ))
}

fn into_expense((id, amount, description, category, date): RawRow) -> Result<Expense> {
    let date = date.ok_or_else(|| LedgerError::CorruptRecord {
        id,
        reason: "missing date".into(),
    })?;
    let timestamp = parse_timestamp(&date).ok_or_else(|| LedgerError::CorruptRecord {
        id,
        reason: format!("unreadable date `{date}`"),
    })?;
    Ok(Expense {
        id,
        amount: amount.unwrap_or(0.0),
        description: description.unwrap_or_default(),
        category: category.unwrap_or_default(),
        timestamp,
    })
}
