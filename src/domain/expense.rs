//! The single ledger record and the helpers that keep its timestamp in the
//! minute-precision text form shared with the persisted table.

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::domain::common::Displayable;

/// Text layout of the `date` column.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";
/// Accepted on read so rows written with seconds still load.
const LEGACY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Description stored when the user sends an amount only.
pub const DEFAULT_DESCRIPTION: &str = "Без описания";

/// One persisted ledger entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Expense {
    pub id: i64,
    pub amount: f64,
    pub description: String,
    pub category: String,
    pub timestamp: NaiveDateTime,
}

impl Expense {
    /// Short one-line form used in confirmations: `500.00 ₽ · обед (Еда)`.
    pub fn summary(&self, currency: &str) -> String {
        format!(
            "{:.2} {} · {} ({})",
            self.amount, currency, self.description, self.category
        )
    }
}

impl Displayable for Expense {
    fn display_label(&self) -> String {
        format!(
            "{} {:.2} {}",
            self.timestamp.format("%d.%m %H:%M"),
            self.amount,
            self.description
        )
    }
}

/// An entry that has been parsed and classified but not yet stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub amount: f64,
    pub description: String,
    pub category: String,
    pub timestamp: NaiveDateTime,
}

impl NewExpense {
    pub fn new(
        amount: f64,
        description: impl Into<String>,
        category: impl Into<String>,
        timestamp: NaiveDateTime,
    ) -> Self {
        Self {
            amount,
            description: description.into(),
            category: category.into(),
            timestamp: truncate_to_minute(timestamp),
        }
    }

    /// Materialises the record once the store has assigned `id`.
    pub fn into_expense(self, id: i64) -> Expense {
        Expense {
            id,
            amount: self.amount,
            description: self.description,
            category: self.category,
            timestamp: self.timestamp,
        }
    }
}

/// Drops seconds and sub-second precision.
pub fn truncate_to_minute(timestamp: NaiveDateTime) -> NaiveDateTime {
    timestamp
        .with_second(0)
        .and_then(|ts| ts.with_nanosecond(0))
        .unwrap_or(timestamp)
}

pub fn format_timestamp(timestamp: NaiveDateTime) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, LEGACY_TIMESTAMP_FORMAT))
        .ok()
}
