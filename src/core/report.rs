//! Turns aggregated windows into renderer-neutral structures.
//!
//! Nothing here talks to a renderer. The summary text is plain lines a chat
//! transport can send as-is; [`ReportPayload`] is what an external chart/table
//! backend consumes.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::{
    core::aggregator::{Aggregation, Aggregator, BarSpec},
    domain::{CategoryTable, Expense, Period, TimeWindow},
};

const DETAIL_DATE_FORMAT: &str = "%d.%m.%Y %H:%M";
const ELLIPSIS: char = '…';

/// Presentation knobs shared by every view.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSettings {
    pub currency: String,
    /// Most recent entries shown in compact detail views.
    pub detail_limit: usize,
    pub description_width: usize,
    pub bars: BarSpec,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            currency: "₽".into(),
            detail_limit: 10,
            description_width: 30,
            bars: BarSpec::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryView {
    pub period: Period,
    pub window: TimeWindow,
    pub aggregation: Aggregation,
}

impl SummaryView {
    pub fn is_empty(&self) -> bool {
        self.aggregation.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailRow {
    pub id: i64,
    pub date: String,
    pub description: String,
    pub category: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailView {
    pub period: Period,
    pub rows: Vec<DetailRow>,
    pub total_entries: usize,
    pub total_amount: f64,
}

impl DetailView {
    pub fn is_empty(&self) -> bool {
        self.total_entries == 0
    }

    /// Entries in the window that the cap left out.
    pub fn hidden(&self) -> usize {
        self.total_entries.saturating_sub(self.rows.len())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryRow {
    pub category: String,
    pub amount: f64,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailTableRow {
    pub index: usize,
    pub date: String,
    pub description: String,
    pub category: String,
    pub amount: f64,
}

/// Everything an external chart/table renderer needs for one window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportPayload {
    pub period: Period,
    pub window: TimeWindow,
    pub generated_at: NaiveDateTime,
    pub currency: String,
    pub grand_total: f64,
    pub entry_count: usize,
    pub chart: ChartData,
    pub table: Vec<CategoryRow>,
    pub details: Vec<DetailTableRow>,
}

#[derive(Debug, Clone, Default)]
pub struct ReportComposer {
    settings: ReportSettings,
}

impl ReportComposer {
    pub fn new(settings: ReportSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ReportSettings {
        &self.settings
    }

    pub fn summary(
        &self,
        period: Period,
        window: TimeWindow,
        expenses: &[Expense],
        table: &CategoryTable,
    ) -> SummaryView {
        SummaryView {
            period,
            window,
            aggregation: Aggregator::aggregate(expenses, table, self.settings.bars),
        }
    }

    /// `expenses` must already be newest first; `limit` of `None` keeps every row.
    pub fn detail(&self, period: Period, expenses: &[Expense], limit: Option<usize>) -> DetailView {
        let shown = limit.unwrap_or(expenses.len());
        DetailView {
            period,
            rows: expenses
                .iter()
                .take(shown)
                .map(|expense| DetailRow {
                    id: expense.id,
                    date: expense.timestamp.format(DETAIL_DATE_FORMAT).to_string(),
                    description: truncate(&expense.description, self.settings.description_width),
                    category: expense.category.clone(),
                    amount: expense.amount,
                })
                .collect(),
            total_entries: expenses.len(),
            total_amount: expenses.iter().map(|e| e.amount).sum(),
        }
    }

    /// Compact detail view capped at the configured limit.
    pub fn recent(&self, period: Period, expenses: &[Expense]) -> DetailView {
        self.detail(period, expenses, Some(self.settings.detail_limit))
    }

    pub fn payload(
        &self,
        period: Period,
        window: TimeWindow,
        expenses: &[Expense],
        table: &CategoryTable,
        generated_at: NaiveDateTime,
    ) -> ReportPayload {
        let summary = self.summary(period, window, expenses, table);
        let categories = &summary.aggregation.categories;
        let details = self
            .detail(period, expenses, None)
            .rows
            .into_iter()
            .enumerate()
            .map(|(index, row)| DetailTableRow {
                index: index + 1,
                date: row.date,
                description: row.description,
                category: row.category,
                amount: row.amount,
            })
            .collect();

        ReportPayload {
            period,
            window,
            generated_at,
            currency: self.settings.currency.clone(),
            grand_total: summary.aggregation.grand_total,
            entry_count: summary.aggregation.entry_count,
            chart: ChartData {
                labels: categories.iter().map(|c| c.category.clone()).collect(),
                values: categories.iter().map(|c| c.amount).collect(),
            },
            table: categories
                .iter()
                .map(|c| CategoryRow {
                    category: c.category.clone(),
                    amount: c.amount,
                    percent: c.percent,
                })
                .collect(),
            details,
        }
    }

    /// Multi-line summary; a defined "no records" line for empty windows.
    pub fn summary_text(&self, view: &SummaryView) -> String {
        let currency = &self.settings.currency;
        if view.is_empty() {
            return format!("No records for {}.", view.period.label());
        }

        let agg = &view.aggregation;
        let mut out = format!(
            "Total ({}): {:.2} {currency}\n\nBy category:",
            view.period.label(),
            agg.grand_total
        );
        for category in &agg.categories {
            out.push_str(&format!(
                "\n▫️ {}: {:.2} {currency} ({:.1}%)\n   {}",
                category.category,
                category.amount,
                category.percent,
                category.bar(agg.bar_width)
            ));
        }
        out
    }
}

/// Char-aware truncation with a trailing ellipsis.
fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out: String = text.chars().take(width - 1).collect();
    out.push(ELLIPSIS);
    out
}
