//! Totals, per-category breakdowns and proportional bars over a window.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::{CategoryTable, Expense};

const FILLED: char = '█';
const EMPTY: char = '░';

/// How bar length is derived from a category total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BarMode {
    /// Proportional to the category's share of the grand total.
    #[default]
    Share,
    /// Proportional to the largest category total.
    Relative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarSpec {
    pub width: usize,
    pub mode: BarMode,
}

impl Default for BarSpec {
    fn default() -> Self {
        Self {
            width: 20,
            mode: BarMode::Share,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub amount: f64,
    pub entries: usize,
    pub percent: f64,
    pub filled: usize,
}

impl CategoryTotal {
    /// Fixed-width text bar, `filled` solid cells followed by empty ones.
    pub fn bar(&self, width: usize) -> String {
        let filled = self.filled.min(width);
        let mut bar = String::with_capacity(width * FILLED.len_utf8());
        bar.extend(std::iter::repeat(FILLED).take(filled));
        bar.extend(std::iter::repeat(EMPTY).take(width - filled));
        bar
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregation {
    pub grand_total: f64,
    pub entry_count: usize,
    pub categories: Vec<CategoryTotal>,
    pub bar_width: usize,
}

impl Aggregation {
    pub fn is_empty(&self) -> bool {
        self.entry_count == 0
    }

    pub fn total_for(&self, category: &str) -> Option<f64> {
        self.categories
            .iter()
            .find(|c| c.category == category)
            .map(|c| c.amount)
    }
}

pub struct Aggregator;

impl Aggregator {
    /// Groups `expenses` by category, sorted by total descending; equal totals
    /// keep table order, unknown labels go last alphabetically.
    pub fn aggregate(expenses: &[Expense], table: &CategoryTable, bars: BarSpec) -> Aggregation {
        let mut grouped: HashMap<&str, (f64, usize)> = HashMap::new();
        for expense in expenses {
            let slot = grouped.entry(expense.category.as_str()).or_insert((0.0, 0));
            slot.0 += expense.amount;
            slot.1 += 1;
        }

        let mut ordered: Vec<(&str, f64, usize)> = grouped
            .into_iter()
            .map(|(category, (amount, entries))| (category, amount, entries))
            .collect();
        ordered.sort_by(|a, b| {
            b.1.total_cmp(&a.1)
                .then_with(|| table.compare_labels(a.0, b.0))
        });

        let grand_total: f64 = ordered.iter().map(|(_, amount, _)| amount).sum();
        let max_amount = ordered
            .iter()
            .map(|(_, amount, _)| *amount)
            .fold(0.0_f64, f64::max);

        let categories = ordered
            .into_iter()
            .map(|(category, amount, entries)| {
                let percent = Self::percent(amount, grand_total);
                CategoryTotal {
                    category: category.to_string(),
                    amount,
                    entries,
                    percent,
                    filled: Self::bar_fill(amount, percent, max_amount, bars),
                }
            })
            .collect();

        Aggregation {
            grand_total,
            entry_count: expenses.len(),
            categories,
            bar_width: bars.width,
        }
    }

    /// `100 * part / total`, or 0 when the total is zero or the ratio is
    /// undefined (an infinite part over an infinite total).
    pub fn percent(part: f64, total: f64) -> f64 {
        if total.abs() < f64::EPSILON {
            return 0.0;
        }
        let percent = part / total * 100.0;
        if percent.is_nan() {
            0.0
        } else {
            percent
        }
    }

    /// Number of solid bar cells, clamped to `0..=width`.
    pub fn bar_fill(amount: f64, percent: f64, max_amount: f64, spec: BarSpec) -> usize {
        let ratio = match spec.mode {
            BarMode::Share => percent / 100.0,
            BarMode::Relative if max_amount > f64::EPSILON => amount / max_amount,
            BarMode::Relative => 0.0,
        };
        let cells = (ratio * spec.width as f64).round();
        if cells.is_nan() || cells <= 0.0 {
            0
        } else {
            (cells as usize).min(spec.width)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewExpense;
    use chrono::NaiveDate;

    fn expense(id: i64, amount: f64, category: &str) -> Expense {
        let ts = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        NewExpense::new(amount, "x", category, ts).into_expense(id)
    }

    #[test]
    fn empty_window_has_zero_total_and_no_categories() {
        let agg = Aggregator::aggregate(&[], &CategoryTable::default(), BarSpec::default());
        assert!(agg.is_empty());
        assert_eq!(agg.grand_total, 0.0);
        assert!(agg.categories.is_empty());
    }

    #[test]
    fn all_zero_window_yields_zero_percentages() {
        let rows = [expense(1, 0.0, "Еда"), expense(2, 0.0, "Дом")];
        let agg = Aggregator::aggregate(&rows, &CategoryTable::default(), BarSpec::default());
        assert_eq!(agg.grand_total, 0.0);
        assert!(agg.categories.iter().all(|c| c.percent == 0.0 && c.filled == 0));
    }

    #[test]
    fn ties_follow_table_order() {
        let rows = [
            expense(1, 100.0, "Связь"),
            expense(2, 100.0, "Еда"),
            expense(3, 100.0, "Разное"),
            expense(4, 100.0, "Zzz"),
            expense(5, 100.0, "Aaa"),
        ];
        let agg = Aggregator::aggregate(&rows, &CategoryTable::default(), BarSpec::default());
        let order: Vec<&str> = agg.categories.iter().map(|c| c.category.as_str()).collect();
        assert_eq!(order, vec!["Еда", "Связь", "Разное", "Aaa", "Zzz"]);
    }

    #[test]
    fn share_bars_use_five_percent_cells() {
        let rows = [expense(1, 750.0, "Еда"), expense(2, 250.0, "Дом")];
        let agg = Aggregator::aggregate(&rows, &CategoryTable::default(), BarSpec::default());
        assert_eq!(agg.categories[0].percent, 75.0);
        assert_eq!(agg.categories[0].filled, 15);
        assert_eq!(agg.categories[1].filled, 5);
        assert_eq!(agg.categories[0].bar(20).chars().count(), 20);
        assert_eq!(agg.categories[1].bar(20), format!("{}{}", "█".repeat(5), "░".repeat(15)));
    }

    #[test]
    fn relative_bars_scale_to_largest_category() {
        let spec = BarSpec {
            width: 10,
            mode: BarMode::Relative,
        };
        let rows = [expense(1, 400.0, "Еда"), expense(2, 100.0, "Дом")];
        let agg = Aggregator::aggregate(&rows, &CategoryTable::default(), spec);
        assert_eq!(agg.categories[0].filled, 10);
        assert_eq!(agg.categories[1].filled, 3);
    }

    #[test]
    fn infinite_amounts_keep_bars_in_range() {
        let rows = [expense(1, f64::INFINITY, "Дом"), expense(2, 100.0, "Еда")];
        for mode in [BarMode::Share, BarMode::Relative] {
            let spec = BarSpec { width: 20, mode };
            let agg = Aggregator::aggregate(&rows, &CategoryTable::default(), spec);
            assert_eq!(agg.grand_total, f64::INFINITY);
            assert_eq!(agg.categories[0].category, "Дом");
            assert_eq!(agg.categories[0].percent, 0.0);
            assert_eq!(agg.categories[1].percent, 0.0);
            assert!(agg.categories.iter().all(|c| c.filled <= 20));
            assert!(agg.categories.iter().all(|c| c.bar(20).chars().count() == 20));
        }

        let opposite = [expense(1, f64::INFINITY, "Дом"), expense(2, f64::NEG_INFINITY, "Еда")];
        let agg = Aggregator::aggregate(&opposite, &CategoryTable::default(), BarSpec::default());
        assert!(agg.grand_total.is_nan());
        assert!(agg.categories.iter().all(|c| c.percent == 0.0 && c.filled == 0));
    }

    #[test]
    fn negative_totals_never_overflow_the_bar() {
        let rows = [expense(1, 300.0, "Еда"), expense(2, -200.0, "Дом")];
        let agg = Aggregator::aggregate(&rows, &CategoryTable::default(), BarSpec::default());
        assert_eq!(agg.grand_total, 100.0);
        assert_eq!(agg.categories[0].filled, 20);
        assert_eq!(agg.categories[1].filled, 0);
    }
}
