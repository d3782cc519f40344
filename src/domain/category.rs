//! Category labels and the ordered keyword table used to assign them.

use std::{cmp::Ordering, collections::HashSet};

use serde::{Deserialize, Serialize};

use crate::errors::LedgerError;

/// Label assigned when no keyword matches.
pub const DEFAULT_FALLBACK: &str = "Разное";

/// A category label and the lowercase substrings that select it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryRule {
    pub label: String,
    pub keywords: Vec<String>,
}

impl CategoryRule {
    pub fn new<I, K>(label: impl Into<String>, keywords: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self {
            label: label.into(),
            keywords: keywords.into_iter().map(Into::into).collect(),
        }
    }
}

/// Immutable, ordered keyword table. Rule order is match precedence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTable {
    rules: Vec<CategoryRule>,
    fallback: String,
}

impl CategoryTable {
    /// Validates the table and normalises every keyword to lowercase.
    pub fn new(rules: Vec<CategoryRule>, fallback: impl Into<String>) -> Result<Self, LedgerError> {
        let fallback = fallback.into();
        if fallback.trim().is_empty() {
            return Err(LedgerError::Config("fallback category must not be empty".into()));
        }

        let mut seen = HashSet::new();
        let mut normalised = Vec::with_capacity(rules.len());
        for rule in rules {
            let label = rule.label.trim().to_string();
            if label.is_empty() {
                return Err(LedgerError::Config("category label must not be empty".into()));
            }
            if label == fallback || !seen.insert(label.clone()) {
                return Err(LedgerError::Config(format!("duplicate category `{label}`")));
            }
            let keywords: Vec<String> = rule
                .keywords
                .iter()
                .map(|keyword| keyword.trim().to_lowercase())
                .filter(|keyword| !keyword.is_empty())
                .collect();
            if keywords.is_empty() {
                return Err(LedgerError::Config(format!(
                    "category `{label}` has no keywords"
                )));
            }
            normalised.push(CategoryRule { label, keywords });
        }

        Ok(Self {
            rules: normalised,
            fallback,
        })
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// Precedence rank of `label`: table position, the fallback right after
    /// the table, `None` for labels the table does not know.
    pub fn rank(&self, label: &str) -> Option<usize> {
        self.rules
            .iter()
            .position(|rule| rule.label == label)
            .or_else(|| (label == self.fallback).then_some(self.rules.len()))
    }

    /// Tie-break order for equal totals: table rules, then the fallback, then
    /// labels the table does not know, alphabetically.
    pub fn compare_labels(&self, a: &str, b: &str) -> Ordering {
        let rank = |label: &str| self.rank(label).unwrap_or(usize::MAX);
        rank(a).cmp(&rank(b)).then_with(|| a.cmp(b))
    }

    /// Every label the table can produce, fallback last.
    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.rules
            .iter()
            .map(|rule| rule.label.as_str())
            .chain(std::iter::once(self.fallback.as_str()))
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self {
            rules: default_rules(),
            fallback: DEFAULT_FALLBACK.to_string(),
        }
    }
}

/// The keyword table the bot shipped with.
pub fn default_rules() -> Vec<CategoryRule> {
    vec![
        CategoryRule::new(
            "Еда",
            ["еда", "обед", "ужин", "завтрак", "продукты", "магазин", "кофе"],
        ),
        CategoryRule::new("Транспорт", ["такси", "метро", "автобус", "бензин", "машина"]),
        CategoryRule::new("Дом", ["аренда", "коммуналка", "интернет", "ремонт"]),
        CategoryRule::new("Развлечения", ["кино", "бар", "клуб", "подписка"]),
        CategoryRule::new("Здоровье", ["аптека", "врач", "лекарства"]),
        CategoryRule::new("Связь", ["телефон", "мтс", "билайн"]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_are_lowercased() {
        let table =
            CategoryTable::new(vec![CategoryRule::new("Food", ["Lunch", " CAFE "])], "Other")
                .unwrap();
        assert_eq!(table.rules()[0].keywords, vec!["lunch", "cafe"]);
    }

    #[test]
    fn rejects_duplicate_and_empty_rules() {
        let duplicate = CategoryTable::new(
            vec![
                CategoryRule::new("Food", ["lunch"]),
                CategoryRule::new("Food", ["dinner"]),
            ],
            "Other",
        );
        assert!(matches!(duplicate, Err(LedgerError::Config(_))));

        let no_keywords = CategoryTable::new(vec![CategoryRule::new("Food", [" "])], "Other");
        assert!(matches!(no_keywords, Err(LedgerError::Config(_))));

        let shadowed_fallback =
            CategoryTable::new(vec![CategoryRule::new("Other", ["x"])], "Other");
        assert!(shadowed_fallback.is_err());
    }

    #[test]
    fn rank_follows_table_order_with_fallback_last() {
        let table = CategoryTable::default();
        assert_eq!(table.rank("Еда"), Some(0));
        assert_eq!(table.rank("Связь"), Some(5));
        assert_eq!(table.rank(DEFAULT_FALLBACK), Some(6));
        assert_eq!(table.rank("Unknown"), None);
        assert_eq!(table.labels().last(), Some(DEFAULT_FALLBACK));
    }
}
