use std::sync::Arc;

use crate::domain::CategoryTable;

/// Maps a description to exactly one category label.
///
/// Rules are scanned in table order and the first rule with a keyword
/// contained in the lowercased description wins; no match yields the fallback.
#[derive(Debug, Clone)]
pub struct CategoryClassifier {
    table: Arc<CategoryTable>,
}

impl CategoryClassifier {
    pub fn new(table: CategoryTable) -> Self {
        Self {
            table: Arc::new(table),
        }
    }

    pub fn table(&self) -> &CategoryTable {
        &self.table
    }

    pub fn classify(&self, description: &str) -> &str {
        let lowered = description.to_lowercase();
        self.table
            .rules()
            .iter()
            .find(|rule| rule.keywords.iter().any(|kw| lowered.contains(kw.as_str())))
            .map(|rule| rule.label.as_str())
            .unwrap_or_else(|| self.table.fallback())
    }
}

impl Default for CategoryClassifier {
    fn default() -> Self {
        Self::new(CategoryTable::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CategoryRule;

    #[test]
    fn default_table_matches_known_keywords() {
        let classifier = CategoryClassifier::default();
        assert_eq!(classifier.classify("обед"), "Еда");
        assert_eq!(classifier.classify("Такси до вокзала"), "Транспорт");
        assert_eq!(classifier.classify("оплата МТС"), "Связь");
        assert_eq!(classifier.classify("подарок"), "Разное");
    }

    #[test]
    fn earlier_rule_wins_over_later_and_longer_match() {
        // "кофе" (Еда) and "бар" (Развлечения) both match; Еда comes first.
        let classifier = CategoryClassifier::default();
        assert_eq!(classifier.classify("кофе в баре"), "Еда");

        let table = CategoryTable::new(
            vec![
                CategoryRule::new("Short", ["car"]),
                CategoryRule::new("Long", ["car wash"]),
            ],
            "Other",
        )
        .unwrap();
        assert_eq!(CategoryClassifier::new(table).classify("car wash"), "Short");
    }

    #[test]
    fn substring_matching_is_not_word_bound() {
        // "бар" is a substring of "барбершоп".
        assert_eq!(CategoryClassifier::default().classify("барбершоп"), "Развлечения");
    }
}
