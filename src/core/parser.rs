//! Turns `<amount> [description]` text into a candidate entry.

use std::borrow::Cow;

use crate::{domain::expense::DEFAULT_DESCRIPTION, errors::ParseError};

/// Amount and description read from one inbound message.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedEntry {
    pub amount: f64,
    pub description: String,
}

/// Splits inbound text on whitespace; the first token is the amount.
#[derive(Debug, Clone)]
pub struct EntryParser {
    default_description: String,
}

impl Default for EntryParser {
    fn default() -> Self {
        Self::new(DEFAULT_DESCRIPTION)
    }
}

impl EntryParser {
    pub fn new(default_description: impl Into<String>) -> Self {
        Self {
            default_description: default_description.into(),
        }
    }

    /// Sign and magnitude are accepted as typed, infinities included.
    pub fn parse(&self, text: &str) -> Result<ParsedEntry, ParseError> {
        let mut tokens = text.split_whitespace();
        let first = tokens.next().ok_or(ParseError::Empty)?;
        let amount = parse_amount(first)?;

        let rest: Vec<&str> = tokens.collect();
        let description = if rest.is_empty() {
            self.default_description.clone()
        } else {
            rest.join(" ")
        };
        Ok(ParsedEntry {
            amount,
            description,
        })
    }
}

/// Reads one amount token. Underscores may group digits (`1_000`). NaN is
/// refused: SQLite stores it as `NULL`, which would read back as zero.
fn parse_amount(token: &str) -> Result<f64, ParseError> {
    let invalid = || ParseError::InvalidAmount(token.to_string());
    let digits = if token.contains('_') {
        if !underscores_between_digits(token) {
            return Err(invalid());
        }
        Cow::Owned(token.replace('_', ""))
    } else {
        Cow::Borrowed(token)
    };
    let amount: f64 = digits.parse().map_err(|_| invalid())?;
    if amount.is_nan() {
        return Err(ParseError::NanAmount(token.to_string()));
    }
    Ok(amount)
}

fn underscores_between_digits(token: &str) -> bool {
    let bytes = token.as_bytes();
    bytes.iter().enumerate().all(|(idx, byte)| {
        *byte != b'_'
            || (idx > 0
                && bytes[idx - 1].is_ascii_digit()
                && bytes.get(idx + 1).is_some_and(u8::is_ascii_digit))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_description_with_single_spaces() {
        let parsed = EntryParser::default().parse("  1200   такси  до   дома ").unwrap();
        assert_eq!(parsed.amount, 1200.0);
        assert_eq!(parsed.description, "такси до дома");
    }

    #[test]
    fn amount_only_uses_sentinel_description() {
        let parsed = EntryParser::default().parse("99.5").unwrap();
        assert_eq!(parsed.description, DEFAULT_DESCRIPTION);
    }

    #[test]
    fn keeps_zero_and_negative_amounts() {
        let parser = EntryParser::default();
        assert_eq!(parser.parse("0 пусто").unwrap().amount, 0.0);
        assert_eq!(parser.parse("-250 возврат").unwrap().amount, -250.0);
        assert_eq!(parser.parse("1e3 ремонт").unwrap().amount, 1000.0);
    }

    #[test]
    fn rejects_non_numeric_first_token() {
        let parser = EntryParser::default();
        assert_eq!(parser.parse(""), Err(ParseError::Empty));
        assert_eq!(parser.parse("   "), Err(ParseError::Empty));
        assert_eq!(
            parser.parse("обед 500"),
            Err(ParseError::InvalidAmount("обед".into()))
        );
        assert_eq!(
            parser.parse("12,5 кофе"),
            Err(ParseError::InvalidAmount("12,5".into()))
        );
        assert_eq!(
            parser.parse("NaN бар"),
            Err(ParseError::NanAmount("NaN".into()))
        );
        assert_eq!(
            parser.parse("1__000 бар"),
            Err(ParseError::InvalidAmount("1__000".into()))
        );
        assert_eq!(
            parser.parse("_100 бар"),
            Err(ParseError::InvalidAmount("_100".into()))
        );
    }

    #[test]
    fn keeps_infinite_amounts() {
        let parser = EntryParser::default();
        assert_eq!(parser.parse("inf бар").unwrap().amount, f64::INFINITY);
        assert_eq!(parser.parse("-Infinity").unwrap().amount, f64::NEG_INFINITY);
    }

    #[test]
    fn digit_groups_may_use_underscores() {
        let parser = EntryParser::default();
        let parsed = parser.parse("1_000 аренда").unwrap();
        assert_eq!(parsed.amount, 1000.0);
        assert_eq!(parsed.description, "аренда");
        assert_eq!(parser.parse("2_500.5_0").unwrap().amount, 2500.5);
    }
}
