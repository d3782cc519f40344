//! Maps inbound chat text to a structured [`Action`].
//!
//! Reserved captions and action tokens are recognised here so they never reach
//! the entry parser; everything else is treated as a new expense.

use std::fmt;

use crate::{domain::Period, errors::LedgerError, storage::Result};

pub const STATS_LABEL: &str = "📊 Посмотреть итоги";
pub const CLEAR_LABEL: &str = "🗑️ Сбросить данные";
pub const HISTORY_LABEL: &str = "📜 История";
pub const DELETE_LABEL: &str = "✂️ Удалить запись";

/// Menu captions in display order.
pub const CONTROL_LABELS: [&str; 4] = [STATS_LABEL, HISTORY_LABEL, DELETE_LABEL, CLEAR_LABEL];

const CONFIRM_CLEAR: &str = "confirm_clear";
const CANCEL_CLEAR: &str = "cancel_clear";
const CANCEL_DELETE: &str = "cancel_delete";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    AddExpense(String),
    ShowStats(Period),
    ShowHistory(Period),
    RequestDelete(Period),
    DeleteEntry(i64),
    CancelDelete,
    Export(Period),
    RequestClear,
    ConfirmClear,
    CancelClear,
    Help,
    Version,
}

impl Action {
    /// Canonical token that routes back to this action, if it has one.
    pub fn token(&self) -> Option<String> {
        let token = match self {
            Action::AddExpense(_) => return None,
            Action::ShowStats(period) => format!("stats_{period}"),
            Action::ShowHistory(period) => format!("history_{period}"),
            Action::RequestDelete(period) => format!("delete_{period}"),
            Action::DeleteEntry(id) => format!("delete_id_{id}"),
            Action::CancelDelete => CANCEL_DELETE.into(),
            Action::Export(period) => format!("pdf_{period}"),
            Action::RequestClear => "/clear".into(),
            Action::ConfirmClear => CONFIRM_CLEAR.into(),
            Action::CancelClear => CANCEL_CLEAR.into(),
            Action::Help => "/help".into(),
            Action::Version => "/version".into(),
        };
        Some(token)
    }

    /// Whether the action changes stored data.
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Action::AddExpense(_) | Action::DeleteEntry(_) | Action::ConfirmClear
        )
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self, self.token()) {
            (Action::AddExpense(text), _) => write!(f, "add `{text}`"),
            (_, Some(token)) => f.write_str(&token),
            (_, None) => Ok(()),
        }
    }
}

pub struct ActionRouter;

impl ActionRouter {
    /// Routes one inbound message. Recognised verbs with a bad parameter are
    /// rejected; unrecognised text becomes [`Action::AddExpense`].
    pub fn parse(text: &str) -> Result<Action> {
        let trimmed = text.trim();
        if let Some(action) = Self::control_label(trimmed) {
            return Ok(action);
        }
        if let Some(command) = trimmed.strip_prefix('/') {
            return Self::parse_command(command);
        }
        if let Some(action) = Self::parse_token(trimmed)? {
            return Ok(action);
        }
        Ok(Action::AddExpense(trimmed.to_string()))
    }

    pub fn control_label(text: &str) -> Option<Action> {
        match text {
            STATS_LABEL => Some(Action::ShowStats(Period::All)),
            CLEAR_LABEL => Some(Action::RequestClear),
            HISTORY_LABEL => Some(Action::ShowHistory(Period::Month)),
            DELETE_LABEL => Some(Action::RequestDelete(Period::All)),
            _ => None,
        }
    }

    pub fn is_control_label(text: &str) -> bool {
        Self::control_label(text.trim()).is_some()
    }

    /// Every token and command the router accepts, for completion and suggestions.
    pub fn known_tokens() -> Vec<String> {
        let mut tokens: Vec<String> = ["/start", "/help", "/version", "/clear"]
            .into_iter()
            .map(String::from)
            .collect();
        for verb in ["stats", "history", "delete", "pdf"] {
            tokens.push(format!("/{verb}"));
            tokens.extend(Period::ALL.iter().map(|period| format!("{verb}_{period}")));
        }
        tokens.push(CONFIRM_CLEAR.into());
        tokens.push(CANCEL_CLEAR.into());
        tokens.push(CANCEL_DELETE.into());
        tokens
    }

    fn parse_command(command: &str) -> Result<Action> {
        let mut parts = command.split_whitespace();
        let head = parts.next().unwrap_or_default();
        // Group chats address commands as `/stats@bot_name`.
        let name = head
            .split_once('@')
            .map_or(head, |(name, _)| name)
            .to_ascii_lowercase();
        let argument = parts.next();
        if parts.next().is_some() {
            return Err(LedgerError::InvalidAction(format!(
                "`/{name}` takes at most one argument"
            )));
        }

        let period_or = |default: Period| -> Result<Period> {
            argument.map_or(Ok(default), |raw| raw.parse())
        };
        let no_argument = |action: Action| -> Result<Action> {
            match argument {
                None => Ok(action),
                Some(extra) => Err(LedgerError::InvalidAction(format!(
                    "`/{name}` takes no argument, got `{extra}`"
                ))),
            }
        };

        match name.as_str() {
            "start" | "help" => no_argument(Action::Help),
            "version" => no_argument(Action::Version),
            "clear" => no_argument(Action::RequestClear),
            "stats" => Ok(Action::ShowStats(period_or(Period::All)?)),
            "history" => Ok(Action::ShowHistory(period_or(Period::Month)?)),
            "delete" => Ok(Action::RequestDelete(period_or(Period::All)?)),
            "pdf" | "report" => Ok(Action::Export(period_or(Period::Month)?)),
            _ => Err(LedgerError::InvalidAction(format!(
                "unknown command `/{name}`"
            ))),
        }
    }

    fn parse_token(token: &str) -> Result<Option<Action>> {
        if token.contains(char::is_whitespace) {
            return Ok(None);
        }
        match token {
            CONFIRM_CLEAR => return Ok(Some(Action::ConfirmClear)),
            CANCEL_CLEAR => return Ok(Some(Action::CancelClear)),
            CANCEL_DELETE => return Ok(Some(Action::CancelDelete)),
            _ => {}
        }

        // Longest prefix first: `delete_id_` must win over `delete_`.
        if let Some(raw) = token
            .strip_prefix("delete_id_")
            .or_else(|| token.strip_prefix("del_"))
        {
            return raw
                .parse::<i64>()
                .map(|id| Some(Action::DeleteEntry(id)))
                .map_err(|_| LedgerError::InvalidAction(format!("`{raw}` is not a record id")));
        }

        let period_action: [(&str, fn(Period) -> Action); 4] = [
            ("stats_", Action::ShowStats),
            ("history_", Action::ShowHistory),
            ("delete_", Action::RequestDelete),
            ("pdf_", Action::Export),
        ];
        for (prefix, build) in period_action {
            if let Some(raw) = token.strip_prefix(prefix) {
                return raw.parse::<Period>().map(|period| Some(build(period)));
            }
        }
        Ok(None)
    }
}
