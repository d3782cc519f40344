//! Request handling: one inbound message in, one [`Reply`] out.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::{
    core::{
        classifier::CategoryClassifier,
        clock::{Clock, SystemClock},
        deletion::{Candidate, DeletionSelector, Resolution},
        parser::EntryParser,
        period::PeriodResolver,
        render::{RenderSurface, RenderedReport},
        report::{DetailView, ReportComposer, ReportPayload, ReportSettings, SummaryView},
        router::{Action, ActionRouter},
    },
    domain::{Expense, NewExpense, Period},
    errors::LedgerError,
    storage::{LedgerStore, Result},
    utils::build_info::{self, BuildMetadata},
};

const GENERIC_FAILURE: &str = "Something went wrong, please try again.";
const ENTRY_HINT: &str = "Send an amount first, e.g. `500 обед`.";

#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub report: ReportSettings,
    /// Upper bound on entries offered in one deletion list.
    pub deletion_candidates: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            report: ReportSettings::default(),
            deletion_candidates: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Recorded(Expense),
    Summary(SummaryView),
    History(DetailView),
    DeletionList {
        period: Period,
        candidates: Vec<Candidate>,
        truncated: bool,
    },
    Deletion(Resolution),
    /// Clearing needs an explicit confirmation from the boundary.
    ClearPrompt { entries: usize },
    Cleared { removed: usize },
    ClearCancelled,
    Report {
        payload: ReportPayload,
        rendered: Option<RenderedReport>,
    },
    Help,
    Version(BuildMetadata),
    UsageError(String),
    Failure(String),
}

pub struct LedgerEngine {
    store: Arc<dyn LedgerStore>,
    clock: Arc<dyn Clock>,
    parser: EntryParser,
    classifier: CategoryClassifier,
    composer: ReportComposer,
    deletion_candidates: usize,
    surface: Option<Arc<dyn RenderSurface>>,
    pending_deletion: Option<DeletionSelector>,
}

impl LedgerEngine {
    pub fn new(
        store: Arc<dyn LedgerStore>,
        classifier: CategoryClassifier,
        settings: EngineSettings,
    ) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            parser: EntryParser::default(),
            classifier,
            composer: ReportComposer::new(settings.report),
            deletion_candidates: settings.deletion_candidates,
            surface: None,
            pending_deletion: None,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_surface(mut self, surface: Arc<dyn RenderSurface>) -> Self {
        self.surface = Some(surface);
        self
    }

    pub fn store(&self) -> &dyn LedgerStore {
        self.store.as_ref()
    }

    pub fn composer(&self) -> &ReportComposer {
        &self.composer
    }

    pub fn classifier(&self) -> &CategoryClassifier {
        &self.classifier
    }

    pub fn pending_deletion(&self) -> Option<&DeletionSelector> {
        self.pending_deletion.as_ref()
    }

    /// Routes and handles one message. Never fails: every error becomes a
    /// reply and the engine stays ready for the next request.
    pub fn dispatch(&mut self, text: &str) -> Reply {
        let outcome = ActionRouter::parse(text).and_then(|action| self.handle(action));
        outcome.unwrap_or_else(Self::error_reply)
    }

    pub fn handle(&mut self, action: Action) -> Result<Reply> {
        debug!(%action, mutating = action.is_mutating(), "handling action");
        match action {
            Action::AddExpense(text) => self.add_expense(&text),
            Action::ShowStats(period) => self.stats(period),
            Action::ShowHistory(period) => self.history(period),
            Action::RequestDelete(period) => self.request_delete(period),
            Action::DeleteEntry(id) => self.delete_entry(id),
            Action::CancelDelete => self.cancel_delete(),
            Action::Export(period) => self.export(period),
            Action::RequestClear => Ok(Reply::ClearPrompt {
                entries: self.store.count()?,
            }),
            Action::ConfirmClear => {
                let removed = self.store.clear()?;
                self.pending_deletion = None;
                info!(removed, "ledger cleared");
                Ok(Reply::Cleared { removed })
            }
            Action::CancelClear => Ok(Reply::ClearCancelled),
            Action::Help => Ok(Reply::Help),
            Action::Version => Ok(Reply::Version(build_info::current())),
        }
    }

    fn add_expense(&mut self, text: &str) -> Result<Reply> {
        let entry = self.parser.parse(text)?;
        let category = self.classifier.classify(&entry.description).to_string();
        let record = NewExpense::new(entry.amount, entry.description, category, self.clock.now());
        let id = self.store.insert(&record)?;
        info!(id, amount = record.amount, category = %record.category, "recorded expense");
        Ok(Reply::Recorded(record.into_expense(id)))
    }

    fn stats(&self, period: Period) -> Result<Reply> {
        let window = PeriodResolver::resolve_now(period, self.clock.as_ref());
        let rows = self.store.query(&window)?;
        Ok(Reply::Summary(self.composer.summary(
            period,
            window,
            &rows,
            self.classifier.table(),
        )))
    }

    fn history(&self, period: Period) -> Result<Reply> {
        let window = PeriodResolver::resolve_now(period, self.clock.as_ref());
        let rows = self.store.query(&window)?;
        Ok(Reply::History(self.composer.recent(period, &rows)))
    }

    fn request_delete(&mut self, period: Period) -> Result<Reply> {
        let window = PeriodResolver::resolve_now(period, self.clock.as_ref());
        let rows = self.store.query(&window)?;
        let selector = DeletionSelector::list(period, &rows, self.deletion_candidates);
        let reply = Reply::DeletionList {
            period,
            candidates: selector.candidates().to_vec(),
            truncated: selector.is_truncated(),
        };
        // A fresh list supersedes whatever was pending.
        self.pending_deletion = (!selector.candidates().is_empty()).then_some(selector);
        Ok(reply)
    }

    fn delete_entry(&mut self, id: i64) -> Result<Reply> {
        let resolution = match self.pending_deletion.as_mut() {
            Some(selector) if selector.offers(id) => {
                let resolution = selector.select(id, self.store.as_ref())?;
                self.pending_deletion = None;
                resolution
            }
            _ => DeletionSelector::remove(self.store.as_ref(), id)?,
        };
        Ok(Reply::Deletion(resolution))
    }

    fn cancel_delete(&mut self) -> Result<Reply> {
        let mut selector = self.pending_deletion.take().ok_or_else(|| {
            LedgerError::InvalidSelection("no deletion is in progress".into())
        })?;
        Ok(Reply::Deletion(selector.cancel()?))
    }

    fn export(&self, period: Period) -> Result<Reply> {
        let now = self.clock.now();
        let window = PeriodResolver::resolve(period, now);
        let rows = self.store.query(&window)?;
        let payload =
            self.composer
                .payload(period, window, &rows, self.classifier.table(), now);
        let rendered = match &self.surface {
            Some(surface) => Some(surface.render(&payload)?),
            None => None,
        };
        Ok(Reply::Report { payload, rendered })
    }

    /// User-facing reply for a failed request; parse and action errors become
    /// usage hints, anything else a generic failure.
    pub fn error_reply(err: LedgerError) -> Reply {
        match err {
            LedgerError::Parse(parse) => {
                debug!(error = %parse, "rejected entry");
                Reply::UsageError(format!("Could not read that: {parse}. {ENTRY_HINT}"))
            }
            LedgerError::InvalidAction(message) | LedgerError::InvalidSelection(message) => {
                warn!(%message, "rejected action");
                Reply::UsageError(message)
            }
            other => {
                error!(error = %other, "request failed");
                Reply::Failure(GENERIC_FAILURE.into())
            }
        }
    }
}
