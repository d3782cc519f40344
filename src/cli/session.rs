//! One chat conversation: routes lines through the engine and owns the clear
//! confirmation, which expires after the configured delay.

use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use strsim::levenshtein;
use tracing::{debug, info};

use crate::{
    cli::{
        output::MessageKind,
        render::{render_reply, Message},
    },
    core::{
        expiry::{ExpiryHandle, ExpiryScheduler, PromptSurface},
        Action, ActionRouter, LedgerEngine, Reply,
    },
    errors::LedgerError,
    storage::Result,
};

const MAX_SUGGESTION_DISTANCE: usize = 3;

/// Clear prompts currently shown to the user.
#[derive(Debug, Default)]
pub struct PromptBoard {
    active: Mutex<Option<u64>>,
}

impl PromptBoard {
    fn show(&self, prompt_id: u64) {
        *self.active.lock().unwrap_or_else(PoisonError::into_inner) = Some(prompt_id);
    }

    fn take(&self) -> Option<u64> {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    pub fn active(&self) -> Option<u64> {
        *self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PromptSurface for PromptBoard {
    fn remove_prompt(&self, prompt_id: u64) -> Result<()> {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if *active != Some(prompt_id) {
            return Err(LedgerError::InvalidSelection(format!(
                "prompt {prompt_id} is no longer shown"
            )));
        }
        *active = None;
        info!(prompt_id, "clear confirmation expired");
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Exit,
}

pub struct ChatSession {
    engine: LedgerEngine,
    board: Arc<PromptBoard>,
    scheduler: ExpiryScheduler,
    confirmation_window: Duration,
    pending_clear: Option<ExpiryHandle>,
    next_prompt_id: u64,
}

impl ChatSession {
    pub fn new(
        engine: LedgerEngine,
        runtime: tokio::runtime::Handle,
        confirmation_window: Duration,
    ) -> Self {
        let board = Arc::new(PromptBoard::default());
        let scheduler = ExpiryScheduler::new(runtime, board.clone());
        Self {
            engine,
            board,
            scheduler,
            confirmation_window,
            pending_clear: None,
            next_prompt_id: 1,
        }
    }

    pub fn engine(&self) -> &LedgerEngine {
        &self.engine
    }

    pub fn board(&self) -> &PromptBoard {
        &self.board
    }

    /// Handles one inbound line and returns the messages to show.
    pub fn process_line(&mut self, line: &str) -> (LoopControl, Vec<Message>) {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return (LoopControl::Continue, Vec::new());
        }
        if matches!(trimmed.to_ascii_lowercase().as_str(), "exit" | "quit") {
            self.dismiss_clear();
            return (LoopControl::Exit, vec![(MessageKind::Info, "Bye.".into())]);
        }

        let reply = match ActionRouter::parse(trimmed) {
            Ok(action) => self.handle(action),
            Err(err) => LedgerEngine::error_reply(err),
        };
        let mut messages = render_reply(&reply, self.engine.composer());
        if let Reply::UsageError(_) = reply {
            if let Some(best) = suggest(trimmed) {
                messages.push((MessageKind::Hint, format!("Did you mean `{best}`?")));
            }
        }
        (LoopControl::Continue, messages)
    }

    fn handle(&mut self, action: Action) -> Reply {
        match action {
            Action::ConfirmClear => match self.pending_clear.take() {
                None => Reply::UsageError("There is no clear request to confirm.".into()),
                Some(handle) if !handle.cancel() => {
                    Reply::UsageError("The clear confirmation expired. Send /clear again.".into())
                }
                Some(_) => {
                    self.board.take();
                    self.run(Action::ConfirmClear)
                }
            },
            Action::CancelClear => {
                if self.pending_clear.is_none() {
                    return Reply::UsageError("There is no clear request to cancel.".into());
                }
                self.dismiss_clear();
                self.run(Action::CancelClear)
            }
            Action::RequestClear => {
                let reply = self.run(Action::RequestClear);
                if let Reply::ClearPrompt { .. } = reply {
                    self.open_clear_prompt();
                }
                reply
            }
            other => self.run(other),
        }
    }

    fn run(&mut self, action: Action) -> Reply {
        self.engine
            .handle(action)
            .unwrap_or_else(LedgerEngine::error_reply)
    }

    fn open_clear_prompt(&mut self) {
        self.dismiss_clear();
        let prompt_id = self.next_prompt_id;
        self.next_prompt_id += 1;
        self.board.show(prompt_id);
        self.pending_clear = Some(self.scheduler.schedule(prompt_id, self.confirmation_window));
        debug!(prompt_id, "clear confirmation opened");
    }

    fn dismiss_clear(&mut self) {
        if let Some(handle) = self.pending_clear.take() {
            handle.cancel();
            self.board.take();
        }
    }
}

/// Closest known token for something that looked like a command.
pub fn suggest(input: &str) -> Option<String> {
    let looks_like_token = input.starts_with('/')
        || (!input.contains(char::is_whitespace) && input.contains('_'));
    if !looks_like_token {
        return None;
    }
    let needle = input.to_ascii_lowercase();
    ActionRouter::known_tokens()
        .into_iter()
        .map(|token| (levenshtein(&token, &needle), token))
        .filter(|(distance, _)| *distance > 0 && *distance <= MAX_SUGGESTION_DISTANCE)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, token)| token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::{CategoryClassifier, EngineSettings},
        storage::MemoryLedgerStore,
    };

    fn session(window: Duration) -> ChatSession {
        let engine = LedgerEngine::new(
            Arc::new(MemoryLedgerStore::new()),
            CategoryClassifier::default(),
            EngineSettings::default(),
        );
        ChatSession::new(engine, tokio::runtime::Handle::current(), window)
    }

    fn texts(messages: &[Message]) -> String {
        messages
            .iter()
            .map(|(_, text)| text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[tokio::test(start_paused = true)]
    async fn confirm_within_window_clears() {
        let mut chat = session(Duration::from_secs(30));
        chat.process_line("100 кофе");
        chat.process_line("/clear");
        assert!(chat.board().active().is_some());

        let (_, out) = chat.process_line("confirm_clear");
        assert!(texts(&out).contains("1 entries removed"));
        assert_eq!(chat.engine().store().count().unwrap(), 0);
        assert!(chat.board().active().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn confirm_after_expiry_is_refused() {
        let mut chat = session(Duration::from_secs(30));
        chat.process_line("100 кофе");
        chat.process_line("/clear");

        tokio::time::sleep(Duration::from_secs(31)).await;
        tokio::task::yield_now().await;
        assert!(chat.board().active().is_none());

        let (_, out) = chat.process_line("confirm_clear");
        assert!(texts(&out).contains("expired"));
        assert_eq!(chat.engine().store().count().unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn confirm_without_request_is_refused() {
        let mut chat = session(Duration::from_secs(30));
        chat.process_line("100 кофе");
        let (_, out) = chat.process_line("confirm_clear");
        assert!(texts(&out).contains("no clear request"));
        assert_eq!(chat.engine().store().count().unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn exit_ends_the_loop() {
        let mut chat = session(Duration::from_secs(30));
        assert_eq!(chat.process_line("quit").0, LoopControl::Exit);
    }

    #[test]
    fn suggests_close_tokens_only() {
        assert_eq!(suggest("stat_week").as_deref(), Some("stats_week"));
        assert_eq!(suggest("/hlep").as_deref(), Some("/help"));
        assert_eq!(suggest("обед сто"), None);
    }
}
