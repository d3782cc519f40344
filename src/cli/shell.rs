use std::{
    borrow::Cow,
    env,
    io::{self, BufRead},
    sync::Arc,
};

use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    history::DefaultHistory,
    validate::{ValidationContext, ValidationResult, Validator},
    Cmd, Context as ReadlineContext, Editor, Helper, KeyEvent,
};
use tokio::runtime::Handle;
use tracing::info;

use crate::{
    cli::{
        output::{self, set_preferences, OutputPreferences},
        render::Message,
        session::{ChatSession, LoopControl},
        CliError, SCRIPT_ENV,
    },
    config::ConfigManager,
    core::{router::CONTROL_LABELS, ActionRouter, CategoryClassifier, JsonReportSurface, LedgerEngine},
};

const PROMPT: &str = "ledger> ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CliMode {
    Interactive,
    Script,
}

/// Runs the chat shell until `exit`, end of input, or Ctrl-C.
/// `runtime` hosts the confirmation-expiry timers.
pub fn run_cli(runtime: Handle) -> Result<(), CliError> {
    let mode = if env::var_os(SCRIPT_ENV).is_some() {
        CliMode::Script
    } else {
        CliMode::Interactive
    };
    set_preferences(OutputPreferences {
        plain_mode: mode == CliMode::Script || env::var_os("NO_COLOR").is_some(),
        quiet_mode: false,
    });

    let mut session = build_session(runtime)?;
    match mode {
        CliMode::Interactive => run_interactive(&mut session),
        CliMode::Script => run_script(&mut session),
    }
}

fn build_session(runtime: Handle) -> Result<ChatSession, CliError> {
    let manager = ConfigManager::new()?;
    let config = manager.load()?;
    let store = config.open_store(manager.base_dir())?;
    let classifier = CategoryClassifier::new(config.category_table()?);
    let engine = LedgerEngine::new(store, classifier, config.engine_settings())
        .with_surface(Arc::new(JsonReportSurface::new(manager.reports_dir())));
    info!(home = %manager.base_dir().display(), storage = ?config.storage, "session ready");
    Ok(ChatSession::new(engine, runtime, config.clear_confirmation()))
}

fn run_interactive(session: &mut ChatSession) -> Result<(), CliError> {
    let mut editor = Editor::<ChatHelper, DefaultHistory>::new()?;
    editor.set_helper(Some(ChatHelper::new()));
    editor.bind_sequence(KeyEvent::from('\t'), Cmd::Complete);
    output::info("Send an expense like `500 обед`, or /help.");

    loop {
        match editor.readline(PROMPT) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                editor.add_history_entry(trimmed).ok();
                if handle_line(session, trimmed) == LoopControl::Exit {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                output::info("Bye.");
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

fn run_script(session: &mut ChatSession) -> Result<(), CliError> {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        if handle_line(session, &line?) == LoopControl::Exit {
            break;
        }
    }
    Ok(())
}

fn handle_line(session: &mut ChatSession, line: &str) -> LoopControl {
    let (control, messages) = session.process_line(line);
    print_messages(messages);
    control
}

fn print_messages(messages: Vec<Message>) {
    for (kind, text) in messages {
        output::print(kind, text);
    }
}

/// Completes router tokens and menu captions from the start of the line.
struct ChatHelper {
    candidates: Vec<String>,
}

impl ChatHelper {
    fn new() -> Self {
        let mut candidates = ActionRouter::known_tokens();
        candidates.extend(CONTROL_LABELS.iter().map(|label| label.to_string()));
        candidates.push("exit".into());
        candidates.sort();
        candidates.dedup();
        Self { candidates }
    }
}

impl Helper for ChatHelper {}

impl Completer for ChatHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &ReadlineContext<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let prefix = line[..pos].trim_start();
        let start = pos - prefix.len();
        let matches = self
            .candidates
            .iter()
            .filter(|candidate| candidate.starts_with(prefix))
            .map(|candidate| Pair {
                display: candidate.clone(),
                replacement: candidate.clone(),
            })
            .collect();
        Ok((start, matches))
    }
}

impl Hinter for ChatHelper {
    type Hint = String;
}

impl Highlighter for ChatHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        Cow::Borrowed(line)
    }
}

impl Validator for ChatHelper {
    fn validate(&self, _ctx: &mut ValidationContext) -> rustyline::Result<ValidationResult> {
        Ok(ValidationResult::Valid(None))
    }
}
