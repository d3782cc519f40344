pub mod aggregator;
pub mod classifier;
pub mod clock;
pub mod deletion;
pub mod engine;
pub mod expiry;
pub mod parser;
pub mod period;
pub mod render;
pub mod report;
pub mod router;
pub mod utils;

pub use aggregator::{Aggregation, Aggregator, BarMode, BarSpec, CategoryTotal};
pub use classifier::CategoryClassifier;
pub use clock::{Clock, FixedClock, SystemClock};
pub use deletion::{Candidate, DeletionSelector, Resolution, SelectorState};
pub use engine::{EngineSettings, LedgerEngine, Reply};
pub use expiry::{ExpiryHandle, ExpiryScheduler, PromptSurface};
pub use parser::{EntryParser, ParsedEntry};
pub use period::PeriodResolver;
pub use render::{JsonReportSurface, RenderSurface, RenderedReport};
pub use report::{DetailView, ReportComposer, ReportPayload, ReportSettings, SummaryView};
pub use router::{Action, ActionRouter};
