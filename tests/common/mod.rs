#![allow(dead_code)]

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use pocket_ledger::{
    core::{CategoryClassifier, EngineSettings, FixedClock, JsonReportSurface, LedgerEngine},
    storage::{LedgerStore, MemoryLedgerStore, SqliteLedgerStore},
};
use tempfile::TempDir;

/// An engine over an isolated store with a hand-driven clock.
pub struct Harness {
    pub engine: LedgerEngine,
    pub store: Arc<dyn LedgerStore>,
    pub clock: Arc<FixedClock>,
    pub dir: TempDir,
}

pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .expect("valid date")
        .and_hms_opt(hour, minute, 0)
        .expect("valid time")
}

pub fn start() -> NaiveDateTime {
    at(2024, 10, 1, 12, 0)
}

fn build(store: Arc<dyn LedgerStore>, dir: TempDir) -> Harness {
    let clock = Arc::new(FixedClock::new(start()));
    let engine = LedgerEngine::new(
        store.clone(),
        CategoryClassifier::default(),
        EngineSettings::default(),
    )
    .with_clock(clock.clone())
    .with_surface(Arc::new(JsonReportSurface::new(dir.path().join("reports"))));
    Harness {
        engine,
        store,
        clock,
        dir,
    }
}

pub fn memory_harness() -> Harness {
    let dir = TempDir::new().expect("create temp dir");
    build(Arc::new(MemoryLedgerStore::new()), dir)
}

pub fn sqlite_harness() -> Harness {
    let dir = TempDir::new().expect("create temp dir");
    let store = SqliteLedgerStore::open(&dir.path().join("expenses.db")).expect("open sqlite store");
    build(Arc::new(store), dir)
}
