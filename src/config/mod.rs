//! On-disk settings: currency, storage backend, category table and report
//! presentation. Stored as JSON in `<home>/config.json`.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    core::{
        aggregator::{BarMode, BarSpec},
        engine::EngineSettings,
        report::ReportSettings,
        utils::{app_data_dir, config_file_in, reports_dir_in},
    },
    domain::{
        category::{default_rules, DEFAULT_FALLBACK},
        CategoryRule, CategoryTable,
    },
    errors::LedgerError,
    storage::{LedgerStore, MemoryLedgerStore, Result, SqliteLedgerStore},
    utils::persistence::{ensure_dir, write_atomic},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    Sqlite,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub currency: String,
    pub storage: StorageKind,
    /// Relative names resolve against the data directory.
    pub database_file: String,
    /// Ordered; the first matching rule wins.
    pub categories: Vec<CategoryRule>,
    pub fallback_category: String,
    pub history_limit: usize,
    pub deletion_candidates: usize,
    pub description_width: usize,
    pub bar_width: usize,
    pub bar_mode: BarMode,
    pub clear_confirmation_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            currency: "₽".into(),
            storage: StorageKind::Sqlite,
            database_file: "expenses.db".into(),
            categories: default_rules(),
            fallback_category: DEFAULT_FALLBACK.into(),
            history_limit: 10,
            deletion_candidates: 10,
            description_width: 30,
            bar_width: 20,
            bar_mode: BarMode::Share,
            clear_confirmation_secs: 30,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.currency.trim().is_empty() {
            return Err(LedgerError::Config("currency must not be empty".into()));
        }
        if self.bar_width == 0 {
            return Err(LedgerError::Config("bar_width must be positive".into()));
        }
        if self.deletion_candidates == 0 {
            return Err(LedgerError::Config(
                "deletion_candidates must be positive".into(),
            ));
        }
        if self.storage == StorageKind::Sqlite && self.database_file.trim().is_empty() {
            return Err(LedgerError::Config("database_file must not be empty".into()));
        }
        self.category_table().map(|_| ())
    }

    pub fn category_table(&self) -> Result<CategoryTable> {
        CategoryTable::new(self.categories.clone(), self.fallback_category.clone())
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            report: ReportSettings {
                currency: self.currency.clone(),
                detail_limit: self.history_limit,
                description_width: self.description_width,
                bars: BarSpec {
                    width: self.bar_width,
                    mode: self.bar_mode,
                },
            },
            deletion_candidates: self.deletion_candidates,
        }
    }

    pub fn clear_confirmation(&self) -> Duration {
        Duration::from_secs(self.clear_confirmation_secs)
    }

    pub fn database_path(&self, base: &Path) -> PathBuf {
        let file = Path::new(&self.database_file);
        if file.is_absolute() {
            file.to_path_buf()
        } else {
            base.join(file)
        }
    }

    /// Opens the configured backend.
    pub fn open_store(&self, base: &Path) -> Result<Arc<dyn LedgerStore>> {
        let store: Arc<dyn LedgerStore> = match self.storage {
            StorageKind::Sqlite => Arc::new(SqliteLedgerStore::open(&self.database_path(base))?),
            StorageKind::Memory => {
                info!("using in-memory store; entries are lost on exit");
                Arc::new(MemoryLedgerStore::new())
            }
        };
        Ok(store)
    }
}

/// Loads and saves [`Config`] under one data directory.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    /// Manager rooted at `POCKET_LEDGER_HOME` or `~/.pocket_ledger`.
    pub fn new() -> Result<Self> {
        Self::with_base_dir(app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self> {
        ensure_dir(&base)?;
        Ok(Self {
            path: config_file_in(&base),
            base,
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn reports_dir(&self) -> PathBuf {
        reports_dir_in(&self.base)
    }

    /// Missing file means defaults; a present but invalid file is an error.
    pub fn load(&self) -> Result<Config> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }
        let data = fs::read_to_string(&self.path)?;
        let config: Config = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        config.validate()?;
        let json = serde_json::to_string_pretty(config)?;
        write_atomic(&self.path, &json)?;
        info!(path = %self.path.display(), "saved config");
        Ok(())
    }
}
