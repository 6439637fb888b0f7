//! Task run history
//!
//! Run counts and timestamps per project, used only to order the task menu.
//! Each project root gets one JSON file named after a hash of its path. The
//! store is best effort: a missing or corrupt file reads as empty history and
//! write failures are logged, never returned to the task runner.

use crate::runner::Task;
use anyhow::Context as _;
use chrono::Utc;
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

/// Environment variable overriding the history directory
pub const CACHE_DIR_ENV: &str = "TASKRUN_CACHE_DIR";

/// Statistics for one task label
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub count: u64,
    /// Seconds since the Unix epoch
    pub last_run: Option<f64>,
}

/// All recorded runs for one project root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cache {
    pub root_dir: String,
    #[serde(default)]
    pub tasks: BTreeMap<String, HistoryEntry>,
}

impl Cache {
    pub fn empty(root_dir: &str) -> Self {
        Cache {
            root_dir: root_dir.to_string(),
            tasks: BTreeMap::new(),
        }
    }

    /// Count one more run of `label` at `timestamp`
    pub fn record(&mut self, label: &str, timestamp: f64) {
        let entry = self.tasks.entry(label.to_string()).or_default();
        entry.count += 1;
        entry.last_run = Some(timestamp);
    }

    pub fn entry(&self, label: &str) -> Option<&HistoryEntry> {
        self.tasks.get(label)
    }
}

/// Directory of per-project history files
#[derive(Debug, Clone)]
pub struct HistoryStore {
    dir: PathBuf,
}

impl HistoryStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        HistoryStore { dir: dir.into() }
    }

    /// `$TASKRUN_CACHE_DIR`, or `taskrun` under the platform cache directory
    pub fn default_location() -> Self {
        if let Some(dir) = std::env::var_os(CACHE_DIR_ENV).filter(|d| !d.is_empty()) {
            return HistoryStore::new(dir);
        }
        let base = BaseDirs::new()
            .map(|dirs| dirs.cache_dir().to_path_buf())
            .unwrap_or_else(std::env::temp_dir);
        HistoryStore::new(base.join("taskrun"))
    }

    /// File holding the history for `root_dir`
    pub fn path_for(&self, root_dir: &str) -> PathBuf {
        self.dir.join(format!("{}.json", root_key(root_dir)))
    }

    /// Load history; anything unreadable counts as no history
    pub fn load(&self, root_dir: &str) -> Cache {
        match self.try_load(root_dir) {
            Ok(Some(cache)) => cache,
            Ok(None) => Cache::empty(root_dir),
            Err(e) => {
                tracing::warn!("ignoring run history: {:#}", e);
                Cache::empty(root_dir)
            }
        }
    }

    fn try_load(&self, root_dir: &str) -> anyhow::Result<Option<Cache>> {
        let path = self.path_for(root_dir);
        if !path.exists() {
            return Ok(None);
        }
        let data = fs::read(&path).with_context(|| format!("failed to read {}", path.display()))?;
        let cache = serde_json::from_slice(&data)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(Some(cache))
    }

    /// Write history for `root_dir`
    pub fn save(&self, root_dir: &str, cache: &Cache) -> anyhow::Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create history dir {}", self.dir.display()))?;
        let path = self.path_for(root_dir);
        let data = serde_json::to_vec_pretty(cache)?;
        fs::write(&path, data).with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }

    /// Record a run of `label` now; failures are logged and otherwise ignored
    pub fn record_run(&self, root_dir: &str, label: &str) {
        let mut cache = self.load(root_dir);
        cache.record(label, now());
        if let Err(e) = self.save(root_dir, &cache) {
            tracing::warn!("could not save run history: {:#}", e);
        }
    }
}

/// First 16 hex digits of the SHA-256 of the root path
pub fn root_key(root_dir: &str) -> String {
    let digest = Sha256::digest(root_dir.as_bytes());
    let mut key = String::with_capacity(16);
    for b in &digest[..8] {
        let _ = write!(&mut key, "{b:02x}");
    }
    key
}

fn now() -> f64 {
    Utc::now().timestamp_millis() as f64 / 1000.0
}

/// Order tasks for the menu
///
/// Tasks that have run come first, most recent first, then by run count.
/// Tasks that never ran keep their original order at the end.
pub fn sort_by_history<'t>(tasks: &[&'t Task], cache: &Cache) -> Vec<&'t Task> {
    let mut ordered: Vec<(usize, &'t Task)> = tasks.iter().copied().enumerate().collect();

    ordered.sort_by(|(ia, a), (ib, b)| {
        let ea = cache.entry(&a.label).filter(|e| e.last_run.is_some());
        let eb = cache.entry(&b.label).filter(|e| e.last_run.is_some());
        match (ea, eb) {
            (Some(ea), Some(eb)) => {
                let (ra, rb) = (ea.last_run.unwrap_or_default(), eb.last_run.unwrap_or_default());
                rb.partial_cmp(&ra)
                    .unwrap_or(Ordering::Equal)
                    .then_with(|| eb.count.cmp(&ea.count))
                    .then_with(|| ia.cmp(ib))
            }
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => ia.cmp(ib),
        }
    });

    ordered.into_iter().map(|(_, task)| task).collect()
}
