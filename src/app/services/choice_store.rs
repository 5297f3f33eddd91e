//! Durable memory of user decisions
//!
//! Decisions are stored in a TOML document with two tables,
//! `artist_title_fixes` and `long_playing_times`, each mapping an issue
//! fingerprint to either a bare action name or `{ action, time }`.
//! Every save writes a complete replacement file and renames it into
//! place, so a failed write never damages what was stored before.

use crate::app::models::{Decision, IssueKey};
use crate::app::services::decision_engine::DecisionMemory;
use crate::{Error, Result};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Table a decision belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceTable {
    ArtistTitleFixes,
    LongPlayingTimes,
}

impl ChoiceTable {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChoiceTable::ArtistTitleFixes => "artist_title_fixes",
            ChoiceTable::LongPlayingTimes => "long_playing_times",
        }
    }
}

/// A persisted decision: a bare action, or an action with an edited time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
enum StoredChoice {
    Action(String),
    Record {
        action: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        time: Option<String>,
    },
}

impl From<&Decision> for StoredChoice {
    fn from(decision: &Decision) -> Self {
        match &decision.value {
            Some(value) => StoredChoice::Record {
                action: decision.action.clone(),
                time: Some(value.clone()),
            },
            None => StoredChoice::Action(decision.action.clone()),
        }
    }
}

impl From<&StoredChoice> for Decision {
    fn from(choice: &StoredChoice) -> Self {
        match choice {
            StoredChoice::Action(action) => Decision::new(action.clone()),
            StoredChoice::Record { action, time } => Decision {
                action: action.clone(),
                value: time.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct ChoiceDocument {
    #[serde(default)]
    artist_title_fixes: BTreeMap<String, StoredChoice>,
    #[serde(default)]
    long_playing_times: BTreeMap<String, StoredChoice>,
}

impl ChoiceDocument {
    fn table(&self, table: ChoiceTable) -> &BTreeMap<String, StoredChoice> {
        match table {
            ChoiceTable::ArtistTitleFixes => &self.artist_title_fixes,
            ChoiceTable::LongPlayingTimes => &self.long_playing_times,
        }
    }

    fn table_mut(&mut self, table: ChoiceTable) -> &mut BTreeMap<String, StoredChoice> {
        match table {
            ChoiceTable::ArtistTitleFixes => &mut self.artist_title_fixes,
            ChoiceTable::LongPlayingTimes => &mut self.long_playing_times,
        }
    }
}

/// Key-to-decision store addressed by issue fingerprints
#[derive(Debug, Clone)]
pub struct ChoiceStore {
    path: Option<PathBuf>,
    enabled: bool,
    document: ChoiceDocument,
}

impl ChoiceStore {
    /// Open the store at `path`.
    ///
    /// A missing file starts empty; an unreadable or malformed file is
    /// reported and also starts empty. A disabled store never reads the file.
    pub fn open(path: impl Into<PathBuf>, enabled: bool) -> Self {
        let path = path.into();
        let document = if enabled {
            Self::load_document(&path)
        } else {
            ChoiceDocument::default()
        };

        Self {
            path: Some(path),
            enabled,
            document,
        }
    }

    /// A store that recalls nothing and persists nothing
    pub fn disabled() -> Self {
        Self {
            path: None,
            enabled: false,
            document: ChoiceDocument::default(),
        }
    }

    /// An enabled store that lives only for this process
    pub fn in_memory() -> Self {
        Self {
            path: None,
            enabled: true,
            document: ChoiceDocument::default(),
        }
    }

    fn load_document(path: &Path) -> ChoiceDocument {
        if !path.exists() {
            debug!("No remembered choices at {}", path.display());
            return ChoiceDocument::default();
        }

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!("Could not read remembered choices {}: {}", path.display(), e);
                return ChoiceDocument::default();
            }
        };

        match toml::from_str::<ChoiceDocument>(&contents) {
            Ok(document) => {
                debug!(
                    "Loaded {} artist/title and {} playing time choices",
                    document.artist_title_fixes.len(),
                    document.long_playing_times.len()
                );
                document
            }
            Err(e) => {
                warn!("Ignoring malformed remembered choices {}: {}", path.display(), e);
                ChoiceDocument::default()
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Remembered decision for an issue key
    pub fn get(&self, table: ChoiceTable, key: &IssueKey) -> Option<Decision> {
        if !self.enabled {
            return None;
        }
        self.document
            .table(table)
            .get(&key.fingerprint())
            .map(Decision::from)
    }

    /// Remember a decision, replacing any earlier one for the same key.
    ///
    /// A failed save is logged and the decision stays in memory for the
    /// rest of the run.
    pub fn put(&mut self, table: ChoiceTable, key: &IssueKey, decision: &Decision) {
        if !self.enabled {
            return;
        }

        self.document
            .table_mut(table)
            .insert(key.fingerprint(), StoredChoice::from(decision));

        if let Err(e) = self.save() {
            warn!("{}; keeping decision for this run only", e);
        }
    }

    /// Number of remembered decisions in a table
    pub fn len(&self, table: ChoiceTable) -> usize {
        self.document.table(table).len()
    }

    /// Forget every remembered decision
    pub fn clear_all(&mut self) -> Result<()> {
        self.document = ChoiceDocument::default();
        self.save()
    }

    /// Write the whole document to a temporary sibling file and rename it
    /// over the store file.
    pub fn save(&self) -> Result<()> {
        let Some(path) = self.path.as_deref().filter(|_| self.enabled) else {
            return Ok(());
        };

        let body = toml::to_string(&self.document)
            .map_err(|e| Error::choice_store(format!("Could not serialize choices: {}", e)))?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|e| {
            Error::choice_store(format!("Could not create {}: {}", dir.display(), e))
        })?;

        let mut temp = NamedTempFile::new_in(&dir).map_err(|e| {
            Error::choice_store(format!("Could not stage {}: {}", path.display(), e))
        })?;

        writeln!(temp, "# Remembered user choices")
            .and_then(|_| writeln!(temp, "# Last updated: {}", Local::now().to_rfc3339()))
            .and_then(|_| writeln!(temp))
            .and_then(|_| temp.write_all(body.as_bytes()))
            .and_then(|_| temp.flush())
            .map_err(|e| {
                Error::choice_store(format!("Could not write {}: {}", path.display(), e))
            })?;

        temp.persist(path).map_err(|e| {
            Error::choice_store(format!("Could not replace {}: {}", path.display(), e.error))
        })?;

        debug!("Saved remembered choices to {}", path.display());
        Ok(())
    }

    /// Memory view over one table, for the decision engine
    pub fn table(&mut self, table: ChoiceTable) -> TableMemory<'_> {
        TableMemory { store: self, table }
    }
}

/// One table of a [`ChoiceStore`] acting as recall source and remember sink
pub struct TableMemory<'a> {
    store: &'a mut ChoiceStore,
    table: ChoiceTable,
}

impl DecisionMemory for TableMemory<'_> {
    fn recall(&self, key: &IssueKey) -> Option<Decision> {
        self.store.get(self.table, key)
    }

    fn remember(&mut self, key: &IssueKey, decision: &Decision) {
        self.store.put(self.table, key, decision);
    }
}
