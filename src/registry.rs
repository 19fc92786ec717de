//! Operator identity assignment.
//!
//! An operator is the inferred entity behind one or more CCNs, identified
//! purely by normalized-name equality. The registry hands out one integer
//! id per distinct normalized name, stable for the whole run regardless of
//! which year a name is first seen in. Ids are fresh each run unless a
//! [`RegistryStore`] is supplied, in which case previously assigned ids are
//! loaded at start and never remapped.

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::{
    collections::HashMap,
    fs,
    path::Path,
    time::{SystemTime, UNIX_EPOCH},
};

/// Mapping from normalized operator name to operator id.
///
/// Owned by a single run and passed explicitly to the stages that need it;
/// never ambient state. The numbering is injective and monotonically
/// increasing from 1, but only equality of ids is meaningful.
#[derive(Debug)]
pub struct OperatorRegistry {
    ids: HashMap<String, u32>,
    next_id: u32,
}

impl OperatorRegistry {
    pub fn new() -> Self {
        Self {
            ids: HashMap::new(),
            next_id: 1,
        }
    }

    /// Return the id for `normalized`, allocating the next unused id on
    /// first sight. An empty normalized name never gets an id.
    pub fn assign(&mut self, normalized: &str) -> Option<u32> {
        if normalized.is_empty() {
            return None;
        }
        if let Some(id) = self.ids.get(normalized) {
            return Some(*id);
        }
        let id = self.next_id;
        self.next_id += 1;
        self.ids.insert(normalized.to_string(), id);
        Some(id)
    }

    /// Look up an already-assigned id without allocating.
    pub fn get(&self, normalized: &str) -> Option<u32> {
        if normalized.is_empty() {
            return None;
        }
        self.ids.get(normalized).copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, u32)> {
        self.ids.iter().map(|(name, id)| (name.as_str(), *id))
    }

    fn from_entries(entries: Vec<(String, u32)>) -> Self {
        let next_id = entries.iter().map(|(_, id)| id + 1).max().unwrap_or(1);
        Self {
            ids: entries.into_iter().collect(),
            next_id,
        }
    }
}

impl Default for OperatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// SQLite-backed store keeping operator ids stable across repeated
/// regenerations of the tables.
///
/// Load-then-extend only: a stored name keeps its id forever, and a run
/// appends the names it newly assigned. Deleting the store file returns to
/// fresh-per-run numbering.
pub struct RegistryStore {
    conn: Connection,
}

impl RegistryStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed creating registry dir {}", parent.display()))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("Failed opening registry DB {}", path.display()))?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            CREATE TABLE IF NOT EXISTS operator_registry (
                normalized_name TEXT PRIMARY KEY,
                operator_id INTEGER NOT NULL UNIQUE,
                first_seen_unix INTEGER NOT NULL
            );
            ",
        )
        .context("Failed initializing operator registry schema")?;
        Ok(Self { conn })
    }

    /// Load every stored assignment, seeding the in-memory registry so new
    /// names continue past the stored maximum id.
    pub fn load(&self) -> Result<OperatorRegistry> {
        let mut stmt = self
            .conn
            .prepare("SELECT normalized_name, operator_id FROM operator_registry")
            .context("Failed preparing registry load statement")?;
        let entries = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?)))
            .context("Failed querying operator registry")?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed reading operator registry rows")?;
        Ok(OperatorRegistry::from_entries(entries))
    }

    /// Persist assignments from this run. `INSERT OR IGNORE` keeps every
    /// pre-existing (name, id) pair untouched.
    pub fn persist(&mut self, registry: &OperatorRegistry) -> Result<usize> {
        let now = now_unix_seconds();
        let tx = self
            .conn
            .transaction()
            .context("Failed starting registry transaction")?;
        let mut inserted = 0usize;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT OR IGNORE INTO operator_registry
                     (normalized_name, operator_id, first_seen_unix)
                     VALUES (?1, ?2, ?3)",
                )
                .context("Failed preparing registry insert statement")?;
            for (name, id) in registry.entries() {
                inserted += stmt
                    .execute((name, id, now))
                    .with_context(|| format!("Failed persisting registry entry {name:?}"))?;
            }
        }
        tx.commit().context("Failed committing registry")?;
        Ok(inserted)
    }
}

fn now_unix_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}
