//! Keyed reference tables loaded once at startup.
//!
//! A lookup succeeds only when exactly one row carries the key. Duplicate keys
//! are kept at load time so the ambiguity surfaces on the record that hits
//! them rather than hiding behind whichever row happened to win.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::errors::LookupError;

/// A row type with a stable identifier column.
pub trait Keyed {
    type Key: Eq + Hash + Clone + Debug;
    /// Table name used in log lines and lookup errors.
    const TABLE: &'static str;

    fn key(&self) -> &Self::Key;
}

#[derive(Debug, Clone)]
pub struct SideTable<R: Keyed> {
    rows: Vec<R>,
    index: HashMap<R::Key, Vec<usize>>,
}

impl<R: Keyed> SideTable<R> {
    pub fn from_rows(rows: Vec<R>) -> Self {
        let mut index: HashMap<R::Key, Vec<usize>> = HashMap::new();
        for (i, row) in rows.iter().enumerate() {
            index.entry(row.key().clone()).or_default().push(i);
        }
        Self { rows, index }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the single row matching `key`.
    pub fn lookup<Q>(&self, key: &Q) -> Result<&R, LookupError>
    where
        R::Key: Borrow<Q>,
        Q: Hash + Eq + Display + ?Sized,
    {
        match self.index.get(key).map(Vec::as_slice) {
            Some([only]) => Ok(&self.rows[*only]),
            Some(many) if !many.is_empty() => Err(LookupError::Ambiguous {
                table: R::TABLE,
                key: key.to_string(),
                count: many.len(),
            }),
            _ => Err(LookupError::NotFound {
                table: R::TABLE,
                key: key.to_string(),
            }),
        }
    }
}

impl<R: Keyed + DeserializeOwned> SideTable<R> {
    pub fn from_reader<T: Read>(reader: T) -> Result<Self> {
        let rows = csv::Reader::from_reader(reader)
            .deserialize::<R>()
            .enumerate()
            .map(|(i, row)| row.with_context(|| format!("{} row {i} is malformed", R::TABLE)))
            .collect::<Result<Vec<R>>>()?;
        Ok(Self::from_rows(rows))
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open {} at {}", R::TABLE, path.display()))?;
        let table = Self::from_reader(file)?;
        if table.is_empty() {
            warn!("{} at {} has no rows; every lookup will fail", R::TABLE, path.display());
        }
        info!("Loaded {} {} rows from {}", table.len(), R::TABLE, path.display());
        Ok(table)
    }
}
