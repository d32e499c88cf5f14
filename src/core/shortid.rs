//! Short ID aliases for easier record selection
//!
//! Every listed record gets a `PREFIX@N` alias (`PROJ@1`, `CLM@3`) that can
//! be typed wherever an id is expected. Aliases are persisted in
//! `shortids.json` in the data directory and stay stable across runs.
//!
//! The prefix comes from the record kind, not from the id itself, so server
//! assigned ids without a prefix get aliases too.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::core::identity::EntityPrefix;

/// Index file name within the data directory
const INDEX_FILE: &str = "shortids.json";

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ShortIdIndex {
    /// Maps "PREFIX@N" to the full id
    entries: HashMap<String, String>,
    /// Maps the full id to its alias
    #[serde(skip)]
    reverse: HashMap<String, String>,
    /// Next available number per prefix
    next_ids: HashMap<String, u32>,
}

impl ShortIdIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(data_dir: &Path) -> PathBuf {
        data_dir.join(INDEX_FILE)
    }

    /// Load the index from a data directory, or start empty
    pub fn load(data_dir: &Path) -> Self {
        let path = Self::path(data_dir);
        let Ok(content) = fs::read_to_string(&path) else {
            return Self::new();
        };

        match serde_json::from_str::<ShortIdIndex>(&content) {
            Ok(mut index) => {
                index.reverse = index
                    .entries
                    .iter()
                    .map(|(k, v)| (v.clone(), k.clone()))
                    .collect();
                index
            }
            Err(e) => {
                warn!("Ignoring unreadable {}: {}", path.display(), e);
                Self::new()
            }
        }
    }

    pub fn save(&self, data_dir: &Path) -> std::io::Result<()> {
        fs::create_dir_all(data_dir)?;
        let content = serde_json::to_string_pretty(self)?;
        fs::write(Self::path(data_dir), content)
    }

    /// Assign an alias to an id, returning the existing one if already known
    pub fn add(&mut self, prefix: EntityPrefix, entity_id: &str) -> String {
        if let Some(existing) = self.reverse.get(entity_id) {
            return existing.clone();
        }

        let next = self.next_ids.entry(prefix.to_string()).or_insert(1);
        let alias = format!("{}@{}", prefix, next);
        *next += 1;

        self.entries.insert(alias.clone(), entity_id.to_string());
        self.reverse.insert(entity_id.to_string(), alias.clone());
        alias
    }

    /// Resolve a `PREFIX@N` alias to the full id
    ///
    /// Anything that is not an alias is returned unchanged. An alias that is
    /// not in the index yields `None`.
    pub fn resolve(&self, reference: &str) -> Option<String> {
        let reference = reference.trim();
        match reference.split_once('@') {
            Some((prefix, num))
                if prefix.parse::<EntityPrefix>().is_ok()
                    && !num.is_empty()
                    && num.chars().all(|c| c.is_ascii_digit()) =>
            {
                let key = format!("{}@{}", prefix.to_ascii_uppercase(), num);
                self.entries.get(&key).cloned()
            }
            _ => Some(reference.to_string()),
        }
    }

    pub fn alias_for(&self, entity_id: &str) -> Option<&str> {
        self.reverse.get(entity_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_add_and_resolve() {
        let mut index = ShortIdIndex::new();

        assert_eq!(index.add(EntityPrefix::Proj, "PROJ-01ABC"), "PROJ@1");
        assert_eq!(index.add(EntityPrefix::Proj, "PROJ-02DEF"), "PROJ@2");
        assert_eq!(index.add(EntityPrefix::Ctr, "42"), "CTR@1");

        assert_eq!(index.resolve("PROJ@2"), Some("PROJ-02DEF".to_string()));
        assert_eq!(index.resolve("ctr@1"), Some("42".to_string()));
        assert_eq!(index.resolve("PROJ@9"), None);
    }

    #[test]
    fn test_no_duplicates() {
        let mut index = ShortIdIndex::new();
        index.add(EntityPrefix::Clm, "CLM-01ABC");
        assert_eq!(index.add(EntityPrefix::Clm, "CLM-01ABC"), "CLM@1");
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_passthrough() {
        let index = ShortIdIndex::new();
        assert_eq!(index.resolve("PROJ-01ABC"), Some("PROJ-01ABC".to_string()));
        assert_eq!(
            index.resolve("user@example.com"),
            Some("user@example.com".to_string())
        );
    }

    #[test]
    fn test_persists_across_loads() {
        let tmp = tempdir().unwrap();
        let mut index = ShortIdIndex::new();
        index.add(EntityPrefix::Ctry, "CTRY-01ABC");
        index.save(tmp.path()).unwrap();

        let mut reloaded = ShortIdIndex::load(tmp.path());
        assert_eq!(reloaded.alias_for("CTRY-01ABC"), Some("CTRY@1"));
        assert_eq!(reloaded.add(EntityPrefix::Ctry, "CTRY-02DEF"), "CTRY@2");
    }
}
