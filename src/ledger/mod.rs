//! Persisted set of listing links that were already evaluated.
//!
//! The backing file holds one entry per line: a bare URL for the shared
//! scope, or `scope<TAB>url` for a per-chat entry. New entries are appended;
//! the file is only rewritten when a retention limit evicts old entries.
//!
//! The in-memory set is authoritative for the running process. A failed
//! write is logged and the entry still counts as known.

use crate::error::Result;
use std::collections::{HashSet, VecDeque};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

const SCOPE_SEPARATOR: char = '\t';

#[derive(Debug, Default)]
pub struct KnownOffers {
    path: Option<PathBuf>,
    entries: HashSet<String>,
    /// insertion order, oldest first
    order: VecDeque<String>,
    /// keys recorded since the last `compact`, exempt from eviction
    touched: HashSet<String>,
    max_entries: Option<usize>,
}

fn entry_key(scope: Option<&str>, url: &str) -> String {
    match scope {
        Some(scope) => format!("{}{}{}", scope, SCOPE_SEPARATOR, url),
        None => url.to_string(),
    }
}

impl KnownOffers {
    /// Ledger that lives only as long as the process
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load every entry from `path`; a missing file is an empty ledger
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut ledger = Self {
            path: Some(path.clone()),
            ..Self::default()
        };

        if path.exists() {
            for line in fs::read_to_string(&path)?.lines() {
                let line = line.trim_end_matches('\r');
                if !line.is_empty() && ledger.entries.insert(line.to_string()) {
                    ledger.order.push_back(line.to_string());
                }
            }
        }

        info!("Loaded {} known offers from {}", ledger.len(), path.display());
        Ok(ledger)
    }

    /// Keep at most `max_entries` after each `compact`; `None` never evicts.
    ///
    /// Entries recorded since the previous `compact` are never evicted, so
    /// the ledger can exceed the limit by what a single cycle records.
    pub fn with_max_entries(mut self, max_entries: Option<usize>) -> Self {
        self.max_entries = max_entries;
        self
    }

    pub fn is_known(&self, scope: Option<&str>, url: &str) -> bool {
        self.entries.contains(&entry_key(scope, url))
    }

    /// Remember `url`. Returns `false` if it was already known.
    pub fn record(&mut self, scope: Option<&str>, url: &str) -> bool {
        let key = entry_key(scope, url);
        self.touched.insert(key.clone());
        if !self.entries.insert(key.clone()) {
            return false;
        }

        debug!("Adding offer to known offers: {}", key);
        if let Err(e) = self.append(&key) {
            error!("Could not persist known offer {}: {}", key, e);
        }
        self.order.push_back(key);
        true
    }

    fn append(&self, key: &str) -> Result<()> {
        if let Some(path) = &self.path {
            let mut file = OpenOptions::new().create(true).append(true).open(path)?;
            writeln!(file, "{}", key)?;
        }
        Ok(())
    }

    /// Apply the retention limit, oldest first, sparing entries recorded
    /// since the last call.
    pub fn compact(&mut self) {
        let touched = std::mem::take(&mut self.touched);
        let Some(max) = self.max_entries else {
            return;
        };
        if self.order.len() <= max {
            return;
        }

        let mut excess = self.order.len() - max;
        let mut kept = VecDeque::with_capacity(self.order.len());
        for key in self.order.drain(..) {
            if excess > 0 && !touched.contains(&key) {
                self.entries.remove(&key);
                excess -= 1;
            } else {
                kept.push_back(key);
            }
        }
        self.order = kept;

        if let Err(e) = self.rewrite() {
            error!("Could not rewrite known offers: {}", e);
        }
    }

    fn rewrite(&self) -> Result<()> {
        if let Some(path) = &self.path {
            let mut contents = String::new();
            for key in &self.order {
                contents.push_str(key);
                contents.push('\n');
            }
            fs::write(path, contents)?;
        }
        Ok(())
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

    const A: &str = "https://www.saga.hamburg/immobiliensuche/immo-detail/1/a";
    const B: &str = "https://www.saga.hamburg/immobiliensuche/immo-detail/2/b";
    const C: &str = "https://www.saga.hamburg/immobiliensuche/immo-detail/3/c";

    #[test]
    fn test_record_is_idempotent() {
        let mut ledger = KnownOffers::in_memory();
        assert!(!ledger.is_known(None, A));

        assert!(ledger.record(None, A));
        assert!(!ledger.record(None, A));

        assert!(ledger.is_known(None, A));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_scopes_are_independent() {
        let mut ledger = KnownOffers::in_memory();
        ledger.record(Some("42"), A);

        assert!(ledger.is_known(Some("42"), A));
        assert!(!ledger.is_known(Some("7"), A));
        assert!(!ledger.is_known(None, A));
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("known_offers.txt");

        {
            let mut ledger = KnownOffers::open(&path).unwrap();
            ledger.record(None, A);
            ledger.record(Some("42"), B);
            ledger.record(None, A);
        }

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);

        let ledger = KnownOffers::open(&path).unwrap();
        assert!(ledger.is_known(None, A));
        assert!(ledger.is_known(Some("42"), B));
        assert!(!ledger.is_known(None, B));
    }

    #[test]
    fn test_missing_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = KnownOffers::open(dir.path().join("nothing.txt")).unwrap();
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_retention_evicts_oldest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("known_offers.txt");

        let mut ledger = KnownOffers::open(&path).unwrap().with_max_entries(Some(2));
        ledger.record(None, A);
        ledger.record(None, B);
        ledger.compact();
        ledger.record(None, C);
        ledger.compact();

        assert!(!ledger.is_known(None, A));
        assert!(ledger.is_known(None, B));
        assert!(ledger.is_known(None, C));

        let reopened = KnownOffers::open(&path).unwrap();
        assert_eq!(reopened.len(), 2);
        assert!(!reopened.is_known(None, A));
    }

    #[test]
    fn test_retention_spares_current_cycle() {
        let mut ledger = KnownOffers::in_memory().with_max_entries(Some(1));
        ledger.record(Some("1"), A);
        ledger.record(Some("2"), A);
        ledger.record(Some("1"), B);
        ledger.compact();

        assert_eq!(ledger.len(), 3);
        assert!(ledger.is_known(Some("1"), A));
        assert!(ledger.is_known(Some("2"), A));

        // still listed next cycle: re-recording keeps A for chat 1 alive
        ledger.record(Some("1"), A);
        ledger.compact();
        assert_eq!(ledger.len(), 1);
        assert!(ledger.is_known(Some("1"), A));
    }

    #[test]
    fn test_unwritable_file_still_remembers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("known_offers.txt");
        let mut ledger = KnownOffers::open(&path).unwrap();
        fs::create_dir(&path).unwrap();

        assert!(ledger.record(None, A));
        assert!(!ledger.record(None, A));
        assert!(ledger.is_known(None, A));
    }
}
