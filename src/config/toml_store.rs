//! Whole-document TOML persistence for ignore lists.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use slirc_mask::eq_fold;
use tracing::warn;

use crate::error::ConfigError;
use crate::ignore::rule::HardIgnoreRule;

use super::{ConfigStore, HardMaskSeed, IgnoreSeed};

/// A [`ConfigStore`] that rewrites one TOML document on every change.
///
/// An in-memory mirror of the seed is kept between writes, so each callback
/// serializes the full current state. Write failures are logged and
/// swallowed: persistence must never fail a mutation on the message path.
#[derive(Debug)]
pub struct TomlConfigStore {
    path: PathBuf,
    seed: Mutex<IgnoreSeed>,
}

impl TomlConfigStore {
    /// Open a store over `path`, loading the existing document if present.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let seed = match std::fs::read_to_string(&path) {
            Ok(text) => toml::from_str(&text)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => IgnoreSeed::default(),
            Err(err) => return Err(err.into()),
        };
        Ok(Self {
            path,
            seed: Mutex::new(seed),
        })
    }

    /// The document path this store writes.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The seed as last loaded or written.
    pub fn seed(&self) -> IgnoreSeed {
        self.seed.lock().clone()
    }

    fn update(&self, mutate: impl FnOnce(&mut IgnoreSeed)) {
        let mut seed = self.seed.lock();
        mutate(&mut seed);
        self.flush(&seed);
    }

    fn flush(&self, seed: &IgnoreSeed) {
        let text = match toml::to_string_pretty(seed) {
            Ok(text) => text,
            Err(err) => {
                warn!(error = %err, "Failed to serialize ignore config");
                return;
            }
        };
        if let Err(err) = std::fs::write(&self.path, text) {
            warn!(path = %self.path.display(), error = %err, "Failed to write ignore config");
        }
    }
}

impl ConfigStore for TomlConfigStore {
    fn remember_hard_rule(&self, server_id: &str, rule: &HardIgnoreRule) {
        self.update(|seed| {
            let server = seed.servers.entry(server_id.to_string()).or_default();
            let record = HardMaskSeed::from_rule(rule);
            match server
                .masks
                .iter_mut()
                .find(|existing| eq_fold(&existing.mask, &record.mask))
            {
                Some(existing) => *existing = record,
                None => server.masks.push(record),
            }
        });
    }

    fn forget_hard_mask(&self, server_id: &str, mask: &str) {
        self.update(|seed| {
            if let Some(server) = seed.servers.get_mut(server_id) {
                server.masks.retain(|record| !eq_fold(&record.mask, mask));
            }
        });
    }

    fn remember_soft_mask(&self, server_id: &str, mask: &str) {
        self.update(|seed| {
            let server = seed.servers.entry(server_id.to_string()).or_default();
            if !server.soft_masks.iter().any(|seen| eq_fold(seen, mask)) {
                server.soft_masks.push(mask.to_string());
            }
        });
    }

    fn forget_soft_mask(&self, server_id: &str, mask: &str) {
        self.update(|seed| {
            if let Some(server) = seed.servers.get_mut(server_id) {
                server.soft_masks.retain(|seen| !eq_fold(seen, mask));
            }
        });
    }

    fn forget_server(&self, server_id: &str) {
        self.update(|seed| {
            seed.servers.remove(server_id);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ignore::level::IgnoreLevels;
    use crate::ignore::rule::TextFilterMode;

    fn rule(mask: &str) -> HardIgnoreRule {
        HardIgnoreRule::new(
            mask,
            IgnoreLevels::EMPTY,
            Vec::new(),
            None,
            "",
            TextFilterMode::Glob,
            false,
        )
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = TomlConfigStore::open(dir.path().join("ignore.toml")).unwrap();
        assert!(store.seed().servers.is_empty());
    }

    #[test]
    fn test_writes_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ignore.toml");

        let store = TomlConfigStore::open(&path).unwrap();
        store.remember_hard_rule("libera", &rule("troll!*@*"));
        store.remember_soft_mask("libera", "chatty!*@*");

        let reopened = TomlConfigStore::open(&path).unwrap();
        let seed = reopened.seed();
        assert_eq!(seed.servers["libera"].masks[0].mask, "troll!*@*");
        assert_eq!(seed.servers["libera"].soft_masks, ["chatty!*@*"]);
    }

    #[test]
    fn test_forget_removes_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ignore.toml");

        let store = TomlConfigStore::open(&path).unwrap();
        store.remember_hard_rule("libera", &rule("troll!*@*"));
        store.remember_soft_mask("libera", "chatty!*@*");
        store.forget_hard_mask("libera", "TROLL!*@*");
        store.forget_soft_mask("libera", "chatty!*@*");

        let seed = TomlConfigStore::open(&path).unwrap().seed();
        assert!(seed.servers["libera"].masks.is_empty());
        assert!(seed.servers["libera"].soft_masks.is_empty());

        store.forget_server("libera");
        assert!(TomlConfigStore::open(&path).unwrap().seed().servers.is_empty());
    }
}
