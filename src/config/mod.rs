//! Ignore-list configuration: the persisted seed document and the
//! persistence collaborator interface.
//!
//! The engine is seeded once at construction from an [`IgnoreSeed`] snapshot
//! and writes every successful mutation back through a [`ConfigStore`]
//! before the mutating call returns.
//!
//! Submodules:
//! - [`toml_store`]: whole-document TOML persistence

mod toml_store;

pub use toml_store::TomlConfigStore;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ignore::level::{IgnoreLevel, IgnoreLevels};
use crate::ignore::rule::{HardIgnoreRule, TextFilterMode};

/// Persisted snapshot of every server's ignore lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IgnoreSeed {
    /// Per-server lists, keyed by server id.
    #[serde(default)]
    pub servers: BTreeMap<String, ServerSeed>,
}

/// One server's persisted ignore lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerSeed {
    /// Soft-ignore masks in display order.
    #[serde(default)]
    pub soft_masks: Vec<String>,
    /// Hard-ignore rules in display order.
    #[serde(default)]
    pub masks: Vec<HardMaskSeed>,
}

/// Persisted form of a single hard-ignore rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HardMaskSeed {
    /// Canonical mask pattern, display casing.
    pub mask: String,
    /// Level tags; empty means every message kind.
    #[serde(default)]
    pub levels: Vec<IgnoreLevel>,
    /// Channel scope; empty means unscoped.
    #[serde(default)]
    pub channels: Vec<String>,
    /// Expiry in epoch milliseconds; 0 means never.
    #[serde(default)]
    pub expires_at_ms: i64,
    /// Text filter pattern; empty means any text.
    #[serde(default)]
    pub pattern: String,
    /// Text filter mode.
    #[serde(default)]
    pub pattern_mode: TextFilterMode,
    /// Whether the rule also suppresses replies addressed to the ignored
    /// nick.
    #[serde(default)]
    pub replies: bool,
}

impl HardMaskSeed {
    /// Build the immutable rule this record describes.
    pub fn to_rule(&self) -> HardIgnoreRule {
        HardIgnoreRule::new(
            self.mask.clone(),
            self.levels.iter().copied().collect::<IgnoreLevels>(),
            self.channels.clone(),
            (self.expires_at_ms != 0).then_some(self.expires_at_ms),
            &self.pattern,
            self.pattern_mode,
            self.replies,
        )
    }

    /// Persisted form of an in-memory rule.
    pub fn from_rule(rule: &HardIgnoreRule) -> Self {
        Self {
            mask: rule.mask().to_string(),
            levels: rule.levels().iter().collect(),
            channels: rule.channels().to_vec(),
            expires_at_ms: rule.expires_at_ms().unwrap_or(0),
            pattern: rule
                .filter()
                .map(|f| f.pattern().to_string())
                .unwrap_or_default(),
            pattern_mode: rule.filter().map(|f| f.mode()).unwrap_or_default(),
            replies: rule.match_replies(),
        }
    }
}

/// Write-side persistence collaborator.
///
/// The store calls these once per successful mutation, inside the mutation's
/// lock scope. Implementations are expected to be fast local writes and
/// idempotent; failure policy is theirs (methods do not return errors and
/// must not panic on the message path).
pub trait ConfigStore: Send + Sync {
    /// Record a hard-ignore rule (insert or whole-rule replace).
    fn remember_hard_rule(&self, server_id: &str, rule: &HardIgnoreRule);

    /// Drop a hard-ignore rule by its canonical mask.
    fn forget_hard_mask(&self, server_id: &str, mask: &str);

    /// Record a soft-ignore mask.
    fn remember_soft_mask(&self, server_id: &str, mask: &str);

    /// Drop a soft-ignore mask.
    fn forget_soft_mask(&self, server_id: &str, mask: &str);

    /// Drop every list for a server.
    fn forget_server(&self, server_id: &str);
}

/// A [`ConfigStore`] that drops every write.
///
/// For callers that manage persistence elsewhere, and for tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullConfigStore;

impl ConfigStore for NullConfigStore {
    fn remember_hard_rule(&self, _server_id: &str, _rule: &HardIgnoreRule) {}
    fn forget_hard_mask(&self, _server_id: &str, _mask: &str) {}
    fn remember_soft_mask(&self, _server_id: &str, _mask: &str) {}
    fn forget_soft_mask(&self, _server_id: &str, _mask: &str) {}
    fn forget_server(&self, _server_id: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_defaults() {
        let seed: IgnoreSeed = toml::from_str("").unwrap();
        assert!(seed.servers.is_empty());

        let seed: IgnoreSeed = toml::from_str(
            r#"
            [[servers.libera.masks]]
            mask = "troll!*@*"
            "#,
        )
        .unwrap();
        let record = &seed.servers["libera"].masks[0];
        assert_eq!(record.mask, "troll!*@*");
        assert!(record.levels.is_empty());
        assert!(record.channels.is_empty());
        assert_eq!(record.expires_at_ms, 0);
        assert_eq!(record.pattern, "");
        assert_eq!(record.pattern_mode, TextFilterMode::Glob);
        assert!(!record.replies);
    }

    #[test]
    fn test_seed_rule_round_trip() {
        let record = HardMaskSeed {
            mask: "Troll!*@*".to_string(),
            levels: vec![IgnoreLevel::Notices],
            channels: vec!["#ops".to_string()],
            expires_at_ms: 12345,
            pattern: "*spam*".to_string(),
            pattern_mode: TextFilterMode::Glob,
            replies: true,
        };
        let rule = record.to_rule();
        assert_eq!(HardMaskSeed::from_rule(&rule), record);
    }

    #[test]
    fn test_empty_levels_round_trip_as_empty() {
        // An empty level list means "all kinds"; the in-memory rule carries
        // the All sentinel, and the persisted form stays compact.
        let record = HardMaskSeed {
            mask: "x!*@*".to_string(),
            levels: Vec::new(),
            channels: Vec::new(),
            expires_at_ms: 0,
            pattern: String::new(),
            pattern_mode: TextFilterMode::Glob,
            replies: false,
        };
        let rule = record.to_rule();
        assert!(rule.levels().contains(IgnoreLevel::All));
        assert_eq!(HardMaskSeed::from_rule(&rule).levels, vec![IgnoreLevel::All]);
    }
}
