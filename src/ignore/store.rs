//! Per-server ignore lists with a concurrent command surface.
//!
//! # Architecture
//!
//! - Servers live in a `DashMap` keyed by server id
//! - Each server holds insertion-ordered mask vectors under `RwLock`s and a
//!   `DashMap` of per-mask rule slots; the order lock doubles as the
//!   mutation lock for its list, so concurrent adds cannot race a
//!   duplicate in
//! - Rules are immutable; updates build a new value and swap the slot
//! - Every successful mutation persists through the [`ConfigStore`]
//!   collaborator inside the lock scope, then emits an [`IgnoreChange`]
//! - Expired rules are dropped by [`IgnoreStore::prune_expired`] or
//!   recognized as non-matching at decision time

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use dashmap::DashMap;
use parking_lot::RwLock;
use tokio::sync::broadcast;
use tracing::debug;

use slirc_mask::{eq_fold, fold, normalize_mask};

use crate::config::{ConfigStore, HardMaskSeed, IgnoreSeed, NullConfigStore, ServerSeed};

use super::level::IgnoreLevels;
use super::rule::{HardIgnoreRule, TextFilterMode};

const CHANGE_CHANNEL_CAPACITY: usize = 128;

/// Which list a change touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreChangeKind {
    /// The hard-ignore list.
    Ignore,
    /// The soft-ignore list.
    SoftIgnore,
}

/// Notification emitted after every successful mutation.
#[derive(Debug, Clone)]
pub struct IgnoreChange {
    /// Server whose lists changed.
    pub server_id: String,
    /// Which list changed.
    pub kind: IgnoreChangeKind,
}

/// Outcome of [`IgnoreStore::add_mask_with_levels`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// The mask was not present and a new rule was inserted.
    Added,
    /// The mask was present and its metadata was replaced.
    Updated,
    /// An identical rule was already present.
    Unchanged,
}

/// Current time in epoch milliseconds.
pub(crate) fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

#[derive(Debug, Default)]
struct ServerLists {
    /// Hard masks in insertion order, display casing.
    hard_order: RwLock<Vec<String>>,
    /// Hard rules keyed by folded mask.
    hard_rules: DashMap<String, Arc<HardIgnoreRule>>,
    /// Soft masks in insertion order, display casing.
    soft_order: RwLock<Vec<String>>,
}

/// Decision-time snapshot of one server's lists.
#[derive(Debug, Default)]
pub(crate) struct ServerSnapshot {
    pub(crate) hard: Vec<Arc<HardIgnoreRule>>,
    pub(crate) soft: Vec<String>,
}

/// Concurrent store of per-server hard and soft ignore lists.
///
/// All mutation goes through the command methods here; readers only ever
/// receive snapshots, never live references.
pub struct IgnoreStore {
    servers: DashMap<String, Arc<ServerLists>>,
    config: Arc<dyn ConfigStore>,
    changes: broadcast::Sender<IgnoreChange>,
    /// Whether CTCP requests are subject to hard ignores.
    hard_ignores_ctcp: AtomicBool,
    /// Whether CTCP requests are subject to soft ignores.
    soft_ignores_ctcp: AtomicBool,
}

impl IgnoreStore {
    /// Empty store writing through `config`.
    pub fn new(config: Arc<dyn ConfigStore>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            servers: DashMap::new(),
            config,
            changes,
            hard_ignores_ctcp: AtomicBool::new(true),
            soft_ignores_ctcp: AtomicBool::new(false),
        }
    }

    /// Store with no persistence. For tests and ephemeral sessions.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(NullConfigStore))
    }

    /// Seed a store from a persisted snapshot.
    ///
    /// Masks are re-normalized and deduped defensively; nothing is written
    /// back and no change events are emitted.
    pub fn with_seed(seed: IgnoreSeed, config: Arc<dyn ConfigStore>) -> Self {
        let store = Self::new(config);
        let mut hard_count = 0usize;
        let mut soft_count = 0usize;

        for (server_id, server) in seed.servers {
            if server_id.trim().is_empty() {
                continue;
            }
            let lists = store.lists(&server_id);

            let mut order = lists.hard_order.write();
            for record in server.masks {
                if record.mask.trim().is_empty() {
                    continue;
                }
                let mask = normalize_mask(&record.mask);
                let key = fold(&mask);
                if lists.hard_rules.contains_key(&key) {
                    continue;
                }
                let mut record = record;
                record.mask = mask.clone();
                lists.hard_rules.insert(key, Arc::new(record.to_rule()));
                order.push(mask);
                hard_count += 1;
            }
            drop(order);

            let mut order = lists.soft_order.write();
            for raw in server.soft_masks {
                if raw.trim().is_empty() {
                    continue;
                }
                let mask = normalize_mask(&raw);
                if !order.iter().any(|seen| eq_fold(seen, &mask)) {
                    order.push(mask);
                    soft_count += 1;
                }
            }
        }

        debug!(
            servers = store.servers.len(),
            hard = hard_count,
            soft = soft_count,
            "Ignore lists loaded"
        );
        store
    }

    // ------------------------------------------------------------------
    // Query surface
    // ------------------------------------------------------------------

    /// Hard masks for `server_id` in insertion order. Snapshot, never a
    /// live reference.
    pub fn list_masks(&self, server_id: &str) -> Vec<String> {
        self.lists_if_present(server_id)
            .map(|lists| lists.hard_order.read().clone())
            .unwrap_or_default()
    }

    /// Soft masks for `server_id` in insertion order. Snapshot.
    pub fn list_soft_masks(&self, server_id: &str) -> Vec<String> {
        self.lists_if_present(server_id)
            .map(|lists| lists.soft_order.read().clone())
            .unwrap_or_default()
    }

    /// Levels for a hard mask; `{All}` when absent.
    pub fn levels_for(&self, server_id: &str, mask_or_nick: &str) -> IgnoreLevels {
        self.rule_for(server_id, mask_or_nick)
            .map(|rule| rule.levels())
            .unwrap_or(IgnoreLevels::ALL)
    }

    /// Channel scope for a hard mask; empty when absent or unscoped.
    pub fn channels_for(&self, server_id: &str, mask_or_nick: &str) -> Vec<String> {
        self.rule_for(server_id, mask_or_nick)
            .map(|rule| rule.channels().to_vec())
            .unwrap_or_default()
    }

    /// Expiry for a hard mask in epoch milliseconds; `0` when absent or
    /// permanent.
    pub fn expires_at_for(&self, server_id: &str, mask_or_nick: &str) -> i64 {
        self.rule_for(server_id, mask_or_nick)
            .and_then(|rule| rule.expires_at_ms())
            .unwrap_or(0)
    }

    /// Text filter pattern for a hard mask; empty when absent.
    pub fn text_pattern_for(&self, server_id: &str, mask_or_nick: &str) -> String {
        self.rule_for(server_id, mask_or_nick)
            .and_then(|rule| rule.filter().map(|f| f.pattern().to_string()))
            .unwrap_or_default()
    }

    /// Text filter mode for a hard mask; `Glob` when absent.
    pub fn text_pattern_mode_for(&self, server_id: &str, mask_or_nick: &str) -> TextFilterMode {
        self.rule_for(server_id, mask_or_nick)
            .and_then(|rule| rule.filter().map(|f| f.mode()))
            .unwrap_or_default()
    }

    /// Reply-suppression flag for a hard mask; `false` when absent.
    pub fn replies_for(&self, server_id: &str, mask_or_nick: &str) -> bool {
        self.rule_for(server_id, mask_or_nick)
            .map(|rule| rule.match_replies())
            .unwrap_or(false)
    }

    // ------------------------------------------------------------------
    // Command surface
    // ------------------------------------------------------------------

    /// Insert or replace a hard-ignore rule.
    ///
    /// The mask is normalized first; when it is already present (under
    /// case-insensitive comparison) the stored display casing wins and the
    /// rule's metadata is replaced only if something differs.
    #[allow(clippy::too_many_arguments)]
    pub fn add_mask_with_levels(
        &self,
        server_id: &str,
        mask_or_nick: &str,
        levels: IgnoreLevels,
        channels: Vec<String>,
        expires_at_ms: Option<i64>,
        pattern: &str,
        mode: TextFilterMode,
        match_replies: bool,
    ) -> AddOutcome {
        if server_id.trim().is_empty() || mask_or_nick.trim().is_empty() {
            return AddOutcome::Unchanged;
        }

        let mask = normalize_mask(mask_or_nick);
        let key = fold(&mask);
        let lists = self.lists(server_id);
        let mut order = lists.hard_order.write();

        let existing = lists.hard_rules.get(&key).map(|slot| slot.value().clone());
        let display_mask = existing
            .as_ref()
            .map(|rule| rule.mask().to_string())
            .unwrap_or_else(|| mask.clone());

        let rule = Arc::new(HardIgnoreRule::new(
            display_mask.clone(),
            levels,
            channels,
            expires_at_ms,
            pattern,
            mode,
            match_replies,
        ));

        let outcome = match existing {
            Some(current) if *current == *rule => AddOutcome::Unchanged,
            Some(_) => {
                lists.hard_rules.insert(key, rule.clone());
                AddOutcome::Updated
            }
            None => {
                lists.hard_rules.insert(key, rule.clone());
                order.push(display_mask.clone());
                AddOutcome::Added
            }
        };

        if outcome != AddOutcome::Unchanged {
            self.config.remember_hard_rule(server_id, &rule);
            drop(order);
            self.notify(server_id, IgnoreChangeKind::Ignore);
            debug!(server = server_id, mask = %display_mask, outcome = ?outcome, "Hard ignore stored");
        }
        outcome
    }

    /// Add a hard mask with default metadata. Returns whether it was newly
    /// added.
    pub fn add_mask(&self, server_id: &str, mask_or_nick: &str) -> bool {
        self.add_mask_with_levels(
            server_id,
            mask_or_nick,
            IgnoreLevels::EMPTY,
            Vec::new(),
            None,
            "",
            TextFilterMode::Glob,
            false,
        ) == AddOutcome::Added
    }

    /// Add a soft mask. Returns whether it was newly added.
    pub fn add_soft_mask(&self, server_id: &str, mask_or_nick: &str) -> bool {
        if server_id.trim().is_empty() || mask_or_nick.trim().is_empty() {
            return false;
        }

        let mask = normalize_mask(mask_or_nick);
        let lists = self.lists(server_id);
        let mut order = lists.soft_order.write();
        if order.iter().any(|seen| eq_fold(seen, &mask)) {
            return false;
        }
        order.push(mask.clone());
        self.config.remember_soft_mask(server_id, &mask);
        drop(order);

        self.notify(server_id, IgnoreChangeKind::SoftIgnore);
        debug!(server = server_id, mask = %mask, "Soft ignore stored");
        true
    }

    /// Remove a hard mask and its metadata. Returns whether anything was
    /// removed.
    pub fn remove_mask(&self, server_id: &str, mask_or_nick: &str) -> bool {
        let Some(lists) = self.lists_if_present(server_id) else {
            return false;
        };

        let key = fold(&normalize_mask(mask_or_nick));
        let mut order = lists.hard_order.write();
        let Some(position) = order.iter().position(|mask| fold(mask) == key) else {
            return false;
        };
        let display_mask = order.remove(position);
        lists.hard_rules.remove(&key);
        self.config.forget_hard_mask(server_id, &display_mask);
        drop(order);

        self.notify(server_id, IgnoreChangeKind::Ignore);
        debug!(server = server_id, mask = %display_mask, "Hard ignore removed");
        true
    }

    /// Remove a soft mask. Returns whether anything was removed.
    pub fn remove_soft_mask(&self, server_id: &str, mask_or_nick: &str) -> bool {
        let Some(lists) = self.lists_if_present(server_id) else {
            return false;
        };

        let mask = normalize_mask(mask_or_nick);
        let mut order = lists.soft_order.write();
        let Some(position) = order.iter().position(|seen| eq_fold(seen, &mask)) else {
            return false;
        };
        let display_mask = order.remove(position);
        self.config.forget_soft_mask(server_id, &display_mask);
        drop(order);

        self.notify(server_id, IgnoreChangeKind::SoftIgnore);
        debug!(server = server_id, mask = %display_mask, "Soft ignore removed");
        true
    }

    /// Remove every hard rule whose expiry is at or before `now_ms`.
    /// Returns the number removed.
    pub fn prune_expired(&self, server_id: &str, now_ms: i64) -> usize {
        let Some(lists) = self.lists_if_present(server_id) else {
            return 0;
        };

        let mut order = lists.hard_order.write();
        let mut removed = 0usize;
        order.retain(|display| {
            let key = fold(display);
            let expired = lists
                .hard_rules
                .get(&key)
                .is_some_and(|rule| rule.is_expired(now_ms));
            if expired {
                lists.hard_rules.remove(&key);
                self.config.forget_hard_mask(server_id, display);
                removed += 1;
            }
            !expired
        });
        drop(order);

        if removed > 0 {
            self.notify(server_id, IgnoreChangeKind::Ignore);
            debug!(server = server_id, count = removed, "Pruned expired ignore rules");
        }
        removed
    }

    /// Remove every list for `server_id`. Returns whether the server was
    /// known.
    pub fn remove_server(&self, server_id: &str) -> bool {
        let Some((_, lists)) = self.servers.remove(server_id) else {
            return false;
        };

        let had_hard = !lists.hard_order.read().is_empty();
        let had_soft = !lists.soft_order.read().is_empty();
        self.config.forget_server(server_id);
        if had_hard {
            self.notify(server_id, IgnoreChangeKind::Ignore);
        }
        if had_soft {
            self.notify(server_id, IgnoreChangeKind::SoftIgnore);
        }
        debug!(server = server_id, "Ignore lists removed");
        true
    }

    // ------------------------------------------------------------------
    // Flags
    // ------------------------------------------------------------------

    /// Whether CTCP requests are subject to hard ignores.
    pub fn hard_ignores_ctcp(&self) -> bool {
        self.hard_ignores_ctcp.load(Ordering::Relaxed)
    }

    /// Set whether CTCP requests are subject to hard ignores.
    pub fn set_hard_ignores_ctcp(&self, value: bool) {
        self.hard_ignores_ctcp.store(value, Ordering::Relaxed);
    }

    /// Whether CTCP requests are subject to soft ignores.
    pub fn soft_ignores_ctcp(&self) -> bool {
        self.soft_ignores_ctcp.load(Ordering::Relaxed)
    }

    /// Set whether CTCP requests are subject to soft ignores.
    pub fn set_soft_ignores_ctcp(&self, value: bool) {
        self.soft_ignores_ctcp.store(value, Ordering::Relaxed);
    }

    // ------------------------------------------------------------------
    // Notifications and snapshots
    // ------------------------------------------------------------------

    /// Subscribe to change notifications.
    ///
    /// Slow receivers may observe `Lagged` and should rebuild any derived
    /// state from fresh snapshots.
    pub fn subscribe(&self) -> broadcast::Receiver<IgnoreChange> {
        self.changes.subscribe()
    }

    /// Snapshot the whole store in persisted-seed shape.
    pub fn export_seed(&self) -> IgnoreSeed {
        let mut seed = IgnoreSeed::default();
        for entry in self.servers.iter() {
            let lists = entry.value();
            let mut server = ServerSeed::default();

            let order = lists.hard_order.read();
            for display in order.iter() {
                if let Some(rule) = lists.hard_rules.get(&fold(display)) {
                    server.masks.push(HardMaskSeed::from_rule(rule.value()));
                }
            }
            drop(order);
            server.soft_masks = lists.soft_order.read().clone();

            if !server.masks.is_empty() || !server.soft_masks.is_empty() {
                seed.servers.insert(entry.key().clone(), server);
            }
        }
        seed
    }

    pub(crate) fn snapshot(&self, server_id: &str) -> Arc<ServerSnapshot> {
        let Some(lists) = self.lists_if_present(server_id) else {
            return Arc::new(ServerSnapshot::default());
        };

        let order = lists.hard_order.read();
        let hard = order
            .iter()
            .filter_map(|display| {
                lists
                    .hard_rules
                    .get(&fold(display))
                    .map(|slot| slot.value().clone())
            })
            .collect();
        drop(order);
        let soft = lists.soft_order.read().clone();
        Arc::new(ServerSnapshot { hard, soft })
    }

    fn lists(&self, server_id: &str) -> Arc<ServerLists> {
        self.servers
            .entry(server_id.to_string())
            .or_default()
            .clone()
    }

    fn lists_if_present(&self, server_id: &str) -> Option<Arc<ServerLists>> {
        self.servers.get(server_id).map(|entry| entry.value().clone())
    }

    fn notify(&self, server_id: &str, kind: IgnoreChangeKind) {
        // Send fails only when nobody subscribed; that is fine.
        let _ = self.changes.send(IgnoreChange {
            server_id: server_id.to_string(),
            kind,
        });
    }

    fn rule_for(&self, server_id: &str, mask_or_nick: &str) -> Option<Arc<HardIgnoreRule>> {
        let lists = self.lists_if_present(server_id)?;
        let key = fold(&normalize_mask(mask_or_nick));
        lists.hard_rules.get(&key).map(|slot| slot.value().clone())
    }
}
