//! The inbound decision function.
//!
//! `decide` is computed fresh per message: resolve the sender's identity,
//! walk the hard rules (direct match, then reply-echo), then the soft
//! masks, short-circuiting at the first positive. Nothing here mutates the
//! store, and a misconfigured rule is treated as non-matching rather than
//! failing the message.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::TryRecvError;

use slirc_mask::{fold, hostmask_targeted_by_any, nick_glob, nick_targeted_by_any};

use super::level::IgnoreLevels;
use super::resolver::{HostmaskDirectory, IdentityResolver, ResolvedIdentity};
use super::rule::HardIgnoreRule;
use super::store::{now_ms, IgnoreChange, IgnoreStore, ServerSnapshot};

/// Decision for one inbound event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Deliver normally.
    Allow,
    /// Deliver collapsed: the sender is soft-ignored.
    SoftSpoiler,
    /// Drop entirely.
    HardDrop,
}

/// One inbound chat event, as the policy sees it.
#[derive(Debug, Clone, Copy)]
pub struct InboundEvent<'a> {
    /// Connection the event arrived on.
    pub server_id: &'a str,
    /// Sender's nick.
    pub sender_nick: &'a str,
    /// Sender's full hostmask, when the transport knows it.
    pub sender_hostmask: Option<&'a str>,
    /// Whether this is a CTCP request.
    pub ctcp: bool,
    /// Kind tags describing the event.
    pub kinds: IgnoreLevels,
    /// Target channel; `None` for private messages.
    pub channel: Option<&'a str>,
    /// Message text, when the event carries any.
    pub text: Option<&'a str>,
}

impl InboundEvent<'_> {
    fn in_channel(&self) -> bool {
        self.channel.is_some_and(|chan| !chan.is_empty())
    }
}

/// The decision surface over an [`IgnoreStore`].
pub struct InboundPolicy {
    store: Arc<IgnoreStore>,
    resolver: IdentityResolver,
    cache: SnapshotCache,
}

impl InboundPolicy {
    /// Policy over `store`, resolving unknown senders through `directory`.
    pub fn new(store: Arc<IgnoreStore>, directory: Arc<dyn HostmaskDirectory>) -> Self {
        let cache = SnapshotCache::new(store.subscribe());
        Self {
            store,
            resolver: IdentityResolver::new(directory),
            cache,
        }
    }

    /// Decide the fate of one inbound event.
    ///
    /// Blank `server_id`/`sender_nick` always allow; expired rules never
    /// match; a rule with a bad text filter simply does not fire.
    pub fn decide(&self, event: &InboundEvent<'_>) -> Verdict {
        if event.server_id.trim().is_empty() || event.sender_nick.trim().is_empty() {
            return Verdict::Allow;
        }

        let snapshot = self.cache.snapshot(&self.store, event.server_id);
        if snapshot.hard.is_empty() && snapshot.soft.is_empty() {
            return Verdict::Allow;
        }

        let sender = self
            .resolver
            .resolve(event.server_id, event.sender_nick, event.sender_hostmask);
        let now = now_ms();
        let hard_ctcp = self.store.hard_ignores_ctcp();

        // Direct hard match against the resolved identity.
        for rule in &snapshot.hard {
            if rule.is_expired(now) {
                continue;
            }
            if sender_matches(rule, &sender)
                && gates_hold(rule, event, hard_ctcp)
                && rule.text_matches(event.text)
            {
                return Verdict::HardDrop;
            }
        }

        // Reply-echo suppression: channel messages addressing an ignored
        // nick, regardless of who sent them.
        if event.in_channel() {
            if let Some(text) = event.text {
                for rule in &snapshot.hard {
                    if !rule.match_replies() || rule.is_expired(now) {
                        continue;
                    }
                    if addresses_nick(text, nick_glob(rule.mask()))
                        && gates_hold(rule, event, hard_ctcp)
                    {
                        return Verdict::HardDrop;
                    }
                }
            }
        }

        if (!event.ctcp || self.store.soft_ignores_ctcp())
            && identity_in_masks(&snapshot.soft, &sender)
        {
            return Verdict::SoftSpoiler;
        }

        Verdict::Allow
    }
}

fn sender_matches(rule: &HardIgnoreRule, sender: &ResolvedIdentity) -> bool {
    let mask = std::iter::once(rule.mask());
    if sender.from_hostmask {
        hostmask_targeted_by_any(mask, &sender.identity)
    } else {
        nick_targeted_by_any(mask, &sender.identity)
    }
}

fn identity_in_masks(masks: &[String], sender: &ResolvedIdentity) -> bool {
    if sender.from_hostmask {
        hostmask_targeted_by_any(masks, &sender.identity)
    } else {
        nick_targeted_by_any(masks, &sender.identity)
    }
}

/// Level, channel, and CTCP gates shared by direct and reply-echo matching.
/// The text filter is a direct-match concern only.
fn gates_hold(rule: &HardIgnoreRule, event: &InboundEvent<'_>, ignores_ctcp: bool) -> bool {
    if event.ctcp && !ignores_ctcp {
        return false;
    }
    rule.levels().applies_to(event.kinds) && rule.applies_in_channel(event.channel)
}

/// Reply detection: does `text` address `nick`?
///
/// Only literal nicks participate; a glob with `*`/`?` names nobody in
/// particular. After RFC 1459 folding, the text matches when it starts with
/// the nick directly followed by `:` or `,`, or contains the nick bounded
/// on both sides by characters outside the nick alphabet (ASCII
/// alphanumerics plus ``[]{}\|^`-_``) or by the text edges.
fn addresses_nick(text: &str, nick: &str) -> bool {
    if nick.is_empty() || nick.contains(['*', '?']) {
        return false;
    }
    let text = fold(text);
    let nick = fold(nick);

    if let Some(rest) = text.strip_prefix(&nick) {
        if rest.starts_with(':') || rest.starts_with(',') {
            return true;
        }
    }

    let mut from = 0;
    while let Some(found) = text[from..].find(&nick) {
        let at = from + found;
        let end = at + nick.len();
        let bounded_left = text[..at].chars().next_back().is_none_or(|c| !is_nick_char(c));
        let bounded_right = text[end..].chars().next().is_none_or(|c| !is_nick_char(c));
        if bounded_left && bounded_right {
            return true;
        }
        from = at + text[at..].chars().next().map_or(1, char::len_utf8);
    }
    false
}

/// Characters that may appear in an IRC nick.
fn is_nick_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(c, '[' | ']' | '{' | '}' | '\\' | '|' | '^' | '`' | '-' | '_')
}

/// Per-server snapshot cache, invalidated by store change events.
///
/// The receiver is drained non-blockingly before every lookup; a lagged or
/// closed stream clears everything rather than risk serving stale rules.
struct SnapshotCache {
    changes: Mutex<broadcast::Receiver<IgnoreChange>>,
    snapshots: DashMap<String, Arc<ServerSnapshot>>,
}

impl SnapshotCache {
    fn new(changes: broadcast::Receiver<IgnoreChange>) -> Self {
        Self {
            changes: Mutex::new(changes),
            snapshots: DashMap::new(),
        }
    }

    fn snapshot(&self, store: &IgnoreStore, server_id: &str) -> Arc<ServerSnapshot> {
        self.drain_changes();
        if let Some(hit) = self.snapshots.get(server_id) {
            return hit.value().clone();
        }
        let fresh = store.snapshot(server_id);
        self.snapshots.insert(server_id.to_string(), fresh.clone());
        fresh
    }

    fn drain_changes(&self) {
        let mut changes = self.changes.lock();
        loop {
            match changes.try_recv() {
                Ok(change) => {
                    self.snapshots.remove(&change.server_id);
                }
                Err(TryRecvError::Lagged(_)) => {
                    self.snapshots.clear();
                }
                Err(TryRecvError::Closed) => {
                    self.snapshots.clear();
                    break;
                }
                Err(TryRecvError::Empty) => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_addresses_nick_reply_prefix() {
        assert!(addresses_nick("alice: ping", "alice"));
        assert!(addresses_nick("Alice, got a minute?", "alice"));
        assert!(addresses_nick("ALICE: PING", "Alice"));
        assert!(!addresses_nick("alices: ping", "alice"));
    }

    #[test]
    fn test_addresses_nick_standalone_word() {
        assert!(addresses_nick("I agree with alice on this", "alice"));
        assert!(addresses_nick("(alice)", "alice"));
        assert!(addresses_nick("alice", "alice"));
        assert!(!addresses_nick("malice is a word", "alice"));
        assert!(!addresses_nick("alice2 said so", "alice"));
        assert!(!addresses_nick("hello all", "alice"));
    }

    #[test]
    fn test_addresses_nick_rfc1459_folding() {
        assert!(addresses_nick("nick{a}: hi", "NICK[A]"));
    }

    #[test]
    fn test_addresses_nick_rejects_globs() {
        assert!(!addresses_nick("anything at all", "*"));
        assert!(!addresses_nick("al: hi", "al?ce"));
        assert!(!addresses_nick("", "alice"));
    }

    #[test]
    fn test_nick_char_alphabet() {
        for c in ['a', 'Z', '0', '[', '}', '|', '^', '`', '-', '_'] {
            assert!(is_nick_char(c), "{c:?} should be a nick char");
        }
        for c in [' ', ':', ',', '!', '@', '(', '.'] {
            assert!(!is_nick_char(c), "{c:?} should not be a nick char");
        }
    }
}
