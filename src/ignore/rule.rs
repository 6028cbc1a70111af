//! Immutable hard-ignore rule values.
//!
//! A rule is built once and never mutated; the store replaces the whole
//! value under its per-mask slot on update, so readers always observe a
//! coherent rule.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use slirc_mask::{eq_fold, wildcard_matches};
use tracing::warn;

use super::level::IgnoreLevels;

/// How a rule's text filter interprets its pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextFilterMode {
    /// `*`/`?` wildcard match over the whole message.
    #[default]
    Glob,
    /// Case-insensitive regular expression, partial match.
    Regexp,
    /// Exact case-insensitive equality.
    Full,
}

/// A message-text constraint on a hard-ignore rule.
///
/// Regexps compile once at construction. A malformed pattern produces a
/// filter that never matches; only the rule carrying it is affected.
#[derive(Debug, Clone)]
pub struct TextFilter {
    pattern: String,
    mode: TextFilterMode,
    regex: Option<Regex>,
}

impl TextFilter {
    /// Build a filter for `pattern` under `mode`.
    pub fn new(pattern: impl Into<String>, mode: TextFilterMode) -> Self {
        let pattern = pattern.into();
        let regex = match mode {
            TextFilterMode::Regexp => {
                match RegexBuilder::new(&pattern).case_insensitive(true).build() {
                    Ok(regex) => Some(regex),
                    Err(err) => {
                        warn!(
                            pattern = %pattern,
                            error = %err,
                            "Invalid ignore text filter regex; filter will never match"
                        );
                        None
                    }
                }
            }
            TextFilterMode::Glob | TextFilterMode::Full => None,
        };
        Self { pattern, mode, regex }
    }

    /// The raw pattern as entered.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The configured mode.
    pub fn mode(&self) -> TextFilterMode {
        self.mode
    }

    /// Whether `text` satisfies this filter.
    pub fn matches(&self, text: &str) -> bool {
        match self.mode {
            TextFilterMode::Glob => wildcard_matches(&self.pattern, text),
            TextFilterMode::Regexp => self.regex.as_ref().is_some_and(|re| re.is_match(text)),
            TextFilterMode::Full => eq_fold(&self.pattern, text),
        }
    }
}

// The compiled regex is derived state; identity is pattern + mode.
impl PartialEq for TextFilter {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern && self.mode == other.mode
    }
}

impl Eq for TextFilter {}

/// A hard-ignore rule.
///
/// Construction normalizes the metadata: empty levels fall back to `{All}`,
/// channel entries not starting with `#`/`&` are dropped and the rest
/// deduped case-insensitively, a zero expiry means never, and an empty
/// pattern means no text filter.
#[derive(Debug, Clone, PartialEq)]
pub struct HardIgnoreRule {
    mask: String,
    levels: IgnoreLevels,
    channels: Vec<String>,
    expires_at_ms: Option<i64>,
    filter: Option<TextFilter>,
    match_replies: bool,
}

impl HardIgnoreRule {
    /// Build a rule around an already-normalized mask.
    pub fn new(
        mask: impl Into<String>,
        levels: IgnoreLevels,
        channels: Vec<String>,
        expires_at_ms: Option<i64>,
        pattern: &str,
        mode: TextFilterMode,
        match_replies: bool,
    ) -> Self {
        let filter =
            (!pattern.is_empty()).then(|| TextFilter::new(pattern, mode));
        Self {
            mask: mask.into(),
            levels: levels.or_all(),
            channels: normalize_channels(channels),
            expires_at_ms: expires_at_ms.filter(|&ms| ms != 0),
            filter,
            match_replies,
        }
    }

    /// The canonical mask, display casing.
    pub fn mask(&self) -> &str {
        &self.mask
    }

    /// Message kinds this rule applies to; never empty.
    pub fn levels(&self) -> IgnoreLevels {
        self.levels
    }

    /// Channel scope; empty means unscoped.
    pub fn channels(&self) -> &[String] {
        &self.channels
    }

    /// Expiry in epoch milliseconds, `None` for never.
    pub fn expires_at_ms(&self) -> Option<i64> {
        self.expires_at_ms
    }

    /// Text constraint, if any.
    pub fn filter(&self) -> Option<&TextFilter> {
        self.filter.as_ref()
    }

    /// Whether the rule also suppresses replies addressed to its nick.
    pub fn match_replies(&self) -> bool {
        self.match_replies
    }

    /// Lazy expiry check against a caller-supplied clock.
    pub fn is_expired(&self, now_ms: i64) -> bool {
        self.expires_at_ms.is_some_and(|at| at <= now_ms)
    }

    /// Whether the rule's channel scope covers `channel`.
    ///
    /// `None` is a private message: an unscoped rule covers it, a scoped
    /// rule never fires there.
    pub fn applies_in_channel(&self, channel: Option<&str>) -> bool {
        if self.channels.is_empty() {
            return true;
        }
        match channel {
            Some(chan) if !chan.is_empty() => {
                self.channels.iter().any(|scoped| eq_fold(scoped, chan))
            }
            _ => false,
        }
    }

    /// Whether the rule's text constraint passes for `text`.
    pub fn text_matches(&self, text: Option<&str>) -> bool {
        match &self.filter {
            None => true,
            Some(filter) => filter.matches(text.unwrap_or("")),
        }
    }
}

fn normalize_channels(channels: Vec<String>) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(channels.len());
    for channel in channels {
        let channel = channel.trim();
        if !channel.starts_with('#') && !channel.starts_with('&') {
            continue;
        }
        if !normalized.iter().any(|seen| eq_fold(seen, channel)) {
            normalized.push(channel.to_string());
        }
    }
    normalized
}
