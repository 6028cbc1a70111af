//! Message-kind levels scoping ignore rules.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kind of inbound event an ignore rule applies to.
///
/// `All` is a sentinel matching any kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IgnoreLevel {
    /// Every message kind.
    All,
    /// Private messages.
    Msgs,
    /// Public channel messages.
    Public,
    /// Notices.
    Notices,
    /// CTCP requests (VERSION, PING, ...).
    Ctcp,
    /// Channel invitations.
    Invites,
    /// DCC offers.
    Dcc,
}

impl IgnoreLevel {
    /// Every variant, in display order.
    pub const ALL_VARIANTS: [IgnoreLevel; 7] = [
        IgnoreLevel::All,
        IgnoreLevel::Msgs,
        IgnoreLevel::Public,
        IgnoreLevel::Notices,
        IgnoreLevel::Ctcp,
        IgnoreLevel::Invites,
        IgnoreLevel::Dcc,
    ];

    /// Canonical config/display name.
    pub fn name(self) -> &'static str {
        match self {
            IgnoreLevel::All => "all",
            IgnoreLevel::Msgs => "msgs",
            IgnoreLevel::Public => "public",
            IgnoreLevel::Notices => "notices",
            IgnoreLevel::Ctcp => "ctcp",
            IgnoreLevel::Invites => "invites",
            IgnoreLevel::Dcc => "dcc",
        }
    }

    const fn bit(self) -> u8 {
        match self {
            IgnoreLevel::All => 1,
            IgnoreLevel::Msgs => 1 << 1,
            IgnoreLevel::Public => 1 << 2,
            IgnoreLevel::Notices => 1 << 3,
            IgnoreLevel::Ctcp => 1 << 4,
            IgnoreLevel::Invites => 1 << 5,
            IgnoreLevel::Dcc => 1 << 6,
        }
    }
}

impl fmt::Display for IgnoreLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error for level names no variant answers to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown ignore level: {0}")]
pub struct UnknownLevel(String);

impl FromStr for IgnoreLevel {
    type Err = UnknownLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        Self::ALL_VARIANTS
            .into_iter()
            .find(|level| level.name() == name)
            .ok_or(UnknownLevel(name))
    }
}

/// A small set of [`IgnoreLevel`]s with O(1) intersection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct IgnoreLevels(u8);

impl IgnoreLevels {
    /// The empty set.
    pub const EMPTY: Self = Self(0);

    /// The set containing only the `All` sentinel.
    pub const ALL: Self = Self(IgnoreLevel::All.bit());

    /// Add a level.
    pub fn insert(&mut self, level: IgnoreLevel) {
        self.0 |= level.bit();
    }

    /// Whether `level` is in the set.
    pub fn contains(self, level: IgnoreLevel) -> bool {
        self.0 & level.bit() != 0
    }

    /// Whether no level is set.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether a rule carrying `self` applies to an event tagged `kinds`:
    /// true when the rule contains `All` or the sets intersect.
    pub fn applies_to(self, kinds: IgnoreLevels) -> bool {
        self.contains(IgnoreLevel::All) || self.0 & kinds.0 != 0
    }

    /// The empty set normalizes to `{All}`; anything else is unchanged.
    pub fn or_all(self) -> Self {
        if self.is_empty() { Self::ALL } else { self }
    }

    /// Levels in the set, in display order.
    pub fn iter(self) -> impl Iterator<Item = IgnoreLevel> {
        IgnoreLevel::ALL_VARIANTS
            .into_iter()
            .filter(move |level| self.contains(*level))
    }
}

impl From<IgnoreLevel> for IgnoreLevels {
    fn from(level: IgnoreLevel) -> Self {
        let mut levels = Self::EMPTY;
        levels.insert(level);
        levels
    }
}

impl FromIterator<IgnoreLevel> for IgnoreLevels {
    fn from_iter<I: IntoIterator<Item = IgnoreLevel>>(iter: I) -> Self {
        let mut levels = Self::EMPTY;
        for level in iter {
            levels.insert(level);
        }
        levels
    }
}

impl fmt::Display for IgnoreLevels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for level in self.iter() {
            if !first {
                f.write_str(",")?;
            }
            first = false;
            f.write_str(level.name())?;
        }
        Ok(())
    }
}
