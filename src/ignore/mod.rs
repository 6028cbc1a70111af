//! Ignore rules and the inbound moderation policy.
//!
//! Provides:
//! - **Levels**: message-kind tags scoping a rule, as a small bit-set
//! - **Rules**: immutable hard-ignore values (mask, levels, channel scope,
//!   expiry, text filter, reply flag)
//! - **Store**: per-server concurrent lists with a command surface,
//!   persistence hooks, and a change broadcast
//! - **Resolver**: picks the identity (hostmask or nick) a sender is
//!   matched under, with a learned-hostmask fallback
//! - **Policy**: the decision function `ALLOW` / `SOFT_SPOILER` /
//!   `HARD_DROP`
//!
//! # Architecture
//!
//! ```text
//! inbound event ──► InboundPolicy::decide
//!                     │  resolve identity (IdentityResolver ◄── HostmaskDirectory)
//!                     │  snapshot lists   (SnapshotCache ◄── IgnoreStore changes)
//!                     ▼
//!                  hard rules → reply echo → soft masks → Allow
//! ```

pub mod level;
pub mod policy;
pub mod resolver;
pub mod rule;
pub mod store;

pub use level::{IgnoreLevel, IgnoreLevels};
pub use policy::{InboundEvent, InboundPolicy, Verdict};
pub use resolver::{HostmaskDirectory, IdentityResolver, NullDirectory, ResolvedIdentity};
pub use rule::{HardIgnoreRule, TextFilter, TextFilterMode};
pub use store::{AddOutcome, IgnoreChange, IgnoreChangeKind, IgnoreStore};
