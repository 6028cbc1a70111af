//! # slirc-ignore
//!
//! Ignore-list engine for IRC clients: decides, for every inbound chat
//! event on a connection, whether it is delivered normally, delivered as a
//! collapsed spoiler, or dropped entirely.
//!
//! ## Features
//!
//! - Hard ignore rules (`nick!user@host` wildcard masks) with per-rule
//!   message-kind levels, channel scope, expiry, text filters, and
//!   reply-echo suppression
//! - Soft ignore masks flagged for spoiler-style collapsed display
//! - Hostmask resolution with a learned-hostmask fallback directory
//! - Lock-scoped persistence through a pluggable config collaborator and a
//!   broadcast change stream for cache invalidation
//! - Concurrent command and decision surfaces; decisions take immutable
//!   snapshots and never block mutators
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use slirc_ignore::{
//!     IgnoreLevel, IgnoreLevels, IgnoreStore, InboundEvent, InboundPolicy,
//!     NullDirectory, Verdict,
//! };
//!
//! let store = Arc::new(IgnoreStore::in_memory());
//! store.add_mask("libera", "troll");
//!
//! let policy = InboundPolicy::new(store.clone(), Arc::new(NullDirectory));
//! let verdict = policy.decide(&InboundEvent {
//!     server_id: "libera",
//!     sender_nick: "troll",
//!     sender_hostmask: Some("troll!spam@bad.example"),
//!     ctcp: false,
//!     kinds: IgnoreLevels::from(IgnoreLevel::Public),
//!     channel: Some("#rust"),
//!     text: Some("buy my coin"),
//! });
//! assert_eq!(verdict, Verdict::HardDrop);
//! ```

pub mod config;
pub mod error;
pub mod ignore;

pub use config::{ConfigStore, HardMaskSeed, IgnoreSeed, NullConfigStore, ServerSeed, TomlConfigStore};
pub use error::ConfigError;
pub use ignore::level::{IgnoreLevel, IgnoreLevels};
pub use ignore::policy::{InboundEvent, InboundPolicy, Verdict};
pub use ignore::resolver::{HostmaskDirectory, IdentityResolver, NullDirectory, ResolvedIdentity};
pub use ignore::rule::{HardIgnoreRule, TextFilter, TextFilterMode};
pub use ignore::store::{AddOutcome, IgnoreChange, IgnoreChangeKind, IgnoreStore};
