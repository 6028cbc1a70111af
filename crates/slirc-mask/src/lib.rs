//! # slirc-mask
//!
//! Hostmask pattern primitives for IRC moderation tooling: RFC 1459 case
//! folding, `*`/`?` wildcard matching, and canonicalization of free-form
//! user input into `nick!user@host` patterns.
//!
//! ## Quick Start
//!
//! ```rust
//! use slirc_mask::{normalize_mask, wildcard_matches};
//!
//! // Whatever the user types becomes a well-formed mask...
//! assert_eq!(normalize_mask("alice"), "alice!*@*");
//! assert_eq!(normalize_mask("spam@bad.example"), "*!spam@bad.example");
//! assert_eq!(normalize_mask("10.0.0.1"), "*!*@10.0.0.1");
//!
//! // ...which matches senders case-insensitively.
//! assert!(wildcard_matches("alice!*@*", "Alice!ident@host.example"));
//! assert!(wildcard_matches("*!*@*.example", "bob!x@cloak.example"));
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod casefold;
pub mod hostmask;
pub mod wildcard;

pub use casefold::{eq_fold, fold, fold_char};
pub use hostmask::{is_useful_hostmask, nick_glob, normalize_mask, HostmaskParts};
pub use wildcard::{hostmask_targeted_by_any, nick_targeted_by_any, wildcard_matches};
