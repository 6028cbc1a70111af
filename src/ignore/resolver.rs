//! Sender identity resolution for inbound events.
//!
//! Masks are written against full hostmasks, but an inbound event often
//! carries only a nick. The resolver prefers a real hostmask (provided or
//! learned) and degrades to the bare nick, never failing: it sits on the
//! message path.

use std::sync::Arc;

use slirc_mask::is_useful_hostmask;
use tracing::debug;

/// Read-only access to learned hostmasks.
///
/// Implementations typically sit over a user directory populated from
/// traffic this engine never sees directly. Lookups may fail; the resolver
/// swallows errors and falls back to nick matching.
pub trait HostmaskDirectory: Send + Sync {
    /// Best known hostmask for `nick` on `server_id`, if any.
    fn learned_hostmask(&self, server_id: &str, nick: &str) -> anyhow::Result<Option<String>>;
}

/// A directory that knows nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDirectory;

impl HostmaskDirectory for NullDirectory {
    fn learned_hostmask(&self, _server_id: &str, _nick: &str) -> anyhow::Result<Option<String>> {
        Ok(None)
    }
}

/// The identity string a sender is matched under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    /// Full hostmask or bare nick.
    pub identity: String,
    /// True when `identity` is a hostmask (match masks directly); false for
    /// the nick fallback (match nick-globs only).
    pub from_hostmask: bool,
}

/// Picks the most specific identity available for a sender.
pub struct IdentityResolver {
    directory: Arc<dyn HostmaskDirectory>,
}

impl IdentityResolver {
    /// Resolver backed by `directory`.
    pub fn new(directory: Arc<dyn HostmaskDirectory>) -> Self {
        Self { directory }
    }

    /// Resolve the identity to match `nick` under.
    ///
    /// Order: a useful provided hostmask, then a useful learned hostmask,
    /// then the bare nick. Directory failures degrade to the nick fallback.
    pub fn resolve(
        &self,
        server_id: &str,
        nick: &str,
        hostmask: Option<&str>,
    ) -> ResolvedIdentity {
        if let Some(mask) = hostmask {
            if is_useful_hostmask(mask) {
                return ResolvedIdentity {
                    identity: mask.to_string(),
                    from_hostmask: true,
                };
            }
        }

        if !nick.is_empty() {
            match self.directory.learned_hostmask(server_id, nick) {
                Ok(Some(learned)) if is_useful_hostmask(&learned) => {
                    return ResolvedIdentity {
                        identity: learned,
                        from_hostmask: true,
                    };
                }
                Ok(_) => {}
                Err(err) => {
                    debug!(
                        server = server_id,
                        nick,
                        error = %err,
                        "Learned-hostmask lookup failed; falling back to nick"
                    );
                }
            }
        }

        ResolvedIdentity {
            identity: nick.to_string(),
            from_hostmask: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedDirectory(Option<String>);

    impl HostmaskDirectory for FixedDirectory {
        fn learned_hostmask(&self, _: &str, _: &str) -> anyhow::Result<Option<String>> {
            Ok(self.0.clone())
        }
    }

    struct BrokenDirectory;

    impl HostmaskDirectory for BrokenDirectory {
        fn learned_hostmask(&self, _: &str, _: &str) -> anyhow::Result<Option<String>> {
            anyhow::bail!("directory offline")
        }
    }

    #[test]
    fn test_useful_hostmask_used_directly() {
        let resolver = IdentityResolver::new(Arc::new(NullDirectory));
        let resolved = resolver.resolve("net", "alice", Some("alice!ident@host.example"));
        assert_eq!(resolved.identity, "alice!ident@host.example");
        assert!(resolved.from_hostmask);
    }

    #[test]
    fn test_useless_hostmask_falls_through() {
        let resolver = IdentityResolver::new(Arc::new(NullDirectory));
        let resolved = resolver.resolve("net", "alice", Some("alice!*@*"));
        assert_eq!(resolved.identity, "alice");
        assert!(!resolved.from_hostmask);
    }

    #[test]
    fn test_learned_hostmask_consulted() {
        let directory = FixedDirectory(Some("alice!ident@learned.example".to_string()));
        let resolver = IdentityResolver::new(Arc::new(directory));
        let resolved = resolver.resolve("net", "alice", None);
        assert_eq!(resolved.identity, "alice!ident@learned.example");
        assert!(resolved.from_hostmask);
    }

    #[test]
    fn test_useless_learned_hostmask_ignored() {
        let directory = FixedDirectory(Some("alice!*@*".to_string()));
        let resolver = IdentityResolver::new(Arc::new(directory));
        let resolved = resolver.resolve("net", "alice", None);
        assert_eq!(resolved.identity, "alice");
        assert!(!resolved.from_hostmask);
    }

    #[test]
    fn test_directory_failure_degrades_to_nick() {
        let resolver = IdentityResolver::new(Arc::new(BrokenDirectory));
        let resolved = resolver.resolve("net", "alice", None);
        assert_eq!(resolved.identity, "alice");
        assert!(!resolved.from_hostmask);
    }
}
