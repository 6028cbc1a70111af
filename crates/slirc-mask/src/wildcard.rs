//! Wildcard pattern matching over masks and identities.
//!
//! `*` matches any run of characters (including none), `?` matches exactly
//! one. Patterns are anchored at both ends and compared under RFC 1459
//! folding.

use crate::casefold::fold_char;
use crate::hostmask::nick_glob;

/// Match `text` against a `*`/`?` wildcard pattern.
///
/// # Examples
///
/// ```rust
/// use slirc_mask::wildcard_matches;
///
/// assert!(wildcard_matches("a*c", "abc"));
/// assert!(wildcard_matches("a*c", "ac"));
/// assert!(wildcard_matches("a?c", "abc"));
/// assert!(!wildcard_matches("a?c", "ac"));
///
/// // RFC 1459 case-insensitive
/// assert!(wildcard_matches("A*", "apple"));
/// assert!(wildcard_matches("nick[1]!*@*", "NICK{1}!user@host"));
/// ```
pub fn wildcard_matches(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().map(fold_char).collect();
    let text: Vec<char> = text.chars().map(fold_char).collect();
    matches_folded(&pattern, &text)
}

/// Two-pointer scan with backtracking. Each `*` records a restart point; on
/// a later mismatch the scan re-enters just after the most recent `*` with
/// the text advanced by one.
fn matches_folded(pattern: &[char], text: &[char]) -> bool {
    let mut p = 0;
    let mut t = 0;
    let mut restart: Option<(usize, usize)> = None;

    while t < text.len() {
        match pattern.get(p) {
            Some(&'*') => {
                restart = Some((p, t));
                p += 1;
            }
            Some(&pc) if pc == '?' || pc == text[t] => {
                p += 1;
                t += 1;
            }
            _ => match restart {
                Some((star_p, star_t)) => {
                    restart = Some((star_p, star_t + 1));
                    p = star_p + 1;
                    t = star_t + 1;
                }
                None => return false,
            },
        }
    }

    // Trailing stars consume nothing.
    while pattern.get(p) == Some(&'*') {
        p += 1;
    }
    p == pattern.len()
}

/// True when any pattern in `masks` matches the full `hostmask`.
pub fn hostmask_targeted_by_any<I, S>(masks: I, hostmask: &str) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    masks
        .into_iter()
        .any(|mask| wildcard_matches(mask.as_ref(), hostmask))
}

/// True when the nick-glob of any pattern in `masks` matches `nick`.
///
/// Masks whose nick-glob is made of wildcards only (`*!*@host` and friends)
/// are skipped: with no hostmask to compare against, such a mask would match
/// every nick.
pub fn nick_targeted_by_any<I, S>(masks: I, nick: &str) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    masks.into_iter().any(|mask| {
        let glob = nick_glob(mask.as_ref());
        !wildcards_only(glob) && wildcard_matches(glob, nick)
    })
}

fn wildcards_only(glob: &str) -> bool {
    glob.chars().all(|c| c == '*' || c == '?')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_match() {
        assert!(wildcard_matches("alice", "alice"));
        assert!(!wildcard_matches("alice", "alicia"));
        assert!(!wildcard_matches("alice", "alic"));
    }

    #[test]
    fn test_star() {
        assert!(wildcard_matches("*", "anything"));
        assert!(wildcard_matches("*", ""));
        assert!(wildcard_matches("a*c", "abc"));
        assert!(wildcard_matches("a*c", "ac"));
        assert!(wildcard_matches("a*c", "abbbc"));
        assert!(!wildcard_matches("a*c", "abd"));
        assert!(wildcard_matches("*test*", "unittesting"));
        assert!(wildcard_matches("trailing**", "trailing"));
    }

    #[test]
    fn test_question_mark() {
        assert!(wildcard_matches("a?c", "abc"));
        assert!(!wildcard_matches("a?c", "ac"));
        assert!(!wildcard_matches("a?c", "abbc"));
        assert!(wildcard_matches("te?t", "test"));
    }

    #[test]
    fn test_backtracking() {
        // First '*' restart point is wrong; the scan must retry further in.
        assert!(wildcard_matches("*ab*ab", "ababab"));
        assert!(wildcard_matches("*.example.com", "a.b.example.com"));
        assert!(!wildcard_matches("*.example.com", "a.example.org"));
    }

    #[test]
    fn test_case_folding() {
        assert!(wildcard_matches("A*", "apple"));
        assert!(wildcard_matches("*!*@HOST.example", "nick!user@host.EXAMPLE"));
        assert!(wildcard_matches("nick[a]*", "NICK{A}!u@h"));
    }

    #[test]
    fn test_hostmask_targeted_by_any() {
        let masks = ["bob!*@*", "*!*@*.badhost.example"];
        assert!(hostmask_targeted_by_any(masks, "bob!x@somewhere.example"));
        assert!(hostmask_targeted_by_any(masks, "eve!y@cloak.badhost.example"));
        assert!(!hostmask_targeted_by_any(masks, "carol!z@goodhost.example"));
    }

    #[test]
    fn test_nick_targeted_by_any() {
        let masks = ["alice!*@*", "bo?!*@*"];
        assert!(nick_targeted_by_any(masks, "Alice"));
        assert!(nick_targeted_by_any(masks, "bob"));
        assert!(!nick_targeted_by_any(masks, "carol"));
    }

    #[test]
    fn test_nick_targeted_skips_wildcard_only_globs() {
        // Matching every nick for a host-only mask would over-ignore.
        assert!(!nick_targeted_by_any(["*!*@bad.example"], "anyone"));
        assert!(!nick_targeted_by_any(["?!*@*"], "x"));
        // A glob with real content still applies.
        assert!(nick_targeted_by_any(["al*!*@bad.example"], "alice"));
    }
}
