//! Hostmask parsing and normalization.
//!
//! A hostmask is the IRC identity string `nick!ident@host`. Masks are
//! hostmask-shaped strings that may carry `*`/`?` wildcards in any segment.

/// The three segments of a `nick!ident@host` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostmaskParts<'a> {
    /// Nickname segment (before the first `!`).
    pub nick: &'a str,
    /// Ident/username segment (between `!` and `@`).
    pub ident: &'a str,
    /// Host segment (after the `@`).
    pub host: &'a str,
}

impl<'a> HostmaskParts<'a> {
    /// Lenient split on the first `!` and the `@` that follows it.
    ///
    /// Returns `None` unless both separators are present in that order;
    /// segments themselves are not validated.
    pub fn parse(mask: &'a str) -> Option<Self> {
        let (nick, rest) = mask.split_once('!')?;
        let (ident, host) = rest.split_once('@')?;
        Some(Self { nick, ident, host })
    }
}

/// The nick-glob portion of a mask: everything before the first `!`, or the
/// whole string when there is none (a bare nick pattern).
pub fn nick_glob(mask: &str) -> &str {
    mask.split_once('!').map_or(mask, |(nick, _)| nick)
}

/// Whether a string is a hostmask concrete enough to match masks against.
///
/// Requires the `nick!ident@host` shape with at least one of `ident`/`host`
/// carrying real content, i.e. non-empty and not all `*`. A bare `nick!*@*`
/// degenerates to nick matching and is not useful.
pub fn is_useful_hostmask(hostmask: &str) -> bool {
    match HostmaskParts::parse(hostmask) {
        Some(parts) => has_content(parts.ident) || has_content(parts.host),
        None => false,
    }
}

fn has_content(segment: &str) -> bool {
    !segment.is_empty() && !segment.chars().all(|c| c == '*')
}

/// Canonicalize free-form user input into a `nick!user@host` pattern.
///
/// Accepts a bare nick, `user@host`, a host, or a full mask, and always
/// produces a well-formed pattern:
///
/// 1. Whitespace is stripped, internal whitespace included.
/// 2. Input containing both `!` and `@` passes through unchanged.
/// 3. Input containing only `@` is treated as `ident@host` and prefixed
///    with `*!` (or just `*` when it already starts with `!`).
/// 4. Host-shaped input (contains `.` or `:`, or ends with `/`, covering
///    domains, IPv4, IPv6, and CIDR forms) is wrapped as `*!*@host`.
/// 5. Anything else is a bare nick and gets `!*@*` appended.
///
/// # Examples
///
/// ```rust
/// use slirc_mask::normalize_mask;
///
/// assert_eq!(normalize_mask("alice"), "alice!*@*");
/// assert_eq!(normalize_mask("alice!ident@host"), "alice!ident@host");
/// assert_eq!(normalize_mask("ident@host"), "*!ident@host");
/// assert_eq!(normalize_mask("10.0.0.1"), "*!*@10.0.0.1");
/// assert_eq!(normalize_mask("*@bad.host"), "*!*@bad.host");
/// ```
pub fn normalize_mask(raw: &str) -> String {
    let input: String = raw.chars().filter(|c| !c.is_whitespace()).collect();

    if input.contains('!') && input.contains('@') {
        return input;
    }

    if input.contains('@') {
        if input.starts_with("*!") {
            return input;
        }
        if input.starts_with('!') {
            return format!("*{input}");
        }
        return format!("*!{input}");
    }

    if looks_like_host(&input) {
        return format!("*!*@{input}");
    }

    format!("{input}!*@*")
}

/// Host-shaped input heuristic: domains and IPv4 contain `.`, IPv6 contains
/// `:`, CIDR-style input ends with `/`.
fn looks_like_host(s: &str) -> bool {
    s.contains('.') || s.contains(':') || s.ends_with('/')
}
