//! Local, offline syntax validation for email addresses.
//!
//! This is the cheapest pipeline stage and the only one that never
//! touches the network. The pattern is deliberately pragmatic rather
//! than a full RFC 5321 grammar: it accepts the common shapes real
//! mailboxes use and rejects obvious garbage early, leaving the
//! definitive judgement to the mail exchanger.

use once_cell::sync::Lazy;
use regex::Regex;

/// RFC 5321 caps: 254 octets for the whole address, 64 for the local part.
const MAX_ADDRESS_LEN: usize = 254;
const MAX_LOCAL_LEN: usize = 64;

static ADDRESS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("Address syntax pattern failed to compile. This is a bug.")
});

/// Checks whether a normalized candidate has plausible address syntax.
///
/// Enforces exactly one `@`, the RFC length caps, at least one dot in
/// the domain, and label shape (no leading/trailing hyphen, max 63
/// characters per label).
pub fn is_valid_email(candidate: &str) -> bool {
    if candidate.len() > MAX_ADDRESS_LEN {
        return false;
    }
    let Some((local, domain)) = candidate.rsplit_once('@') else {
        return false;
    };
    if local.is_empty() || local.len() > MAX_LOCAL_LEN {
        return false;
    }
    if !domain.contains('.') {
        return false;
    }
    ADDRESS_RE.is_match(candidate)
}
