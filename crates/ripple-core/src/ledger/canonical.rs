//! Target selector canonicalization
//!
//! Reduces an exact-identity selector to its (kind, name) key; anything
//! weaker is whitespace- and quote-normalized and flagged fragile.
//! Fuzzy predicates (contains, starts-with, positional indexes) are
//! deliberately not normalized further: the fragile flag is the signal.

use once_cell::sync::Lazy;
use regex::Regex;

use super::types::CanonicalKey;

/// Trailing exact-identity predicate: [@name='X'] or [@id="X"]
static EXACT_IDENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\[@(?:name|id)\s*=\s*['"]([^'"]+)['"]\]\s*$"#).unwrap()
});

/// Predicates that may match unpredictably many targets
static FUZZY_PREDICATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"contains\s*\(|starts-with\s*\(|ends-with\s*\(|\[\s*\d+\s*\]").unwrap()
});

/// Plain dotted identifier path, e.g. a "Type.Method" patch target
static IDENT_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)*$").unwrap());

/// Derive the canonical target key for a raw selector
pub fn canonicalize(target_kind: &str, selector: &str) -> CanonicalKey {
    let trimmed = selector.trim();
    if trimmed.is_empty() {
        return CanonicalKey {
            kind: target_kind.to_string(),
            name: String::new(),
            fragile: true,
        };
    }

    if FUZZY_PREDICATE.is_match(trimmed) {
        return CanonicalKey {
            kind: target_kind.to_string(),
            name: normalize(trimmed),
            fragile: true,
        };
    }

    if IDENT_PATH.is_match(trimmed) {
        return CanonicalKey {
            kind: target_kind.to_string(),
            name: trimmed.to_string(),
            fragile: false,
        };
    }

    if let Some(caps) = EXACT_IDENT.captures(trimmed) {
        return CanonicalKey {
            kind: target_kind.to_string(),
            name: caps[1].to_string(),
            fragile: false,
        };
    }

    CanonicalKey {
        kind: target_kind.to_string(),
        name: normalize(trimmed),
        fragile: true,
    }
}

/// Collapse whitespace and unify quote style so textually different but
/// equivalent fragile selectors still group together
fn normalize(selector: &str) -> String {
    let collapsed = selector.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.replace('"', "'")
}
