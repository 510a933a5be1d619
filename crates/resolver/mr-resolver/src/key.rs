//! Flat object key parsing.

use mr_types::{CanonicalRoot, KeyClass, ParsedKey};

/// Parser position while scanning a key.
enum State {
    /// Reading the agency segment
    Agency,
    /// Reading the docket segment; holds the offset of the first `/`
    Docket(usize),
}

/// Parse a flat key into agency, docket and remainder.
///
/// The first two `/`-delimited segments become `agency` and `docket_id`;
/// everything after the second `/` is the remainder, verbatim. Keys with
/// fewer than three segments are [`KeyClass::Unparseable`].
///
/// This never reports [`KeyClass::AlreadyCanonical`]; use [`classify_key`]
/// for that.
pub fn parse_key(key: &str) -> KeyClass {
    let mut state = State::Agency;

    for (idx, ch) in key.char_indices() {
        if ch != '/' {
            continue;
        }
        match state {
            State::Agency => state = State::Docket(idx),
            State::Docket(first) => {
                return KeyClass::Parsed(ParsedKey::new(
                    &key[..first],
                    &key[first + 1..idx],
                    &key[idx + 1..],
                ));
            }
        }
    }

    KeyClass::Unparseable(key.to_string())
}

/// Classify a key for migration.
///
/// Keys already under `raw-data/` or `derived-data/` are
/// [`KeyClass::AlreadyCanonical`]; everything else is parsed.
pub fn classify_key(key: &str) -> KeyClass {
    match CanonicalRoot::of_key(key) {
        Some(root) => KeyClass::AlreadyCanonical(root),
        None => parse_key(key),
    }
}
