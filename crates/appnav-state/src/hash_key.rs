//! Embedded app-state key inside a navigation hash
//!
//! Three encodings of the key are recognized, tried in priority order:
//!
//! | encoding | pattern |
//! |---|---|
//! | [`KeyEncoding::Query`] | `[?&]sap-iapp-state=<key>` |
//! | [`KeyEncoding::LegacySegment`] | `/sap-iapp-state=<key>` |
//! | [`KeyEncoding::LegacyLeading`] | `sap-iapp-state=<key>` at the start |
//!
//! Writing always emits the query form. The rest of the hash is treated as
//! opaque and kept byte-for-byte. A written key must be non-empty and free
//! of the hash delimiters `& / ? # =`, so it always reads back unchanged.

use crate::error::{NavError, NavResult};
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

/// Name of the inner app-state key in the hash
pub const IAPP_STATE_PARAMETER: &str = "sap-iapp-state";

static QUERY_RE: Lazy<Regex> = Lazy::new(|| compile(r"[?&]sap-iapp-state=([^&]+)"));
static LEGACY_SEGMENT_RE: Lazy<Regex> = Lazy::new(|| compile(r"/sap-iapp-state=([^/?]+)"));
static LEGACY_LEADING_RE: Lazy<Regex> = Lazy::new(|| compile(r"^sap-iapp-state=([^/?]+)"));

#[allow(clippy::expect_used)]
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static key pattern is valid")
}

/// Known encodings of the key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyEncoding {
    /// Query-style pair introduced by `?` or `&`
    Query,
    /// Path segment `/sap-iapp-state=<key>`
    LegacySegment,
    /// `sap-iapp-state=<key>` without leading separator
    LegacyLeading,
}

impl KeyEncoding {
    /// Decode priority
    pub const PRIORITY: [Self; 3] = [Self::Query, Self::LegacySegment, Self::LegacyLeading];

    fn pattern(self) -> &'static Regex {
        match self {
            Self::Query => &QUERY_RE,
            Self::LegacySegment => &LEGACY_SEGMENT_RE,
            Self::LegacyLeading => &LEGACY_LEADING_RE,
        }
    }

    /// Whether this encoding is only read, never written
    #[inline]
    #[must_use]
    pub fn is_legacy(self) -> bool {
        self != Self::Query
    }
}

/// Located key inside a hash
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMatch {
    /// Encoding that matched
    pub encoding: KeyEncoding,
    /// Byte range of the whole match
    pub whole: Range<usize>,
    /// Byte range of the key value
    pub value: Range<usize>,
}

/// Find the key using the first encoding that matches
#[must_use]
pub fn locate_key(hash: &str) -> Option<KeyMatch> {
    KeyEncoding::PRIORITY.into_iter().find_map(|encoding| {
        let captures = encoding.pattern().captures(hash)?;
        let whole = captures.get(0)?;
        let value = captures.get(1)?;
        Some(KeyMatch {
            encoding,
            whole: whole.range(),
            value: value.range(),
        })
    })
}

/// Extract the embedded key
#[must_use]
pub fn extract_key(hash: &str) -> Option<&str> {
    locate_key(hash).map(|found| &hash[found.value])
}

/// Characters that end a key in one of the encodings
const KEY_DELIMITERS: [char; 5] = ['&', '/', '?', '#', '='];

/// Whether `key` can be written and extracted again unchanged
#[must_use]
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && !key.contains(|c: char| KEY_DELIMITERS.contains(&c) || c.is_whitespace())
}

/// Write `key` into `hash`
///
/// A query-form key is rewritten in place. A legacy key is removed and the
/// key appended in query form.
///
/// # Errors
/// `InvalidInput` for an empty key or one containing a hash delimiter or
/// whitespace.
pub fn replace_key(hash: Option<&str>, key: &str) -> NavResult<String> {
    if !is_valid_key(key) {
        return Err(NavError::invalid_input(format!(
            "app-state key '{key}' is empty or contains a hash delimiter"
        )));
    }
    let hash = match hash {
        Some(hash) if !hash.is_empty() => hash,
        _ => return Ok(format!("?{IAPP_STATE_PARAMETER}={key}")),
    };

    Ok(match locate_key(hash) {
        Some(found) if found.encoding == KeyEncoding::Query => {
            let mut rewritten = String::with_capacity(hash.len() + key.len());
            rewritten.push_str(&hash[..found.value.start]);
            rewritten.push_str(key);
            rewritten.push_str(&hash[found.value.end..]);
            rewritten
        }
        Some(found) => {
            tracing::debug!(encoding = ?found.encoding, "upgrading legacy app-state key");
            let mut stripped = String::with_capacity(hash.len());
            stripped.push_str(&hash[..found.whole.start]);
            stripped.push_str(&hash[found.whole.end..]);
            append_key(&stripped, key)
        }
        None => append_key(hash, key),
    })
}

fn append_key(hash: &str, key: &str) -> String {
    let separator = if hash.contains('?') { '&' } else { '?' };
    format!("{hash}{separator}{IAPP_STATE_PARAMETER}={key}")
}
