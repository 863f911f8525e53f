//! Device tag parsing.
//!
//! Tags arrive as `key=value` pairs separated by commas. Malformed pairs
//! (no `=`, or an empty key) are dropped rather than failing startup; the
//! dropped pairs are kept so the caller can warn about them once logging
//! is up.

use std::collections::BTreeMap;

/// Result of parsing a tag list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedTags {
    pub tags: BTreeMap<String, String>,
    /// Pairs that were dropped, verbatim.
    pub rejected: Vec<String>,
}

/// Parse `k1=v1,k2=v2`. Later duplicates win; empty segments are ignored.
pub fn parse_tags(input: &str) -> ParsedTags {
    let mut parsed = ParsedTags::default();

    for pair in input.split(',') {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }
        match pair.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                parsed
                    .tags
                    .insert(key.trim().to_string(), value.trim().to_string());
            }
            _ => parsed.rejected.push(pair.to_string()),
        }
    }

    parsed
}
