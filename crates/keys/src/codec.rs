//! Counter key encoding and decoding

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::error::KeyError;
use crate::interval::Interval;
use crate::KEY_SEPARATOR;

/// Minimum segments in a valid key: interval, date, and one attribute pair
const MIN_SEGMENTS: usize = 4;

/// Build the counter keys for one event.
///
/// `labels` holds the (interval, date segment) pairs for the enabled
/// intervals; `attributes` is already canonically ordered by its `BTreeMap`
/// key order, so two events with the same attribute set produce identical
/// keys regardless of input order.
pub fn counter_keys(
    labels: &[(Interval, String)],
    attributes: &BTreeMap<String, String>,
) -> Vec<String> {
    let mut suffix = String::new();
    for (idx, (key, value)) in attributes.iter().enumerate() {
        if idx != 0 {
            suffix.push(KEY_SEPARATOR);
        }
        suffix.push_str(key);
        suffix.push(KEY_SEPARATOR);
        suffix.push_str(value);
    }

    labels
        .iter()
        .map(|(interval, date)| {
            format!("{}{sep}{}{sep}{}", interval.as_str(), date, suffix, sep = KEY_SEPARATOR)
        })
        .collect()
}

/// Structured form of a counter key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedKey {
    /// The key as stored, without the namespace prefix
    pub raw: String,

    /// Interval bucket
    pub interval: Interval,

    /// Anchor timestamp decoded from the date segment
    pub date: DateTime<Utc>,

    /// Attribute pairs, canonically ordered
    pub attributes: BTreeMap<String, String>,

    /// Estimated distinct count; zero until populated from the store
    pub count: i64,
}

/// Parse a single key into structured form
pub fn parse_key(raw: &str) -> Result<ParsedKey, KeyError> {
    let parts: Vec<&str> = raw.split(KEY_SEPARATOR).collect();
    if parts.len() < MIN_SEGMENTS {
        return Err(KeyError::InvalidFormat);
    }

    let interval = Interval::from_tag(parts[0])
        .ok_or_else(|| KeyError::InvalidInterval(parts[0].to_string()))?;
    let date = interval.parse_date(parts[1])?;

    // Everything past the interval and date pairs up as attributes
    let rest = &parts[2..];
    if rest.len() % 2 != 0 {
        return Err(KeyError::UnevenAttributes);
    }

    let mut attributes = BTreeMap::new();
    for pair in rest.chunks_exact(2) {
        attributes.insert(pair[0].to_string(), pair[1].to_string());
    }

    Ok(ParsedKey {
        raw: raw.to_string(),
        interval,
        date,
        attributes,
        count: 0,
    })
}

/// Parse a list of raw keys, collecting the invalid ones instead of
/// aborting
pub fn parse_key_list<I, S>(keys: I) -> (Vec<ParsedKey>, Vec<String>)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut parsed = Vec::new();
    let mut invalid = Vec::new();
    for key in keys {
        match parse_key(key.as_ref()) {
            Ok(p) => parsed.push(p),
            Err(_) => invalid.push(key.as_ref().to_string()),
        }
    }
    (parsed, invalid)
}

/// Project a parsed set back to its raw keys
pub fn raw_keys(keys: &[ParsedKey]) -> Vec<String> {
    keys.iter().map(|key| key.raw.clone()).collect()
}
