//! Counter key codec
//!
//! Every event maps to one counter key per enabled interval. A counter key
//! is the canonical string identifying one (interval, date, attribute-tuple)
//! bucket in the approximate store:
//!
//! ```text
//! <interval>:<date>:<k1>:<v1>[:<k2>:<v2>]*
//! ```
//!
//! Attribute pairs are serialized with keys in ascending lexicographic
//! order, so two events carrying the same attribute set map to the same key
//! regardless of input order. Because `:` is the segment separator, it is
//! reserved and may not appear in attribute keys or values.
//!
//! # Encoding
//!
//! ```
//! use std::collections::BTreeMap;
//! use chrono::{TimeZone, Utc};
//! use counterd_keys::{counter_keys, IntervalSet};
//!
//! let date = Utc.with_ymd_and_hms(2018, 1, 27, 9, 30, 0).unwrap();
//! let mut attrs = BTreeMap::new();
//! attrs.insert("foo".to_string(), "bar".to_string());
//!
//! let labels = IntervalSet::ALL.date_labels(date);
//! let keys = counter_keys(&labels, &attrs);
//! assert!(keys.contains(&"day:2018-01-27:foo:bar".to_string()));
//! ```
//!
//! # Decoding
//!
//! [`parse_key`] reverses the encoding into a [`ParsedKey`]; [`parse_key_list`]
//! parses a whole scan result, collecting invalid keys instead of aborting.

mod codec;
mod error;
mod interval;

pub use codec::{counter_keys, parse_key, parse_key_list, raw_keys, ParsedKey};
pub use error::KeyError;
pub use interval::{Interval, IntervalSet};

/// Segment separator within counter keys; reserved in attribute keys/values
pub const KEY_SEPARATOR: char = ':';

/// Attribute injected when an event carries no attributes
pub const NULL_ATTRIBUTE: &str = "null";
