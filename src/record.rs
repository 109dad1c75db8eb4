//! The fixed record schema every codec serializes.
//!
//! Three variants share the same field semantics:
//!
//! - [`Record`]: the primary shape, with a structured UTC instant.
//! - [`NoTimeRecord`]: the timestamp flattened to nanoseconds since the Unix epoch,
//!   for codecs without native time support.
//! - [`TaggedRecord`]: the primary fields plus a tag map and an alias list.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Length of the hex-encoded `name` field.
pub const NAME_LEN: usize = 16;

/// Length of the hex-encoded `phone` field.
pub const PHONE_LEN: usize = 10;

/// Exclusive upper bound of `sibling_count`.
pub const SIBLING_BOUND: u8 = 5;

/// Number of records in one benchmark corpus.
pub const CORPUS_SIZE: usize = 1000;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Record {
    pub name: String,
    pub birth_timestamp: DateTime<Utc>,
    pub phone: String,
    pub sibling_count: u8,
    pub has_spouse: bool,
    pub money: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NoTimeRecord {
    pub name: String,
    /// Nanoseconds since the Unix epoch.
    pub birth_timestamp: i64,
    pub phone: String,
    pub sibling_count: u8,
    pub has_spouse: bool,
    pub money: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TaggedRecord {
    pub name: String,
    pub birth_timestamp: DateTime<Utc>,
    pub phone: String,
    pub sibling_count: u8,
    pub has_spouse: bool,
    pub money: f64,
    pub tags: HashMap<String, String>,
    pub aliases: Vec<String>,
}

impl From<&Record> for NoTimeRecord {
    fn from(r: &Record) -> Self {
        Self {
            name: r.name.clone(),
            // Out of range only past year 2262.
            birth_timestamp: r.birth_timestamp.timestamp_nanos_opt().unwrap_or(i64::MAX),
            phone: r.phone.clone(),
            sibling_count: r.sibling_count,
            has_spouse: r.has_spouse,
            money: r.money,
        }
    }
}

impl NoTimeRecord {
    /// The stored timestamp as a structured instant.
    pub fn birth_instant(&self) -> DateTime<Utc> {
        Utc.timestamp_nanos(self.birth_timestamp)
    }
}

/// Schema variant selector, used by the runner and the report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Variant {
    /// Primary record with a structured timestamp.
    #[default]
    Record,
    /// Timestamp stored as integer nanoseconds.
    NoTime,
    /// Primary record plus tag map and alias list.
    Tagged,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Record => "record",
            Variant::NoTime => "no_time",
            Variant::Tagged => "tagged",
        }
    }

    pub fn all() -> [Variant; 3] {
        [Variant::Record, Variant::NoTime, Variant::Tagged]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_time_conversion_keeps_instant() {
        let instant = Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap();
        let r = Record {
            name: "deadbeefcafebabe".to_string(),
            birth_timestamp: instant,
            phone: "0123456789".to_string(),
            sibling_count: 3,
            has_spouse: true,
            money: 0.42,
        };

        let nt = NoTimeRecord::from(&r);
        assert_eq!(nt.birth_timestamp, 1_700_000_000_123_456_789);
        assert_eq!(nt.birth_instant(), instant);
        assert_eq!(nt.name, r.name);
        assert_eq!(nt.sibling_count, 3);
    }

    #[test]
    fn test_variant_labels_unique() {
        let labels: Vec<_> = Variant::all().iter().map(|v| v.as_str()).collect();
        assert_eq!(labels, vec!["record", "no_time", "tagged"]);
    }
}
