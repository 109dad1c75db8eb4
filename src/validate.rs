//! Field-by-field comparison of a decoded record against its source.
//!
//! Strings, integers, booleans and floats compare exactly. Timestamps compare as
//! instants, so two values in different time zones that name the same moment are
//! equal. The tag map and alias list are compared only for [`TaggedRecord`]; the
//! primary [`Record`] schema does not carry them.

use chrono::{DateTime, TimeZone};
use std::collections::HashMap;
use std::fmt;

use crate::record::{NoTimeRecord, Record, TaggedRecord};

/// One differing field, rendered for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMismatch {
    pub field: &'static str,
    pub expected: String,
    pub actual: String,
}

impl fmt::Display for FieldMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: expected {}, got {}", self.field, self.expected, self.actual)
    }
}

/// Record shapes the validator knows how to compare.
pub trait Validate {
    /// Every field where `actual` differs from `self`. Empty means equal.
    fn mismatches(&self, actual: &Self) -> Vec<FieldMismatch>;

    fn matches(&self, actual: &Self) -> bool {
        self.mismatches(actual).is_empty()
    }
}

/// Same instant, regardless of the zone either side is expressed in.
pub fn same_instant<A: TimeZone, B: TimeZone>(a: &DateTime<A>, b: &DateTime<B>) -> bool {
    a == b
}

/// Order-insensitive map equality.
pub fn tags_match(a: &HashMap<String, String>, b: &HashMap<String, String>) -> bool {
    a.len() == b.len() && a.iter().all(|(k, v)| b.get(k) == Some(v))
}

/// Order-sensitive sequence equality.
pub fn aliases_match(a: &[String], b: &[String]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x == y)
}

struct Collector(Vec<FieldMismatch>);

impl Collector {
    fn check<T: fmt::Debug>(&mut self, field: &'static str, expected: &T, actual: &T, equal: bool) {
        if !equal {
            self.0.push(FieldMismatch {
                field,
                expected: format!("{expected:?}"),
                actual: format!("{actual:?}"),
            });
        }
    }

    fn eq<T: fmt::Debug + PartialEq>(&mut self, field: &'static str, expected: &T, actual: &T) {
        self.check(field, expected, actual, expected == actual);
    }
}

impl Validate for Record {
    fn mismatches(&self, actual: &Self) -> Vec<FieldMismatch> {
        let mut c = Collector(Vec::new());
        c.eq("name", &self.name, &actual.name);
        c.check(
            "birth_timestamp",
            &self.birth_timestamp,
            &actual.birth_timestamp,
            same_instant(&self.birth_timestamp, &actual.birth_timestamp),
        );
        c.eq("phone", &self.phone, &actual.phone);
        c.eq("sibling_count", &self.sibling_count, &actual.sibling_count);
        c.eq("has_spouse", &self.has_spouse, &actual.has_spouse);
        c.eq("money", &self.money, &actual.money);
        c.0
    }
}

impl Validate for NoTimeRecord {
    fn mismatches(&self, actual: &Self) -> Vec<FieldMismatch> {
        let mut c = Collector(Vec::new());
        c.eq("name", &self.name, &actual.name);
        c.eq("birth_timestamp", &self.birth_timestamp, &actual.birth_timestamp);
        c.eq("phone", &self.phone, &actual.phone);
        c.eq("sibling_count", &self.sibling_count, &actual.sibling_count);
        c.eq("has_spouse", &self.has_spouse, &actual.has_spouse);
        c.eq("money", &self.money, &actual.money);
        c.0
    }
}

impl Validate for TaggedRecord {
    fn mismatches(&self, actual: &Self) -> Vec<FieldMismatch> {
        let mut c = Collector(Vec::new());
        c.eq("name", &self.name, &actual.name);
        c.check(
            "birth_timestamp",
            &self.birth_timestamp,
            &actual.birth_timestamp,
            same_instant(&self.birth_timestamp, &actual.birth_timestamp),
        );
        c.eq("phone", &self.phone, &actual.phone);
        c.eq("sibling_count", &self.sibling_count, &actual.sibling_count);
        c.eq("has_spouse", &self.has_spouse, &actual.has_spouse);
        c.eq("money", &self.money, &actual.money);
        c.check("tags", &self.tags, &actual.tags, tags_match(&self.tags, &actual.tags));
        c.check(
            "aliases",
            &self.aliases,
            &actual.aliases,
            aliases_match(&self.aliases, &actual.aliases),
        );
        c.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn sample() -> Record {
        Record {
            name: "deadbeefcafebabe".to_string(),
            birth_timestamp: Utc.timestamp_opt(1_700_000_000, 42).unwrap(),
            phone: "0123456789".to_string(),
            sibling_count: 3,
            has_spouse: true,
            money: 0.42,
        }
    }

    #[test]
    fn test_identical_records_match() {
        let r = sample();
        assert!(r.matches(&r.clone()));
        assert!(r.mismatches(&r).is_empty());
    }

    #[test]
    fn test_reports_every_differing_field() {
        let expected = sample();
        let mut actual = expected.clone();
        actual.phone.push('0');
        actual.money = 0.43;
        actual.has_spouse = false;

        let fields: Vec<_> = expected.mismatches(&actual).into_iter().map(|m| m.field).collect();
        assert_eq!(fields, vec!["phone", "has_spouse", "money"]);
        assert!(!expected.matches(&actual));
    }

    #[test]
    fn test_timestamp_nanosecond_difference_is_mismatch() {
        let expected = sample();
        let mut actual = expected.clone();
        actual.birth_timestamp = Utc.timestamp_opt(1_700_000_000, 43).unwrap();

        let m = expected.mismatches(&actual);
        assert_eq!(m.len(), 1);
        assert_eq!(m[0].field, "birth_timestamp");
    }

    #[test]
    fn test_same_instant_across_zones() {
        let utc = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let local = utc.with_timezone(&plus_two);

        assert!(same_instant(&utc, &local));
        assert!(!same_instant(&utc, &(local + chrono::Duration::nanoseconds(1))));
    }

    #[test]
    fn test_tags_order_insensitive_aliases_order_sensitive() {
        let mut a = HashMap::new();
        a.insert("k1".to_string(), "v1".to_string());
        a.insert("k2".to_string(), "v2".to_string());
        let mut b = HashMap::new();
        b.insert("k2".to_string(), "v2".to_string());
        b.insert("k1".to_string(), "v1".to_string());
        assert!(tags_match(&a, &b));
        assert!(tags_match(&b, &a));

        let mut c = a.clone();
        c.insert("k2".to_string(), "other".to_string());
        assert!(!tags_match(&a, &c));

        let x = vec!["a".to_string(), "b".to_string()];
        let y = vec!["b".to_string(), "a".to_string()];
        assert!(aliases_match(&x, &x.clone()));
        assert!(!aliases_match(&x, &y));
        assert!(!aliases_match(&x, &x[..1]));
    }

    #[test]
    fn test_tagged_record_checks_aux_fields() {
        let base = sample();
        let expected = TaggedRecord {
            name: base.name,
            birth_timestamp: base.birth_timestamp,
            phone: base.phone,
            sibling_count: base.sibling_count,
            has_spouse: base.has_spouse,
            money: base.money,
            tags: HashMap::from([("team".to_string(), "blue".to_string())]),
            aliases: vec!["x".to_string(), "y".to_string()],
        };
        let mut actual = expected.clone();
        actual.aliases.reverse();

        let fields: Vec<_> = expected.mismatches(&actual).into_iter().map(|m| m.field).collect();
        assert_eq!(fields, vec!["aliases"]);
    }

    #[test]
    fn test_validator_does_not_mutate() {
        let expected = sample();
        let actual = sample();
        let (e0, a0) = (expected.clone(), actual.clone());
        let _ = expected.mismatches(&actual);
        assert_eq!(expected, e0);
        assert_eq!(actual, a0);
    }
}
