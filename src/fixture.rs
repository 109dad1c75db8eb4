//! Fixture generation for benchmark corpora.
//!
//! Every field is drawn independently and uniformly within its constraint:
//! strings from uniform bytes, hex-encoded and cut to length; `sibling_count`
//! in `[0, SIBLING_BOUND)`; `has_spouse` as a fair coin; `money` in `[0, 1)`.
//! Timestamps come from the clock at generation time, so corpora are schema-valid
//! but not byte-reproducible across runs unless the caller pins both the RNG and
//! the instant (see [`generate_at`]).

use chrono::{DateTime, Utc};
use rand::Rng;
use std::collections::HashMap;

use crate::record::{
    NoTimeRecord, Record, TaggedRecord, Variant, NAME_LEN, PHONE_LEN, SIBLING_BOUND,
};

/// Upper bound (exclusive) on tag entries and aliases in a [`TaggedRecord`].
const AUX_BOUND: usize = 4;

/// Length of tag keys, tag values and aliases.
const AUX_LEN: usize = 8;

/// A record shape that can be drawn at random.
pub trait Fixture: Sized {
    /// Which schema variant this shape is.
    const VARIANT: Variant;

    /// Build one fully populated record. `now` supplies the timestamp field.
    fn random<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>) -> Self;
}

/// Uniform random bytes, hex-encoded and truncated to exactly `len` characters.
pub fn rand_hex<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    let mut buf = vec![0u8; len.div_ceil(2)];
    rng.fill(buf.as_mut_slice());
    let mut s = hex::encode(buf);
    s.truncate(len);
    s
}

impl Fixture for Record {
    const VARIANT: Variant = Variant::Record;

    fn random<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>) -> Self {
        Self {
            name: rand_hex(rng, NAME_LEN),
            birth_timestamp: now,
            phone: rand_hex(rng, PHONE_LEN),
            sibling_count: rng.gen_range(0..SIBLING_BOUND),
            has_spouse: rng.gen_bool(0.5),
            money: rng.gen::<f64>(),
        }
    }
}

impl Fixture for NoTimeRecord {
    const VARIANT: Variant = Variant::NoTime;

    fn random<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>) -> Self {
        NoTimeRecord::from(&Record::random(rng, now))
    }
}

impl Fixture for TaggedRecord {
    const VARIANT: Variant = Variant::Tagged;

    fn random<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>) -> Self {
        let base = Record::random(rng, now);

        let tag_count = rng.gen_range(0..AUX_BOUND);
        let tags: HashMap<String, String> = (0..tag_count)
            .map(|_| (rand_hex(rng, AUX_LEN), rand_hex(rng, AUX_LEN)))
            .collect();
        let alias_count = rng.gen_range(0..AUX_BOUND);
        let aliases = (0..alias_count).map(|_| rand_hex(rng, AUX_LEN)).collect();

        Self {
            name: base.name,
            birth_timestamp: base.birth_timestamp,
            phone: base.phone,
            sibling_count: base.sibling_count,
            has_spouse: base.has_spouse,
            money: base.money,
            tags,
            aliases,
        }
    }
}

/// Generate `count` records from an unseeded, thread-local RNG.
pub fn generate<T: Fixture>(count: usize) -> Vec<T> {
    generate_with(&mut rand::thread_rng(), count)
}

/// Generate `count` records from the given RNG, stamping each with the current time.
pub fn generate_with<T: Fixture, R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<T> {
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        out.push(T::random(rng, Utc::now()));
    }
    out
}

/// Generate `count` records that all carry the instant `now`.
pub fn generate_at<T: Fixture, R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    now: DateTime<Utc>,
) -> Vec<T> {
    (0..count).map(|_| T::random(rng, now)).collect()
}
