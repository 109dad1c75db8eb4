//! The benchmark driver: timed marshal and unmarshal loops over a random corpus.
//!
//! Each run builds its own corpus with the stopwatch paused. Unmarshal runs also
//! pre-encode every record (copying the bytes out of the adapter's scratch
//! buffer) before the clock starts. The measured loop then samples one corpus
//! index uniformly per iteration, with replacement, and performs exactly one
//! codec call on it. Any codec error or validation mismatch ends the run.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::fmt::Debug;
use std::hint::black_box;
use tracing::{debug, info};

use crate::codec::{CodecKind, Serializer};
use crate::error::{BenchError, BenchResult};
use crate::fixture::{self, Fixture};
use crate::harness::{BenchConfig, Measured, Stopwatch};
use crate::record::{NoTimeRecord, Record, TaggedRecord, Variant, CORPUS_SIZE};
use crate::schema::{Measurement, SizeStat};
use crate::validate::Validate;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Marshal,
    Unmarshal,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Marshal => "marshal",
            Mode::Unmarshal => "unmarshal",
        }
    }
}

/// Outcome of one completed run.
#[derive(Clone, Debug)]
pub struct RunResult {
    pub codec: &'static str,
    pub variant: Variant,
    pub mode: Mode,
    pub measured: Measured,
    pub validated: bool,
    pub mean_encoded_bytes: Option<f64>,
}

impl RunResult {
    pub fn name(&self) -> String {
        format!("{}.{}.{}", self.codec, self.variant.as_str(), self.mode.as_str())
    }

    pub fn into_measurement(self) -> Measurement {
        Measurement {
            name: self.name(),
            unit: "ns/iter".to_string(),
            iters: self.measured.iters,
            warmup_iters: self.measured.warmup_iters,
            total_ns: self.measured.total_ns,
            ns_per_iter: self.measured.ns_per_iter,
            allocs_per_iter: self.measured.allocs_per_iter,
            alloc_bytes_per_iter: self.measured.alloc_bytes_per_iter,
            mean_encoded_bytes: self.mean_encoded_bytes,
            extra: json!({ "validated": self.validated }),
        }
    }
}

/// Record types the driver can benchmark.
pub trait Benchable: Fixture + Validate + Default + Debug {}

impl<T: Fixture + Validate + Default + Debug> Benchable for T {}

pub struct BenchDriver<R> {
    iters: u64,
    warmup_iters: u64,
    validate: bool,
    corpus_size: usize,
    rng: R,
}

impl BenchDriver<ChaCha8Rng> {
    pub fn new(cfg: &BenchConfig) -> Self {
        Self::with_rng(cfg, cfg.rng())
    }
}

impl<R: Rng> BenchDriver<R> {
    /// Driver drawing fixtures and samples from `rng`.
    pub fn with_rng(cfg: &BenchConfig, rng: R) -> Self {
        Self {
            iters: cfg.iters(),
            warmup_iters: cfg.warmup_iters(),
            validate: cfg.validate,
            corpus_size: CORPUS_SIZE,
            rng,
        }
    }

    pub fn corpus_size(mut self, n: usize) -> Self {
        self.corpus_size = n.max(1);
        self
    }

    pub fn warmup(mut self, n: u64) -> Self {
        self.warmup_iters = n;
        self
    }

    pub fn iterations(mut self, n: u64) -> Self {
        self.iters = n;
        self
    }

    /// Measure `marshal` over randomly sampled records.
    pub fn run_marshal<T, S>(&mut self, codec: &mut S) -> BenchResult<RunResult>
    where
        T: Benchable,
        S: Serializer<T> + ?Sized,
    {
        let name = codec.name();
        let mut sw = Stopwatch::new();

        let corpus: Vec<T> = fixture::generate_with(&mut self.rng, self.corpus_size);
        info!(codec = name, variant = T::VARIANT.as_str(), iters = self.iters, "marshal run");

        for _ in 0..self.warmup_iters {
            marshal_one(codec, &corpus, self.rng.gen_range(0..corpus.len()))?;
        }

        sw.start();
        for _ in 0..self.iters {
            marshal_one(codec, &corpus, self.rng.gen_range(0..corpus.len()))?;
        }
        let measured = sw.finish(self.iters, self.warmup_iters);

        debug!(codec = name, ns_per_iter = measured.ns_per_iter, "marshal done");
        Ok(RunResult {
            codec: name,
            variant: T::VARIANT,
            mode: Mode::Marshal,
            measured,
            validated: false,
            mean_encoded_bytes: None,
        })
    }

    /// Measure `unmarshal` over randomly sampled pre-encoded buffers.
    pub fn run_unmarshal<T, S>(&mut self, codec: &mut S) -> BenchResult<RunResult>
    where
        T: Benchable,
        S: Serializer<T> + ?Sized,
    {
        let name = codec.name();
        let mut sw = Stopwatch::new();

        let corpus: Vec<T> = fixture::generate_with(&mut self.rng, self.corpus_size);
        let buffers = pre_encode(codec, &corpus)?;
        let mean_encoded_bytes =
            buffers.iter().map(Vec::len).sum::<usize>() as f64 / buffers.len() as f64;
        info!(
            codec = name,
            variant = T::VARIANT.as_str(),
            iters = self.iters,
            validate = self.validate,
            "unmarshal run"
        );
        debug!(codec = name, buffers = buffers.len(), mean_encoded_bytes, "corpus pre-encoded");

        for _ in 0..self.warmup_iters {
            let n = self.rng.gen_range(0..buffers.len());
            unmarshal_one(codec, &corpus, &buffers, n, self.validate)?;
        }

        sw.start();
        for _ in 0..self.iters {
            let n = self.rng.gen_range(0..buffers.len());
            unmarshal_one(codec, &corpus, &buffers, n, self.validate)?;
        }
        let measured = sw.finish(self.iters, self.warmup_iters);

        debug!(codec = name, ns_per_iter = measured.ns_per_iter, "unmarshal done");
        Ok(RunResult {
            codec: name,
            variant: T::VARIANT,
            mode: Mode::Unmarshal,
            measured,
            validated: self.validate,
            mean_encoded_bytes: Some(mean_encoded_bytes),
        })
    }

    /// One run against a freshly instantiated adapter.
    pub fn run(&mut self, kind: CodecKind, variant: Variant, mode: Mode) -> BenchResult<RunResult> {
        match variant {
            Variant::Record => self.run_variant::<Record>(kind, mode),
            Variant::NoTime => self.run_variant::<NoTimeRecord>(kind, mode),
            Variant::Tagged => self.run_variant::<TaggedRecord>(kind, mode),
        }
    }

    fn run_variant<T>(&mut self, kind: CodecKind, mode: Mode) -> BenchResult<RunResult>
    where
        T: Benchable + Serialize + DeserializeOwned + 'static,
    {
        let mut codec = kind.instantiate::<T>();
        match mode {
            Mode::Marshal => self.run_marshal::<T, _>(&mut codec),
            Mode::Unmarshal => self.run_unmarshal::<T, _>(&mut codec),
        }
    }

    /// Encoded size distribution of one corpus, untimed.
    pub fn sizes(&mut self, kind: CodecKind, variant: Variant) -> BenchResult<SizeStat> {
        match variant {
            Variant::Record => self.sizes_variant::<Record>(kind),
            Variant::NoTime => self.sizes_variant::<NoTimeRecord>(kind),
            Variant::Tagged => self.sizes_variant::<TaggedRecord>(kind),
        }
    }

    fn sizes_variant<T>(&mut self, kind: CodecKind) -> BenchResult<SizeStat>
    where
        T: Benchable + Serialize + DeserializeOwned + 'static,
    {
        let mut codec = kind.instantiate::<T>();
        let corpus: Vec<T> = fixture::generate_with(&mut self.rng, self.corpus_size);
        let lens: Vec<usize> = pre_encode(&mut codec, &corpus)?
            .iter()
            .map(Vec::len)
            .collect();

        Ok(SizeStat {
            codec: kind.as_str().to_string(),
            variant: T::VARIANT.as_str().to_string(),
            min_bytes: lens.iter().copied().min().unwrap_or(0),
            mean_bytes: lens.iter().sum::<usize>() as f64 / lens.len().max(1) as f64,
            max_bytes: lens.iter().copied().max().unwrap_or(0),
        })
    }
}

/// Encode every record, copying each result out of the adapter's scratch space.
pub fn pre_encode<T, S>(codec: &mut S, corpus: &[T]) -> BenchResult<Vec<Vec<u8>>>
where
    S: Serializer<T> + ?Sized,
{
    let name = codec.name();
    let mut out = Vec::with_capacity(corpus.len());
    for (index, record) in corpus.iter().enumerate() {
        let bytes = codec.marshal(record).map_err(|source| BenchError::Setup {
            codec: name,
            index,
            source,
        })?;
        out.push(bytes.to_vec());
    }
    Ok(out)
}

#[inline]
fn marshal_one<T, S>(codec: &mut S, corpus: &[T], n: usize) -> BenchResult<()>
where
    S: Serializer<T> + ?Sized,
{
    let name = codec.name();
    let bytes = codec
        .marshal(&corpus[n])
        .map_err(|source| BenchError::Encode {
            codec: name,
            index: n,
            source,
        })?;
    black_box(bytes);
    Ok(())
}

#[inline]
fn unmarshal_one<T, S>(
    codec: &mut S,
    corpus: &[T],
    buffers: &[Vec<u8>],
    n: usize,
    validate: bool,
) -> BenchResult<()>
where
    T: Benchable,
    S: Serializer<T> + ?Sized,
{
    let mut out = T::default();
    if let Err(source) = codec.unmarshal(&buffers[n], &mut out) {
        return Err(BenchError::Decode {
            codec: codec.name(),
            index: n,
            bytes: hex::encode(&buffers[n]),
            source,
        });
    }

    if validate {
        verify(codec.name(), n, &corpus[n], &out)?;
    }

    black_box(out);
    Ok(())
}

/// Compare a decoded record against its source; any differing field is a
/// [`BenchError::Mismatch`] carrying both records.
pub fn verify<T: Benchable>(
    codec: &'static str,
    index: usize,
    expected: &T,
    actual: &T,
) -> BenchResult<()> {
    let fields = expected.mismatches(actual);
    if fields.is_empty() {
        return Ok(());
    }
    Err(BenchError::Mismatch {
        codec,
        index,
        expected: format!("{expected:?}"),
        actual: format!("{actual:?}"),
        fields,
    })
}
