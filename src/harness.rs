use std::ffi::OsStr;
use std::time::{Duration, Instant};

use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::alloc::{self, AllocSnapshot};

/// Environment variable that turns on round-trip validation.
pub const VALIDATE_ENV: &str = "VALIDATE";

#[derive(Clone, Copy, Debug)]
pub enum Profile {
    Quick,
    Full,
}

impl Profile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Quick => "quick",
            Profile::Full => "full",
        }
    }
}

#[derive(Clone, Debug)]
pub struct BenchConfig {
    pub profile: Profile,
    /// `None` draws fixtures and samples from entropy.
    pub seed: Option<u64>,
    /// Overrides the profile's measured iteration count.
    pub iters_override: Option<u64>,
    /// Check every unmarshal result against its source record.
    pub validate: bool,
}

impl BenchConfig {
    pub fn new(profile: Profile) -> Self {
        Self {
            profile,
            seed: None,
            iters_override: None,
            validate: false,
        }
    }

    pub fn rng(&self) -> ChaCha8Rng {
        match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        }
    }

    pub fn warmup_iters(&self) -> u64 {
        match self.profile {
            Profile::Quick => 1_000,
            Profile::Full => 10_000,
        }
    }

    pub fn iters(&self) -> u64 {
        if let Some(n) = self.iters_override {
            return n;
        }
        match self.profile {
            Profile::Quick => 100_000,
            Profile::Full => 1_000_000,
        }
    }
}

/// Absent or empty means off; any other value means on.
pub fn parse_toggle(value: Option<&OsStr>) -> bool {
    value.is_some_and(|v| !v.is_empty())
}

/// Read the validation toggle from the process environment.
pub fn validate_from_env() -> bool {
    parse_toggle(std::env::var_os(VALIDATE_ENV).as_deref())
}

/// A pausable timer that also scopes allocation counts to its running intervals.
#[derive(Debug, Default)]
pub struct Stopwatch {
    running: Option<(Instant, AllocSnapshot)>,
    elapsed: Duration,
    allocs: AllocSnapshot,
}

impl Stopwatch {
    /// A stopped stopwatch with nothing accumulated.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        if self.running.is_none() {
            self.running = Some((Instant::now(), alloc::snapshot()));
        }
    }

    pub fn stop(&mut self) {
        if let Some((since, before)) = self.running.take() {
            self.elapsed += since.elapsed();
            let delta = alloc::snapshot().since(&before);
            self.allocs.allocations += delta.allocations;
            self.allocs.bytes += delta.bytes;
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Time accumulated over completed intervals.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Allocations accumulated over completed intervals.
    pub fn allocations(&self) -> AllocSnapshot {
        self.allocs
    }

    /// Stop and summarise the measured region over `iters` iterations.
    pub fn finish(mut self, iters: u64, warmup_iters: u64) -> Measured {
        self.stop();

        let total_ns = self.elapsed.as_nanos();
        let denom = iters.max(1) as f64;
        let (allocs_per_iter, alloc_bytes_per_iter) = if alloc::is_installed() {
            (
                Some(self.allocs.allocations as f64 / denom),
                Some(self.allocs.bytes as f64 / denom),
            )
        } else {
            (None, None)
        };

        Measured {
            iters,
            warmup_iters,
            total_ns,
            ns_per_iter: (total_ns as f64) / denom,
            allocs_per_iter,
            alloc_bytes_per_iter,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Measured {
    pub iters: u64,
    pub warmup_iters: u64,
    pub total_ns: u128,
    pub ns_per_iter: f64,
    /// `None` when the counting allocator is not registered.
    pub allocs_per_iter: Option<f64>,
    pub alloc_bytes_per_iter: Option<f64>,
}
