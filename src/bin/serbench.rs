use clap::{Parser, Subcommand, ValueEnum};
use serbench::alloc::CountingAllocator;
use serbench::driver::{BenchDriver, Mode};
use serbench::error::BenchResult;
use serbench::harness::{self, BenchConfig, Profile};
use serbench::record::{Variant, CORPUS_SIZE};
use serbench::schema::{CodecBenchReport, RunMeta};
use serbench::CodecKind;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[global_allocator]
static ALLOC: CountingAllocator = CountingAllocator;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ProfileArg {
    Quick,
    Full,
}

impl From<ProfileArg> for Profile {
    fn from(v: ProfileArg) -> Self {
        match v {
            ProfileArg::Quick => Profile::Quick,
            ProfileArg::Full => Profile::Full,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Time `marshal` over randomly sampled records.
    Marshal {
        #[arg(long, value_enum)]
        codec: CodecKind,

        #[arg(long, value_enum, default_value_t = Variant::Record)]
        variant: Variant,
    },

    /// Time `unmarshal` over randomly sampled pre-encoded buffers.
    Unmarshal {
        #[arg(long, value_enum)]
        codec: CodecKind,

        #[arg(long, value_enum, default_value_t = Variant::Record)]
        variant: Variant,
    },

    /// Both modes for every codec (and every variant unless one is given).
    Suite {
        #[arg(long, value_enum)]
        variant: Option<Variant>,
    },

    /// Encoded size of one corpus per codec and variant; no timing.
    Sizes {
        #[arg(long, value_enum)]
        variant: Option<Variant>,
    },
}

#[derive(Parser, Debug)]
#[command(name = "serbench")]
#[command(about = "Serde codec marshal/unmarshal benchmark runner (JSON output)")]
struct Args {
    #[arg(long, value_enum, default_value_t = ProfileArg::Quick, global = true)]
    profile: ProfileArg,

    /// Measured iterations per run; overrides the profile.
    #[arg(long, global = true)]
    iters: Option<u64>,

    /// Seed for fixtures and sampling. 0 draws from entropy.
    #[arg(long, default_value_t = 0, global = true)]
    seed: u64,

    /// Validate every decoded record. Also enabled by a non-empty VALIDATE env var.
    #[arg(long, default_value_t = false, global = true)]
    validate: bool,

    /// Where to write the JSON report. If omitted, prints to stdout.
    #[arg(long, global = true)]
    out: Option<PathBuf>,

    /// Debug-level logging (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

fn now_utc_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

fn git_sha_short() -> Option<String> {
    // Best-effort: read from environment set by CI/build scripts.
    std::env::var("GIT_SHA")
        .ok()
        .or_else(|| std::env::var("GITHUB_SHA").ok())
        .map(|s| s.chars().take(12).collect())
}

fn variants(only: Option<Variant>) -> Vec<Variant> {
    match only {
        Some(v) => vec![v],
        None => Variant::all().to_vec(),
    }
}

fn run(args: &Args, cfg: &BenchConfig) -> BenchResult<CodecBenchReport> {
    let mut measurements = Vec::new();
    let mut sizes = Vec::new();

    match &args.cmd {
        Command::Marshal { codec, variant } => {
            let mut driver = BenchDriver::new(cfg);
            measurements.push(driver.run(*codec, *variant, Mode::Marshal)?.into_measurement());
        }
        Command::Unmarshal { codec, variant } => {
            let mut driver = BenchDriver::new(cfg);
            measurements.push(
                driver
                    .run(*codec, *variant, Mode::Unmarshal)?
                    .into_measurement(),
            );
        }
        Command::Suite { variant } => {
            for v in variants(*variant) {
                for codec in CodecKind::all() {
                    for mode in [Mode::Marshal, Mode::Unmarshal] {
                        // Fresh driver per run: no corpus or RNG state crosses runs.
                        let mut driver = BenchDriver::new(cfg);
                        let r = driver.run(codec, v, mode)?;
                        info!(run = %r.name(), ns_per_iter = r.measured.ns_per_iter, "finished");
                        measurements.push(r.into_measurement());
                    }
                }
            }
        }
        Command::Sizes { variant } => {
            for v in variants(*variant) {
                for codec in CodecKind::all() {
                    sizes.push(BenchDriver::new(cfg).sizes(codec, v)?);
                }
            }
        }
    }

    Ok(CodecBenchReport {
        run: RunMeta {
            schema_version: 1,
            bench_version: env!("CARGO_PKG_VERSION").to_string(),
            profile: cfg.profile.as_str().to_string(),
            seed: cfg.seed,
            validate: cfg.validate,
            corpus_size: CORPUS_SIZE,
            timestamp_utc: now_utc_rfc3339(),
            git_sha: git_sha_short(),
        },
        measurements,
        sizes,
    })
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Read once for the whole process.
    let validate = args.validate || harness::validate_from_env();

    let cfg = BenchConfig {
        profile: args.profile.into(),
        seed: (args.seed != 0).then_some(args.seed),
        iters_override: args.iters,
        validate,
    };

    let result = run(&args, &cfg).and_then(|report| report.write_json(args.out.as_deref()));
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
