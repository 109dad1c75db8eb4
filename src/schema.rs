use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{BenchError, BenchResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMeta {
    pub schema_version: u32,
    pub bench_version: String,
    pub profile: String,
    pub seed: Option<u64>,
    pub validate: bool,
    pub corpus_size: usize,
    pub timestamp_utc: String,
    pub git_sha: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Measurement {
    /// `<codec>.<variant>.<mode>`
    pub name: String,
    pub unit: String,

    pub iters: u64,
    pub warmup_iters: u64,

    pub total_ns: u128,
    pub ns_per_iter: f64,

    pub allocs_per_iter: Option<f64>,
    pub alloc_bytes_per_iter: Option<f64>,

    /// Mean encoded size of the pre-encoded corpus (unmarshal mode only).
    pub mean_encoded_bytes: Option<f64>,

    pub extra: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SizeStat {
    pub codec: String,
    pub variant: String,
    pub min_bytes: usize,
    pub mean_bytes: f64,
    pub max_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodecBenchReport {
    pub run: RunMeta,
    pub measurements: Vec<Measurement>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sizes: Vec<SizeStat>,
}

impl CodecBenchReport {
    /// Pretty JSON to `out`, or to stdout when `out` is `None`.
    pub fn write_json(&self, out: Option<&Path>) -> BenchResult<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| BenchError::Io {
            context: "serializing report",
            source: e.into(),
        })?;
        match out {
            Some(path) => fs::write(path, json).map_err(|source| BenchError::Io {
                context: "writing report",
                source,
            }),
            None => {
                println!("{json}");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn report() -> CodecBenchReport {
        CodecBenchReport {
            run: RunMeta {
                schema_version: 1,
                bench_version: "test".to_string(),
                profile: "quick".to_string(),
                seed: Some(3),
                validate: true,
                corpus_size: 1000,
                timestamp_utc: "2026-01-01T00:00:00Z".to_string(),
                git_sha: None,
            },
            measurements: vec![Measurement {
                name: "json.record.unmarshal".to_string(),
                unit: "ns/iter".to_string(),
                iters: 10,
                warmup_iters: 1,
                total_ns: 12_345,
                ns_per_iter: 1234.5,
                allocs_per_iter: Some(3.0),
                alloc_bytes_per_iter: Some(96.0),
                mean_encoded_bytes: Some(130.2),
                extra: json!({"validated": true}),
            }],
            sizes: Vec::new(),
        }
    }

    #[test]
    fn test_write_and_read_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.json");

        report().write_json(Some(path.as_path())).unwrap();
        let loaded: CodecBenchReport =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();

        assert_eq!(loaded.run.seed, Some(3));
        assert!(loaded.run.validate);
        assert_eq!(loaded.measurements.len(), 1);
        assert_eq!(loaded.measurements[0].name, "json.record.unmarshal");
        assert_eq!(loaded.measurements[0].allocs_per_iter, Some(3.0));
        assert!(loaded.sizes.is_empty());
    }

    #[test]
    fn test_empty_sizes_omitted() {
        let text = serde_json::to_string(&report()).unwrap();
        assert!(!text.contains("\"sizes\""));
    }

    #[test]
    fn test_write_to_missing_dir_is_io_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nope").join("report.json");
        match report().write_json(Some(path.as_path())) {
            Err(BenchError::Io { context, .. }) => assert_eq!(context, "writing report"),
            other => panic!("expected io error, got {other:?}"),
        }
    }
}
