//! Error types for codec adapters and benchmark runs.
//!
//! Nothing here is recoverable: every [`BenchError`] aborts the run that raised it.

use thiserror::Error;

use crate::validate::FieldMismatch;

/// Failure inside a codec adapter.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("bincode: {0}")]
    Bincode(#[from] bincode::Error),

    #[error("msgpack encode: {0}")]
    MsgpackEncode(#[from] rmp_serde::encode::Error),

    #[error("msgpack decode: {0}")]
    MsgpackDecode(#[from] rmp_serde::decode::Error),

    #[error("postcard: {0}")]
    Postcard(#[from] postcard::Error),
}

/// Fatal outcome of a benchmark run.
#[derive(Debug, Error)]
pub enum BenchError {
    /// Pre-encoding the corpus failed before measurement began.
    #[error("{codec}: failed to pre-encode record {index}: {source}")]
    Setup {
        codec: &'static str,
        index: usize,
        #[source]
        source: CodecError,
    },

    /// A marshal call failed inside the measured loop.
    #[error("{codec}: failed to marshal record {index}: {source}")]
    Encode {
        codec: &'static str,
        index: usize,
        #[source]
        source: CodecError,
    },

    /// An unmarshal call failed inside the measured loop.
    #[error("{codec}: failed to unmarshal record {index}: {source} ({bytes})")]
    Decode {
        codec: &'static str,
        index: usize,
        /// Hex dump of the offending buffer.
        bytes: String,
        #[source]
        source: CodecError,
    },

    /// A decoded record differs from the record that produced its buffer.
    #[error("{codec}: unmarshaled record {index} differed ({}):\nexpected: {expected}\nactual:   {actual}", list_fields(.fields))]
    Mismatch {
        codec: &'static str,
        index: usize,
        expected: String,
        actual: String,
        fields: Vec<FieldMismatch>,
    },

    #[error("IO error: {context} - {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

fn list_fields(fields: &[FieldMismatch]) -> String {
    fields
        .iter()
        .map(|m| m.field)
        .collect::<Vec<_>>()
        .join(", ")
}

pub type BenchResult<T> = std::result::Result<T, BenchError>;
