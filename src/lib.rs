//! Marshal/unmarshal benchmarks for serde codecs on one fixed record schema.
//!
//! Every codec sees the same randomly generated corpus and the same measured
//! code path. Setup (fixture generation, pre-encoding) runs with the clock paused;
//! optional validation compares every decoded record against its source.

pub mod alloc;
pub mod codec;
pub mod driver;
pub mod error;
pub mod fixture;
pub mod harness;
pub mod record;
pub mod schema;
pub mod validate;

pub use codec::{CodecKind, Serializer};
pub use driver::{BenchDriver, Mode, RunResult};
pub use error::{BenchError, CodecError};
pub use record::{NoTimeRecord, Record, TaggedRecord, Variant};
