//! # sqread
//!
//! Codec for reads held in a sequence store and for the k-mer count
//! statistics kept alongside them.
//!
//! - [`ReadDescriptor`] is the fixed-size record describing one stored read.
//! - [`ReadData`] holds the decoded raw, corrected, and trimmed versions of a
//!   read and converts them to and from a chunked binary blob.
//! - [`KmerCountStatistics`] is a histogram accumulator with its own dump/load
//!   stream format.
//!
//! Sequences and qualities are packed with the narrowest bit width that holds
//! them; see [`nuc`] and [`qual`].

pub mod bits;
pub mod config;
pub mod error;
pub mod nuc;
pub mod qual;
pub mod read;
pub mod stats;
pub mod utils;

pub use config::{ReadConfig, ReadConfigBuilder, ReadVersion, DEFAULT_QUALITY_VALUE};
pub use error::{Error, IntoSqreadError, Result};
pub use read::{ReadData, ReadDescriptor};
pub use stats::KmerCountStatistics;
pub use utils::Span;

/// Largest size of one blob file; byte offsets within a segment stay below it.
pub const BLOB_FILE_MAX_SIZE: u64 = 1024 * 1024 * 1024;
