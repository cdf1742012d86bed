//! # Stored Reads
//!
//! A read in a sequence store is split in two parts:
//!
//! 1. A fixed-size [`ReadDescriptor`] kept in an array, one per read. It holds
//!    the lengths of each version of the read, the clear range of the corrected
//!    sequence, a few flags, and the location of the read's blob.
//! 2. A variable-size blob living in a blob file. It holds the name, the raw
//!    sequence and qualities, and optionally the corrected sequence and
//!    qualities, each packed with the narrowest encoding that fits.
//!
//! [`ReadData`] owns the decoded form of one read and converts between it and
//! the blob. Three versions are exposed: raw, corrected, and trimmed, where the
//! trimmed version is the clear range of the corrected sequence.
//!
//! ```text
//! ┌──────────────────────┐        ┌─────────────────────────────────┐
//! │ ReadDescriptor (40B) │ ─────▶ │ BLOB | NAME | ?SQR | ?QVR | ... │
//! └──────────────────────┘        └─────────────────────────────────┘
//!      segment, byte offset            blob file <segment>
//! ```
//!
//! ## Example
//!
//! ```
//! use sqread::{ReadConfig, ReadData, ReadDescriptor, ReadVersion};
//!
//! let mut data = ReadData::for_read(ReadDescriptor::new(1, 1), ReadConfig::default());
//! data.set_name(b"read_1");
//! data.set_raw(b"ACGTNACGT", &[30, 31, 32, 33, 2, 30, 30, 30, 30]).unwrap();
//! data.set_corrected(b"ACGTACGT", &[]).unwrap();
//! data.set_clear_range(1, 7).unwrap();
//!
//! let blob = data.encode_blob().unwrap().to_vec();
//!
//! let mut loaded = ReadData::for_read(*data.read(), ReadConfig::default());
//! loaded.load_from_blob(&blob).unwrap();
//! assert_eq!(loaded.sequence_of(ReadVersion::Trimmed), b"CGTACG");
//! ```

pub mod blob;
mod data;
mod descriptor;

pub use data::ReadData;
pub use descriptor::{
    ReadDescriptor, FLAG_CORRECTED, FLAG_IGNORE, FLAG_TRIMMED, SIZE_DESCRIPTOR,
};
