use std::error::Error as StdError;

/// Custom Result type for sqread operations, wrapping the custom [`Error`] type
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the sqread library, encompassing all possible error cases
/// that can occur while packing reads, walking blobs, or moving statistics.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Errors raised by the fixed-width sequence and quality packers
    #[error("Error packing data: {0}")]
    PackError(#[from] PackError),

    /// Errors raised while encoding or decoding a read blob
    #[error("Error processing blob: {0}")]
    BlobError(#[from] BlobError),

    /// Errors raised while filling a read's working data
    #[error("Error setting read data: {0}")]
    ReadError(#[from] ReadError),

    /// Errors related to read descriptors
    #[error("Error processing descriptor: {0}")]
    DescriptorError(#[from] DescriptorError),

    /// Errors raised while loading k-mer count statistics
    #[error("Error processing statistics: {0}")]
    StatsError(#[from] StatsError),

    /// Standard I/O errors
    #[error("Error with IO: {0}")]
    IoError(#[from] std::io::Error),

    /// Errors from the bitnuc dependency for nucleotide encoding/decoding
    #[error("Bitnuc error: {0}")]
    BitnucError(#[from] bitnuc::NucleotideError),

    /// Conversion errors from anyhow errors
    #[cfg(feature = "anyhow")]
    #[error("Generic error: {0}")]
    AnyhowError(#[from] anyhow::Error),

    /// Generic errors for other unexpected situations
    #[error("Generic error: {0}")]
    GenericError(#[from] Box<dyn StdError + Send + Sync>),
}
impl Error {
    /// Checks if the error means the stored bytes are corrupt
    ///
    /// Corruption is unrecoverable for the affected read or statistics object.
    /// Truncated input surfaces as an `UnexpectedEof` I/O error and counts too.
    #[must_use]
    pub fn is_corruption(&self) -> bool {
        match self {
            Self::BlobError(_) => true,
            Self::PackError(err) => err.is_corruption(),
            Self::StatsError(StatsError::HistogramOverflow { .. }) => true,
            Self::IoError(err) => err.kind() == std::io::ErrorKind::UnexpectedEof,
            _ => false,
        }
    }
}

/// Errors raised by the sequence and quality packers
#[derive(thiserror::Error, Debug)]
pub enum PackError {
    /// A sequence symbol cannot be represented by the chosen encoding
    #[error("Symbol {symbol} at position {pos} is not supported by the {bits}-bit encoding")]
    InvalidSymbol { symbol: u8, pos: usize, bits: u8 },

    /// A quality value does not fit into the chosen bit width
    #[error("Quality value {value} at position {pos} does not fit in {bits} bits")]
    ValueTooWide { value: u8, pos: usize, bits: u8 },

    /// Constant-QV packing was requested for an empty or varying quality array
    #[error("Quality values are not constant")]
    NonConstantQuality,

    /// A packed chunk holds a code with no symbol assigned
    #[error("Invalid {bits}-bit code {code} at position {pos}")]
    InvalidCode { code: u8, pos: usize, bits: u8 },

    /// The packed chunk size does not agree with the expected decoded length
    ///
    /// # Fields
    /// * `expected` - Number of packed bytes implied by the expected length
    /// * `got` - Number of bytes actually present in the chunk
    #[error("Packed chunk holds {got} bytes, expected {expected}")]
    LengthMismatch { expected: usize, got: usize },
}
impl PackError {
    /// Encoding-side errors are caller mistakes; decoding-side errors mean a corrupt blob.
    #[must_use]
    pub fn is_corruption(&self) -> bool {
        matches!(self, Self::InvalidCode { .. } | Self::LengthMismatch { .. })
    }
}

/// Errors that can occur while walking a read blob
#[derive(thiserror::Error, Debug)]
pub enum BlobError {
    /// The blob does not start with the blob magic
    #[error("Invalid blob magic: {0:?}")]
    InvalidMagic([u8; 4]),

    /// The length recorded after the magic disagrees with the bytes provided
    #[error("Blob body holds {got} bytes, header claims {expected}")]
    BodyLengthMismatch { expected: usize, got: usize },

    /// A chunk header or payload runs past the end of the blob
    ///
    /// The parameter is the byte position where the chunk starts
    #[error("Chunk truncated at blob position {0}")]
    TruncatedChunk(usize),

    /// A chunk tag that is not part of the format
    #[error("Unknown chunk tag {tag:?} at blob position {pos}")]
    UnknownTag { tag: [u8; 4], pos: usize },

    /// A chunk that appears after a chunk it must precede, or twice
    #[error("Chunk {tag:?} out of canonical order at blob position {pos}")]
    OutOfOrder { tag: [u8; 4], pos: usize },

    /// The raw sequence chunk is mandatory
    #[error("Blob has no raw sequence chunk")]
    MissingRawSequence,

    /// Corrected chunks found for a read that records no corrected sequence
    #[error("Blob holds corrected data but the read has no corrected sequence")]
    UnexpectedCorrectedData,

    /// The descriptor records a corrected sequence that the blob does not hold
    #[error("Read records a corrected sequence of length {0} but the blob has none")]
    MissingCorrectedSequence(u32),

    /// The clear range of the descriptor does not fit the decoded corrected sequence
    #[error("Clear range {bgn}..{end} exceeds corrected sequence of length {len}")]
    ClearRangeOutOfBounds { bgn: u32, end: u32, len: usize },
}

/// Errors related to read descriptors
#[derive(thiserror::Error, Debug)]
pub enum DescriptorError {
    /// The clear range must satisfy `bgn <= end <= corrected length`
    #[error("Invalid clear range {bgn}..{end} for corrected length {corrected_len}")]
    InvalidClearRange {
        bgn: u32,
        end: u32,
        corrected_len: u32,
    },

    /// Attempted to build a descriptor from the wrong number of bytes
    ///
    /// # Arguments
    /// * First `usize` - The actual number of bytes provided
    /// * Second `usize` - The expected number of bytes
    #[error("Invalid number of bytes provided: {0}. Expected: {1}")]
    InvalidSize(usize, usize),
}

/// Errors that can occur while setting the data of a read
#[derive(thiserror::Error, Debug)]
pub enum ReadError {
    /// Quality arrays must be as long as their sequence
    #[error("Quality array of length {qual_len} does not match sequence of length {seq_len}")]
    QualityLengthMismatch { seq_len: usize, qual_len: usize },

    /// A length does not fit into the 32-bit fields of the format
    #[error("Length {0} does not fit in 32 bits")]
    LengthOverflow(usize),
}

/// Errors that can occur while loading k-mer count statistics
#[derive(thiserror::Error, Debug)]
pub enum StatsError {
    /// The stored histogram is longer than the histogram of this object
    #[error("Stored histogram has {stored} buckets but capacity is {capacity}")]
    HistogramOverflow { stored: usize, capacity: usize },

    /// The overflow arrays are too long for their 32-bit length field
    #[error("Overflow arrays hold {0} entries, more than fit in 32 bits")]
    OverflowTooLong(usize),
}

/// Trait for converting arbitrary errors into `Error`
pub trait IntoSqreadError {
    fn into_sqread_error(self) -> Error;
}

// Implement conversion for Box<dyn Error>
impl<E> IntoSqreadError for E
where
    E: StdError + Send + Sync + 'static,
{
    fn into_sqread_error(self) -> Error {
        Error::GenericError(Box::new(self))
    }
}

#[cfg(test)]
mod testing {
    use super::*;
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum MyError {
        #[error("Custom error: {0}")]
        CustomError(String),
    }

    #[test]
    fn test_into_sqread_error() {
        let my_error = MyError::CustomError(String::from("some error"));
        let sq_error = my_error.into_sqread_error();
        assert!(matches!(sq_error, Error::GenericError(_)));
        assert!(!sq_error.is_corruption());
    }

    // ==================== Corruption Classification ====================

    #[test]
    fn test_blob_errors_are_corruption() {
        let error: Error = BlobError::UnknownTag {
            tag: *b"XXXX",
            pos: 8,
        }
        .into();
        assert!(error.is_corruption());
    }

    #[test]
    fn test_pack_encode_errors_are_not_corruption() {
        let error: Error = PackError::InvalidSymbol {
            symbol: b'X',
            pos: 3,
            bits: 3,
        }
        .into();
        assert!(!error.is_corruption());

        let error: Error = PackError::LengthMismatch {
            expected: 4,
            got: 3,
        }
        .into();
        assert!(error.is_corruption());
    }

    #[test]
    fn test_truncation_is_corruption() {
        let error: Error = std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into();
        assert!(error.is_corruption());

        let error: Error = std::io::Error::from(std::io::ErrorKind::PermissionDenied).into();
        assert!(!error.is_corruption());
    }

    #[test]
    fn test_stats_overflow_is_corruption() {
        let error: Error = StatsError::HistogramOverflow {
            stored: 2048,
            capacity: 1024,
        }
        .into();
        assert!(error.is_corruption());
    }

    // ==================== Display Tests ====================

    #[test]
    fn test_length_mismatch_display() {
        let error = PackError::LengthMismatch {
            expected: 25,
            got: 24,
        };
        let error_str = format!("{}", error);
        assert!(error_str.contains("25"));
        assert!(error_str.contains("24"));
    }

    #[test]
    fn test_clear_range_display() {
        let error = DescriptorError::InvalidClearRange {
            bgn: 10,
            end: 5,
            corrected_len: 100,
        };
        let error_str = format!("{}", error);
        assert!(error_str.contains("10..5"));
        assert!(error_str.contains("100"));
    }

    #[test]
    fn test_unknown_tag_display() {
        let error = BlobError::UnknownTag {
            tag: *b"ZZZZ",
            pos: 42,
        };
        let error_str = format!("{}", error);
        assert!(error_str.contains("42"));
    }

    // ==================== Error Conversion Tests ====================

    #[test]
    fn test_error_from_blob_error() {
        let error: Error = BlobError::MissingRawSequence.into();
        assert!(matches!(error, Error::BlobError(_)));
    }

    #[test]
    fn test_error_from_descriptor_error() {
        let error: Error = DescriptorError::InvalidSize(12, 40).into();
        assert!(matches!(error, Error::DescriptorError(_)));
    }

    #[test]
    fn test_error_from_read_error() {
        let error: Error = ReadError::LengthOverflow(1 << 33).into();
        assert!(matches!(error, Error::ReadError(_)));
        assert!(!error.is_corruption());
    }

    #[test]
    fn test_error_debug_output() {
        let error = Error::BlobError(BlobError::MissingRawSequence);
        let debug_str = format!("{:?}", error);
        assert!(debug_str.contains("BlobError"));
    }
}
