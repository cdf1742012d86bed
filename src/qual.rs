//! Quality value packing and unpacking
//!
//! Quality values here are raw Phred scores (not ASCII offset). A read's
//! quality array is stored with the narrowest encoding that holds every value:
//! a single byte when all values are equal, 4 or 5 bits per value when the
//! maximum fits, or one byte per value otherwise.

use crate::bits;
use crate::error::PackError;
use crate::Result;

/// First-byte sentinel of a quality array meaning "no per-base quality values".
///
/// Reads carrying it take the library default quality value for every base.
pub const QV_NONE: u8 = 255;

/// Encoding used for one quality chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualEncoding {
    /// Every value is the same; the chunk holds that value once.
    Constant,
    FourBit,
    FiveBit,
    Unpacked,
}
impl QualEncoding {
    /// Scans `qlt` and picks the narrowest encoding that holds it.
    #[must_use]
    pub fn select(qlt: &[u8]) -> Self {
        if constant_qv(qlt).is_some() {
            return Self::Constant;
        }
        match qlt.iter().copied().max().unwrap_or(0) {
            0..=15 => Self::FourBit,
            16..=31 => Self::FiveBit,
            _ => Self::Unpacked,
        }
    }

    /// Appends the packed form of `qlt` to `chunk`, returning the number of bytes written.
    pub fn encode(self, qlt: &[u8], chunk: &mut Vec<u8>) -> Result<usize> {
        match self {
            Self::Constant => encode_constant_qv(qlt, chunk)
                .ok_or_else(|| PackError::NonConstantQuality.into()),
            Self::FourBit => encode_4bit(qlt, chunk),
            Self::FiveBit => encode_5bit(qlt, chunk),
            Self::Unpacked => {
                chunk.extend_from_slice(qlt);
                Ok(qlt.len())
            }
        }
    }

    /// Replaces the contents of `qlt` with `qlt_len` values unpacked from `chunk`.
    pub fn decode(self, chunk: &[u8], qlt: &mut Vec<u8>, qlt_len: usize) -> Result<()> {
        match self {
            Self::Constant => decode_constant_qv(chunk, qlt, qlt_len),
            Self::FourBit => decode_4bit(chunk, qlt, qlt_len),
            Self::FiveBit => decode_5bit(chunk, qlt, qlt_len),
            Self::Unpacked => {
                check_len(chunk, qlt_len)?;
                qlt.clear();
                qlt.extend_from_slice(chunk);
                Ok(())
            }
        }
    }
}

fn check_len(chunk: &[u8], expected: usize) -> Result<()> {
    if chunk.len() == expected {
        Ok(())
    } else {
        Err(PackError::LengthMismatch {
            expected,
            got: chunk.len(),
        }
        .into())
    }
}

/// Returns the shared value when every entry of `qlt` is equal.
///
/// An empty array has no constant value.
#[must_use]
pub fn constant_qv(qlt: &[u8]) -> Option<u8> {
    let (&first, rest) = qlt.split_first()?;
    rest.iter().all(|&q| q == first).then_some(first)
}

/// Writes the single value of a constant quality array.
///
/// Returns `None`, writing nothing, when `qlt` is empty or not constant.
pub fn encode_constant_qv(qlt: &[u8], chunk: &mut Vec<u8>) -> Option<usize> {
    let qv = constant_qv(qlt)?;
    chunk.push(qv);
    Some(1)
}

/// Expands a constant-QV chunk into `qlt_len` copies of its value.
pub fn decode_constant_qv(chunk: &[u8], qlt: &mut Vec<u8>, qlt_len: usize) -> Result<()> {
    check_len(chunk, 1)?;
    qlt.clear();
    qlt.resize(qlt_len, chunk[0]);
    Ok(())
}

fn encode_nbit(qlt: &[u8], width: u8, chunk: &mut Vec<u8>) -> Result<usize> {
    if let Some(pos) = qlt.iter().position(|&q| q >> width != 0) {
        return Err(PackError::ValueTooWide {
            value: qlt[pos],
            pos,
            bits: width,
        }
        .into());
    }
    Ok(bits::pack(qlt.iter().copied(), width, chunk))
}

fn decode_nbit(chunk: &[u8], width: u8, qlt: &mut Vec<u8>, qlt_len: usize) -> Result<()> {
    check_len(chunk, bits::packed_len(qlt_len, width))?;
    qlt.clear();
    qlt.extend(bits::unpack(chunk, width, qlt_len));
    Ok(())
}

/// Packs quality values below 16 at four bits each.
pub fn encode_4bit(qlt: &[u8], chunk: &mut Vec<u8>) -> Result<usize> {
    encode_nbit(qlt, 4, chunk)
}

/// Packs quality values below 32 at five bits each.
pub fn encode_5bit(qlt: &[u8], chunk: &mut Vec<u8>) -> Result<usize> {
    encode_nbit(qlt, 5, chunk)
}

pub fn decode_4bit(chunk: &[u8], qlt: &mut Vec<u8>, qlt_len: usize) -> Result<()> {
    decode_nbit(chunk, 4, qlt, qlt_len)
}

pub fn decode_5bit(chunk: &[u8], qlt: &mut Vec<u8>, qlt_len: usize) -> Result<()> {
    decode_nbit(chunk, 5, qlt, qlt_len)
}
