//! Nucleotide packing and unpacking
//!
//! Three encodings are available for a read's bases:
//!
//! | Encoding | Alphabet        | Bytes for `n` bases |
//! |----------|-----------------|---------------------|
//! | 2-bit    | `A C G T`       | `ceil(n / 4)`       |
//! | 3-bit    | `A C G T N`     | `ceil(3n / 8)`      |
//! | Unpacked | any byte        | `n`                 |
//!
//! The 2-bit path wraps the `bitnuc` crate: the `u64` words it produces are
//! written as little-endian bytes and truncated to the bytes actually used.
//! The choice of encoding happens before packing through
//! [`SeqEncoding::select`]; handing a packer a symbol outside its alphabet
//! is an error.

use byteorder::{ByteOrder, LittleEndian};

use crate::bits;
use crate::error::{Error, PackError};
use crate::Result;

/// Alphabet of the 3-bit encoding, indexed by code.
const THREE_BIT_ALPHABET: [u8; 5] = *b"ACGTN";

/// Bases held by one bitnuc word.
const BASES_PER_WORD: usize = 32;

/// Encoding used for one packed sequence chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeqEncoding {
    TwoBit,
    ThreeBit,
    Unpacked,
}
impl SeqEncoding {
    /// Scans the alphabet of `seq` and picks the narrowest encoding that holds it.
    #[must_use]
    pub fn select(seq: &[u8]) -> Self {
        let mut encoding = Self::TwoBit;
        for &base in seq {
            match base {
                b'A' | b'C' | b'G' | b'T' => {}
                b'N' => encoding = Self::ThreeBit,
                _ => return Self::Unpacked,
            }
        }
        encoding
    }

    /// Number of packed bytes for a sequence of `len` bases.
    #[must_use]
    pub fn packed_len(self, len: usize) -> usize {
        match self {
            Self::TwoBit => bits::packed_len(len, 2),
            Self::ThreeBit => bits::packed_len(len, 3),
            Self::Unpacked => len,
        }
    }

    /// Appends the packed form of `seq` to `chunk`, returning the number of bytes written.
    pub fn encode(self, seq: &[u8], chunk: &mut Vec<u8>) -> Result<usize> {
        match self {
            Self::TwoBit => encode_2bit(seq, chunk),
            Self::ThreeBit => encode_3bit(seq, chunk),
            Self::Unpacked => {
                chunk.extend_from_slice(seq);
                Ok(seq.len())
            }
        }
    }

    /// Replaces the contents of `seq` with `seq_len` bases unpacked from `chunk`.
    pub fn decode(self, chunk: &[u8], seq: &mut Vec<u8>, seq_len: usize) -> Result<()> {
        match self {
            Self::TwoBit => decode_2bit(chunk, seq, seq_len),
            Self::ThreeBit => decode_3bit(chunk, seq, seq_len),
            Self::Unpacked => {
                check_len(chunk, seq_len)?;
                seq.clear();
                seq.extend_from_slice(chunk);
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

/// Packs `seq` at two bits per base
///
/// # Arguments
///
/// * `seq` - A slice of ASCII nucleotides (A, C, G, T)
/// * `chunk` - The output buffer; packed bytes are appended to it
///
/// # Returns
///
/// * `Ok(usize)` - The number of bytes appended
/// * `Err(Error)` - If invalid nucleotides were found in the input
///
/// # Example
///
/// ```
/// use sqread::nuc;
///
/// let mut chunk = Vec::new();
/// let n = nuc::encode_2bit(b"ACGTA", &mut chunk).unwrap();
/// assert_eq!(n, 2);
/// ```
pub fn encode_2bit(seq: &[u8], chunk: &mut Vec<u8>) -> Result<usize> {
    if seq.is_empty() {
        return Ok(0);
    }
    let mut words = Vec::with_capacity(seq.len().div_ceil(BASES_PER_WORD));
    bitnuc::encode(seq, &mut words).map_err(Error::from)?;

    let n_bytes = bits::packed_len(seq.len(), 2);
    let start = chunk.len();
    chunk.resize(start + words.len() * 8, 0);
    LittleEndian::write_u64_into(&words, &mut chunk[start..]);
    chunk.truncate(start + n_bytes);
    Ok(n_bytes)
}

/// Unpacks `seq_len` bases stored at two bits per base
///
/// # Example
///
/// ```
/// use sqread::nuc;
///
/// let mut chunk = Vec::new();
/// nuc::encode_2bit(b"ACGT", &mut chunk).unwrap();
///
/// let mut seq = Vec::new();
/// nuc::decode_2bit(&chunk, &mut seq, 4).unwrap();
/// assert_eq!(seq, b"ACGT");
/// ```
pub fn decode_2bit(chunk: &[u8], seq: &mut Vec<u8>, seq_len: usize) -> Result<()> {
    check_len(chunk, bits::packed_len(seq_len, 2))?;
    seq.clear();
    if seq_len == 0 {
        return Ok(());
    }

    let mut padded = chunk.to_vec();
    padded.resize(seq_len.div_ceil(BASES_PER_WORD) * 8, 0);
    let mut words = vec![0u64; padded.len() / 8];
    LittleEndian::read_u64_into(&padded, &mut words);
    bitnuc::decode(&words, seq_len, seq).map_err(Error::from)
}

/// Packs `seq` at three bits per base, accepting `A C G T N`.
pub fn encode_3bit(seq: &[u8], chunk: &mut Vec<u8>) -> Result<usize> {
    let mut codes = Vec::with_capacity(seq.len());
    for (pos, &symbol) in seq.iter().enumerate() {
        let Some(code) = THREE_BIT_ALPHABET.iter().position(|&b| b == symbol) else {
            return Err(PackError::InvalidSymbol {
                symbol,
                pos,
                bits: 3,
            }
            .into());
        };
        codes.push(code as u8);
    }
    Ok(bits::pack(codes.into_iter(), 3, chunk))
}

/// Unpacks `seq_len` bases stored at three bits per base.
pub fn decode_3bit(chunk: &[u8], seq: &mut Vec<u8>, seq_len: usize) -> Result<()> {
    check_len(chunk, bits::packed_len(seq_len, 3))?;

    seq.clear();
    seq.reserve(seq_len);
    for (pos, code) in bits::unpack(chunk, 3, seq_len).enumerate() {
        let Some(&base) = THREE_BIT_ALPHABET.get(code as usize) else {
            return Err(PackError::InvalidCode { code, pos, bits: 3 }.into());
        };
        seq.push(base);
    }
    Ok(())
}
