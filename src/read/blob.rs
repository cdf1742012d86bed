//! Tagged chunk layout of a read blob
//!
//! ```text
//! [BLOB][body_len: u32]
//!     [tag: 4][len: u32][payload]   name
//!     [tag: 4][len: u32][payload]   raw sequence
//!     [tag: 4][len: u32][payload]   raw qualities
//!     [tag: 4][len: u32][payload]   corrected sequence
//!     [tag: 4][len: u32][payload]   corrected qualities
//! ```
//!
//! All integers are little-endian. Chunks appear in the order above; absent
//! chunks are skipped. The first tag byte names the packing and the last three
//! name the field:
//!
//! | Tag    | Field                | Packing              |
//! |--------|----------------------|----------------------|
//! | `NAME` | name                 | bytes                |
//! | `?SQR` | raw sequence         | `2`, `3` or `U`      |
//! | `?QVR` | raw qualities        | `1`, `4`, `5` or `U` |
//! | `?SQC` | corrected sequence   | `2`, `3` or `U`      |
//! | `?QVC` | corrected qualities  | `1`, `4`, `5` or `U` |
//!
//! `1` is the constant-QV packing; `U` stores one byte per value.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{BlobError, ReadError, Result};
use crate::nuc::SeqEncoding;
use crate::qual::QualEncoding;
use crate::utils::slice_and_increment;

/// Magic bytes opening every blob
pub const BLOB_MAGIC: &[u8; 4] = b"BLOB";

/// Size of the blob header (magic and body length)
pub const SIZE_BLOB_HEADER: usize = 8;

/// Size of a chunk header (tag and payload length)
pub const SIZE_CHUNK_HEADER: usize = 8;

/// Which stored version of the read a chunk belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Raw,
    Corrected,
}

/// Identifies the field and packing of one chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkTag {
    Name,
    Sequence(Stage, SeqEncoding),
    Quality(Stage, QualEncoding),
}
impl ChunkTag {
    /// Position of the chunk in the canonical order.
    #[must_use]
    pub fn rank(self) -> u8 {
        match self {
            Self::Name => 0,
            Self::Sequence(Stage::Raw, _) => 1,
            Self::Quality(Stage::Raw, _) => 2,
            Self::Sequence(Stage::Corrected, _) => 3,
            Self::Quality(Stage::Corrected, _) => 4,
        }
    }

    #[must_use]
    pub fn to_bytes(self) -> [u8; 4] {
        let (packing, field) = match self {
            Self::Name => return *b"NAME",
            Self::Sequence(stage, encoding) => {
                let packing = match encoding {
                    SeqEncoding::TwoBit => b'2',
                    SeqEncoding::ThreeBit => b'3',
                    SeqEncoding::Unpacked => b'U',
                };
                let field = match stage {
                    Stage::Raw => b"SQR",
                    Stage::Corrected => b"SQC",
                };
                (packing, field)
            }
            Self::Quality(stage, encoding) => {
                let packing = match encoding {
                    QualEncoding::Constant => b'1',
                    QualEncoding::FourBit => b'4',
                    QualEncoding::FiveBit => b'5',
                    QualEncoding::Unpacked => b'U',
                };
                let field = match stage {
                    Stage::Raw => b"QVR",
                    Stage::Corrected => b"QVC",
                };
                (packing, field)
            }
        };
        [packing, field[0], field[1], field[2]]
    }

    /// Parses a tag, returning `None` for anything outside the format.
    #[must_use]
    pub fn from_bytes(tag: [u8; 4]) -> Option<Self> {
        if &tag == b"NAME" {
            return Some(Self::Name);
        }
        let [packing, field @ ..] = tag;
        match &field {
            b"SQR" | b"SQC" => {
                let stage = if field[2] == b'R' {
                    Stage::Raw
                } else {
                    Stage::Corrected
                };
                let encoding = match packing {
                    b'2' => SeqEncoding::TwoBit,
                    b'3' => SeqEncoding::ThreeBit,
                    b'U' => SeqEncoding::Unpacked,
                    _ => return None,
                };
                Some(Self::Sequence(stage, encoding))
            }
            b"QVR" | b"QVC" => {
                let stage = if field[2] == b'R' {
                    Stage::Raw
                } else {
                    Stage::Corrected
                };
                let encoding = match packing {
                    b'1' => QualEncoding::Constant,
                    b'4' => QualEncoding::FourBit,
                    b'5' => QualEncoding::FiveBit,
                    b'U' => QualEncoding::Unpacked,
                    _ => return None,
                };
                Some(Self::Quality(stage, encoding))
            }
            _ => None,
        }
    }
}

fn to_u32(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| ReadError::LengthOverflow(len).into())
}

/// Clears `blob` and writes the blob header with a placeholder length.
pub(crate) fn begin_blob(blob: &mut Vec<u8>) {
    blob.clear();
    blob.extend_from_slice(BLOB_MAGIC);
    blob.extend_from_slice(&[0; 4]);
}

/// Appends one chunk whose payload is produced by `fill`.
///
/// `fill` appends the payload to the blob and returns its length.
pub(crate) fn write_chunk<F>(blob: &mut Vec<u8>, tag: ChunkTag, fill: F) -> Result<()>
where
    F: FnOnce(&mut Vec<u8>) -> Result<usize>,
{
    let header_pos = blob.len();
    blob.extend_from_slice(&tag.to_bytes());
    blob.extend_from_slice(&[0; 4]);
    let len = to_u32(fill(blob)?)?;
    LittleEndian::write_u32(&mut blob[header_pos + 4..header_pos + 8], len);
    Ok(())
}

/// Patches the body length into the header and returns the full blob length.
pub(crate) fn finish_blob(blob: &mut [u8]) -> Result<u32> {
    let total = to_u32(blob.len())?;
    LittleEndian::write_u32(&mut blob[4..8], total - SIZE_BLOB_HEADER as u32);
    Ok(total)
}

/// One chunk borrowed from a blob
#[derive(Debug, Clone, Copy)]
pub struct Chunk<'a> {
    /// Byte position of the chunk header within the blob
    pub pos: usize,
    pub tag: ChunkTag,
    pub payload: &'a [u8],
}

/// Iterator over the chunks of a blob, in storage order.
///
/// Yields an error and then stops at the first malformed chunk.
pub struct ChunkIter<'a> {
    blob: &'a [u8],
    offset: usize,
}
impl<'a> Iterator for ChunkIter<'a> {
    type Item = Result<Chunk<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.blob.len() {
            return None;
        }
        let result = self.next_chunk();
        if result.is_err() {
            self.offset = self.blob.len();
        }
        Some(result)
    }
}
impl<'a> ChunkIter<'a> {
    fn next_chunk(&mut self) -> Result<Chunk<'a>> {
        let pos = self.offset;
        let header = slice_and_increment(&mut self.offset, SIZE_CHUNK_HEADER, self.blob)
            .ok_or(BlobError::TruncatedChunk(pos))?;

        let tag_bytes = [header[0], header[1], header[2], header[3]];
        let tag = ChunkTag::from_bytes(tag_bytes).ok_or(BlobError::UnknownTag {
            tag: tag_bytes,
            pos,
        })?;

        let len = LittleEndian::read_u32(&header[4..8]) as usize;
        let payload = slice_and_increment(&mut self.offset, len, self.blob)
            .ok_or(BlobError::TruncatedChunk(pos))?;

        Ok(Chunk { pos, tag, payload })
    }
}

/// Checks the blob header and returns an iterator over its chunks.
pub fn chunks(blob: &[u8]) -> Result<ChunkIter<'_>> {
    if blob.len() < SIZE_BLOB_HEADER {
        return Err(BlobError::TruncatedChunk(0).into());
    }
    let magic = [blob[0], blob[1], blob[2], blob[3]];
    if &magic != BLOB_MAGIC {
        return Err(BlobError::InvalidMagic(magic).into());
    }
    let expected = LittleEndian::read_u32(&blob[4..8]) as usize;
    let got = blob.len() - SIZE_BLOB_HEADER;
    if expected != got {
        return Err(BlobError::BodyLengthMismatch { expected, got }.into());
    }
    Ok(ChunkIter {
        blob,
        offset: SIZE_BLOB_HEADER,
    })
}
