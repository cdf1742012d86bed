use std::io;

use bytemuck::{Pod, Zeroable};

use super::ReadData;
use crate::error::{DescriptorError, Result};
use crate::ReadVersion;

/// Read is excluded from use (too short, filtered, ...)
pub const FLAG_IGNORE: u8 = 1 << 0;

/// A corrected sequence exists for the read
pub const FLAG_CORRECTED: u8 = 1 << 6;

/// A clear range has been applied to the corrected sequence
pub const FLAG_TRIMMED: u8 = 1 << 7;

/// Size in bytes of a serialized [`ReadDescriptor`]
pub const SIZE_DESCRIPTOR: usize = size_of::<ReadDescriptor>();

/// Fixed-size description of one read in a store.
///
/// Records the lengths of each version of the read, its clear range, its
/// flags, and where its blob lives in the blob files. The flags are set by
/// the store; the codec only reads them.
///
/// Invariant: `clear_bgn <= clear_end <= corrected_len`.
#[derive(Copy, Clone, Pod, Zeroable, Debug, Default, PartialEq, Eq, Hash)]
#[repr(C)]
pub struct ReadDescriptor {
    read_id: u32,
    library_id: u32,

    /// length of the stored raw sequence
    pub(crate) raw_len: u32,
    /// length of the stored corrected sequence
    pub(crate) corrected_len: u32,

    // trim points in the corrected sequence
    pub(crate) clear_bgn: u32,
    pub(crate) clear_end: u32,

    pub(crate) blob_len: u32,
    reserved: [u8; 3],
    flags: u8,

    // location of the blob: 4 GiB per file, 65k files, 65k partitions
    m_byte: u32,
    m_segm: u16,
    m_part: u16,
}

/// Read-only accessors
impl ReadDescriptor {
    /// Creates an empty descriptor for a newly registered read.
    #[must_use]
    pub fn new(read_id: u32, library_id: u32) -> Self {
        Self {
            read_id,
            library_id,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn read_id(&self) -> u32 {
        self.read_id
    }

    #[must_use]
    pub fn library_id(&self) -> u32 {
        self.library_id
    }

    /// Length of the requested version of the read.
    ///
    /// Ignored reads have length 0 whatever the version. `Latest` falls back
    /// from trimmed to corrected to raw following the existence flags.
    #[must_use]
    pub fn sequence_length(&self, version: ReadVersion) -> u32 {
        if self.ignore() {
            return 0;
        }
        match version {
            ReadVersion::Raw => self.raw_len,
            ReadVersion::Corrected => self.corrected_len,
            ReadVersion::Trimmed => self.clear_end - self.clear_bgn,
            ReadVersion::Latest => {
                if self.trimmed_exists() {
                    self.clear_end - self.clear_bgn
                } else if self.corrected_exists() {
                    self.corrected_len
                } else {
                    self.raw_len
                }
            }
        }
    }

    #[must_use]
    pub fn clear_bgn(&self) -> u32 {
        self.clear_bgn
    }

    #[must_use]
    pub fn clear_end(&self) -> u32 {
        self.clear_end
    }

    /// Length of the encoded blob in bytes.
    #[must_use]
    pub fn blob_len(&self) -> u32 {
        self.blob_len
    }

    #[must_use]
    pub fn ignore(&self) -> bool {
        self.flags & FLAG_IGNORE != 0
    }

    #[must_use]
    pub fn corrected_exists(&self) -> bool {
        self.flags & FLAG_CORRECTED != 0
    }

    #[must_use]
    pub fn trimmed_exists(&self) -> bool {
        self.flags & FLAG_TRIMMED != 0
    }

    /// Blob file the read is stored in.
    #[must_use]
    pub fn segment(&self) -> u16 {
        self.m_segm
    }

    /// Byte offset of the blob within its blob file.
    #[must_use]
    pub fn byte_offset(&self) -> u32 {
        self.m_byte
    }

    /// Partition the read belongs to, if the store is partitioned.
    #[must_use]
    pub fn partition(&self) -> u16 {
        self.m_part
    }
}

/// Store-facing mutators
impl ReadDescriptor {
    pub fn set_ignore(&mut self, ignore: bool) {
        self.set_flag(FLAG_IGNORE, ignore);
    }

    /// Records which versions of the read exist.
    ///
    /// The store sets these when a read is handed to a user; they decide what
    /// `Latest` resolves to.
    pub fn set_version_flags(&mut self, corrected: bool, trimmed: bool) {
        self.set_flag(FLAG_CORRECTED, corrected);
        self.set_flag(FLAG_TRIMMED, trimmed);
    }

    /// Records where the blob of this read is stored.
    pub fn set_location(&mut self, segment: u16, byte_offset: u32, partition: u16) {
        self.m_segm = segment;
        self.m_byte = byte_offset;
        self.m_part = partition;
    }

    /// Sets the trim points within the corrected sequence.
    pub fn set_clear_range(&mut self, bgn: u32, end: u32) -> Result<()> {
        check_clear_range(bgn, end, self.corrected_len)?;
        self.clear_bgn = bgn;
        self.clear_end = end;
        Ok(())
    }

    fn set_flag(&mut self, flag: u8, value: bool) {
        if value {
            self.flags |= flag;
        } else {
            self.flags &= !flag;
        }
    }
}

fn check_clear_range(bgn: u32, end: u32, corrected_len: u32) -> Result<()> {
    if bgn <= end && end <= corrected_len {
        Ok(())
    } else {
        Err(DescriptorError::InvalidClearRange {
            bgn,
            end,
            corrected_len,
        }
        .into())
    }
}

impl ReadDescriptor {
    /// Loads the blob of this read from `reader` into `data`.
    ///
    /// `reader` must already be positioned at the first byte of this read's
    /// blob; the position is not checked. Exactly `blob_len` bytes are
    /// consumed. The buffers of `data` are reused.
    pub fn load_data_from_stream<R: io::Read>(
        &self,
        data: &mut ReadData,
        reader: &mut R,
    ) -> Result<()> {
        data.read = *self;
        data.blob.resize(self.blob_len as usize, 0);
        reader.read_exact(&mut data.blob)?;
        data.load_from_stored_blob()
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != SIZE_DESCRIPTOR {
            return Err(DescriptorError::InvalidSize(bytes.len(), SIZE_DESCRIPTOR).into());
        }
        let read: Self = bytemuck::pod_read_unaligned(bytes);
        check_clear_range(read.clear_bgn, read.clear_end, read.corrected_len)?;
        Ok(read)
    }

    pub fn write<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(self.as_bytes())?;
        Ok(())
    }
}
