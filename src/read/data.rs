use super::blob::{self, ChunkTag, Stage};
use super::ReadDescriptor;
use crate::error::{BlobError, ReadError, Result};
use crate::nuc::SeqEncoding;
use crate::qual::{constant_qv, QualEncoding, QV_NONE};
use crate::utils::Span;
use crate::{ReadConfig, ReadVersion};

/// Decoded data of one read.
///
/// Owns the name, the raw and corrected sequences with their qualities, and
/// the encoded blob. The trimmed version is a [`Span`] into the corrected
/// buffers rather than a copy of them, so it is empty whenever no corrected
/// sequence is held.
///
/// A `ReadData` is meant to be reused: loading a new read overwrites the
/// buffers in place and keeps their allocations.
#[derive(Clone, Debug, Default)]
pub struct ReadData {
    /// Copy of the descriptor of the read held
    pub(crate) read: ReadDescriptor,
    config: ReadConfig,

    name: Vec<u8>,

    raw_seq: Vec<u8>,
    raw_qual: Vec<u8>,

    corrected_seq: Vec<u8>,
    corrected_qual: Vec<u8>,

    /// Clear range of the corrected buffers
    trimmed: Span,

    /// Encoded blob, either produced by `encode_blob` or read from a store
    pub(crate) blob: Vec<u8>,
}

/// Construction and accessors
impl ReadData {
    #[must_use]
    pub fn new(config: ReadConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Creates empty working data for a newly registered read.
    #[must_use]
    pub fn for_read(read: ReadDescriptor, config: ReadConfig) -> Self {
        Self {
            read,
            config,
            ..Default::default()
        }
    }

    /// The descriptor of the read, kept in step with the data held.
    #[must_use]
    pub fn read(&self) -> &ReadDescriptor {
        &self.read
    }

    #[must_use]
    pub fn config(&self) -> &ReadConfig {
        &self.config
    }

    #[must_use]
    pub fn name(&self) -> &[u8] {
        &self.name
    }

    /// Sequence in the default version of the configuration.
    #[must_use]
    pub fn sequence(&self) -> &[u8] {
        self.sequence_of(self.config.default_version)
    }

    /// Qualities in the default version of the configuration.
    #[must_use]
    pub fn qualities(&self) -> &[u8] {
        self.qualities_of(self.config.default_version)
    }

    #[must_use]
    pub fn sequence_of(&self, version: ReadVersion) -> &[u8] {
        match self.resolve(version) {
            ReadVersion::Raw => &self.raw_seq,
            ReadVersion::Corrected => &self.corrected_seq,
            _ => self.trimmed.slice(&self.corrected_seq),
        }
    }

    #[must_use]
    pub fn qualities_of(&self, version: ReadVersion) -> &[u8] {
        match self.resolve(version) {
            ReadVersion::Raw => &self.raw_qual,
            ReadVersion::Corrected => &self.corrected_qual,
            _ => self.trimmed.slice(&self.corrected_qual),
        }
    }

    #[must_use]
    pub fn raw_sequence(&self) -> &[u8] {
        &self.raw_seq
    }

    #[must_use]
    pub fn raw_qualities(&self) -> &[u8] {
        &self.raw_qual
    }

    #[must_use]
    pub fn corrected_sequence(&self) -> &[u8] {
        &self.corrected_seq
    }

    #[must_use]
    pub fn corrected_qualities(&self) -> &[u8] {
        &self.corrected_qual
    }

    #[must_use]
    pub fn trimmed_sequence(&self) -> &[u8] {
        self.trimmed.slice(&self.corrected_seq)
    }

    #[must_use]
    pub fn trimmed_qualities(&self) -> &[u8] {
        self.trimmed.slice(&self.corrected_qual)
    }

    /// The last blob encoded or loaded.
    #[must_use]
    pub fn blob(&self) -> &[u8] {
        &self.blob
    }

    fn resolve(&self, version: ReadVersion) -> ReadVersion {
        version.resolve(self.read.corrected_exists(), self.read.trimmed_exists())
    }
}

/// Mutators
impl ReadData {
    pub fn set_name(&mut self, name: &[u8]) {
        self.name.clear();
        self.name.extend_from_slice(name);
    }

    /// Sets the raw sequence and its qualities.
    ///
    /// `qual` must be as long as `seq`, or be empty or start with
    /// [`QV_NONE`], in which case every base gets the library default QV.
    pub fn set_raw(&mut self, seq: &[u8], qual: &[u8]) -> Result<()> {
        let len = to_u32(seq.len())?;
        fill_bases_quals(
            &mut self.raw_seq,
            &mut self.raw_qual,
            seq,
            qual,
            self.config.default_qv,
        )?;
        self.read.raw_len = len;
        Ok(())
    }

    /// Sets the corrected sequence and its qualities.
    ///
    /// The clear range is reset to cover the whole corrected sequence. An
    /// empty `seq` removes the corrected version.
    pub fn set_corrected(&mut self, seq: &[u8], qual: &[u8]) -> Result<()> {
        let len = to_u32(seq.len())?;
        fill_bases_quals(
            &mut self.corrected_seq,
            &mut self.corrected_qual,
            seq,
            qual,
            self.config.default_qv,
        )?;
        self.read.corrected_len = len;
        self.read.clear_bgn = 0;
        self.read.clear_end = len;
        self.trimmed = Span::new(0, seq.len());
        Ok(())
    }

    /// Sets the trim points within the corrected sequence.
    pub fn set_clear_range(&mut self, bgn: u32, end: u32) -> Result<()> {
        self.read.set_clear_range(bgn, end)?;
        self.trimmed = Span::new_u32(bgn, end - bgn);
        Ok(())
    }
}

fn to_u32(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| ReadError::LengthOverflow(len).into())
}

fn fill_bases_quals(
    seq_buf: &mut Vec<u8>,
    qual_buf: &mut Vec<u8>,
    seq: &[u8],
    qual: &[u8],
    default_qv: u8,
) -> Result<()> {
    let no_qualities = matches!(qual.first(), None | Some(&QV_NONE));
    if !no_qualities && qual.len() != seq.len() {
        return Err(ReadError::QualityLengthMismatch {
            seq_len: seq.len(),
            qual_len: qual.len(),
        }
        .into());
    }

    seq_buf.clear();
    seq_buf.extend_from_slice(seq);
    qual_buf.clear();
    if no_qualities {
        qual_buf.resize(seq.len(), default_qv);
    } else {
        qual_buf.extend_from_slice(qual);
    }
    Ok(())
}

/// Blob encoding and decoding
impl ReadData {
    /// Encodes the read into its blob.
    ///
    /// The blob is built in the reusable buffer of this read and its length is
    /// recorded in the descriptor. Corrected chunks are written only when a
    /// corrected sequence is held; quality chunks are skipped when every value
    /// equals the library default.
    pub fn encode_blob(&mut self) -> Result<&[u8]> {
        let default_qv = self.config.default_qv;
        let blob = &mut self.blob;
        blob::begin_blob(blob);

        if !self.name.is_empty() {
            blob::write_chunk(blob, ChunkTag::Name, |b| {
                b.extend_from_slice(&self.name);
                Ok(self.name.len())
            })?;
        }

        encode_stage(blob, Stage::Raw, &self.raw_seq, &self.raw_qual, default_qv)?;
        if self.read.corrected_len > 0 {
            encode_stage(
                blob,
                Stage::Corrected,
                &self.corrected_seq,
                &self.corrected_qual,
                default_qv,
            )?;
        }

        self.read.blob_len = blob::finish_blob(blob)?;
        Ok(&self.blob)
    }

    /// Decodes `blob` into this read.
    ///
    /// Sequence lengths and the clear range come from the descriptor held.
    /// Missing quality chunks decode to the library default QV. After a
    /// failed load the trimmed version is empty.
    pub fn load_from_blob(&mut self, blob: &[u8]) -> Result<()> {
        let raw_len = self.read.raw_len as usize;
        let corrected_len = self.read.corrected_len as usize;
        self.trimmed = Span::default();

        let mut last_rank = None;
        let mut seen = [false; 5];
        for chunk in blob::chunks(blob)? {
            let chunk = chunk?;
            let rank = chunk.tag.rank();
            if last_rank.is_some_and(|last| last >= rank) {
                return Err(BlobError::OutOfOrder {
                    tag: chunk.tag.to_bytes(),
                    pos: chunk.pos,
                }
                .into());
            }
            last_rank = Some(rank);
            seen[rank as usize] = true;

            match chunk.tag {
                ChunkTag::Name => self.set_name(chunk.payload),
                ChunkTag::Sequence(Stage::Raw, encoding) => {
                    encoding.decode(chunk.payload, &mut self.raw_seq, raw_len)?;
                }
                ChunkTag::Quality(Stage::Raw, encoding) => {
                    encoding.decode(chunk.payload, &mut self.raw_qual, raw_len)?;
                }
                ChunkTag::Sequence(Stage::Corrected, _) | ChunkTag::Quality(Stage::Corrected, _)
                    if corrected_len == 0 =>
                {
                    return Err(BlobError::UnexpectedCorrectedData.into());
                }
                ChunkTag::Sequence(Stage::Corrected, encoding) => {
                    encoding.decode(chunk.payload, &mut self.corrected_seq, corrected_len)?;
                }
                ChunkTag::Quality(Stage::Corrected, encoding) => {
                    encoding.decode(chunk.payload, &mut self.corrected_qual, corrected_len)?;
                }
            }
        }

        let [has_name, has_raw_seq, has_raw_qual, has_corrected_seq, has_corrected_qual] = seen;
        if !has_name {
            self.name.clear();
        }
        if !has_raw_seq {
            return Err(BlobError::MissingRawSequence.into());
        }
        if !has_raw_qual {
            self.raw_qual.clear();
            self.raw_qual.resize(raw_len, self.config.default_qv);
        }

        if corrected_len == 0 {
            self.corrected_seq.clear();
            self.corrected_qual.clear();
            self.trimmed = Span::default();
            return Ok(());
        }
        if !has_corrected_seq {
            return Err(BlobError::MissingCorrectedSequence(self.read.corrected_len).into());
        }
        if !has_corrected_qual {
            self.corrected_qual.clear();
            self.corrected_qual.resize(corrected_len, self.config.default_qv);
        }

        let (bgn, end) = (self.read.clear_bgn, self.read.clear_end);
        if bgn > end || end as usize > self.corrected_seq.len() {
            return Err(BlobError::ClearRangeOutOfBounds {
                bgn,
                end,
                len: self.corrected_seq.len(),
            }
            .into());
        }
        self.trimmed = Span::new_u32(bgn, end - bgn);
        Ok(())
    }

    /// Decodes the blob already held in the reusable buffer.
    pub(crate) fn load_from_stored_blob(&mut self) -> Result<()> {
        let blob = std::mem::take(&mut self.blob);
        let result = self.load_from_blob(&blob);
        self.blob = blob;
        result
    }
}

fn encode_stage(
    blob: &mut Vec<u8>,
    stage: Stage,
    seq: &[u8],
    qual: &[u8],
    default_qv: u8,
) -> Result<()> {
    let seq_encoding = SeqEncoding::select(seq);
    blob::write_chunk(blob, ChunkTag::Sequence(stage, seq_encoding), |b| {
        seq_encoding.encode(seq, b)
    })?;

    if qual.is_empty() || constant_qv(qual) == Some(default_qv) {
        log::trace!("{stage:?} read: {seq_encoding:?} sequence, default qualities");
        return Ok(());
    }
    let qual_encoding = QualEncoding::select(qual);
    blob::write_chunk(blob, ChunkTag::Quality(stage, qual_encoding), |b| {
        qual_encoding.encode(qual, b)
    })?;
    log::trace!("{stage:?} read: {seq_encoding:?} sequence, {qual_encoding:?} qualities");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, ReadConfigBuilder};

    fn raw_read(seq: &[u8], qual: &[u8]) -> ReadData {
        let mut data = ReadData::for_read(ReadDescriptor::new(1, 1), ReadConfig::default());
        data.set_name(b"read_0001");
        data.set_raw(seq, qual).unwrap();
        data
    }

    /// Decodes the blob of `data` into fresh working data.
    fn reload(data: &mut ReadData) -> ReadData {
        data.encode_blob().unwrap();
        let mut loaded = ReadData::for_read(*data.read(), *data.config());
        loaded.load_from_blob(data.blob()).unwrap();
        loaded
    }

    // ==================== Setting Data ====================

    #[test]
    fn test_set_raw_with_missing_qualities() {
        let data = raw_read(b"ACGT", &[QV_NONE, 0, 0, 0]);
        assert_eq!(data.raw_qualities(), &[20, 20, 20, 20]);

        let data = raw_read(b"ACGT", &[]);
        assert_eq!(data.raw_qualities(), &[20, 20, 20, 20]);
    }

    #[test]
    fn test_set_raw_quality_length_mismatch() {
        let mut data = ReadData::new(ReadConfig::default());
        let result = data.set_raw(b"ACGT", &[30, 30]);
        assert!(matches!(
            result,
            Err(Error::ReadError(ReadError::QualityLengthMismatch {
                seq_len: 4,
                qual_len: 2
            }))
        ));
    }

    #[test]
    fn test_set_corrected_resets_clear_range() {
        let mut data = raw_read(b"ACGTACGT", &[30; 8]);
        data.set_corrected(b"ACGTAC", &[31; 6]).unwrap();
        assert_eq!(data.read().clear_bgn(), 0);
        assert_eq!(data.read().clear_end(), 6);
        assert_eq!(data.trimmed_sequence(), b"ACGTAC");

        data.set_clear_range(1, 4).unwrap();
        assert_eq!(data.trimmed_sequence(), b"CGT");
        assert_eq!(data.trimmed_qualities(), &[31; 3]);
        assert!(data.set_clear_range(2, 7).is_err());
    }

    // ==================== Versions ====================

    #[test]
    fn test_latest_follows_flags() {
        let mut data = raw_read(b"ACGTACGT", &[30; 8]);
        data.set_corrected(b"CGTACG", &[35; 6]).unwrap();
        data.set_clear_range(2, 5).unwrap();

        assert_eq!(data.sequence_of(ReadVersion::Latest), b"ACGTACGT");
        data.read.set_version_flags(true, false);
        assert_eq!(data.sequence_of(ReadVersion::Latest), b"CGTACG");
        data.read.set_version_flags(true, true);
        assert_eq!(data.sequence_of(ReadVersion::Latest), b"TAC");
        assert_eq!(data.sequence(), b"TAC");
    }

    #[test]
    fn test_default_version_from_config() {
        let config = ReadConfigBuilder::new()
            .default_version(ReadVersion::Raw)
            .build();
        let mut data = ReadData::new(config);
        data.set_raw(b"ACGT", &[30; 4]).unwrap();
        data.set_corrected(b"AC", &[30; 2]).unwrap();
        data.read.set_version_flags(true, true);
        assert_eq!(data.sequence(), b"ACGT");
        assert_eq!(data.qualities(), &[30; 4]);
    }

    // ==================== Blob Round Trips ====================

    #[test]
    fn test_raw_only_roundtrip() {
        let mut data = raw_read(b"ACGTTGCANNACGT", &[2, 40, 35, 30, 30, 12, 8, 9, 0, 1, 41, 41, 40, 7]);
        let loaded = reload(&mut data);

        assert_eq!(loaded.name(), b"read_0001");
        assert_eq!(loaded.raw_sequence(), data.raw_sequence());
        assert_eq!(loaded.raw_qualities(), data.raw_qualities());
        assert!(loaded.corrected_sequence().is_empty());
        assert!(loaded.sequence_of(ReadVersion::Corrected).is_empty());
        assert!(loaded.sequence_of(ReadVersion::Trimmed).is_empty());
        assert!(loaded.qualities_of(ReadVersion::Trimmed).is_empty());
    }

    #[test]
    fn test_raw_only_blob_has_no_corrected_chunks() {
        let mut data = raw_read(b"ACGT", &[10, 11, 12, 13]);
        let blob = data.encode_blob().unwrap().to_vec();
        let tags: Vec<_> = blob::chunks(&blob)
            .unwrap()
            .map(|c| c.unwrap().tag.to_bytes())
            .collect();
        assert_eq!(tags, vec![*b"NAME", *b"2SQR", *b"4QVR"]);
        assert_eq!(data.read().blob_len() as usize, blob.len());
    }

    #[test]
    fn test_corrected_and_trimmed_roundtrip() {
        let mut data = raw_read(b"ACGTACGTNNACGT", &[25; 14]);
        data.set_corrected(b"ACGTACGTACGT", &[5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 14])
            .unwrap();
        data.set_clear_range(2, 9).unwrap();
        let loaded = reload(&mut data);

        assert_eq!(loaded.raw_sequence(), b"ACGTACGTNNACGT");
        assert_eq!(loaded.raw_qualities(), &[25; 14]);
        assert_eq!(loaded.corrected_sequence(), b"ACGTACGTACGT");
        assert_eq!(loaded.trimmed_sequence(), &b"ACGTACGTACGT"[2..9]);
        assert_eq!(loaded.trimmed_qualities(), &[7, 8, 9, 10, 11, 12, 13]);
    }

    #[test]
    fn test_default_qualities_are_not_stored() {
        let mut data = raw_read(b"ACGTACGT", &[]);
        let blob = data.encode_blob().unwrap().to_vec();
        assert!(blob::chunks(&blob)
            .unwrap()
            .all(|c| !matches!(c.unwrap().tag, ChunkTag::Quality(..))));

        let loaded = reload(&mut data);
        assert_eq!(loaded.raw_qualities(), &[20; 8]);
    }

    #[test]
    fn test_constant_qualities_use_one_byte() {
        let mut data = raw_read(b"ACGTACGT", &[40; 8]);
        let blob = data.encode_blob().unwrap().to_vec();
        let chunk = blob::chunks(&blob).unwrap().last().unwrap().unwrap();
        assert_eq!(chunk.tag, ChunkTag::Quality(Stage::Raw, QualEncoding::Constant));
        assert_eq!(chunk.payload, &[40]);

        let loaded = reload(&mut data);
        assert_eq!(loaded.raw_qualities(), &[40; 8]);
    }

    #[test]
    fn test_empty_read_roundtrip() {
        let mut data = ReadData::new(ReadConfig::default());
        data.set_raw(b"", &[]).unwrap();
        let blob = data.encode_blob().unwrap().to_vec();
        let chunk = blob::chunks(&blob).unwrap().next().unwrap().unwrap();
        assert_eq!(chunk.tag, ChunkTag::Sequence(Stage::Raw, SeqEncoding::TwoBit));
        assert!(chunk.payload.is_empty());

        let loaded = reload(&mut data);
        assert!(loaded.raw_sequence().is_empty());
        assert!(loaded.raw_qualities().is_empty());
        assert!(loaded.name().is_empty());
    }

    #[test]
    fn test_reuse_clears_previous_read() {
        let mut first = raw_read(b"ACGTACGT", &[30; 8]);
        first.set_corrected(b"ACGT", &[30; 4]).unwrap();
        first.encode_blob().unwrap();

        let mut second = ReadData::new(ReadConfig::default());
        second.set_raw(b"TTTT", &[12; 4]).unwrap();
        second.encode_blob().unwrap();

        let mut loaded = ReadData::for_read(*first.read(), ReadConfig::default());
        loaded.load_from_blob(first.blob()).unwrap();
        assert_eq!(loaded.trimmed_sequence(), b"ACGT");

        loaded.read = *second.read();
        loaded.load_from_blob(second.blob()).unwrap();
        assert_eq!(loaded.raw_sequence(), b"TTTT");
        assert!(loaded.name().is_empty());
        assert!(loaded.corrected_sequence().is_empty());
        assert!(loaded.trimmed_sequence().is_empty());
    }

    // ==================== Corruption ====================

    fn chunk_blob(chunks: &[(&[u8; 4], &[u8])]) -> Vec<u8> {
        let mut blob = Vec::new();
        blob::begin_blob(&mut blob);
        for (tag, payload) in chunks {
            blob.extend_from_slice(*tag);
            blob.extend_from_slice(&(payload.len() as u32).to_le_bytes());
            blob.extend_from_slice(payload);
        }
        blob::finish_blob(&mut blob).unwrap();
        blob
    }

    fn descriptor(raw_len: u32, corrected_len: u32) -> ReadDescriptor {
        let mut read = ReadDescriptor::new(1, 1);
        read.raw_len = raw_len;
        read.corrected_len = corrected_len;
        read.clear_end = corrected_len;
        read
    }

    #[test]
    fn test_out_of_order_chunks() {
        let blob = chunk_blob(&[(b"USQR", b"AC"), (b"NAME", b"r")]);
        let mut data = ReadData::for_read(descriptor(2, 0), ReadConfig::default());
        assert!(matches!(
            data.load_from_blob(&blob),
            Err(Error::BlobError(BlobError::OutOfOrder { .. }))
        ));
    }

    #[test]
    fn test_duplicate_chunks() {
        let blob = chunk_blob(&[(b"USQR", b"AC"), (b"USQR", b"AC")]);
        let mut data = ReadData::for_read(descriptor(2, 0), ReadConfig::default());
        assert!(matches!(
            data.load_from_blob(&blob),
            Err(Error::BlobError(BlobError::OutOfOrder { .. }))
        ));
    }

    #[test]
    fn test_missing_raw_sequence() {
        let blob = chunk_blob(&[(b"NAME", b"r")]);
        let mut data = ReadData::for_read(descriptor(0, 0), ReadConfig::default());
        assert!(matches!(
            data.load_from_blob(&blob),
            Err(Error::BlobError(BlobError::MissingRawSequence))
        ));
    }

    #[test]
    fn test_unexpected_corrected_data() {
        let blob = chunk_blob(&[(b"USQR", b"AC"), (b"USQC", b"AC")]);
        let mut data = ReadData::for_read(descriptor(2, 0), ReadConfig::default());
        assert!(matches!(
            data.load_from_blob(&blob),
            Err(Error::BlobError(BlobError::UnexpectedCorrectedData))
        ));
    }

    #[test]
    fn test_missing_corrected_sequence() {
        let blob = chunk_blob(&[(b"USQR", b"AC")]);
        let mut data = ReadData::for_read(descriptor(2, 2), ReadConfig::default());
        assert!(matches!(
            data.load_from_blob(&blob),
            Err(Error::BlobError(BlobError::MissingCorrectedSequence(2)))
        ));
    }

    #[test]
    fn test_length_mismatch_against_descriptor() {
        let mut data = raw_read(b"ACGTACGT", &[30; 8]);
        data.encode_blob().unwrap();

        let mut read = *data.read();
        read.raw_len = 12;
        let mut loaded = ReadData::for_read(read, ReadConfig::default());
        let err = loaded.load_from_blob(data.blob()).unwrap_err();
        assert!(err.is_corruption());
    }

    #[test]
    fn test_failed_load_empties_trimmed_view() {
        let mut data = raw_read(b"ACGTACGT", &[30; 8]);
        data.set_corrected(b"ACGTACGT", &[31; 8]).unwrap();
        data.set_clear_range(2, 6).unwrap();
        let mut loaded = reload(&mut data);
        assert_eq!(loaded.trimmed_sequence(), b"GTAC");

        // corrected sequence decodes, then its qualities are too short
        let blob = chunk_blob(&[(b"USQR", b"AC"), (b"USQC", b"TTTT"), (b"UQVC", b"\x01\x02")]);
        loaded.read = descriptor(2, 4);
        let err = loaded.load_from_blob(&blob).unwrap_err();
        assert!(err.is_corruption());
        assert_eq!(loaded.corrected_sequence(), b"TTTT");
        assert!(loaded.trimmed_sequence().is_empty());
        assert!(loaded.trimmed_qualities().is_empty());
    }
}
