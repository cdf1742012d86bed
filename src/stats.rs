//! K-mer count statistics
//!
//! [`KmerCountStatistics`] accumulates how many distinct k-mers were seen
//! each number of times. Small occurrence counts are tallied in a histogram
//! whose capacity is fixed at construction; counts at or beyond the capacity
//! go to a pair of parallel overflow arrays.
//!
//! ## Stream layout
//!
//! All integers are little-endian:
//!
//! ```text
//! num_unique: u64
//! num_distinct: u64
//! num_total: u64
//! hist_last: u32        one past the highest non-zero histogram bucket
//! hbig_len: u32         number of overflow entries
//! hist: [u64; hist_last]
//! hbig_count: [u64; hbig_len]
//! hbig_number: [u64; hbig_len]
//! ```
//!
//! The two 32-bit lengths come before the arrays so the arrays stay aligned
//! to 8 bytes. Only the used prefix of the histogram is written.

use std::fs::File;
use std::io::{BufWriter, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{Result, StatsError};

/// Default number of histogram buckets (256 MiB of counts)
pub const DEFAULT_HISTOGRAM_CAPACITY: u32 = 32 * 1024 * 1024;

/// Size in bytes of the fixed part of the stream layout
pub const SIZE_STATS_HEADER: usize = 3 * 8 + 2 * 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KmerCountStatistics {
    num_unique: u64,
    num_distinct: u64,
    num_total: u64,

    /// Number of distinct k-mers seen `i` times, for `i < capacity`
    hist: Vec<u64>,

    // parallel arrays for occurrence counts past the histogram
    hbig_count: Vec<u64>,
    hbig_number: Vec<u64>,
}

impl Default for KmerCountStatistics {
    fn default() -> Self {
        Self::new()
    }
}

impl KmerCountStatistics {
    /// Creates empty statistics with the default histogram capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTOGRAM_CAPACITY)
    }

    /// Creates empty statistics with `capacity` histogram buckets.
    ///
    /// The histogram is allocated once here and never resized afterwards.
    #[must_use]
    pub fn with_capacity(capacity: u32) -> Self {
        Self {
            num_unique: 0,
            num_distinct: 0,
            num_total: 0,
            hist: vec![0; capacity as usize],
            hbig_count: Vec::new(),
            hbig_number: Vec::new(),
        }
    }

    /// Zeroes every counter without releasing the histogram.
    pub fn clear(&mut self) {
        self.num_unique = 0;
        self.num_distinct = 0;
        self.num_total = 0;
        self.hist.fill(0);
        self.hbig_count.clear();
        self.hbig_number.clear();
    }

    /// Tallies one distinct k-mer that occurred `count` times.
    pub fn add_value(&mut self, count: u64) {
        if count == 1 {
            self.num_unique += 1;
        }
        self.num_distinct += 1;
        self.num_total += count;

        if let Some(bucket) = self.bucket_mut(count) {
            *bucket += 1;
            return;
        }
        // entries may repeat a count; `histogram` sums them
        self.hbig_count.push(count);
        self.hbig_number.push(1);
    }

    fn bucket_mut(&mut self, count: u64) -> Option<&mut u64> {
        usize::try_from(count)
            .ok()
            .and_then(|idx| self.hist.get_mut(idx))
    }
}

/// Accessors
impl KmerCountStatistics {
    /// Number of k-mers seen exactly once.
    #[must_use]
    pub fn num_unique(&self) -> u64 {
        self.num_unique
    }

    /// Number of different k-mers seen.
    #[must_use]
    pub fn num_distinct(&self) -> u64 {
        self.num_distinct
    }

    /// Number of k-mer occurrences seen.
    #[must_use]
    pub fn num_total(&self) -> u64 {
        self.num_total
    }

    #[must_use]
    pub fn histogram_capacity(&self) -> usize {
        self.hist.len()
    }

    /// Number of distinct k-mers that occurred `count` times.
    ///
    /// Counts past the histogram capacity are looked up in the overflow arrays.
    #[must_use]
    pub fn histogram(&self, count: u64) -> u64 {
        if let Some(&number) = usize::try_from(count)
            .ok()
            .and_then(|idx| self.hist.get(idx))
        {
            return number;
        }
        self.hbig_count
            .iter()
            .zip(&self.hbig_number)
            .filter(|&(&c, _)| c == count)
            .map(|(_, &n)| n)
            .sum()
    }

    /// One past the highest non-zero histogram bucket, or 0 if all are zero.
    #[must_use]
    pub fn histogram_last(&self) -> usize {
        self.hist.iter().rposition(|&n| n > 0).map_or(0, |idx| idx + 1)
    }

    #[must_use]
    pub fn overflow_len(&self) -> usize {
        self.hbig_count.len()
    }

    /// Occurrence count of the `i`-th overflow entry.
    #[must_use]
    pub fn overflow_count(&self, i: usize) -> Option<u64> {
        self.hbig_count.get(i).copied()
    }

    /// Number of distinct k-mers of the `i`-th overflow entry.
    #[must_use]
    pub fn overflow_number(&self, i: usize) -> Option<u64> {
        self.hbig_number.get(i).copied()
    }
}

/// Serialization
impl KmerCountStatistics {
    /// Writes the statistics to `writer`.
    pub fn dump<W: Write>(&self, writer: &mut W) -> Result<()> {
        let hist_last = self.histogram_last();
        let hbig_len = u32::try_from(self.hbig_count.len())
            .map_err(|_| StatsError::OverflowTooLong(self.hbig_count.len()))?;

        writer.write_u64::<LittleEndian>(self.num_unique)?;
        writer.write_u64::<LittleEndian>(self.num_distinct)?;
        writer.write_u64::<LittleEndian>(self.num_total)?;

        // capacity is a u32 so the prefix length always fits
        writer.write_u32::<LittleEndian>(hist_last as u32)?;
        writer.write_u32::<LittleEndian>(hbig_len)?;

        for array in [&self.hist[..hist_last], &self.hbig_count[..], &self.hbig_number[..]] {
            for &value in array {
                writer.write_u64::<LittleEndian>(value)?;
            }
        }
        Ok(())
    }

    /// Reads statistics written by [`dump`](Self::dump) from `reader`.
    ///
    /// The stored histogram prefix overwrites the start of the histogram; the
    /// buckets past it are left as they were. Call [`clear`](Self::clear)
    /// first for a clean load. On error the statistics are left unchanged.
    pub fn load<R: Read>(&mut self, reader: &mut R) -> Result<()> {
        let num_unique = reader.read_u64::<LittleEndian>()?;
        let num_distinct = reader.read_u64::<LittleEndian>()?;
        let num_total = reader.read_u64::<LittleEndian>()?;
        let hist_last = reader.read_u32::<LittleEndian>()? as usize;
        let hbig_len = reader.read_u32::<LittleEndian>()? as usize;

        if hist_last > self.hist.len() {
            return Err(StatsError::HistogramOverflow {
                stored: hist_last,
                capacity: self.hist.len(),
            }
            .into());
        }

        // nothing is stored until every array has been read
        let hist = read_u64_array(reader, hist_last)?;
        let hbig_count = read_u64_array(reader, hbig_len)?;
        let hbig_number = read_u64_array(reader, hbig_len)?;

        self.hist[..hist_last].copy_from_slice(&hist);
        self.hbig_count = hbig_count;
        self.hbig_number = hbig_number;
        self.num_unique = num_unique;
        self.num_distinct = num_distinct;
        self.num_total = num_total;
        Ok(())
    }

    /// Writes the statistics at the current position of `file`.
    ///
    /// The file position ends immediately after the written region.
    pub fn dump_to_file(&self, file: &mut File) -> Result<()> {
        let mut writer = BufWriter::new(file);
        self.dump(&mut writer)?;
        writer.flush()?;
        log::debug!(
            "Dumped k-mer statistics: {} distinct, {} histogram buckets, {} overflow entries",
            self.num_distinct,
            self.histogram_last(),
            self.overflow_len()
        );
        Ok(())
    }

    /// Reads statistics from the current position of `file`.
    ///
    /// Exactly the stored region is consumed, so the file position ends
    /// immediately after it.
    pub fn load_from_file(&mut self, file: &mut File) -> Result<()> {
        self.load(file)?;
        log::debug!(
            "Loaded k-mer statistics: {} distinct, {} overflow entries",
            self.num_distinct,
            self.overflow_len()
        );
        Ok(())
    }
}

impl KmerCountStatistics {
    /// Number of bytes [`dump`](Self::dump) writes for the current contents.
    #[must_use]
    pub fn dumped_size(&self) -> usize {
        SIZE_STATS_HEADER + 8 * (self.histogram_last() + 2 * self.overflow_len())
    }
}

/// Number of values read per step while loading an array
const READ_STEP: usize = 64 * 1024;

/// Reads `len` little-endian `u64` values.
///
/// The buffer grows one step at a time as data arrives, so a corrupt length
/// fails with an I/O error instead of allocating the whole claimed size.
fn read_u64_array<R: Read>(reader: &mut R, len: usize) -> Result<Vec<u64>> {
    let mut values = Vec::new();
    while values.len() < len {
        let start = values.len();
        values.resize(start + READ_STEP.min(len - start), 0);
        reader.read_u64_into::<LittleEndian>(&mut values[start..])?;
    }
    Ok(values)
}
