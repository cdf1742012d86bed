//! Fixed-width bit packing shared by the 3-, 4- and 5-bit packers.
//!
//! Values are packed most-significant-bit first into a byte buffer, with the
//! final byte zero padded. A run of `n` values of width `w` always occupies
//! exactly [`packed_len`]`(n, w)` bytes, which is what the decoders use to
//! detect corrupt chunks.

use bitvec::prelude::*;

/// Number of bytes needed to hold `n` values of `width` bits.
#[inline]
#[must_use]
pub fn packed_len(n: usize, width: u8) -> usize {
    (n * width as usize).div_ceil(8)
}

/// Appends `codes`, each truncated to `width` bits, to `out`.
///
/// Returns the number of bytes appended. Callers validate that every code
/// fits before packing.
pub fn pack<I>(codes: I, width: u8, out: &mut Vec<u8>) -> usize
where
    I: ExactSizeIterator<Item = u8>,
{
    let mut bits = BitVec::<u8, Msb0>::with_capacity(codes.len() * width as usize);
    for code in codes {
        bits.extend_from_bitslice(&code.view_bits::<Msb0>()[8 - width as usize..]);
    }
    let bytes = bits.as_raw_slice();
    out.extend_from_slice(bytes);
    bytes.len()
}

/// Iterates over `n` values of `width` bits packed in `bytes`.
///
/// The caller checks `bytes.len() == packed_len(n, width)` first.
pub fn unpack(bytes: &[u8], width: u8, n: usize) -> impl Iterator<Item = u8> + '_ {
    BitSlice::<u8, Msb0>::from_slice(bytes)
        .chunks(width as usize)
        .take(n)
        .map(|chunk| {
            chunk
                .iter()
                .by_vals()
                .fold(0u8, |acc, bit| (acc << 1) | u8::from(bit))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packed_len() {
        assert_eq!(packed_len(0, 3), 0);
        assert_eq!(packed_len(1, 3), 1);
        assert_eq!(packed_len(8, 3), 3);
        assert_eq!(packed_len(9, 3), 4);
        assert_eq!(packed_len(2, 4), 1);
        assert_eq!(packed_len(3, 5), 2);
    }

    #[test]
    fn test_pack_msb_first() {
        let mut out = Vec::new();
        let n = pack([0b101u8, 0b011].into_iter(), 3, &mut out);
        assert_eq!(n, 1);
        assert_eq!(out, vec![0b1010_1100]);
    }

    #[test]
    fn test_pack_appends() {
        let mut out = vec![0xAA];
        pack([0xFu8, 0x1].into_iter(), 4, &mut out);
        assert_eq!(out, vec![0xAA, 0xF1]);
    }

    #[test]
    fn test_unpack_ignores_padding() {
        let mut out = Vec::new();
        let codes = [31u8, 0, 17, 5, 9];
        pack(codes.iter().copied(), 5, &mut out);
        assert_eq!(out.len(), packed_len(codes.len(), 5));

        let decoded: Vec<u8> = unpack(&out, 5, codes.len()).collect();
        assert_eq!(decoded, codes);
    }
}
