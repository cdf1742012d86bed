/// A sub-range of an owned buffer, held as offset and length.
///
/// Views built from a `Span` borrow from the buffer they index; a `Span`
/// never owns memory of its own.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Span {
    offset: usize,
    length: usize,
}
impl Span {
    #[must_use]
    pub fn new(offset: usize, length: usize) -> Self {
        Span { offset, length }
    }

    #[must_use]
    pub fn new_u32(offset: u32, length: u32) -> Self {
        Span::new(offset as usize, length as usize)
    }

    #[must_use]
    pub fn range(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.length
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.length
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Borrows the sub-range out of `bytes`, or an empty slice if it does not fit.
    #[must_use]
    pub fn slice<'a>(&self, bytes: &'a [u8]) -> &'a [u8] {
        bytes.get(self.range()).unwrap_or_default()
    }
}

/// Borrows `len` bytes at `offset` and moves the offset past them.
///
/// Returns `None`, leaving the offset untouched, if the bytes run past the end.
pub(crate) fn slice_and_increment<'a>(
    offset: &mut usize,
    len: usize,
    bytes: &'a [u8],
) -> Option<&'a [u8]> {
    let slice = bytes.get(*offset..offset.checked_add(len)?)?;
    *offset += len;
    Some(slice)
}
