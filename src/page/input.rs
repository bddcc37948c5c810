//! Read side of the page decoders.

use crate::page::DecompressError;

/// A cursor over the compressed bytes of one page.
///
/// The slice length is the source budget. Reads never move the cursor past it: a read that does
/// not fit fails and leaves the cursor where it was.
pub(crate) struct Input<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Input<'a> {
    #[inline]
    pub fn new(input: &'a [u8]) -> Self {
        Input { input, pos: 0 }
    }

    /// Number of bytes consumed so far.
    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// The remaining source budget.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.input.len() - self.pos
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Returns the next `len` bytes without consuming them.
    ///
    /// Token headers are read this way, so a short header is reported as
    /// [`DecompressError::SourceExhausted`].
    #[inline]
    pub fn peek(&self, len: usize) -> Result<&'a [u8], DecompressError> {
        self.input
            .get(self.pos..)
            .and_then(|rest| rest.get(..len))
            .ok_or(DecompressError::SourceExhausted)
    }

    /// Consumes a token header of `N` bytes.
    #[inline]
    pub fn read_header<const N: usize>(&mut self) -> Result<[u8; N], DecompressError> {
        let mut header = [0u8; N];
        header.copy_from_slice(self.peek(N)?);
        self.pos += N;
        Ok(header)
    }

    /// Read a little-endian 16-bit integer from the input stream.
    #[inline]
    pub fn read_u16(&mut self) -> Result<u16, DecompressError> {
        self.read_header::<2>().map(u16::from_le_bytes)
    }

    /// Consumes `len` payload bytes declared by a token.
    #[inline]
    pub fn take(&mut self, len: usize) -> Result<&'a [u8], DecompressError> {
        let data = self
            .peek(len)
            .map_err(|_| DecompressError::SourceOverrun)?;
        self.pos += len;
        Ok(data)
    }
}
