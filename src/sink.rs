use crate::page::DecompressError;

/// SliceSink is the target that pages are decoded into: a preallocated `&mut [u8]` with a write
/// position.
///
/// Every byte written to the page goes through one of the `extend_*` methods, which check the
/// remaining capacity (the destination budget) before touching the slice. On error nothing is
/// written and the position does not move.
///
/// # Invariants
///   - `pos() <= capacity()`.
///   - Bytes `[..pos()]` were written by the current decode call.
pub(crate) struct SliceSink<'a> {
    /// The working slice. Bytes past `pos` may contain anything the caller left there.
    output: &'a mut [u8],
    /// Number of bytes produced so far
    pos: usize,
}

impl<'a> SliceSink<'a> {
    /// Creates a `SliceSink` backed by the given byte slice, starting at position 0.
    #[inline]
    pub fn new(output: &'a mut [u8]) -> Self {
        SliceSink { output, pos: 0 }
    }

    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.output.len()
    }

    /// The remaining destination budget.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.capacity() - self.pos
    }

    #[cfg(test)]
    pub fn as_slice(&self) -> &[u8] {
        &self.output[..self.pos]
    }

    /// Reserves `len` bytes of destination budget, returning the start of the reserved range.
    #[inline]
    fn reserve(&self, len: usize) -> Result<usize, DecompressError> {
        if len > self.remaining() {
            return Err(DecompressError::DestinationOverrun);
        }
        Ok(self.pos)
    }

    /// Extends the sink with `data`.
    #[inline]
    pub fn extend_from_slice(&mut self, data: &[u8]) -> Result<(), DecompressError> {
        let start = self.reserve(data.len())?;
        self.output[start..start + data.len()].copy_from_slice(data);
        self.pos += data.len();
        Ok(())
    }

    /// Extends the sink with `len` copies of `byte`.
    #[inline]
    pub fn extend_with_fill(&mut self, byte: u8, len: usize) -> Result<(), DecompressError> {
        let start = self.reserve(len)?;
        self.output[start..start + len].fill(byte);
        self.pos += len;
        Ok(())
    }

    /// Copies `len` bytes starting `offset` bytes behind the current position to the end of the
    /// sink.
    ///
    /// The ranges may overlap (`len > offset`), in which case bytes written by this call are
    /// read again, repeating the last `offset` bytes.
    #[inline]
    pub fn extend_from_within_overlapping(
        &mut self,
        offset: usize,
        len: usize,
    ) -> Result<(), DecompressError> {
        // offset 0 would read the bytes about to be written
        if offset == 0 && len != 0 {
            return Err(DecompressError::InvalidBackReference);
        }
        let start = self
            .pos
            .checked_sub(offset)
            .ok_or(DecompressError::InvalidBackReference)?;
        let pos = self.reserve(len)?;
        if offset >= len {
            self.output.copy_within(start..start + len, pos);
        } else {
            for i in pos..pos + len {
                self.output[i] = self.output[i - offset];
            }
        }
        self.pos += len;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::SliceSink;
    use crate::page::DecompressError;

    #[test]
    fn test_sink_slice() {
        let mut data = [0u8; 5];
        let sink = SliceSink::new(&mut data);
        assert_eq!(sink.pos(), 0);
        assert_eq!(sink.capacity(), 5);
        assert_eq!(sink.remaining(), 5);
    }

    #[test]
    fn extend_up_to_capacity() {
        let mut data = [0u8; 4];
        let mut sink = SliceSink::new(&mut data);
        sink.extend_from_slice(&[1, 2]).unwrap();
        sink.extend_with_fill(9, 2).unwrap();
        assert_eq!(sink.as_slice(), &[1, 2, 9, 9]);
        assert_eq!(sink.remaining(), 0);
        assert_eq!(
            sink.extend_from_slice(&[1]),
            Err(DecompressError::DestinationOverrun)
        );
        assert_eq!(
            sink.extend_with_fill(0, 1),
            Err(DecompressError::DestinationOverrun)
        );
        // empty writes are always in budget
        sink.extend_from_slice(&[]).unwrap();
        sink.extend_with_fill(0, 0).unwrap();
        assert_eq!(sink.pos(), 4);
    }

    #[test]
    fn overrun_writes_nothing() {
        let mut data = [0u8; 4];
        let mut sink = SliceSink::new(&mut data);
        sink.extend_from_slice(&[7]).unwrap();
        assert_eq!(
            sink.extend_from_slice(&[1, 2, 3, 4]),
            Err(DecompressError::DestinationOverrun)
        );
        assert_eq!(sink.pos(), 1);
        drop(sink);
        assert_eq!(data, [7, 0, 0, 0]);
    }

    #[test]
    fn back_reference_non_overlapping() {
        let mut data = [0u8; 8];
        let mut sink = SliceSink::new(&mut data);
        sink.extend_from_slice(b"abcd").unwrap();
        sink.extend_from_within_overlapping(4, 3).unwrap();
        assert_eq!(sink.as_slice(), b"abcdabc");
    }

    #[test]
    fn back_reference_overlapping_repeats_pattern() {
        let mut data = [0u8; 16];
        let mut sink = SliceSink::new(&mut data);
        sink.extend_from_slice(b"xy").unwrap();
        sink.extend_from_within_overlapping(2, 7).unwrap();
        assert_eq!(sink.as_slice(), b"xyxyxyxyx");
        sink.extend_from_within_overlapping(1, 3).unwrap();
        assert_eq!(sink.as_slice(), b"xyxyxyxyxxxx");
    }

    #[test]
    fn back_reference_bounds() {
        let mut data = [0u8; 8];
        let mut sink = SliceSink::new(&mut data);
        sink.extend_from_slice(b"abc").unwrap();
        assert_eq!(
            sink.extend_from_within_overlapping(4, 1),
            Err(DecompressError::InvalidBackReference)
        );
        assert_eq!(
            sink.extend_from_within_overlapping(0, 1),
            Err(DecompressError::InvalidBackReference)
        );
        sink.extend_from_within_overlapping(0, 0).unwrap();
        // reaching back exactly to the start of the page is fine
        sink.extend_from_within_overlapping(3, 3).unwrap();
        assert_eq!(sink.as_slice(), b"abcabc");
        assert_eq!(
            sink.extend_from_within_overlapping(1, 3),
            Err(DecompressError::DestinationOverrun)
        );
        assert_eq!(sink.pos(), 6);
    }
}
