/*!

Decoders for compressed pages of LX executables.

LX modules store each 4096 byte page of an object either raw or packed with one of two
encodings, named after the linker option that produced them:

EXEPACK:1 (iterated data)
Record: [repeat count u16][span length u16][span bytes]
The span is written `repeat count` times.

EXEPACK:2
Token: control byte, the low 2 bits select the shape
  0  literal run, fill run or end of page
  1  short back-reference (9 bit offset, 0-3 literals before)
  2  mid back-reference (12 bit offset)
  3  long back-reference (12 bit offset, 0-15 literals before)

Both decoders write through a bounds checked sink and never read or write outside the given
slices. A page that fails to decode reports how far decoding got.

*/

pub mod exepack1;
pub mod exepack2;
pub(crate) mod input;

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use crate::sink::SliceSink;
use input::Input;

/// Size of a page of an LX module. Decoded pages are never larger.
pub const PAGE_SIZE: usize = 4096;

/// The encoding of a compressed page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// EXEPACK:1, runs of repeated byte spans.
    Exepack1,
    /// EXEPACK:2, literals, fills and back-references.
    Exepack2,
}

impl Algorithm {
    /// Maps the EXEPACK version number (1 or 2) to the algorithm.
    pub fn from_id(id: u8) -> Option<Algorithm> {
        match id {
            1 => Some(Algorithm::Exepack1),
            2 => Some(Algorithm::Exepack2),
            _ => None,
        }
    }

    /// The EXEPACK version number.
    pub fn id(self) -> u8 {
        match self {
            Algorithm::Exepack1 => 1,
            Algorithm::Exepack2 => 2,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "EXEPACK:{}", self.id())
    }
}

/// An error representing invalid compressed data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecompressError {
    /// The input ended in the middle of a token header, or without an end marker.
    SourceExhausted,
    /// A token declares more literal bytes than are left in the input.
    SourceOverrun,
    /// A token would write past the end of the page.
    DestinationOverrun,
    /// Back-reference offset out of bounds (not in the decoded part of the page).
    InvalidBackReference,
}

impl fmt::Display for DecompressError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DecompressError::SourceExhausted => {
                f.write_str("compressed stream ended before the end of the page")
            }
            DecompressError::SourceOverrun => {
                f.write_str("literal is out of bounds of the input")
            }
            DecompressError::DestinationOverrun => {
                f.write_str("decoded data does not fit into the page")
            }
            DecompressError::InvalidBackReference => {
                f.write_str("the offset to copy is not contained in the decompressed page")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DecompressError {}

/// A failed page decode.
///
/// Besides the cause, it records how far decoding got: the tokens before the faulty one were
/// decoded completely, and `bytes_written` bytes at the start of the output are valid. Each
/// repetition of an EXEPACK:1 record counts as a token of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeFailure {
    pub error: DecompressError,
    /// Bytes of output produced before the faulty token.
    pub bytes_written: usize,
    /// Bytes of input consumed before the faulty token.
    pub bytes_read: usize,
}

impl fmt::Display for DecodeFailure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} (after decoding {} bytes from {} input bytes)",
            self.error, self.bytes_written, self.bytes_read
        )
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DecodeFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Outcome of one decoding step.
pub(crate) enum Step {
    Continue,
    Done,
}

/// Runs `step` until it reports the end of the page or fails.
///
/// On failure, progress is reported as it was before the failing step.
///
/// Returns the number of bytes written to `output`.
#[inline]
pub(crate) fn run_tokens<'a, F>(
    input: &'a [u8],
    output: &mut [u8],
    mut step: F,
) -> Result<usize, DecodeFailure>
where
    F: FnMut(&mut Input<'a>, &mut SliceSink<'_>) -> Result<Step, DecompressError>,
{
    let mut input = Input::new(input);
    let mut sink = SliceSink::new(output);
    loop {
        let bytes_written = sink.pos();
        let bytes_read = input.pos();
        match step(&mut input, &mut sink) {
            Ok(Step::Continue) => {}
            Ok(Step::Done) => return Ok(sink.pos()),
            Err(error) => {
                return Err(DecodeFailure {
                    error,
                    bytes_written,
                    bytes_read,
                })
            }
        }
    }
}

/// Decompress all bytes of `input` into `page` with the given algorithm.
///
/// Returns the number of decoded bytes at the start of `page`. The rest of `page` is left
/// untouched.
pub fn decompress_into(
    algorithm: Algorithm,
    input: &[u8],
    page: &mut [u8; PAGE_SIZE],
) -> Result<usize, DecodeFailure> {
    let res = match algorithm {
        Algorithm::Exepack1 => exepack1::decompress_into(input, page),
        Algorithm::Exepack2 => exepack2::decompress_into(input, page),
    };
    match &res {
        Ok(len) => {
            log::trace!("{} unpacked {} bytes from {} bytes", algorithm, len, input.len());
        }
        Err(failure) => {
            log::debug!("{} unpacking {} bytes failed: {}", algorithm, input.len(), failure);
        }
    }
    res
}

/// Decompress all bytes of `input` into a new vec, holding exactly the decoded bytes.
pub fn decompress(algorithm: Algorithm, input: &[u8]) -> Result<Vec<u8>, DecodeFailure> {
    let mut page = [0u8; PAGE_SIZE];
    let len = decompress_into(algorithm, input, &mut page)?;
    Ok(page[..len].to_vec())
}

/// Decompress all bytes of `input` into a new page. The bytes after the decoded data are zero.
pub fn decompress_page(
    algorithm: Algorithm,
    input: &[u8],
) -> Result<Box<[u8; PAGE_SIZE]>, DecodeFailure> {
    let mut page = Box::new([0u8; PAGE_SIZE]);
    decompress_into(algorithm, input, &mut page)?;
    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn algorithm_ids() {
        assert_eq!(Algorithm::from_id(1), Some(Algorithm::Exepack1));
        assert_eq!(Algorithm::from_id(2), Some(Algorithm::Exepack2));
        assert_eq!(Algorithm::from_id(0), None);
        assert_eq!(Algorithm::from_id(3), None);
        assert_eq!(Algorithm::Exepack2.id(), 2);
        assert_eq!(Algorithm::Exepack1.to_string(), "EXEPACK:1");
    }

    #[test]
    fn failure_display() {
        let failure = DecodeFailure {
            error: DecompressError::InvalidBackReference,
            bytes_written: 12,
            bytes_read: 7,
        };
        assert_eq!(
            failure.to_string(),
            "the offset to copy is not contained in the decompressed page \
             (after decoding 12 bytes from 7 input bytes)"
        );
    }

    #[cfg(feature = "std")]
    #[test]
    fn failure_source_is_the_error() {
        use std::error::Error;
        let failure = DecodeFailure {
            error: DecompressError::SourceOverrun,
            bytes_written: 0,
            bytes_read: 0,
        };
        let source = failure.source().unwrap();
        assert_eq!(source.to_string(), DecompressError::SourceOverrun.to_string());
    }

    #[test]
    fn decompress_page_zero_fills_tail() {
        let page = decompress_page(Algorithm::Exepack2, &[0x00, 0x02, 0xEE, 0x00, 0x00]).unwrap();
        assert_eq!(&page[..2], &[0xEE, 0xEE]);
        assert!(page[2..].iter().all(|&b| b == 0));
    }

    #[test]
    fn decompress_into_leaves_tail_untouched() {
        let mut page = [0x55u8; PAGE_SIZE];
        let len = decompress_into(Algorithm::Exepack1, &[1, 0, 1, 0, 0xAB], &mut page).unwrap();
        assert_eq!(len, 1);
        assert_eq!(page[0], 0xAB);
        assert!(page[1..].iter().all(|&b| b == 0x55));
    }

    #[test]
    fn decompress_returns_exact_length() {
        let out = decompress(Algorithm::Exepack1, &[3, 0, 2, 0, b'o', b'k']).unwrap();
        assert_eq!(out, b"okokok");
    }
}
