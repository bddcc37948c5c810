//! The EXEPACK:2 decompression algorithm.
//!
//! Every token starts with a control byte whose low two bits select its shape. The header bytes
//! of a token are read as one little-endian word and split into bit fields:
//!
//! ```notest
//! shape 0, 1 byte    [n:6][00]                        n literal bytes follow
//! shape 0, 3 bytes   [000000][00] [m:8] [byte:8]      m copies of byte
//! shape 0, 2 bytes   [000000][00] [00000000]          end of page
//! shape 1, 2 bytes   [offset:9][len-3:3][nr:2][01]    nr literal bytes follow
//! shape 2, 2 bytes   [offset:12][len-3:2][10]
//! shape 3, 3 bytes   [offset:12][len:6][nr:4][11]     nr literal bytes follow
//! ```
//!
//! The literal bytes of shapes 1 and 3 are written before the back-reference is copied, so the
//! back-reference may reach into them. Offsets count backwards from the write position; offset 1
//! is the last byte written.

use crate::page::input::Input;
use crate::page::{run_tokens, DecodeFailure, DecompressError, Step};
use crate::sink::SliceSink;

/// A bit field of a token word, `width` bits starting at bit `shift`, with `bias` added to the
/// stored value.
#[derive(Debug, Clone, Copy)]
struct Field {
    shift: u32,
    width: u32,
    bias: usize,
}

impl Field {
    const fn new(shift: u32, width: u32) -> Field {
        Field {
            shift,
            width,
            bias: 0,
        }
    }

    const fn biased(self, bias: usize) -> Field {
        Field { bias, ..self }
    }

    #[inline]
    fn get(self, word: u32) -> usize {
        ((word >> self.shift) & ((1 << self.width) - 1)) as usize + self.bias
    }
}

const SHAPE: Field = Field::new(0, 2);

const LITERAL_LEN: Field = Field::new(2, 6);

const SHORT_LITERALS: Field = Field::new(2, 2);
const SHORT_MATCH_LEN: Field = Field::new(4, 3).biased(3);
const SHORT_OFFSET: Field = Field::new(7, 9);

const MID_MATCH_LEN: Field = Field::new(2, 2).biased(3);
const MID_OFFSET: Field = Field::new(4, 12);

const LONG_LITERALS: Field = Field::new(2, 4);
const LONG_MATCH_LEN: Field = Field::new(6, 6);
const LONG_OFFSET: Field = Field::new(12, 12);

/// A decoded token header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    /// `len` bytes are copied from the input.
    Literal { len: usize },
    /// `len` copies of `byte`.
    Fill { byte: u8, len: usize },
    /// End of the page.
    End,
    /// `literals` bytes are copied from the input, then `len` bytes from `offset` bytes back in
    /// the output.
    Match {
        literals: usize,
        len: usize,
        offset: usize,
    },
}

/// Reads the header of the next token. Literal bytes following the header are not consumed.
#[inline]
fn read_token(input: &mut Input) -> Result<Token, DecompressError> {
    let control = input.peek(1)?[0];
    let token = match SHAPE.get(control as u32) {
        0 => {
            let len = LITERAL_LEN.get(control as u32);
            if len != 0 {
                input.read_header::<1>()?;
                Token::Literal { len }
            } else if input.peek(2)?[1] == 0 {
                input.read_header::<2>()?;
                Token::End
            } else {
                let [_, len, byte] = input.read_header::<3>()?;
                Token::Fill {
                    byte,
                    len: len as usize,
                }
            }
        }
        1 => {
            let word = u16::from_le_bytes(input.read_header::<2>()?) as u32;
            Token::Match {
                literals: SHORT_LITERALS.get(word),
                len: SHORT_MATCH_LEN.get(word),
                offset: SHORT_OFFSET.get(word),
            }
        }
        2 => {
            let word = u16::from_le_bytes(input.read_header::<2>()?) as u32;
            Token::Match {
                literals: 0,
                len: MID_MATCH_LEN.get(word),
                offset: MID_OFFSET.get(word),
            }
        }
        _ => {
            let [b0, b1, b2] = input.read_header::<3>()?;
            let word = u32::from_le_bytes([b0, b1, b2, 0]);
            Token::Match {
                literals: LONG_LITERALS.get(word),
                len: LONG_MATCH_LEN.get(word),
                offset: LONG_OFFSET.get(word),
            }
        }
    };
    Ok(token)
}

/// Decodes one token.
#[inline]
fn decode_token(input: &mut Input, output: &mut SliceSink) -> Result<Step, DecompressError> {
    if input.is_empty() {
        return Err(DecompressError::SourceExhausted);
    }
    match read_token(input)? {
        Token::End => return Ok(Step::Done),
        Token::Literal { len } => output.extend_from_slice(input.take(len)?)?,
        Token::Fill { byte, len } => output.extend_with_fill(byte, len)?,
        Token::Match {
            literals,
            len,
            offset,
        } => {
            output.extend_from_slice(input.take(literals)?)?;
            output.extend_from_within_overlapping(offset, len)?;
        }
    }
    Ok(Step::Continue)
}

/// Decompress all bytes of `input` into `output`.
///
/// `output` is the destination budget, normally a whole page. Decoding stops at the end of page
/// token; input after it is ignored. Returns the number of bytes written.
pub fn decompress_into(input: &[u8], output: &mut [u8]) -> Result<usize, DecodeFailure> {
    run_tokens(input, output, decode_token)
}
