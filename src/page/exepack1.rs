//! The EXEPACK:1 decompression algorithm.
//!
//! A page is a sequence of records, each a little-endian `u16` repeat count, a little-endian
//! `u16` span length and `span length` bytes. The span is read once and written `repeat count`
//! times. The page ends where the input ends.

use crate::page::input::Input;
use crate::page::{run_tokens, DecodeFailure, DecompressError, Step};
use crate::sink::SliceSink;

/// Size of a record header: repeat count and span length.
const RECORD_HEADER_LEN: usize = 4;

/// A record whose span is still to be written `repeat_count` more times.
struct Pending<'a> {
    span: &'a [u8],
    repeat_count: u16,
}

/// Reads one record, or writes one repetition of the pending span.
///
/// Each repetition is a step of its own, so a record that overruns the page still reports the
/// repetitions written before the overrun.
#[inline]
fn decode_step<'a>(
    pending: &mut Option<Pending<'a>>,
    input: &mut Input<'a>,
    output: &mut SliceSink,
) -> Result<Step, DecompressError> {
    if let Some(record) = pending.as_mut() {
        output.extend_from_slice(record.span)?;
        record.repeat_count -= 1;
        if record.repeat_count == 0 {
            *pending = None;
        }
        return Ok(Step::Continue);
    }
    if input.is_empty() {
        return Ok(Step::Done);
    }
    input.peek(RECORD_HEADER_LEN)?;
    let repeat_count = input.read_u16()?;
    let span_len = input.read_u16()? as usize;

    let span = input.take(span_len)?;
    if !span.is_empty() && repeat_count != 0 {
        *pending = Some(Pending { span, repeat_count });
    }
    Ok(Step::Continue)
}

/// Decompress all bytes of `input` into `output`.
///
/// `output` is the destination budget, normally a whole page. Returns the number of bytes
/// written.
pub fn decompress_into(input: &[u8], output: &mut [u8]) -> Result<usize, DecodeFailure> {
    let mut pending = None;
    run_tokens(input, output, |input, output| decode_step(&mut pending, input, output))
}
