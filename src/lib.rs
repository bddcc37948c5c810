/*! Pure Rust, safe decoder for compressed pages of LX executables.

OS/2 LX modules may store the pages of an object compressed with EXEPACK:1 (iterated data) or
EXEPACK:2. Each page decodes to at most 4096 bytes. The decoders check every read and write
against the input slice and the page, and report how far they got when the data is corrupt.

# Examples
```
use lx_exepack::{decompress, Algorithm};
// two literal bytes, a fill of three 0x90 bytes, end of page
let packed: &[u8] = &[0x08, 0x55, 0x8b, 0x00, 0x03, 0x90, 0x00, 0x00];
let page = decompress(Algorithm::Exepack2, packed).unwrap();
assert_eq!(page, [0x55, 0x8b, 0x90, 0x90, 0x90]);
```

Decoding into a caller provided page:
```
use lx_exepack::{decompress_into, Algorithm, DecompressError, PAGE_SIZE};
let mut page = [0u8; PAGE_SIZE];
// one literal byte, then a back-reference two bytes back
let err = decompress_into(Algorithm::Exepack2, &[0x04, 0x11, 0x22, 0x00], &mut page).unwrap_err();
assert_eq!(err.error, DecompressError::InvalidBackReference);
assert_eq!(err.bytes_written, 1);
```

# Feature Flags
- `std` (default) implements `std::error::Error` for the error types. Without it the crate is
  `no_std` and only needs `alloc`.
*/
#![cfg_attr(not(any(feature = "std", test)), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

pub mod page;
mod sink;

pub use page::{
    decompress, decompress_into, decompress_page, Algorithm, DecodeFailure, DecompressError,
    PAGE_SIZE,
};
