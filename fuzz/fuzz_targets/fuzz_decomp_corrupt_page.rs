#![no_main]
use libfuzzer_sys::fuzz_target;

use lx_exepack::{decompress_into, Algorithm, PAGE_SIZE};
fuzz_target!(|data: &[u8]| {
    // should not panic
    for algorithm in [Algorithm::Exepack1, Algorithm::Exepack2] {
        let mut page = [0u8; PAGE_SIZE];
        match decompress_into(algorithm, data, &mut page) {
            Ok(len) => assert!(len <= PAGE_SIZE),
            Err(err) => {
                assert!(err.bytes_written <= PAGE_SIZE);
                assert!(err.bytes_read <= data.len());
            }
        }
    }
});
