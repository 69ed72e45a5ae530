#![no_main]

use kaitai_stream::fuzz::terminated::*;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: FuzzCase| {
    harness(data);
});
