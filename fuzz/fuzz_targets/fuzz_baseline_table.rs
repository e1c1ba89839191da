//! Fuzz target for reparsing rendered baseline tables.

#![no_main]

use ab_core::report::parse_baseline_table;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = parse_baseline_table("fuzz", text);
    }
});
