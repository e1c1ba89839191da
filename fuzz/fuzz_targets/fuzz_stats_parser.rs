//! Fuzz target for statistics-file parsing.

#![no_main]

use ab_core::stats::StatisticsTable;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = StatisticsTable::parse("fuzz", text);
    }
});
