//! Fuzz target for events-file parsing.
//!
//! Tests that the count-prefixed events encoding handles arbitrary input
//! without panicking; malformed input may only return an error.

#![no_main]

use ab_core::catalog::EventCatalog;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = EventCatalog::parse("fuzz", text);
    }
});
