#![no_main]

use gunk_syntax::parser;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Tag payloads are parsed as standalone expressions
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = parser::parse_expr(s);
    }
});
