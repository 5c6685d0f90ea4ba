#![no_main]

use gunk_syntax::parser;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Convert bytes to UTF-8 string (ignore invalid UTF-8)
    if let Ok(s) = std::str::from_utf8(data) {
        // Lexing runs inside parse_file; spans start at a non-zero base like real files
        let _ = parser::parse_file(s, 1);
    }
});
