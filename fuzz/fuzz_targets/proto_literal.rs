#![no_main]

use gunk::reflect::ProtoLiteral;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Descriptor-language literals come from external option values
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(literal) = ProtoLiteral::parse(s) {
            let _ = literal.to_string();
        }
    }
});
