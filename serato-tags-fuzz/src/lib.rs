//! Fuzzing entry points for serato-tags-core
//!
//! To use with cargo-fuzz:
//! 1. Install cargo-fuzz: cargo install cargo-fuzz
//! 2. Run fuzzer: cargo fuzz run fuzz_database

use serato_tags_core::{database, markers};

pub fn fuzz_database(data: &[u8]) {
    // Decoding must never panic; anything that decodes must re-encode
    if let Ok(fields) = database::decode(data) {
        let encoded = database::encode(&fields).expect("decoded fields re-encode");
        assert_eq!(database::decode(&encoded).as_ref(), Ok(&fields));
    }
}

pub fn fuzz_markers(data: &[u8]) {
    if let Ok(payload) = markers::decode(data) {
        let encoded = markers::encode(&payload).expect("decoded markers re-encode");
        assert_eq!(markers::decode(&encoded).as_ref(), Ok(&payload));
    }
}
