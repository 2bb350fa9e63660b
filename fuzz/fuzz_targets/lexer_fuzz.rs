//! Fuzz test for the config scanner
//!
//! Feeds arbitrary UTF-8 to the scanner looking for panics and infinite
//! loops on malformed input.
//!
//! Run with: cargo +nightly fuzz run lexer_fuzz -- -max_total_time=60

#![no_main]

use confit::{Diagnostics, Pos, Scanner, TokenKind};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let mut reported = 0usize;
        let mut diag = Diagnostics::new(|pos: &Pos, msg: &str| {
            assert!(pos.line >= 1 && pos.column >= 1, "diagnostic without position");
            assert!(!msg.is_empty(), "empty diagnostic");
            reported += 1;
        });

        let tokens = Scanner::new("fuzz.conf", input, &mut diag).tokenize();

        // The stream always terminates with Eof
        assert_eq!(
            tokens.last().map(|t| t.kind),
            Some(TokenKind::Eof),
            "Last token should always be Eof"
        );

        for token in &tokens {
            assert!(token.pos.line >= 1, "Line numbers should be >= 1");
            assert!(token.pos.column >= 1, "Column numbers should be >= 1");
        }

        let counted = diag.error_count();
        drop(diag);
        assert_eq!(counted, reported);
    }
});
