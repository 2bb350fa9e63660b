//! Fuzz test for the config parser
//!
//! Feeds arbitrary UTF-8 through scanning and parsing, then checks that a
//! successful parse survives the canonical printer.
//!
//! Run with: cargo +nightly fuzz run parser_fuzz -- -max_total_time=60

#![no_main]

use confit::{parse, pretty_print, Diagnostics, Parser, Pos};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Recovery must terminate, whatever the input
        let mut diag = Diagnostics::new(|_: &Pos, _: &str| {});
        let (params, errors) = Parser::new("fuzz.conf", input, &mut diag).parse_file();

        if errors == 0 {
            // Clean input reprints into text that parses cleanly again
            let text = pretty_print(&params);
            let reparsed = parse("fuzz.conf", &text, |pos: &Pos, msg: &str| {
                panic!("canonical form failed to parse: {} - {}\n{}", pos, msg, text)
            });
            assert!(reparsed.is_ok());
        }
    }
});
