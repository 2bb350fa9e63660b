//! Property-Based Tests for the scanner, parser and canonical printer
//!
//! Properties:
//! - Scanning arbitrary text never panics and always ends with Eof
//! - Parsing arbitrary text always terminates, with or without errors
//! - pretty_print → parse SHALL reproduce the same tree (positions aside)

use confit::{parse, pretty_print, Diagnostics, Parser, Pos, Scanner, TokenKind};
use confit_test_utils::generators::*;
use confit_test_utils::strip_positions;
use proptest::prelude::*;

fn quiet() -> Diagnostics<'static> {
    Diagnostics::new(|_: &Pos, _: &str| {})
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_scanner_ends_with_eof(source in arb_source_text()) {
        let mut diag = quiet();
        let tokens = Scanner::new("prop.conf", &source, &mut diag).tokenize();

        prop_assert!(!tokens.is_empty());
        prop_assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
        for token in &tokens {
            prop_assert!(token.pos.line >= 1);
            prop_assert!(token.pos.column >= 1);
        }
    }

    #[test]
    fn prop_parser_terminates(source in arb_source_text()) {
        let mut diag = quiet();
        let mut parser = Parser::new("prop.conf", &source, &mut diag);
        let (_, errors) = parser.parse_file();
        prop_assert_eq!(errors, parser.error_count());
    }

    #[test]
    fn prop_canonical_form_round_trips(params in arb_params()) {
        let text = pretty_print(&params);
        let reparsed = parse("prop.conf", &text, |pos: &Pos, msg: &str| {
            panic!("{} - {}\n{}", pos, msg, text)
        });

        prop_assert!(reparsed.is_ok());
        let reparsed = reparsed.unwrap();
        prop_assert_eq!(strip_positions(&reparsed), strip_positions(&params));
    }

    #[test]
    fn prop_canonical_form_is_stable(params in arb_params()) {
        let once = pretty_print(&params);
        let reparsed = parse("prop.conf", &once, |_: &Pos, _: &str| {}).unwrap();
        prop_assert_eq!(pretty_print(&reparsed), once);
    }
}
