//! Scanner implementation

use super::token::*;
use crate::diagnostics::Diagnostics;

// ============================================================================
// SCANNER
// ============================================================================

/// Single-pass scanner with one character of lookahead (two for unit
/// suffixes).
///
/// Newlines are significant only after a token that may end a statement
/// (names, literals, `}` and `]`); everywhere else they are whitespace. This
/// is what lets most lines omit an explicit `;`.
pub struct Scanner<'a, 'h> {
    name: String,
    source: &'a str,
    line: usize,
    column: usize,
    pos: usize,
    nlsemi: bool,
    diag: &'a mut Diagnostics<'h>,
}

fn is_letter(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

impl<'a, 'h> Scanner<'a, 'h> {
    /// Create a scanner over `source`. `name` is used in positions.
    pub fn new(name: impl Into<String>, source: &'a str, diag: &'a mut Diagnostics<'h>) -> Self {
        Self {
            name: name.into(),
            source,
            line: 1,
            column: 1,
            pos: 0,
            nlsemi: false,
            diag,
        }
    }

    /// Name of the source being scanned.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Scan the entire source into a vector of tokens. The last token is
    /// always `Eof`.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }

        tokens
    }

    /// Advance exactly one token.
    pub fn next(&mut self) -> Token {
        let nlsemi = std::mem::replace(&mut self.nlsemi, false);

        loop {
            while let Some(c) = self.peek_char() {
                match c {
                    ' ' | '\t' | '\r' => {
                        self.advance();
                    }
                    '\n' if !nlsemi => {
                        self.advance();
                    }
                    _ => break,
                }
            }

            let pos = self.here();

            let c = match self.peek_char() {
                None => return Token::new(TokenKind::Eof, "", pos),
                Some(c) => c,
            };

            let kind = match c {
                '#' => {
                    self.skip_comment();
                    continue;
                }
                c if is_letter(c) => return self.scan_name(pos),
                c if c.is_ascii_digit() || c == '-' => match self.scan_number(pos) {
                    Some(token) => return token,
                    None => continue,
                },
                '"' => return self.scan_string(pos),
                '\n' | ';' => TokenKind::Semi,
                ',' => TokenKind::Comma,
                '{' => TokenKind::LBrace,
                '}' => {
                    self.nlsemi = true;
                    TokenKind::RBrace
                }
                '[' => TokenKind::LBrack,
                ']' => {
                    self.nlsemi = true;
                    TokenKind::RBrack
                }
                c => {
                    self.advance();
                    self.error(&pos, &format!("unexpected token U+{:04X}", c as u32));
                    continue;
                }
            };

            self.advance();
            return Token::new(kind, "", pos);
        }
    }

    /// Scan an identifier.
    fn scan_name(&mut self, pos: Pos) -> Token {
        let start = self.pos;

        while let Some(c) = self.peek_char() {
            if is_letter(c) || c.is_ascii_digit() {
                self.advance();
            } else {
                break;
            }
        }

        self.nlsemi = true;
        Token::new(TokenKind::Name, &self.source[start..self.pos], pos)
    }

    /// Scan a string literal. Only `\"` is recognised while scanning; other
    /// escape pairs are kept verbatim for the decoder.
    fn scan_string(&mut self, pos: Pos) -> Token {
        self.advance(); // consume opening quote
        let start = self.pos;

        let text = loop {
            match self.peek_char() {
                None => {
                    self.error(&pos, "unterminated string");
                    break &self.source[start..self.pos];
                }
                Some('"') => {
                    let text = &self.source[start..self.pos];
                    self.advance();
                    break text;
                }
                Some('\\') => {
                    self.advance();
                    if !matches!(self.peek_char(), None | Some('\n')) {
                        self.advance();
                    }
                }
                Some('\n') => {
                    let here = self.here();
                    self.error(&here, "unexpected newline in string");
                    break &self.source[start..self.pos];
                }
                Some(_) => {
                    self.advance();
                }
            }
        };

        self.nlsemi = true;
        Token::new(TokenKind::Literal(LitKind::String), text, pos)
    }

    /// Scan a number, then any duration or size suffix that follows it
    /// without whitespace.
    fn scan_number(&mut self, pos: Pos) -> Option<Token> {
        let start = self.pos;

        if self.peek_char() == Some('-') {
            self.advance();
        }

        let (digits, is_float) = self.scan_digits();
        if digits == 0 {
            self.error(&pos, "invalid number");
            return None;
        }

        let mut kind = if is_float { LitKind::Float } else { LitKind::Int };

        if let Some(len) = self.duration_unit() {
            self.advance_by(len);
            kind = LitKind::Duration;

            // 1h30m, 2h45m30s: further <number><unit> pairs belong to the
            // same literal.
            while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
                self.scan_digits();
                match self.duration_unit() {
                    Some(len) => self.advance_by(len),
                    None => {
                        let text = &self.source[start..self.pos];
                        self.error(&pos, &format!("missing unit in duration {}", text));
                        break;
                    }
                }
            }
        } else if let Some(len) = self.size_unit() {
            self.advance_by(len);
            kind = LitKind::Size;
        }

        self.nlsemi = true;
        Some(Token::new(
            TokenKind::Literal(kind),
            &self.source[start..self.pos],
            pos,
        ))
    }

    /// Scan digits with at most one decimal point. Returns the number of
    /// digits consumed and whether a point was seen.
    fn scan_digits(&mut self) -> (usize, bool) {
        let mut digits = 0;
        let mut is_float = false;

        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() {
                digits += 1;
                self.advance();
            } else if c == '.' {
                if is_float {
                    let here = self.here();
                    self.error(&here, "invalid point in float");
                }
                is_float = true;
                self.advance();
            } else {
                break;
            }
        }

        (digits, is_float)
    }

    /// Length of the duration unit at the cursor, if any.
    fn duration_unit(&self) -> Option<usize> {
        match (self.peek_char(), self.peek_next_char()) {
            (Some('m'), Some('s')) | (Some('u'), Some('s')) | (Some('n'), Some('s')) => Some(2),
            (Some('s' | 'm' | 'h' | 'd'), _) => Some(1),
            _ => None,
        }
    }

    /// Length of the size unit at the cursor, if any. A multiplier letter
    /// not followed by `B` is left for the next token.
    fn size_unit(&self) -> Option<usize> {
        match (self.peek_char(), self.peek_next_char()) {
            (Some('B'), _) => Some(1),
            (Some('K' | 'M' | 'G' | 'T' | 'P' | 'E' | 'Z'), Some('B')) => Some(2),
            _ => None,
        }
    }

    /// Skip a `#` comment up to, but not including, the end of line.
    fn skip_comment(&mut self) {
        while let Some(c) = self.peek_char() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
    }

    fn error(&mut self, pos: &Pos, msg: &str) {
        self.diag.error(pos, msg);
    }

    fn here(&self) -> Pos {
        Pos::new(self.name.clone(), self.line, self.column)
    }

    fn peek_char(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn peek_next_char(&self) -> Option<char> {
        let mut iter = self.source[self.pos..].chars();
        iter.next();
        iter.next()
    }

    fn advance(&mut self) {
        let Some(c) = self.peek_char() else {
            return;
        };
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }

    fn advance_by(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(source: &str) -> (Vec<Token>, Vec<String>) {
        let mut errors = Vec::new();
        let tokens = {
            let mut diag = Diagnostics::new(|pos: &Pos, msg: &str| {
                errors.push(format!("{} - {}", pos, msg));
            });
            let mut scanner = Scanner::new("test.conf", source, &mut diag);
            scanner.tokenize()
        };
        (tokens, errors)
    }

    fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
        tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_scanner_names_and_punctuation() {
        let (tokens, errors) = scan("net { listen [a, b] }");
        assert!(errors.is_empty());
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Name,
                TokenKind::LBrace,
                TokenKind::Name,
                TokenKind::LBrack,
                TokenKind::Name,
                TokenKind::Comma,
                TokenKind::Name,
                TokenKind::RBrack,
                TokenKind::RBrace,
                TokenKind::Eof,
            ]
        );
        assert_eq!(tokens[0].text, "net");
    }

    #[test]
    fn test_scanner_newline_is_terminator_only_after_values() {
        let (tokens, _) = scan("net {\n\n  listen \"x\"\n\n}\n");
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Name,
                TokenKind::LBrace,
                TokenKind::Name,
                TokenKind::Literal(LitKind::String),
                TokenKind::Semi,
                TokenKind::RBrace,
                TokenKind::Semi,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_scanner_comment_keeps_terminator() {
        let (tokens, _) = scan("a 1 # trailing\nb 2");
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Name,
                TokenKind::Literal(LitKind::Int),
                TokenKind::Semi,
                TokenKind::Name,
                TokenKind::Literal(LitKind::Int),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_scanner_comment_at_end_of_input() {
        let (tokens, errors) = scan("# only a comment");
        assert!(errors.is_empty());
        assert_eq!(kinds(&tokens), vec![TokenKind::Eof]);
    }

    #[test]
    fn test_scanner_numbers() {
        let (tokens, errors) = scan("42 3.14 -10 -2.5");
        assert!(errors.is_empty());
        assert_eq!(tokens[0].lit_kind(), Some(LitKind::Int));
        assert_eq!(tokens[0].text, "42");
        assert_eq!(tokens[1].lit_kind(), Some(LitKind::Float));
        assert_eq!(tokens[1].text, "3.14");
        assert_eq!(tokens[2].lit_kind(), Some(LitKind::Int));
        assert_eq!(tokens[2].text, "-10");
        assert_eq!(tokens[3].lit_kind(), Some(LitKind::Float));
        assert_eq!(tokens[3].text, "-2.5");
    }

    #[test]
    fn test_scanner_duration_literals() {
        let (tokens, errors) = scan("1s 10m 3h 2d 1h30m 2h45m30s 250ms 1.5h");
        assert!(errors.is_empty(), "{:?}", errors);
        let texts: Vec<&str> = tokens[..8].iter().map(|t| t.text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["1s", "10m", "3h", "2d", "1h30m", "2h45m30s", "250ms", "1.5h"]
        );
        assert!(tokens[..8]
            .iter()
            .all(|t| t.lit_kind() == Some(LitKind::Duration)));
    }

    #[test]
    fn test_scanner_size_literals() {
        let (tokens, errors) = scan("1B 2KB 50MB 4GB 5TB 1PB");
        assert!(errors.is_empty());
        assert!(tokens[..6].iter().all(|t| t.lit_kind() == Some(LitKind::Size)));
        assert_eq!(tokens[2].text, "50MB");
    }

    #[test]
    fn test_scanner_multiplier_without_b_stays_number() {
        let (tokens, _) = scan("10K");
        assert_eq!(tokens[0].lit_kind(), Some(LitKind::Int));
        assert_eq!(tokens[0].text, "10");
        assert_eq!(tokens[1].kind, TokenKind::Name);
        assert_eq!(tokens[1].text, "K");
    }

    #[test]
    fn test_scanner_string_literals() {
        let (tokens, errors) = scan(r#""hello" "esc\"aped" "back\nslash""#);
        assert!(errors.is_empty());
        assert_eq!(tokens[0].text, "hello");
        assert_eq!(tokens[1].text, r#"esc\"aped"#);
        assert_eq!(tokens[2].text, r"back\nslash");
    }

    #[test]
    fn test_scanner_newline_in_string() {
        let (tokens, errors) = scan("\"abc\ndef\"");
        assert_eq!(errors[0], "test.conf:1:5 - unexpected newline in string");
        assert_eq!(tokens[0].text, "abc");
        assert_eq!(tokens[1].kind, TokenKind::Semi);
    }

    #[test]
    fn test_scanner_unexpected_character_resumes() {
        let (tokens, errors) = scan("a @ 1");
        assert_eq!(errors, vec!["test.conf:1:3 - unexpected token U+0040"]);
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Name,
                TokenKind::Literal(LitKind::Int),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_scanner_unicode_identifiers_and_positions() {
        let (tokens, _) = scan("block 标签 {\n  strings [\"细绳\"]\n}");
        assert_eq!(tokens[1].text, "标签");
        assert_eq!(tokens[1].pos, Pos::new("test.conf", 1, 7));
        assert_eq!(tokens[3].text, "strings");
        assert_eq!(tokens[3].pos, Pos::new("test.conf", 2, 3));
    }

    #[test]
    fn test_scanner_multibyte_characters_advance_one_column() {
        let (tokens, errors) = scan("名 \"ü\"\nx 1");
        assert!(errors.is_empty());
        assert_eq!(tokens[0].text, "名");
        assert_eq!(tokens[1].text, "ü");
        assert_eq!(tokens[1].pos, Pos::new("test.conf", 1, 3));
        assert_eq!(tokens[2].kind, TokenKind::Semi);
        assert_eq!(tokens[3].text, "x");
        assert_eq!(tokens[3].pos, Pos::new("test.conf", 2, 1));
    }

    #[test]
    fn test_scanner_eof_is_sticky() {
        let mut diag = Diagnostics::new(|_: &Pos, _: &str| {});
        let mut scanner = Scanner::new("test.conf", "", &mut diag);
        assert_eq!(scanner.next().kind, TokenKind::Eof);
        assert_eq!(scanner.next().kind, TokenKind::Eof);
    }
}
