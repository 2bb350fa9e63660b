//! Parser implementation

use super::ast::*;
use super::include::IncludeRegistry;
use crate::diagnostics::Diagnostics;
use crate::error::Error;
use crate::lexer::*;
use std::path::PathBuf;

// ============================================================================
// PARSER
// ============================================================================

/// Recursive-descent parser over a scanned token stream.
///
/// Errors are reported through the shared [`Diagnostics`] and parsing
/// continues; a parse fails as a whole when at least one error was reported
/// while it ran.
pub struct Parser<'a, 'h> {
    pub(crate) name: String,
    pub(crate) tokens: Vec<Token>,
    pub(crate) pos: usize,
    pub(crate) diag: &'a mut Diagnostics<'h>,
    pub(crate) includes: Option<&'a mut IncludeRegistry>,
    pub(crate) path: Option<PathBuf>,
    start_errors: usize,
}

impl<'a, 'h> Parser<'a, 'h> {
    /// Scan `source` and prepare to parse it. Scan errors count towards the
    /// parse.
    pub fn new(name: impl Into<String>, source: &str, diag: &'a mut Diagnostics<'h>) -> Self {
        let name = name.into();
        let start_errors = diag.error_count();
        let tokens = Scanner::new(name.clone(), source, &mut *diag).tokenize();

        Self {
            name,
            tokens,
            pos: 0,
            diag,
            includes: None,
            path: None,
            start_errors,
        }
    }

    /// Expand top-level `include` parameters, tracking included files in
    /// `registry`.
    pub fn with_includes(mut self, registry: &'a mut IncludeRegistry) -> Self {
        if let Ok(path) = std::fs::canonicalize(&self.name) {
            registry.register(path.clone(), &self.name);
            self.path = Some(path);
        }
        self.includes = Some(registry);
        self
    }

    /// Parse the source, failing if any error was reported.
    pub fn parse(&mut self) -> Result<Vec<Parameter>, Error> {
        let (params, count) = self.parse_file();

        if count > 0 {
            return Err(Error::Parse { count });
        }
        Ok(params)
    }

    /// Parse the source and return what was recovered together with the
    /// number of errors reported.
    pub fn parse_file(&mut self) -> (Vec<Parameter>, usize) {
        let mut params = Vec::new();

        loop {
            while self.kind() == TokenKind::Semi {
                self.next();
            }
            if self.kind() == TokenKind::Eof {
                break;
            }

            if let Some(param) = self.param() {
                if self.includes.is_some() && param.name.value == "include" {
                    self.include(param, &mut params);
                } else {
                    params.push(param);
                }
            }

            if !self.got(TokenKind::Semi) && self.kind() != TokenKind::Eof {
                self.error(&format!("expected {} or {}", TokenKind::Semi, TokenKind::Eof));
                self.next();
            }
        }

        let count = self.diag.error_count() - self.start_errors;
        (params, count)
    }

    /// Number of errors reported since this parser was created.
    pub fn error_count(&self) -> usize {
        self.diag.error_count() - self.start_errors
    }

    // ========================================================================
    // GRAMMAR
    // ========================================================================

    /// `parameter = identifier [ identifier ] operand`
    fn param(&mut self) -> Option<Parameter> {
        if self.kind() != TokenKind::Name {
            self.unexpected();
            self.advance_to(&[TokenKind::Semi]);
            return None;
        }

        let name = self.name();
        let pos = name.pos.clone();
        let mut label = None;

        if self.kind() == TokenKind::Name {
            let second = self.name();

            if matches!(
                self.kind(),
                TokenKind::Semi | TokenKind::RBrace | TokenKind::Eof
            ) {
                // `debug true` is a value, `auth internal` with nothing
                // after it is a label missing its operand.
                if second.is_bool() {
                    let value = Operand::Literal(Literal::new(second.value, LitKind::Bool, second.pos));
                    return Some(Parameter {
                        pos,
                        name,
                        label: None,
                        value,
                    });
                }
                self.unexpected();
                return None;
            }
            label = Some(second);
        }

        let value = self.operand()?;

        Some(Parameter {
            pos,
            name,
            label,
            value,
        })
    }

    /// `operand = literal | array | block`
    fn operand(&mut self) -> Option<Operand> {
        match self.kind() {
            TokenKind::Literal(kind) => {
                let token = self.current();
                let lit = Literal::new(token.text.clone(), kind, token.pos.clone());
                self.next();
                Some(Operand::Literal(lit))
            }
            TokenKind::LBrace => Some(Operand::Block(self.block())),
            TokenKind::LBrack => Some(Operand::Array(self.array())),
            TokenKind::Name => {
                let name = self.name();

                if !name.is_bool() {
                    self.diag.error(&name.pos, &format!("unexpected {}", TokenKind::Name));
                    self.advance_to(&[TokenKind::Semi]);
                    return None;
                }
                Some(Operand::Literal(Literal::new(name.value, LitKind::Bool, name.pos)))
            }
            _ => {
                self.unexpected();
                self.advance_to(&[TokenKind::Semi]);
                None
            }
        }
    }

    /// `block = "{" [ parameter terminator ] "}"`
    fn block(&mut self) -> Block {
        let pos = self.current().pos.clone();
        self.want(TokenKind::LBrace);

        let mut params = Vec::new();

        self.list(TokenKind::Semi, TokenKind::RBrace, |p| {
            if p.kind() != TokenKind::Name {
                p.expected(TokenKind::Name);
                p.advance_to(&[TokenKind::RBrace, TokenKind::Semi]);
                return;
            }
            if let Some(param) = p.param() {
                params.push(param);
            }
        });

        Block { pos, params }
    }

    /// `array = "[" [ operand "," ] "]"`
    fn array(&mut self) -> Array {
        let pos = self.current().pos.clone();
        self.want(TokenKind::LBrack);

        let mut items = Vec::new();

        self.list(TokenKind::Comma, TokenKind::RBrack, |p| {
            if let Some(item) = p.operand() {
                items.push(item);
            }
        });

        Array { pos, items }
    }

    /// Parse elements until `end`, requiring `sep` or `end` after each one.
    fn list(&mut self, sep: TokenKind, end: TokenKind, mut parse_one: impl FnMut(&mut Self)) {
        while self.kind() != end && self.kind() != TokenKind::Eof {
            parse_one(self);

            if !self.got(sep) && self.kind() != end {
                self.error(&format!("expected {} or {}", sep, end));
                self.next();
            }
        }
        self.want(end);
    }

    // ========================================================================
    // HELPERS
    // ========================================================================

    fn name(&mut self) -> Name {
        let token = self.current();
        let name = Name::new(token.text.clone(), token.pos.clone());
        self.next();
        name
    }

    pub(crate) fn current(&self) -> &Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.pos.min(last)]
    }

    pub(crate) fn kind(&self) -> TokenKind {
        self.current().kind
    }

    fn next(&mut self) {
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn got(&mut self, kind: TokenKind) -> bool {
        if self.kind() == kind {
            self.next();
            return true;
        }
        false
    }

    fn want(&mut self, kind: TokenKind) {
        if !self.got(kind) {
            self.expected(kind);
        }
    }

    /// Skip tokens until one in `follow` (or end of input).
    fn advance_to(&mut self, follow: &[TokenKind]) {
        while !follow.contains(&self.kind()) && self.kind() != TokenKind::Eof {
            self.next();
        }
    }

    fn expected(&mut self, kind: TokenKind) {
        self.error(&format!("expected {}", kind));
    }

    fn unexpected(&mut self) {
        let kind = self.kind();
        self.error(&format!("unexpected {}", kind));
    }

    /// Report an error at the current token.
    pub(crate) fn error(&mut self, msg: &str) {
        let pos = self.current().pos.clone();
        self.diag.error(&pos, msg);
    }
}

/// Parse `source` into its top-level parameters. Includes are not expanded.
pub fn parse(
    name: impl Into<String>,
    source: &str,
    handler: impl FnMut(&Pos, &str),
) -> Result<Vec<Parameter>, Error> {
    let mut diag = Diagnostics::new(handler);
    let mut parser = Parser::new(name, source, &mut diag);
    parser.parse()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_collect(source: &str) -> (Vec<Parameter>, Vec<String>) {
        let mut errors = Vec::new();
        let (params, count) = {
            let mut diag = Diagnostics::new(|pos: &Pos, msg: &str| {
                errors.push(format!("{} - {}", pos, msg));
            });
            let mut parser = Parser::new("test.conf", source, &mut diag);
            parser.parse_file()
        };
        assert_eq!(count, errors.len());
        (params, errors)
    }

    fn literal(op: &Operand) -> &Literal {
        match op {
            Operand::Literal(lit) => lit,
            other => panic!("expected literal, got {}", other.kind_name()),
        }
    }

    #[test]
    fn test_parse_simple_parameters() {
        let (params, errors) = parse_collect("host \"localhost\"\nport 8080\nratio 0.5\n");
        assert!(errors.is_empty());
        assert_eq!(params.len(), 3);
        assert_eq!(params[0].name.value, "host");
        assert_eq!(literal(&params[0].value).value, "localhost");
        assert_eq!(literal(&params[1].value).kind, LitKind::Int);
        assert_eq!(literal(&params[2].value).kind, LitKind::Float);
    }

    #[test]
    fn test_parse_block_and_array() {
        let source = "net {\n    listen \"localhost:443\"\n    drivers [\"docker\", \"qemu-x86_64\"]\n}\n";
        let (params, errors) = parse_collect(source);
        assert!(errors.is_empty(), "{:?}", errors);

        let Operand::Block(block) = &params[0].value else {
            panic!("expected block");
        };
        assert_eq!(block.params.len(), 2);
        let Operand::Array(array) = &block.params[1].value else {
            panic!("expected array");
        };
        let items: Vec<&str> = array.items.iter().map(|i| literal(i).value.as_str()).collect();
        assert_eq!(items, vec!["docker", "qemu-x86_64"]);
    }

    #[test]
    fn test_parse_semicolons_on_one_line() {
        let (params, errors) = parse_collect("timeout { read 10m; write 10m }");
        assert!(errors.is_empty(), "{:?}", errors);
        let Operand::Block(block) = &params[0].value else {
            panic!("expected block");
        };
        assert_eq!(block.params.len(), 2);
        assert_eq!(literal(&block.params[1].value).kind, LitKind::Duration);
    }

    #[test]
    fn test_parse_labels() {
        let (params, errors) = parse_collect("auth internal {\n    addr \"localhost\"\n}\n");
        assert!(errors.is_empty());
        assert_eq!(params[0].name.value, "auth");
        assert_eq!(params[0].label.as_ref().map(|l| l.value.as_str()), Some("internal"));
    }

    #[test]
    fn test_parse_bool_is_not_a_label() {
        let (params, errors) = parse_collect("debug true\nverbose false");
        assert!(errors.is_empty());
        assert!(params[0].label.is_none());
        assert_eq!(literal(&params[0].value).kind, LitKind::Bool);
        assert_eq!(literal(&params[1].value).value, "false");
    }

    #[test]
    fn test_parse_bool_operand_after_label() {
        let (params, errors) = parse_collect("feature beta true\n");
        assert!(errors.is_empty());
        assert_eq!(params[0].label.as_ref().map(|l| l.value.as_str()), Some("beta"));
        assert_eq!(literal(&params[0].value).value, "true");
    }

    #[test]
    fn test_parse_label_without_operand() {
        let (params, errors) = parse_collect("auth internal\nport 1\n");
        assert_eq!(errors, vec!["test.conf:1:14 - unexpected newline"]);
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].name.value, "port");
    }

    #[test]
    fn test_parse_unexpected_name_operand() {
        let (params, errors) = parse_collect("mode fast slow\nport 1\n");
        assert_eq!(errors, vec!["test.conf:1:11 - unexpected name"]);
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_parse_missing_separator_in_array() {
        let (_, errors) = parse_collect("list [1 2]\n");
        assert_eq!(errors, vec!["test.conf:1:9 - expected comma or ]"]);
    }

    #[test]
    fn test_parse_expected_name_in_block() {
        let (params, errors) = parse_collect("block {\n    \"oops\"\n    ok 1\n}\n");
        assert_eq!(errors, vec!["test.conf:2:5 - expected name"]);
        let Operand::Block(block) = &params[0].value else {
            panic!("expected block");
        };
        assert_eq!(block.params.len(), 1);
        assert_eq!(block.params[0].name.value, "ok");
    }

    #[test]
    fn test_parse_recovers_after_errors() {
        let source = "a @ 1\nb [1 2]\nc \"fine\"\n";
        let (params, errors) = parse_collect(source);
        assert_eq!(errors.len(), 2);
        let names: Vec<&str> = params.iter().map(|p| p.name.value.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_parse_counts_errors() {
        let result = parse("test.conf", "x {\n", |_: &Pos, _: &str| {});
        assert!(matches!(result, Err(Error::Parse { count }) if count > 0));
    }

    #[test]
    fn test_parse_empty_source() {
        let (params, errors) = parse_collect("\n\n# nothing here\n");
        assert!(params.is_empty());
        assert!(errors.is_empty());
    }
}
