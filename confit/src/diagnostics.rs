//! Diagnostics channel shared by the scanner, parser and decoder.
//!
//! Every diagnostic (scan and syntax errors, include failures, deprecation
//! warnings) is delivered to a single handler together with its position.
//! Only errors are counted; the parser fails when the count grows.

use crate::lexer::Pos;
use std::fmt;

/// Callback invoked for every diagnostic.
pub type ErrorHandler<'h> = Box<dyn FnMut(&Pos, &str) + 'h>;

/// Default handler: writes `name:line:col - message` to standard error.
pub fn stderr_handler(pos: &Pos, msg: &str) {
    eprintln!("{} - {}", pos, msg);
}

/// Owns the error handler and counts reported errors.
pub struct Diagnostics<'h> {
    handler: ErrorHandler<'h>,
    errors: usize,
}

impl<'h> Diagnostics<'h> {
    pub fn new(handler: impl FnMut(&Pos, &str) + 'h) -> Self {
        Self {
            handler: Box::new(handler),
            errors: 0,
        }
    }

    /// Diagnostics that print to standard error.
    pub fn stderr() -> Self {
        Self::new(stderr_handler)
    }

    /// Report an error. Errors make the current parse fail.
    pub fn error(&mut self, pos: &Pos, msg: &str) {
        self.errors += 1;
        tracing::debug!(%pos, msg, "config error");
        (self.handler)(pos, msg);
    }

    /// Report a warning. Warnings never fail a parse or decode.
    pub fn warn(&mut self, pos: &Pos, msg: &str) {
        tracing::warn!(%pos, msg, "config warning");
        (self.handler)(pos, msg);
    }

    /// Total number of errors reported so far.
    pub fn error_count(&self) -> usize {
        self.errors
    }
}

impl Default for Diagnostics<'_> {
    fn default() -> Self {
        Self::stderr()
    }
}

impl fmt::Debug for Diagnostics<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagnostics")
            .field("errors", &self.errors)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_are_counted_and_warnings_are_not() {
        let mut seen = Vec::new();
        {
            let mut diag = Diagnostics::new(|pos: &Pos, msg: &str| {
                seen.push(format!("{} - {}", pos, msg));
            });
            diag.error(&Pos::new("a.conf", 2, 4), "unexpected name");
            diag.warn(&Pos::new("a.conf", 3, 1), "ssl is deprecated");
            assert_eq!(diag.error_count(), 1);
        }
        assert_eq!(
            seen,
            vec![
                "a.conf:2:4 - unexpected name".to_string(),
                "a.conf:3:1 - ssl is deprecated".to_string(),
            ]
        );
    }
}
