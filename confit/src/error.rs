//! Error types for parsing and decoding

use crate::decode::interpolate::InterpolateError;
use crate::decode::literal::LiteralError;
use crate::lexer::Pos;
use std::borrow::Cow;
use thiserror::Error;

/// Top-level error returned by parse and decode entry points.
#[derive(Debug, Error)]
pub enum Error {
    #[error("config: {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Scan, syntax and include errors have already been delivered to the
    /// error handler; this only carries their number.
    #[error("parser encountered {count} error(s)")]
    Parse { count: usize },

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// A parameter could not be decoded into its target field.
///
/// The first decode error aborts the decode call.
#[derive(Debug, Error)]
#[error(
    "config: {pos} - cannot decode {:?} into field {field} of type {type_name}: {cause}",
    param_with_label(.param, .label)
)]
pub struct DecodeError {
    pub pos: Pos,
    pub param: String,
    pub label: Option<String>,
    pub type_name: Cow<'static, str>,
    pub field: String,
    #[source]
    pub cause: ValueError,
}

fn param_with_label(param: &str, label: &Option<String>) -> String {
    match label {
        Some(label) => format!("{} {}", param, label),
        None => param.to_string(),
    }
}

/// Why a value could not be stored in its target.
#[derive(Debug, Error)]
pub enum ValueError {
    #[error("{pos} - cannot use {found} as {expected}")]
    Mismatch {
        pos: Pos,
        found: &'static str,
        expected: Cow<'static, str>,
    },

    #[error("{pos} - {value} out of range for {type_name}")]
    OutOfRange {
        pos: Pos,
        value: String,
        type_name: &'static str,
    },

    #[error("{pos} - {source}")]
    Literal {
        pos: Pos,
        #[source]
        source: LiteralError,
    },

    #[error("{pos} - {source}")]
    Interpolate {
        pos: Pos,
        #[source]
        source: InterpolateError,
    },

    #[error("labels require a map field or a nogroup record field")]
    NotGroupable,

    #[error("nogroup requires a record field")]
    NotRecord,

    /// Failure inside a nested block, reported against the innermost
    /// parameter.
    #[error(transparent)]
    Nested(Box<DecodeError>),
}

impl From<DecodeError> for ValueError {
    fn from(err: DecodeError) -> Self {
        ValueError::Nested(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_message() {
        let err = DecodeError {
            pos: Pos::new("server.conf", 4, 5),
            param: "auth".to_string(),
            label: Some("internal".to_string()),
            type_name: Cow::Borrowed("String"),
            field: "auth".to_string(),
            cause: ValueError::NotGroupable,
        };
        assert_eq!(
            err.to_string(),
            "config: server.conf:4:5 - cannot decode \"auth internal\" into field auth \
             of type String: labels require a map field or a nogroup record field"
        );
    }

    #[test]
    fn test_nested_error_is_transparent() {
        let inner = DecodeError {
            pos: Pos::new("a.conf", 2, 3),
            param: "port".to_string(),
            label: None,
            type_name: Cow::Borrowed("u16"),
            field: "port".to_string(),
            cause: ValueError::Mismatch {
                pos: Pos::new("a.conf", 2, 8),
                found: "string",
                expected: Cow::Borrowed("u16"),
            },
        };
        let message = inner.to_string();
        let nested = ValueError::from(inner);
        assert_eq!(nested.to_string(), message);
    }

    #[test]
    fn test_parse_error_message() {
        assert_eq!(
            Error::Parse { count: 3 }.to_string(),
            "parser encountered 3 error(s)"
        );
    }
}
