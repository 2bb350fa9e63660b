//! Variable expansion in string literals

use std::collections::HashMap;
use thiserror::Error;

/// Error returned by an expansion provider.
pub type ExpandError = Box<dyn std::error::Error + Send + Sync>;

/// Expansion provider: maps a key to its replacement text.
pub type ExpandFn<'h> = Box<dyn Fn(&str) -> Result<String, ExpandError> + 'h>;

#[derive(Debug, Error)]
pub enum InterpolateError {
    #[error("undefined variable expansion: {0}")]
    Undefined(String),

    #[error("unterminated variable expansion")]
    Unterminated,

    #[error("cannot expand {key:?}: {source}")]
    Provider {
        key: String,
        #[source]
        source: ExpandError,
    },
}

/// Environment provider: the value of the variable, or an empty string when
/// it is unset.
pub fn env_provider(key: &str) -> Result<String, ExpandError> {
    Ok(std::env::var(key).unwrap_or_default())
}

/// Expand `${prefix:key}` and `${KEY}` references in `text`.
///
/// A backslash escapes the character after it, which is copied verbatim and
/// never starts an expansion. With no providers registered the text is
/// returned unchanged.
pub fn interpolate(
    text: &str,
    providers: &HashMap<String, ExpandFn<'_>>,
) -> Result<String, InterpolateError> {
    if providers.is_empty() {
        return Ok(text.to_string());
    }

    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            }
            '$' if chars.peek() == Some(&'{') => {
                chars.next();

                let mut expr = String::new();
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == '}' {
                        closed = true;
                        break;
                    }
                    expr.push(c);
                }
                if !closed {
                    return Err(InterpolateError::Unterminated);
                }

                out.push_str(&expand(&expr, providers)?);
            }
            c => out.push(c),
        }
    }

    Ok(out)
}

fn expand(expr: &str, providers: &HashMap<String, ExpandFn<'_>>) -> Result<String, InterpolateError> {
    let (prefix, key) = match expr.find(':') {
        Some(i) if i > 0 => (Some(&expr[..i]), &expr[i + 1..]),
        _ => (None, expr),
    };

    tracing::trace!(prefix, key, "expanding variable");

    let result = match prefix {
        Some(prefix) => {
            let provider = providers
                .get(prefix)
                .ok_or_else(|| InterpolateError::Undefined(prefix.to_string()))?;
            provider(key)
        }
        None => env_provider(key),
    };

    result.map_err(|source| InterpolateError::Provider {
        key: key.to_string(),
        source,
    })
}
