//! Expansion of top-level `include` parameters

use super::ast::*;
use super::parser::Parser;
use crate::lexer::LitKind;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Files already pulled into one top-level parse, keyed by canonical path,
/// with the name of the source that included each of them.
#[derive(Debug, Default)]
pub struct IncludeRegistry {
    seen: HashMap<PathBuf, String>,
}

impl IncludeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `path` as included from `origin`. The first origin wins.
    pub fn register(&mut self, path: PathBuf, origin: &str) {
        self.seen
            .entry(path)
            .or_insert_with(|| origin.to_string());
    }

    /// Name of the source that included `path`, if it was included already.
    pub fn origin(&self, path: &Path) -> Option<&str> {
        self.seen.get(path).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

impl Parser<'_, '_> {
    /// Replace an `include` parameter by the parameters of the files it
    /// names. Any failure abandons the rest of this statement.
    pub(crate) fn include(&mut self, param: Parameter, out: &mut Vec<Parameter>) {
        let files = match param.value {
            Operand::Literal(lit) if lit.kind == LitKind::String => vec![lit],
            Operand::Array(array) => {
                let mut files = Vec::with_capacity(array.items.len());
                for item in array.items {
                    match item {
                        Operand::Literal(lit) if lit.kind == LitKind::String => files.push(lit),
                        other => {
                            self.diag
                                .error(other.pos(), "include expects a string or an array of strings");
                            return;
                        }
                    }
                }
                files
            }
            other => {
                self.diag
                    .error(other.pos(), "include expects a string or an array of strings");
                return;
            }
        };

        for file in &files {
            match self.include_file(file) {
                Some(params) => out.extend(params),
                None => return,
            }
        }
    }

    fn include_file(&mut self, lit: &Literal) -> Option<Vec<Parameter>> {
        let file = lit.value.as_str();

        let path = match fs::canonicalize(file) {
            Ok(path) => path,
            Err(err) => {
                self.diag.error(&lit.pos, &format!("include {}: {}", file, err));
                return None;
            }
        };

        if self.path.as_ref() == Some(&path) {
            self.diag.error(&lit.pos, "cannot include self");
            return None;
        }

        let registry = self.includes.as_deref_mut()?;
        if let Some(origin) = registry.origin(&path) {
            let msg = format!("{} already included from {}", file, origin);
            self.diag.error(&lit.pos, &msg);
            return None;
        }
        registry.register(path.clone(), &self.name);

        let source = match fs::read_to_string(&path) {
            Ok(source) => source,
            Err(err) => {
                self.diag.error(&lit.pos, &format!("include {}: {}", file, err));
                return None;
            }
        };

        tracing::debug!(file, origin = %self.name, "including config file");

        let (params, count) = {
            let registry = self.includes.as_deref_mut()?;
            let mut nested = Parser::new(file, &source, &mut *self.diag).with_includes(registry);
            nested.parse_file()
        };

        if count > 0 {
            let msg = format!("include {}: parser encountered {} error(s)", file, count);
            self.diag.error(&lit.pos, &msg);
            return None;
        }
        Some(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Diagnostics;
    use crate::lexer::Pos;

    #[test]
    fn test_registry_keeps_first_origin() {
        let mut registry = IncludeRegistry::new();
        registry.register(PathBuf::from("/etc/a.conf"), "main.conf");
        registry.register(PathBuf::from("/etc/a.conf"), "other.conf");
        assert_eq!(registry.origin(Path::new("/etc/a.conf")), Some("main.conf"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_include_rejects_non_string_operand() {
        let mut errors = Vec::new();
        {
            let mut diag = Diagnostics::new(|pos: &Pos, msg: &str| {
                errors.push(format!("{} - {}", pos, msg));
            });
            let mut registry = IncludeRegistry::new();
            let mut parser =
                Parser::new("inline", "include 10\n", &mut diag).with_includes(&mut registry);
            let (params, count) = parser.parse_file();
            assert!(params.is_empty());
            assert_eq!(count, 1);
        }
        assert_eq!(
            errors,
            vec!["inline:1:9 - include expects a string or an array of strings"]
        );
    }

    #[test]
    fn test_include_is_plain_parameter_when_disabled() {
        let mut diag = Diagnostics::new(|_: &Pos, _: &str| {});
        let mut parser = Parser::new("inline", "include \"x.conf\"\n", &mut diag);
        let params = parser.parse().unwrap();
        assert_eq!(params[0].name.value, "include");
    }
}
