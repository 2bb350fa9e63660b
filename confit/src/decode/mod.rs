//! Decoder mapping parsed configuration onto typed records

pub mod interpolate;
pub mod literal;
pub mod schema;
pub mod value;

pub use interpolate::{env_provider, ExpandError, ExpandFn, InterpolateError};
pub use literal::{parse_duration, parse_size, LiteralError};
pub use schema::{decode_record, Entry, Field, Fold, Record, RecordValue, Schema, SchemaBuilder, Tag};
pub use value::{Decode, Labels};

use crate::diagnostics::Diagnostics;
use crate::error::{Error, ValueError};
use crate::lexer::Pos;
use crate::parser::{IncludeRegistry, Literal, Parameter, Parser};
use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::path::Path;

// ============================================================================
// DECODER
// ============================================================================

/// Parses configuration and decodes it into a [`Record`].
///
/// Options are set with the consuming builder methods:
///
/// ```
/// use confit::{Decoder, Pos};
///
/// let decoder = Decoder::new("server.conf")
///     .includes(true)
///     .envvars()
///     .expand("upper", |key| Ok(key.to_uppercase()))
///     .error_handler(|pos: &Pos, msg: &str| eprintln!("{} - {}", pos, msg));
/// # drop(decoder);
/// ```
pub struct Decoder<'h> {
    name: String,
    includes: bool,
    expands: HashMap<String, ExpandFn<'h>>,
    diag: Diagnostics<'h>,
}

impl<'h> Decoder<'h> {
    /// Decoder for the source `name`, without includes or expansion,
    /// reporting to standard error.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            includes: false,
            expands: HashMap::new(),
            diag: Diagnostics::stderr(),
        }
    }

    /// Decoder with includes and environment expansion enabled.
    pub fn with_defaults(name: impl Into<String>) -> Self {
        Self::new(name).includes(true).envvars()
    }

    /// Enable or disable expansion of top-level `include` parameters.
    pub fn includes(mut self, enabled: bool) -> Self {
        self.includes = enabled;
        self
    }

    /// Register the `env` provider, so `${env:HOME}` expands.
    pub fn envvars(self) -> Self {
        self.expand("env", env_provider)
    }

    /// Register an expansion provider for `${prefix:key}`.
    pub fn expand(
        mut self,
        prefix: impl Into<String>,
        provider: impl Fn(&str) -> Result<String, ExpandError> + 'h,
    ) -> Self {
        self.expands.insert(prefix.into(), Box::new(provider));
        self
    }

    /// Route diagnostics to `handler` instead of standard error.
    pub fn error_handler(mut self, handler: impl FnMut(&Pos, &str) + 'h) -> Self {
        self.diag = Diagnostics::new(handler);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Errors reported through the handler so far.
    pub fn error_count(&self) -> usize {
        self.diag.error_count()
    }

    /// Parse `source`, expanding includes when enabled.
    pub fn parse(&mut self, source: &str) -> Result<Vec<Parameter>, Error> {
        let mut registry = IncludeRegistry::new();
        let mut parser = Parser::new(self.name.clone(), source, &mut self.diag);
        if self.includes {
            parser = parser.with_includes(&mut registry);
        }
        parser.parse()
    }

    /// Parse `source` and decode it into `target`.
    pub fn decode<T: Record>(&mut self, target: &mut T, source: &str) -> Result<(), Error> {
        let params = self.parse(source)?;
        self.decode_params(target, &params)
    }

    /// Read all of `reader`, then parse and decode it.
    pub fn decode_reader<T: Record>(
        &mut self,
        target: &mut T,
        mut reader: impl Read,
    ) -> Result<(), Error> {
        let mut source = String::new();
        reader
            .read_to_string(&mut source)
            .map_err(|source| Error::Io {
                path: self.name.clone(),
                source,
            })?;
        self.decode(target, &source)
    }

    /// Open the file named by the decoder, then parse and decode it.
    pub fn decode_file<T: Record>(&mut self, target: &mut T) -> Result<(), Error> {
        let source = std::fs::read_to_string(&self.name).map_err(|source| Error::Io {
            path: self.name.clone(),
            source,
        })?;
        self.decode(target, &source)
    }

    /// Decode already parsed parameters into `target`, in order.
    pub fn decode_params<T: Record>(
        &mut self,
        target: &mut T,
        params: &[Parameter],
    ) -> Result<(), Error> {
        tracing::debug!(name = %self.name, params = params.len(), "decoding config");

        for param in params {
            target.decode_entry(param.into(), self)?;
        }
        Ok(())
    }

    /// Apply variable expansion to a string literal.
    pub fn interpolate(&self, lit: &Literal) -> Result<String, ValueError> {
        interpolate::interpolate(&lit.value, &self.expands).map_err(|source| {
            ValueError::Interpolate {
                pos: lit.pos.clone(),
                source,
            }
        })
    }

    pub(crate) fn warn(&mut self, pos: &Pos, msg: &str) {
        self.diag.warn(pos, msg);
    }
}

impl fmt::Debug for Decoder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut prefixes: Vec<&str> = self.expands.keys().map(String::as_str).collect();
        prefixes.sort_unstable();
        f.debug_struct("Decoder")
            .field("name", &self.name)
            .field("includes", &self.includes)
            .field("expands", &prefixes)
            .field("diag", &self.diag)
            .finish()
    }
}

/// Decode the file at `path` into `target` with includes and environment
/// expansion enabled, reporting diagnostics to standard error.
pub fn decode_file<T: Record>(target: &mut T, path: impl AsRef<Path>) -> Result<(), Error> {
    Decoder::with_defaults(path.as_ref().display().to_string()).decode_file(target)
}
