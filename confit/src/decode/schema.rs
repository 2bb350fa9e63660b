//! Field tables binding parameter names to record fields

use super::value::{mismatch, Decode};
use super::Decoder;
use crate::error::{DecodeError, ValueError};
use crate::lexer::Pos;
use crate::parser::{Name, Operand, Parameter};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

// ============================================================================
// RECORDS
// ============================================================================

/// A struct that configuration blocks decode into.
///
/// Usually implemented with [`record!`](crate::record), which builds the
/// schema once and caches it for the life of the process.
pub trait Record: Default + 'static {
    fn schema() -> &'static Schema<Self>;
}

/// A parameter as seen by the record it is decoded into.
#[derive(Debug, Clone, Copy)]
pub struct Entry<'p> {
    pub pos: &'p Pos,
    pub name: &'p Name,
    pub label: Option<&'p Name>,
    pub value: &'p Operand,
}

impl<'p> From<&'p Parameter> for Entry<'p> {
    fn from(param: &'p Parameter) -> Self {
        Self {
            pos: &param.pos,
            name: &param.name,
            label: param.label.as_ref(),
            value: &param.value,
        }
    }
}

/// Object-safe view of a [`Record`], used to reach into `nogroup` fields.
pub trait RecordValue {
    /// Decode one parameter into the matching field, in place.
    fn decode_entry(&mut self, entry: Entry<'_>, d: &mut Decoder<'_>) -> Result<(), DecodeError>;
}

impl<T: Record> RecordValue for T {
    fn decode_entry(&mut self, entry: Entry<'_>, d: &mut Decoder<'_>) -> Result<(), DecodeError> {
        let Some(field) = T::schema().lookup(&entry.name.value) else {
            tracing::debug!(
                pos = %entry.pos,
                param = %entry.name.value,
                "ignoring unknown parameter"
            );
            return Ok(());
        };

        if field.deprecated {
            let msg = match &field.replacement {
                Some(replacement) => format!(
                    "{} is deprecated use {} instead",
                    entry.name.value, replacement
                ),
                None => format!("{} is deprecated", entry.name.value),
            };
            d.warn(entry.pos, &msg);
        }

        let target = field.access.get(self);

        let result = match entry.label {
            None => target.decode(entry.value, d),
            Some(label) if field.nogroup => match target.as_record() {
                // The label names a field one level down.
                Some(record) => {
                    return record.decode_entry(
                        Entry {
                            pos: entry.pos,
                            name: label,
                            label: None,
                            value: entry.value,
                        },
                        d,
                    );
                }
                None => Err(ValueError::NotRecord),
            },
            Some(label) => match target.as_labels() {
                Some(labels) => labels.decode_labeled(&label.value, entry.value, d),
                None => Err(ValueError::NotGroupable),
            },
        };

        result.map_err(|cause| field.error(&entry, cause))
    }
}

/// Decode a block into a fresh `T` and replace `target` with it.
pub fn decode_record<T: Record + Decode>(
    target: &mut T,
    value: &Operand,
    d: &mut Decoder<'_>,
) -> Result<(), ValueError> {
    let Operand::Block(block) = value else {
        return Err(mismatch(value, T::describe()));
    };

    let mut record = T::default();
    for param in &block.params {
        record.decode_entry(param.into(), d)?;
    }
    *target = record;
    Ok(())
}

// ============================================================================
// FIELDS
// ============================================================================

/// Case-insensitive name comparison used when no field matches exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fold {
    Ascii,
    Unicode,
}

impl Fold {
    pub fn for_name(name: &str) -> Self {
        if name.is_ascii() {
            Fold::Ascii
        } else {
            Fold::Unicode
        }
    }

    pub fn matches(self, field: &str, param: &str) -> bool {
        match self {
            Fold::Ascii => field.eq_ignore_ascii_case(param),
            Fold::Unicode => field.to_lowercase() == param.to_lowercase(),
        }
    }
}

trait Access<T>: Send + Sync {
    fn get<'r>(&self, record: &'r mut T) -> &'r mut dyn Decode;
}

struct Accessor<A, F> {
    access: A,
    _field: PhantomData<fn() -> F>,
}

impl<T, F, A> Access<T> for Accessor<A, F>
where
    F: Decode + 'static,
    A: Fn(&mut T) -> &mut F + Send + Sync,
{
    fn get<'r>(&self, record: &'r mut T) -> &'r mut dyn Decode {
        (self.access)(record)
    }
}

/// One bindable field of a record.
pub struct Field<T> {
    ident: &'static str,
    name: String,
    type_name: Cow<'static, str>,
    fold: Fold,
    deprecated: bool,
    replacement: Option<String>,
    nogroup: bool,
    access: Box<dyn Access<T>>,
}

impl<T> Field<T> {
    /// Rust identifier of the field.
    pub fn ident(&self) -> &'static str {
        self.ident
    }

    /// Name the field is matched by in configuration.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn fold(&self) -> Fold {
        self.fold
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecated
    }

    pub fn replacement(&self) -> Option<&str> {
        self.replacement.as_deref()
    }

    pub fn is_nogroup(&self) -> bool {
        self.nogroup
    }

    fn error(&self, entry: &Entry<'_>, cause: ValueError) -> DecodeError {
        match cause {
            ValueError::Nested(inner) => *inner,
            cause => DecodeError {
                pos: entry.pos.clone(),
                param: entry.name.value.clone(),
                label: entry.label.map(|label| label.value.clone()),
                type_name: self.type_name.clone(),
                field: self.ident.to_string(),
                cause,
            },
        }
    }
}

impl<T> fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("ident", &self.ident)
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .field("fold", &self.fold)
            .field("deprecated", &self.deprecated)
            .field("replacement", &self.replacement)
            .field("nogroup", &self.nogroup)
            .finish_non_exhaustive()
    }
}

/// Parsed form of a field tag, `name,deprecated:replacement,nogroup`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub deprecated: bool,
    pub replacement: Option<String>,
    pub nogroup: bool,
}

impl Tag {
    /// Parse `tag` for the field `ident`. Returns `None` when the tag
    /// excludes the field (`-`).
    pub fn parse(ident: &str, tag: &str) -> Option<Self> {
        let mut parts = tag.split(',');

        let name = match parts.next() {
            Some("") | None => ident,
            Some(name) => name,
        };
        if name == "-" {
            return None;
        }

        let mut tag = Tag {
            name: name.to_string(),
            deprecated: false,
            replacement: None,
            nogroup: false,
        };

        for part in parts {
            let part = part.trim();
            if let Some(rest) = part.strip_prefix("deprecated") {
                tag.deprecated = true;
                if let Some(replacement) = rest.strip_prefix(':') {
                    if !replacement.is_empty() {
                        tag.replacement = Some(replacement.to_string());
                    }
                }
            } else if part == "nogroup" {
                tag.nogroup = true;
            }
        }

        Some(tag)
    }
}

// ============================================================================
// SCHEMA
// ============================================================================

/// The field table of a record type.
pub struct Schema<T> {
    fields: Vec<Field<T>>,
    index: HashMap<String, usize>,
}

impl<T: 'static> Schema<T> {
    pub fn builder() -> SchemaBuilder<T> {
        SchemaBuilder { fields: Vec::new() }
    }

    pub fn fields(&self) -> &[Field<T>] {
        &self.fields
    }

    /// Find the field for a parameter name: exact match first, then the
    /// first field whose fold comparison matches.
    pub fn lookup(&self, name: &str) -> Option<&Field<T>> {
        if let Some(&i) = self.index.get(name) {
            return self.fields.get(i);
        }
        self.fields.iter().find(|f| f.fold.matches(&f.name, name))
    }
}

impl<T> fmt::Debug for Schema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema").field("fields", &self.fields).finish()
    }
}

/// Builder for [`Schema`].
pub struct SchemaBuilder<T> {
    fields: Vec<Field<T>>,
}

impl<T: 'static> SchemaBuilder<T> {
    /// Bind the field `ident`, reached through `access`, under the options in
    /// `tag` (empty for defaults).
    pub fn field<F, A>(mut self, ident: &'static str, tag: &str, access: A) -> Self
    where
        F: Decode + 'static,
        A: Fn(&mut T) -> &mut F + Send + Sync + 'static,
    {
        let Some(tag) = Tag::parse(ident, tag) else {
            return self;
        };

        self.fields.push(Field {
            ident,
            fold: Fold::for_name(&tag.name),
            name: tag.name,
            type_name: F::describe(),
            deprecated: tag.deprecated,
            replacement: tag.replacement,
            nogroup: tag.nogroup,
            access: Box::new(Accessor {
                access,
                _field: PhantomData,
            }),
        });
        self
    }

    pub fn build(self) -> Schema<T> {
        let mut index = HashMap::with_capacity(self.fields.len());
        for (i, field) in self.fields.iter().enumerate() {
            index.entry(field.name.clone()).or_insert(i);
        }
        Schema {
            fields: self.fields,
            index,
        }
    }
}
