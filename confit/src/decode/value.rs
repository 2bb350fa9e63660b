//! Decoding of operands into Rust values

use super::literal::{parse_duration, parse_size};
use super::schema::RecordValue;
use super::Decoder;
use crate::error::ValueError;
use crate::lexer::LitKind;
use crate::parser::{Literal, Node, Operand};
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

// ============================================================================
// DECODE TRAIT
// ============================================================================

/// A value that can be populated from an operand.
///
/// Implemented for strings, booleans, integers, floats,
/// [`std::time::Duration`], `Vec`, `Option` and string-keyed maps. Record
/// types get an implementation from [`record!`](crate::record).
pub trait Decode {
    /// Type name used in error messages.
    fn describe() -> Cow<'static, str>
    where
        Self: Sized;

    /// Replace `self` with the value of `value`.
    fn decode(&mut self, value: &Operand, d: &mut Decoder<'_>) -> Result<(), ValueError>;

    /// The record behind this value, for `nogroup` fields.
    fn as_record(&mut self) -> Option<&mut dyn RecordValue> {
        None
    }

    /// The map behind this value, for labeled parameters.
    fn as_labels(&mut self) -> Option<&mut dyn Labels> {
        None
    }
}

/// String-keyed collection that labeled parameters are grouped into.
pub trait Labels {
    /// Decode `value` into a fresh element stored under `label`. A label
    /// seen twice keeps the last value.
    fn decode_labeled(
        &mut self,
        label: &str,
        value: &Operand,
        d: &mut Decoder<'_>,
    ) -> Result<(), ValueError>;
}

pub(crate) fn mismatch(value: &Operand, expected: impl Into<Cow<'static, str>>) -> ValueError {
    ValueError::Mismatch {
        pos: value.pos().clone(),
        found: value.kind_name(),
        expected: expected.into(),
    }
}

fn out_of_range(lit: &Literal, type_name: &'static str) -> ValueError {
    ValueError::OutOfRange {
        pos: lit.pos.clone(),
        value: lit.value.clone(),
        type_name,
    }
}

fn literal<'v>(value: &'v Operand, expected: &'static str) -> Result<&'v Literal, ValueError> {
    match value {
        Operand::Literal(lit) => Ok(lit),
        other => Err(mismatch(other, expected)),
    }
}

// ============================================================================
// SCALARS
// ============================================================================

impl Decode for String {
    fn describe() -> Cow<'static, str> {
        Cow::Borrowed("String")
    }

    fn decode(&mut self, value: &Operand, d: &mut Decoder<'_>) -> Result<(), ValueError> {
        let lit = literal(value, "String")?;
        if lit.kind != LitKind::String {
            return Err(mismatch(value, "String"));
        }
        *self = d.interpolate(lit)?;
        Ok(())
    }
}

impl Decode for bool {
    fn describe() -> Cow<'static, str> {
        Cow::Borrowed("bool")
    }

    fn decode(&mut self, value: &Operand, _: &mut Decoder<'_>) -> Result<(), ValueError> {
        let lit = literal(value, "bool")?;
        if lit.kind != LitKind::Bool {
            return Err(mismatch(value, "bool"));
        }
        *self = lit.value == "true";
        Ok(())
    }
}

/// Convert an integer-like literal at the width of `T`. Sizes and durations
/// are only accepted where the target allows them.
fn integer<T: TryFrom<i128>>(
    value: &Operand,
    type_name: &'static str,
    sizes: bool,
    durations: bool,
) -> Result<T, ValueError> {
    let lit = literal(value, type_name)?;

    let wide = match lit.kind {
        LitKind::Int => lit
            .value
            .parse::<i128>()
            .map_err(|_| out_of_range(lit, type_name))?,
        LitKind::Size if sizes => parse_size(&lit.value).map_err(|source| ValueError::Literal {
            pos: lit.pos.clone(),
            source,
        })?,
        LitKind::Duration if durations => {
            parse_duration(&lit.value).map_err(|source| ValueError::Literal {
                pos: lit.pos.clone(),
                source,
            })?
        }
        _ => return Err(mismatch(value, type_name)),
    };

    T::try_from(wide).map_err(|_| out_of_range(lit, type_name))
}

macro_rules! impl_decode_int {
    ($($ty:ty => sizes: $sizes:expr, durations: $durations:expr;)*) => {
        $(
            impl Decode for $ty {
                fn describe() -> Cow<'static, str> {
                    Cow::Borrowed(stringify!($ty))
                }

                fn decode(&mut self, value: &Operand, _: &mut Decoder<'_>) -> Result<(), ValueError> {
                    *self = integer(value, stringify!($ty), $sizes, $durations)?;
                    Ok(())
                }
            }
        )*
    };
}

impl_decode_int! {
    i8 => sizes: false, durations: false;
    i16 => sizes: false, durations: false;
    i32 => sizes: false, durations: false;
    i64 => sizes: true, durations: true;
    isize => sizes: false, durations: false;
    u8 => sizes: false, durations: false;
    u16 => sizes: false, durations: false;
    u32 => sizes: false, durations: false;
    u64 => sizes: true, durations: false;
    usize => sizes: false, durations: false;
}

macro_rules! impl_decode_float {
    ($($ty:ty),*) => {
        $(
            impl Decode for $ty {
                fn describe() -> Cow<'static, str> {
                    Cow::Borrowed(stringify!($ty))
                }

                fn decode(&mut self, value: &Operand, _: &mut Decoder<'_>) -> Result<(), ValueError> {
                    let lit = literal(value, stringify!($ty))?;
                    if lit.kind != LitKind::Float {
                        return Err(mismatch(value, stringify!($ty)));
                    }
                    let parsed: $ty = lit
                        .value
                        .parse()
                        .map_err(|_| out_of_range(lit, stringify!($ty)))?;
                    if !parsed.is_finite() {
                        return Err(out_of_range(lit, stringify!($ty)));
                    }
                    *self = parsed;
                    Ok(())
                }
            }
        )*
    };
}

impl_decode_float!(f32, f64);

impl Decode for Duration {
    fn describe() -> Cow<'static, str> {
        Cow::Borrowed("Duration")
    }

    fn decode(&mut self, value: &Operand, _: &mut Decoder<'_>) -> Result<(), ValueError> {
        let lit = literal(value, "Duration")?;
        if lit.kind != LitKind::Duration {
            return Err(mismatch(value, "Duration"));
        }
        let nanos = parse_duration(&lit.value).map_err(|source| ValueError::Literal {
            pos: lit.pos.clone(),
            source,
        })?;
        let nanos = u64::try_from(nanos).map_err(|_| out_of_range(lit, "Duration"))?;
        *self = Duration::from_nanos(nanos);
        Ok(())
    }
}

// ============================================================================
// CONTAINERS
// ============================================================================

impl<T: Decode + Default> Decode for Vec<T> {
    fn describe() -> Cow<'static, str> {
        Cow::Owned(format!("Vec<{}>", T::describe()))
    }

    fn decode(&mut self, value: &Operand, d: &mut Decoder<'_>) -> Result<(), ValueError> {
        let Operand::Array(array) = value else {
            return Err(mismatch(value, Self::describe()));
        };

        let mut items = Vec::with_capacity(array.items.len());
        for item in &array.items {
            let mut element = T::default();
            element.decode(item, d)?;
            items.push(element);
        }
        *self = items;
        Ok(())
    }
}

impl<T: Decode + Default> Decode for Option<T> {
    fn describe() -> Cow<'static, str> {
        Cow::Owned(format!("Option<{}>", T::describe()))
    }

    fn decode(&mut self, value: &Operand, d: &mut Decoder<'_>) -> Result<(), ValueError> {
        let mut inner = T::default();
        inner.decode(value, d)?;
        *self = Some(inner);
        Ok(())
    }

    /// Stays `None` unless `T` is record shaped.
    fn as_record(&mut self) -> Option<&mut dyn RecordValue> {
        if self.is_none() && T::default().as_record().is_none() {
            return None;
        }
        self.get_or_insert_with(T::default).as_record()
    }

    /// Stays `None` unless `T` is a map.
    fn as_labels(&mut self) -> Option<&mut dyn Labels> {
        if self.is_none() && T::default().as_labels().is_none() {
            return None;
        }
        self.get_or_insert_with(T::default).as_labels()
    }
}

macro_rules! impl_decode_map {
    ($($map:ident),*) => {
        $(
            impl<V: Decode + Default> Decode for $map<String, V> {
                fn describe() -> Cow<'static, str> {
                    Cow::Owned(format!("{}<String, {}>", stringify!($map), V::describe()))
                }

                /// A block decodes into a map keyed by its parameter names.
                fn decode(&mut self, value: &Operand, d: &mut Decoder<'_>) -> Result<(), ValueError> {
                    let Operand::Block(block) = value else {
                        return Err(mismatch(value, Self::describe()));
                    };

                    let mut map = $map::new();
                    for param in &block.params {
                        let mut element = V::default();
                        element.decode(&param.value, d)?;
                        map.insert(param.name.value.clone(), element);
                    }
                    *self = map;
                    Ok(())
                }

                fn as_labels(&mut self) -> Option<&mut dyn Labels> {
                    Some(self)
                }
            }

            impl<V: Decode + Default> Labels for $map<String, V> {
                fn decode_labeled(
                    &mut self,
                    label: &str,
                    value: &Operand,
                    d: &mut Decoder<'_>,
                ) -> Result<(), ValueError> {
                    let mut element = V::default();
                    element.decode(value, d)?;
                    self.insert(label.to_string(), element);
                    Ok(())
                }
            }
        )*
    };
}

impl_decode_map!(HashMap, BTreeMap);
