//! confit - a small block-structured configuration language
//!
//! This crate provides the scanner, the recursive-descent parser and a
//! decoder that maps parsed configuration onto statically typed records.
//!
//! Architecture:
//! ```text
//! Source text (.conf files)
//!     ↓
//! Scanner (tokens, automatic terminators, typed literal suffixes)
//!     ↓
//! Parser (parameters, blocks, arrays, labels, includes)
//!     ↓
//! Decoder (field tables, labels, nogroup, interpolation)
//!     ↓
//! Your record type
//! ```
//!
//! ```
//! use std::collections::HashMap;
//!
//! #[derive(Debug, Default)]
//! struct Auth {
//!     addr: String,
//! }
//!
//! #[derive(Debug, Default)]
//! struct Server {
//!     listen: String,
//!     timeout: i64,
//!     auth: HashMap<String, Auth>,
//! }
//!
//! confit::record! {
//!     Auth { addr }
//!     Server { listen, timeout, auth }
//! }
//!
//! let source = r#"
//! listen "localhost:443"
//! timeout 1h30m
//!
//! auth internal {
//!     addr "localhost:8080"
//! }
//! "#;
//!
//! let mut server = Server::default();
//! confit::Decoder::new("server.conf")
//!     .decode(&mut server, source)
//!     .unwrap();
//!
//! assert_eq!(server.timeout, 5_400_000_000_000);
//! assert_eq!(server.auth["internal"].addr, "localhost:8080");
//! ```

pub mod decode;
pub mod diagnostics;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod pretty_printer;

// Re-export key types for convenience
pub use decode::*;
pub use diagnostics::{stderr_handler, Diagnostics, ErrorHandler};
pub use error::{DecodeError, Error, ValueError};
pub use lexer::{LitKind, Pos, Scanner, Token, TokenKind};
pub use parser::{
    parse, Array, Block, IncludeRegistry, Literal, Name, Node, Operand, Parameter, Parser,
};
pub use pretty_printer::pretty_print;

#[doc(hidden)]
pub mod __private {
    pub use once_cell::sync::OnceCell;
}

/// Implement [`Record`] and [`Decode`] for one or more structs.
///
/// Each field is listed by identifier, optionally followed by a tag string
/// `"name,deprecated:replacement,nogroup"`. A tag of `"-"` excludes the
/// field; fields not listed are never decoded.
///
/// ```
/// #[derive(Default)]
/// struct Tls {
///     cert: String,
/// }
///
/// #[derive(Default)]
/// struct Net {
///     listen: String,
///     tls: Tls,
///     ssl: Tls,
/// }
///
/// confit::record! {
///     Tls { cert }
///     Net {
///         listen,
///         tls,
///         ssl: "ssl,deprecated:tls",
///     }
/// }
/// ```
#[macro_export]
macro_rules! record {
    ($($ty:ty { $($field:ident $(: $tag:literal)?),* $(,)? })*) => {
        $(
            impl $crate::Record for $ty {
                fn schema() -> &'static $crate::Schema<Self> {
                    static SCHEMA: $crate::__private::OnceCell<$crate::Schema<$ty>> =
                        $crate::__private::OnceCell::new();

                    SCHEMA.get_or_init(|| {
                        $crate::Schema::<$ty>::builder()
                            $(
                                .field(
                                    ::core::stringify!($field),
                                    ::core::concat!("" $(, $tag)?),
                                    |r: &mut $ty| &mut r.$field,
                                )
                            )*
                            .build()
                    })
                }
            }

            impl $crate::Decode for $ty {
                fn describe() -> ::std::borrow::Cow<'static, str> {
                    ::std::borrow::Cow::Borrowed(::core::stringify!($ty))
                }

                fn decode(
                    &mut self,
                    value: &$crate::Operand,
                    d: &mut $crate::Decoder<'_>,
                ) -> ::core::result::Result<(), $crate::ValueError> {
                    $crate::decode_record(self, value, d)
                }

                fn as_record(&mut self) -> ::core::option::Option<&mut dyn $crate::RecordValue> {
                    ::core::option::Option::Some(self)
                }
            }
        )*
    };
}
