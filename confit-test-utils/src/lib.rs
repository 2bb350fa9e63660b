//! confit Test Utilities
//!
//! Shared test infrastructure for the confit workspace:
//! - Proptest generators for AST values
//! - A diagnostics collector for asserting on reported errors
//! - Fixture paths and position stripping for AST comparisons

pub use confit::{
    Array, Block, Decoder, LitKind, Literal, Name, Operand, Parameter, Pos,
};

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

// ============================================================================
// DIAGNOSTICS COLLECTOR
// ============================================================================

/// Collects every diagnostic as `name:line:col - message`.
///
/// Clones share the same buffer, so a handler can be handed to a decoder
/// while the test keeps the collector.
#[derive(Debug, Clone, Default)]
pub struct Collector {
    messages: Rc<RefCell<Vec<String>>>,
}

impl Collector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handler to install on a `Decoder` or `Diagnostics`.
    pub fn handler(&self) -> impl FnMut(&Pos, &str) + 'static {
        let messages = Rc::clone(&self.messages);
        move |pos: &Pos, msg: &str| messages.borrow_mut().push(format!("{} - {}", pos, msg))
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.borrow().is_empty()
    }

    /// Whether any message contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.messages.borrow().iter().any(|m| m.contains(needle))
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

/// Directory holding the `.conf` fixtures used by the integration tests.
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("confit")
        .join("tests")
        .join("fixtures")
}

/// Path of the fixture `name`.
pub fn fixture(name: &str) -> PathBuf {
    fixtures_dir().join(name)
}

/// Reset every position in `params`, so trees parsed from different text
/// compare equal.
pub fn strip_positions(params: &[Parameter]) -> Vec<Parameter> {
    params.iter().map(strip_param).collect()
}

fn strip_param(param: &Parameter) -> Parameter {
    Parameter {
        pos: Pos::default(),
        name: Name::new(param.name.value.clone(), Pos::default()),
        label: param
            .label
            .as_ref()
            .map(|label| Name::new(label.value.clone(), Pos::default())),
        value: strip_operand(&param.value),
    }
}

fn strip_operand(operand: &Operand) -> Operand {
    match operand {
        Operand::Literal(lit) => Operand::Literal(Literal::new(lit.value.clone(), lit.kind, Pos::default())),
        Operand::Block(block) => Operand::Block(Block {
            pos: Pos::default(),
            params: strip_positions(&block.params),
        }),
        Operand::Array(array) => Operand::Array(Array {
            pos: Pos::default(),
            items: array.items.iter().map(strip_operand).collect(),
        }),
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for generating confit AST values.

    use super::*;
    use proptest::collection::vec;
    use proptest::prelude::*;

    /// Identifiers that parse as parameter names or labels.
    pub fn arb_name() -> impl Strategy<Value = String> {
        "[a-z_][a-z0-9_]{0,8}".prop_filter("reserved word", |s| {
            !matches!(s.as_str(), "true" | "false" | "include")
        })
    }

    pub fn arb_string_literal() -> impl Strategy<Value = Literal> {
        "[a-zA-Z0-9 _./:-]{0,16}".prop_map(|s| Literal::new(s, LitKind::String, Pos::default()))
    }

    pub fn arb_int_literal() -> impl Strategy<Value = Literal> {
        any::<i64>().prop_map(|n| Literal::new(n.to_string(), LitKind::Int, Pos::default()))
    }

    pub fn arb_float_literal() -> impl Strategy<Value = Literal> {
        (-10_000i32..10_000, 0u32..1000).prop_map(|(whole, frac)| {
            Literal::new(format!("{}.{}", whole, frac), LitKind::Float, Pos::default())
        })
    }

    pub fn arb_bool_literal() -> impl Strategy<Value = Literal> {
        any::<bool>().prop_map(|b| Literal::new(b.to_string(), LitKind::Bool, Pos::default()))
    }

    /// Durations with one to three `<number><unit>` segments.
    pub fn arb_duration_literal() -> impl Strategy<Value = Literal> {
        let segment = (
            0u32..1000,
            prop::sample::select(vec!["ns", "us", "ms", "s", "m", "h", "d"]),
        )
            .prop_map(|(n, unit)| format!("{}{}", n, unit));

        vec(segment, 1..4)
            .prop_map(|segments| Literal::new(segments.concat(), LitKind::Duration, Pos::default()))
    }

    pub fn arb_size_literal() -> impl Strategy<Value = Literal> {
        (
            0u32..4096,
            prop::sample::select(vec!["B", "KB", "MB", "GB", "TB", "PB", "EB", "ZB"]),
        )
            .prop_map(|(n, unit)| {
                Literal::new(format!("{}{}", n, unit), LitKind::Size, Pos::default())
            })
    }

    pub fn arb_literal() -> impl Strategy<Value = Literal> {
        prop_oneof![
            arb_string_literal(),
            arb_int_literal(),
            arb_float_literal(),
            arb_bool_literal(),
            arb_duration_literal(),
            arb_size_literal(),
        ]
    }

    /// Operands nested up to three levels deep.
    pub fn arb_operand() -> impl Strategy<Value = Operand> {
        let leaf = arb_literal().prop_map(Operand::Literal);

        leaf.prop_recursive(3, 32, 4, |inner| {
            prop_oneof![
                vec(inner.clone(), 0..4).prop_map(|items| Operand::Array(Array {
                    pos: Pos::default(),
                    items,
                })),
                vec(param_with(inner), 0..4).prop_map(|params| Operand::Block(Block {
                    pos: Pos::default(),
                    params,
                })),
            ]
        })
    }

    fn param_with(
        operand: impl Strategy<Value = Operand>,
    ) -> impl Strategy<Value = Parameter> {
        (arb_name(), proptest::option::of(arb_name()), operand).prop_map(|(name, label, value)| {
            Parameter {
                pos: Pos::default(),
                name: Name::new(name, Pos::default()),
                label: label.map(|l| Name::new(l, Pos::default())),
                value,
            }
        })
    }

    pub fn arb_parameter() -> impl Strategy<Value = Parameter> {
        param_with(arb_operand())
    }

    /// A whole configuration file.
    pub fn arb_params() -> impl Strategy<Value = Vec<Parameter>> {
        vec(arb_parameter(), 0..8)
    }

    /// Arbitrary text biased towards the characters the scanner cares about.
    pub fn arb_source_text() -> impl Strategy<Value = String> {
        prop_oneof![
            any::<String>(),
            "[a-z0-9 \\t\\n;,{}\\[\\]\"#\\\\.$:KMGTBsmhd-]{0,64}",
        ]
    }
}
