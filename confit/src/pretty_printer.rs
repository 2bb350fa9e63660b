//! Canonical printer for parsed configuration
//! Generates deterministic source text for round-trip testing

use crate::lexer::LitKind;
use crate::parser::*;

const INDENT: &str = "    ";

/// Render parameters back to configuration source.
///
/// Output uses one parameter per line, four-space indentation and inline
/// arrays. Parsing the output yields the same tree (positions aside).
pub fn pretty_print(params: &[Parameter]) -> String {
    let mut out = String::new();
    write_params(&mut out, params, 0);
    out
}

fn write_params(out: &mut String, params: &[Parameter], depth: usize) {
    for param in params {
        indent(out, depth);
        out.push_str(&param.name.value);
        if let Some(label) = &param.label {
            out.push(' ');
            out.push_str(&label.value);
        }
        out.push(' ');
        write_operand(out, &param.value, depth);
        out.push('\n');
    }
}

fn write_operand(out: &mut String, operand: &Operand, depth: usize) {
    match operand {
        Operand::Literal(lit) => write_literal(out, lit),
        Operand::Block(block) => {
            if block.params.is_empty() {
                out.push_str("{}");
                return;
            }
            out.push_str("{\n");
            write_params(out, &block.params, depth + 1);
            indent(out, depth);
            out.push('}');
        }
        Operand::Array(array) => {
            out.push('[');
            for (i, item) in array.items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_operand(out, item, depth);
            }
            out.push(']');
        }
    }
}

fn write_literal(out: &mut String, lit: &Literal) {
    // The raw text keeps its escapes, so quoting it is enough.
    if lit.kind == LitKind::String {
        out.push('"');
        out.push_str(&lit.value);
        out.push('"');
    } else {
        out.push_str(&lit.value);
    }
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}
