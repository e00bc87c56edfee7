use crate::context::EvalContext;
use crate::errors::{FormulaError, Result};
use crate::expression::{self, Expr};
use crate::functions::Registry;
use crate::scanner::{scan, Segment};
use std::collections::BTreeSet;
use tracing::debug;

/// =========================
/// Public API (Substitution)
/// =========================

/// Replace every `{=expression}` placeholder in `text` with its evaluated
/// numeric result. Strict mode: the first failing placeholder aborts the
/// whole call, so callers never receive partially substituted output.
///
/// Text without placeholders is returned unchanged; plain `{name}` wildcard
/// references are literal text here (see [`replace_wildcards`]).
pub fn substitute(text: &str, ctx: &EvalContext, registry: &Registry) -> Result<String> {
    let mut out = String::with_capacity(text.len());
    let mut substituted = 0usize;
    for segment in scan(text) {
        match segment {
            Segment::Literal(s) | Segment::Unterminated(s) => out.push_str(s),
            Segment::Expression(raw) => {
                let value = evaluate_expression(raw, ctx, registry)?;
                out.push_str(&value.to_string());
                substituted += 1;
            }
        }
    }
    debug!(placeholders = substituted, "substituted text");
    Ok(out)
}

/// Preview/comment mode: a failing placeholder is replaced in place by its
/// error message (an empty `{=}` renders as the empty string) and the rest
/// of the text is still processed.
pub fn substitute_lenient(text: &str, ctx: &EvalContext, registry: &Registry) -> String {
    let mut out = String::with_capacity(text.len());
    for segment in scan(text) {
        match segment {
            Segment::Literal(s) | Segment::Unterminated(s) => out.push_str(s),
            Segment::Expression("") => {}
            Segment::Expression(raw) => match evaluate_expression(raw, ctx, registry) {
                Ok(value) => out.push_str(&value.to_string()),
                Err(e) => out.push_str(&e.to_string()),
            },
        }
    }
    out
}

/// Replace each bound `{name}` wildcard reference with its numeric value.
/// Unbound references are left intact. Hosts run this before [`substitute`]
/// so that formulas like `{={x}+1}` become `{=5+1}` ahead of the scan.
pub fn replace_wildcards(text: &str, ctx: &EvalContext) -> String {
    let mut out = text.to_string();
    for (name, value) in ctx.iter() {
        out = out.replace(&format!("{{{name}}}"), &value.to_string());
    }
    out
}

/// =========================
/// Public API (Validation)
/// =========================

/// Statically check every placeholder in `text` without evaluating anything.
/// Returns the first error found in each offending placeholder, in text
/// order; an unterminated `{=` is reported as [`FormulaError::MalformedPlaceholder`].
pub fn validate(text: &str, registry: &Registry) -> std::result::Result<(), Vec<FormulaError>> {
    validate_inner(text, registry, None)
}

/// Like [`validate`], additionally rejecting wildcard names outside
/// `allowed`. Used before wildcard substitution, when raw names are still
/// present in the expressions.
pub fn validate_with_wildcards(
    text: &str,
    registry: &Registry,
    allowed: &BTreeSet<String>,
) -> std::result::Result<(), Vec<FormulaError>> {
    validate_inner(text, registry, Some(allowed))
}

fn validate_inner(
    text: &str,
    registry: &Registry,
    allowed: Option<&BTreeSet<String>>,
) -> std::result::Result<(), Vec<FormulaError>> {
    let mut errors = Vec::new();
    for segment in scan(text) {
        match segment {
            Segment::Literal(_) => {}
            Segment::Unterminated(_) => errors.push(FormulaError::MalformedPlaceholder),
            Segment::Expression(raw) => {
                if let Err(e) = validate_expression(raw, registry, allowed) {
                    errors.push(e);
                }
            }
        }
    }
    debug!(errors = errors.len(), "validated text");
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// =========================
/// Public API (Expressions)
/// =========================

/// Statically check a single expression body (the text between `{=` and `}`).
pub fn validate_expression(
    raw: &str,
    registry: &Registry,
    allowed: Option<&BTreeSet<String>>,
) -> Result<()> {
    let node = parse(raw)?;
    expression::validate_ast(raw, &node, registry, allowed)
}

/// Evaluate a single expression body against a context.
pub fn evaluate_expression(raw: &str, ctx: &EvalContext, registry: &Registry) -> Result<f64> {
    let node = parse(raw)?;
    expression::validate_ast(raw, &node, registry, None)?;
    expression::eval_ast(&node, ctx, registry)
}

fn parse(raw: &str) -> Result<Expr> {
    expression::parse_expr(raw).map_err(|e| match e {
        crate::parser::ParseError::InvalidSyntax(reason) => FormulaError::invalid(raw, reason),
    })
}
