pub mod context;
pub mod engine; // substitution driver orchestrating scan → validate → eval
pub mod errors;
pub mod functions; // plugin model
pub mod scanner;
mod expression;
mod parser;

use std::collections::BTreeSet;

pub use context::EvalContext;
pub use engine::{evaluate_expression, replace_wildcards, validate_expression};
pub use errors::{FormulaError, Result};
pub use functions::Registry;
pub use scanner::{scan, Segment};

/// The formula-placeholder engine. Holds the function allow-list; every call
/// receives its own read-only context, so one `Engine` is safely shared
/// across threads.
pub struct Engine {
    registry: Registry,
}

impl Engine {
    pub fn new(registry: Registry) -> Self {
        Self { registry }
    }

    /// Engine with the calculated question type's builtin function set.
    pub fn with_builtins() -> Self {
        Self::new(Registry::with_builtins())
    }

    /// Statically check every `{=...}` placeholder in `text`; one error per
    /// offending placeholder, in text order.
    pub fn validate(&self, text: &str) -> std::result::Result<(), Vec<FormulaError>> {
        engine::validate(text, &self.registry)
    }

    /// Like [`Engine::validate`], additionally rejecting wildcard names not
    /// in `allowed` (the pre-substitution call pattern).
    pub fn validate_with_wildcards(
        &self,
        text: &str,
        allowed: &BTreeSet<String>,
    ) -> std::result::Result<(), Vec<FormulaError>> {
        engine::validate_with_wildcards(text, &self.registry, allowed)
    }

    /// Strict substitution: the first failing placeholder aborts the call.
    pub fn substitute(&self, text: &str, ctx: &EvalContext) -> Result<String> {
        engine::substitute(text, ctx, &self.registry)
    }

    /// Lenient substitution for previews and comments: errors are spliced
    /// in place and the rest of the text is still processed.
    pub fn substitute_lenient(&self, text: &str, ctx: &EvalContext) -> String {
        engine::substitute_lenient(text, ctx, &self.registry)
    }
}

/// Convenience: validate with the builtin function set.
pub fn validate(text: &str) -> std::result::Result<(), Vec<FormulaError>> {
    Engine::with_builtins().validate(text)
}

/// Convenience: strict substitution with the builtin function set.
pub fn substitute(text: &str, ctx: &EvalContext) -> Result<String> {
    Engine::with_builtins().substitute(text, ctx)
}

/// Convenience: lenient substitution with the builtin function set.
pub fn substitute_lenient(text: &str, ctx: &EvalContext) -> String {
    Engine::with_builtins().substitute_lenient(text, ctx)
}
