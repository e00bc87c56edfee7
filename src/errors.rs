use thiserror::Error;

/// Errors produced while scanning, validating, or evaluating formula
/// placeholders.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    /// A `{=` whose body runs to the end of the text without a closing `}`.
    #[error("malformed placeholder: '{{=' without a closing '}}'")]
    MalformedPlaceholder,

    /// The expression failed the static check; carries the offending
    /// expression text and the first problem found in it.
    #[error("invalid expression '{expr}': {reason}")]
    InvalidExpression { expr: String, reason: String },

    /// A wildcard name with no binding in the evaluation context.
    #[error("unbound variable '{0}'")]
    UnboundVariable(String),

    #[error("division by zero")]
    DivisionByZero,
}

impl FormulaError {
    pub(crate) fn invalid(expr: impl Into<String>, reason: impl Into<String>) -> Self {
        FormulaError::InvalidExpression {
            expr: expr.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FormulaError>;
