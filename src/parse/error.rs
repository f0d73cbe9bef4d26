use thiserror::Error;

/// Errors produced when parsing a slot expression.
#[derive(Debug, Error)]
pub enum ExprError {
    #[error("unbalanced parentheses")]
    UnbalancedParentheses,

    #[error("malformed expression: {reason}")]
    MalformedExpression { reason: String },

    #[error("invalid term pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}
