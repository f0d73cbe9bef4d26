mod error;
mod lexer;
mod shunting;

pub use error::ExprError;

use crate::types::RpnToken;

/// Parse one infix expression string into a flat RPN sequence.
///
/// Returns `Ok(None)` when the input tokenizes to nothing (whitespace or
/// empty), which callers treat as an absent slot.
///
/// # Errors
///
/// Returns [`ExprError`] if the expression is not structurally valid.
pub(crate) fn parse_expression(input: &str) -> Result<Option<Vec<RpnToken>>, ExprError> {
    let tokens = lexer::tokenize(input);
    if tokens.is_empty() {
        return Ok(None);
    }
    shunting::to_rpn(tokens).map(Some)
}
