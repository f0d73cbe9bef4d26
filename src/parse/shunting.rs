use super::error::ExprError;
use super::lexer::{Op, Token};
use crate::types::RpnToken;

/// What sits on the operator stack while converting to RPN.
enum StackEntry {
    Op(Op),
    LParen,
}

/// Convert an infix token sequence to RPN with the shunting-yard algorithm,
/// then validate operator arity so evaluation can never underflow its stack.
pub(crate) fn to_rpn(tokens: Vec<Token>) -> Result<Vec<RpnToken>, ExprError> {
    let mut output: Vec<RpnToken> = Vec::with_capacity(tokens.len());
    let mut stack: Vec<StackEntry> = Vec::new();

    for token in tokens {
        match token {
            Token::Term(term) => output.push(RpnToken::Term(term)),
            Token::Op(op) => {
                while let Some(StackEntry::Op(top)) = stack.last() {
                    let pops = top.precedence() > op.precedence()
                        || (top.precedence() == op.precedence() && op.is_left_associative());
                    if !pops {
                        break;
                    }
                    output.push(rpn_op(*top));
                    stack.pop();
                }
                stack.push(StackEntry::Op(op));
            }
            Token::LParen => stack.push(StackEntry::LParen),
            Token::RParen => loop {
                match stack.pop() {
                    Some(StackEntry::Op(op)) => output.push(rpn_op(op)),
                    Some(StackEntry::LParen) => break,
                    None => return Err(ExprError::UnbalancedParentheses),
                }
            },
        }
    }

    while let Some(entry) = stack.pop() {
        match entry {
            StackEntry::Op(op) => output.push(rpn_op(op)),
            StackEntry::LParen => return Err(ExprError::UnbalancedParentheses),
        }
    }

    validate(&output)?;
    Ok(output)
}

fn rpn_op(op: Op) -> RpnToken {
    match op {
        Op::Not => RpnToken::Not,
        Op::And => RpnToken::And,
        Op::Or => RpnToken::Or,
    }
}

/// Simulate stack depth over the RPN sequence once, at parse time. A valid
/// sequence leaves exactly one value. Callers only reach this with a
/// non-empty token sequence, so an empty output (e.g. `"()"`) is malformed
/// rather than an absent slot.
fn validate(rpn: &[RpnToken]) -> Result<(), ExprError> {
    if rpn.is_empty() {
        return Err(malformed("expression has no terms"));
    }

    let mut depth: usize = 0;
    for step in rpn {
        match step {
            RpnToken::Term(_) => depth += 1,
            RpnToken::Not => {
                if depth < 1 {
                    return Err(malformed("operator NOT is missing its operand"));
                }
            }
            RpnToken::And => {
                if depth < 2 {
                    return Err(malformed("operator AND is missing an operand"));
                }
                depth -= 1;
            }
            RpnToken::Or => {
                if depth < 2 {
                    return Err(malformed("operator OR is missing an operand"));
                }
                depth -= 1;
            }
        }
    }

    if depth == 1 {
        Ok(())
    } else {
        Err(malformed(format!(
            "{depth} values remain after evaluation"
        )))
    }
}

fn malformed(reason: impl Into<String>) -> ExprError {
    ExprError::MalformedExpression {
        reason: reason.into(),
    }
}
