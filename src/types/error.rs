use thiserror::Error;

use crate::parse::ExprError;

/// A single rule expression that failed to compile, with its origin.
#[derive(Debug, Error)]
#[error("rule '{rule_id}' field '{field}': {cause}")]
pub struct RuleCompileError {
    pub rule_id: String,
    pub field: String,
    pub cause: ExprError,
}

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("duplicate rule id '{id}'")]
    DuplicateRuleId { id: String },

    #[error("{} rule expression(s) failed to compile", errors.len())]
    Rejected { errors: Vec<RuleCompileError> },
}

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("match run cancelled")]
    Cancelled,

    #[error("evaluation invariant violated in rule '{rule_id}' field '{field}'")]
    InvariantViolation { rule_id: String, field: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_compile_error_message() {
        let err = RuleCompileError {
            rule_id: "101".into(),
            field: "f1".into(),
            cause: ExprError::UnbalancedParentheses,
        };
        assert_eq!(
            err.to_string(),
            "rule '101' field 'f1': unbalanced parentheses"
        );
    }

    #[test]
    fn duplicate_rule_id_message() {
        let err = CompileError::DuplicateRuleId { id: "101".into() };
        assert_eq!(err.to_string(), "duplicate rule id '101'");
    }

    #[test]
    fn rejected_message_counts_errors() {
        let err = CompileError::Rejected {
            errors: vec![
                RuleCompileError {
                    rule_id: "101".into(),
                    field: "f1".into(),
                    cause: ExprError::UnbalancedParentheses,
                },
                RuleCompileError {
                    rule_id: "102".into(),
                    field: "f2".into(),
                    cause: ExprError::MalformedExpression {
                        reason: "operator NOT is missing its operand".into(),
                    },
                },
            ],
        };
        assert_eq!(err.to_string(), "2 rule expression(s) failed to compile");
    }

    #[test]
    fn invariant_violation_message() {
        let err = MatchError::InvariantViolation {
            rule_id: "101".into(),
            field: "f1".into(),
        };
        assert_eq!(
            err.to_string(),
            "evaluation invariant violated in rule '101' field 'f1'"
        );
    }

    #[test]
    fn cancelled_message() {
        assert_eq!(MatchError::Cancelled.to_string(), "match run cancelled");
    }
}
