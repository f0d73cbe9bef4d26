use crate::resolve::PredicateTable;
use crate::types::{Assignment, CancelToken, CompiledRule, MatchError, Step};

/// Resolve a batch: for each row, the first rule (in priority order) whose
/// present slots all evaluate true wins. Rows are independent; the cancel
/// token, when given, is checked between rows.
pub(crate) fn assign(
    rules: &[CompiledRule],
    table: &PredicateTable,
    row_count: usize,
    cancel: Option<&CancelToken>,
) -> Result<Vec<Assignment>, MatchError> {
    let mut assignments = Vec::with_capacity(row_count);
    let mut stack: Vec<bool> = Vec::new();

    for row in 0..row_count {
        if let Some(token) = cancel {
            if token.is_cancelled() {
                return Err(MatchError::Cancelled);
            }
        }
        assignments.push(assign_row(rules, table, row, &mut stack)?);
    }

    Ok(assignments)
}

fn assign_row(
    rules: &[CompiledRule],
    table: &PredicateTable,
    row: usize,
    stack: &mut Vec<bool>,
) -> Result<Assignment, MatchError> {
    for rule in rules {
        if !rule.matchable {
            continue;
        }
        if rule_matches(rule, table, row, stack)? {
            return Ok(Assignment::Rule(rule.id.clone()));
        }
    }
    Ok(Assignment::Unassigned)
}

fn rule_matches(
    rule: &CompiledRule,
    table: &PredicateTable,
    row: usize,
    stack: &mut Vec<bool>,
) -> Result<bool, MatchError> {
    for slot in &rule.slots {
        match eval_program(&slot.program, table, row, stack) {
            Some(true) => {}
            Some(false) => return Ok(false),
            None => {
                return Err(MatchError::InvariantViolation {
                    rule_id: rule.id.clone(),
                    field: slot.field.clone(),
                });
            }
        }
    }
    Ok(true)
}

/// Stack evaluation of one compiled program. Returns `None` only for a
/// structurally invalid program, which parse-time validation rules out for
/// anything the compiler produced.
fn eval_program(
    program: &[Step],
    table: &PredicateTable,
    row: usize,
    stack: &mut Vec<bool>,
) -> Option<bool> {
    stack.clear();
    for step in program {
        match step {
            Step::Load(slot) => stack.push(table.is_satisfied(*slot, row)?),
            Step::Not => {
                let a = stack.pop()?;
                stack.push(!a);
            }
            Step::And => {
                let b = stack.pop()?;
                let a = stack.pop()?;
                stack.push(a && b);
            }
            Step::Or => {
                let b = stack.pop()?;
                let a = stack.pop()?;
                stack.push(a || b);
            }
        }
    }
    if stack.len() == 1 { stack.pop() } else { None }
}
