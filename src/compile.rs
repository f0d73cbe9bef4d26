use std::collections::HashSet;

use tracing::{debug, warn};

use crate::parse::{self, ExprError};
use crate::types::{
    AbsentSlotPolicy, CompileError, CompileErrorPolicy, CompiledRule, CompiledSlot, MatchConfig,
    NormalizeFn, PredicateMode, Program, RpnToken, RuleCompileError, RuleDef, RuleSet, Step,
    TermRegistry,
};

pub(crate) fn compile(
    defs: Vec<RuleDef>,
    config: MatchConfig,
    normalize: NormalizeFn,
) -> Result<RuleSet, CompileError> {
    check_duplicates(&defs)?;

    let mut terms = TermRegistry::new();
    let mut rules: Vec<CompiledRule> = Vec::with_capacity(defs.len());
    let mut errors: Vec<RuleCompileError> = Vec::new();

    for def in &defs {
        if let Some(rule) = compile_rule(def, config, &mut terms, &normalize, &mut errors) {
            rules.push(rule);
        }
    }

    if !errors.is_empty() {
        match config.on_compile_error {
            CompileErrorPolicy::Abort => return Err(CompileError::Rejected { errors }),
            CompileErrorPolicy::DropInvalid => {
                for err in &errors {
                    warn!(error = %err, "dropping rule that failed to compile");
                }
            }
        }
    }

    debug!(
        rules = rules.len(),
        terms = terms.len(),
        "compiled rule set"
    );

    Ok(RuleSet {
        rules,
        terms,
        config,
        normalize,
        rejected: errors,
    })
}

fn check_duplicates(defs: &[RuleDef]) -> Result<(), CompileError> {
    let mut seen = HashSet::new();
    for def in defs {
        if !seen.insert(def.id.as_str()) {
            return Err(CompileError::DuplicateRuleId {
                id: def.id.clone(),
            });
        }
    }
    Ok(())
}

/// Compile one rule's slots. Every failing slot is recorded in `errors`
/// before giving up on the rule, so the caller reports the full set of
/// problems in one pass.
fn compile_rule(
    def: &RuleDef,
    config: MatchConfig,
    terms: &mut TermRegistry,
    normalize: &NormalizeFn,
    errors: &mut Vec<RuleCompileError>,
) -> Option<CompiledRule> {
    let errors_before = errors.len();
    let mut slots: Vec<CompiledSlot> = Vec::with_capacity(def.slots.len());
    let mut absent = 0usize;

    for slot in &def.slots {
        let Some(expr) = slot.expr.as_deref() else {
            absent += 1;
            continue;
        };
        match parse::parse_expression(expr) {
            Ok(None) => absent += 1,
            Ok(Some(rpn)) => {
                match lower(rpn, &slot.field, config.predicate_mode, terms, normalize) {
                    Ok(program) => slots.push(CompiledSlot {
                        field: slot.field.clone(),
                        program,
                    }),
                    Err(cause) => errors.push(RuleCompileError {
                        rule_id: def.id.clone(),
                        field: slot.field.clone(),
                        cause,
                    }),
                }
            }
            Err(cause) => errors.push(RuleCompileError {
                rule_id: def.id.clone(),
                field: slot.field.clone(),
                cause,
            }),
        }
    }

    if errors.len() > errors_before {
        return None;
    }

    let matchable = !slots.is_empty()
        && !(config.absent_slots == AbsentSlotPolicy::SkipRule && absent > 0);

    Some(CompiledRule {
        id: def.id.clone(),
        slots,
        matchable,
    })
}

/// Lower a parsed RPN sequence to a compiled program, registering each
/// normalized term with the shared registry.
fn lower(
    rpn: Vec<RpnToken>,
    field: &str,
    mode: PredicateMode,
    terms: &mut TermRegistry,
    normalize: &NormalizeFn,
) -> Result<Program, ExprError> {
    rpn.into_iter()
        .map(|token| {
            Ok(match token {
                RpnToken::Term(term) => {
                    Step::Load(terms.register(field, &normalize(&term), mode)?)
                }
                RpnToken::Not => Step::Not,
                RpnToken::And => Step::And,
                RpnToken::Or => Step::Or,
            })
        })
        .collect()
}
