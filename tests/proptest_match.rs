
use proptest::prelude::*;
use strategies::{arb_expr, arb_presence, row_for, ExprTree};
use tagmatch::{Assignment, Row, RuleSet, RuleSetBuilder};

fn compile_rules(exprs: &[ExprTree]) -> RuleSet {
    let mut builder = RuleSetBuilder::new();
    for (i, expr) in exprs.iter().enumerate() {
        let rendered = expr.render();
        builder = builder.rule(&format!("rule_{i}"), move |r| r.slot("f1", &rendered));
    }
    builder.compile().expect("generated rule set should compile")
}

/// Reference resolution: the lowest-index rule whose expression is true
/// for the row, independently evaluated by the oracle.
fn oracle_assign(exprs: &[ExprTree], present: &[bool]) -> Assignment {
    for (i, expr) in exprs.iter().enumerate() {
        if expr.eval(present) {
            return Assignment::Rule(format!("rule_{i}"));
        }
    }
    Assignment::Unassigned
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// First-match-wins against the oracle, over whole generated rule sets.
    #[test]
    fn first_match_agrees_with_oracle(
        exprs in prop::collection::vec(arb_expr(), 1..6),
        rows in prop::collection::vec(arb_presence(), 0..8),
    ) {
        let ruleset = compile_rules(&exprs);
        let batch: Vec<Row> = rows.iter().map(|p| row_for(p)).collect();
        let assignments = ruleset.assign(&batch).unwrap();

        for (assignment, present) in assignments.iter().zip(&rows) {
            prop_assert_eq!(assignment, &oracle_assign(&exprs, present));
        }
    }

    /// The same rule set and batch always produce the same assignments,
    /// including across recompilation.
    #[test]
    fn determinism_across_recompilation(
        exprs in prop::collection::vec(arb_expr(), 1..6),
        rows in prop::collection::vec(arb_presence(), 0..8),
    ) {
        let batch: Vec<Row> = rows.iter().map(|p| row_for(p)).collect();
        let first = compile_rules(&exprs).assign(&batch).unwrap();
        for _ in 0..3 {
            prop_assert_eq!(&compile_rules(&exprs).assign(&batch).unwrap(), &first);
        }
    }

    /// Appending copies of existing rules (under fresh ids) never changes
    /// assignments: the original always matches first, and shared terms are
    /// resolved through the same deduplicated predicates.
    #[test]
    fn appended_duplicates_are_shadowed(
        exprs in prop::collection::vec(arb_expr(), 1..5),
        rows in prop::collection::vec(arb_presence(), 1..8),
    ) {
        let batch: Vec<Row> = rows.iter().map(|p| row_for(p)).collect();
        let baseline = compile_rules(&exprs).assign(&batch).unwrap();

        let mut builder = RuleSetBuilder::new();
        for (i, expr) in exprs.iter().enumerate() {
            let rendered = expr.render();
            builder = builder.rule(&format!("rule_{i}"), move |r| r.slot("f1", &rendered));
        }
        for (i, expr) in exprs.iter().enumerate() {
            let rendered = expr.render();
            builder = builder.rule(&format!("copy_{i}"), move |r| r.slot("f1", &rendered));
        }
        let doubled = builder.compile().expect("doubled rule set should compile");

        prop_assert_eq!(&doubled.assign(&batch).unwrap(), &baseline);
    }

    /// Term deduplication is an optimization only: a rule set whose rules
    /// all share one vocabulary registers each `(field, term)` pair once.
    #[test]
    fn term_count_is_bounded_by_vocabulary(
        exprs in prop::collection::vec(arb_expr(), 1..6),
    ) {
        let ruleset = compile_rules(&exprs);
        prop_assert!(ruleset.term_count() <= strategies::TERMS.len());
    }
}
