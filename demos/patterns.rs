use tagmatch::{CompileErrorPolicy, MatchConfig, PredicateMode, Row, RuleSetBuilder};

fn main() {
    // Show the engine's log output while compiling and matching.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tagmatch=debug".into()),
        )
        .init();

    // Pattern mode: terms are regular expressions. The broken rule is
    // dropped (and logged) instead of failing the whole set.
    let config = MatchConfig::new()
        .predicate_mode(PredicateMode::Pattern)
        .on_compile_error(CompileErrorPolicy::DropInvalid);

    let ruleset = RuleSetBuilder::new()
        .config(config)
        .rule("event", |r| r.slot("f1", "第[0-9]+回 AND 開催"))
        .rule("broken", |r| r.slot("f1", "[0-9"))
        .rule("model", |r| r.slot("f1", "pc-[0-9]{2}"))
        .compile()
        .expect("failed to compile rule set");

    for rejected in ruleset.rejected_rules() {
        println!("rejected: {rejected}");
    }

    let rows = vec![
        Row::new().set("f1", "第12回イベント開催のお知らせ"),
        Row::new().set("f1", "新型 PC-42 予約受付"),
        Row::new().set("f1", "その他のお知らせ"),
    ];

    for (row, assignment) in rows.iter().zip(ruleset.assign(&rows).expect("matching failed")) {
        println!("{:<28} -> {assignment}", row.get("f1").unwrap_or(""));
    }
}
