use tagmatch::{Row, RuleSetBuilder};

fn main() {
    // Rules are declared in priority order; the first match wins.
    let ruleset = RuleSetBuilder::new()
        .rule("101", |r| r.slot("f1", "(PC AND 販売) OR (PC AND 通販)"))
        .rule("102", |r| r.slot("f2", "(スマホ AND 限定) AND 販売 AND です"))
        .compile()
        .expect("failed to compile rule set");

    println!("{ruleset}");

    let rows = vec![
        Row::new().set("f1", "PCが店舗で販売中です。"),
        Row::new().set("f2", "スマホ限定販売です"),
        Row::new().set("f1", "何もない文章").set("f2", ""),
    ];

    let assignments = ruleset.assign(&rows).expect("matching failed");
    for (i, assignment) in assignments.iter().enumerate() {
        println!("row {i}: {assignment}");
    }
}
