use tagmatch::{Row, RuleSetBuilder};

fn main() {
    // Overlapping rules: declaration order decides which id a row gets.
    // An exclusion rule placed first keeps promotional copy out of the
    // broader category below it.
    let ruleset = RuleSetBuilder::new()
        .rule("excluded", |r| r.slot("f1", "PC AND サンプル"))
        .rule("pc-sales", |r| r.slot("f1", "PC AND (販売 OR 通販)"))
        .rule("pc-other", |r| r.slot("f1", "PC"))
        .compile()
        .expect("failed to compile rule set");

    let rows = vec![
        Row::new().set("f1", "PCサンプル品の販売"),
        Row::new().set("f1", "PCを通販で販売"),
        Row::new().set("f1", "PCの修理を受付中"),
        Row::new().set("f1", "家具の販売"),
    ];

    for (row, assignment) in rows.iter().zip(ruleset.assign(&rows).expect("matching failed")) {
        println!("{:<24} -> {assignment}", row.get("f1").unwrap_or(""));
    }
}
