use std::sync::Arc;
use std::thread;

use tagmatch::{Row, RuleSetBuilder};

fn main() {
    let ruleset = Arc::new(
        RuleSetBuilder::new()
            .rule("101", |r| r.slot("f1", "(PC AND 販売) OR (PC AND 通販)"))
            .rule("102", |r| r.slot("f2", "(スマホ AND 限定) AND 販売 AND です"))
            .compile()
            .expect("failed to compile rule set"),
    );

    // The compiled rule set is immutable: partition the batch across
    // threads and share it read-only.
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let rs = Arc::clone(&ruleset);
            thread::spawn(move || {
                let batch: Vec<Row> = (0..4)
                    .map(|j| Row::new().set("f1", format!("PC販売キャンペーン {i}-{j}")))
                    .collect();
                let assignments = rs.assign(&batch).expect("matching failed");
                println!("thread {i}: {assignments:?}");
            })
        })
        .collect();

    for h in handles {
        h.join().expect("worker thread panicked");
    }
}
