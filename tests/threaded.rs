use std::sync::Arc;
use std::thread;

use tagmatch::{Assignment, Row, RuleSet, RuleSetBuilder};

fn shared_ruleset() -> Arc<RuleSet> {
    Arc::new(
        RuleSetBuilder::new()
            .rule("101", |r| r.slot("f1", "(PC AND 販売) OR (PC AND 通販)"))
            .rule("102", |r| r.slot("f2", "(スマホ AND 限定) AND 販売 AND です"))
            .rule("103", |r| r.slot("f1", "中古"))
            .compile()
            .unwrap(),
    )
}

#[test]
fn assign_across_threads() {
    let ruleset = shared_ruleset();

    let batches: Vec<Vec<Row>> = vec![
        vec![
            Row::new().set("f1", "PCが店舗で販売中です。"),
            Row::new().set("f1", "何もない文章"),
        ],
        vec![Row::new().set("f2", "スマホ限定販売です")],
        vec![
            Row::new().set("f1", "中古パーツ入荷"),
            Row::new().set("f1", "PCを通販で販売"),
        ],
        vec![Row::new()],
    ];

    let handles: Vec<_> = batches
        .into_iter()
        .map(|batch| {
            let rs = Arc::clone(&ruleset);
            thread::spawn(move || rs.assign(&batch).unwrap())
        })
        .collect();

    let results: Vec<Vec<Assignment>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(
        results[0],
        vec![
            Assignment::Rule("101".to_owned()),
            Assignment::Unassigned,
        ]
    );
    assert_eq!(results[1], vec![Assignment::Rule("102".to_owned())]);
    assert_eq!(
        results[2],
        vec![
            Assignment::Rule("103".to_owned()),
            Assignment::Rule("101".to_owned()),
        ]
    );
    assert_eq!(results[3], vec![Assignment::Unassigned]);
}

#[test]
fn partitioned_batch_matches_single_threaded_run() {
    let ruleset = shared_ruleset();

    let rows: Vec<Row> = (0..200)
        .map(|i| match i % 4 {
            0 => Row::new().set("f1", format!("PC販売 ロット{i}")),
            1 => Row::new().set("f2", "スマホ限定販売です"),
            2 => Row::new().set("f1", format!("中古在庫 {i}")),
            _ => Row::new().set("f1", format!("その他 {i}")),
        })
        .collect();

    let sequential = ruleset.assign(&rows).unwrap();

    let mid = rows.len() / 2;
    let (left, right) = rows.split_at(mid);
    let left = left.to_vec();
    let right = right.to_vec();

    let rs_left = Arc::clone(&ruleset);
    let rs_right = Arc::clone(&ruleset);
    let left_handle = thread::spawn(move || rs_left.assign(&left).unwrap());
    let right_handle = thread::spawn(move || rs_right.assign(&right).unwrap());

    let mut parallel = left_handle.join().unwrap();
    parallel.extend(right_handle.join().unwrap());

    assert_eq!(parallel, sequential);
}
