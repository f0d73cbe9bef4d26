use std::collections::HashMap;

use tracing::trace;

use crate::types::{NormalizeFn, Row, TermRegistry, TermSlot};

/// Per-batch term satisfaction vectors: `columns[slot][row]`.
///
/// Built once per batch so every rule referencing a given `(field, term)`
/// pair reads the same precomputed column.
pub(crate) struct PredicateTable {
    columns: Vec<Vec<bool>>,
}

impl PredicateTable {
    /// Whether predicate `slot` is satisfied on `row`. `None` marks an
    /// out-of-range lookup, which compiled programs never produce.
    pub(crate) fn is_satisfied(&self, slot: usize, row: usize) -> Option<bool> {
        self.columns.get(slot).and_then(|col| col.get(row)).copied()
    }
}

/// Compute satisfaction vectors for every registered predicate over a batch
/// of rows. Each referenced field value is normalized once per row, then
/// tested against every term registered for that field.
pub(crate) fn resolve(
    terms: &TermRegistry,
    rows: &[Row],
    normalize: &NormalizeFn,
) -> PredicateTable {
    let slots = terms.slots();
    let mut columns: Vec<Vec<bool>> = (0..slots.len())
        .map(|_| Vec::with_capacity(rows.len()))
        .collect();

    let mut by_field: HashMap<&str, Vec<usize>> = HashMap::new();
    for (idx, slot) in slots.iter().enumerate() {
        by_field.entry(slot.field.as_str()).or_default().push(idx);
    }

    for row in rows {
        for (&field, slot_indices) in &by_field {
            let value = normalize(row.get(field).unwrap_or(""));
            for &idx in slot_indices {
                columns[idx].push(test(&slots[idx], &value));
            }
        }
    }

    trace!(
        rows = rows.len(),
        predicates = slots.len(),
        "resolved predicate table"
    );

    PredicateTable { columns }
}

fn test(slot: &TermSlot, value: &str) -> bool {
    match &slot.pattern {
        Some(pattern) => pattern.is_match(value),
        None => value.contains(slot.term.as_str()),
    }
}
