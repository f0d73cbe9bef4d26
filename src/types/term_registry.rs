use std::collections::HashMap;

use regex::Regex;

use super::config::PredicateMode;

/// One deduplicated `(field, term)` predicate backing a `Load` step.
/// In pattern mode the term is pre-compiled as a regular expression.
#[derive(Debug, Clone)]
pub(crate) struct TermSlot {
    pub(crate) field: String,
    pub(crate) term: String,
    pub(crate) pattern: Option<Regex>,
}

/// Maps `(field, normalized term)` pairs to flat predicate-slot indices.
///
/// Built during compilation by collecting every term referenced in rule
/// expressions. Identical normalized terms used against the same field by
/// different rules share one slot, so their satisfaction vector is computed
/// once per batch.
#[derive(Debug, Clone, Default)]
pub(crate) struct TermRegistry {
    index: HashMap<(String, String), usize>,
    slots: Vec<TermSlot>,
}

impl TermRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Register a `(field, term)` predicate, returning its slot index.
    /// Re-registering an identical pair returns the existing slot.
    ///
    /// In pattern mode the term is compiled as a regular expression;
    /// compilation failures surface here so the rule compiler can attribute
    /// them to a rule and field.
    pub(crate) fn register(
        &mut self,
        field: &str,
        term: &str,
        mode: PredicateMode,
    ) -> Result<usize, regex::Error> {
        let key = (field.to_owned(), term.to_owned());
        if let Some(&idx) = self.index.get(&key) {
            return Ok(idx);
        }

        let pattern = match mode {
            PredicateMode::Contains => None,
            PredicateMode::Pattern => Some(Regex::new(term)?),
        };

        let idx = self.slots.len();
        self.slots.push(TermSlot {
            field: key.0.clone(),
            term: key.1.clone(),
            pattern,
        });
        self.index.insert(key, idx);
        Ok(idx)
    }

    pub(crate) fn slots(&self) -> &[TermSlot] {
        &self.slots
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    /// Rebuild a registry from `(field, term)` pairs in slot order,
    /// recompiling patterns. Used when decoding a binary cache.
    #[cfg(feature = "binary-cache")]
    pub(crate) fn from_entries(
        entries: Vec<(String, String)>,
        mode: PredicateMode,
    ) -> Result<Self, regex::Error> {
        let mut registry = Self::new();
        for (field, term) in entries {
            registry.register(&field, &term, mode)?;
        }
        Ok(registry)
    }
}
