use super::program::Program;

/// One field-scoped expression within a rule definition.
///
/// `expr` of `None`, or an expression string that tokenizes to nothing,
/// leaves the slot absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotDef {
    pub field: String,
    pub expr: Option<String>,
}

/// An ordered rule definition: an opaque id plus its field slots.
///
/// List position in the rule set is priority; earlier rules win. Created
/// directly, or through [`RuleSetBuilder`](super::RuleSetBuilder).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleDef {
    pub id: String,
    pub slots: Vec<SlotDef>,
}

impl RuleDef {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            slots: Vec::new(),
        }
    }

    /// Add a slot with an expression over the given field.
    #[must_use]
    pub fn slot(mut self, field: &str, expr: &str) -> Self {
        self.slots.push(SlotDef {
            field: field.to_owned(),
            expr: Some(expr.to_owned()),
        });
        self
    }

    /// Declare a field slot with no expression.
    #[must_use]
    pub fn vacant(mut self, field: &str) -> Self {
        self.slots.push(SlotDef {
            field: field.to_owned(),
            expr: None,
        });
        self
    }
}

/// A rule slot compiled to an RPN program over predicate-slot indices.
#[derive(Debug, Clone)]
pub(crate) struct CompiledSlot {
    pub(crate) field: String,
    pub(crate) program: Program,
}

/// An immutable compiled rule.
///
/// `matchable` is false when the rule can never match any row: it has no
/// present slots, or it has an absent slot under the `SkipRule` policy.
#[derive(Debug, Clone)]
pub(crate) struct CompiledRule {
    pub(crate) id: String,
    pub(crate) slots: Vec<CompiledSlot>,
    pub(crate) matchable: bool,
}
