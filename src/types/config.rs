/// How a term predicate tests a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PredicateMode {
    /// The normalized field value contains the normalized term as a
    /// substring.
    #[default]
    Contains,
    /// The normalized term is compiled as a regular expression and matched
    /// against the normalized field value.
    Pattern,
}

/// How a declared slot with no expression affects its rule.
///
/// Either way, a rule whose slots are all absent never matches any row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AbsentSlotPolicy {
    /// Absent slots are left out of the rule's AND-fold; the remaining
    /// slots decide the match.
    #[default]
    ExcludeFromAnd,
    /// Any absent slot disables the whole rule.
    SkipRule,
}

/// What to do when some rule expressions fail to compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompileErrorPolicy {
    /// Fail compilation, reporting every collected error. Dropping rules
    /// silently would change matching semantics, so this is the default.
    #[default]
    Abort,
    /// Keep the rules that compiled. The collected errors stay available
    /// via [`RuleSet::rejected_rules()`](crate::RuleSet::rejected_rules).
    DropInvalid,
}

/// Rule-set level matching configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchConfig {
    pub predicate_mode: PredicateMode,
    pub absent_slots: AbsentSlotPolicy,
    pub on_compile_error: CompileErrorPolicy,
}

impl MatchConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn predicate_mode(mut self, mode: PredicateMode) -> Self {
        self.predicate_mode = mode;
        self
    }

    #[must_use]
    pub fn absent_slots(mut self, policy: AbsentSlotPolicy) -> Self {
        self.absent_slots = policy;
        self
    }

    #[must_use]
    pub fn on_compile_error(mut self, policy: CompileErrorPolicy) -> Self {
        self.on_compile_error = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = MatchConfig::new();
        assert_eq!(config.predicate_mode, PredicateMode::Contains);
        assert_eq!(config.absent_slots, AbsentSlotPolicy::ExcludeFromAnd);
        assert_eq!(config.on_compile_error, CompileErrorPolicy::Abort);
    }

    #[test]
    fn builder_setters() {
        let config = MatchConfig::new()
            .predicate_mode(PredicateMode::Pattern)
            .absent_slots(AbsentSlotPolicy::SkipRule)
            .on_compile_error(CompileErrorPolicy::DropInvalid);
        assert_eq!(config.predicate_mode, PredicateMode::Pattern);
        assert_eq!(config.absent_slots, AbsentSlotPolicy::SkipRule);
        assert_eq!(config.on_compile_error, CompileErrorPolicy::DropInvalid);
    }
}
