use std::fmt;
use std::time::Instant;

use super::assignment::Assignment;
use super::cancel::CancelToken;
use super::config::MatchConfig;
use super::error::{CompileError, MatchError, RuleCompileError};
use super::report::MatchReport;
use super::row::Row;
use super::rule::{CompiledRule, RuleDef, SlotDef};
use super::term_registry::TermRegistry;

/// Normalization applied to terms at compile time and to field values at
/// match time. Must be deterministic; the rule set owns one function and
/// applies it on both sides.
pub(crate) type NormalizeFn = Box<dyn Fn(&str) -> String + Send + Sync>;

/// Default normalization: trim surrounding whitespace and lowercase.
///
/// Callers that need canonical folding (e.g. full-width/half-width
/// unification for Japanese text) supply their own function via
/// [`RuleSetBuilder::normalizer()`].
#[must_use]
pub fn default_normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Builder for constructing a [`RuleSet`].
///
/// Rules are declared in priority order and compiled once into an
/// immutable, thread-safe matching structure.
///
/// # Example
///
/// ```
/// use tagmatch::{Row, RuleSetBuilder};
///
/// let ruleset = RuleSetBuilder::new()
///     .rule("101", |r| r.slot("f1", "(PC AND 販売) OR (PC AND 通販)"))
///     .rule("102", |r| r.slot("f2", "スマホ AND 限定"))
///     .compile()
///     .unwrap();
///
/// let rows = vec![Row::new().set("f1", "PCが店舗で販売中です。")];
/// let assignments = ruleset.assign(&rows).unwrap();
/// assert_eq!(assignments[0].rule_id(), Some("101"));
/// ```
#[derive(Default)]
pub struct RuleSetBuilder {
    rules: Vec<RuleDef>,
    config: MatchConfig,
    normalize: Option<NormalizeFn>,
}

/// Intermediate builder passed to the rule definition closure.
#[derive(Debug, Default)]
pub struct RuleBuilder {
    slots: Vec<SlotDef>,
}

impl RuleSetBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the matching configuration.
    #[must_use]
    pub fn config(mut self, config: MatchConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the normalization function. The same function is applied to
    /// terms during compilation and to field values during matching.
    #[must_use]
    pub fn normalizer(
        mut self,
        normalize: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.normalize = Some(Box::new(normalize));
        self
    }

    /// Declare a rule. Declaration order is priority order: the first
    /// declared rule that matches a row wins.
    #[must_use]
    pub fn rule(mut self, id: &str, f: impl FnOnce(RuleBuilder) -> RuleBuilder) -> Self {
        let builder = f(RuleBuilder::default());
        self.rules.push(RuleDef {
            id: id.to_owned(),
            slots: builder.slots,
        });
        self
    }

    /// Append externally supplied rule definitions, preserving their order.
    #[must_use]
    pub fn rule_defs(mut self, defs: impl IntoIterator<Item = RuleDef>) -> Self {
        self.rules.extend(defs);
        self
    }

    /// Compile the declared rules into an immutable [`RuleSet`].
    ///
    /// # Errors
    ///
    /// Returns [`CompileError`] on duplicate rule ids, or (under the
    /// default abort policy) when any rule expression fails to compile.
    pub fn compile(self) -> Result<RuleSet, CompileError> {
        let normalize: NormalizeFn = match self.normalize {
            Some(f) => f,
            None => Box::new(default_normalize),
        };
        crate::compile::compile(self.rules, self.config, normalize)
    }
}

impl fmt::Debug for RuleSetBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleSetBuilder")
            .field("rules", &self.rules)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RuleBuilder {
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

/// A compiled, immutable rule set. Thread-safe and designed to live behind
/// `Arc`: matching only reads the compiled table.
pub struct RuleSet {
    pub(crate) rules: Vec<CompiledRule>,
    pub(crate) terms: TermRegistry,
    pub(crate) config: MatchConfig,
    pub(crate) normalize: NormalizeFn,
    pub(crate) rejected: Vec<RuleCompileError>,
}

impl RuleSet {
    /// Match a batch of rows, producing one assignment per row in input
    /// order: the id of the first rule whose present slots all evaluate
    /// true, or unassigned.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::InvariantViolation`] only if a compiled
    /// program is structurally invalid, which compilation rules out; such
    /// an error indicates a defect, not bad input.
    pub fn assign(&self, rows: &[Row]) -> Result<Vec<Assignment>, MatchError> {
        self.assign_inner(rows, None)
    }

    /// Like [`assign()`](Self::assign), checking the token between rows and
    /// aborting with [`MatchError::Cancelled`] when it is set.
    pub fn assign_with_cancel(
        &self,
        rows: &[Row],
        cancel: &CancelToken,
    ) -> Result<Vec<Assignment>, MatchError> {
        self.assign_inner(rows, Some(cancel))
    }

    /// Like [`assign()`](Self::assign), additionally reporting batch
    /// statistics for diagnostic logging.
    pub fn assign_detailed(&self, rows: &[Row]) -> Result<MatchReport, MatchError> {
        let start = Instant::now();
        let assignments = self.assign_inner(rows, None)?;
        let matched = assignments.iter().filter(|a| !a.is_unassigned()).count();
        Ok(MatchReport::new(assignments, matched, start.elapsed()))
    }

    fn assign_inner(
        &self,
        rows: &[Row],
        cancel: Option<&CancelToken>,
    ) -> Result<Vec<Assignment>, MatchError> {
        let table = crate::resolve::resolve(&self.terms, rows, &self.normalize);
        crate::evaluate::assign(&self.rules, &table, rows.len(), cancel)
    }

    /// Rule expressions rejected during compilation. Empty unless the rule
    /// set was compiled with
    /// [`CompileErrorPolicy::DropInvalid`](super::CompileErrorPolicy::DropInvalid).
    #[must_use]
    pub fn rejected_rules(&self) -> &[RuleCompileError] {
        &self.rejected
    }

    /// Ids of the compiled rules, in priority order.
    #[must_use]
    pub fn rule_ids(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.id.as_str()).collect()
    }

    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Number of distinct `(field, term)` predicates shared across rules.
    #[must_use]
    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    #[must_use]
    pub fn config(&self) -> MatchConfig {
        self.config
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RuleSet({} rules, {} terms)",
            self.rules.len(),
            self.terms.len(),
        )
    }
}

impl fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleSet")
            .field("rules", &self.rules)
            .field("terms", &self.terms)
            .field("config", &self.config)
            .field("rejected", &self.rejected)
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "binary-cache")]
impl RuleSet {
    /// Serialize this compiled rule set to a byte vector.
    ///
    /// The optional `source_text` is hashed (BLAKE3) and embedded in the
    /// payload metadata. Callers can use this to detect when the original
    /// rule definitions have changed and the cache should be rebuilt.
    ///
    /// # Errors
    ///
    /// Returns [`SerializeError`](crate::serial::SerializeError) if encoding
    /// fails.
    pub fn to_bytes(
        &self,
        source_text: Option<&str>,
    ) -> Result<Vec<u8>, crate::serial::SerializeError> {
        crate::serial::encode(self, source_text)
    }

    /// Deserialize a compiled rule set from bytes previously produced by
    /// [`to_bytes`](Self::to_bytes).
    ///
    /// The normalization function is not part of the cache; the caller must
    /// supply the same function that was used when the cache was built.
    ///
    /// # Errors
    ///
    /// Returns [`DeserializeError`](crate::serial::DeserializeError) on
    /// format, integrity, or validation failure.
    pub fn from_bytes(
        bytes: &[u8],
        normalize: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Result<Self, crate::serial::DeserializeError> {
        crate::serial::decode(bytes, Box::new(normalize))
    }

    /// Serialize this compiled rule set and write it to a file.
    ///
    /// # Errors
    ///
    /// Returns [`SerializeError`](crate::serial::SerializeError) on encoding
    /// or I/O failure.
    pub fn to_binary_file(
        &self,
        path: impl AsRef<std::path::Path>,
        source_text: Option<&str>,
    ) -> Result<(), crate::serial::SerializeError> {
        let bytes = self.to_bytes(source_text)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Read a file and deserialize the compiled rule set it contains.
    ///
    /// # Errors
    ///
    /// Returns [`DeserializeError`](crate::serial::DeserializeError) on I/O,
    /// format, integrity, or validation failure.
    pub fn from_binary_file(
        path: impl AsRef<std::path::Path>,
        normalize: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Result<Self, crate::serial::DeserializeError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes, normalize)
    }
}
