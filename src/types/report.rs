use std::fmt;
use std::time::Duration;

use super::assignment::Assignment;

/// Batch statistics returned by
/// [`RuleSet::assign_detailed()`](super::RuleSet::assign_detailed).
///
/// Carries the same assignments as [`RuleSet::assign()`](super::RuleSet::assign)
/// plus counts and wall-clock duration for callers that log per-batch
/// diagnostics.
#[derive(Debug, Clone)]
#[must_use]
pub struct MatchReport {
    assignments: Vec<Assignment>,
    matched_rows: usize,
    duration: Duration,
}

impl MatchReport {
    pub(crate) fn new(
        assignments: Vec<Assignment>,
        matched_rows: usize,
        duration: Duration,
    ) -> Self {
        Self {
            assignments,
            matched_rows,
            duration,
        }
    }

    /// Per-row assignments, in input order.
    #[must_use]
    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    /// Consume the report, keeping only the assignments.
    #[must_use]
    pub fn into_assignments(self) -> Vec<Assignment> {
        self.assignments
    }

    /// Number of rows assigned a rule id.
    #[must_use]
    pub fn matched_rows(&self) -> usize {
        self.matched_rows
    }

    /// Number of rows left unassigned.
    #[must_use]
    pub fn unassigned_rows(&self) -> usize {
        self.assignments.len() - self.matched_rows
    }

    /// Wall-clock duration of the batch run.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl fmt::Display for MatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} rows assigned, duration: {:?}",
            self.matched_rows,
            self.assignments.len(),
            self.duration,
        )
    }
}
