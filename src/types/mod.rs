mod assignment;
mod cancel;
mod config;
mod error;
mod program;
mod report;
mod row;
mod rule;
mod ruleset;
mod term_registry;

pub use assignment::Assignment;
pub use cancel::CancelToken;
pub use config::{AbsentSlotPolicy, CompileErrorPolicy, MatchConfig, PredicateMode};
pub use error::{CompileError, MatchError, RuleCompileError};
pub use report::MatchReport;
pub use row::Row;
pub use rule::{RuleDef, SlotDef};
pub use ruleset::{RuleBuilder, RuleSet, RuleSetBuilder, default_normalize};

pub(crate) use program::{Program, RpnToken, Step};
pub(crate) use rule::{CompiledRule, CompiledSlot};
pub(crate) use ruleset::NormalizeFn;
pub(crate) use term_registry::{TermRegistry, TermSlot};

#[cfg(feature = "binary-cache")]
pub(crate) use program::is_well_formed;
