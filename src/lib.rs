mod compile;
mod error;
mod evaluate;
mod parse;
mod resolve;
mod types;

#[cfg(feature = "binary-cache")]
mod serial;

pub use error::TagmatchError;
pub use parse::ExprError;
pub use types::{
    AbsentSlotPolicy, Assignment, CancelToken, CompileError, CompileErrorPolicy, MatchConfig,
    MatchError, MatchReport, PredicateMode, Row, RuleBuilder, RuleCompileError, RuleDef, RuleSet,
    RuleSetBuilder, SlotDef, default_normalize,
};

#[cfg(feature = "binary-cache")]
pub use serial::{DeserializeError, SerializeError};
