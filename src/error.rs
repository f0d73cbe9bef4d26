use thiserror::Error;

use crate::types::{CompileError, MatchError};

/// Unified error type covering compilation, matching, and cache I/O.
///
/// Convenient for callers that bubble every engine failure through one
/// result type.
#[derive(Debug, Error)]
pub enum TagmatchError {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Match(#[from] MatchError),

    #[cfg(feature = "binary-cache")]
    #[error(transparent)]
    Serialize(#[from] crate::serial::SerializeError),

    #[cfg(feature = "binary-cache")]
    #[error(transparent)]
    Deserialize(#[from] crate::serial::DeserializeError),
}
