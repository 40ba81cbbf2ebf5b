//! Errors raised while constructing or parsing fundamental types.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypesError {
    #[error("invalid principal {0:?}: expected 0x followed by 40 hex digits")]
    InvalidPrincipal(String),

    #[error("invalid candidate id {0:?}: expected a positive integer")]
    InvalidCandidateId(String),

    #[error("unknown election phase {0}")]
    UnknownPhase(u8),
}
