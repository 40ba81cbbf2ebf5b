//! Registration and opening policy.
//!
//! Fixed when the election is created, next to the administrator. The
//! defaults impose no extra rules: empty candidate fields are accepted and
//! voting may open with an empty registry.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionPolicy {
    /// Candidates that must be registered before voting can open.
    #[serde(default)]
    pub min_candidates: u32,

    /// Voters that must be registered before voting can open.
    #[serde(default)]
    pub min_voters: u32,

    /// Accept candidates whose name or affiliation is blank.
    #[serde(default = "default_true")]
    pub allow_empty_fields: bool,
}

fn default_true() -> bool {
    true
}

impl ElectionPolicy {
    /// A policy that rejects blank candidate fields and requires at least
    /// one candidate and one voter before opening.
    pub fn strict() -> Self {
        Self {
            min_candidates: 1,
            min_voters: 1,
            allow_empty_fields: false,
        }
    }
}

impl Default for ElectionPolicy {
    fn default() -> Self {
        Self {
            min_candidates: 0,
            min_voters: 0,
            allow_empty_fields: true,
        }
    }
}
