//! Voter records.

use serde::{Deserialize, Serialize};

use crate::{CandidateId, Principal};

/// A voter registered by the administrator.
///
/// Whether the voter has voted is derived from `voted_for`, so a record can
/// never claim a vote without naming the candidate it went to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voter {
    pub principal: Principal,
    pub is_registered: bool,
    pub voted_for: Option<CandidateId>,
}

impl Voter {
    /// A freshly registered voter who has not voted yet.
    pub fn registered(principal: Principal) -> Self {
        Self {
            principal,
            is_registered: true,
            voted_for: None,
        }
    }

    pub fn has_voted(&self) -> bool {
        self.voted_for.is_some()
    }
}
