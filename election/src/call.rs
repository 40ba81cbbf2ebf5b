//! Call envelope: the typed operations an interaction layer can submit, and
//! the record-level changes a successful call produces.

use ballotbox_types::{Candidate, CandidateId, ElectionPhase, Principal, Voter};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A mutating election operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ElectionCall {
    RegisterVoter { voter: Principal },
    RegisterCandidate { name: String, affiliation: String },
    StartVoting,
    EndVoting,
    CastVote { candidate: CandidateId },
}

impl ElectionCall {
    pub fn operation(&self) -> Operation {
        match self {
            Self::RegisterVoter { .. } => Operation::RegisterVoter,
            Self::RegisterCandidate { .. } => Operation::RegisterCandidate,
            Self::StartVoting => Operation::StartVoting,
            Self::EndVoting => Operation::EndVoting,
            Self::CastVote { .. } => Operation::CastVote,
        }
    }
}

/// A call together with the authenticated principal that issued it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedCall {
    pub caller: Principal,
    pub call: ElectionCall,
}

impl SignedCall {
    pub fn new(caller: Principal, call: ElectionCall) -> Self {
        Self { caller, call }
    }
}

/// Operation names, used in phase errors and logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    RegisterVoter,
    RegisterCandidate,
    StartVoting,
    EndVoting,
    CastVote,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RegisterVoter => "register_voter",
            Self::RegisterCandidate => "register_candidate",
            Self::StartVoting => "start_voting",
            Self::EndVoting => "end_voting",
            Self::CastVote => "cast_vote",
        }
    }

    /// Operations only the administrator may perform.
    pub fn is_admin_only(&self) -> bool {
        !matches!(self, Self::CastVote)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record written by a successful call, in its post-call form.
///
/// Storage backends persist every change of one call (or one batch) in a
/// single transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateChange {
    Voter(Voter),
    Candidate(Candidate),
    Phase(ElectionPhase),
}
