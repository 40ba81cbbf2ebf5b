use ballotbox_types::{CandidateId, ElectionPhase, Principal};
use thiserror::Error;

use crate::call::Operation;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ElectionError {
    #[error("{caller} is not the election administrator")]
    Unauthorized { caller: Principal },

    #[error("{operation} is not allowed while the election is {phase}")]
    InvalidPhase {
        operation: Operation,
        phase: ElectionPhase,
    },

    #[error("voter {0} is already registered")]
    AlreadyRegistered(Principal),

    #[error("{0} is not a registered voter")]
    Unregistered(Principal),

    #[error("voter {voter} has already voted for candidate {candidate}")]
    AlreadyVoted {
        voter: Principal,
        candidate: CandidateId,
    },

    #[error("candidate {0} does not exist")]
    UnknownCandidate(CandidateId),

    #[error("candidate {field} must not be empty")]
    EmptyField { field: &'static str },

    #[error("cannot open voting with {have} {what}: at least {need} required")]
    NotReady {
        what: &'static str,
        have: u64,
        need: u64,
    },

    #[error("candidate id space exhausted")]
    CandidateLimit,

    #[error("vote count overflow for candidate {0}")]
    VoteOverflow(CandidateId),

    #[error("election state is corrupted: {0}")]
    Corrupted(String),
}

impl ElectionError {
    /// Short stable name of the error kind, for callers that map errors to
    /// their own codes.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthorized { .. } => "unauthorized",
            Self::InvalidPhase { .. } => "invalid_phase",
            Self::AlreadyRegistered(_) => "already_registered",
            Self::Unregistered(_) => "unregistered",
            Self::AlreadyVoted { .. } => "already_voted",
            Self::UnknownCandidate(_) => "unknown_candidate",
            Self::EmptyField { .. } => "empty_field",
            Self::NotReady { .. } => "not_ready",
            Self::CandidateLimit => "candidate_limit",
            Self::VoteOverflow(_) => "vote_overflow",
            Self::Corrupted(_) => "corrupted",
        }
    }
}
