//! Phase controller: decides which operations are legal right now.
//!
//! `Setup --start_voting--> Open --end_voting--> Closed`. No self-loops, no
//! reverse transitions and no skipping.

use ballotbox_types::{ElectionPhase, Principal};
use serde::{Deserialize, Serialize};

use crate::call::Operation;
use crate::election::Election;
use crate::error::ElectionError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseController {
    current: ElectionPhase,
}

impl PhaseController {
    /// A controller for a new election, in Setup.
    pub fn new() -> Self {
        Self {
            current: ElectionPhase::Setup,
        }
    }

    /// A controller resumed at a previously persisted phase.
    pub fn resume(phase: ElectionPhase) -> Self {
        Self { current: phase }
    }

    pub fn current(&self) -> ElectionPhase {
        self.current
    }

    /// Whether `operation` is legal in the current phase.
    pub fn permits(&self, operation: Operation) -> bool {
        match operation {
            Operation::RegisterVoter | Operation::RegisterCandidate => {
                self.current.accepts_registration()
            }
            Operation::StartVoting => self.current == ElectionPhase::Setup,
            Operation::EndVoting => self.current == ElectionPhase::Open,
            Operation::CastVote => self.current.accepts_votes(),
        }
    }

    pub fn ensure_permits(&self, operation: Operation) -> Result<(), ElectionError> {
        if self.permits(operation) {
            Ok(())
        } else {
            Err(ElectionError::InvalidPhase {
                operation,
                phase: self.current,
            })
        }
    }

    /// Move to the successor phase through `operation`.
    pub(crate) fn advance(&mut self, operation: Operation) -> Result<ElectionPhase, ElectionError> {
        self.ensure_permits(operation)?;
        let next = self.current.successor().ok_or(ElectionError::InvalidPhase {
            operation,
            phase: self.current,
        })?;
        self.current = next;
        Ok(next)
    }
}

impl Default for PhaseController {
    fn default() -> Self {
        Self::new()
    }
}

impl Election {
    /// Open the ballot. Administrator only, from Setup only.
    pub fn start_voting(&mut self, caller: &Principal) -> Result<(), ElectionError> {
        self.authorize(caller, Operation::StartVoting)?;
        self.phase.ensure_permits(Operation::StartVoting)?;

        let candidates = self.registry.candidate_count();
        let need = u64::from(self.policy.min_candidates);
        if candidates < need {
            return Err(ElectionError::NotReady {
                what: "candidates",
                have: candidates,
                need,
            });
        }
        let voters = self.registry.voter_count();
        let need = u64::from(self.policy.min_voters);
        if voters < need {
            return Err(ElectionError::NotReady {
                what: "voters",
                have: voters,
                need,
            });
        }

        self.phase.advance(Operation::StartVoting)?;
        tracing::info!(candidates, voters, "voting opened");
        Ok(())
    }

    /// Close the ballot. Administrator only, from Open only.
    pub fn end_voting(&mut self, caller: &Principal) -> Result<(), ElectionError> {
        self.authorize(caller, Operation::EndVoting)?;
        self.phase.advance(Operation::EndVoting)?;
        tracing::info!(votes_cast = self.registry.votes_cast(), "voting closed");
        Ok(())
    }

    pub fn current_phase(&self) -> ElectionPhase {
        self.phase.current()
    }
}
