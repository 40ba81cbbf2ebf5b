//! Ballot processing: validates and records a single vote.

use ballotbox_types::{CandidateId, Principal};

use crate::call::Operation;
use crate::election::Election;
use crate::error::ElectionError;

impl Election {
    /// Cast `caller`'s one and only vote for `candidate`.
    ///
    /// Checks run in a fixed order: phase, registration, prior vote, candidate
    /// existence. On success the voter record and the candidate's count change
    /// together; there is no way to change or withdraw a vote afterwards.
    pub fn cast_vote(
        &mut self,
        caller: &Principal,
        candidate: CandidateId,
    ) -> Result<(), ElectionError> {
        self.authorize(caller, Operation::CastVote)?;
        self.phase.ensure_permits(Operation::CastVote)?;

        let voter = self
            .registry
            .voter(caller)
            .filter(|v| v.is_registered)
            .ok_or(ElectionError::Unregistered(*caller))?;
        if let Some(previous) = voter.voted_for {
            return Err(ElectionError::AlreadyVoted {
                voter: *caller,
                candidate: previous,
            });
        }
        if self.registry.candidate(candidate).is_none() {
            return Err(ElectionError::UnknownCandidate(candidate));
        }

        self.registry.record_vote(caller, candidate)?;
        tracing::info!(voter = %caller, candidate = %candidate, "vote recorded");
        Ok(())
    }
}
