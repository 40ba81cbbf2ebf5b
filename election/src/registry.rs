//! Registry: the voter roll and the candidate list.
//!
//! Voters are keyed by principal (at most one record each); candidates live in
//! a vector where candidate `n` sits at index `n - 1`, so ids stay sequential
//! and gap-free by construction.

use ballotbox_types::{Candidate, CandidateId, Principal, Voter};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::call::Operation;
use crate::election::Election;
use crate::error::ElectionError;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    voters: BTreeMap<Principal, Voter>,
    candidates: Vec<Candidate>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn voter(&self, principal: &Principal) -> Option<&Voter> {
        self.voters.get(principal)
    }

    pub fn candidate(&self, id: CandidateId) -> Option<&Candidate> {
        let index = id.get().checked_sub(1)?;
        self.candidates.get(index as usize)
    }

    /// All candidates in id order.
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// All voters in principal order.
    pub fn voters(&self) -> impl Iterator<Item = &Voter> {
        self.voters.values()
    }

    pub fn voter_count(&self) -> u64 {
        self.voters.len() as u64
    }

    pub fn candidate_count(&self) -> u64 {
        self.candidates.len() as u64
    }

    /// Number of voters who have cast a ballot.
    pub fn votes_cast(&self) -> u64 {
        self.voters.values().filter(|v| v.has_voted()).count() as u64
    }

    /// Id the next registered candidate will receive.
    pub fn next_candidate_id(&self) -> Option<CandidateId> {
        u32::try_from(self.candidates.len())
            .ok()
            .and_then(|n| n.checked_add(1))
            .map(CandidateId::new)
    }

    pub(crate) fn insert_voter(&mut self, voter: Voter) {
        self.voters.insert(voter.principal, voter);
    }

    pub(crate) fn push_candidate(&mut self, candidate: Candidate) {
        self.candidates.push(candidate);
    }

    /// Record `principal`'s ballot for `id`.
    ///
    /// Everything that can fail is checked before either record is touched,
    /// so the voter and candidate updates land together or not at all.
    pub(crate) fn record_vote(
        &mut self,
        principal: &Principal,
        id: CandidateId,
    ) -> Result<(), ElectionError> {
        let index = id
            .get()
            .checked_sub(1)
            .map(|i| i as usize)
            .filter(|&i| i < self.candidates.len())
            .ok_or(ElectionError::UnknownCandidate(id))?;
        let new_count = self.candidates[index]
            .vote_count
            .checked_add(1)
            .ok_or(ElectionError::VoteOverflow(id))?;
        let voter = self
            .voters
            .get_mut(principal)
            .ok_or(ElectionError::Unregistered(*principal))?;

        voter.voted_for = Some(id);
        self.candidates[index].vote_count = new_count;
        Ok(())
    }
}

impl Election {
    /// Add `principal` to the voter roll. Administrator only, Setup only.
    pub fn register_voter(
        &mut self,
        caller: &Principal,
        principal: Principal,
    ) -> Result<(), ElectionError> {
        self.authorize(caller, Operation::RegisterVoter)?;
        self.phase.ensure_permits(Operation::RegisterVoter)?;
        if self.registry.voter(&principal).is_some() {
            return Err(ElectionError::AlreadyRegistered(principal));
        }

        self.registry.insert_voter(Voter::registered(principal));
        tracing::info!(voter = %principal, voters = self.registry.voter_count(), "voter registered");
        Ok(())
    }

    /// Declare a candidate and return its newly assigned id.
    /// Administrator only, Setup only.
    pub fn register_candidate(
        &mut self,
        caller: &Principal,
        name: &str,
        affiliation: &str,
    ) -> Result<CandidateId, ElectionError> {
        self.authorize(caller, Operation::RegisterCandidate)?;
        self.phase.ensure_permits(Operation::RegisterCandidate)?;
        if !self.policy.allow_empty_fields {
            if name.trim().is_empty() {
                return Err(ElectionError::EmptyField { field: "name" });
            }
            if affiliation.trim().is_empty() {
                return Err(ElectionError::EmptyField { field: "affiliation" });
            }
        }
        let id = self
            .registry
            .next_candidate_id()
            .ok_or(ElectionError::CandidateLimit)?;

        self.registry.push_candidate(Candidate::new(id, name, affiliation));
        tracing::info!(candidate = %id, name, affiliation, "candidate registered");
        Ok(id)
    }

    /// Voter record for `principal`, if one exists.
    pub fn voter(&self, principal: &Principal) -> Option<&Voter> {
        self.registry.voter(principal)
    }

    /// Candidate with the given id, if one exists.
    pub fn candidate(&self, id: CandidateId) -> Option<&Candidate> {
        self.registry.candidate(id)
    }

    /// All candidates in id order.
    pub fn candidates(&self) -> &[Candidate] {
        self.registry.candidates()
    }

    pub fn candidate_count(&self) -> u64 {
        self.registry.candidate_count()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}
