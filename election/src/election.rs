//! The `Election` aggregate: administrator, policy, phase and registry in one
//! value, mutated only through `&mut self`.

use ballotbox_types::{Candidate, CandidateId, ElectionPhase, Principal, Role, Voter};
use serde::{Deserialize, Serialize};

use crate::call::{ElectionCall, Operation, SignedCall, StateChange};
use crate::error::ElectionError;
use crate::phase::PhaseController;
use crate::policy::ElectionPolicy;
use crate::registry::Registry;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Election {
    pub(crate) admin: Principal,
    pub(crate) policy: ElectionPolicy,
    pub(crate) phase: PhaseController,
    pub(crate) registry: Registry,
}

impl Election {
    /// A new election in Setup with an empty registry.
    pub fn new(admin: Principal, policy: ElectionPolicy) -> Self {
        Self {
            admin,
            policy,
            phase: PhaseController::new(),
            registry: Registry::new(),
        }
    }

    /// Rebuild an election from persisted records.
    ///
    /// The records are checked against every invariant the live operations
    /// maintain; any mismatch is reported as [`ElectionError::Corrupted`].
    pub fn restore(
        admin: Principal,
        policy: ElectionPolicy,
        phase: ElectionPhase,
        mut candidates: Vec<Candidate>,
        voters: Vec<Voter>,
    ) -> Result<Self, ElectionError> {
        candidates.sort_by_key(|c| c.id);

        let mut registry = Registry::new();
        for candidate in candidates {
            if Some(candidate.id) != registry.next_candidate_id() {
                return Err(ElectionError::Corrupted(format!(
                    "candidate ids are not contiguous at {}",
                    candidate.id
                )));
            }
            registry.push_candidate(candidate);
        }
        for voter in voters {
            if registry.voter(&voter.principal).is_some() {
                return Err(ElectionError::Corrupted(format!(
                    "duplicate voter record for {}",
                    voter.principal
                )));
            }
            registry.insert_voter(voter);
        }

        let election = Self {
            admin,
            policy,
            phase: PhaseController::resume(phase),
            registry,
        };
        election.verify()?;
        tracing::debug!(
            phase = %phase,
            candidates = election.registry.candidate_count(),
            voters = election.registry.voter_count(),
            "election restored"
        );
        Ok(election)
    }

    /// Check the cross-record invariants: every vote names an existing
    /// candidate and comes from a registered voter, each candidate's count
    /// equals the votes naming it, and no votes exist before voting opened.
    pub fn verify(&self) -> Result<(), ElectionError> {
        let mut expected = vec![0u64; self.registry.candidates().len()];

        for voter in self.registry.voters() {
            let Some(id) = voter.voted_for else { continue };
            if !voter.is_registered {
                return Err(ElectionError::Corrupted(format!(
                    "unregistered voter {} has a recorded vote",
                    voter.principal
                )));
            }
            let slot = id
                .get()
                .checked_sub(1)
                .and_then(|i| expected.get_mut(i as usize))
                .ok_or_else(|| {
                    ElectionError::Corrupted(format!(
                        "voter {} voted for missing candidate {}",
                        voter.principal, id
                    ))
                })?;
            *slot += 1;
        }

        for (index, candidate) in self.registry.candidates().iter().enumerate() {
            if candidate.id != CandidateId::new(index as u32 + 1) {
                return Err(ElectionError::Corrupted(format!(
                    "candidate {} stored at position {}",
                    candidate.id,
                    index + 1
                )));
            }
            if candidate.vote_count != expected[index] {
                return Err(ElectionError::Corrupted(format!(
                    "candidate {} counts {} votes but {} voters chose it",
                    candidate.id, candidate.vote_count, expected[index]
                )));
            }
        }

        let votes_cast = self.registry.votes_cast();
        if self.phase.current() == ElectionPhase::Setup && votes_cast > 0 {
            return Err(ElectionError::Corrupted(format!(
                "{votes_cast} votes recorded before voting opened"
            )));
        }
        Ok(())
    }

    pub fn admin(&self) -> Principal {
        self.admin
    }

    pub fn policy(&self) -> &ElectionPolicy {
        &self.policy
    }

    pub fn role_of(&self, principal: &Principal) -> Role {
        if *principal == self.admin {
            Role::Admin
        } else if self
            .registry
            .voter(principal)
            .is_some_and(|v| v.is_registered)
        {
            Role::RegisteredVoter
        } else {
            Role::Unregistered
        }
    }

    /// Refuse `operation` unless `caller` may perform it.
    pub(crate) fn authorize(
        &self,
        caller: &Principal,
        operation: Operation,
    ) -> Result<(), ElectionError> {
        if operation.is_admin_only() && *caller != self.admin {
            return Err(ElectionError::Unauthorized { caller: *caller });
        }
        Ok(())
    }

    /// Dispatch a signed call and report the records it changed.
    ///
    /// This is the single mutation entry point used by the service layer.
    pub fn apply(&mut self, signed: &SignedCall) -> Result<Vec<StateChange>, ElectionError> {
        let caller = &signed.caller;
        let result = match &signed.call {
            ElectionCall::RegisterVoter { voter } => self
                .register_voter(caller, *voter)
                .map(|()| self.voter_change(voter)),
            ElectionCall::RegisterCandidate { name, affiliation } => self
                .register_candidate(caller, name, affiliation)
                .map(|id| self.candidate_change(id)),
            ElectionCall::StartVoting => self
                .start_voting(caller)
                .map(|()| vec![StateChange::Phase(self.current_phase())]),
            ElectionCall::EndVoting => self
                .end_voting(caller)
                .map(|()| vec![StateChange::Phase(self.current_phase())]),
            ElectionCall::CastVote { candidate } => {
                self.cast_vote(caller, *candidate).map(|()| {
                    let mut changes = self.voter_change(caller);
                    changes.extend(self.candidate_change(*candidate));
                    changes
                })
            }
        };

        if let Err(e) = &result {
            tracing::debug!(
                caller = %caller,
                operation = %signed.call.operation(),
                kind = e.kind(),
                "call rejected: {e}"
            );
        }
        result
    }

    fn voter_change(&self, principal: &Principal) -> Vec<StateChange> {
        self.registry
            .voter(principal)
            .cloned()
            .map(StateChange::Voter)
            .into_iter()
            .collect()
    }

    fn candidate_change(&self, id: CandidateId) -> Vec<StateChange> {
        self.registry
            .candidate(id)
            .cloned()
            .map(StateChange::Candidate)
            .into_iter()
            .collect()
    }
}
