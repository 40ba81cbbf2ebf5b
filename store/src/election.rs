//! Election storage trait.

use ballotbox_election::{Election, ElectionPolicy, StateChange};
use ballotbox_types::{Candidate, CandidateId, ElectionPhase, Principal, Voter};

use crate::StoreError;

/// Meta keys under which election-wide settings are stored.
pub mod keys {
    pub const ADMIN: &str = "admin";
    pub const POLICY: &str = "policy";
    pub const PHASE: &str = "phase";
}

/// Trait for storing election state: settings, candidates and voters.
///
/// Lookups return `Ok(None)` for absent records; `Err` is reserved for
/// backend failures.
pub trait ElectionStore {
    /// Write the administrator, policy and initial phase of a new election in
    /// one transaction. Fails with [`StoreError::AlreadyInitialized`] if an
    /// election already exists.
    fn initialize(&self, admin: &Principal, policy: &ElectionPolicy) -> Result<(), StoreError>;

    fn get_admin(&self) -> Result<Option<Principal>, StoreError>;
    fn get_policy(&self) -> Result<Option<ElectionPolicy>, StoreError>;
    fn get_phase(&self) -> Result<Option<ElectionPhase>, StoreError>;

    fn get_candidate(&self, id: CandidateId) -> Result<Option<Candidate>, StoreError>;
    /// All candidates in id order.
    fn iter_candidates(&self) -> Result<Vec<Candidate>, StoreError>;

    fn get_voter(&self, principal: &Principal) -> Result<Option<Voter>, StoreError>;
    fn iter_voters(&self) -> Result<Vec<Voter>, StoreError>;

    /// Read-modify-write the stored election under the backend's writer lock.
    ///
    /// The election is loaded inside the write transaction, handed to `f`,
    /// and the changes `f` returns are committed in that same transaction.
    /// Every writer sharing the backing storage, in this process or another,
    /// is serialised here, so `f` always sees the latest committed state.
    /// When `f` returns no changes nothing is written. Returns the election
    /// as `f` left it together with `f`'s own result.
    fn update<R>(
        &self,
        f: impl FnOnce(&mut Election) -> (Vec<StateChange>, R),
    ) -> Result<(Election, R), StoreError>;

    /// Rebuild the election from storage, or `None` if none was initialised.
    ///
    /// The loaded records are re-checked against the election invariants; a
    /// mismatch is reported as [`StoreError::Corruption`].
    fn load_election(&self) -> Result<Option<Election>, StoreError> {
        let Some(admin) = self.get_admin()? else {
            return Ok(None);
        };
        rebuild_election(
            admin,
            self.get_policy()?,
            self.get_phase()?,
            self.iter_candidates()?,
            self.iter_voters()?,
        )
        .map(Some)
    }
}

/// Assemble an election from its stored records and verify it.
///
/// A missing policy falls back to the default; a missing phase next to a
/// stored administrator is corruption.
pub fn rebuild_election(
    admin: Principal,
    policy: Option<ElectionPolicy>,
    phase: Option<ElectionPhase>,
    candidates: Vec<Candidate>,
    voters: Vec<Voter>,
) -> Result<Election, StoreError> {
    let phase = phase.ok_or_else(|| StoreError::Corruption("election phase is missing".into()))?;
    Election::restore(admin, policy.unwrap_or_default(), phase, candidates, voters)
        .map_err(|e| StoreError::Corruption(e.to_string()))
}
