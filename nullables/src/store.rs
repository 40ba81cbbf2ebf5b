//! Nullable store: thread-safe in-memory storage for testing.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use ballotbox_election::{Election, ElectionPolicy, StateChange};
use ballotbox_store::election::rebuild_election;
use ballotbox_store::{ElectionStore, MetaStore, StoreError};
use ballotbox_types::{Candidate, CandidateId, ElectionPhase, Principal, Voter};

#[derive(Default)]
struct State {
    settings: Option<Settings>,
    candidates: BTreeMap<CandidateId, Candidate>,
    voters: BTreeMap<Principal, Voter>,
    schema_version: u32,
}

struct Settings {
    admin: Principal,
    policy: ElectionPolicy,
    phase: ElectionPhase,
}

impl State {
    fn election(&self) -> Result<Option<Election>, StoreError> {
        let Some(settings) = &self.settings else {
            return Ok(None);
        };
        rebuild_election(
            settings.admin,
            Some(settings.policy.clone()),
            Some(settings.phase),
            self.candidates.values().cloned().collect(),
            self.voters.values().cloned().collect(),
        )
        .map(Some)
    }

    fn write(&mut self, change: &StateChange) -> Result<(), StoreError> {
        match change {
            StateChange::Voter(voter) => {
                self.voters.insert(voter.principal, voter.clone());
            }
            StateChange::Candidate(candidate) => {
                self.candidates.insert(candidate.id, candidate.clone());
            }
            StateChange::Phase(phase) => {
                self.settings.as_mut().ok_or(StoreError::NoElection)?.phase = *phase;
            }
        }
        Ok(())
    }
}

/// An in-memory election + meta store for testing.
/// Thread-safe for use with tokio's multi-threaded runtime.
#[derive(Default)]
pub struct NullStore {
    state: Mutex<State>,
    fail_writes: AtomicBool,
}

impl NullStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail with a backend error until reset.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Backend("null store lock poisoned".into()))
    }

    fn ensure_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("writes disabled".into()));
        }
        Ok(())
    }
}

impl ElectionStore for NullStore {
    fn initialize(&self, admin: &Principal, policy: &ElectionPolicy) -> Result<(), StoreError> {
        self.ensure_writable()?;
        let mut state = self.lock()?;
        if let Some(existing) = &state.settings {
            return Err(StoreError::AlreadyInitialized {
                admin: existing.admin,
            });
        }
        state.settings = Some(Settings {
            admin: *admin,
            policy: policy.clone(),
            phase: ElectionPhase::Setup,
        });
        Ok(())
    }

    fn get_admin(&self) -> Result<Option<Principal>, StoreError> {
        Ok(self.lock()?.settings.as_ref().map(|s| s.admin))
    }

    fn get_policy(&self) -> Result<Option<ElectionPolicy>, StoreError> {
        Ok(self.lock()?.settings.as_ref().map(|s| s.policy.clone()))
    }

    fn get_phase(&self) -> Result<Option<ElectionPhase>, StoreError> {
        Ok(self.lock()?.settings.as_ref().map(|s| s.phase))
    }

    fn get_candidate(&self, id: CandidateId) -> Result<Option<Candidate>, StoreError> {
        Ok(self.lock()?.candidates.get(&id).cloned())
    }

    fn iter_candidates(&self) -> Result<Vec<Candidate>, StoreError> {
        Ok(self.lock()?.candidates.values().cloned().collect())
    }

    fn get_voter(&self, principal: &Principal) -> Result<Option<Voter>, StoreError> {
        Ok(self.lock()?.voters.get(principal).cloned())
    }

    fn iter_voters(&self) -> Result<Vec<Voter>, StoreError> {
        Ok(self.lock()?.voters.values().cloned().collect())
    }

    /// The mutex is held from load to write, standing in for LMDB's writer
    /// lock.
    fn update<R>(
        &self,
        f: impl FnOnce(&mut Election) -> (Vec<StateChange>, R),
    ) -> Result<(Election, R), StoreError> {
        let mut state = self.lock()?;
        let mut election = state.election()?.ok_or(StoreError::NoElection)?;
        let (changes, outcome) = f(&mut election);
        if !changes.is_empty() {
            self.ensure_writable()?;
            for change in &changes {
                state.write(change)?;
            }
        }
        Ok((election, outcome))
    }

    fn load_election(&self) -> Result<Option<Election>, StoreError> {
        self.lock()?.election()
    }
}

impl MetaStore for NullStore {
    fn get_schema_version(&self) -> Result<u32, StoreError> {
        Ok(self.lock()?.schema_version)
    }

    fn set_schema_version(&self, version: u32) -> Result<(), StoreError> {
        self.ensure_writable()?;
        self.lock()?.schema_version = version;
        Ok(())
    }
}
