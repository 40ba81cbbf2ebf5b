//! LMDB implementation of ElectionStore.
//!
//! Layout:
//! - `meta`: `admin` (20 raw bytes), `policy` (bincode), `phase` (one byte)
//! - `candidates`: big-endian `u32` id -> bincode [`Candidate`]
//! - `voters`: 20-byte principal -> bincode [`Voter`]
//!
//! Big-endian candidate keys make LMDB's byte order match id order, so a plain
//! cursor walk yields candidates in registration order.

use heed::RoTxn;
use serde::de::DeserializeOwned;
use serde::Serialize;

use ballotbox_election::{Election, ElectionPolicy, StateChange};
use ballotbox_store::election::{keys, rebuild_election};
use ballotbox_store::{ElectionStore, StoreError};
use ballotbox_types::{Candidate, CandidateId, ElectionPhase, Principal, Voter};

use crate::environment::LmdbEnvironment;
use crate::LmdbError;

pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, LmdbError> {
    Ok(bincode::serialize(value)?)
}

pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, LmdbError> {
    Ok(bincode::deserialize(bytes)?)
}

/// Typed reads over any transaction, read-only or the one a [`WriteBatch`]
/// holds.
///
/// [`WriteBatch`]: crate::WriteBatch
pub(crate) struct Records<'t, 'e> {
    env: &'t LmdbEnvironment,
    txn: &'t RoTxn<'e>,
}

impl<'t, 'e> Records<'t, 'e> {
    pub(crate) fn new(env: &'t LmdbEnvironment, txn: &'t RoTxn<'e>) -> Self {
        Self { env, txn }
    }

    fn meta(&self, key: &str) -> Result<Option<&'t [u8]>, StoreError> {
        let val = self
            .env
            .meta_db
            .get(self.txn, key.as_bytes())
            .map_err(LmdbError::from)?;
        Ok(val)
    }

    pub(crate) fn admin(&self) -> Result<Option<Principal>, StoreError> {
        self.meta(keys::ADMIN)?
            .map(|bytes| {
                Principal::from_slice(bytes)
                    .map_err(|e| StoreError::Corruption(format!("stored admin: {e}")))
            })
            .transpose()
    }

    pub(crate) fn policy(&self) -> Result<Option<ElectionPolicy>, StoreError> {
        self.meta(keys::POLICY)?
            .map(|bytes| decode(bytes).map_err(StoreError::from))
            .transpose()
    }

    pub(crate) fn phase(&self) -> Result<Option<ElectionPhase>, StoreError> {
        let Some(bytes) = self.meta(keys::PHASE)? else {
            return Ok(None);
        };
        match bytes {
            [b] => ElectionPhase::from_byte(*b)
                .map(Some)
                .map_err(|e| StoreError::Corruption(format!("stored phase: {e}"))),
            _ => Err(StoreError::Corruption(format!(
                "stored phase has {} bytes",
                bytes.len()
            ))),
        }
    }

    pub(crate) fn candidate(&self, id: CandidateId) -> Result<Option<Candidate>, StoreError> {
        let val = self
            .env
            .candidates_db
            .get(self.txn, &id.to_key())
            .map_err(LmdbError::from)?;
        match val {
            Some(bytes) => Ok(Some(decode(bytes)?)),
            None => Ok(None),
        }
    }

    pub(crate) fn candidates(&self) -> Result<Vec<Candidate>, StoreError> {
        let mut candidates = Vec::new();
        for entry in self
            .env
            .candidates_db
            .iter(self.txn)
            .map_err(LmdbError::from)?
        {
            let (key, value) = entry.map_err(LmdbError::from)?;
            let candidate: Candidate = decode(value)?;
            if CandidateId::from_key(key) != Some(candidate.id) {
                return Err(StoreError::Corruption(format!(
                    "candidate {} stored under a mismatched key",
                    candidate.id
                )));
            }
            candidates.push(candidate);
        }
        Ok(candidates)
    }

    pub(crate) fn voter(&self, principal: &Principal) -> Result<Option<Voter>, StoreError> {
        let val = self
            .env
            .voters_db
            .get(self.txn, principal.as_bytes())
            .map_err(LmdbError::from)?;
        match val {
            Some(bytes) => Ok(Some(decode(bytes)?)),
            None => Ok(None),
        }
    }

    pub(crate) fn voters(&self) -> Result<Vec<Voter>, StoreError> {
        let mut voters = Vec::new();
        for entry in self.env.voters_db.iter(self.txn).map_err(LmdbError::from)? {
            let (_, value) = entry.map_err(LmdbError::from)?;
            voters.push(decode(value)?);
        }
        Ok(voters)
    }

    /// The whole election as of this transaction.
    pub(crate) fn election(&self) -> Result<Option<Election>, StoreError> {
        let Some(admin) = self.admin()? else {
            return Ok(None);
        };
        rebuild_election(
            admin,
            self.policy()?,
            self.phase()?,
            self.candidates()?,
            self.voters()?,
        )
        .map(Some)
    }
}

pub struct LmdbElectionStore {
    env: LmdbEnvironment,
}

impl LmdbElectionStore {
    pub(crate) fn new(env: LmdbEnvironment) -> Self {
        Self { env }
    }

    /// Run `read` against a fresh read-only snapshot.
    fn read<T>(
        &self,
        read: impl FnOnce(&Records<'_, '_>) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let rtxn = self.env.env().read_txn().map_err(LmdbError::from)?;
        read(&Records::new(&self.env, &rtxn))
    }
}

impl ElectionStore for LmdbElectionStore {
    fn initialize(&self, admin: &Principal, policy: &ElectionPolicy) -> Result<(), StoreError> {
        let mut batch = self.env.write_batch()?;
        if let Some(existing) = batch.records().admin()? {
            return Err(StoreError::AlreadyInitialized { admin: existing });
        }
        batch.put_admin(admin)?;
        batch.put_policy(policy)?;
        batch.put_phase(ElectionPhase::Setup)?;
        batch.commit()?;
        tracing::info!(admin = %admin, "election initialised");
        Ok(())
    }

    fn get_admin(&self) -> Result<Option<Principal>, StoreError> {
        self.read(|records| records.admin())
    }

    fn get_policy(&self) -> Result<Option<ElectionPolicy>, StoreError> {
        self.read(|records| records.policy())
    }

    fn get_phase(&self) -> Result<Option<ElectionPhase>, StoreError> {
        self.read(|records| records.phase())
    }

    fn get_candidate(&self, id: CandidateId) -> Result<Option<Candidate>, StoreError> {
        self.read(|records| records.candidate(id))
    }

    fn iter_candidates(&self) -> Result<Vec<Candidate>, StoreError> {
        self.read(|records| records.candidates())
    }

    fn get_voter(&self, principal: &Principal) -> Result<Option<Voter>, StoreError> {
        self.read(|records| records.voter(principal))
    }

    fn iter_voters(&self) -> Result<Vec<Voter>, StoreError> {
        self.read(|records| records.voters())
    }

    /// LMDB admits one write transaction per environment across all
    /// processes, so loading inside it gives the exclusion this needs.
    fn update<R>(
        &self,
        f: impl FnOnce(&mut Election) -> (Vec<StateChange>, R),
    ) -> Result<(Election, R), StoreError> {
        let mut batch = self.env.write_batch()?;
        let mut election = batch.records().election()?.ok_or(StoreError::NoElection)?;
        let (changes, outcome) = f(&mut election);
        if !changes.is_empty() {
            for change in &changes {
                batch.apply(change)?;
            }
            batch.commit()?;
            tracing::trace!(changes = changes.len(), "state changes committed");
        }
        Ok((election, outcome))
    }

    /// All records come from one snapshot, so a concurrent commit is seen
    /// entirely or not at all.
    fn load_election(&self) -> Result<Option<Election>, StoreError> {
        self.read(|records| records.election())
    }
}
