//! Write batching: groups election record writes into a single LMDB write
//! transaction so that a call's changes land together.
//!
//! # Usage
//!
//! ```ignore
//! let mut batch = env.write_batch()?;
//! batch.put_voter(&voter)?;
//! batch.put_candidate(&candidate)?;
//! batch.commit()?;
//! ```
//!
//! If the batch is dropped without calling [`WriteBatch::commit`], all
//! operations are rolled back (the underlying LMDB transaction is aborted).

use heed::RwTxn;

use ballotbox_election::{ElectionPolicy, StateChange};
use ballotbox_store::election::keys;
use ballotbox_store::StoreError;
use ballotbox_types::{Candidate, ElectionPhase, Principal, Voter};

use crate::election::{encode, Records};
use crate::environment::LmdbEnvironment;
use crate::LmdbError;

pub struct WriteBatch<'a> {
    txn: RwTxn<'a>,
    env: &'a LmdbEnvironment,
}

impl<'a> WriteBatch<'a> {
    pub(crate) fn new(env: &'a LmdbEnvironment) -> Result<Self, StoreError> {
        let txn = env.env().write_txn().map_err(LmdbError::from)?;
        Ok(Self { txn, env })
    }

    /// Reads through this batch's transaction, including its own uncommitted
    /// writes.
    pub(crate) fn records(&self) -> Records<'_, 'a> {
        Records::new(self.env, &self.txn)
    }

    pub fn put_admin(&mut self, admin: &Principal) -> Result<(), StoreError> {
        self.put_meta(keys::ADMIN, admin.as_bytes())
    }

    pub fn put_policy(&mut self, policy: &ElectionPolicy) -> Result<(), StoreError> {
        let bytes = encode(policy)?;
        self.put_meta(keys::POLICY, &bytes)
    }

    pub fn put_phase(&mut self, phase: ElectionPhase) -> Result<(), StoreError> {
        self.put_meta(keys::PHASE, &[phase.to_byte()])
    }

    pub(crate) fn put_meta(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.env
            .meta_db
            .put(&mut self.txn, key.as_bytes(), value)
            .map_err(LmdbError::from)?;
        Ok(())
    }

    /// Insert or overwrite a candidate, keyed by its big-endian id.
    pub fn put_candidate(&mut self, candidate: &Candidate) -> Result<(), StoreError> {
        let bytes = encode(candidate)?;
        self.env
            .candidates_db
            .put(&mut self.txn, &candidate.id.to_key(), &bytes)
            .map_err(LmdbError::from)?;
        Ok(())
    }

    /// Insert or overwrite a voter, keyed by the raw principal bytes.
    pub fn put_voter(&mut self, voter: &Voter) -> Result<(), StoreError> {
        let bytes = encode(voter)?;
        self.env
            .voters_db
            .put(&mut self.txn, voter.principal.as_bytes(), &bytes)
            .map_err(LmdbError::from)?;
        Ok(())
    }

    pub fn apply(&mut self, change: &StateChange) -> Result<(), StoreError> {
        match change {
            StateChange::Voter(voter) => self.put_voter(voter),
            StateChange::Candidate(candidate) => self.put_candidate(candidate),
            StateChange::Phase(phase) => self.put_phase(*phase),
        }
    }

    /// Commit all buffered writes atomically.
    pub fn commit(self) -> Result<(), StoreError> {
        self.txn.commit().map_err(LmdbError::from)?;
        Ok(())
    }
}
