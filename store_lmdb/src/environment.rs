//! LMDB environment setup.

use std::path::Path;
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};

use ballotbox_store::StoreError;

use crate::election::LmdbElectionStore;
use crate::write_batch::WriteBatch;
use crate::LmdbError;

/// Number of named databases the election schema uses, with headroom.
pub const DEFAULT_MAX_DBS: u32 = 8;

/// Wraps the LMDB environment and all database handles.
///
/// Cloning is cheap: the environment is shared and database handles are
/// plain identifiers.
#[derive(Clone)]
pub struct LmdbEnvironment {
    env: Arc<Env>,
    pub(crate) meta_db: Database<Bytes, Bytes>,
    pub(crate) candidates_db: Database<Bytes, Bytes>,
    pub(crate) voters_db: Database<Bytes, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given path.
    pub fn open(path: &Path, max_dbs: u32, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)?;

        // SAFETY: the environment is opened once per path by this process and
        // the memory map is never modified outside of heed transactions.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(max_dbs)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let meta_db = env.create_database(&mut wtxn, Some("meta"))?;
        let candidates_db = env.create_database(&mut wtxn, Some("candidates"))?;
        let voters_db = env.create_database(&mut wtxn, Some("voters"))?;
        wtxn.commit()?;

        tracing::debug!(path = %path.display(), map_size, "opened LMDB environment");

        Ok(Self {
            env: Arc::new(env),
            meta_db,
            candidates_db,
            voters_db,
        })
    }

    pub fn env(&self) -> &Env {
        &self.env
    }

    pub fn election_store(&self) -> LmdbElectionStore {
        LmdbElectionStore::new(self.clone())
    }

    /// Begin a write batch. Nothing is visible to readers until
    /// [`WriteBatch::commit`].
    pub fn write_batch(&self) -> Result<WriteBatch<'_>, StoreError> {
        WriteBatch::new(self)
    }
}
