//! LMDB storage backend for the ballotbox election ledger.
//!
//! Implements the storage traits from `ballotbox-store` using the `heed` LMDB
//! bindings. Election settings, candidates and voters live in separate
//! databases within a single environment.

pub mod election;
pub mod environment;
pub mod error;
pub mod integrity;
pub mod meta;
pub mod migration;
pub mod write_batch;

pub use election::LmdbElectionStore;
pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use integrity::{check_data_dir, check_integrity, IntegrityReport};
pub use migration::{Migrator, CURRENT_SCHEMA_VERSION};
pub use write_batch::WriteBatch;
