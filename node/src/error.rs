use ballotbox_types::Principal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("election error: {0}")]
    Election(#[from] ballotbox_election::ElectionError),

    #[error("store error: {0}")]
    Store(#[from] ballotbox_store::StoreError),

    #[error("LMDB error: {0}")]
    Lmdb(#[from] ballotbox_store_lmdb::LmdbError),

    #[error("stored election belongs to {stored}, not the configured admin {configured}")]
    AdminMismatch {
        configured: Principal,
        stored: Principal,
    },

    #[error("no election has been initialised in this data directory")]
    NotInitialized,

    #[error("database integrity check failed: {0}")]
    Integrity(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
