use thiserror::Error;

use ballotbox_store::StoreError;

#[derive(Debug, Error)]
pub enum LmdbError {
    #[error("LMDB error: {0}")]
    Heed(String),

    #[error("record encoding error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0} is not empty but holds no ledger")]
    ForeignDirectory(String),

    #[error("ledger schema version {found} is newer than supported version {supported}")]
    SchemaTooNew { found: u32, supported: u32 },

    #[error("no migration from schema version {from} to {to}")]
    UnknownMigration { from: u32, to: u32 },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<heed::Error> for LmdbError {
    fn from(e: heed::Error) -> Self {
        LmdbError::Heed(e.to_string())
    }
}

impl From<bincode::Error> for LmdbError {
    fn from(e: bincode::Error) -> Self {
        LmdbError::Serialization(e.to_string())
    }
}

impl From<LmdbError> for StoreError {
    fn from(e: LmdbError) -> Self {
        match e {
            LmdbError::Store(inner) => inner,
            LmdbError::Serialization(msg) => StoreError::Encoding(msg),
            other => StoreError::Backend(other.to_string()),
        }
    }
}
