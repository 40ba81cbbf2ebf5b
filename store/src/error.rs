use ballotbox_types::Principal;
use thiserror::Error;

/// Failures reported by an election store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no election has been initialised in this store")]
    NoElection,

    #[error("an election administered by {admin} already exists")]
    AlreadyInitialized { admin: Principal },

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("record encoding error: {0}")]
    Encoding(String),

    #[error("stored election is inconsistent: {0}")]
    Corruption(String),
}
