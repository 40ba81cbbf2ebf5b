//! Abstract storage traits for the ballotbox election ledger.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The rest of the codebase depends only on the traits.

pub mod election;
pub mod error;
pub mod meta;

pub use election::ElectionStore;
pub use error::StoreError;
pub use meta::MetaStore;
