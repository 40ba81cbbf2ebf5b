//! Schema bookkeeping.

use crate::StoreError;

/// Tracks the on-disk schema version so older ledgers can be migrated and
/// newer ones refused.
pub trait MetaStore {
    /// Stored schema version, or 0 for a ledger that was never stamped.
    fn get_schema_version(&self) -> Result<u32, StoreError>;

    fn set_schema_version(&self, version: u32) -> Result<(), StoreError>;
}
