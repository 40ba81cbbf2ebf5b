//! Schema version stamp, kept in the `meta` database next to the election
//! settings.

use ballotbox_store::{MetaStore, StoreError};

use crate::environment::LmdbEnvironment;
use crate::LmdbError;

const SCHEMA_VERSION_KEY: &str = "schema_version";

impl MetaStore for LmdbEnvironment {
    fn get_schema_version(&self) -> Result<u32, StoreError> {
        let rtxn = self.env().read_txn().map_err(LmdbError::from)?;
        let stored = self
            .meta_db
            .get(&rtxn, SCHEMA_VERSION_KEY.as_bytes())
            .map_err(LmdbError::from)?;
        let Some(bytes) = stored else {
            return Ok(0);
        };
        let arr: [u8; 4] = bytes.try_into().map_err(|_| {
            StoreError::Corruption(format!("schema version has {} bytes", bytes.len()))
        })?;
        Ok(u32::from_le_bytes(arr))
    }

    fn set_schema_version(&self, version: u32) -> Result<(), StoreError> {
        let mut batch = self.write_batch()?;
        batch.put_meta(SCHEMA_VERSION_KEY, &version.to_le_bytes())?;
        batch.commit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ballotbox_election::ElectionPolicy;
    use ballotbox_store::ElectionStore;
    use ballotbox_types::Principal;

    fn temp_env() -> (tempfile::TempDir, LmdbEnvironment) {
        let dir = tempfile::tempdir().unwrap();
        let env = LmdbEnvironment::open(dir.path(), 8, 10 * 1024 * 1024).unwrap();
        (dir, env)
    }

    #[test]
    fn unstamped_ledger_reports_version_zero() {
        let (_dir, env) = temp_env();
        assert_eq!(env.get_schema_version().unwrap(), 0);
        env.set_schema_version(3).unwrap();
        assert_eq!(env.get_schema_version().unwrap(), 3);
    }

    #[test]
    fn stamping_leaves_election_settings_alone() {
        let (_dir, env) = temp_env();
        let store = env.election_store();
        let admin = Principal::from_seed(0xaa);
        store.initialize(&admin, &ElectionPolicy::strict()).unwrap();
        env.set_schema_version(1).unwrap();
        assert_eq!(store.get_admin().unwrap(), Some(admin));
        assert_eq!(store.get_policy().unwrap(), Some(ElectionPolicy::strict()));
    }

    #[test]
    fn malformed_version_is_corruption() {
        let (_dir, env) = temp_env();
        let mut batch = env.write_batch().unwrap();
        batch.put_meta(SCHEMA_VERSION_KEY, &[1, 0]).unwrap();
        batch.commit().unwrap();
        assert!(matches!(
            env.get_schema_version(),
            Err(StoreError::Corruption(_))
        ));
    }
}
