//! The ballotbox node: opens the on-disk ledger and wires it to the service.

use ballotbox_store_lmdb::{
    check_data_dir, check_integrity, LmdbElectionStore, LmdbEnvironment, Migrator,
};

use crate::config::NodeConfig;
use crate::service::ElectionService;
use crate::NodeError;

pub struct BallotboxNode {
    config: NodeConfig,
    env: LmdbEnvironment,
    service: ElectionService<LmdbElectionStore>,
}

impl BallotboxNode {
    /// Open the ledger under `config.data_dir`, creating the election if the
    /// directory holds none. Needs `config.admin`.
    pub fn init(config: NodeConfig) -> Result<Self, NodeError> {
        let admin = config.admin.ok_or_else(|| {
            NodeError::Config("initialising an election needs an administrator".into())
        })?;
        let policy = config.policy.clone();
        Self::start(config, |store| ElectionService::open(store, admin, policy))
    }

    /// Open an existing ledger under `config.data_dir`.
    ///
    /// Nothing is created: a directory without a ledger is
    /// [`NodeError::NotInitialized`]. A configured `admin` must match the
    /// stored one.
    pub fn open(config: NodeConfig) -> Result<Self, NodeError> {
        if !config.data_dir.join("data.mdb").exists() {
            check_data_dir(&config.data_dir)?;
            return Err(NodeError::NotInitialized);
        }
        let admin = config.admin;
        Self::start(config, |store| ElectionService::load(store, admin))
    }

    /// Startup order: directory sanity check, environment open, schema
    /// migration, integrity check, then election restore.
    fn start(
        config: NodeConfig,
        restore: impl FnOnce(LmdbElectionStore) -> Result<ElectionService<LmdbElectionStore>, NodeError>,
    ) -> Result<Self, NodeError> {
        check_data_dir(&config.data_dir)?;
        let env = LmdbEnvironment::open(
            &config.data_dir,
            ballotbox_store_lmdb::environment::DEFAULT_MAX_DBS,
            config.map_size_bytes(),
        )?;

        Migrator::run(&env)?;

        let report = check_integrity(env.env())?;
        if !report.is_healthy() {
            return Err(NodeError::Integrity(report.errors.join("; ")));
        }
        tracing::debug!(
            databases = report.databases_checked,
            entries = report.total_entries,
            "integrity check passed"
        );

        let service = restore(env.election_store())?;

        tracing::info!(data_dir = %config.data_dir.display(), "node opened");
        Ok(Self {
            config,
            env,
            service,
        })
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn service(&self) -> &ElectionService<LmdbElectionStore> {
        &self.service
    }

    pub fn environment(&self) -> &LmdbEnvironment {
        &self.env
    }
}
