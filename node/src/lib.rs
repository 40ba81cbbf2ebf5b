//! ballotbox node: owns the election and its storage.
//!
//! - Restores the election from LMDB on startup, checking schema and integrity
//! - Applies each signed call inside one LMDB write transaction, against the
//!   state stored at that moment
//! - Applies batches of calls with one storage commit
//! - Serves read-only queries concurrently

pub mod config;
pub mod error;
pub mod logging;
pub mod node;
pub mod service;

pub use config::NodeConfig;
pub use error::NodeError;
pub use logging::{init_logging, LogFormat};
pub use node::BallotboxNode;
pub use service::ElectionService;
