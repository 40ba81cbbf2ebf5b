//! Fundamental types for the ballotbox election ledger.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! principals, candidate and voter records, the election phase and caller roles.

pub mod candidate;
pub mod error;
pub mod phase;
pub mod principal;
pub mod role;
pub mod voter;

pub use candidate::{Candidate, CandidateId};
pub use error::TypesError;
pub use phase::ElectionPhase;
pub use principal::Principal;
pub use role::Role;
pub use voter::Voter;
