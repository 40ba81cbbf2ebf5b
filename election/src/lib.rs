//! Election state machine for the ballotbox ledger.
//!
//! Two-phase election run by a single administrator:
//! Setup (register voters and candidates) → Open (cast ballots) → Closed.
//!
//! Key principle: one registered voter = one irrevocable vote.
//! Every mutation is checked in full before anything is written, so a rejected
//! call never leaves partial state behind. The tally is a pure projection over
//! the recorded votes and is recomputed on every query.

pub mod ballot;
pub mod call;
pub mod election;
pub mod error;
pub mod phase;
pub mod policy;
pub mod registry;
pub mod tally;

pub use call::{ElectionCall, Operation, SignedCall, StateChange};
pub use election::Election;
pub use error::ElectionError;
pub use phase::PhaseController;
pub use policy::ElectionPolicy;
pub use registry::Registry;
pub use tally::{rank, ElectionStatus, Standing};
