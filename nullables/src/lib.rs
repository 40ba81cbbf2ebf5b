//! Nullable infrastructure for deterministic testing.
//!
//! Storage is abstracted behind the `ballotbox-store` traits. This crate
//! provides an implementation that keeps everything in memory, never touches
//! the filesystem, and can be told to fail writes on demand.
//!
//! Usage: swap the LMDB store for [`NullStore`] in tests.

pub mod store;

pub use store::NullStore;
