//! The role a principal plays in an election.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// The administrator fixed when the election was created.
    Admin,
    /// A principal with a voter record.
    RegisteredVoter,
    /// Anyone else.
    Unregistered,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::RegisteredVoter => "registered voter",
            Self::Unregistered => "unregistered",
        }
    }
}
