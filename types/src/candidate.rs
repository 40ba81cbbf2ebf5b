//! Candidate records and their identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::TypesError;

/// Sequential candidate identifier. The first registered candidate is `1`.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CandidateId(u32);

impl CandidateId {
    /// The id handed to the first registered candidate.
    pub const FIRST: Self = Self(1);

    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u32 {
        self.0
    }

    /// The id following this one, or `None` on overflow.
    pub fn next(&self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }

    /// Big-endian key bytes, so LMDB iterates candidates in id order.
    pub fn to_key(&self) -> [u8; 4] {
        self.0.to_be_bytes()
    }

    pub fn from_key(bytes: &[u8]) -> Option<Self> {
        let arr: [u8; 4] = bytes.try_into().ok()?;
        Some(Self(u32::from_be_bytes(arr)))
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CandidateId {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<u32>() {
            Ok(id) if id > 0 => Ok(Self(id)),
            _ => Err(TypesError::InvalidCandidateId(s.to_string())),
        }
    }
}

/// A declared candidate. Only `vote_count` changes after registration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub name: String,
    pub affiliation: String,
    pub vote_count: u64,
}

impl Candidate {
    pub fn new(id: CandidateId, name: impl Into<String>, affiliation: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            affiliation: affiliation.into(),
            vote_count: 0,
        }
    }
}
