//! Election lifecycle phase.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::TypesError;

/// The three phases of an election. Advances Setup → Open → Closed, never back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ElectionPhase {
    /// Registration of voters and candidates.
    Setup,
    /// Ballots are being cast.
    Open,
    /// Voting has ended. Terminal; the tally stays readable.
    Closed,
}

impl ElectionPhase {
    /// Whether voters and candidates may be registered.
    pub fn accepts_registration(&self) -> bool {
        matches!(self, Self::Setup)
    }

    /// Whether ballots may be cast.
    pub fn accepts_votes(&self) -> bool {
        matches!(self, Self::Open)
    }

    pub fn is_final(&self) -> bool {
        matches!(self, Self::Closed)
    }

    /// The only phase reachable from this one.
    pub fn successor(&self) -> Option<Self> {
        match self {
            Self::Setup => Some(Self::Open),
            Self::Open => Some(Self::Closed),
            Self::Closed => None,
        }
    }

    /// Human-readable name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }

    /// Single-byte storage encoding.
    pub fn to_byte(&self) -> u8 {
        match self {
            Self::Setup => 0,
            Self::Open => 1,
            Self::Closed => 2,
        }
    }

    pub fn from_byte(b: u8) -> Result<Self, TypesError> {
        match b {
            0 => Ok(Self::Setup),
            1 => Ok(Self::Open),
            2 => Ok(Self::Closed),
            other => Err(TypesError::UnknownPhase(other)),
        }
    }
}

impl fmt::Display for ElectionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn successors_are_linear() {
        assert_eq!(ElectionPhase::Setup.successor(), Some(ElectionPhase::Open));
        assert_eq!(ElectionPhase::Open.successor(), Some(ElectionPhase::Closed));
        assert_eq!(ElectionPhase::Closed.successor(), None);
    }

    #[test]
    fn byte_encoding_rejects_unknown() {
        for phase in [ElectionPhase::Setup, ElectionPhase::Open, ElectionPhase::Closed] {
            assert_eq!(ElectionPhase::from_byte(phase.to_byte()), Ok(phase));
        }
        assert_eq!(ElectionPhase::from_byte(9), Err(TypesError::UnknownPhase(9)));
    }
}
