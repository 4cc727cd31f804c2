//! Verification vocabulary: what comparing proposed sources against a
//! candidate branch can conclude.

use serde::{Deserialize, Serialize};

/// Outcome of the composite checksum verification for one candidate
/// branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifyOutcome {
    /// Current sources of the candidate branch match the checksum.
    Confirmed,
    /// An open request targeting the candidate would produce a match if
    /// accepted, or exists but cannot be resolved yet. Must never collapse
    /// into either of the other two states.
    Pending,
    /// No match now and none pending.
    NotFound,
}

impl VerifyOutcome {
    /// Whether this outcome terminates a widening fallback search.
    pub fn is_found(self) -> bool {
        !matches!(self, Self::NotFound)
    }
}

impl std::fmt::Display for VerifyOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Confirmed => write!(f, "confirmed"),
            Self::Pending => write!(f, "pending"),
            Self::NotFound => write!(f, "not-found"),
        }
    }
}

/// Primitive answer from the data source about open requests targeting a
/// candidate branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestMatch {
    /// An open request would produce the checksum if accepted.
    WouldMatch,
    /// An open request exists but its outcome is not yet resolvable.
    Unresolved,
    /// No open request targets the candidate for this package.
    NoMatch,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_not_found_continues_a_search() {
        assert!(VerifyOutcome::Confirmed.is_found());
        assert!(VerifyOutcome::Pending.is_found());
        assert!(!VerifyOutcome::NotFound.is_found());
    }
}
