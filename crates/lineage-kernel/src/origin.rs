//! Origin descriptors and their classification.
//!
//! Each branch generation records, per package, where that package's
//! sources are expected to come from. The descriptor grammar is tiny but
//! load-bearing: a plain branch name, a `Devel;<branch>;<package>` link,
//! the literal fork marker, or nothing at all.

use crate::error::OriginError;
use serde::{Deserialize, Serialize};

/// Literal descriptor marking an intentional permanent divergence.
pub const FORK_MARKER: &str = "FORK";

/// Tag prefix of devel-link descriptors.
pub const DEVEL_TAG: &str = "Devel";

/// Structured form of a raw origin descriptor.
///
/// Derived deterministically from the raw string and never mutated;
/// identical input always yields the identical variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifiedOrigin {
    /// Sources are expected to arrive unchanged from this branch.
    PlainBranch { branch: String },

    /// Sources must arrive from the recorded development branch, not the
    /// package's nominal trunk.
    DevelLink { branch: String },

    /// Intentional permanent divergence; no upstream branch expected.
    Fork,

    /// No recorded history. Treated as a new package.
    Unknown,
}

impl std::fmt::Display for ClassifiedOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PlainBranch { branch } => write!(f, "branch '{branch}'"),
            Self::DevelLink { branch } => write!(f, "devel link to '{branch}'"),
            Self::Fork => write!(f, "fork"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Classify a raw origin descriptor.
///
/// Rules, in order:
/// - absent or empty → [`ClassifiedOrigin::Unknown`]
/// - exact fork marker → [`ClassifiedOrigin::Fork`]
/// - `Devel;<branch>;<package>` → [`ClassifiedOrigin::DevelLink`]; any other
///   field count after the tag is a data-integrity error
/// - anything else → [`ClassifiedOrigin::PlainBranch`]
///
/// The devel-link package field is informational and only validated for
/// arity.
pub fn classify_origin(raw: Option<&str>) -> Result<ClassifiedOrigin, OriginError> {
    let Some(raw) = raw else {
        return Ok(ClassifiedOrigin::Unknown);
    };
    if raw.is_empty() {
        return Ok(ClassifiedOrigin::Unknown);
    }
    if raw == FORK_MARKER {
        return Ok(ClassifiedOrigin::Fork);
    }
    if let Some(fields) = raw.strip_prefix(DEVEL_TAG)
        && let Some(fields) = fields.strip_prefix(';')
    {
        let parts: Vec<&str> = fields.split(';').collect();
        if parts.len() != 2 || parts[0].is_empty() {
            return Err(OriginError::MalformedDevelLink {
                descriptor: raw.to_string(),
            });
        }
        return Ok(ClassifiedOrigin::DevelLink {
            branch: parts[0].to_string(),
        });
    }
    Ok(ClassifiedOrigin::PlainBranch {
        branch: raw.to_string(),
    })
}
