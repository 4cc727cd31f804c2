//! Review decisions and escalation flags.

use serde::{Deserialize, Serialize};

/// Terminal conclusion of one submission's review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approve,
    Reject,
    /// Wait — the outcome depends on another in-flight request. The
    /// submission is left open and re-evaluated on a later run.
    Indeterminate,
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Approve => write!(f, "approve"),
            Self::Reject => write!(f, "reject"),
            Self::Indeterminate => write!(f, "indeterminate"),
        }
    }
}

/// Human-reviewer roles a decision requires on the request.
///
/// Flags accumulate through the rule chain and are applied by the
/// escalation controller; they are part of the returned verdict, never
/// ambient state carried between submissions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Escalations {
    /// Release management must sign off.
    #[serde(default)]
    pub release_manager: bool,
    /// The general review team must look at sources that verification
    /// could not anchor to a maintained branch.
    #[serde(default)]
    pub review_team: bool,
    /// Dedicated review of an intentionally forked package.
    #[serde(default)]
    pub fork_review: bool,
    /// An operator-configured extra group, attached by name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_group: Option<String>,
}

impl Escalations {
    /// Whether no escalation is required.
    pub fn is_empty(&self) -> bool {
        !self.release_manager
            && !self.review_team
            && !self.fork_review
            && self.custom_group.is_none()
    }
}
