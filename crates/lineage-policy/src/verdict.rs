//! The accumulating result record of one submission's review.

use lineage_kernel::{Decision, Escalations};
use serde::Serialize;

/// Everything one review pass concluded about a submission.
///
/// Threaded mutably through the rule chain and returned; never stored
/// between submissions. `notes` is the ordered human-readable trail that
/// becomes the review message, `errors` carries data-integrity diagnostics
/// the operator must see.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub decision: Decision,
    pub escalations: Escalations,
    /// The request duplicates what automation would have created once its
    /// upstream counterpart is accepted.
    pub automatic_submission: bool,
    /// Whether the proposed sources were found in trunk. `None` when
    /// trunk presence was never evaluated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trunk_presence: Option<bool>,
    /// An open trunk request would settle this submission.
    pub pending_trunk_submission: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl Verdict {
    /// Fresh record, undecided until the rule chain concludes.
    pub fn new() -> Self {
        Self {
            decision: Decision::Indeterminate,
            escalations: Escalations::default(),
            automatic_submission: false,
            trunk_presence: None,
            pending_trunk_submission: false,
            notes: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    pub fn error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }

    /// Notes and errors deduplicated in order of first occurrence. The
    /// review message posted to the request.
    pub fn message_lines(&self) -> Vec<String> {
        let mut seen = std::collections::BTreeSet::new();
        self.notes
            .iter()
            .chain(self.errors.iter())
            .filter(|line| seen.insert(line.as_str()))
            .cloned()
            .collect()
    }
}

impl Default for Verdict {
    fn default() -> Self {
        Self::new()
    }
}
