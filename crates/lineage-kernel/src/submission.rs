//! The unit of review: one proposed source replacement.

use serde::{Deserialize, Serialize};

/// A package-submission request, immutable for the duration of one review
/// pass.
///
/// A submission proposes replacing `target_package`'s sources in
/// `target_branch` with the sources of `source_package` as found in
/// `source_branch` (optionally pinned to a revision).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    /// Identifier of the request in the external request tracker.
    pub request_id: String,
    pub source_branch: String,
    pub source_package: String,
    /// Revision of the source package, when the request pins one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_revision: Option<String>,
    pub target_branch: String,
    pub target_package: String,
}

impl Submission {
    /// Human-readable label for the proposed sources.
    pub fn source_label(&self) -> String {
        match &self.source_revision {
            Some(rev) => format!("{}/{}@{rev}", self.source_branch, self.source_package),
            None => format!("{}/{}", self.source_branch, self.source_package),
        }
    }

    /// Human-readable label for the replacement target.
    pub fn target_label(&self) -> String {
        format!("{}/{}", self.target_branch, self.target_package)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_include_revision_only_when_pinned() {
        let mut submission = Submission {
            request_id: "r1".to_string(),
            source_branch: "factory".to_string(),
            source_package: "widget".to_string(),
            source_revision: Some("7".to_string()),
            target_branch: "maple-15.3".to_string(),
            target_package: "widget".to_string(),
        };
        assert_eq!(submission.source_label(), "factory/widget@7");
        assert_eq!(submission.target_label(), "maple-15.3/widget");

        submission.source_revision = None;
        assert_eq!(submission.source_label(), "factory/widget");
    }
}
