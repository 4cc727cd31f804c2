//! Idempotent escalation: required reviewer groups are attached exactly
//! once.

use crate::config::ReviewerGroups;
use crate::sink::{RequestSink, SinkError};
use lineage_kernel::Escalations;

/// Attach every reviewer group the escalation set requires, skipping
/// groups already present in an active state.
///
/// Any sink failure here is terminal for the submission: a required
/// reviewer that cannot be recorded must not silently result in
/// auto-approval, so the caller overturns the decision on error.
pub fn apply_escalations(
    sink: &mut dyn RequestSink,
    request_id: &str,
    escalations: &Escalations,
    groups: &ReviewerGroups,
) -> Result<(), SinkError> {
    let mut required: Vec<&str> = Vec::new();
    if escalations.release_manager {
        required.push(&groups.release_manager);
    }
    if escalations.review_team {
        required.push(&groups.review_team);
    }
    if escalations.fork_review
        && let Some(group) = &groups.fork_review
    {
        required.push(group);
    }
    if let Some(group) = &escalations.custom_group {
        required.push(group);
    }

    for group in required {
        let attached = sink
            .reviewers(request_id)?
            .iter()
            .any(|reviewer| reviewer.group == group && reviewer.state.is_active());
        if attached {
            tracing::debug!(request_id, group, "reviewer group already attached");
            continue;
        }
        tracing::info!(request_id, group, "attaching reviewer group");
        sink.add_reviewer_group(request_id, group)?;
    }
    Ok(())
}
