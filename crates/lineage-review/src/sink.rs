//! The mutation contract against the external request tracker.

use lineage_kernel::Decision;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// State of one reviewer attached to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewState {
    New,
    Accepted,
    Declined,
    Dismissed,
}

impl ReviewState {
    /// Whether this reviewer still counts as attached for idempotence
    /// purposes. Declined or dismissed reviewers do not block a fresh
    /// attachment.
    pub fn is_active(self) -> bool {
        matches!(self, Self::New | Self::Accepted)
    }
}

/// One reviewer entry on a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewerEntry {
    pub group: String,
    pub state: ReviewState,
}

/// Review state recorded on the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestState {
    /// Evaluated but left open; re-evaluated on a later run.
    Seen,
    /// Terminal.
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestResult {
    Accepted,
    Declined,
}

/// The state mutation one review pass applies to a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Disposition {
    pub state: RequestState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<RequestResult>,
    pub message: String,
}

impl Disposition {
    /// Map a decision to its terminal request state.
    pub fn for_decision(decision: Decision, message: String) -> Self {
        let (state, result) = match decision {
            Decision::Approve => (RequestState::Done, Some(RequestResult::Accepted)),
            Decision::Reject => (RequestState::Done, Some(RequestResult::Declined)),
            Decision::Indeterminate => (RequestState::Seen, None),
        };
        Self {
            state,
            result,
            message,
        }
    }
}

/// Errors raised by the request tracker.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("request not found: {0}")]
    RequestNotFound(String),

    #[error("failed to attach reviewer group {group} to request {request_id}: {reason}")]
    AttachFailed {
        request_id: String,
        group: String,
        reason: String,
    },

    #[error("request mutation rejected: {0}")]
    Rejected(String),
}

/// Mutations the review applies to the external request tracker.
pub trait RequestSink {
    /// Reviewers currently attached to a request.
    fn reviewers(&self, request_id: &str) -> Result<Vec<ReviewerEntry>, SinkError>;

    /// Attach a reviewer group to a request.
    fn add_reviewer_group(&mut self, request_id: &str, group: &str) -> Result<(), SinkError>;

    /// Record the review outcome on a request.
    fn set_state(&mut self, request_id: &str, disposition: &Disposition)
    -> Result<(), SinkError>;
}

/// Tracked state of one request inside [`MemorySink`].
#[derive(Debug, Clone, Default)]
pub struct RecordedRequest {
    pub reviewers: Vec<ReviewerEntry>,
    pub disposition: Option<Disposition>,
}

/// In-memory request tracker, used for snapshot runs and tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    requests: BTreeMap<String, RecordedRequest>,
    failing_groups: BTreeSet<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a request so the sink can track mutations against it.
    pub fn seed_request(&mut self, request_id: &str) {
        self.requests.entry(request_id.to_string()).or_default();
    }

    /// Register a request with a reviewer already attached.
    pub fn seed_reviewer(&mut self, request_id: &str, group: &str, state: ReviewState) {
        self.requests
            .entry(request_id.to_string())
            .or_default()
            .reviewers
            .push(ReviewerEntry {
                group: group.to_string(),
                state,
            });
    }

    /// Make every attachment of `group` fail. Test knob for the
    /// escalation-failure path.
    pub fn fail_attachments_for(&mut self, group: &str) {
        self.failing_groups.insert(group.to_string());
    }

    pub fn request(&self, request_id: &str) -> Option<&RecordedRequest> {
        self.requests.get(request_id)
    }
}

impl RequestSink for MemorySink {
    fn reviewers(&self, request_id: &str) -> Result<Vec<ReviewerEntry>, SinkError> {
        self.requests
            .get(request_id)
            .map(|request| request.reviewers.clone())
            .ok_or_else(|| SinkError::RequestNotFound(request_id.to_string()))
    }

    fn add_reviewer_group(&mut self, request_id: &str, group: &str) -> Result<(), SinkError> {
        if self.failing_groups.contains(group) {
            return Err(SinkError::AttachFailed {
                request_id: request_id.to_string(),
                group: group.to_string(),
                reason: "tracker refused the reviewer".to_string(),
            });
        }
        let request = self
            .requests
            .get_mut(request_id)
            .ok_or_else(|| SinkError::RequestNotFound(request_id.to_string()))?;
        request.reviewers.push(ReviewerEntry {
            group: group.to_string(),
            state: ReviewState::New,
        });
        Ok(())
    }

    fn set_state(
        &mut self,
        request_id: &str,
        disposition: &Disposition,
    ) -> Result<(), SinkError> {
        let request = self
            .requests
            .get_mut(request_id)
            .ok_or_else(|| SinkError::RequestNotFound(request_id.to_string()))?;
        request.disposition = Some(disposition.clone());
        Ok(())
    }
}
