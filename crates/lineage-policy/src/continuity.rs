//! Branch-continuity validation for forked packages.
//!
//! A fork has no upstream origin to verify against, so its source branch
//! history is inspected instead. The inspection itself is an external
//! concern behind this trait; the engine only consumes the answer.

use lineage_kernel::Submission;
use lineage_source::SourceError;

/// External collaborator judging whether a fork submission's source branch
/// is a legitimate continuation of the package's recorded history.
pub trait ContinuityValidator {
    fn continuity_ok(&self, submission: &Submission) -> Result<bool, SourceError>;
}

/// Accepts every submission. Used when no validator is wired in and
/// continuity enforcement rests entirely with the attached fork reviewers.
pub struct PermissiveContinuity;

impl ContinuityValidator for PermissiveContinuity {
    fn continuity_ok(&self, _submission: &Submission) -> Result<bool, SourceError> {
        Ok(true)
    }
}
