//! Decision engine for provenance review.
//!
//! The rule chain is an explicit dispatch over [`lineage_kernel::ClassifiedOrigin`]:
//! each arm is an independent function that accumulates escalation flags
//! and notes into a [`Verdict`] and either decides outright or falls
//! through to the shared trunk-verification step. No decision state is
//! ambient — everything a submission's review concludes travels in the
//! returned verdict.

pub mod continuity;
pub mod engine;
pub mod verdict;

pub use continuity::{ContinuityValidator, PermissiveContinuity};
pub use engine::{PolicyToggles, ReviewContext, review_submission};
pub use verdict::Verdict;
