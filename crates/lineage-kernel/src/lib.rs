//! # Lineage Kernel
//!
//! Domain model for provenance-driven acceptance review: a submission
//! proposes replacing a package's sources in a target branch, and the
//! review decides whether those sources are consistent with the package's
//! recorded origin.
//!
//! ## Architecture
//!
//! ```text
//! Submission             ← One proposed source replacement, immutable
//!     │
//! ClassifiedOrigin       ← Structured form of a recorded origin descriptor
//!     │
//! BranchTopology         ← Trunk, stable generations, enterprise family
//!     │
//! VerifyOutcome          ← Confirmed / Pending / NotFound per candidate
//!     │
//! Decision + Escalations ← Approve / Reject / Indeterminate, plus the
//!                          human-reviewer roles the outcome requires
//! ```
//!
//! Everything here is pure: classification is a total function of the raw
//! descriptor, topology queries are string matching over configured names,
//! and no type in this crate performs I/O.

pub mod decision;
pub mod error;
pub mod origin;
pub mod submission;
pub mod topology;
pub mod verify;

pub use decision::{Decision, Escalations};
pub use error::OriginError;
pub use origin::{ClassifiedOrigin, DEVEL_TAG, FORK_MARKER, classify_origin};
pub use submission::Submission;
pub use topology::{BranchTopology, EnterpriseFamily, StableGeneration};
pub use verify::{RequestMatch, VerifyOutcome};
