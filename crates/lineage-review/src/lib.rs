//! Batch review orchestration.
//!
//! Everything between the pure decision engine and the outside world:
//! - [`RequestSink`] — the mutation contract against the request tracker,
//!   with an in-memory implementation
//! - [`apply_escalations`] — idempotent attachment of required reviewer
//!   groups
//! - [`ReviewConfig`] — TOML configuration carrying topology, groups, and
//!   policy toggles
//! - [`run_batch`] — the sequential sweep: build lookup snapshots once,
//!   evaluate each submission in isolation, map decisions to terminal
//!   request states, report.

pub mod config;
pub mod escalate;
pub mod runner;
pub mod sink;

pub use config::{ConfigError, ReviewConfig, ReviewerGroups};
pub use escalate::apply_escalations;
pub use runner::{BatchReport, SubmissionReport, build_tables, run_batch};
pub use sink::{
    Disposition, MemorySink, RequestResult, RequestSink, RequestState, ReviewState, ReviewerEntry,
    SinkError,
};
