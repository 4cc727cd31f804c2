//! Data-source boundary for Lineage.
//!
//! This crate owns everything that touches the external build service,
//! behind a trait:
//! - [`SourceProvider`] — the read-only contract the review engine needs
//!   (source fingerprints, branch package listings, checksum primitives,
//!   lookup tables, devel links)
//! - [`Dataset`] — a deterministic file-backed implementation used by the
//!   CLI and tests; a network client is an integration point behind the
//!   same trait
//! - [`OriginTableBuilder`] / [`OriginTable`] — per-generation lookup
//!   snapshots with build/snapshot/reset semantics
//! - [`SourceVerifier`] — the caching composite that turns the checksum
//!   primitives into Confirmed / Pending / NotFound

pub mod dataset;
pub mod devel;
pub mod lookup;
pub mod provider;
pub mod verifier;

pub use dataset::{Dataset, DatasetDoc};
pub use devel::devel_branches;
pub use lookup::{OriginTable, OriginTableBuilder, OriginTables};
pub use provider::{DevelLink, SourceError, SourceProvider};
pub use verifier::SourceVerifier;
