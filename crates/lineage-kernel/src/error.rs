//! Error types for kernel-level classification.

/// Errors arising from malformed origin descriptors.
///
/// Absence of a descriptor is never an error — it classifies as
/// [`crate::ClassifiedOrigin::Unknown`]. Only descriptors that claim a
/// structured form and fail to parse land here; they are data-integrity
/// failures and must never be silently coerced into a plain branch.
#[derive(Debug, thiserror::Error)]
pub enum OriginError {
    /// A devel-link descriptor with the wrong number of fields.
    #[error("malformed devel-link descriptor: {descriptor}")]
    MalformedDevelLink { descriptor: String },
}
