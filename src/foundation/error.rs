/// Convenience result type used across capsync.
pub type CapsyncResult<T> = Result<T, CapsyncError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Overlapping caption windows are intentionally NOT part of this taxonomy:
/// they are recovered locally with a deterministic tie-break and surfaced as
/// diagnostics (see [`crate::CaptionTrack::overlaps`]).
#[derive(thiserror::Error, Debug)]
pub enum CapsyncError {
    /// Invalid grouping data: out-of-range index, empty group, or indices
    /// that are not strictly increasing within a group.
    #[error("grouping error: {0}")]
    Grouping(String),

    /// Invalid user-provided input outside the grouping itself (word
    /// timestamps, fps, canvas, style parameters).
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while rasterizing or encoding frames. Never raised by the
    /// pure per-frame caption functions.
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CapsyncError {
    /// Build a [`CapsyncError::Grouping`] value.
    pub fn grouping(msg: impl Into<String>) -> Self {
        Self::Grouping(msg.into())
    }

    /// Build a [`CapsyncError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`CapsyncError::Evaluation`] value.
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    /// Build a [`CapsyncError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
