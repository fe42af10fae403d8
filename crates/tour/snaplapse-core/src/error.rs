//! Error types for the tour engine

use serde::{Deserialize, Serialize};

/// Error type for fallible tour operations.
///
/// The host-facing API mostly degrades to sentinel values (`bool` / `Option`);
/// these variants carry the reason when the `Result` forms are used.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum TourError {
    /// No keyframe carries this id
    #[error("Keyframe not found: {id}")]
    KeyframeNotFound { id: String },

    /// Document lacks the `snaplapse.keyframes` array
    #[error("Invalid snaplapse document: {reason}")]
    InvalidDocument { reason: String },

    /// A single keyframe entry failed validation
    #[error("Invalid keyframe at index {index}: {reason}")]
    InvalidKeyframe { index: usize, reason: String },

    /// Text could not be parsed or produced
    #[error("Serialization error: {reason}")]
    Serialization { reason: String },

    /// Fewer than two keyframes remain from the requested start
    #[error("Not enough keyframes to play: {count}")]
    NotEnoughKeyframes { count: usize },

    /// A playback session lost track of its position
    #[error("Playback desynchronized at {elapsed_ms} ms")]
    Desynchronized { elapsed_ms: f64 },

    /// A listener reported failure during dispatch
    #[error("Listener failed on {event}: {reason}")]
    Listener { event: String, reason: String },
}

impl TourError {
    /// Error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::KeyframeNotFound { .. } => "data",
            Self::InvalidDocument { .. } | Self::InvalidKeyframe { .. } => "validation",
            Self::Serialization { .. } => "serialization",
            Self::NotEnoughKeyframes { .. } | Self::Desynchronized { .. } => "playback",
            Self::Listener { .. } => "listener",
        }
    }
}

impl From<serde_json::Error> for TourError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            reason: err.to_string(),
        }
    }
}
