//! Core configuration for snaplapse-core.

use serde::{Deserialize, Serialize};

use crate::error::TourError;

/// Tuning knobs for the keyframe store and the playback scheduler.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TourConfig {
    /// Period of the playback timer in milliseconds.
    pub tick_period_ms: f64,
    /// Decimal digits kept for desired durations.
    pub duration_decimals: u32,
    /// Visibility assumed for imported keyframes that predate the flag.
    pub legacy_description_visible: bool,
    /// Upper bound on listener requests applied after a single operation.
    pub max_deferred_requests: usize,
    /// Put the host back on its pre-tour playback rate when playback stops.
    pub restore_playback_rate: bool,
}

impl Default for TourConfig {
    fn default() -> Self {
        Self {
            tick_period_ms: 20.0,
            duration_decimals: 1,
            legacy_description_visible: true,
            max_deferred_requests: 64,
            restore_playback_rate: true,
        }
    }
}

impl TourConfig {
    pub fn from_json(s: &str) -> Result<Self, TourError> {
        Ok(serde_json::from_str(s)?)
    }
}
