//! Keyframe intervals: the timed segments between consecutive keyframes.
//!
//! A chain is a plain `Vec` in playback order; the scheduler walks it with an index cursor.

use serde::Serialize;

use crate::data::{normalize_time, Keyframe};

/// Transition from `start` to `end` with precomputed timing metadata.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct KeyframeInterval {
    pub start: Keyframe,
    pub end: Keyframe,
    /// +1 when video time runs forward over this segment, -1 otherwise.
    pub time_direction: f64,
    /// Real video-time gap in seconds.
    pub actual_duration: f64,
    /// Playback seconds the segment should take.
    pub desired_duration: f64,
    pub playback_rate: f64,
    pub starting_running_duration_millis: f64,
    pub ending_running_duration_millis: f64,
}

impl KeyframeInterval {
    /// Build the segment `start -> end`, continuing the running clock of `previous`.
    pub fn new(start: &Keyframe, end: &Keyframe, previous: Option<&KeyframeInterval>) -> Self {
        let time_direction = if start.time <= end.time { 1.0 } else { -1.0 };
        let actual_duration = normalize_time((end.time - start.time).abs());
        let desired_duration = start.duration.unwrap_or(actual_duration);
        let playback_rate = if desired_duration == 0.0 || actual_duration == 0.0 {
            0.0
        } else {
            time_direction * actual_duration / desired_duration
        };
        let starting = previous.map_or(0.0, |p| p.ending_running_duration_millis);

        Self {
            start: start.clone(),
            end: end.clone(),
            time_direction,
            actual_duration,
            desired_duration,
            playback_rate,
            starting_running_duration_millis: starting,
            ending_running_duration_millis: starting + desired_duration * 1000.0,
        }
    }

    #[inline]
    pub fn desired_duration_millis(&self) -> f64 {
        self.desired_duration * 1000.0
    }

    /// Inclusive on both ends.
    #[inline]
    pub fn contains(&self, elapsed_millis: f64) -> bool {
        elapsed_millis >= self.starting_running_duration_millis
            && elapsed_millis <= self.ending_running_duration_millis
    }

    /// Fraction of the segment's video-time span covered once the host reports `video_time`.
    /// Zero for segments without a real time gap.
    pub fn elapsed_fraction(&self, video_time: f64) -> f64 {
        if self.actual_duration == 0.0 {
            0.0
        } else {
            (video_time - self.start.time).abs() / self.actual_duration
        }
    }
}

/// Build the interval chain for `keyframes[start_index..]`.
/// Fewer than two keyframes from `start_index` produce an empty chain.
pub fn build_chain(keyframes: &[Keyframe], start_index: usize) -> Vec<KeyframeInterval> {
    let first = start_index.saturating_add(1);
    let mut chain: Vec<KeyframeInterval> =
        Vec::with_capacity(keyframes.len().saturating_sub(first));
    for k in first..keyframes.len() {
        let interval = KeyframeInterval::new(&keyframes[k - 1], &keyframes[k], chain.last());
        chain.push(interval);
    }
    chain
}

/// Sum of desired segment durations in milliseconds.
pub fn total_duration_millis(chain: &[KeyframeInterval]) -> f64 {
    chain.last().map_or(0.0, |i| i.ending_running_duration_millis)
}
