//! Camera interpolation over a single keyframe interval.

use crate::data::Bounds;
use crate::interval::KeyframeInterval;

/// Interpolated view for `elapsed_millis`, or `None` when the time lies outside the interval.
///
/// Plain per-axis linear interpolation, no easing. Intervals with a zero desired duration
/// cut straight to the end keyframe's view.
pub fn compute_bounds(interval: &KeyframeInterval, elapsed_millis: f64) -> Option<Bounds> {
    if !interval.contains(elapsed_millis) {
        return None;
    }
    let span = interval.desired_duration_millis();
    if span == 0.0 || elapsed_millis == interval.ending_running_duration_millis {
        return Some(interval.end.bounds);
    }
    let t = (elapsed_millis - interval.starting_running_duration_millis) / span;
    Some(interval.start.bounds.lerp(&interval.end.bounds, t))
}
