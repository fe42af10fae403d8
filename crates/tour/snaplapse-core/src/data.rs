//! Canonical keyframe data model.

use serde::{Deserialize, Serialize};

use crate::ids::KeyframeId;

/// View rectangle in the media's pixel coordinate space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl Bounds {
    pub const fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
        }
    }

    /// Per-axis linear blend; `t` is not clamped.
    #[inline]
    pub fn lerp(&self, other: &Bounds, t: f64) -> Bounds {
        Bounds {
            xmin: lerp(self.xmin, other.xmin, t),
            ymin: lerp(self.ymin, other.ymin, t),
            xmax: lerp(self.xmax, other.xmax, t),
            ymax: lerp(self.ymax, other.ymax, t),
        }
    }
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// One recorded waypoint of a tour.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub id: KeyframeId,
    /// Video time in seconds.
    pub time: f64,
    pub bounds: Bounds,
    /// Desired playback seconds to the next keyframe; `None` uses the real time gap.
    pub duration: Option<f64>,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "is-description-visible")]
    pub is_description_visible: bool,
}

/// Round `value` to `decimals` fractional digits.
#[inline]
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (value * scale).round() / scale
}

/// Fractional digits kept for keyframe times and segment gaps.
pub const TIME_DECIMALS: u32 = 6;

#[inline]
pub fn normalize_time(seconds: f64) -> f64 {
    round_to(seconds, TIME_DECIMALS)
}

/// Leading decimal literal of `text`, ignoring anything after it (`"2s"` reads as 2).
fn parse_number_prefix(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let int_end = digits_from(end);
    let mut mantissa_digits = int_end - end;
    end = int_end;
    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        mantissa_digits += frac_end - (end + 1);
        end = frac_end;
    }
    if mantissa_digits == 0 {
        return None;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }
    text[..end].parse().ok()
}

/// Raw duration as typed by a user or read from a document.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum DurationInput {
    #[default]
    Unset,
    Seconds(f64),
    Text(String),
}

impl DurationInput {
    /// Parse and round to `decimals`; unparsable, non-finite or negative input yields `None`.
    pub fn sanitize(&self, decimals: u32) -> Option<f64> {
        let seconds = match self {
            Self::Unset => return None,
            Self::Seconds(s) => *s,
            Self::Text(text) => parse_number_prefix(text)?,
        };
        if seconds.is_finite() && seconds >= 0.0 {
            Some(round_to(seconds, decimals))
        } else {
            None
        }
    }
}

impl From<f64> for DurationInput {
    fn from(s: f64) -> Self {
        Self::Seconds(s)
    }
}

impl From<Option<f64>> for DurationInput {
    fn from(s: Option<f64>) -> Self {
        s.map_or(Self::Unset, Self::Seconds)
    }
}

impl From<&str> for DurationInput {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for DurationInput {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}
