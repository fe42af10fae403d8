//! Persisted tour format: `{ "snaplapse": { "keyframes": [ ... ] } }`.
//!
//! Parsing is lenient per entry and strict per document: an entry without a numeric `time` or a
//! complete `bounds` is skipped with a warning, while text that is not JSON or lacks the
//! `snaplapse.keyframes` array fails the whole document.

use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::config::TourConfig;
use crate::data::{normalize_time, Bounds, DurationInput, Keyframe};
use crate::error::TourError;
use crate::ids::KeyframeId;

/// A validated keyframe entry, not yet owned by a store.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyframeRecord {
    pub id: Option<KeyframeId>,
    pub time: f64,
    pub bounds: Bounds,
    pub duration: Option<f64>,
    pub description: String,
    pub is_description_visible: bool,
}

/// Result of parsing a whole document.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParsedTour {
    pub records: Vec<KeyframeRecord>,
    pub skipped: usize,
}

#[derive(Serialize)]
struct DocumentRef<'a> {
    snaplapse: BodyRef<'a>,
}

#[derive(Serialize)]
struct BodyRef<'a> {
    keyframes: &'a [Keyframe],
}

/// Serialize keyframes in playback order, three-space indented for hand editing.
pub fn to_stored_tour_json(keyframes: &[Keyframe]) -> Result<String, TourError> {
    let doc = DocumentRef {
        snaplapse: BodyRef { keyframes },
    };
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"   ");
    let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
    doc.serialize(&mut ser)?;
    String::from_utf8(out).map_err(|err| TourError::Serialization {
        reason: err.to_string(),
    })
}

/// Parse a stored tour document into validated keyframe records.
pub fn parse_stored_tour_json(s: &str, cfg: &TourConfig) -> Result<ParsedTour, TourError> {
    let doc: JsonValue = serde_json::from_str(s)?;
    let entries = doc
        .get("snaplapse")
        .and_then(|body| body.get("keyframes"))
        .and_then(JsonValue::as_array)
        .ok_or_else(|| TourError::InvalidDocument {
            reason: "missing snaplapse.keyframes array".into(),
        })?;

    log::debug!("found {} keyframe entries in tour document", entries.len());

    let mut parsed = ParsedTour::default();
    for (index, entry) in entries.iter().enumerate() {
        match parse_entry(index, entry, cfg) {
            Ok(record) => parsed.records.push(record),
            Err(err) => {
                log::warn!("ignoring invalid keyframe during tour load: {err}");
                parsed.skipped += 1;
            }
        }
    }
    Ok(parsed)
}

fn parse_entry(
    index: usize,
    entry: &JsonValue,
    cfg: &TourConfig,
) -> Result<KeyframeRecord, TourError> {
    let invalid = |reason: &str| TourError::InvalidKeyframe {
        index,
        reason: reason.to_string(),
    };

    let time = entry
        .get("time")
        .and_then(JsonValue::as_f64)
        .filter(|t| t.is_finite())
        .ok_or_else(|| invalid("missing or non-numeric time"))?;

    let bounds = entry.get("bounds").ok_or_else(|| invalid("missing bounds"))?;
    let coord = |key: &str| {
        bounds
            .get(key)
            .and_then(JsonValue::as_f64)
            .ok_or_else(|| invalid(&format!("missing bounds.{key}")))
    };
    let bounds = Bounds::new(coord("xmin")?, coord("ymin")?, coord("xmax")?, coord("ymax")?);

    let duration = match entry.get("duration") {
        Some(JsonValue::Number(n)) => DurationInput::from(n.as_f64()),
        Some(JsonValue::String(s)) => DurationInput::from(s.as_str()),
        _ => DurationInput::Unset,
    }
    .sanitize(cfg.duration_decimals);

    let id = entry
        .get("id")
        .and_then(JsonValue::as_str)
        .filter(|s| !s.is_empty())
        .map(KeyframeId::from);

    Ok(KeyframeRecord {
        id,
        time: normalize_time(time),
        bounds,
        duration,
        description: entry
            .get("description")
            .and_then(JsonValue::as_str)
            .unwrap_or_default()
            .to_string(),
        is_description_visible: entry
            .get("is-description-visible")
            .and_then(JsonValue::as_bool)
            .unwrap_or(cfg.legacy_description_visible),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_durations_are_sanitized() {
        let doc = r#"{"snaplapse":{"keyframes":[
            {"time":0,"bounds":{"xmin":0,"ymin":0,"xmax":1,"ymax":1},"duration":"2.34"},
            {"time":1,"bounds":{"xmin":0,"ymin":0,"xmax":1,"ymax":1},"duration":-3}
        ]}}"#;
        let parsed = parse_stored_tour_json(doc, &TourConfig::default()).unwrap();
        assert_eq!(parsed.records[0].duration, Some(2.3));
        assert_eq!(parsed.records[1].duration, None);
    }

    #[test]
    fn non_numeric_coordinate_skips_entry() {
        let doc = r#"{"snaplapse":{"keyframes":[
            {"time":0,"bounds":{"xmin":"0","ymin":0,"xmax":1,"ymax":1}}
        ]}}"#;
        let parsed = parse_stored_tour_json(doc, &TourConfig::default()).unwrap();
        assert!(parsed.records.is_empty());
        assert_eq!(parsed.skipped, 1);
    }

    #[test]
    fn export_is_indented_with_three_spaces() {
        let keyframes = vec![Keyframe {
            id: KeyframeId::from("k"),
            time: 1.5,
            bounds: Bounds::new(0.0, 0.0, 1.0, 1.0),
            duration: None,
            description: String::new(),
            is_description_visible: false,
        }];
        let json = to_stored_tour_json(&keyframes).unwrap();
        assert!(json.starts_with("{\n   \"snaplapse\": {\n      \"keyframes\": ["));
        assert!(json.contains("\n            \"id\": \"k\","));
        let back = parse_stored_tour_json(&json, &TourConfig::default()).unwrap();
        assert_eq!(back.records[0].time, 1.5);
    }

    #[test]
    fn keyframes_must_be_an_array() {
        let doc = r#"{"snaplapse":{"keyframes":{}}}"#;
        let err = parse_stored_tour_json(doc, &TourConfig::default()).unwrap_err();
        assert!(matches!(err, TourError::InvalidDocument { .. }));
    }
}
