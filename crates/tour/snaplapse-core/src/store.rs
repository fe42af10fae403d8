//! Ordered keyframe storage with an id index.
//!
//! Sequence order is playback order; keyframes are never sorted by time. Everything handed out
//! is a clone, so callers cannot reach the stored values.

use std::collections::HashMap;

use crate::config::TourConfig;
use crate::data::{normalize_time, Bounds, DurationInput, Keyframe};
use crate::error::TourError;
use crate::ids::KeyframeId;
use crate::stored_tour::{parse_stored_tour_json, to_stored_tour_json, KeyframeRecord};

/// Fields for a keyframe about to be recorded. Unset `time`/`bounds` are filled in from the
/// renderer's current position by the engine.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KeyframeDraft {
    /// Insert right after this keyframe; unknown or unset ids append.
    pub after: Option<KeyframeId>,
    pub time: Option<f64>,
    pub bounds: Option<Bounds>,
    pub description: Option<String>,
    pub is_description_visible: Option<bool>,
    pub duration: DurationInput,
}

impl KeyframeDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn after(mut self, id: impl Into<KeyframeId>) -> Self {
        self.after = Some(id.into());
        self
    }

    pub fn at(mut self, time: f64, bounds: Bounds) -> Self {
        self.time = Some(time);
        self.bounds = Some(bounds);
        self
    }

    pub fn description(mut self, text: impl Into<String>, visible: bool) -> Self {
        self.description = Some(text.into());
        self.is_description_visible = Some(visible);
        self
    }

    pub fn duration(mut self, duration: impl Into<DurationInput>) -> Self {
        self.duration = duration.into();
        self
    }
}

/// Counts from a successful import.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
}

#[derive(Debug, Default)]
pub struct KeyframeStore {
    keyframes: Vec<Keyframe>,
    index: HashMap<KeyframeId, usize>,
    cfg: TourConfig,
}

impl KeyframeStore {
    pub fn new(cfg: TourConfig) -> Self {
        Self {
            keyframes: Vec::new(),
            index: HashMap::new(),
            cfg,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    pub fn get_all(&self) -> Vec<Keyframe> {
        self.keyframes.clone()
    }

    /// Borrowed view for read-only consumers inside the crate.
    pub(crate) fn as_slice(&self) -> &[Keyframe] {
        &self.keyframes
    }

    pub fn get(&self, id: &KeyframeId) -> Option<Keyframe> {
        self.index_of(id).map(|i| self.keyframes[i].clone())
    }

    #[inline]
    pub fn index_of(&self, id: &KeyframeId) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Insert a fully resolved keyframe. Returns the insertion index and a copy.
    pub fn insert(
        &mut self,
        after: Option<&KeyframeId>,
        time: f64,
        bounds: Bounds,
        description: String,
        is_description_visible: bool,
        duration: &DurationInput,
    ) -> (usize, Keyframe) {
        let keyframe = Keyframe {
            id: KeyframeId::generate(),
            time: normalize_time(time),
            bounds,
            duration: duration.sanitize(self.cfg.duration_decimals),
            description,
            is_description_visible,
        };
        let position = after
            .and_then(|id| self.index_of(id))
            .map_or(self.keyframes.len(), |i| i + 1);
        self.insert_at(position, keyframe)
    }

    fn insert_at(&mut self, position: usize, keyframe: Keyframe) -> (usize, Keyframe) {
        let copy = keyframe.clone();
        self.keyframes.insert(position, keyframe);
        self.reindex_from(position);
        (position, copy)
    }

    fn reindex_from(&mut self, position: usize) {
        for (i, kf) in self.keyframes.iter().enumerate().skip(position) {
            self.index.insert(kf.id.clone(), i);
        }
    }

    fn slot_mut(&mut self, id: &KeyframeId) -> Result<&mut Keyframe, TourError> {
        match self.index.get(id) {
            Some(&i) => Ok(&mut self.keyframes[i]),
            None => Err(TourError::KeyframeNotFound { id: id.to_string() }),
        }
    }

    pub fn set_text_annotation(
        &mut self,
        id: &KeyframeId,
        description: impl Into<String>,
        is_description_visible: bool,
    ) -> Result<(), TourError> {
        let kf = self.slot_mut(id)?;
        kf.description = description.into();
        kf.is_description_visible = is_description_visible;
        Ok(())
    }

    pub fn set_duration(
        &mut self,
        id: &KeyframeId,
        duration: impl Into<DurationInput>,
    ) -> Result<(), TourError> {
        let decimals = self.cfg.duration_decimals;
        self.slot_mut(id)?.duration = duration.into().sanitize(decimals);
        Ok(())
    }

    /// Overwrite time and view; returns a copy of the modified keyframe.
    pub fn update_time_and_position(
        &mut self,
        id: &KeyframeId,
        time: f64,
        bounds: Bounds,
    ) -> Result<Keyframe, TourError> {
        let kf = self.slot_mut(id)?;
        kf.time = normalize_time(time);
        kf.bounds = bounds;
        Ok(kf.clone())
    }

    pub fn delete(&mut self, id: &KeyframeId) -> bool {
        let Some(i) = self.index.remove(id) else {
            return false;
        };
        self.keyframes.remove(i);
        self.reindex_from(i);
        true
    }

    pub fn clear(&mut self) {
        self.keyframes.clear();
        self.index.clear();
    }

    pub fn to_json(&self) -> Result<String, TourError> {
        to_stored_tour_json(&self.keyframes)
    }

    /// Append every valid entry of a stored tour document, returning the counts and the
    /// inserted keyframes. Nothing is inserted when the document as a whole is rejected.
    pub fn import_json(
        &mut self,
        s: &str,
    ) -> Result<(ImportReport, Vec<(usize, Keyframe)>), TourError> {
        let parsed = parse_stored_tour_json(s, &self.cfg)?;
        let skipped = parsed.skipped;
        let mut inserted = Vec::with_capacity(parsed.records.len());
        for record in parsed.records {
            inserted.push(self.insert_record(record));
        }
        let report = ImportReport {
            imported: inserted.len(),
            skipped,
        };
        log::debug!(
            "imported {} keyframes ({} skipped)",
            report.imported,
            report.skipped
        );
        Ok((report, inserted))
    }

    fn insert_record(&mut self, record: KeyframeRecord) -> (usize, Keyframe) {
        let id = match record.id {
            Some(id) if !self.index.contains_key(&id) => id,
            Some(id) => {
                log::warn!("keyframe id {id} already in use; assigning a fresh id");
                KeyframeId::generate()
            }
            None => KeyframeId::generate(),
        };
        let keyframe = Keyframe {
            id,
            time: record.time,
            bounds: record.bounds,
            duration: record.duration,
            description: record.description,
            is_description_visible: record.is_description_visible,
        };
        self.insert_at(self.keyframes.len(), keyframe)
    }
}
