//! Snaplapse: the host-facing tour engine.
//!
//! Owns the keyframe store, the scheduler, the event bus and the renderer it drives. Events
//! raised by an operation are queued and delivered once that operation's state transition is
//! complete; listener requests are applied after delivery.

use crate::config::TourConfig;
use crate::data::{DurationInput, Keyframe};
use crate::error::TourError;
use crate::events::{EventBus, EventKind, ListenerId, Request, Requests, TourEvent};
use crate::host::{Clock, Renderer, SystemClock};
use crate::ids::KeyframeId;
use crate::interval::KeyframeInterval;
use crate::scheduler::{PlaybackState, Scheduler};
use crate::store::{ImportReport, KeyframeDraft, KeyframeStore};

#[derive(Debug)]
pub struct Snaplapse<R: Renderer, C: Clock = SystemClock> {
    cfg: TourConfig,
    store: KeyframeStore,
    scheduler: Scheduler,
    bus: EventBus,
    renderer: R,
    clock: C,
    pending: Vec<TourEvent>,
    requests: Requests,
}

impl<R: Renderer> Snaplapse<R, SystemClock> {
    pub fn new(renderer: R, cfg: TourConfig) -> Self {
        Self::with_clock(renderer, SystemClock::new(), cfg)
    }
}

impl<R: Renderer, C: Clock> Snaplapse<R, C> {
    pub fn with_clock(renderer: R, clock: C, cfg: TourConfig) -> Self {
        Self {
            store: KeyframeStore::new(cfg.clone()),
            scheduler: Scheduler::new(&cfg),
            cfg,
            bus: EventBus::new(),
            renderer,
            clock,
            pending: Vec::new(),
            requests: Requests::default(),
        }
    }

    pub fn config(&self) -> &TourConfig {
        &self.cfg
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    // ---- keyframes ----

    /// Record a keyframe; unset time and view come from the renderer.
    pub fn record_keyframe(&mut self, draft: KeyframeDraft) -> KeyframeId {
        let time = draft.time.unwrap_or_else(|| self.renderer.current_time());
        let bounds = draft.bounds.unwrap_or_else(|| self.renderer.current_bounds());
        let (index, keyframe) = self.store.insert(
            draft.after.as_ref(),
            time,
            bounds,
            draft.description.unwrap_or_default(),
            draft.is_description_visible.unwrap_or(false),
            &draft.duration,
        );
        let id = keyframe.id.clone();
        self.pending.push(TourEvent::KeyframeAdded { keyframe, index });
        self.flush();
        id
    }

    /// Copy a keyframe verbatim into the slot right after it.
    pub fn duplicate_keyframe(&mut self, source: &KeyframeId) -> Option<KeyframeId> {
        let src = self.store.get(source)?;
        let draft = KeyframeDraft {
            after: Some(src.id),
            time: Some(src.time),
            bounds: Some(src.bounds),
            description: Some(src.description),
            is_description_visible: Some(src.is_description_visible),
            duration: DurationInput::from(src.duration),
        };
        Some(self.record_keyframe(draft))
    }

    pub fn set_text_annotation_for_keyframe(
        &mut self,
        id: &KeyframeId,
        description: impl Into<String>,
        is_description_visible: bool,
    ) -> bool {
        let result = self.store.set_text_annotation(id, description, is_description_visible);
        report_missing(result).is_some()
    }

    pub fn set_duration_for_keyframe(
        &mut self,
        id: &KeyframeId,
        duration: impl Into<DurationInput>,
    ) -> bool {
        report_missing(self.store.set_duration(id, duration)).is_some()
    }

    /// Move a keyframe to the renderer's current time and view.
    pub fn update_time_and_position_for_keyframe(&mut self, id: &KeyframeId) -> bool {
        let time = self.renderer.current_time();
        let bounds = self.renderer.current_bounds();
        let result = self.store.update_time_and_position(id, time, bounds);
        let Some(keyframe) = report_missing(result) else {
            return false;
        };
        self.pending.push(TourEvent::KeyframeModified { keyframe });
        self.flush();
        true
    }

    pub fn delete_keyframe_by_id(&mut self, id: &KeyframeId) -> bool {
        self.store.delete(id)
    }

    pub fn clear_keyframes(&mut self) {
        self.store.clear();
    }

    pub fn get_keyframes(&self) -> Vec<Keyframe> {
        self.store.get_all()
    }

    pub fn get_keyframe_by_id(&self, id: &KeyframeId) -> Option<Keyframe> {
        self.store.get(id)
    }

    pub fn get_num_keyframes(&self) -> usize {
        self.store.len()
    }

    pub fn keyframe_index(&self, id: &KeyframeId) -> Option<usize> {
        self.store.index_of(id)
    }

    // ---- persistence ----

    pub fn get_as_json(&self) -> Result<String, TourError> {
        self.store.to_json()
    }

    /// Append the keyframes of a stored tour. Each imported keyframe raises `keyframe-added`.
    pub fn import_json(&mut self, s: &str) -> Result<ImportReport, TourError> {
        let (report, inserted) = self.store.import_json(s)?;
        self.pending.extend(
            inserted
                .into_iter()
                .map(|(index, keyframe)| TourEvent::KeyframeAdded { keyframe, index }),
        );
        self.flush();
        Ok(report)
    }

    pub fn load_from_json(&mut self, s: &str) -> bool {
        match self.import_json(s) {
            Ok(_) => true,
            Err(err) => {
                log::error!("[{}] invalid tour document: {err}", err.category());
                false
            }
        }
    }

    // ---- playback ----

    pub fn is_playing(&self) -> bool {
        self.scheduler.is_playing()
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.scheduler.state()
    }

    pub fn current_interval(&self) -> Option<&KeyframeInterval> {
        self.scheduler.current_interval()
    }

    pub fn current_interval_index(&self) -> Option<usize> {
        self.scheduler.cursor()
    }

    /// Virtual elapsed time of the running session.
    pub fn elapsed_millis(&self) -> Option<f64> {
        self.scheduler.elapsed_millis(self.clock.now_millis())
    }

    pub fn next_tick_due(&self) -> Option<f64> {
        self.scheduler.next_tick_due()
    }

    /// Start playback; a no-op while playing or with fewer than two keyframes to play.
    pub fn play(&mut self, start_at: Option<&KeyframeId>) {
        if let Err(err) = self.try_play(start_at) {
            log::debug!("play ignored: {err}");
        }
    }

    /// `Ok(false)` when already playing.
    pub fn try_play(&mut self, start_at: Option<&KeyframeId>) -> Result<bool, TourError> {
        let started = self.play_inner(start_at);
        self.flush();
        started
    }

    fn play_inner(&mut self, start_at: Option<&KeyframeId>) -> Result<bool, TourError> {
        if self.scheduler.is_playing() {
            return Ok(false);
        }
        if self.store.len() < 2 {
            return Err(TourError::NotEnoughKeyframes {
                count: self.store.len(),
            });
        }
        let start_index = start_at.and_then(|id| self.store.index_of(id)).unwrap_or(0);
        let now = self.clock.now_millis();
        self.scheduler.play(
            self.store.as_slice(),
            start_index,
            &mut self.renderer,
            now,
            &mut self.pending,
        )
    }

    /// Returns `false` when nothing was playing.
    pub fn stop(&mut self, jump_to_last_keyframe: bool) -> bool {
        let stopped = self
            .scheduler
            .stop(jump_to_last_keyframe, &mut self.renderer, &mut self.pending);
        self.flush();
        stopped
    }

    /// Run the tick handler now, regardless of the timer.
    pub fn tick(&mut self) {
        let now = self.clock.now_millis();
        self.scheduler.tick(&mut self.renderer, now, &mut self.pending);
        self.flush();
    }

    /// Run the tick handler if the playback timer is due. Returns whether it ran.
    pub fn poll(&mut self) -> bool {
        let now = self.clock.now_millis();
        let ticked = self.scheduler.poll(&mut self.renderer, now, &mut self.pending);
        self.flush();
        ticked
    }

    /// Renderer stall notification channel.
    pub fn on_stall_changed(&mut self, is_stalled: bool) {
        let now = self.clock.now_millis();
        self.scheduler.set_stalled(is_stalled, &mut self.renderer, now);
        self.flush();
    }

    // ---- events ----

    pub fn add_event_listener<F>(&mut self, kind: EventKind, listener: F) -> ListenerId
    where
        F: FnMut(&TourEvent, &mut Requests) -> anyhow::Result<()> + 'static,
    {
        self.bus.add_listener(kind, Box::new(listener))
    }

    pub fn remove_event_listener(&mut self, kind: EventKind, id: ListenerId) -> bool {
        self.bus.remove_listener(kind, id)
    }

    /// Deliver queued events, then apply listener requests, until both queues are empty.
    fn flush(&mut self) {
        let mut applied = 0usize;
        loop {
            for event in std::mem::take(&mut self.pending) {
                self.bus.dispatch(&event, &mut self.requests);
            }
            let requests = self.requests.drain();
            if requests.is_empty() {
                break;
            }
            for request in requests {
                if applied >= self.cfg.max_deferred_requests {
                    log::warn!("dropping listener request {request:?}: too many chained requests");
                    continue;
                }
                applied += 1;
                self.apply_request(request);
            }
        }
    }

    fn apply_request(&mut self, request: Request) {
        match request {
            Request::Play { start_at } => {
                if let Err(err) = self.play_inner(start_at.as_ref()) {
                    log::debug!("deferred play ignored: {err}");
                }
            }
            Request::Stop { jump_to_last } => {
                self.scheduler
                    .stop(jump_to_last, &mut self.renderer, &mut self.pending);
            }
        }
    }
}

/// Unknown ids are a quiet no-op for the sentinel-returning operations.
fn report_missing<T>(result: Result<T, TourError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            log::debug!("[{}] {err}", err.category());
            None
        }
    }
}
