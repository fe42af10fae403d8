#![allow(dead_code)]
use std::cell::RefCell;
use std::rc::Rc;

use snaplapse_core::{
    Bounds, EventKind, KeyframeDraft, KeyframeId, ManualClock, Renderer, Snaplapse, TourConfig,
    TourEvent,
};

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Seek(f64),
    Play,
    Pause,
    Warp(Bounds),
    Rate(f64),
}

/// Renderer double that records every call. Seeks land instantly unless `seek_lands` is off,
/// in which case `time` keeps reporting the old position.
#[derive(Debug)]
pub struct RecordingRenderer {
    pub seek_lands: bool,
    pub time: f64,
    pub bounds: Bounds,
    pub rate: f64,
    pub playing: bool,
    pub calls: Vec<Call>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self {
            seek_lands: true,
            time: 0.0,
            bounds: Bounds::new(0.0, 0.0, 1000.0, 1000.0),
            rate: 1.0,
            playing: false,
            calls: Vec::new(),
        }
    }

    pub fn last_warp(&self) -> Option<Bounds> {
        self.calls.iter().rev().find_map(|c| match c {
            Call::Warp(b) => Some(*b),
            _ => None,
        })
    }

    pub fn seeks(&self) -> Vec<f64> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Seek(t) => Some(*t),
                _ => None,
            })
            .collect()
    }
}

impl Renderer for RecordingRenderer {
    fn current_bounds(&self) -> Bounds {
        self.bounds
    }
    fn current_time(&self) -> f64 {
        self.time
    }
    fn seek(&mut self, seconds: f64) {
        if self.seek_lands {
            self.time = seconds;
        }
        self.calls.push(Call::Seek(seconds));
    }
    fn play(&mut self) {
        self.playing = true;
        self.calls.push(Call::Play);
    }
    fn pause(&mut self) {
        self.playing = false;
        self.calls.push(Call::Pause);
    }
    fn warp_to_bounds(&mut self, bounds: Bounds) {
        self.bounds = bounds;
        self.calls.push(Call::Warp(bounds));
    }
    fn set_playback_rate(&mut self, rate: f64) {
        self.rate = rate;
        self.calls.push(Call::Rate(rate));
    }
    fn playback_rate(&self) -> f64 {
        self.rate
    }
}

pub type TestTour = Snaplapse<RecordingRenderer, ManualClock>;

pub fn tour_at(start_millis: f64) -> (TestTour, ManualClock) {
    let clock = ManualClock::new(start_millis);
    let tour = Snaplapse::with_clock(RecordingRenderer::new(), clock.clone(), TourConfig::default());
    (tour, clock)
}

pub fn square(min: f64, max: f64) -> Bounds {
    Bounds::new(min, min, max, max)
}

pub fn record(tour: &mut TestTour, time: f64, bounds: Bounds) -> KeyframeId {
    tour.record_keyframe(KeyframeDraft::new().at(time, bounds))
}

/// Collects the names of every event delivered, in order.
pub fn event_log(tour: &mut TestTour) -> Rc<RefCell<Vec<TourEvent>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    for kind in [
        EventKind::KeyframeAdded,
        EventKind::KeyframeModified,
        EventKind::Play,
        EventKind::Stop,
        EventKind::KeyframeIntervalChange,
    ] {
        let sink = log.clone();
        tour.add_event_listener(kind, move |event, _| {
            sink.borrow_mut().push(event.clone());
            Ok(())
        });
    }
    log
}

pub fn kinds(events: &[TourEvent]) -> Vec<&'static str> {
    events.iter().map(|e| e.kind().name()).collect()
}
