//! Playback scheduler: maps wall-clock time onto the interval chain.
//!
//! The virtual clock is `now - warp_starting_time` in milliseconds. A corrective seek at an
//! interval boundary restarts the clock at that interval's start; stall recovery recalibrates it
//! from the renderer's reported video time, so the clock follows what is actually on screen.

use serde::{Deserialize, Serialize};

use crate::config::TourConfig;
use crate::data::Keyframe;
use crate::error::TourError;
use crate::events::TourEvent;
use crate::host::Renderer;
use crate::interp::compute_bounds;
use crate::interval::{build_chain, KeyframeInterval};

/// Scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaybackState {
    Idle,
    Playing,
    /// Playing, but the renderer reported a stall; the timer is suspended.
    Stalled,
}

impl PlaybackState {
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Playing => "playing",
            Self::Stalled => "stalled",
        }
    }

    /// A session exists, stalled or not.
    #[inline]
    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing | Self::Stalled)
    }
}

/// Periodic tick source armed while playing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timer {
    pub period_ms: f64,
    pub next_due_ms: f64,
}

impl Timer {
    fn armed(now: f64, period_ms: f64) -> Self {
        Self {
            period_ms,
            next_due_ms: now + period_ms,
        }
    }

    /// Advance to the next slot after `now`, dropping slots that were missed.
    fn reschedule(&mut self, now: f64) {
        self.next_due_ms += self.period_ms;
        if self.next_due_ms <= now {
            self.next_due_ms = now + self.period_ms;
        }
    }
}

#[derive(Debug)]
pub struct Scheduler {
    state: PlaybackState,
    chain: Vec<KeyframeInterval>,
    cursor: usize,
    warp_starting_time: f64,
    timer: Option<Timer>,
    saved_rate: Option<f64>,
    period_ms: f64,
    restore_rate: bool,
}

impl Scheduler {
    pub fn new(cfg: &TourConfig) -> Self {
        Self {
            state: PlaybackState::Idle,
            chain: Vec::new(),
            cursor: 0,
            warp_starting_time: 0.0,
            timer: None,
            saved_rate: None,
            period_ms: cfg.tick_period_ms,
            restore_rate: cfg.restore_playback_rate,
        }
    }

    #[inline]
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.state.is_playing()
    }

    /// Chain of the current session; empty when idle.
    pub fn chain(&self) -> &[KeyframeInterval] {
        &self.chain
    }

    pub fn cursor(&self) -> Option<usize> {
        self.is_playing().then_some(self.cursor)
    }

    pub fn current_interval(&self) -> Option<&KeyframeInterval> {
        if self.is_playing() {
            self.chain.get(self.cursor)
        } else {
            None
        }
    }

    #[inline]
    pub fn warp_starting_time(&self) -> f64 {
        self.warp_starting_time
    }

    pub fn elapsed_millis(&self, now: f64) -> Option<f64> {
        self.is_playing().then(|| now - self.warp_starting_time)
    }

    pub fn timer(&self) -> Option<Timer> {
        self.timer
    }

    pub fn next_tick_due(&self) -> Option<f64> {
        self.timer.map(|t| t.next_due_ms)
    }

    /// Start a session from `keyframes[start_index]`.
    /// `Ok(false)` when a session is already running.
    pub fn play(
        &mut self,
        keyframes: &[Keyframe],
        start_index: usize,
        host: &mut dyn Renderer,
        now: f64,
        events: &mut Vec<TourEvent>,
    ) -> Result<bool, TourError> {
        if self.is_playing() {
            return Ok(false);
        }
        let chain = build_chain(keyframes, start_index);
        if chain.is_empty() {
            return Err(TourError::NotEnoughKeyframes {
                count: keyframes.len().saturating_sub(start_index),
            });
        }

        host.pause();
        self.saved_rate = Some(host.playback_rate());
        self.chain = chain;
        self.cursor = 0;
        let head = &self.chain[0];
        host.seek(head.start.time);
        host.set_playback_rate(head.playback_rate);
        self.warp_starting_time = now;
        self.state = PlaybackState::Playing;
        events.push(self.interval_change());
        host.play();
        self.timer = Some(Timer::armed(now, self.period_ms));

        log::debug!(
            "tour playback started at keyframe {} over {} intervals",
            start_index,
            self.chain.len()
        );
        events.push(TourEvent::Play);
        Ok(true)
    }

    /// Run the tick handler if the timer is armed and due. Returns whether a tick ran.
    pub fn poll(&mut self, host: &mut dyn Renderer, now: f64, events: &mut Vec<TourEvent>) -> bool {
        match self.timer {
            Some(timer) if now >= timer.next_due_ms => {}
            _ => return false,
        }
        self.tick(host, now, events);
        if let Some(timer) = self.timer.as_mut() {
            timer.reschedule(now);
        }
        true
    }

    /// Sample the clock, walk the chain as far as needed and push the interpolated view.
    pub fn tick(&mut self, host: &mut dyn Renderer, now: f64, events: &mut Vec<TourEvent>) {
        if self.state != PlaybackState::Playing {
            return;
        }
        let mut elapsed = now - self.warp_starting_time;

        while !self.chain[self.cursor].contains(elapsed) && self.cursor + 1 < self.chain.len() {
            self.cursor += 1;
            self.enter_current(host, now);
            elapsed = now - self.warp_starting_time;
            log::debug!("advanced to keyframe interval {}", self.cursor);
            events.push(self.interval_change());
        }

        let current = &self.chain[self.cursor];
        if !current.contains(elapsed) {
            log::debug!("tour finished after {elapsed:.1} ms");
            events.push(TourEvent::KeyframeIntervalChange {
                index: self.chain.len(),
                keyframe: current.end.clone(),
                interval: None,
            });
            self.stop(true, host, events);
            return;
        }
        match compute_bounds(current, elapsed) {
            Some(bounds) => host.warp_to_bounds(bounds),
            None => {
                log::error!(
                    "{}; stopping tour",
                    TourError::Desynchronized {
                        elapsed_ms: elapsed
                    }
                );
                self.stop(true, host, events);
            }
        }
    }

    /// End the session. Returns `false` when idle.
    pub fn stop(
        &mut self,
        jump_to_last_keyframe: bool,
        host: &mut dyn Renderer,
        events: &mut Vec<TourEvent>,
    ) -> bool {
        if !self.is_playing() {
            return false;
        }
        host.pause();
        self.timer = None;
        if jump_to_last_keyframe {
            if let Some(last) = self.chain.last() {
                host.seek(last.end.time);
                host.warp_to_bounds(last.end.bounds);
            }
        }
        if let Some(rate) = self.saved_rate.take() {
            if self.restore_rate {
                host.set_playback_rate(rate);
            }
        }
        self.state = PlaybackState::Idle;
        self.chain.clear();
        self.cursor = 0;

        log::debug!("tour playback stopped (jumped to last: {jump_to_last_keyframe})");
        events.push(TourEvent::Stop {
            jumped_to_last: jump_to_last_keyframe,
        });
        true
    }

    /// Renderer stall notification. Ignored while idle.
    pub fn set_stalled(&mut self, is_stalled: bool, host: &mut dyn Renderer, now: f64) {
        match (self.state, is_stalled) {
            (PlaybackState::Playing, true) => {
                self.timer = None;
                self.state = PlaybackState::Stalled;
                log::debug!("renderer stalled; tour clock suspended");
            }
            (PlaybackState::Stalled, false) => {
                self.resync(host.current_time(), now);
                self.state = PlaybackState::Playing;
                self.timer = Some(Timer::armed(now, self.period_ms));
                log::debug!("renderer recovered; tour clock resynchronized");
            }
            _ => {}
        }
    }

    /// Corrective seek into the current interval. The clock restarts from the seek target,
    /// not from whatever time the renderer reports before the seek lands.
    fn enter_current(&mut self, host: &mut dyn Renderer, now: f64) {
        let current = &self.chain[self.cursor];
        let start_time = current.start.time;
        host.seek(start_time);
        host.set_playback_rate(current.playback_rate);
        self.resync(start_time, now);
    }

    fn interval_change(&self) -> TourEvent {
        let current = &self.chain[self.cursor];
        TourEvent::KeyframeIntervalChange {
            index: self.cursor,
            keyframe: current.start.clone(),
            interval: Some(current.clone()),
        }
    }

    fn resync(&mut self, video_time: f64, now: f64) {
        let current = &self.chain[self.cursor];
        let fraction = current.elapsed_fraction(video_time);
        self.warp_starting_time = now
            - (current.desired_duration_millis() * fraction
                + current.starting_running_duration_millis);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer_drops_missed_slots() {
        let mut timer = Timer::armed(0.0, 20.0);
        timer.reschedule(25.0);
        assert_eq!(timer.next_due_ms, 40.0);
        timer.reschedule(300.0);
        assert_eq!(timer.next_due_ms, 320.0);
    }

    #[test]
    fn state_names() {
        assert_eq!(PlaybackState::Stalled.name(), "stalled");
        assert!(PlaybackState::Stalled.is_playing());
        assert!(!PlaybackState::Idle.is_playing());
    }
}
