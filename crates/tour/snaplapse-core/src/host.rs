//! Host-side contracts: the renderer the tour drives and the clock it measures against.

use std::cell::Cell;
use std::rc::Rc;

use crate::data::Bounds;

/// The video viewport a tour plays on. Implemented by the embedding application.
pub trait Renderer {
    /// View currently shown.
    fn current_bounds(&self) -> Bounds;
    /// Current video time in seconds.
    fn current_time(&self) -> f64;
    fn seek(&mut self, seconds: f64);
    fn play(&mut self);
    fn pause(&mut self);
    fn warp_to_bounds(&mut self, bounds: Bounds);
    fn set_playback_rate(&mut self, rate: f64);
    /// Rate in effect before a tour takes over the viewport.
    fn playback_rate(&self) -> f64 {
        1.0
    }
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    fn current_bounds(&self) -> Bounds {
        (**self).current_bounds()
    }
    fn current_time(&self) -> f64 {
        (**self).current_time()
    }
    fn seek(&mut self, seconds: f64) {
        (**self).seek(seconds)
    }
    fn play(&mut self) {
        (**self).play()
    }
    fn pause(&mut self) {
        (**self).pause()
    }
    fn warp_to_bounds(&mut self, bounds: Bounds) {
        (**self).warp_to_bounds(bounds)
    }
    fn set_playback_rate(&mut self, rate: f64) {
        (**self).set_playback_rate(rate)
    }
    fn playback_rate(&self) -> f64 {
        (**self).playback_rate()
    }
}

/// Monotonic wall clock in milliseconds.
pub trait Clock {
    fn now_millis(&self) -> f64;
}

/// Real clock backed by `instant`, which maps to `performance.now()` on wasm.
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    origin: instant::Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: instant::Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_millis(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Hand-advanced clock. Clones share the same time.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new(start_millis: f64) -> Self {
        Self {
            now: Rc::new(Cell::new(start_millis)),
        }
    }

    pub fn set(&self, millis: f64) {
        self.now.set(millis);
    }

    pub fn advance(&self, millis: f64) {
        self.now.set(self.now.get() + millis);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> f64 {
        self.now.get()
    }
}
