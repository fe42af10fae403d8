//! Blocking tick loop for native hosts without their own event loop.

use std::time::Duration;

use crate::engine::Snaplapse;
use crate::host::{Clock, Renderer};

/// Poll `engine` on its timer until playback ends or `budget_ms` of clock time has passed.
///
/// `between_ticks` runs before every poll; hosts use it to forward stall notifications or to
/// pump their own renderer. Returns the number of ticks that ran.
pub fn run_until_stopped<R, C, F>(
    engine: &mut Snaplapse<R, C>,
    budget_ms: f64,
    mut between_ticks: F,
) -> usize
where
    R: Renderer,
    C: Clock,
    F: FnMut(&mut Snaplapse<R, C>),
{
    let started = engine.clock().now_millis();
    let idle_wait = engine.config().tick_period_ms;
    let mut ticks = 0;

    while engine.is_playing() {
        let now = engine.clock().now_millis();
        if now - started >= budget_ms {
            log::warn!("tour driver gave up after {budget_ms} ms");
            break;
        }
        let wait = engine
            .next_tick_due()
            .map_or(idle_wait, |due| (due - now).max(0.0));
        if wait > 0.0 {
            std::thread::sleep(Duration::from_secs_f64(wait / 1000.0));
        }
        between_ticks(engine);
        if engine.poll() {
            ticks += 1;
        }
    }
    ticks
}
