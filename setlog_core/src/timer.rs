//! Cancellable periodic timers for rest and elapsed-time display.
//!
//! Timers are explicit handles: starting one returns a [`TimerHandle`] and
//! the owning scope must cancel (or drop) it when the session ends, so no
//! orphaned ticks outlive a workout. Resolution is one second.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// Handle to a running periodic task; cancelling stops the tick loop
pub struct TimerHandle {
    cancelled: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl TimerHandle {
    /// Stop the timer and wait for the tick loop to exit
    pub fn cancel(&mut self) {
        self.cancelled.store(true, Ordering::SeqCst);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Run `on_tick` every `interval` until cancelled or it returns false
pub fn every<F>(interval: Duration, mut on_tick: F) -> TimerHandle
where
    F: FnMut() -> bool + Send + 'static,
{
    let cancelled = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancelled);

    let thread = std::thread::spawn(move || loop {
        // Sleep in small slices so cancellation is prompt
        let mut remaining = interval;
        let slice = Duration::from_millis(50);
        while remaining > Duration::ZERO {
            if flag.load(Ordering::SeqCst) {
                return;
            }
            let step = remaining.min(slice);
            std::thread::sleep(step);
            remaining = remaining.saturating_sub(step);
        }
        if flag.load(Ordering::SeqCst) {
            return;
        }
        if !on_tick() {
            flag.store(true, Ordering::SeqCst);
            return;
        }
    });

    TimerHandle {
        cancelled,
        thread: Some(thread),
    }
}

/// One-second countdown from `seconds`; `on_tick` receives the remaining
/// count and `on_done` fires when it reaches zero (not when cancelled)
pub fn countdown<T, D>(seconds: u32, mut on_tick: T, on_done: D) -> TimerHandle
where
    T: FnMut(u32) + Send + 'static,
    D: FnOnce() + Send + 'static,
{
    let mut remaining = seconds;
    let mut on_done = Some(on_done);
    every(Duration::from_secs(1), move || {
        if remaining > 0 {
            remaining -= 1;
            on_tick(remaining);
        }
        if remaining == 0 {
            if let Some(done) = on_done.take() {
                done();
            }
            return false;
        }
        true
    })
}
