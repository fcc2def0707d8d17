//! Cadence-driven refresh: a worker invokes a producer on a fixed interval
//! and publishes each result into a single-slot channel, so production rate
//! and display rate stay decoupled and stale results are dropped instead of
//! queued.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Single-slot channel that keeps only the most recently published value.
pub struct LatestSlot<T> {
    value: Mutex<Option<T>>,
    generation: AtomicU64,
}

impl<T> LatestSlot<T> {
    /// Empty slot.
    pub fn new() -> Self {
        Self { value: Mutex::new(None), generation: AtomicU64::new(0) }
    }

    /// Publishes a value, replacing any unconsumed one.
    pub fn publish(&self, value: T) {
        let mut slot = self.value.lock().expect("slot lock poisoned");
        *slot = Some(value);
        self.generation.fetch_add(1, Ordering::Release);
    }

    /// Takes the most recent value, leaving the slot empty.
    pub fn take(&self) -> Option<T> {
        self.value.lock().expect("slot lock poisoned").take()
    }

    /// Number of publishes so far.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}

impl<T> Default for LatestSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Worker that invokes a producer on a fixed cadence and publishes each
/// result to a shared [`LatestSlot`].
///
/// The producer returns `None` to skip a tick (for instance when a capture
/// or blur fails), leaving whatever the consumer last saw untouched.
/// Dropping the scheduler stops and joins the worker.
pub struct RefreshScheduler {
    stop: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl RefreshScheduler {
    /// Starts the cadence.
    pub fn start<T, F>(interval: Duration, slot: Arc<LatestSlot<T>>, mut produce: F) -> Self
    where
        T: Send + 'static,
        F: FnMut() -> Option<T> + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let worker = thread::spawn(move || {
            tracing::debug!(?interval, "refresh cadence started");
            while !flag.load(Ordering::Relaxed) {
                if let Some(value) = produce() {
                    slot.publish(value);
                }
                thread::sleep(interval);
            }
            tracing::debug!("refresh cadence stopped");
        });
        Self { stop, worker: Some(worker) }
    }

    /// Stops the cadence and joins the worker. The worker finishes its
    /// current tick first.
    pub fn stop(mut self) {
        self.halt();
    }

    fn halt(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.halt();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_keeps_only_the_latest_value() {
        let slot = LatestSlot::new();
        slot.publish(1);
        slot.publish(2);
        slot.publish(3);

        assert_eq!(slot.generation(), 3);
        assert_eq!(slot.take(), Some(3));
        assert_eq!(slot.take(), None);
    }

    #[test]
    fn scheduler_publishes_on_cadence_and_stops() {
        let slot = Arc::new(LatestSlot::new());
        let mut counter = 0u64;
        let scheduler = RefreshScheduler::start(
            Duration::from_millis(1),
            Arc::clone(&slot),
            move || {
                counter += 1;
                Some(counter)
            },
        );

        while slot.generation() < 3 {
            thread::sleep(Duration::from_millis(1));
        }
        scheduler.stop();

        let generation = slot.generation();
        assert!(generation >= 3);
        assert_eq!(slot.take(), Some(generation));
    }

    #[test]
    fn skipped_ticks_leave_the_slot_untouched() {
        let slot = Arc::new(LatestSlot::new());
        slot.publish(41);
        let scheduler =
            RefreshScheduler::start(Duration::from_millis(1), Arc::clone(&slot), || {
                None::<i32>
            });
        thread::sleep(Duration::from_millis(10));
        drop(scheduler);

        assert_eq!(slot.generation(), 1);
        assert_eq!(slot.take(), Some(41));
    }
}
