//! Frame sources: who calls the scheduler, and when.
//!
//! A [`FrameSource`] hands out one-shot frame callbacks, like a host's
//! animation-frame request. Two implementations ship with the engine:
//! - [`ManualFrameSource`] has a settable clock and fires only when told to.
//! - [`FrameLoop`] is driven by the wall clock at a target frame rate.
//!
//! Timestamps are milliseconds as `f64`.

use std::cell::{Cell, RefCell};
use std::time::{Duration, Instant};

/// Callback invoked once with the frame timestamp.
pub type FrameCallback = Box<dyn FnOnce(f64)>;

/// Handle of a pending frame request, used for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

pub trait FrameSource {
    /// Current timestamp in milliseconds.
    fn now(&self) -> f64;
    /// Call `callback` on the next frame.
    fn request(&self, callback: FrameCallback) -> FrameHandle;
    /// Forget a pending request. Unknown handles are ignored.
    fn cancel(&self, handle: FrameHandle);
}

/// Pending callbacks shared by both frame sources.
#[derive(Default)]
struct FrameQueue {
    next: Cell<u64>,
    pending: RefCell<Vec<(FrameHandle, FrameCallback)>>,
}

impl FrameQueue {
    fn request(&self, callback: FrameCallback) -> FrameHandle {
        let handle = FrameHandle(self.next.get());
        self.next.set(handle.0 + 1);
        self.pending.borrow_mut().push((handle, callback));
        handle
    }

    fn cancel(&self, handle: FrameHandle) {
        self.pending.borrow_mut().retain(|(h, _)| *h != handle);
    }

    fn len(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Run everything requested so far. Requests made by the callbacks
    /// wait for the next call.
    fn fire(&self, now: f64) -> usize {
        let due = std::mem::take(&mut *self.pending.borrow_mut());
        let count = due.len();
        for (_, callback) in due {
            callback(now);
        }
        count
    }
}

/// Deterministic frame source for tests and tools.
#[derive(Default)]
pub struct ManualFrameSource {
    clock: Cell<f64>,
    queue: FrameQueue,
}

impl ManualFrameSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_time(&self, now: f64) {
        self.clock.set(now);
    }

    /// Number of outstanding requests.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Fire every outstanding request at the current clock.
    pub fn fire(&self) -> usize {
        self.queue.fire(self.clock.get())
    }

    /// Move the clock forward by `ms` and fire.
    pub fn advance(&self, ms: f64) -> usize {
        self.clock.set(self.clock.get() + ms);
        self.fire()
    }
}

impl FrameSource for ManualFrameSource {
    fn now(&self) -> f64 {
        self.clock.get()
    }

    fn request(&self, callback: FrameCallback) -> FrameHandle {
        self.queue.request(callback)
    }

    fn cancel(&self, handle: FrameHandle) {
        self.queue.cancel(handle);
    }
}

/// Real-time frame source pacing frames at a target rate.
pub struct FrameLoop {
    start: Instant,
    frame_interval: Duration,
    queue: FrameQueue,
}

impl FrameLoop {
    pub fn new(target_fps: u32) -> Self {
        Self {
            start: Instant::now(),
            frame_interval: Duration::from_secs_f64(1.0 / f64::from(target_fps.max(1))),
            queue: FrameQueue::default(),
        }
    }

    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    /// Run frames until `duration` has elapsed since the call.
    ///
    /// `before_frame` runs ahead of each frame with its timestamp, which is
    /// where a host feeds input. Returns the number of callbacks fired.
    pub fn run_for(&self, duration: Duration, mut before_frame: impl FnMut(f64)) -> usize {
        let end = Instant::now() + duration;
        let mut next = Instant::now();
        let mut fired = 0;
        while Instant::now() < end {
            next += self.frame_interval;
            let now = Instant::now();
            if next > now {
                std::thread::sleep(next - now);
            }
            let timestamp = self.now();
            before_frame(timestamp);
            fired += self.queue.fire(timestamp);
        }
        fired
    }
}

impl FrameSource for FrameLoop {
    fn now(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    fn request(&self, callback: FrameCallback) -> FrameHandle {
        self.queue.request(callback)
    }

    fn cancel(&self, handle: FrameHandle) {
        self.queue.cancel(handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn test_manual_source_fires_once_with_clock() {
        let source = ManualFrameSource::new();
        let seen = Rc::new(Cell::new(-1.0));
        {
            let seen = Rc::clone(&seen);
            source.request(Box::new(move |t| seen.set(t)));
        }
        source.set_time(16.0);
        assert_eq!(source.fire(), 1);
        assert_eq!(seen.get(), 16.0);
        assert_eq!(source.fire(), 0);
    }

    #[test]
    fn test_cancel_removes_request() {
        let source = ManualFrameSource::new();
        let handle = source.request(Box::new(|_| panic!("cancelled frame fired")));
        source.cancel(handle);
        assert_eq!(source.pending(), 0);
        assert_eq!(source.advance(10.0), 0);
    }

    #[test]
    fn test_frame_loop_runs_requested_frames() {
        let frames = FrameLoop::new(200);
        let count = Rc::new(Cell::new(0));
        {
            let count = Rc::clone(&count);
            frames.request(Box::new(move |_| count.set(count.get() + 1)));
        }
        let mut hooks = 0;
        frames.run_for(Duration::from_millis(30), |_| hooks += 1);
        assert_eq!(count.get(), 1);
        assert!(hooks >= 1);
    }
}
