//! Host environment seams: frame scheduling and input event delivery.
//!
//! The simulation loop only talks to the outside world through these two
//! traits. The browser build implements them over `requestAnimationFrame`
//! and DOM listeners; [`ManualScheduler`] and [`EventBus`] are the in-memory
//! versions used for headless rendering and tests.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::input::InputEvent;

/// A one-shot frame callback receiving the frame timestamp in milliseconds.
pub type FrameCallback = Box<dyn FnOnce(f64)>;

/// Handle to a scheduled frame, used to cancel it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRequest(pub u64);

/// Schedules callbacks for the next display frame.
pub trait FrameScheduler {
    fn request_frame(&self, callback: FrameCallback) -> FrameRequest;

    /// Cancels a pending request. Unknown or already-fired requests are a no-op.
    fn cancel_frame(&self, request: FrameRequest);
}

/// An input listener. Shared so a source can call it without holding a borrow.
pub type Listener = Rc<dyn Fn(InputEvent)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Delivers [`InputEvent`]s to subscribed listeners.
pub trait EventSource {
    fn subscribe(&self, listener: Listener) -> ListenerId;

    /// Removes a listener. Unknown ids are a no-op.
    fn unsubscribe(&self, id: ListenerId);
}

/// Scheduler driven by explicit calls, with a synthetic clock.
///
/// Each [`run_frame`](ManualScheduler::run_frame) advances the clock by one
/// interval and fires every request queued before the call. Requests made
/// from inside a callback wait for the next frame.
pub struct ManualScheduler {
    queue: RefCell<Vec<(FrameRequest, FrameCallback)>>,
    next_id: Cell<u64>,
    now_ms: Cell<f64>,
    interval_ms: f64,
}

impl ManualScheduler {
    /// A scheduler whose frames are `interval_ms` apart.
    pub fn new(interval_ms: f64) -> Self {
        Self {
            queue: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
            now_ms: Cell::new(0.0),
            interval_ms,
        }
    }

    /// Number of requests waiting for the next frame.
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Timestamp of the last fired frame.
    pub fn now_ms(&self) -> f64 {
        self.now_ms.get()
    }

    /// Fires one frame and returns how many callbacks ran.
    pub fn run_frame(&self) -> usize {
        let due = std::mem::take(&mut *self.queue.borrow_mut());
        let now = self.now_ms.get() + self.interval_ms;
        self.now_ms.set(now);
        let fired = due.len();
        for (_, callback) in due {
            callback(now);
        }
        fired
    }

    /// Fires up to `frames` frames, stopping early once nothing is queued.
    /// Returns the number of frames that fired at least one callback.
    pub fn run_frames(&self, frames: usize) -> usize {
        let mut ran = 0;
        for _ in 0..frames {
            if self.run_frame() == 0 {
                break;
            }
            ran += 1;
        }
        ran
    }
}

/// Sixty frames per second.
impl Default for ManualScheduler {
    fn default() -> Self {
        Self::new(1000.0 / 60.0)
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&self, callback: FrameCallback) -> FrameRequest {
        let request = FrameRequest(self.next_id.get());
        self.next_id.set(request.0 + 1);
        self.queue.borrow_mut().push((request, callback));
        request
    }

    fn cancel_frame(&self, request: FrameRequest) {
        self.queue.borrow_mut().retain(|(r, _)| *r != request);
    }
}

/// In-memory event source.
#[derive(Default)]
pub struct EventBus {
    listeners: RefCell<Vec<(ListenerId, Listener)>>,
    next_id: Cell<u64>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers `event` to every listener subscribed at the time of the call.
    pub fn emit(&self, event: InputEvent) {
        let listeners: Vec<Listener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, l)| Rc::clone(l))
            .collect();
        for listener in listeners {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}

impl EventSource for EventBus {
    fn subscribe(&self, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, listener));
        id
    }

    fn unsubscribe(&self, id: ListenerId) {
        self.listeners.borrow_mut().retain(|(l, _)| *l != id);
    }
}
