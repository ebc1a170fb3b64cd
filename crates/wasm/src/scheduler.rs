//! [`FrameScheduler`] over `requestAnimationFrame`.
//!
//! One persistent closure is registered for every request. Each firing pops
//! the oldest queued callback, which matches the browser's firing order, so
//! no per-frame closure is allocated or leaked.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use log::warn;
use particle_field_core::host::{FrameCallback, FrameRequest, FrameScheduler};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Window;

struct Queued {
    request: FrameRequest,
    handle: i32,
    callback: FrameCallback,
}

pub struct RafScheduler {
    window: Window,
    queue: Rc<RefCell<VecDeque<Queued>>>,
    next_id: Cell<u64>,
    tick: Closure<dyn FnMut(f64)>,
}

impl RafScheduler {
    pub fn new(window: Window) -> Self {
        let queue: Rc<RefCell<VecDeque<Queued>>> = Rc::default();
        let weak = Rc::downgrade(&queue);
        let tick = Closure::wrap(Box::new(move |timestamp_ms: f64| {
            let Some(queue) = weak.upgrade() else {
                return;
            };
            let next = queue.borrow_mut().pop_front();
            if let Some(queued) = next {
                (queued.callback)(timestamp_ms);
            }
        }) as Box<dyn FnMut(f64)>);
        Self {
            window,
            queue,
            next_id: Cell::new(1),
            tick,
        }
    }
}

impl FrameScheduler for RafScheduler {
    fn request_frame(&self, callback: FrameCallback) -> FrameRequest {
        let request = FrameRequest(self.next_id.get());
        self.next_id.set(request.0 + 1);
        match self
            .window
            .request_animation_frame(self.tick.as_ref().unchecked_ref())
        {
            Ok(handle) => self.queue.borrow_mut().push_back(Queued {
                request,
                handle,
                callback,
            }),
            Err(e) => warn!("requestAnimationFrame failed: {e:?}"),
        }
        request
    }

    fn cancel_frame(&self, request: FrameRequest) {
        let mut queue = self.queue.borrow_mut();
        if let Some(pos) = queue.iter().position(|q| q.request == request) {
            if let Some(queued) = queue.remove(pos) {
                self.window.cancel_animation_frame(queued.handle).ok();
            }
        }
    }
}
