//! [`EventSource`] over DOM listeners: pointer events on the canvas and
//! resize on the window.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use particle_field_core::host::{EventSource, Listener, ListenerId};
use particle_field_core::InputEvent;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{EventTarget, HtmlCanvasElement, MouseEvent, Window};

/// One registered DOM listener; removed and dropped together.
struct Registration {
    target: EventTarget,
    kind: &'static str,
    closure: Closure<dyn FnMut(web_sys::Event)>,
}

pub struct DomEvents {
    canvas: HtmlCanvasElement,
    window: Window,
    registrations: RefCell<HashMap<u64, Vec<Registration>>>,
    next_id: Cell<u64>,
}

impl DomEvents {
    pub fn new(canvas: HtmlCanvasElement, window: Window) -> Self {
        Self {
            canvas,
            window,
            registrations: RefCell::new(HashMap::new()),
            next_id: Cell::new(1),
        }
    }

    fn register(
        &self,
        target: &EventTarget,
        kind: &'static str,
        handler: impl FnMut(web_sys::Event) + 'static,
    ) -> Option<Registration> {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web_sys::Event)>);
        target
            .add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())
            .ok()?;
        Some(Registration {
            target: target.clone(),
            kind,
            closure,
        })
    }
}

impl EventSource for DomEvents {
    fn subscribe(&self, listener: Listener) -> ListenerId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);

        let mut regs = Vec::with_capacity(3);
        let canvas_target: &EventTarget = self.canvas.as_ref();
        let window_target: &EventTarget = self.window.as_ref();

        let (l, canvas) = (listener.clone(), self.canvas.clone());
        regs.extend(self.register(canvas_target, "mousemove", move |e| {
            if let Some(e) = e.dyn_ref::<MouseEvent>() {
                let rect = canvas.get_bounding_client_rect();
                l(InputEvent::PointerMove {
                    x: e.client_x() as f64 - rect.left(),
                    y: e.client_y() as f64 - rect.top(),
                });
            }
        }));

        let l = listener.clone();
        regs.extend(self.register(canvas_target, "mouseleave", move |_| {
            l(InputEvent::PointerLeave)
        }));

        let (l, canvas) = (listener, self.canvas.clone());
        regs.extend(self.register(window_target, "resize", move |_| {
            l(InputEvent::Resize {
                width: canvas.client_width() as f64,
                height: canvas.client_height() as f64,
            })
        }));

        self.registrations.borrow_mut().insert(id, regs);
        ListenerId(id)
    }

    fn unsubscribe(&self, id: ListenerId) {
        let Some(regs) = self.registrations.borrow_mut().remove(&id.0) else {
            return;
        };
        for reg in regs {
            reg.target
                .remove_event_listener_with_callback(reg.kind, reg.closure.as_ref().unchecked_ref())
                .ok();
        }
    }
}
