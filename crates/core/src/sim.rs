//! The frame loop: mounting, per-frame driving and teardown.
//!
//! A mounted effect owns exactly one input listener and at most one pending
//! frame request. State lives behind `Rc<RefCell<_>>`; scheduled callbacks
//! and the listener hold only `Weak` references and check the loop state
//! before touching anything, so a callback that fires after teardown is a
//! no-op.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use glam::DVec2;
use log::{debug, trace};
use serde_json::Value;

use crate::boundary::Bounds;
use crate::config::FieldConfig;
use crate::engine::Engine;
use crate::error::EngineError;
use crate::field::Field;
use crate::host::{EventSource, FrameRequest, FrameScheduler, Listener, ListenerId};
use crate::input::{InputEvent, InputTracker};
use crate::surface::RenderSurface;

/// Lifecycle of a mounted loop. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
    Stopped,
}

/// What the loop drives; released on stop.
struct Scene {
    engine: Box<dyn Engine>,
    surface: Box<dyn RenderSurface>,
}

struct Shared {
    state: LoopState,
    scene: Option<Scene>,
    tracker: InputTracker,
    pending: Option<FrameRequest>,
    listener: Option<ListenerId>,
    frames: u64,
    skipped: u64,
}

struct Inner {
    shared: RefCell<Shared>,
    scheduler: Rc<dyn FrameScheduler>,
    events: Rc<dyn EventSource>,
}

/// Entry points for mounting an effect onto a surface.
pub struct SimulationLoop;

impl SimulationLoop {
    /// Validates `config`, builds a [`Field`] sized to `surface` and starts it.
    pub fn mount(
        config: FieldConfig,
        surface: Box<dyn RenderSurface>,
        scheduler: Rc<dyn FrameScheduler>,
        events: Rc<dyn EventSource>,
    ) -> Result<FieldHandle, EngineError> {
        let (width, height) = surface.size();
        let field = Field::new(config, Bounds::new(width, height))?;
        Ok(Self::mount_engine(
            Box::new(field),
            surface,
            scheduler,
            events,
        ))
    }

    /// Starts driving an arbitrary engine.
    pub fn mount_engine(
        engine: Box<dyn Engine>,
        surface: Box<dyn RenderSurface>,
        scheduler: Rc<dyn FrameScheduler>,
        events: Rc<dyn EventSource>,
    ) -> FieldHandle {
        let (width, height) = surface.size();
        let inner = Rc::new(Inner {
            shared: RefCell::new(Shared {
                state: LoopState::Idle,
                scene: Some(Scene { engine, surface }),
                tracker: InputTracker::new(width, height),
                pending: None,
                listener: None,
                frames: 0,
                skipped: 0,
            }),
            scheduler,
            events,
        });

        let listener = inner.events.subscribe(make_listener(Rc::downgrade(&inner)));
        {
            let mut shared = inner.shared.borrow_mut();
            shared.listener = Some(listener);
            shared.state = LoopState::Running;
        }
        schedule_next(&inner);
        debug!("mounted field on {width}x{height} surface");
        FieldHandle { inner }
    }
}

fn make_listener(weak: Weak<Inner>) -> Listener {
    Rc::new(move |event| {
        let Some(inner) = weak.upgrade() else {
            return;
        };
        let Ok(mut shared) = inner.shared.try_borrow_mut() else {
            trace!("input event arrived mid-frame, dropped: {event:?}");
            return;
        };
        if shared.state != LoopState::Running {
            return;
        }
        shared.tracker.handle(event);
        let Some(scene) = shared.scene.as_mut() else {
            return;
        };
        match event {
            InputEvent::PointerMove { x, y } if x.is_finite() && y.is_finite() => {
                scene.engine.pointer_moved(DVec2::new(x, y));
            }
            InputEvent::Resize { width, height } => {
                debug!("surface resized to {width}x{height}");
                scene.surface.resize(width, height);
            }
            _ => {}
        }
    })
}

fn schedule_next(inner: &Rc<Inner>) {
    let weak = Rc::downgrade(inner);
    let request = inner.scheduler.request_frame(Box::new(move |timestamp_ms| {
        match weak.upgrade() {
            Some(inner) => run_frame(&inner, timestamp_ms),
            None => trace!("frame fired after the field was dropped"),
        }
    }));
    inner.shared.borrow_mut().pending = Some(request);
}

fn run_frame(inner: &Rc<Inner>, timestamp_ms: f64) {
    {
        let mut shared = inner.shared.borrow_mut();
        shared.pending = None;
        if shared.state != LoopState::Running {
            trace!("frame fired after stop, ignored");
            return;
        }
        let input = shared.tracker.snapshot();
        let painted = match shared.scene.as_mut() {
            Some(scene) => scene
                .engine
                .frame(&input, timestamp_ms, &mut *scene.surface),
            None => return,
        };
        if painted {
            shared.frames += 1;
        } else {
            shared.skipped += 1;
            trace!("skipped frame at {timestamp_ms}ms: empty surface");
        }
    }
    schedule_next(inner);
}

/// Owner of a mounted effect. Dropping the handle stops the effect.
pub struct FieldHandle {
    inner: Rc<Inner>,
}

impl FieldHandle {
    /// Stops the loop, cancels the pending frame and removes the listener.
    ///
    /// Idempotent. The engine and surface are released here.
    pub fn stop(&self) {
        let (pending, listener, scene) = {
            let mut shared = self.inner.shared.borrow_mut();
            if shared.state == LoopState::Stopped {
                return;
            }
            shared.state = LoopState::Stopped;
            (
                shared.pending.take(),
                shared.listener.take(),
                shared.scene.take(),
            )
        };
        if let Some(request) = pending {
            self.inner.scheduler.cancel_frame(request);
        }
        if let Some(id) = listener {
            self.inner.events.unsubscribe(id);
        }
        drop(scene);
        debug!("field stopped after {} frames", self.frames());
    }

    pub fn state(&self) -> LoopState {
        self.inner.shared.borrow().state
    }

    pub fn is_running(&self) -> bool {
        self.state() == LoopState::Running
    }

    /// Frames that ticked and painted.
    pub fn frames(&self) -> u64 {
        self.inner.shared.borrow().frames
    }

    /// Frames skipped because the surface had no area.
    pub fn skipped_frames(&self) -> u64 {
        self.inner.shared.borrow().skipped
    }

    /// Whether a frame request is outstanding.
    pub fn has_pending_frame(&self) -> bool {
        self.inner.shared.borrow().pending.is_some()
    }

    /// Current engine parameters, `None` once stopped.
    pub fn params(&self) -> Option<Value> {
        let shared = self.inner.shared.borrow();
        shared.scene.as_ref().map(|scene| scene.engine.params())
    }
}

impl Drop for FieldHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
