//! Headless driver: runs a preset through the real frame loop into a
//! [`Raster`], with a manual scheduler and a scripted pointer.

use std::cell::RefCell;
use std::rc::Rc;

use log::debug;
use particle_field_core::error::EngineError;
use particle_field_core::host::{EventBus, ManualScheduler};
use particle_field_core::input::InputEvent;
use particle_field_core::{Raster, Seed, SimulationLoop, Srgb};
use serde_json::Value;

use crate::Preset;

/// Background the headless raster is cleared to.
pub const BACKGROUND: Srgb = Srgb {
    r: 5.0 / 255.0,
    g: 5.0 / 255.0,
    b: 5.0 / 255.0,
};

/// Result of a headless render.
#[derive(Debug, Clone)]
pub struct Render {
    pub raster: Raster,
    /// Frames that actually painted.
    pub frames: u64,
    /// Effective parameters of the field that was rendered.
    pub params: Value,
}

/// Renders `seed` by mounting its preset on a raster and firing `seed.ticks`
/// frames.
///
/// Before each frame the pointer path is sampled: a position is delivered as
/// a pointer move, and the transition to no position as a pointer leave.
pub fn render_seed(seed: &Seed) -> Result<Render, EngineError> {
    seed.validate()?;
    let preset = Preset::from_name(&seed.preset)?;
    let config = preset.build_config(seed.seed, &seed.params)?;
    let params = config.params();

    let raster = Rc::new(RefCell::new(Raster::new(seed.width, seed.height, BACKGROUND)?));
    let scheduler = Rc::new(ManualScheduler::default());
    let bus = Rc::new(EventBus::new());
    let handle = SimulationLoop::mount(
        config,
        Box::new(Rc::clone(&raster)),
        scheduler.clone(),
        bus.clone(),
    )?;

    let (width, height) = (seed.width as f64, seed.height as f64);
    let mut pointer_inside = false;
    for tick in 0..seed.ticks {
        match seed.pointer.position(tick, width, height) {
            Some(p) => {
                bus.emit(InputEvent::PointerMove { x: p.x, y: p.y });
                pointer_inside = true;
            }
            None if pointer_inside => {
                bus.emit(InputEvent::PointerLeave);
                pointer_inside = false;
            }
            None => {}
        }
        scheduler.run_frame();
    }

    let frames = handle.frames();
    handle.stop();
    drop(handle);
    debug!(
        "rendered preset '{}' at {}x{}: {} frames",
        seed.preset, seed.width, seed.height, frames
    );

    let raster = Rc::try_unwrap(raster)
        .map(RefCell::into_inner)
        .unwrap_or_else(|shared| {
            let raster = shared.borrow().clone();
            raster
        });
    Ok(Render {
        raster,
        frames,
        params,
    })
}
