#![deny(unsafe_code)]
//! Browser bindings: mount a preset on a `<canvas>` and stop it again.
//!
//! ```js
//! const field = mount(canvas, "neural-network", "{}");
//! // on unmount
//! field.stop();
//! ```

mod canvas;
mod events;
mod scheduler;

use std::rc::Rc;

use particle_field_core::{FieldConfig, FieldHandle, SimulationLoop};
use particle_field_engines::Preset;
use serde_json::Value;
use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

pub use canvas::CanvasSurface;
pub use events::DomEvents;
pub use scheduler::RafScheduler;

/// A running effect. Dropping it on the JS side (`free()`) also stops it.
#[wasm_bindgen]
pub struct WasmField {
    handle: FieldHandle,
}

#[wasm_bindgen]
impl WasmField {
    /// Cancels the pending frame and removes all listeners. Idempotent.
    pub fn stop(&self) {
        self.handle.stop();
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.handle.is_running()
    }

    /// Frames painted so far.
    pub fn frames(&self) -> f64 {
        self.handle.frames() as f64
    }

    /// Effective parameters as JSON, or `null` once stopped.
    pub fn params(&self) -> String {
        self.handle
            .params()
            .map(|p| p.to_string())
            .unwrap_or_else(|| "null".to_string())
    }
}

/// The `seed` param if given, otherwise `fallback()`.
fn resolve_seed(params: &Value, fallback: impl FnOnce() -> u64) -> u64 {
    params
        .get("seed")
        .and_then(Value::as_u64)
        .unwrap_or_else(fallback)
}

/// Mounts `preset` on `canvas` with `params_json` overrides.
#[wasm_bindgen]
pub fn mount(
    canvas: HtmlCanvasElement,
    preset: &str,
    params_json: &str,
) -> Result<WasmField, JsValue> {
    let params: Value = serde_json::from_str(params_json)
        .map_err(|e| JsValue::from_str(&format!("invalid params JSON: {e}")))?;
    let preset = Preset::from_name(preset).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let seed = resolve_seed(&params, || (js_sys::Math::random() * u32::MAX as f64) as u64);
    let config = preset
        .build_config(seed, &params)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let surface = CanvasSurface::new(canvas.clone()).map_err(|e| JsValue::from_str(&e))?;
    let scheduler = Rc::new(RafScheduler::new(window.clone()));
    let events = Rc::new(DomEvents::new(canvas, window));

    let handle = SimulationLoop::mount(config, Box::new(surface), scheduler, events)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(WasmField { handle })
}

#[wasm_bindgen(js_name = listPresets)]
pub fn list_presets() -> js_sys::Array {
    Preset::list_names()
        .iter()
        .map(|name| JsValue::from_str(name))
        .collect()
}

/// JSON schema of every accepted parameter.
#[wasm_bindgen(js_name = paramSchema)]
pub fn param_schema() -> String {
    FieldConfig::param_schema().to_string()
}
