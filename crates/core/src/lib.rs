#![deny(unsafe_code)]
//! Core types for the particle-field effect engine.
//!
//! Provides the `Particle` model, `ForceModel` strategies, `BoundaryPolicy`,
//! `ProximityLinker`, `TrailEmitter`, the `RenderSurface` drawing seam with a
//! CPU `Raster`, input tracking, the `Field` simulation, the `SimulationLoop`
//! with its host traits, plus `FieldConfig`, `Srgb`, `Xorshift64` and `Seed`.

pub mod boundary;
pub mod clock;
pub mod color;
pub mod config;
pub mod engine;
pub mod error;
pub mod field;
pub mod force;
pub mod host;
pub mod input;
pub mod particle;
pub mod prng;
pub mod proximity;
pub mod raster;
pub mod seed;
pub mod sim;
pub mod surface;
pub mod trail;

pub use boundary::{BoundaryPolicy, Bounds};
pub use color::Srgb;
pub use config::{FieldConfig, ForceKind, Integration, Layout};
pub use engine::Engine;
pub use error::EngineError;
pub use field::Field;
pub use force::ForceModel;
pub use host::{EventBus, EventSource, FrameScheduler, ManualScheduler};
pub use input::{InputEvent, InputSnapshot, InputTracker};
pub use particle::Particle;
pub use prng::Xorshift64;
pub use proximity::{Edge, ProximityLinker};
pub use raster::Raster;
pub use seed::{PointerPath, Seed};
pub use sim::{FieldHandle, LoopState, SimulationLoop};
pub use surface::RenderSurface;
pub use trail::TrailEmitter;
