//! A running particle field: the simulation state and its tick and paint steps.
//!
//! Per tick and per particle the order is: force contribution, integration,
//! boundary policy, damping. The trail ages in the same tick. Painting draws
//! particles, then links, then the trail; dead trail particles are removed
//! only after the frame that first sees them dead has been painted.

use glam::DVec2;
use log::debug;
use serde_json::Value;

use crate::boundary::{BoundaryPolicy, Bounds};
use crate::clock::FrameClock;
use crate::color::Srgb;
use crate::config::{FieldConfig, Layout};
use crate::engine::Engine;
use crate::error::EngineError;
use crate::force::ForceModel;
use crate::input::InputSnapshot;
use crate::particle::Particle;
use crate::prng::Xorshift64;
use crate::proximity::{Edge, ProximityLinker};
use crate::surface::RenderSurface;
use crate::trail::TrailEmitter;

/// Simulation state of one mounted effect.
#[derive(Debug, Clone)]
pub struct Field {
    config: FieldConfig,
    particles: Vec<Particle>,
    /// False until the first non-empty bounds are seen.
    spawned: bool,
    trail: Option<TrailEmitter>,
    force: ForceModel,
    boundary: BoundaryPolicy,
    linker: Option<ProximityLinker>,
    damping: Option<f64>,
    color: Srgb,
    rng: Xorshift64,
    clock: FrameClock,
    bounds: Bounds,
    ticks: u64,
}

impl Field {
    /// Validates `config` and builds a field for the given bounds.
    ///
    /// If `bounds` is empty the population is created on the first tick
    /// that sees a non-empty surface.
    pub fn new(config: FieldConfig, bounds: Bounds) -> Result<Self, EngineError> {
        config.validate()?;
        let trail = config.trail.then(|| {
            TrailEmitter::new(
                config.trail_max_length,
                config.trail_decay_rate,
                config.trail_opacity,
            )
        });
        let mut field = Self {
            particles: Vec::with_capacity(config.count),
            spawned: false,
            trail,
            force: config.force_model(),
            boundary: config.boundary_policy(),
            linker: config.linker(),
            damping: config.damping,
            color: config.color,
            rng: Xorshift64::new(config.seed),
            clock: FrameClock::new(config.integration, config.reference_fps),
            bounds,
            ticks: 0,
            config,
        };
        field.ensure_spawned();
        Ok(field)
    }

    /// Populates the field once bounds are known.
    fn ensure_spawned(&mut self) {
        if self.spawned || self.bounds.is_empty() {
            return;
        }
        let cfg = &self.config;
        let Bounds { width, height } = self.bounds;
        let columns = cfg.grid_columns.max(1);
        let rows = cfg.count.div_ceil(columns).max(1);
        let anchored = self.force.uses_origin();
        let rng = &mut self.rng;

        self.particles = (0..cfg.count)
            .map(|i| {
                let position = match cfg.layout {
                    Layout::Scatter => {
                        DVec2::new(rng.next_f64() * width, rng.next_f64() * height)
                    }
                    Layout::Grid => DVec2::new(
                        ((i % columns) as f64 + 0.5) * width / columns as f64,
                        ((i / columns) as f64 + 0.5) * height / rows as f64,
                    ),
                };
                let radius = rng.next_range(cfg.radius_min, cfg.radius_max);
                let opacity = rng.next_range(cfg.opacity_min, cfg.opacity_max);
                if anchored {
                    Particle::anchored(position, radius, opacity)
                } else {
                    let velocity =
                        DVec2::new(rng.next_centered(cfg.speed), rng.next_centered(cfg.speed));
                    Particle::drifting(position, velocity, radius, opacity)
                }
            })
            .collect();
        self.spawned = true;
        debug!(
            "spawned {} particles in {}x{}",
            self.particles.len(),
            width,
            height
        );
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Mutable access for hosts that need to place particles explicitly.
    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn trail(&self) -> Option<&TrailEmitter> {
        self.trail.as_ref()
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Number of ticks that actually ran.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Spawns a trail particle at `position` if the trail is enabled.
    pub fn emit_trail(&mut self, position: DVec2) {
        if let Some(trail) = self.trail.as_mut() {
            trail.emit(position, &mut self.rng);
        }
    }

    /// Advances the simulation by one step of `scale` reference frames.
    ///
    /// Bounds are taken from `input` and existing particles are never
    /// re-normalized to them. Returns `false` without touching any state
    /// except the bounds when they are empty.
    pub fn tick(&mut self, input: &InputSnapshot, scale: f64) -> bool {
        self.bounds = input.bounds;
        if self.bounds.is_empty() {
            return false;
        }
        self.ensure_spawned();

        for p in &mut self.particles {
            self.force.apply(p, input.pointer, scale);
            p.integrate(scale);
            self.boundary.apply(p, self.bounds);
            if let Some(d) = self.damping {
                p.damp(d, scale);
            }
        }
        if let Some(trail) = self.trail.as_mut() {
            trail.decay(scale);
        }
        self.ticks += 1;
        true
    }

    /// Links between the current rendered positions.
    pub fn edges(&self) -> Vec<Edge> {
        self.linker
            .map(|linker| linker.edges(&self.particles))
            .unwrap_or_default()
    }

    /// Clears `surface` and draws particles, links and live trail particles.
    pub fn paint(&self, surface: &mut dyn RenderSurface) {
        surface.clear();
        for p in &self.particles {
            surface.fill_circle(p.rendered_position(), p.radius, self.color, p.opacity);
        }
        if let Some(linker) = self.linker {
            for edge in self.edges() {
                surface.stroke_line(
                    self.particles[edge.a].rendered_position(),
                    self.particles[edge.b].rendered_position(),
                    linker.width,
                    self.color,
                    edge.opacity,
                );
            }
        }
        if let Some(trail) = self.trail.as_ref() {
            for dot in trail.dots() {
                surface.fill_circle(dot.center, dot.radius, self.color, dot.opacity);
            }
        }
    }
}

impl Engine for Field {
    fn frame(
        &mut self,
        input: &InputSnapshot,
        timestamp_ms: f64,
        surface: &mut dyn RenderSurface,
    ) -> bool {
        let scale = self.clock.advance(timestamp_ms);
        if !self.tick(input, scale) {
            return false;
        }
        self.paint(surface);
        if let Some(trail) = self.trail.as_mut() {
            trail.cull();
        }
        true
    }

    fn pointer_moved(&mut self, position: DVec2) {
        self.emit_trail(position);
    }

    fn params(&self) -> Value {
        self.config.params()
    }

    fn param_schema(&self) -> Value {
        FieldConfig::param_schema()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ForceKind;
    use crate::surface::{DrawCommand, RecordingSurface};
    use serde_json::json;

    fn input(width: f64, height: f64, pointer: Option<DVec2>) -> InputSnapshot {
        InputSnapshot {
            pointer,
            bounds: Bounds::new(width, height),
        }
    }

    fn config(params: Value) -> FieldConfig {
        FieldConfig::from_json(&params).unwrap()
    }

    #[test]
    fn new_rejects_invalid_config() {
        let cfg = config(json!({"damping": 1.5}));
        assert!(Field::new(cfg, Bounds::new(100.0, 100.0)).is_err());
    }

    #[test]
    fn scatter_spawns_inside_bounds_with_configured_ranges() {
        let cfg = config(json!({"count": 40, "radius_min": 1.0, "radius_max": 3.0}));
        let field = Field::new(cfg, Bounds::new(300.0, 200.0)).unwrap();
        assert_eq!(field.particles().len(), 40);
        for p in field.particles() {
            assert!(field.bounds().contains(p.position));
            assert!(p.radius >= 1.0 && p.radius <= 3.0);
            assert!(p.velocity.x.abs() <= 0.15 && p.velocity.y.abs() <= 0.15);
        }
    }

    #[test]
    fn grid_layout_places_cell_centers() {
        let cfg = config(json!({"count": 9, "layout": "grid", "grid_columns": 3, "force": "repel", "speed": 0}));
        let field = Field::new(cfg, Bounds::new(300.0, 300.0)).unwrap();
        let first = field.particles()[0].position;
        let last = field.particles()[8].position;
        assert_eq!(first, DVec2::new(50.0, 50.0));
        assert_eq!(last, DVec2::new(250.0, 250.0));
    }

    #[test]
    fn origin_return_particles_are_anchored_at_rest() {
        let cfg = config(json!({"count": 10, "force": "origin_return"}));
        let field = Field::new(cfg, Bounds::new(100.0, 100.0)).unwrap();
        for p in field.particles() {
            assert_eq!(p.origin, Some(p.position));
            assert_eq!(p.velocity, DVec2::ZERO);
        }
    }

    #[test]
    fn same_seed_same_field() {
        let a = Field::new(config(json!({"seed": 5})), Bounds::new(200.0, 200.0)).unwrap();
        let b = Field::new(config(json!({"seed": 5})), Bounds::new(200.0, 200.0)).unwrap();
        assert_eq!(a.particles(), b.particles());
    }

    #[test]
    fn empty_bounds_defer_spawning_and_skip_ticks() {
        let mut field = Field::new(FieldConfig::default(), Bounds::new(0.0, 0.0)).unwrap();
        assert!(field.particles().is_empty());
        assert!(!field.tick(&input(0.0, 0.0, None), 1.0));
        assert_eq!(field.ticks(), 0);
        assert!(field.tick(&input(640.0, 480.0, None), 1.0));
        assert_eq!(field.particles().len(), FieldConfig::default().count);
    }

    #[test]
    fn skipped_frame_paints_nothing() {
        let mut field = Field::new(FieldConfig::default(), Bounds::new(0.0, 0.0)).unwrap();
        let mut surface = RecordingSurface::new(0.0, 0.0);
        assert!(!field.frame(&input(0.0, 0.0, None), 0.0, &mut surface));
        assert_eq!(surface.frames(), 0);
    }

    #[test]
    fn resize_does_not_resample_particles() {
        let cfg = config(json!({"count": 20, "force": "drift", "damping": null}));
        let mut field = Field::new(cfg, Bounds::new(400.0, 400.0)).unwrap();
        let before: Vec<DVec2> = field.particles().iter().map(|p| p.position).collect();
        field.tick(&input(50.0, 50.0, None), 1.0);
        for (p, old) in field.particles().iter().zip(before) {
            assert!((p.position - old).length() <= 0.3);
        }
        assert_eq!(field.bounds(), Bounds::new(50.0, 50.0));
    }

    #[test]
    fn damping_without_force_strictly_decreases_speed() {
        let cfg = config(json!({"count": 15, "force": "drift", "damping": 0.99, "speed": 2.0}));
        let mut field = Field::new(cfg, Bounds::new(500.0, 500.0)).unwrap();
        let mut speeds: Vec<f64> = field.particles().iter().map(|p| p.velocity.length()).collect();
        for _ in 0..300 {
            field.tick(&input(500.0, 500.0, None), 1.0);
            for (p, prev) in field.particles().iter().zip(speeds.iter_mut()) {
                let now = p.velocity.length();
                if *prev > 0.0 {
                    assert!(now < *prev, "speed did not decrease: {now} >= {prev}");
                }
                *prev = now;
            }
        }
        assert!(speeds.iter().all(|&s| s < 2.0 * 0.99_f64.powi(300)));
    }

    #[test]
    fn pointer_attraction_accelerates_nearby_particle() {
        let cfg = config(json!({"count": 1, "speed": 0, "damping": null}));
        let mut field = Field::new(cfg, Bounds::new(400.0, 400.0)).unwrap();
        let start = field.particles()[0].position;
        let pointer = start + DVec2::new(100.0, 0.0);
        field.tick(&input(400.0, 400.0, Some(pointer)), 1.0);
        assert!(field.particles()[0].velocity.x > 0.0);
    }

    #[test]
    fn tethered_particle_returns_toward_origin_after_pointer_leaves() {
        let cfg = config(json!({"count": 1, "force": "origin_return", "damping": 0.95}));
        let mut field = Field::new(cfg, Bounds::new(400.0, 400.0)).unwrap();
        let origin = field.particles()[0].position;
        let pointer = origin + DVec2::new(40.0, 0.0);
        for _ in 0..30 {
            field.tick(&input(400.0, 400.0, Some(pointer)), 1.0);
        }
        let pulled = field.particles()[0].position.distance(origin);
        assert!(pulled > 1.0, "particle did not follow the pointer");
        for _ in 0..400 {
            field.tick(&input(400.0, 400.0, None), 1.0);
        }
        assert!(field.particles()[0].position.distance(origin) < 0.1);
    }

    #[test]
    fn repel_displacement_is_recomputed_every_tick() {
        let cfg = config(json!({"count": 1, "force": "repel", "speed": 0}));
        let mut field = Field::new(cfg, Bounds::new(400.0, 400.0)).unwrap();
        let at = field.particles()[0].position;
        field.tick(&input(400.0, 400.0, Some(at - DVec2::new(10.0, 0.0))), 1.0);
        let p = &field.particles()[0];
        assert!(p.displacement.x > 0.0);
        assert_eq!(p.position, at, "repulsion must not move the particle itself");
        field.tick(&input(400.0, 400.0, None), 1.0);
        assert_eq!(field.particles()[0].displacement, DVec2::ZERO);
    }

    #[test]
    fn paint_draws_particles_then_links() {
        let cfg = config(json!({"count": 2, "force": "drift", "connection_radius": 20, "link_opacity": 0.3}));
        let mut field = Field::new(cfg, Bounds::new(100.0, 100.0)).unwrap();
        field.particles_mut()[0].position = DVec2::new(0.0, 0.0);
        field.particles_mut()[1].position = DVec2::new(10.0, 0.0);
        let mut surface = RecordingSurface::new(100.0, 100.0);
        field.paint(&mut surface);
        let cmds = surface.commands();
        assert_eq!(cmds[0], DrawCommand::Clear);
        assert!(matches!(cmds[1], DrawCommand::Circle { .. }));
        assert!(matches!(cmds[2], DrawCommand::Circle { .. }));
        match &cmds[3] {
            DrawCommand::Line { opacity, .. } => assert!((opacity - 0.15).abs() < 1e-12),
            other => panic!("expected a line, got {other:?}"),
        }
    }

    #[test]
    fn trail_particle_is_gone_from_the_frame_after_fifty_ticks() {
        let cfg = config(json!({"count": 0, "trail": true, "connection_radius": null}));
        let mut field = Field::new(cfg, Bounds::new(100.0, 100.0)).unwrap();
        let mut surface = RecordingSurface::new(100.0, 100.0);
        field.pointer_moved(DVec2::new(50.0, 50.0));
        for t in 1..=49 {
            field.frame(&input(100.0, 100.0, None), t as f64 * 16.0, &mut surface);
            assert_eq!(surface.circles().count(), 1, "missing at tick {t}");
        }
        field.frame(&input(100.0, 100.0, None), 50.0 * 16.0, &mut surface);
        assert_eq!(surface.circles().count(), 0);
        assert!(field.trail().unwrap().is_empty());
    }

    #[test]
    fn oversized_population_or_trail_fails_construction() {
        let huge = 1_000_000_000_000_000_000_u64;
        let cfg = config(json!({"count": huge}));
        assert!(Field::new(cfg, Bounds::new(100.0, 100.0)).is_err());
        let cfg = config(json!({"count": 0, "trail": true, "trail_max_length": huge}));
        assert!(Field::new(cfg, Bounds::new(100.0, 100.0)).is_err());
    }

    #[test]
    fn delta_frames_scale_motion_and_damping_by_elapsed_time() {
        let params = json!({
            "count": 1, "force": "drift", "damping": 0.9,
            "integration": "delta", "reference_fps": 50,
        });
        let bounds = Bounds::new(1000.0, 1000.0);
        let mut surface = RecordingSurface::new(1000.0, 1000.0);
        let mut fields = [
            Field::new(config(params.clone()), bounds).unwrap(),
            Field::new(config(params), bounds).unwrap(),
        ];
        for field in &mut fields {
            field.particles_mut()[0].position = DVec2::new(500.0, 500.0);
            field.particles_mut()[0].velocity = DVec2::new(1.0, -0.5);
            field.frame(&input(1000.0, 1000.0, None), 0.0, &mut surface);
        }
        let start = fields[0].particles()[0].clone();
        assert_eq!(start, fields[1].particles()[0]);

        // one reference frame is 20 ms
        let [single, double] = &mut fields;
        single.frame(&input(1000.0, 1000.0, None), 20.0, &mut surface);
        double.frame(&input(1000.0, 1000.0, None), 40.0, &mut surface);

        let one = &single.particles()[0];
        let two = &double.particles()[0];
        let step_one = one.position - start.position;
        let step_two = two.position - start.position;
        assert!((step_two - step_one * 2.0).length() < 1e-9);
        assert!((one.velocity - start.velocity * 0.9).length() < 1e-12);
        assert!((two.velocity - start.velocity * 0.81).length() < 1e-12);
    }

    #[test]
    fn delta_frames_scale_trail_decay() {
        let cfg = config(json!({
            "count": 0, "trail": true, "trail_decay_rate": 0.02,
            "integration": "delta", "reference_fps": 50,
        }));
        let mut field = Field::new(cfg, Bounds::new(100.0, 100.0)).unwrap();
        let mut surface = RecordingSurface::new(100.0, 100.0);
        field.pointer_moved(DVec2::new(50.0, 50.0));
        field.frame(&input(100.0, 100.0, None), 0.0, &mut surface);
        field.frame(&input(100.0, 100.0, None), 40.0, &mut surface);
        let life = field.trail().unwrap().particles().next().unwrap().life.unwrap();
        assert!((life - (1.0 - 0.02 - 2.0 * 0.02)).abs() < 1e-12);
    }

    #[test]
    fn edges_follow_rendered_positions() {
        let cfg = config(json!({"count": 3, "force": "drift", "connection_radius": 20}));
        let mut field = Field::new(cfg, Bounds::new(100.0, 100.0)).unwrap();
        field.particles_mut()[0].position = DVec2::new(0.0, 0.0);
        field.particles_mut()[1].position = DVec2::new(10.0, 0.0);
        field.particles_mut()[2].position = DVec2::new(90.0, 90.0);
        let edges = field.edges();
        assert_eq!(edges.len(), 1);
        assert_eq!((edges[0].a, edges[0].b), (0, 1));

        let mut surface = RecordingSurface::new(100.0, 100.0);
        field.paint(&mut surface);
        let lines = surface
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::Line { .. }))
            .count();
        assert_eq!(lines, edges.len());
    }

    #[test]
    fn trail_is_ignored_when_disabled() {
        let mut field = Field::new(FieldConfig::default(), Bounds::new(100.0, 100.0)).unwrap();
        field.pointer_moved(DVec2::new(1.0, 1.0));
        assert!(field.trail().is_none());
    }

    #[test]
    fn params_reflect_config() {
        let field = Field::new(
            config(json!({"force": "drift", "count": 7})),
            Bounds::new(10.0, 10.0),
        )
        .unwrap();
        assert_eq!(field.params()["count"], 7);
        assert_eq!(field.config().force, ForceKind::Drift);
        assert!(field.param_schema().get("trail_decay_rate").is_some());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn drift_particles_stay_within_one_step_of_bounds(seed: u64, ticks in 1_usize..400) {
                let cfg = FieldConfig::from_json(&json!({
                    "count": 20, "force": "drift", "speed": 4.0, "seed": seed,
                })).unwrap();
                let bounds = Bounds::new(120.0, 80.0);
                let mut field = Field::new(cfg, bounds).unwrap();
                let snap = InputSnapshot { pointer: None, bounds };
                for _ in 0..ticks {
                    field.tick(&snap, 1.0);
                    for p in field.particles() {
                        let slack = p.velocity.abs() / 0.99 + DVec2::splat(1e-9);
                        prop_assert!(p.position.x >= -slack.x && p.position.x <= bounds.width + slack.x);
                        prop_assert!(p.position.y >= -slack.y && p.position.y <= bounds.height + slack.y);
                    }
                }
            }

            #[test]
            fn attraction_never_produces_non_finite_state(
                seed: u64,
                px in -100.0_f64..500.0,
                py in -100.0_f64..500.0,
            ) {
                let cfg = FieldConfig::from_json(&json!({"count": 10, "seed": seed})).unwrap();
                let bounds = Bounds::new(400.0, 400.0);
                let mut field = Field::new(cfg, bounds).unwrap();
                let snap = InputSnapshot { pointer: Some(DVec2::new(px, py)), bounds };
                for _ in 0..200 {
                    field.tick(&snap, 1.0);
                }
                for p in field.particles() {
                    prop_assert!(p.position.is_finite() && p.velocity.is_finite());
                }
            }
        }
    }
}
