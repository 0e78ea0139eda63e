//! Per-frame gameplay: input, player movement, firing, physics, projectile
//! bookkeeping and light flicker. Owns no GPU state, so a whole frame can run
//! headless in tests.

use crate::config::GameConfig;
use crate::flicker::{FlickerError, LightingFlickerController};
use crate::projectile::ProjectileManager;
use crate::scene::initial_light_rig;
use engine_core::{LightRig, Vec3};
use input::InputSnapshot;
use physics::{BodyDesc, BodyShape, CollisionGroup, PhysicsError, PhysicsWorld, RigidBodyHandle};
use renderer::{Camera, FrameState, MeshData, RenderFlags};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("physics setup failed: {0}")]
    Physics(#[from] PhysicsError),
    #[error(transparent)]
    Flicker(#[from] FlickerError),
}

/// What happened during one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameReport {
    /// Seconds actually simulated. Zero while paused.
    pub physics_step: f32,
    pub fired: bool,
    /// Projectiles retired against the environment.
    pub hits: usize,
    pub flicker_substeps: usize,
    pub paused: bool,
}

pub struct FrameOrchestrator {
    config: GameConfig,
    physics: PhysicsWorld,
    camera: Camera,
    projectiles: ProjectileManager,
    flicker: LightingFlickerController,
    lights: LightRig,
    player: RigidBodyHandle,
    environment: RigidBodyHandle,
    paused: bool,
    flags: RenderFlags,
    debug_light: Option<usize>,
    wireframe_supported: bool,
}

impl FrameOrchestrator {
    /// Build the world: a static body from `environment`, the player box and the light rig.
    pub fn new(config: &GameConfig, environment: &MeshData) -> Result<Self, OrchestratorError> {
        let mut physics = PhysicsWorld::new(
            Vec3::new(0.0, config.physics.gravity, 0.0),
            config.physics.max_step,
            config.physics.solver_iterations,
        );

        let environment_body = physics.create_body(&BodyDesc::new(
            BodyShape::Mesh {
                vertices: environment.positions(),
                triangles: environment.triangles(),
            },
            Vec3::ZERO,
            0.0,
        ))?;

        let player_config = &config.player;
        let player = physics.create_body(
            &BodyDesc::new(
                BodyShape::Box {
                    half_extents: player_config.half_extents,
                },
                player_config.spawn,
                player_config.mass,
            )
            .with_material(player_config.friction, 0.0)
            .with_group(CollisionGroup::Player)
            .upright(),
        )?;

        let mut camera = Camera::new(player_config.spawn + Vec3::Y * player_config.eye_height);
        camera.sensitivity = config.input.mouse_sensitivity;
        camera.set_yaw_pitch(
            player_config.start_yaw_degrees.to_radians(),
            player_config.start_pitch_degrees.to_radians(),
        );

        let flags = RenderFlags {
            bloom: config.render.bloom,
            exposure: config.render.exposure,
            ..Default::default()
        };

        log::info!(
            "World ready: {} environment triangles, player at {}",
            environment.triangle_count(),
            player_config.spawn
        );

        Ok(Self {
            config: config.clone(),
            physics,
            camera,
            projectiles: ProjectileManager::new(&config.projectile),
            flicker: LightingFlickerController::new(&config.flicker)?,
            lights: initial_light_rig(),
            player,
            environment: environment_body,
            paused: false,
            flags,
            debug_light: None,
            wireframe_supported: true,
        })
    }

    /// Run one frame of gameplay. `now` is the frame clock, `dt` the raw frame time.
    pub fn frame(&mut self, input: &InputSnapshot, now: f32, dt: f32) -> FrameReport {
        self.handle_toggles(input);
        let mut report = FrameReport {
            paused: self.paused,
            ..Default::default()
        };

        if !self.paused {
            self.camera
                .process_mouse(input.mouse_delta.x, input.mouse_delta.y);
            self.apply_movement(input);
            if input.fire_held {
                report.fired = self.fire(now);
            }
            report.physics_step = self.physics.step(dt);
            report.hits = self.projectiles.reconcile(&mut self.physics, self.environment);
            let warming_up = self.flicker.is_warming_up();
            report.flicker_substeps = self.flicker.advance(dt, &mut self.lights);
            if warming_up && !self.flicker.is_warming_up() {
                log::info!("All ceiling lights on");
            }
        }

        self.sync_camera();
        report
    }

    /// Snapshot of everything the renderer draws this frame.
    pub fn frame_state(&self, time: f32) -> FrameState {
        FrameState {
            camera: self.camera.clone(),
            lights: self.lights.clone(),
            projectiles: self.projectiles.projectile_transforms(&self.physics),
            decals: self.projectiles.decal_transforms(),
            flags: self.flags,
            time,
            debug_light: self.debug_light,
        }
    }

    fn handle_toggles(&mut self, input: &InputSnapshot) {
        if input.pause_pressed {
            self.paused = !self.paused;
            self.flags.paused = self.paused;
            log::info!("{}", if self.paused { "Paused" } else { "Resumed" });
        }

        if input.cycle_debug_light {
            self.debug_light = match self.debug_light {
                None if !self.lights.is_empty() => Some(0),
                Some(i) if i + 1 < self.lights.len() => Some(i + 1),
                _ => None,
            };
            match self.debug_light {
                Some(i) => log::info!(
                    "Debug light {} at {}",
                    i,
                    self.lights.lights[i].position()
                ),
                None => log::info!("Debug light off"),
            }
        }

        if input.dump_position {
            log::info!(
                "Position {} yaw {:.2} pitch {:.2}, {} projectiles, {} decals",
                self.camera.position(),
                self.camera.yaw().to_degrees(),
                self.camera.pitch().to_degrees(),
                self.projectiles.live().len(),
                self.projectiles.decals().len()
            );
            log::info!("Flicker {:?}", self.flicker.phase());
        }

        if self.paused {
            return;
        }
        if input.toggle_wireframe {
            if self.wireframe_supported {
                self.flags.wireframe = !self.flags.wireframe;
            } else {
                log::warn!("Wireframe not supported by this adapter");
            }
        }
        if input.toggle_bloom {
            self.flags.bloom = !self.flags.bloom;
            log::info!("Bloom {}", if self.flags.bloom { "on" } else { "off" });
        }
        if input.toggle_bloom_view {
            self.flags.show_bloom_buffer = !self.flags.show_bloom_buffer;
        }
    }

    /// Replace horizontal velocity with the movement intent, keep the vertical part.
    fn apply_movement(&mut self, input: &InputSnapshot) {
        let Some(velocity) = self.physics.linear_velocity(self.player) else {
            return;
        };
        let mut velocity = velocity;

        if input.has_movement() {
            let axes = input.movement_axes();
            let wish = self
                .camera
                .horizontal_to_world(Vec3::new(axes.x, 0.0, -axes.y))
                * self.config.player.move_speed;
            velocity.x = wish.x;
            velocity.z = wish.z;
        }
        if input.jump_pressed {
            velocity.y += self.config.player.jump_speed;
        }
        if input.has_movement() || input.jump_pressed {
            self.physics.set_linear_velocity(self.player, velocity);
        }
    }

    fn fire(&mut self, now: f32) -> bool {
        match self.projectiles.fire(
            self.camera.position(),
            self.camera.forward(),
            now,
            &mut self.physics,
        ) {
            Ok(body) => body.is_some(),
            Err(e) => {
                log::warn!("Failed to spawn projectile: {}", e);
                false
            }
        }
    }

    fn sync_camera(&mut self) {
        if let Some(position) = self.physics.body_position(self.player) {
            self.camera
                .set_position(position + Vec3::Y * self.config.player.eye_height);
        }
    }

    pub fn set_wireframe_supported(&mut self, supported: bool) {
        self.wireframe_supported = supported;
        if !supported {
            self.flags.wireframe = false;
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flicker::STEADY_LIGHT;
    use crate::scene::procedural_room;
    use glam::Vec2;

    const DT: f32 = 1.0 / 60.0;

    impl FrameOrchestrator {
        fn camera(&self) -> &Camera {
            &self.camera
        }

        fn lights(&self) -> &LightRig {
            &self.lights
        }

        fn flicker(&self) -> &LightingFlickerController {
            &self.flicker
        }

        fn projectiles(&self) -> &ProjectileManager {
            &self.projectiles
        }

        fn physics(&self) -> &PhysicsWorld {
            &self.physics
        }

        fn player_velocity(&self) -> Vec3 {
            self.physics
                .linear_velocity(self.player)
                .unwrap_or(Vec3::ZERO)
        }
    }

    fn orchestrator() -> FrameOrchestrator {
        let mut config = GameConfig::default();
        config.flicker.seed = Some(11);
        FrameOrchestrator::new(&config, &procedural_room()).expect("world")
    }

    /// Run idle frames so the player settles on the floor. Returns the clock.
    fn settle(orchestrator: &mut FrameOrchestrator, frames: usize) -> f32 {
        let idle = InputSnapshot::default();
        let mut now = 0.0;
        for _ in 0..frames {
            now += DT;
            orchestrator.frame(&idle, now, DT);
        }
        now
    }

    fn pause() -> InputSnapshot {
        InputSnapshot {
            pause_pressed: true,
            ..Default::default()
        }
    }

    #[test]
    fn camera_follows_player_body() {
        let mut orchestrator = orchestrator();
        settle(&mut orchestrator, 30);
        let body = orchestrator
            .physics()
            .body_position(orchestrator.player)
            .expect("player");
        let eye = orchestrator.camera().position();
        assert!((eye - (body + Vec3::Y * 0.3)).length() < 1e-5);
    }

    #[test]
    fn physics_step_is_capped() {
        let mut orchestrator = orchestrator();
        let idle = InputSnapshot::default();
        let report = orchestrator.frame(&idle, 0.5, 0.5);
        assert_eq!(report.physics_step, 1.0 / 60.0);
        let report = orchestrator.frame(&idle, 0.505, 0.005);
        assert_eq!(report.physics_step, 0.005);
    }

    #[test]
    fn movement_replaces_horizontal_velocity() {
        let mut orchestrator = orchestrator();
        let now = settle(&mut orchestrator, 40);
        let forward = InputSnapshot {
            forward: true,
            ..Default::default()
        };
        orchestrator.frame(&forward, now + DT, DT);

        let velocity = orchestrator.player_velocity();
        let horizontal = Vec3::new(velocity.x, 0.0, velocity.z);
        let look = orchestrator.camera().forward();
        let expected = Vec3::new(look.x, 0.0, look.z).normalize();
        assert!(horizontal.length() > 3.0, "speed {}", horizontal.length());
        assert!(horizontal.normalize().dot(expected) > 0.95);
    }

    #[test]
    fn paused_frames_freeze_gameplay() {
        let mut orchestrator = orchestrator();
        let mut now = settle(&mut orchestrator, 10);
        now += DT;
        assert!(orchestrator.frame(&pause(), now, DT).paused);

        let velocity = orchestrator.player_velocity();
        let lights = orchestrator.lights().clone();
        let phase = orchestrator.flicker().phase().clone();
        let yaw = orchestrator.camera().yaw();

        let busy = InputSnapshot {
            forward: true,
            left: true,
            jump_pressed: true,
            fire_held: true,
            mouse_delta: Vec2::new(40.0, -25.0),
            ..Default::default()
        };
        for _ in 0..30 {
            now += DT;
            let report = orchestrator.frame(&busy, now, DT);
            assert!(!report.fired);
            assert_eq!(report.physics_step, 0.0);
            assert_eq!(report.flicker_substeps, 0);
        }

        assert!(orchestrator.projectiles().live().is_empty());
        assert_eq!(orchestrator.player_velocity(), velocity);
        assert_eq!(orchestrator.lights(), &lights);
        assert_eq!(orchestrator.flicker().phase(), &phase);
        assert_eq!(orchestrator.camera().yaw(), yaw);
        assert!(orchestrator.frame_state(now).flags.paused);

        now += DT;
        assert!(!orchestrator.frame(&pause(), now, DT).paused);
        assert!(!orchestrator.frame_state(now).flags.paused);
    }

    #[test]
    fn held_fire_is_rate_limited() {
        let mut orchestrator = orchestrator();
        let firing = InputSnapshot {
            fire_held: true,
            ..Default::default()
        };
        let mut shots = 0;
        for frame in 0..25 {
            let now = frame as f32 * 0.02;
            if orchestrator.frame(&firing, now, 0.02).fired {
                shots += 1;
            }
        }
        // 0.5s of held fire with a 0.1s cooldown.
        assert!((4..=5).contains(&shots), "{shots} shots");
    }

    #[test]
    fn shot_at_floor_leaves_one_decal() {
        let mut orchestrator = orchestrator();
        let mut now = settle(&mut orchestrator, 30);
        orchestrator
            .camera_mut()
            .set_yaw_pitch(0.0, -std::f32::consts::FRAC_PI_2);
        let eye = orchestrator.camera().position();

        let firing = InputSnapshot {
            fire_held: true,
            ..Default::default()
        };
        now += DT;
        assert!(orchestrator.frame(&firing, now, DT).fired);

        let idle = InputSnapshot::default();
        for _ in 0..60 {
            now += DT;
            orchestrator.frame(&idle, now, DT);
            if orchestrator.projectiles().live().is_empty() {
                break;
            }
        }

        assert!(orchestrator.projectiles().live().is_empty());
        let decals = orchestrator.projectiles().decals();
        assert_eq!(decals.len(), 1);
        let expected = Vec3::new(eye.x, -0.75 + 0.06, eye.z);
        assert!(
            (decals[0].position - expected).length() < 0.1,
            "decal at {}",
            decals[0].position
        );
        // Environment and player bodies remain.
        assert_eq!(orchestrator.physics().body_count(), 2);
        assert_eq!(orchestrator.frame_state(now).decals.len(), 1);
    }

    #[test]
    fn warm_up_lights_the_room() {
        let mut orchestrator = orchestrator();
        let idle = InputSnapshot::default();
        let mut now = 0.0;
        while orchestrator.flicker().is_warming_up() {
            assert!(now < 7.0, "warm-up never finished");
            now += 0.05;
            orchestrator.frame(&idle, now, 0.05);
        }
        assert!(orchestrator
            .lights()
            .lights
            .iter()
            .all(|l| l.intensity == STEADY_LIGHT));
    }

    #[test]
    fn debug_light_cycles_while_paused() {
        let mut orchestrator = orchestrator();
        orchestrator.frame(&pause(), 0.0, DT);
        let cycle = InputSnapshot {
            cycle_debug_light: true,
            toggle_wireframe: true,
            toggle_bloom: true,
            ..Default::default()
        };
        orchestrator.frame(&cycle, DT, DT);
        orchestrator.frame(&cycle, 2.0 * DT, DT);
        let state = orchestrator.frame_state(0.0);
        assert_eq!(state.debug_light, Some(1));
        assert!(!state.flags.wireframe);
        assert!(state.flags.bloom);
    }

    #[test]
    fn debug_light_wraps_to_off() {
        let mut orchestrator = orchestrator();
        let cycle = InputSnapshot {
            cycle_debug_light: true,
            ..Default::default()
        };
        for _ in 0..orchestrator.lights().len() {
            orchestrator.frame(&cycle, 0.0, 0.0);
        }
        assert_eq!(orchestrator.frame_state(0.0).debug_light, Some(24));
        orchestrator.frame(&cycle, 0.0, 0.0);
        assert_eq!(orchestrator.frame_state(0.0).debug_light, None);
    }

    #[test]
    fn toggles_flip_render_flags() {
        let mut orchestrator = orchestrator();
        let toggles = InputSnapshot {
            toggle_wireframe: true,
            toggle_bloom: true,
            toggle_bloom_view: true,
            ..Default::default()
        };
        orchestrator.frame(&toggles, 0.0, 0.0);
        let flags = orchestrator.frame_state(0.0).flags;
        assert!(flags.wireframe && !flags.bloom && flags.show_bloom_buffer);

        orchestrator.set_wireframe_supported(false);
        orchestrator.frame(&toggles, 0.0, 0.0);
        assert!(!orchestrator.frame_state(0.0).flags.wireframe);
    }
}
