//! Fired projectiles and the decals they leave behind.

use crate::config::ProjectileConfig;
use engine_core::{Quat, Transform, Vec3};
use physics::{BodyDesc, BodyShape, CollisionGroup, PhysicsError, PhysicsWorld, RigidBodyHandle};

/// Below this angle a decal keeps the quad's own orientation.
const MIN_ALIGNMENT_ANGLE: f32 = 0.001;

/// A live projectile. Its body is owned by the physics world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projectile {
    pub body: RigidBodyHandle,
    /// Frame clock time of the shot.
    pub spawned_at: f32,
}

/// Impact mark left where a projectile hit the environment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decal {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Decal {
    /// Decal facing away from the surface along `normal`, lifted off it by `offset`.
    pub fn at_contact(point: Vec3, normal: Vec3, offset: f32) -> Self {
        Self {
            position: point + normal * offset,
            rotation: surface_alignment(normal),
        }
    }
}

/// Surface normal pointing back against the impact. A normal that faces along the
/// projectile's velocity is flipped.
pub fn outward_normal(normal: Vec3, velocity: Vec3) -> Vec3 {
    if normal.dot(velocity) > 0.0 {
        -normal
    } else {
        normal
    }
}

/// Rotation taking the decal quad's +Z axis onto `normal`.
///
/// Returns the identity when the rotation is negligible or its axis degenerates
/// (parallel, zero-length or non-finite normal), so no NaN reaches the decal.
pub fn surface_alignment(normal: Vec3) -> Quat {
    let angle = Vec3::Z.dot(normal).clamp(-1.0, 1.0).acos();
    let axis = Vec3::Z.cross(normal).normalize();
    if angle.is_nan() || angle < MIN_ALIGNMENT_ANGLE || !axis.is_finite() {
        return Quat::IDENTITY;
    }
    Quat::from_axis_angle(axis, angle)
}

/// Spawns rate-limited projectiles and turns environment hits into decals.
pub struct ProjectileManager {
    config: ProjectileConfig,
    live: Vec<Projectile>,
    decals: Vec<Decal>,
    last_shot: Option<f32>,
}

impl ProjectileManager {
    pub fn new(config: &ProjectileConfig) -> Self {
        Self {
            config: config.clone(),
            live: Vec::new(),
            decals: Vec::new(),
            last_shot: None,
        }
    }

    pub fn live(&self) -> &[Projectile] {
        &self.live
    }

    pub fn decals(&self) -> &[Decal] {
        &self.decals
    }

    /// Fire from `origin` along `direction` at time `now`.
    ///
    /// Shots closer than the cooldown to the previous one are dropped and
    /// return `Ok(None)`. The first shot is always allowed.
    pub fn fire(
        &mut self,
        origin: Vec3,
        direction: Vec3,
        now: f32,
        physics: &mut PhysicsWorld,
    ) -> Result<Option<RigidBodyHandle>, PhysicsError> {
        if let Some(last) = self.last_shot {
            if now - last <= self.config.cooldown {
                return Ok(None);
            }
        }
        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO {
            return Ok(None);
        }

        let desc = BodyDesc::new(
            BodyShape::Sphere {
                radius: self.config.radius,
            },
            origin + direction * self.config.spawn_offset,
            self.config.mass,
        )
        .with_material(self.config.friction, self.config.restitution)
        .with_velocity(direction * self.config.speed)
        .with_group(CollisionGroup::Projectile)
        .with_ccd();
        let body = physics.create_body(&desc)?;

        self.last_shot = Some(now);
        self.live.push(Projectile {
            body,
            spawned_at: now,
        });
        log::trace!("Fired projectile {:?} at t={:.3}", body, now);
        Ok(Some(body))
    }

    /// Retire every projectile touching `environment`, leaving a decal for each.
    /// Returns the number of hits.
    pub fn reconcile(&mut self, physics: &mut PhysicsWorld, environment: RigidBodyHandle) -> usize {
        let margin = self.config.contact_margin;
        let offset = self.config.decal_offset;
        let decals = &mut self.decals;
        let before = self.live.len();

        self.live.retain(|projectile| {
            if !physics.contains(projectile.body) {
                log::warn!(
                    "Projectile {:?} fired at t={:.2} lost its body",
                    projectile.body,
                    projectile.spawned_at
                );
                return false;
            }
            let Some(contact) = physics.contact_test(projectile.body, environment, margin) else {
                return true;
            };
            let velocity = physics
                .linear_velocity(projectile.body)
                .unwrap_or(Vec3::ZERO);
            let normal = outward_normal(contact.normal, velocity);
            decals.push(Decal::at_contact(contact.point, normal, offset));
            drop(physics.remove_body(projectile.body));
            false
        });

        let hits = before - self.live.len();
        if hits > 0 {
            log::debug!("{} projectile hit(s), {} decals", hits, self.decals.len());
        }
        hits
    }

    /// Render transforms of the live projectiles, scaled from the unit sphere.
    pub fn projectile_transforms(&self, physics: &PhysicsWorld) -> Vec<Transform> {
        self.live
            .iter()
            .filter_map(|p| physics.get_body_transform(p.body))
            .map(|t| t.with_uniform_scale(self.config.radius))
            .collect()
    }

    /// Render transforms of every decal, scaled from the unit quad.
    pub fn decal_transforms(&self) -> Vec<Transform> {
        self.decals
            .iter()
            .map(|d| {
                Transform::from_position_rotation(d.position, d.rotation)
                    .with_uniform_scale(self.config.decal_size)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLOOR_TOP: f32 = 0.0;

    fn world_with_floor() -> (PhysicsWorld, RigidBodyHandle) {
        let mut world = PhysicsWorld::default();
        let floor = world
            .create_body(&BodyDesc::new(
                BodyShape::Box {
                    half_extents: Vec3::new(10.0, 0.5, 10.0),
                },
                Vec3::new(0.0, FLOOR_TOP - 0.5, 0.0),
                0.0,
            ))
            .expect("floor");
        (world, floor)
    }

    #[test]
    fn fire_respects_cooldown() {
        let (mut world, _) = world_with_floor();
        let mut manager = ProjectileManager::new(&ProjectileConfig::default());
        let origin = Vec3::new(0.0, 5.0, 0.0);

        assert!(manager.fire(origin, Vec3::X, 0.0, &mut world).unwrap().is_some());
        assert!(manager.fire(origin, Vec3::X, 0.05, &mut world).unwrap().is_none());
        assert!(manager.fire(origin, Vec3::X, 0.1, &mut world).unwrap().is_none());
        assert!(manager.fire(origin, Vec3::X, 0.11, &mut world).unwrap().is_some());
        assert_eq!(manager.live().len(), 2);
        assert_eq!(world.body_count(), 3);
    }

    #[test]
    fn spawns_ahead_of_origin_with_muzzle_velocity() {
        let (mut world, _) = world_with_floor();
        let config = ProjectileConfig::default();
        let mut manager = ProjectileManager::new(&config);
        let body = manager
            .fire(Vec3::new(0.0, 5.0, 0.0), Vec3::new(0.0, 0.0, -2.0), 1.0, &mut world)
            .unwrap()
            .expect("first shot");

        let position = world.body_position(body).expect("body");
        assert!((position - Vec3::new(0.0, 5.0, -config.spawn_offset)).length() < 1e-5);
        let velocity = world.linear_velocity(body).expect("body");
        assert!((velocity - Vec3::new(0.0, 0.0, -config.speed)).length() < 1e-4);
        assert_eq!(manager.live()[0].spawned_at, 1.0);
    }

    #[test]
    fn normal_along_velocity_is_flipped() {
        let velocity = Vec3::new(0.0, -20.0, 0.0);
        assert_eq!(outward_normal(Vec3::NEG_Y, velocity), Vec3::Y);
        assert_eq!(outward_normal(Vec3::Y, velocity), Vec3::Y);
        // Grazing contacts keep their normal.
        assert_eq!(outward_normal(Vec3::X, velocity), Vec3::X);
    }

    #[test]
    fn alignment_turns_quad_onto_normal() {
        let rotation = surface_alignment(Vec3::Y);
        assert!((rotation * Vec3::Z - Vec3::Y).length() < 1e-5);
        let rotation = surface_alignment(Vec3::NEG_X);
        assert!((rotation * Vec3::Z - Vec3::NEG_X).length() < 1e-5);
    }

    #[test]
    fn degenerate_alignment_is_identity() {
        for normal in [
            Vec3::Z,
            Vec3::new(0.0, 0.0, 1.0 + 1e-7),
            Vec3::NEG_Z,
            Vec3::ZERO,
            Vec3::new(f32::NAN, 0.0, 1.0),
        ] {
            let rotation = surface_alignment(normal);
            assert_eq!(rotation, Quat::IDENTITY, "normal {normal}");
            assert!(rotation.is_finite());
        }
        let decal = Decal::at_contact(Vec3::ONE, Vec3::ZERO, 0.06);
        assert!(decal.position.is_finite());
    }

    #[test]
    fn projectile_without_contact_survives() {
        let (mut world, floor) = world_with_floor();
        let mut manager = ProjectileManager::new(&ProjectileConfig::default());
        manager
            .fire(Vec3::new(0.0, 5.0, 0.0), Vec3::X, 0.0, &mut world)
            .unwrap();
        let before = manager.live().to_vec();

        assert_eq!(manager.reconcile(&mut world, floor), 0);
        assert_eq!(manager.live(), before.as_slice());
        assert!(manager.decals().is_empty());
        assert!(world.contains(before[0].body));
    }

    #[test]
    fn hit_leaves_one_decal_and_frees_the_body() {
        let (mut world, floor) = world_with_floor();
        let config = ProjectileConfig::default();
        let mut manager = ProjectileManager::new(&config);
        let body = manager
            .fire(Vec3::new(1.0, 2.0, -1.0), Vec3::NEG_Y, 0.0, &mut world)
            .unwrap()
            .expect("shot");

        for _ in 0..120 {
            world.step(1.0 / 60.0);
            if manager.reconcile(&mut world, floor) > 0 {
                break;
            }
        }

        assert!(manager.live().is_empty());
        assert!(!world.contains(body));
        assert_eq!(world.body_count(), 1);
        assert_eq!(manager.decals().len(), 1);

        let decal = manager.decals()[0];
        assert!((decal.position.x - 1.0).abs() < 0.05);
        assert!((decal.position.z + 1.0).abs() < 0.05);
        assert!((decal.position.y - (FLOOR_TOP + config.decal_offset)).abs() < 0.05);
        assert!((decal.rotation * Vec3::Z - Vec3::Y).length() < 1e-3);
    }

    #[test]
    fn only_touching_projectiles_are_retired() {
        let (mut world, floor) = world_with_floor();
        let mut manager = ProjectileManager::new(&ProjectileConfig::default());
        let hitting = manager
            .fire(Vec3::new(1.0, 2.0, -1.0), Vec3::NEG_Y, 0.0, &mut world)
            .unwrap()
            .expect("first shot");
        manager
            .fire(Vec3::new(-5.0, 40.0, 5.0), Vec3::Y, 1.0, &mut world)
            .unwrap()
            .expect("second shot");
        let survivor = manager.live()[1];

        let mut hits = 0;
        for _ in 0..120 {
            world.step(1.0 / 60.0);
            hits = manager.reconcile(&mut world, floor);
            if hits > 0 {
                break;
            }
        }

        assert_eq!(hits, 1);
        assert_eq!(manager.live(), &[survivor]);
        assert_eq!(manager.decals().len(), 1);
        assert!(!world.contains(hitting));
        assert!(world.contains(survivor.body));
        assert_eq!(world.body_count(), 2);
    }

    #[test]
    fn decals_are_sized_for_rendering() {
        let config = ProjectileConfig::default();
        let mut manager = ProjectileManager::new(&config);
        manager.decals.push(Decal::at_contact(Vec3::ZERO, Vec3::Y, 0.1));
        let transforms = manager.decal_transforms();
        assert_eq!(transforms.len(), 1);
        assert_eq!(transforms[0].scale, Vec3::splat(config.decal_size));
        assert_eq!(transforms[0].position, Vec3::new(0.0, 0.1, 0.0));
    }
}
