//! Physics world management with Rapier3D.

use crate::body::{BodyDesc, BodyShape, PhysicsError};
use engine_core::{capped_step, Transform, Vec3, DEFAULT_MAX_STEP};
use std::num::NonZeroUsize;
use rapier3d::prelude::*;

/// Default number of constraint-solver iterations per step.
pub const DEFAULT_SOLVER_ITERATIONS: usize = 10;

pub(crate) fn to_vector(v: Vec3) -> Vector<Real> {
    vector![v.x, v.y, v.z]
}

pub(crate) fn from_vector(v: &Vector<Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

/// Main physics world containing all simulation state.
///
/// Every rigid body lives in `rigid_body_set`; callers only hold handles.
pub struct PhysicsWorld {
    pub rigid_body_set: RigidBodySet,
    pub collider_set: ColliderSet,
    pub gravity: Vector<Real>,
    pub integration_parameters: IntegrationParameters,
    pub physics_pipeline: PhysicsPipeline,
    pub island_manager: IslandManager,
    pub broad_phase: DefaultBroadPhase,
    pub narrow_phase: NarrowPhase,
    pub impulse_joint_set: ImpulseJointSet,
    pub multibody_joint_set: MultibodyJointSet,
    pub ccd_solver: CCDSolver,
    /// Upper bound on the dt handed to a single step.
    max_step: f32,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(
            Vec3::new(0.0, -9.81, 0.0),
            DEFAULT_MAX_STEP,
            DEFAULT_SOLVER_ITERATIONS,
        )
    }
}

impl PhysicsWorld {
    /// Create a physics world. Steps are clamped to `max_step` seconds and solved
    /// with `solver_iterations` constraint iterations.
    pub fn new(gravity: Vec3, max_step: f32, solver_iterations: usize) -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.num_solver_iterations =
            NonZeroUsize::new(solver_iterations).unwrap_or(NonZeroUsize::MIN);

        Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            gravity: to_vector(gravity),
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            max_step: max_step.max(f32::EPSILON),
        }
    }

    pub fn max_step(&self) -> f32 {
        self.max_step
    }

    /// Advance the simulation by `dt`, clamped to the maximum step.
    /// Returns the step actually simulated (zero when nothing ran).
    pub fn step(&mut self, dt: f32) -> f32 {
        let step = capped_step(dt, self.max_step);
        if step <= 0.0 {
            return 0.0;
        }
        self.integration_parameters.dt = step;
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );
        step
    }

    /// Create a rigid body with a single collider and return its handle.
    pub fn create_body(&mut self, desc: &BodyDesc) -> Result<RigidBodyHandle, PhysicsError> {
        desc.shape.validate()?;
        if matches!(desc.shape, BodyShape::Mesh { .. }) && !desc.is_static() {
            return Err(PhysicsError::DynamicMesh(desc.mass));
        }

        let builder = if desc.is_static() {
            RigidBodyBuilder::fixed()
        } else {
            RigidBodyBuilder::dynamic()
                .linvel(to_vector(desc.linear_velocity))
                .ccd_enabled(desc.ccd)
        };
        let mut builder = builder.translation(to_vector(desc.position));
        if desc.upright {
            builder = builder.enabled_rotations(false, true, false);
        }
        let handle = self.rigid_body_set.insert(builder.build());

        let collider = match &desc.shape {
            BodyShape::Box { half_extents } => {
                ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            }
            BodyShape::Sphere { radius } => ColliderBuilder::ball(*radius),
            BodyShape::Mesh {
                vertices,
                triangles,
            } => {
                let points = vertices.iter().map(|v| point![v.x, v.y, v.z]).collect();
                ColliderBuilder::trimesh(points, triangles.clone())
            }
        };
        let mut collider = collider
            .friction(desc.friction)
            .restitution(desc.restitution)
            .collision_groups(desc.group.interaction_groups());
        if !desc.is_static() {
            collider = collider.mass(desc.mass);
        }
        self.collider_set
            .insert_with_parent(collider.build(), handle, &mut self.rigid_body_set);

        log::debug!("created {:?} body {:?} at {}", desc.group, handle, desc.position);
        Ok(handle)
    }

    /// Detach a body and its colliders from the world.
    ///
    /// The removed body is handed back to the caller; dropping it frees it.
    pub fn remove_body(&mut self, handle: RigidBodyHandle) -> Option<RigidBody> {
        self.rigid_body_set.remove(
            handle,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true,
        )
    }

    /// Whether `handle` still refers to a live body.
    pub fn contains(&self, handle: RigidBodyHandle) -> bool {
        self.rigid_body_set.contains(handle)
    }

    pub fn body_count(&self) -> usize {
        self.rigid_body_set.len()
    }

    /// Centre-of-mass position of a body.
    pub fn body_position(&self, handle: RigidBodyHandle) -> Option<Vec3> {
        self.rigid_body_set.get(handle).map(|body| {
            let c = body.center_of_mass();
            Vec3::new(c.x, c.y, c.z)
        })
    }

    /// Get the transform of a rigid body.
    pub fn get_body_transform(&self, handle: RigidBodyHandle) -> Option<Transform> {
        self.rigid_body_set.get(handle).map(|body| {
            let pos = body.translation();
            let rot = body.rotation();
            Transform {
                position: Vec3::new(pos.x, pos.y, pos.z),
                rotation: glam::Quat::from_xyzw(rot.i, rot.j, rot.k, rot.w),
                scale: Vec3::ONE,
            }
        })
    }

    pub fn linear_velocity(&self, handle: RigidBodyHandle) -> Option<Vec3> {
        self.rigid_body_set
            .get(handle)
            .map(|body| from_vector(body.linvel()))
    }

    /// Overwrite a body's linear velocity and wake it up.
    pub fn set_linear_velocity(&mut self, handle: RigidBodyHandle, velocity: Vec3) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            body.set_linvel(to_vector(velocity), true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CollisionGroup;

    fn ground(world: &mut PhysicsWorld) -> RigidBodyHandle {
        let desc = BodyDesc::new(
            BodyShape::Box {
                half_extents: Vec3::new(10.0, 0.5, 10.0),
            },
            Vec3::new(0.0, -0.5, 0.0),
            0.0,
        );
        world.create_body(&desc).expect("ground")
    }

    #[test]
    fn step_is_capped() {
        let mut world = PhysicsWorld::default();
        assert!((world.step(0.5) - world.max_step()).abs() < 1e-6);
        assert!((world.step(0.004) - 0.004).abs() < 1e-6);
        assert_eq!(world.step(0.0), 0.0);
    }

    #[test]
    fn dynamic_body_falls_and_rests_on_ground() {
        let mut world = PhysicsWorld::default();
        ground(&mut world);
        let ball = world
            .create_body(
                &BodyDesc::new(BodyShape::Sphere { radius: 0.25 }, Vec3::new(0.0, 2.0, 0.0), 1.0)
                    .with_group(CollisionGroup::Projectile),
            )
            .expect("ball");
        for _ in 0..240 {
            world.step(1.0 / 60.0);
        }
        let y = world.body_position(ball).expect("ball alive").y;
        assert!((y - 0.25).abs() < 0.05, "ball rests on ground, y = {y}");
    }

    #[test]
    fn removed_body_is_gone() {
        let mut world = PhysicsWorld::default();
        let handle = ground(&mut world);
        assert_eq!(world.body_count(), 1);
        let removed = world.remove_body(handle);
        assert!(removed.is_some());
        assert!(!world.contains(handle));
        assert!(world.remove_body(handle).is_none());
    }

    #[test]
    fn dynamic_mesh_is_rejected() {
        let mut world = PhysicsWorld::default();
        let desc = BodyDesc::new(
            BodyShape::Mesh {
                vertices: vec![Vec3::ZERO, Vec3::X, Vec3::Y],
                triangles: vec![[0, 1, 2]],
            },
            Vec3::ZERO,
            1.0,
        );
        assert_eq!(world.create_body(&desc), Err(PhysicsError::DynamicMesh(1.0)));
    }

    #[test]
    fn set_velocity_round_trips() {
        let mut world = PhysicsWorld::new(Vec3::ZERO, DEFAULT_MAX_STEP, 4);
        let body = world
            .create_body(&BodyDesc::new(
                BodyShape::Box {
                    half_extents: Vec3::splat(0.5),
                },
                Vec3::ZERO,
                1.0,
            ))
            .expect("box");
        world.set_linear_velocity(body, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(world.linear_velocity(body), Some(Vec3::new(1.0, 2.0, 3.0)));
    }
}
