//! Discrete contact queries between two bodies.

use crate::physics_world::from_vector;
use crate::PhysicsWorld;
use engine_core::Vec3;
use rapier3d::parry::query;
use rapier3d::prelude::*;

/// A contact reported on the second body of a [`PhysicsWorld::contact_test`] query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactPoint {
    /// World-space point on the surface of the second body.
    pub point: Vec3,
    /// World-space normal of the second body's surface, pointing towards the first body.
    pub normal: Vec3,
    /// Signed separation. Negative when the shapes overlap.
    pub distance: f32,
}

impl PhysicsWorld {
    /// Test whether bodies `a` and `b` are touching (or closer than `margin`).
    ///
    /// Reads the current collider poses only; simulation state is not modified.
    /// Returns the first contact found. Missing bodies and shape pairs the
    /// narrow phase cannot handle count as "no contact".
    pub fn contact_test(
        &self,
        a: RigidBodyHandle,
        b: RigidBodyHandle,
        margin: f32,
    ) -> Option<ContactPoint> {
        let body_a = self.rigid_body_set.get(a)?;
        let body_b = self.rigid_body_set.get(b)?;

        for collider_a in body_a.colliders().iter().filter_map(|&h| self.collider_set.get(h)) {
            for collider_b in body_b.colliders().iter().filter_map(|&h| self.collider_set.get(h)) {
                match query::contact(
                    collider_a.position(),
                    collider_a.shape(),
                    collider_b.position(),
                    collider_b.shape(),
                    margin,
                ) {
                    Ok(Some(contact)) => {
                        return Some(ContactPoint {
                            point: Vec3::new(contact.point2.x, contact.point2.y, contact.point2.z),
                            normal: from_vector(&contact.normal2),
                            distance: contact.dist,
                        });
                    }
                    Ok(None) => {}
                    Err(_) => {
                        log::debug!("unsupported contact pair between {:?} and {:?}", a, b);
                    }
                }
            }
        }
        None
    }
}
