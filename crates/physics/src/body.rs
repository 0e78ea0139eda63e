//! Body descriptors accepted by [`PhysicsWorld::create_body`](crate::PhysicsWorld::create_body).

use crate::collision::CollisionGroup;
use glam::Vec3;
use thiserror::Error;

/// Collision shape of a body.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyShape {
    /// Axis-aligned box given by its half extents.
    Box { half_extents: Vec3 },
    /// Sphere of the given radius.
    Sphere { radius: f32 },
    /// Triangle soup. Only valid for static (mass 0) bodies.
    Mesh {
        vertices: Vec<Vec3>,
        triangles: Vec<[u32; 3]>,
    },
}

/// Everything needed to create one rigid body with one collider.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyDesc {
    pub shape: BodyShape,
    pub position: Vec3,
    /// Mass in kilograms. Zero makes the body static.
    pub mass: f32,
    pub friction: f32,
    pub restitution: f32,
    pub linear_velocity: Vec3,
    pub group: CollisionGroup,
    /// Continuous collision detection for fast movers.
    pub ccd: bool,
    /// Rotation only around the vertical axis (upright characters).
    pub upright: bool,
}

impl BodyDesc {
    pub fn new(shape: BodyShape, position: Vec3, mass: f32) -> Self {
        Self {
            shape,
            position,
            mass,
            friction: 0.5,
            restitution: 0.0,
            linear_velocity: Vec3::ZERO,
            group: CollisionGroup::Environment,
            ccd: false,
            upright: false,
        }
    }

    pub fn with_material(mut self, friction: f32, restitution: f32) -> Self {
        self.friction = friction;
        self.restitution = restitution;
        self
    }

    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.linear_velocity = velocity;
        self
    }

    pub fn with_group(mut self, group: CollisionGroup) -> Self {
        self.group = group;
        self
    }

    pub fn with_ccd(mut self) -> Self {
        self.ccd = true;
        self
    }

    pub fn upright(mut self) -> Self {
        self.upright = true;
        self
    }

    pub fn is_static(&self) -> bool {
        self.mass <= 0.0
    }
}

/// Rejected body descriptors.
#[derive(Debug, Error, PartialEq)]
pub enum PhysicsError {
    #[error("triangle mesh body has no triangles")]
    EmptyMesh,
    #[error("triangle {triangle} references vertex {index} but the mesh has {vertex_count} vertices")]
    MeshIndexOutOfRange {
        triangle: usize,
        index: u32,
        vertex_count: usize,
    },
    #[error("triangle mesh bodies must be static (mass 0), got mass {0}")]
    DynamicMesh(f32),
    #[error("invalid shape dimensions: {0}")]
    InvalidDimensions(String),
}

impl BodyShape {
    /// Check dimensions and mesh topology before handing the shape to Rapier.
    pub fn validate(&self) -> Result<(), PhysicsError> {
        match self {
            Self::Box { half_extents } => {
                if !(half_extents.is_finite() && half_extents.min_element() > 0.0) {
                    return Err(PhysicsError::InvalidDimensions(format!(
                        "box half extents {half_extents}"
                    )));
                }
            }
            Self::Sphere { radius } => {
                if !(radius.is_finite() && *radius > 0.0) {
                    return Err(PhysicsError::InvalidDimensions(format!(
                        "sphere radius {radius}"
                    )));
                }
            }
            Self::Mesh {
                vertices,
                triangles,
            } => {
                if triangles.is_empty() {
                    return Err(PhysicsError::EmptyMesh);
                }
                for (i, tri) in triangles.iter().enumerate() {
                    if let Some(&bad) = tri.iter().find(|&&v| v as usize >= vertices.len()) {
                        return Err(PhysicsError::MeshIndexOutOfRange {
                            triangle: i,
                            index: bad,
                            vertex_count: vertices.len(),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_mesh_is_rejected() {
        let shape = BodyShape::Mesh {
            vertices: vec![Vec3::ZERO],
            triangles: vec![],
        };
        assert_eq!(shape.validate(), Err(PhysicsError::EmptyMesh));
    }

    #[test]
    fn out_of_range_index_is_reported() {
        let shape = BodyShape::Mesh {
            vertices: vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            triangles: vec![[0, 1, 3]],
        };
        assert!(matches!(
            shape.validate(),
            Err(PhysicsError::MeshIndexOutOfRange { index: 3, .. })
        ));
    }

    #[test]
    fn zero_radius_sphere_is_invalid() {
        assert!(BodyShape::Sphere { radius: 0.0 }.validate().is_err());
        assert!(BodyShape::Sphere { radius: 0.13 }.validate().is_ok());
    }
}
