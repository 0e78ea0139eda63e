//! Rigid-body simulation for the scene, built on Rapier3D.

pub mod body;
pub mod collision;
pub mod contact;
pub mod physics_world;

pub use body::*;
pub use collision::*;
pub use contact::*;
pub use physics_world::*;

// Re-export Rapier for downstream crates
pub use rapier3d;

// Re-export common Rapier types
pub use rapier3d::prelude::{RigidBody, RigidBodyHandle};
