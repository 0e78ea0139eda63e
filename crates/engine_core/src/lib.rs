//! Core engine types shared by the physics, renderer and game crates:
//! - Frame clock with a capped simulation step
//! - Transform for placing meshes
//! - Light data model (point lights, global ambient, the per-frame light rig)

pub mod lighting;
pub mod time;
pub mod transform;

pub use lighting::*;
pub use time::*;
pub use transform::*;

// Re-export commonly used types
pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
