//! Rendering system using wgpu: HDR scene pass, ping-pong bloom blur,
//! composite, crosshair overlay and the CRT/pause final pass.

pub mod camera;
pub mod frame;
pub mod mesh;
pub mod passes;
pub mod pipeline;
pub mod renderer;
pub mod targets;
pub mod texture;
pub mod vertex;

pub use camera::*;
pub use frame::*;
pub use mesh::*;
pub use passes::*;
pub use renderer::*;
pub use texture::*;
pub use vertex::*;
