//! Vertex types and layouts for rendering.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

/// Standard vertex with position, normal and UV coordinates.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
}

impl Vertex {
    pub fn new(position: [f32; 3], normal: [f32; 3], tex_coords: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            tex_coords,
        }
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                // Position
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                // Normal
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
                // UV/Tex coords
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 6]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

/// How the scene shader treats an instance. Stored in `InstanceData::material[0]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialKind {
    /// Lit by the ambient term and all point lights.
    Lit = 0,
    /// Ceiling light panel: emissive, scaled by the ceiling flicker.
    Emissive = 1,
    /// Lit and alpha-tested against the bound texture.
    Decal = 2,
}

/// Instance data for instanced rendering.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct InstanceData {
    /// Model matrix (4x4)
    pub model: [[f32; 4]; 4],
    /// Color tint
    pub color: [f32; 4],
    /// x = [`MaterialKind`], y = light index for emissive panels (-1 otherwise)
    pub material: [f32; 4],
}

impl InstanceData {
    pub fn new(model: Mat4, color: [f32; 4], kind: MaterialKind) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            color,
            material: [kind as u32 as f32, -1.0, 0.0, 0.0],
        }
    }

    /// Emissive panel belonging to ceiling light `light`.
    pub fn light_panel(model: Mat4, color: [f32; 4], light: usize) -> Self {
        let mut instance = Self::new(model, color, MaterialKind::Emissive);
        instance.material[1] = light as f32;
        instance
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 6] = wgpu::vertex_attr_array![
            // Model matrix columns
            3 => Float32x4,
            4 => Float32x4,
            5 => Float32x4,
            6 => Float32x4,
            // Color
            7 => Float32x4,
            // Material
            8 => Float32x4,
        ];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<InstanceData>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &ATTRIBUTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gpu_sizes_match_layouts() {
        assert_eq!(std::mem::size_of::<Vertex>(), 32);
        assert_eq!(std::mem::size_of::<InstanceData>(), 96);
        assert_eq!(InstanceData::layout().attributes.len(), 6);
    }

    #[test]
    fn light_panel_records_index() {
        let panel = InstanceData::light_panel(Mat4::IDENTITY, [1.0; 4], 7);
        assert_eq!(panel.material[0], MaterialKind::Emissive as u32 as f32);
        assert_eq!(panel.material[1], 7.0);
    }
}
