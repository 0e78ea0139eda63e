//! Mesh data structures, primitive generation and glTF import.

use crate::vertex::Vertex;
use glam::{Mat3, Mat4, Vec3};
use std::path::Path;
use thiserror::Error;
use wgpu::util::DeviceExt;

/// A GPU mesh with vertex and index buffers.
pub struct Mesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_indices: u32,
}

impl Mesh {
    /// Create a mesh from vertex and index data.
    pub fn new(device: &wgpu::Device, vertices: &[Vertex], indices: &[u32]) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Vertex Buffer"),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Index Buffer"),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vertex_buffer,
            index_buffer,
            num_indices: indices.len() as u32,
        }
    }
}

/// Failures while importing mesh files.
#[derive(Debug, Error)]
pub enum MeshError {
    #[error("failed to import glTF: {0}")]
    Import(#[from] gltf::Error),
    #[error("glTF file contains no scene")]
    NoScene,
    #[error("glTF scene contains no triangle geometry")]
    NoGeometry,
}

/// Mesh data before GPU upload (for procedural generation and physics).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upload(&self, device: &wgpu::Device) -> Mesh {
        Mesh::new(device, &self.vertices, &self.indices)
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Vertex positions, for building a collision mesh.
    pub fn positions(&self) -> Vec<Vec3> {
        self.vertices.iter().map(|v| Vec3::from(v.position)).collect()
    }

    /// Index triples, for building a collision mesh.
    pub fn triangles(&self) -> Vec<[u32; 3]> {
        self.indices
            .chunks_exact(3)
            .map(|t| [t[0], t[1], t[2]])
            .collect()
    }

    /// Append another mesh, re-basing its indices.
    pub fn append(&mut self, other: &MeshData) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(other.indices.iter().map(|i| i + base));
    }

    /// Append an axis-aligned box spanning `min..max`, normals facing outwards.
    /// UVs are in world units so textures tile evenly across large surfaces.
    pub fn push_cuboid(&mut self, min: Vec3, max: Vec3) {
        let faces: [(Vec3, Vec3, Vec3); 6] = [
            // normal, u axis, v axis
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
            (Vec3::Y, Vec3::X, Vec3::NEG_Z),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::X, Vec3::NEG_Z, Vec3::Y),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        ];
        let center = (min + max) * 0.5;
        let half = (max - min) * 0.5;

        for (normal, u, v) in faces {
            let base = self.vertices.len() as u32;
            let face_center = center + normal * half;
            let hu = (u * half).abs().max_element();
            let hv = (v * half).abs().max_element();
            for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                let p = face_center + u * hu * su + v * hv * sv;
                let uv = [p.dot(u), -p.dot(v)];
                self.vertices.push(Vertex::new(p.into(), normal.into(), uv));
            }
            self.indices
                .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
        }
    }

    /// Unit box centred at the origin.
    pub fn cube() -> Self {
        let mut data = Self::new();
        data.push_cuboid(Vec3::splat(-0.5), Vec3::splat(0.5));
        data
    }

    /// Square in the XY plane facing +Z, `size` across.
    pub fn quad(size: f32) -> Self {
        let half = size / 2.0;
        let vertices = vec![
            Vertex::new([-half, -half, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0]),
            Vertex::new([half, -half, 0.0], [0.0, 0.0, 1.0], [1.0, 1.0]),
            Vertex::new([half, half, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0]),
            Vertex::new([-half, half, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0]),
        ];
        Self {
            vertices,
            indices: vec![0, 1, 2, 2, 3, 0],
        }
    }

    /// UV sphere.
    pub fn sphere(radius: f32, segments: u32, rings: u32) -> Self {
        let segments = segments.max(3);
        let rings = rings.max(2);
        let mut vertices = Vec::new();
        let mut indices = Vec::new();

        for ring in 0..=rings {
            let phi = std::f32::consts::PI * ring as f32 / rings as f32;
            let y = radius * phi.cos();
            let ring_radius = radius * phi.sin();

            for segment in 0..=segments {
                let theta = 2.0 * std::f32::consts::PI * segment as f32 / segments as f32;
                let x = ring_radius * theta.cos();
                let z = ring_radius * theta.sin();

                let normal = Vec3::new(x, y, z).normalize_or_zero();
                let uv = [
                    segment as f32 / segments as f32,
                    ring as f32 / rings as f32,
                ];
                vertices.push(Vertex::new([x, y, z], normal.into(), uv));
            }
        }

        for ring in 0..rings {
            for segment in 0..segments {
                let current = ring * (segments + 1) + segment;
                let next = current + segments + 1;

                indices.extend_from_slice(&[current, next, current + 1]);
                indices.extend_from_slice(&[current + 1, next, next + 1]);
            }
        }

        Self { vertices, indices }
    }

    /// Load every triangle primitive of the default scene, with node transforms baked in.
    pub fn from_gltf(path: impl AsRef<Path>) -> Result<Self, MeshError> {
        let (document, buffers, _images) = gltf::import(path.as_ref())?;
        let scene = document
            .default_scene()
            .or_else(|| document.scenes().next())
            .ok_or(MeshError::NoScene)?;

        let mut data = Self::new();
        for node in scene.nodes() {
            data.append_gltf_node(&node, Mat4::IDENTITY, &buffers);
        }
        if data.is_empty() {
            return Err(MeshError::NoGeometry);
        }
        log::debug!(
            "loaded {} triangles from {}",
            data.triangle_count(),
            path.as_ref().display()
        );
        Ok(data)
    }

    fn append_gltf_node(&mut self, node: &gltf::Node, parent: Mat4, buffers: &[gltf::buffer::Data]) {
        let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());
        let normal_matrix = Mat3::from_mat4(world).inverse().transpose();

        if let Some(mesh) = node.mesh() {
            for primitive in mesh.primitives() {
                if primitive.mode() != gltf::mesh::Mode::Triangles {
                    continue;
                }
                let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|d| &d.0[..]));
                let Some(positions) = reader.read_positions() else {
                    continue;
                };
                let positions: Vec<[f32; 3]> = positions.collect();
                let normals: Vec<[f32; 3]> = reader
                    .read_normals()
                    .map(|n| n.collect())
                    .unwrap_or_else(|| vec![[0.0, 1.0, 0.0]; positions.len()]);
                let uvs: Vec<[f32; 2]> = reader
                    .read_tex_coords(0)
                    .map(|t| t.into_f32().collect())
                    .unwrap_or_else(|| vec![[0.0, 0.0]; positions.len()]);
                let indices: Vec<u32> = reader
                    .read_indices()
                    .map(|i| i.into_u32().collect())
                    .unwrap_or_else(|| (0..positions.len() as u32).collect());

                let base = self.vertices.len() as u32;
                for (i, p) in positions.iter().enumerate() {
                    let position = world.transform_point3(Vec3::from(*p));
                    let normal = (normal_matrix * Vec3::from(normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0])))
                        .normalize_or_zero();
                    let uv = uvs.get(i).copied().unwrap_or([0.0, 0.0]);
                    self.vertices.push(Vertex::new(position.into(), normal.into(), uv));
                }
                for tri in indices.chunks_exact(3) {
                    if tri.iter().all(|&i| (i as usize) < positions.len()) {
                        self.indices.extend(tri.iter().map(|i| i + base));
                    }
                }
            }
        }

        for child in node.children() {
            self.append_gltf_node(&child, world, buffers);
        }
    }
}
