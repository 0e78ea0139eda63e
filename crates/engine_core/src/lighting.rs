//! Light data model: fixed-position point lights with mutable intensities and one global ambient term.

use glam::Vec3;

/// Number of ceiling point lights in the scene.
pub const LIGHT_COUNT: usize = 25;

/// Ambient/diffuse/specular intensity triple. Each term is a grey level applied to all RGB channels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intensity {
    pub ambient: f32,
    pub diffuse: f32,
    pub specular: f32,
}

impl Intensity {
    pub const fn new(ambient: f32, diffuse: f32, specular: f32) -> Self {
        Self {
            ambient,
            diffuse,
            specular,
        }
    }
}

/// Distance attenuation `1 / (constant + linear·d + quadratic·d²)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl Default for Attenuation {
    fn default() -> Self {
        Self {
            constant: 1.0,
            linear: 0.09,
            quadratic: 0.032,
        }
    }
}

/// A point light. The position is fixed at construction; intensities are rewritten every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    position: Vec3,
    pub attenuation: Attenuation,
    pub intensity: Intensity,
}

impl PointLight {
    pub fn new(position: Vec3, intensity: Intensity) -> Self {
        Self {
            position,
            attenuation: Attenuation::default(),
            intensity,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }
}

/// Global ambient light.
pub type AmbientLight = Intensity;

/// All lighting state consumed by the scene pass.
#[derive(Debug, Clone, PartialEq)]
pub struct LightRig {
    pub ambient: AmbientLight,
    pub lights: Vec<PointLight>,
    /// Emissive multiplier for the ceiling light panels.
    pub ceiling_flicker: f32,
}

impl LightRig {
    /// Build a rig with every light at `initial` intensity.
    pub fn new(positions: &[Vec3], ambient: AmbientLight, initial: Intensity) -> Self {
        Self {
            ambient,
            lights: positions
                .iter()
                .map(|&p| PointLight::new(p, initial))
                .collect(),
            ceiling_flicker: 1.0,
        }
    }

    pub fn len(&self) -> usize {
        self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }
}
