//! Per-frame render input and the uniform blocks derived from it.

use crate::{
    camera::Camera,
    vertex::{InstanceData, MaterialKind},
};
use bytemuck::{Pod, Zeroable};
use engine_core::{LightRig, Mat4, Quat, Transform, Vec3, LIGHT_COUNT};
use std::ops::Range;

/// Everything the renderer needs to draw one frame. Built fresh by the game each frame.
#[derive(Debug, Clone)]
pub struct FrameState {
    pub camera: Camera,
    pub lights: LightRig,
    /// Live projectiles, scaled to their render size.
    pub projectiles: Vec<Transform>,
    /// Accumulated impact decals.
    pub decals: Vec<Transform>,
    pub flags: RenderFlags,
    /// Seconds since start, drives the CRT noise.
    pub time: f32,
    /// Ceiling light highlighted for debugging.
    pub debug_light: Option<usize>,
}

const ENVIRONMENT_COLOR: [f32; 4] = [0.78, 0.74, 0.58, 1.0];
const PANEL_COLOR: [f32; 4] = [3.0, 3.0, 2.8, 1.0];
const PROJECTILE_COLOR: [f32; 4] = [0.9, 0.9, 0.9, 1.0];
const DECAL_COLOR: [f32; 4] = [0.06, 0.06, 0.08, 1.0];

/// Ceiling panel drawn around each point light (unit cube scaled to this).
pub const PANEL_SIZE: Vec3 = Vec3::new(0.6, 0.03, 0.6);
/// Panels sit this far above their light so the light itself is not inside the panel.
pub const PANEL_LIFT: f32 = 0.08;

/// Every instance drawn by the scene pass, uploaded as one buffer.
/// Each range indexes into `instances` for one mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstanceBatch {
    pub instances: Vec<InstanceData>,
    pub environment: Range<u32>,
    pub panels: Range<u32>,
    pub projectiles: Range<u32>,
    pub decals: Range<u32>,
}

impl InstanceBatch {
    pub fn build(frame: &FrameState, with_environment: bool) -> Self {
        let mut instances = Vec::with_capacity(
            1 + frame.lights.len() + frame.projectiles.len() + frame.decals.len(),
        );

        let push_all = |instances: &mut Vec<InstanceData>, items: Vec<InstanceData>| {
            let start = instances.len() as u32;
            instances.extend(items);
            start..instances.len() as u32
        };

        let environment = push_all(
            &mut instances,
            with_environment
                .then(|| InstanceData::new(Mat4::IDENTITY, ENVIRONMENT_COLOR, MaterialKind::Lit))
                .into_iter()
                .collect(),
        );
        let panels = push_all(
            &mut instances,
            frame
                .lights
                .lights
                .iter()
                .enumerate()
                .map(|(i, light)| {
                    let model = Mat4::from_scale_rotation_translation(
                        PANEL_SIZE,
                        Quat::IDENTITY,
                        light.position() + Vec3::Y * PANEL_LIFT,
                    );
                    InstanceData::light_panel(model, PANEL_COLOR, i)
                })
                .collect(),
        );
        let projectiles = push_all(
            &mut instances,
            frame
                .projectiles
                .iter()
                .map(|t| InstanceData::new(t.to_matrix(), PROJECTILE_COLOR, MaterialKind::Lit))
                .collect(),
        );
        let decals = push_all(
            &mut instances,
            frame
                .decals
                .iter()
                .map(|t| InstanceData::new(t.to_matrix(), DECAL_COLOR, MaterialKind::Decal))
                .collect(),
        );

        Self {
            instances,
            environment,
            panels,
            projectiles,
            decals,
        }
    }
}

/// User-toggled render switches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderFlags {
    pub wireframe: bool,
    pub bloom: bool,
    /// Composite shows only the blurred bloom buffer.
    pub show_bloom_buffer: bool,
    pub paused: bool,
    pub exposure: f32,
}

impl Default for RenderFlags {
    fn default() -> Self {
        Self {
            wireframe: false,
            bloom: true,
            show_bloom_buffer: false,
            paused: false,
            exposure: 1.0,
        }
    }
}

/// Parameters of the final CRT-style pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrtSettings {
    pub vertical_jerk: f32,
    pub vertical_movement: f32,
    pub bottom_static: f32,
    pub scanlines: f32,
    pub rgb_offset: f32,
    pub horizontal_fuzz: f32,
    pub desaturate: f32,
    /// Opacity of the pause texture drawn over the frame.
    pub pause_overlay: f32,
}

impl CrtSettings {
    pub const IN_GAME: Self = Self {
        vertical_jerk: 0.1,
        vertical_movement: 0.0,
        bottom_static: 0.1,
        scanlines: 0.2,
        rgb_offset: 0.1,
        horizontal_fuzz: 0.3,
        desaturate: 0.0,
        pause_overlay: 0.0,
    };

    pub const PAUSED: Self = Self {
        vertical_jerk: 1.0,
        vertical_movement: 1.0,
        bottom_static: 1.0,
        scanlines: 1.0,
        rgb_offset: 1.0,
        horizontal_fuzz: 1.0,
        desaturate: 0.5,
        pause_overlay: 1.0,
    };

    pub fn for_pause(paused: bool) -> Self {
        if paused {
            Self::PAUSED
        } else {
            Self::IN_GAME
        }
    }
}

/// One point light as laid out in the scene shader (`PointLight` in scene.wgsl).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct LightUniform {
    pub position: [f32; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    /// x = constant, y = linear, z = quadratic
    pub attenuation: [f32; 4],
}

/// Scene pass uniform (must match scene.wgsl `SceneUniform`).
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct SceneUniform {
    pub view_proj: [[f32; 4]; 4],
    /// xyz = eye position, w = ceiling flicker
    pub eye: [f32; 4],
    /// Global ambient/diffuse/specular in xyz.
    pub ambient: [f32; 4],
    /// x = debug light index (-1 for none), y = active light count, z = bloom threshold
    pub params: [f32; 4],
    pub lights: [LightUniform; LIGHT_COUNT],
}

/// Luminance above which scene colour is routed to the bloom attachment.
pub const BLOOM_THRESHOLD: f32 = 1.0;

impl SceneUniform {
    pub fn from_frame(frame: &FrameState) -> Self {
        let eye = frame.camera.position();
        let ambient = frame.lights.ambient;
        let mut lights = [LightUniform::default(); LIGHT_COUNT];
        for (slot, light) in lights.iter_mut().zip(&frame.lights.lights) {
            let p = light.position();
            let i = light.intensity;
            let a = light.attenuation;
            *slot = LightUniform {
                position: [p.x, p.y, p.z, 1.0],
                ambient: [i.ambient; 4],
                diffuse: [i.diffuse; 4],
                specular: [i.specular; 4],
                attenuation: [a.constant, a.linear, a.quadratic, 0.0],
            };
        }
        let debug_light = frame
            .debug_light
            .filter(|&i| i < frame.lights.len())
            .map_or(-1.0, |i| i as f32);

        Self {
            view_proj: frame.camera.view_projection_matrix().to_cols_array_2d(),
            eye: [eye.x, eye.y, eye.z, frame.lights.ceiling_flicker],
            ambient: [ambient.ambient, ambient.diffuse, ambient.specular, 0.0],
            params: [
                debug_light,
                frame.lights.len().min(LIGHT_COUNT) as f32,
                BLOOM_THRESHOLD,
                0.0,
            ],
            lights,
        }
    }
}

/// Blur pass uniform: x = 1 for horizontal, 0 for vertical.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct BlurUniform {
    pub direction: [f32; 4],
}

impl BlurUniform {
    pub fn new(horizontal: bool) -> Self {
        Self {
            direction: [if horizontal { 1.0 } else { 0.0 }, 0.0, 0.0, 0.0],
        }
    }
}

/// Composite pass uniform (must match composite.wgsl).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct CompositeUniform {
    /// x = bloom enabled, y = exposure, z = show bloom buffer only
    pub params: [f32; 4],
}

impl CompositeUniform {
    pub fn new(flags: &RenderFlags) -> Self {
        Self {
            params: [
                flags.bloom as u32 as f32,
                flags.exposure,
                flags.show_bloom_buffer as u32 as f32,
                0.0,
            ],
        }
    }
}

/// Crosshair quad half-extent in NDC.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct OverlayUniform {
    pub half_extent: [f32; 4],
}

impl OverlayUniform {
    /// Quad showing a `sprite_w` x `sprite_h` pixel sprite at native size on a `screen_w` x `screen_h` target.
    pub fn pixel_sized(sprite_w: u32, sprite_h: u32, screen_w: u32, screen_h: u32) -> Self {
        Self {
            half_extent: [
                sprite_w as f32 / screen_w.max(1) as f32,
                sprite_h as f32 / screen_h.max(1) as f32,
                0.0,
                0.0,
            ],
        }
    }
}

/// CRT pass uniform (must match crt.wgsl).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct CrtUniform {
    /// vertical jerk, vertical movement, bottom static, scanlines
    pub distortion: [f32; 4],
    /// rgb offset, horizontal fuzz, desaturate, time
    pub color: [f32; 4],
    /// x = pause overlay opacity
    pub overlay: [f32; 4],
}

impl CrtUniform {
    pub fn new(settings: &CrtSettings, time: f32) -> Self {
        Self {
            distortion: [
                settings.vertical_jerk,
                settings.vertical_movement,
                settings.bottom_static,
                settings.scanlines,
            ],
            color: [
                settings.rgb_offset,
                settings.horizontal_fuzz,
                settings.desaturate,
                time,
            ],
            overlay: [settings.pause_overlay, 0.0, 0.0, 0.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_core::{Intensity, Vec3};

    fn frame() -> FrameState {
        let positions: Vec<Vec3> = (0..LIGHT_COUNT).map(|i| Vec3::new(i as f32, 1.25, 0.0)).collect();
        let mut lights = LightRig::new(
            &positions,
            Intensity::new(0.35, 0.25, 1.0),
            Intensity::new(0.05, 0.8, 1.0),
        );
        lights.ceiling_flicker = 0.4;
        FrameState {
            camera: Camera::new(Vec3::new(1.0, 2.0, 3.0)),
            lights,
            projectiles: Vec::new(),
            decals: Vec::new(),
            flags: RenderFlags::default(),
            time: 0.0,
            debug_light: None,
        }
    }

    #[test]
    fn uniform_sizes_follow_wgsl_layout() {
        assert_eq!(std::mem::size_of::<LightUniform>(), 80);
        assert_eq!(std::mem::size_of::<SceneUniform>(), 112 + 80 * LIGHT_COUNT);
        assert_eq!(std::mem::size_of::<CrtUniform>() % 16, 0);
    }

    #[test]
    fn scene_uniform_carries_lights_and_flicker() {
        let uniform = SceneUniform::from_frame(&frame());
        assert_eq!(uniform.eye, [1.0, 2.0, 3.0, 0.4]);
        assert_eq!(uniform.ambient[0], 0.35);
        assert_eq!(uniform.params[0], -1.0);
        assert_eq!(uniform.params[1], LIGHT_COUNT as f32);
        assert_eq!(uniform.lights[7].position, [7.0, 1.25, 0.0, 1.0]);
        assert_eq!(uniform.lights[7].diffuse, [0.8; 4]);
        assert_eq!(uniform.lights[7].attenuation, [1.0, 0.09, 0.032, 0.0]);
    }

    #[test]
    fn out_of_range_debug_light_is_ignored() {
        let mut f = frame();
        f.debug_light = Some(3);
        assert_eq!(SceneUniform::from_frame(&f).params[0], 3.0);
        f.debug_light = Some(99);
        assert_eq!(SceneUniform::from_frame(&f).params[0], -1.0);
    }

    #[test]
    fn crt_preset_follows_pause_flag() {
        assert_eq!(CrtSettings::for_pause(true), CrtSettings::PAUSED);
        assert_eq!(CrtSettings::for_pause(false), CrtSettings::IN_GAME);
        let uniform = CrtUniform::new(&CrtSettings::PAUSED, 2.5);
        assert_eq!(uniform.color, [1.0, 1.0, 0.5, 2.5]);
        assert_eq!(uniform.overlay[0], 1.0);
    }

    #[test]
    fn instance_batch_orders_meshes() {
        let mut f = frame();
        f.projectiles = vec![Transform::from_position(Vec3::ONE).with_uniform_scale(0.13); 2];
        f.decals = vec![Transform::default(); 3];

        let batch = InstanceBatch::build(&f, true);
        assert_eq!(batch.environment, 0..1);
        assert_eq!(batch.panels, 1..1 + LIGHT_COUNT as u32);
        assert_eq!(batch.projectiles.len(), 2);
        assert_eq!(batch.decals.end as usize, batch.instances.len());
        assert_eq!(batch.instances.len(), 1 + LIGHT_COUNT + 5);

        let decal = batch.instances[batch.decals.start as usize];
        assert_eq!(decal.material[0], MaterialKind::Decal as u32 as f32);
        let panel = batch.instances[batch.panels.start as usize + 4];
        assert_eq!(panel.material[1], 4.0);
    }

    #[test]
    fn missing_environment_leaves_empty_range() {
        let batch = InstanceBatch::build(&frame(), false);
        assert!(batch.environment.is_empty());
        assert_eq!(batch.panels.start, 0);
    }

    #[test]
    fn composite_flags_are_encoded() {
        let flags = RenderFlags {
            bloom: false,
            show_bloom_buffer: true,
            exposure: 2.0,
            ..Default::default()
        };
        assert_eq!(CompositeUniform::new(&flags).params, [0.0, 2.0, 1.0, 0.0]);
    }
}
