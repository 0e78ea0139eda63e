//! Offscreen render targets: the HDR scene framebuffer and the ping-pong chain.

use crate::{
    passes::{BlurSource, PassTarget},
    pipeline::HDR_FORMAT,
    texture::Texture,
};

/// Number of ping-pong colour buffers (two for blurring, one for the composite).
pub const PING_PONG_COUNT: usize = 3;

/// A colour render target that later passes sample from.
pub struct ColorTarget {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl ColorTarget {
    fn new(device: &wgpu::Device, width: u32, height: u32, label: &str) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: HDR_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }
}

/// All window-sized offscreen targets. Rebuilt as a unit on resize.
pub struct FramebufferChain {
    /// Lit scene colour.
    pub scene: ColorTarget,
    /// Scene colour above the bloom threshold.
    pub bright: ColorTarget,
    pub depth: Texture,
    pub ping_pong: [ColorTarget; PING_PONG_COUNT],
    /// Linear clamped sampler shared by every post-processing pass.
    pub sampler: wgpu::Sampler,
    pub width: u32,
    pub height: u32,
}

impl FramebufferChain {
    /// Allocate the chain. Validation failures are logged as warnings; the
    /// chain is still returned so the frame loop keeps running.
    pub async fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let chain = Self {
            scene: ColorTarget::new(device, width, height, "HDR Scene Color"),
            bright: ColorTarget::new(device, width, height, "HDR Bright Color"),
            depth: Texture::create_depth_texture(device, width, height, "HDR Depth"),
            ping_pong: [
                ColorTarget::new(device, width, height, "Ping-Pong 0"),
                ColorTarget::new(device, width, height, "Ping-Pong 1"),
                ColorTarget::new(device, width, height, "Ping-Pong 2"),
            ],
            sampler: device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some("Post Sampler"),
                address_mode_u: wgpu::AddressMode::ClampToEdge,
                address_mode_v: wgpu::AddressMode::ClampToEdge,
                mag_filter: wgpu::FilterMode::Linear,
                min_filter: wgpu::FilterMode::Linear,
                ..Default::default()
            }),
            width,
            height,
        };

        if let Some(error) = device.pop_error_scope().await {
            log::warn!("Framebuffer chain {}x{} incomplete: {}", width, height, error);
        }
        chain
    }

    /// Colour view a pass renders into. The swapchain view is owned by the caller.
    pub fn view<'a>(&'a self, target: PassTarget, surface: &'a wgpu::TextureView) -> &'a wgpu::TextureView {
        match target {
            PassTarget::Hdr => &self.scene.view,
            PassTarget::PingPong(i) => &self.ping_pong[i.min(PING_PONG_COUNT - 1)].view,
            PassTarget::Surface => surface,
        }
    }

    /// View a blur iteration samples from.
    pub fn blur_source(&self, source: BlurSource) -> &wgpu::TextureView {
        match source {
            BlurSource::BloomThreshold => &self.bright.view,
            BlurSource::PingPong(i) => &self.ping_pong[i.min(PING_PONG_COUNT - 1)].view,
        }
    }
}
