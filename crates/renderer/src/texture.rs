//! GPU textures: image loading, depth buffers and procedural fallbacks.

use anyhow::{Context, Result};
use image::{Rgba, RgbaImage};
use std::path::Path;

/// A sampled 2D texture.
pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub width: u32,
    pub height: u32,
}

impl Texture {
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Depth attachment matching a render target of `width` x `height`.
    pub fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32, label: &str) -> Self {
        let (width, height) = (width.max(1), height.max(1));
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
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            ..Default::default()
        });
        Self {
            texture,
            view,
            sampler,
            width,
            height,
        }
    }

    /// Upload an RGBA image as an sRGB texture with a clamped linear sampler.
    pub fn from_rgba(device: &wgpu::Device, queue: &wgpu::Queue, image: &RgbaImage, label: &str) -> Self {
        let (width, height) = image.dimensions();
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            image.as_raw(),
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: Some(height),
            },
            size,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        Self {
            texture,
            view,
            sampler,
            width,
            height,
        }
    }

    /// 1x1 opaque white texture for untextured draws.
    pub fn white_pixel(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self::from_rgba(
            device,
            queue,
            &RgbaImage::from_pixel(1, 1, Rgba([255, 255, 255, 255])),
            "White Pixel",
        )
    }

    /// Load an image file from disk.
    pub fn load(device: &wgpu::Device, queue: &wgpu::Queue, path: &Path) -> Result<Self> {
        let image = image::open(path)
            .with_context(|| format!("failed to load texture {}", path.display()))?
            .to_rgba8();
        Ok(Self::from_rgba(device, queue, &image, &path.display().to_string()))
    }

    /// Load an image file, falling back to a generated image when it is missing or unreadable.
    pub fn load_or_generate(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: Option<&Path>,
        label: &str,
        fallback: impl FnOnce() -> RgbaImage,
    ) -> Self {
        if let Some(path) = path {
            match Self::load(device, queue, path) {
                Ok(texture) => {
                    log::info!("Loaded {} texture from {}", label, path.display());
                    return texture;
                }
                Err(e) => log::warn!("{:#}; using generated {} texture", e, label),
            }
        }
        Self::from_rgba(device, queue, &fallback(), label)
    }
}

/// Plus-shaped crosshair on a transparent background.
pub fn crosshair_image(size: u32) -> RgbaImage {
    let size = size.max(3);
    let center = size as f32 / 2.0;
    let thickness = (size as f32 / 16.0).max(1.0);
    let gap = size as f32 / 8.0;
    RgbaImage::from_fn(size, size, |x, y| {
        let dx = (x as f32 + 0.5 - center).abs();
        let dy = (y as f32 + 0.5 - center).abs();
        let on_vertical = dx <= thickness && dy >= gap;
        let on_horizontal = dy <= thickness && dx >= gap;
        if on_vertical || on_horizontal {
            Rgba([255, 255, 255, 220])
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}

/// Two vertical pause bars over a translucent dark backdrop.
pub fn pause_image(width: u32, height: u32) -> RgbaImage {
    let (width, height) = (width.max(8), height.max(8));
    let (w, h) = (width as f32, height as f32);
    let bar_w = w * 0.06;
    let bar_h = h * 0.25;
    let spacing = w * 0.05;
    RgbaImage::from_fn(width, height, |x, y| {
        let px = x as f32 + 0.5 - w / 2.0;
        let py = y as f32 + 0.5 - h / 2.0;
        let in_bar_rows = py.abs() <= bar_h / 2.0;
        let in_left = px <= -spacing / 2.0 && px >= -spacing / 2.0 - bar_w;
        let in_right = px >= spacing / 2.0 && px <= spacing / 2.0 + bar_w;
        if in_bar_rows && (in_left || in_right) {
            Rgba([235, 235, 235, 255])
        } else {
            Rgba([0, 0, 0, 96])
        }
    })
}

/// Soft round splat used for impact decals.
pub fn splat_image(size: u32) -> RgbaImage {
    let size = size.max(4);
    let center = size as f32 / 2.0;
    RgbaImage::from_fn(size, size, |x, y| {
        let dx = x as f32 + 0.5 - center;
        let dy = y as f32 + 0.5 - center;
        // Lobed edge so splats do not read as perfect discs.
        let angle = dy.atan2(dx);
        let radius = center * (0.78 + 0.12 * (angle * 5.0).sin());
        if (dx * dx + dy * dy).sqrt() <= radius {
            Rgba([255, 255, 255, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crosshair_has_open_centre_and_opaque_arms() {
        let image = crosshair_image(32);
        assert_eq!(image.get_pixel(16, 16)[3], 0);
        assert!(image.get_pixel(16, 2)[3] > 0);
        assert!(image.get_pixel(30, 16)[3] > 0);
        assert_eq!(image.get_pixel(2, 2)[3], 0);
    }

    #[test]
    fn pause_image_has_two_bars() {
        let image = pause_image(200, 100);
        let row = 50;
        let opaque: Vec<u32> = (0..200)
            .filter(|&x| image.get_pixel(x, row)[3] == 255)
            .collect();
        assert!(!opaque.is_empty());
        // Gap between the bars at the centre.
        assert!(image.get_pixel(100, row)[3] < 255);
        assert!(opaque.iter().any(|&x| x < 100) && opaque.iter().any(|&x| x > 100));
    }

    #[test]
    fn splat_is_solid_in_the_middle() {
        let image = splat_image(64);
        assert_eq!(image.get_pixel(32, 32)[3], 255);
        assert_eq!(image.get_pixel(0, 0)[3], 0);
    }
}
