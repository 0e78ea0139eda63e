//! Main renderer managing wgpu state and the per-frame pass sequence.

use crate::{
    frame::{
        BlurUniform, CompositeUniform, CrtSettings, CrtUniform, FrameState, InstanceBatch,
        OverlayUniform, SceneUniform,
    },
    mesh::{Mesh, MeshData},
    passes::{blurred_output, pass_plan, BlurStep, PassDesc, PassKind, BLUR_ITERATIONS, COMPOSITE_BUFFER},
    pipeline::{
        create_dual_texture_bind_group_layout, create_fullscreen_pipeline, create_overlay_pipeline,
        create_sampled_bind_group_layout, create_scene_bind_group_layout, create_scene_pipeline,
        create_texture_bind_group_layout, ShaderSet, HDR_FORMAT,
    },
    targets::FramebufferChain,
    texture::{crosshair_image, pause_image, splat_image, Texture},
    vertex::InstanceData,
};
use anyhow::Result;
use bytemuck::Zeroable;
use std::{path::PathBuf, sync::Arc};
use wgpu::util::DeviceExt;
use winit::window::Window;

const CLEAR_BLACK: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 1.0,
};

/// Texture files used by the renderer. Missing entries fall back to generated images.
#[derive(Debug, Clone, Default)]
pub struct RendererAssets {
    pub crosshair: Option<PathBuf>,
    pub pause: Option<PathBuf>,
    pub decal: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct RendererOptions {
    pub vsync: bool,
    pub blur_iterations: usize,
    pub assets: RendererAssets,
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self {
            vsync: true,
            blur_iterations: BLUR_ITERATIONS,
            assets: RendererAssets::default(),
        }
    }
}

pub struct Renderer {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub size: winit::dpi::PhysicalSize<u32>,
    pub window: Arc<Window>,

    // Pipelines
    scene_pipeline: wgpu::RenderPipeline,
    /// Present only when the adapter supports line polygon mode.
    wireframe_pipeline: Option<wgpu::RenderPipeline>,
    blur_pipeline: wgpu::RenderPipeline,
    composite_pipeline: wgpu::RenderPipeline,
    overlay_pipeline: wgpu::RenderPipeline,
    crt_pipeline: wgpu::RenderPipeline,

    // Bind groups and layouts
    scene_bind_group: wgpu::BindGroup,
    scene_buffer: wgpu::Buffer,
    blur_bind_group_layout: wgpu::BindGroupLayout,
    composite_bind_group_layout: wgpu::BindGroupLayout,
    crt_bind_group_layout: wgpu::BindGroupLayout,
    /// Separate uniforms per direction so one frame's writes don't overwrite each other.
    blur_uniform_h: wgpu::Buffer,
    blur_uniform_v: wgpu::Buffer,
    composite_buffer: wgpu::Buffer,
    overlay_buffer: wgpu::Buffer,
    overlay_bind_group: wgpu::BindGroup,
    crt_buffer: wgpu::Buffer,

    white_bind_group: wgpu::BindGroup,
    decal_bind_group: wgpu::BindGroup,
    crosshair_size: (u32, u32),
    pause_texture: Texture,

    targets: FramebufferChain,
    blur_iterations: usize,

    // Meshes
    environment: Option<Mesh>,
    panel_mesh: Mesh,
    projectile_mesh: Mesh,
    decal_mesh: Mesh,

    // Instance buffer for batched rendering, grown on demand
    instance_buffer: wgpu::Buffer,
    max_instances: u32,
}

impl Renderer {
    /// Create a new renderer for the given window.
    pub async fn new(window: Arc<Window>, options: &RendererOptions) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("Failed to find suitable GPU adapter"))?;

        log::info!("Using GPU: {:?}", adapter.get_info().name);

        let wireframe_supported = adapter
            .features()
            .contains(wgpu::Features::POLYGON_MODE_LINE);
        if !wireframe_supported {
            log::warn!("Adapter lacks line polygon mode; wireframe toggle disabled");
        }

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Main Device"),
                    required_features: if wireframe_supported {
                        wgpu::Features::POLYGON_MODE_LINE
                    } else {
                        wgpu::Features::empty()
                    },
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        // Mailbox when available for vsync without the extra latency, Immediate when vsync is off.
        let wanted = if options.vsync {
            wgpu::PresentMode::Mailbox
        } else {
            wgpu::PresentMode::Immediate
        };
        let present_mode = surface_caps
            .present_modes
            .iter()
            .find(|m| **m == wanted)
            .copied()
            .unwrap_or(wgpu::PresentMode::AutoVsync);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 1,
        };
        surface.configure(&device, &config);

        // Fatal on failure: nothing can be drawn without these.
        let shaders = ShaderSet::compile(&device).await?;

        let scene_bind_group_layout = create_scene_bind_group_layout(&device);
        let texture_bind_group_layout = create_texture_bind_group_layout(&device);
        let blur_bind_group_layout = create_sampled_bind_group_layout(&device, "Blur Bind Group Layout");
        let overlay_bind_group_layout =
            create_sampled_bind_group_layout(&device, "Overlay Bind Group Layout");
        let composite_bind_group_layout =
            create_dual_texture_bind_group_layout(&device, "Composite Bind Group Layout");
        let crt_bind_group_layout = create_dual_texture_bind_group_layout(&device, "CRT Bind Group Layout");

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let scene_pipeline = create_scene_pipeline(
            &device,
            &shaders.scene,
            &scene_bind_group_layout,
            &texture_bind_group_layout,
            wgpu::PolygonMode::Fill,
        );
        let wireframe_pipeline = wireframe_supported.then(|| {
            create_scene_pipeline(
                &device,
                &shaders.scene,
                &scene_bind_group_layout,
                &texture_bind_group_layout,
                wgpu::PolygonMode::Line,
            )
        });
        let blur_pipeline =
            create_fullscreen_pipeline(&device, "Blur Pipeline", &shaders.blur, &blur_bind_group_layout, HDR_FORMAT);
        let composite_pipeline = create_fullscreen_pipeline(
            &device,
            "Composite Pipeline",
            &shaders.composite,
            &composite_bind_group_layout,
            HDR_FORMAT,
        );
        let overlay_pipeline = create_overlay_pipeline(&device, &shaders.overlay, &overlay_bind_group_layout);
        let crt_pipeline = create_fullscreen_pipeline(
            &device,
            "CRT Pipeline",
            &shaders.crt,
            &crt_bind_group_layout,
            config.format,
        );
        if let Some(error) = device.pop_error_scope().await {
            anyhow::bail!("render pipeline validation failed: {}", error);
        }

        // Uniform buffers
        let uniform_buffer = |label: &str, contents: &[u8]| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            })
        };
        let scene_buffer = uniform_buffer("Scene Uniform", bytemuck::bytes_of(&SceneUniform::zeroed()));
        let blur_uniform_h = uniform_buffer("Blur Uniform H", bytemuck::bytes_of(&BlurUniform::new(true)));
        let blur_uniform_v = uniform_buffer("Blur Uniform V", bytemuck::bytes_of(&BlurUniform::new(false)));
        let composite_buffer = uniform_buffer(
            "Composite Uniform",
            bytemuck::bytes_of(&CompositeUniform::new(&Default::default())),
        );
        let overlay_buffer = uniform_buffer(
            "Overlay Uniform",
            bytemuck::bytes_of(&OverlayUniform::pixel_sized(0, 0, config.width, config.height)),
        );
        let crt_buffer = uniform_buffer(
            "CRT Uniform",
            bytemuck::bytes_of(&CrtUniform::new(&CrtSettings::IN_GAME, 0.0)),
        );

        let scene_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene Bind Group"),
            layout: &scene_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: scene_buffer.as_entire_binding(),
            }],
        });

        // Textures
        let assets = &options.assets;
        let white = Texture::white_pixel(&device, &queue);
        let decal = Texture::load_or_generate(&device, &queue, assets.decal.as_deref(), "decal", || {
            splat_image(128)
        });
        let crosshair = Texture::load_or_generate(&device, &queue, assets.crosshair.as_deref(), "crosshair", || {
            crosshair_image(32)
        });
        let pause_texture = Texture::load_or_generate(&device, &queue, assets.pause.as_deref(), "pause", || {
            pause_image(config.width, config.height)
        });

        let texture_bind_group = |texture: &Texture, label: &str| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout: &texture_bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&texture.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&texture.sampler),
                    },
                ],
            })
        };
        let white_bind_group = texture_bind_group(&white, "White Texture Bind Group");
        let decal_bind_group = texture_bind_group(&decal, "Decal Texture Bind Group");

        let overlay_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Overlay Bind Group"),
            layout: &overlay_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&crosshair.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&crosshair.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: overlay_buffer.as_entire_binding(),
                },
            ],
        });

        let targets = FramebufferChain::new(&device, config.width, config.height).await;

        let panel_mesh = MeshData::cube().upload(&device);
        let projectile_mesh = MeshData::sphere(1.0, 16, 12).upload(&device);
        let decal_mesh = MeshData::quad(1.0).upload(&device);

        let max_instances = 256u32;
        let instance_buffer = create_instance_buffer(&device, max_instances);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            window,
            scene_pipeline,
            wireframe_pipeline,
            blur_pipeline,
            composite_pipeline,
            overlay_pipeline,
            crt_pipeline,
            scene_bind_group,
            scene_buffer,
            blur_bind_group_layout,
            composite_bind_group_layout,
            crt_bind_group_layout,
            blur_uniform_h,
            blur_uniform_v,
            composite_buffer,
            overlay_buffer,
            overlay_bind_group,
            crt_buffer,
            white_bind_group,
            decal_bind_group,
            crosshair_size: (crosshair.width, crosshair.height),
            pause_texture,
            targets,
            blur_iterations: options.blur_iterations,
            environment: None,
            panel_mesh,
            projectile_mesh,
            decal_mesh,
            instance_buffer,
            max_instances,
        })
    }

    /// Upload the static environment geometry drawn at the start of every scene pass.
    pub fn set_environment(&mut self, data: &MeshData) {
        if data.is_empty() {
            log::warn!("Environment mesh is empty; nothing will be drawn for it");
            self.environment = None;
            return;
        }
        self.environment = Some(data.upload(&self.device));
    }

    pub fn supports_wireframe(&self) -> bool {
        self.wireframe_pipeline.is_some()
    }

    /// Reconfigure the surface and rebuild every window-sized target.
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.targets = pollster::block_on(FramebufferChain::new(
                &self.device,
                self.config.width,
                self.config.height,
            ));
        }
    }

    /// Get window dimensions.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Draw one frame by walking the pass plan, then present.
    ///
    /// A lost or outdated surface is reconfigured and the frame skipped; only
    /// running out of memory is reported to the caller.
    pub fn render_frame(&mut self, frame: &FrameState) -> Result<()> {
        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                return Err(anyhow::anyhow!("surface out of memory"));
            }
            Err(e) => {
                log::warn!("Skipping frame: {}", e);
                return Ok(());
            }
        };
        let surface_view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let batch = InstanceBatch::build(frame, self.environment.is_some());
        self.upload_instances(&batch.instances);
        self.write_uniforms(frame);

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });

        for pass in pass_plan(self.blur_iterations) {
            let view = self.targets.view(pass.target, &surface_view);
            match pass.kind {
                PassKind::Scene => self.scene_pass(&mut encoder, &pass, frame, &batch),
                PassKind::Blur(step) => self.blur_pass(&mut encoder, &pass, view, step),
                PassKind::Composite => self.composite_pass(&mut encoder, &pass, view),
                PassKind::Overlay => self.overlay_pass(&mut encoder, &pass, view),
                PassKind::Crt => self.crt_pass(&mut encoder, &pass, view),
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    fn upload_instances(&mut self, instances: &[InstanceData]) {
        let needed = instances.len() as u32;
        if needed > self.max_instances {
            self.max_instances = needed.next_power_of_two();
            self.instance_buffer = create_instance_buffer(&self.device, self.max_instances);
            log::debug!("Instance buffer grown to {}", self.max_instances);
        }
        self.queue
            .write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(instances));
    }

    fn write_uniforms(&self, frame: &FrameState) {
        let (width, height) = self.dimensions();
        let (sprite_w, sprite_h) = self.crosshair_size;
        self.queue.write_buffer(
            &self.scene_buffer,
            0,
            bytemuck::bytes_of(&SceneUniform::from_frame(frame)),
        );
        self.queue.write_buffer(
            &self.composite_buffer,
            0,
            bytemuck::bytes_of(&CompositeUniform::new(&frame.flags)),
        );
        self.queue.write_buffer(
            &self.overlay_buffer,
            0,
            bytemuck::bytes_of(&OverlayUniform::pixel_sized(sprite_w, sprite_h, width, height)),
        );
        self.queue.write_buffer(
            &self.crt_buffer,
            0,
            bytemuck::bytes_of(&CrtUniform::new(
                &CrtSettings::for_pause(frame.flags.paused),
                frame.time,
            )),
        );
    }

    fn color_ops(pass: &PassDesc) -> wgpu::Operations<wgpu::Color> {
        wgpu::Operations {
            load: if pass.clear {
                wgpu::LoadOp::Clear(CLEAR_BLACK)
            } else {
                wgpu::LoadOp::Load
            },
            store: wgpu::StoreOp::Store,
        }
    }

    /// Environment, light panels, projectiles and decals into the HDR framebuffer.
    fn scene_pass(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        pass: &PassDesc,
        frame: &FrameState,
        batch: &InstanceBatch,
    ) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Pass"),
            color_attachments: &[
                Some(wgpu::RenderPassColorAttachment {
                    view: &self.targets.scene.view,
                    resolve_target: None,
                    ops: Self::color_ops(pass),
                }),
                Some(wgpu::RenderPassColorAttachment {
                    view: &self.targets.bright.view,
                    resolve_target: None,
                    ops: Self::color_ops(pass),
                }),
            ],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.targets.depth.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        let pipeline = match (&self.wireframe_pipeline, frame.flags.wireframe) {
            (Some(wireframe), true) => wireframe,
            _ => &self.scene_pipeline,
        };
        render_pass.set_pipeline(pipeline);
        render_pass.set_bind_group(0, &self.scene_bind_group, &[]);
        render_pass.set_vertex_buffer(1, self.instance_buffer.slice(..));

        let draws = [
            (self.environment.as_ref(), &self.white_bind_group, batch.environment.clone()),
            (Some(&self.panel_mesh), &self.white_bind_group, batch.panels.clone()),
            (Some(&self.projectile_mesh), &self.white_bind_group, batch.projectiles.clone()),
            (Some(&self.decal_mesh), &self.decal_bind_group, batch.decals.clone()),
        ];
        for (mesh, texture, instances) in draws {
            let Some(mesh) = mesh else { continue };
            if instances.is_empty() {
                continue;
            }
            render_pass.set_bind_group(1, texture, &[]);
            render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..mesh.num_indices, 0, instances);
        }
    }

    fn blur_pass(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        pass: &PassDesc,
        view: &wgpu::TextureView,
        step: BlurStep,
    ) {
        let uniform = if step.horizontal {
            &self.blur_uniform_h
        } else {
            &self.blur_uniform_v
        };
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Blur Bind Group"),
            layout: &self.blur_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(self.targets.blur_source(step.source)),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.targets.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: uniform.as_entire_binding(),
                },
            ],
        });
        self.fullscreen_pass(encoder, "Blur Pass", pass, view, &self.blur_pipeline, &bind_group);
    }

    fn composite_pass(&self, encoder: &mut wgpu::CommandEncoder, pass: &PassDesc, view: &wgpu::TextureView) {
        let bloom = self.targets.blur_source(blurred_output(self.blur_iterations));
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Composite Bind Group"),
            layout: &self.composite_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&self.targets.scene.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(bloom),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.targets.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: self.composite_buffer.as_entire_binding(),
                },
            ],
        });
        self.fullscreen_pass(encoder, "Composite Pass", pass, view, &self.composite_pipeline, &bind_group);
    }

    /// Crosshair sprite, alpha blended onto the composite buffer.
    fn overlay_pass(&self, encoder: &mut wgpu::CommandEncoder, pass: &PassDesc, view: &wgpu::TextureView) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Overlay Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: Self::color_ops(pass),
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        render_pass.set_pipeline(&self.overlay_pipeline);
        render_pass.set_bind_group(0, &self.overlay_bind_group, &[]);
        render_pass.draw(0..6, 0..1);
    }

    /// Composite buffer to the swapchain through the CRT effect and pause overlay.
    fn crt_pass(&self, encoder: &mut wgpu::CommandEncoder, pass: &PassDesc, view: &wgpu::TextureView) {
        let composite = &self.targets.ping_pong[COMPOSITE_BUFFER].view;
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("CRT Bind Group"),
            layout: &self.crt_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(composite),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&self.pause_texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.targets.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: self.crt_buffer.as_entire_binding(),
                },
            ],
        });
        self.fullscreen_pass(encoder, "CRT Pass", pass, view, &self.crt_pipeline, &bind_group);
    }

    fn fullscreen_pass(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        label: &str,
        pass: &PassDesc,
        view: &wgpu::TextureView,
        pipeline: &wgpu::RenderPipeline,
        bind_group: &wgpu::BindGroup,
    ) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: Self::color_ops(pass),
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        render_pass.set_pipeline(pipeline);
        render_pass.set_bind_group(0, bind_group, &[]);
        render_pass.draw(0..3, 0..1);
    }
}

fn create_instance_buffer(device: &wgpu::Device, capacity: u32) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Instance Buffer"),
        size: (std::mem::size_of::<InstanceData>() * capacity as usize) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}
