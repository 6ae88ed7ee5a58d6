//! GPU frame composition: the Vello map scene underneath, egui panels on top.

use peniko::Color;
use vello::wgpu::{self, util::TextureBlitter};
use vello::{AaConfig, RenderParams, RendererOptions, Scene};

/// Errors raised while building or presenting a frame.
#[derive(Debug, thiserror::Error)]
pub enum CompositeError {
    #[error("Failed to create map renderer: {0}")]
    Init(String),
    #[error("Surface unavailable: {0}")]
    Surface(#[from] wgpu::SurfaceError),
    #[error("Map render failed: {0}")]
    Render(String),
}

/// Tessellated egui output for one frame.
pub struct OverlayFrame<'a> {
    pub primitives: &'a [egui::ClippedPrimitive],
    pub textures: &'a egui::TexturesDelta,
    pub pixels_per_point: f32,
}

/// Off-screen map target. Vello writes through a storage binding, which
/// surface formats such as Bgra8Unorm do not support.
struct MapTarget {
    view: wgpu::TextureView,
    width: u32,
    height: u32,
}

impl MapTarget {
    fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("map target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::STORAGE_BINDING | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        Self {
            view: texture.create_view(&wgpu::TextureViewDescriptor::default()),
            width,
            height,
        }
    }
}

/// Owns the GPU renderers and composes each frame onto the surface.
pub struct Compositor {
    map: vello::Renderer,
    blitter: TextureBlitter,
    overlay: egui_wgpu::Renderer,
    target: Option<MapTarget>,
}

impl Compositor {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Result<Self, CompositeError> {
        let map = vello::Renderer::new(device, RendererOptions::default())
            .map_err(|e| CompositeError::Init(format!("{:?}", e)))?;
        Ok(Self {
            map,
            blitter: TextureBlitter::new(device, format),
            overlay: egui_wgpu::Renderer::new(device, format, egui_wgpu::RendererOptions::default()),
            target: None,
        })
    }

    /// The map target is reused until the surface size changes.
    fn target(&mut self, device: &wgpu::Device, width: u32, height: u32) -> &wgpu::TextureView {
        let stale = self
            .target
            .as_ref()
            .is_none_or(|t| t.width != width || t.height != height);
        if stale {
            log::debug!("Allocating map target {}x{}", width, height);
        }
        let target = match self.target.take() {
            Some(target) if !stale => target,
            _ => MapTarget::new(device, width, height),
        };
        &self.target.insert(target).view
    }

    /// Render `scene`, blit it to the surface, draw the overlay and present.
    pub fn present(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface: &vello::util::RenderSurface<'_>,
        scene: &Scene,
        base_color: Color,
        overlay: OverlayFrame<'_>,
    ) -> Result<(), CompositeError> {
        let frame = surface.surface.get_current_texture()?;
        let (width, height) = (surface.config.width, surface.config.height);

        let params = RenderParams {
            base_color,
            width,
            height,
            antialiasing_method: AaConfig::Area,
        };
        let target = self.target(device, width, height).clone();
        self.map
            .render_to_texture(device, queue, scene, &target, &params)
            .map_err(|e| CompositeError::Render(format!("{:?}", e)))?;

        let surface_view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        for (id, delta) in &overlay.textures.set {
            self.overlay.update_texture(device, queue, *id, delta);
        }
        let screen = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [width, height],
            pixels_per_point: overlay.pixels_per_point,
        };

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("frame encoder"),
        });
        self.blitter
            .copy(device, &mut encoder, &target, &surface_view);
        let extra = self.overlay.update_buffers(
            device,
            queue,
            &mut encoder,
            overlay.primitives,
            &screen,
        );
        {
            let pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("overlay pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            let mut pass = pass.forget_lifetime();
            self.overlay.render(&mut pass, overlay.primitives, &screen);
        }
        queue.submit(extra.into_iter().chain(std::iter::once(encoder.finish())));

        for id in &overlay.textures.free {
            self.overlay.free_texture(id);
        }
        frame.present();
        Ok(())
    }
}
