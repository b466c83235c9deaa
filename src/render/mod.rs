pub mod frame;
pub mod instance;
pub mod lines;
pub mod pipeline;
pub mod target;

use std::sync::Arc;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::error::GpuError;
use crate::palette;
use crate::surface::SurfaceBounds;

use self::frame::{BatchKind, FrameBuilder};
use self::lines::{LinePipeline, MAX_LINE_VERTICES};
use self::pipeline::{ScreenUniform, ShapePipeline, MAX_SHAPES};
use self::target::{AccumTarget, BlitPipeline};

/// Core GPU state - device, queue, surface, pipelines and the accumulation target.
pub struct GpuState {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub surface: wgpu::Surface<'static>,
    pub surface_config: wgpu::SurfaceConfiguration,
    pub screen: ScreenUniform,
    pub shape_pipeline: ShapePipeline,
    pub line_pipeline: LinePipeline,
    pub blit_pipeline: BlitPipeline,
    pub accum: AccumTarget,
}

impl GpuState {
    /// Initialize wgpu, the pipelines and an accumulation target sized to the window.
    pub fn new(window: Arc<Window>) -> Result<Self, GpuError> {
        let size = window.inner_size();
        let logical = SurfaceBounds::from_physical(size, window.scale_factor());

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::LowPower,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))?;

        log::info!(
            "GPU adapter: {:?} ({:?})",
            adapter.get_info().name,
            adapter.get_info().backend
        );

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("nodefield_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults(),
                ..Default::default()
            },
        ))?;

        let surface_caps = surface.get_capabilities(&adapter);

        // Blend in the same (non-linear) space a 2D canvas does.
        let format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(GpuError::NoSurfaceFormat)?;

        let present_mode = choose_present_mode(&surface_caps.present_modes);

        log::info!("Surface: format={:?}, present_mode={:?}", format, present_mode);

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode: choose_alpha_mode(&surface_caps.alpha_modes),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let screen = ScreenUniform::new(&device);
        let shape_pipeline = ShapePipeline::new(&device, format, &screen);
        let line_pipeline = LinePipeline::new(&device, format, &screen);
        let blit_pipeline = BlitPipeline::new(&device, format);
        let accum = AccumTarget::new(
            &device,
            &blit_pipeline,
            format,
            surface_config.width,
            surface_config.height,
        );

        // Simulation coordinates are logical pixels; the surface is physical.
        screen.update(
            &queue,
            logical.width.max(1) as f32,
            logical.height.max(1) as f32,
        );

        Ok(Self {
            device,
            queue,
            surface,
            surface_config,
            screen,
            shape_pipeline,
            line_pipeline,
            blit_pipeline,
            accum,
        })
    }

    /// Resize the surface. The accumulated image is discarded, matching a
    /// canvas whose backing store is reallocated on resize.
    pub fn resize(&mut self, size: PhysicalSize<u32>, logical: SurfaceBounds) {
        if size.width == 0 || size.height == 0 || logical.is_empty() {
            return;
        }
        self.surface_config.width = size.width;
        self.surface_config.height = size.height;
        self.surface.configure(&self.device, &self.surface_config);
        self.screen
            .update(&self.queue, logical.width as f32, logical.height as f32);
        self.accum = AccumTarget::new(
            &self.device,
            &self.blit_pipeline,
            self.surface_config.format,
            size.width,
            size.height,
        );
    }

    /// Upload, draw and present one recorded frame.
    pub fn render(&mut self, frame: &FrameBuilder) {
        self.shape_pipeline.update_instances(&self.queue, &frame.shapes);
        self.line_pipeline.update_vertices(&self.queue, &frame.lines);

        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.surface_config);
                return;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory");
                return;
            }
            Err(e) => {
                log::warn!("Surface error: {e:?}");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });

        self.draw_batches(&mut encoder, frame);
        self.blit(&mut encoder, &view);

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }

    /// Replay the frame's batches into the accumulation texture, in order.
    fn draw_batches(&mut self, encoder: &mut wgpu::CommandEncoder, frame: &FrameBuilder) {
        let load = if std::mem::take(&mut self.accum.needs_clear) {
            let [r, g, b, a] = palette::premultiplied(palette::BACKGROUND);
            wgpu::LoadOp::Clear(wgpu::Color {
                r: r as f64,
                g: g as f64,
                b: b as f64,
                a: a as f64,
            })
        } else {
            wgpu::LoadOp::Load
        };

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("accum_render_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.accum.view,
                resolve_target: None,
                depth_slice: None,
                ops: wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        let shapes = &self.shape_pipeline;
        let lines = &self.line_pipeline;
        for batch in &frame.batches {
            match batch.kind {
                BatchKind::Shapes => {
                    let end = batch.end.min(MAX_SHAPES as u32);
                    if batch.start >= end {
                        continue;
                    }
                    render_pass.set_pipeline(&shapes.pipeline);
                    render_pass.set_bind_group(0, &self.screen.bind_group, &[]);
                    render_pass.set_vertex_buffer(0, shapes.vertex_buffer.slice(..));
                    render_pass.set_vertex_buffer(1, shapes.instance_buffer.slice(..));
                    render_pass
                        .set_index_buffer(shapes.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                    render_pass.draw_indexed(0..6, 0, batch.start..end);
                }
                BatchKind::Lines => {
                    let end = batch.end.min(MAX_LINE_VERTICES as u32);
                    if batch.start >= end {
                        continue;
                    }
                    render_pass.set_pipeline(&lines.pipeline);
                    render_pass.set_bind_group(0, &self.screen.bind_group, &[]);
                    render_pass.set_vertex_buffer(0, lines.vertex_buffer.slice(..));
                    render_pass.draw(batch.start..end, 0..1);
                }
            }
        }
    }

    /// Copy the accumulation texture to the swapchain image.
    fn blit(&self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("blit_render_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                depth_slice: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        render_pass.set_pipeline(&self.blit_pipeline.pipeline);
        render_pass.set_bind_group(0, &self.accum.bind_group, &[]);
        render_pass.draw(0..3, 0..1);
    }
}

/// Vsync when available, else whatever the surface offers first.
fn choose_present_mode(modes: &[wgpu::PresentMode]) -> wgpu::PresentMode {
    if modes.contains(&wgpu::PresentMode::Fifo) {
        return wgpu::PresentMode::Fifo;
    }
    modes.first().copied().unwrap_or(wgpu::PresentMode::Fifo)
}

fn choose_alpha_mode(modes: &[wgpu::CompositeAlphaMode]) -> wgpu::CompositeAlphaMode {
    modes
        .first()
        .copied()
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn present_mode_prefers_vsync() {
        use wgpu::PresentMode::*;
        assert_eq!(choose_present_mode(&[Mailbox, Fifo, Immediate]), Fifo);
        assert_eq!(choose_present_mode(&[Mailbox, Immediate]), Mailbox);
    }

    #[test]
    fn empty_capabilities_fall_back() {
        assert_eq!(choose_present_mode(&[]), wgpu::PresentMode::Fifo);
        assert_eq!(choose_alpha_mode(&[]), wgpu::CompositeAlphaMode::Auto);
        assert_eq!(
            choose_alpha_mode(&[wgpu::CompositeAlphaMode::Opaque]),
            wgpu::CompositeAlphaMode::Opaque
        );
    }
}
