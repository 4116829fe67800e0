//! Window and GPU device setup

use std::sync::Arc;
use thiserror::Error;
use winit::{
    dpi::PhysicalSize,
    event_loop::EventLoop,
    window::{Window, WindowBuilder},
};

#[derive(Debug, Error)]
pub enum GraphicsError {
    #[error("event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter")]
    NoAdapter,

    #[error("device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("surface reports no supported formats")]
    NoSurfaceFormat,
}

/// Holds all GPU resources needed for rendering
pub struct GraphicsContext {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub size: PhysicalSize<u32>,
    pub window: Arc<Window>,
}

impl GraphicsContext {
    /// Create a window and a device that can present to it
    pub async fn new(title: &str, width: u32, height: u32) -> Result<(Self, EventLoop<()>), GraphicsError> {
        let _ = env_logger::try_init();

        let event_loop = EventLoop::new()?;
        let window = Arc::new(
            WindowBuilder::new()
                .with_title(title)
                .with_inner_size(PhysicalSize::new(width, height))
                .build(&event_loop)?,
        );

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
            .ok_or(GraphicsError::NoAdapter)?;

        let info = adapter.get_info();
        log::info!("using adapter {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    label: None,
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or(GraphicsError::NoSurfaceFormat)?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        Ok((
            Self {
                surface,
                device,
                queue,
                config,
                size,
                window,
            },
            event_loop,
        ))
    }

    /// Resize the rendering surface
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Get the aspect ratio of the window
    pub fn aspect_ratio(&self) -> f32 {
        self.size.width as f32 / self.size.height.max(1) as f32
    }
}
