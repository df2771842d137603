use anyhow::Context;
use nth_host::frame::ScaledFrame;
use pixels::Pixels;
use std::time::Instant;
use winit::event_loop::EventLoop;
use winit::window::{Window, WindowId};

#[derive(Debug, Clone)]
pub struct RendererOptions {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl RendererOptions {
    /// A window showing the LCD at the given integer `scale`.
    pub fn for_scale(scale: u32) -> Self {
        let (width, height) = nth_host::compositor::scaled_size(scale);

        Self {
            title: crate::TITLE.to_string(),
            width,
            height,
        }
    }
}

pub struct Renderer {
    pixels: Pixels,
    primary_window: Window,
    last_title_update: Instant,
}

impl Renderer {
    pub fn new(event_loop: &EventLoop<()>, options: RendererOptions) -> anyhow::Result<Self> {
        let window = {
            let size = winit::dpi::LogicalSize::new(options.width as f64, options.height as f64);
            winit::window::WindowBuilder::new()
                .with_title(options.title)
                .with_inner_size(size)
                .with_min_inner_size(size)
                .build(event_loop)?
        };

        let pixels = {
            let window_size = window.inner_size();
            let surface_texture = pixels::SurfaceTexture::new(window_size.width, window_size.height, &window);

            // Vsync paces the render loop at the display's refresh rate.
            pixels::PixelsBuilder::new(options.width, options.height, surface_texture)
                .present_mode(wgpu::PresentMode::AutoVsync)
                .build()
                .context("Failed to create pixels surface")?
        };

        Ok(Self {
            pixels,
            primary_window: window,
            last_title_update: Instant::now(),
        })
    }

    pub fn primary_window_id(&self) -> WindowId {
        self.primary_window.id()
    }

    pub fn request_redraw(&self) {
        self.primary_window.request_redraw();
    }

    /// To be called after `input.update(event)` returns `true`
    ///
    /// Will handle window resize events for `pixels`.
    pub fn after_window_update(&mut self, input: &winit_input_helper::WinitInputHelper) -> anyhow::Result<()> {
        if let Some(size) = input.window_resized() {
            self.pixels
                .resize_surface(size.width, size.height)
                .context("Failed to resize surface")?;
        }

        Ok(())
    }

    /// Update the window title with the throughput readout, at most once per second unless `force` is set.
    pub fn update_title(&mut self, status: &str, force: bool) {
        if force || self.last_title_update.elapsed().as_secs() >= 1 {
            self.primary_window.set_title(&format!("{} - [{}]", crate::TITLE, status));
            self.last_title_update = Instant::now();
        }
    }

    /// Renders the main window's contents (The framebuffer).
    pub fn render_frame(&mut self, frame: &ScaledFrame) -> anyhow::Result<()> {
        if self.pixels.frame().len() != frame.as_bytes().len() {
            self.pixels
                .resize_buffer(frame.width(), frame.height())
                .context("Failed to resize pixel buffer")?;
        }

        frame.copy_to(self.pixels.frame_mut());

        self.pixels.render().context("Failed to render pixels")
    }
}
