//! Windowed frame driver.
//!
//! The loop is self-perpetuating: every `RedrawRequested` renders one
//! frame and immediately requests the next redraw, which keeps updates
//! aligned with the display's vsync through the surface's present mode.
//! Closing the window is the single cancellation point: the event loop
//! exits and every pending redraw dies with it.

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::config::VortexConfig;
use crate::engine::VortexEngine;
use crate::error::VortexError;
use crate::gpu::GpuState;

/// Open a window and run the particle field until it is closed.
///
/// The configuration is validated before the window opens; a malformed
/// background color is rejected here rather than mid-frame.
pub fn run(config: VortexConfig) -> Result<(), VortexError> {
    let [r, g, b, a] = config.background_color()?;
    let background = wgpu::Color { r, g, b, a };

    let engine = VortexEngine::new(config.clone());

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App {
        config,
        background,
        engine,
        window: None,
        gpu: None,
    };
    event_loop.run_app(&mut app)?;
    Ok(())
}

struct App {
    config: VortexConfig,
    background: wgpu::Color,
    engine: VortexEngine,
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = Window::default_attributes()
            .with_title("Vortex")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        match pollster::block_on(GpuState::new(
            window.clone(),
            self.config.particle_count,
            self.background,
        )) {
            Ok(gpu) => {
                self.engine.start(size.width as f32, size.height as f32);
                self.gpu = Some(gpu);
                window.request_redraw();
                self.window = Some(window);
            }
            Err(e) => {
                log::error!("GPU initialization failed: {e}");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                self.engine.stop();
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                // Particle data is untouched on resize; strays outside the
                // new bounds respawn through the ordinary check.
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(physical_size);
                }
                self.engine
                    .resize(physical_size.width as f32, physical_size.height as f32);
            }
            WindowEvent::RedrawRequested => {
                if let Some(gpu) = &mut self.gpu {
                    let segments = self.engine.update();
                    match gpu.render(segments) {
                        Ok(()) => {}
                        Err(wgpu::SurfaceError::Lost) => {
                            log::warn!("Surface lost, reconfiguring");
                            gpu.resize(winit::dpi::PhysicalSize {
                                width: gpu.config.width,
                                height: gpu.config.height,
                            });
                        }
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            log::error!("Out of GPU memory, exiting");
                            event_loop.exit();
                        }
                        Err(e) => log::warn!("Render error: {e:?}"),
                    }
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}
