//! Liminal - first-person walk through a flickering office maze with physics projectiles and bloom

mod config;
mod events;
mod flicker;
mod orchestrator;
mod projectile;
mod scene;
mod state;

use anyhow::Result;
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

pub use state::GameState;

struct App {
    state: Option<GameState>,
}

impl App {
    fn new() -> Self {
        Self { state: None }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_none() {
            let config = config::GameConfig::load();
            let window_attrs = Window::default_attributes()
                .with_title(config.window.title.clone())
                .with_inner_size(winit::dpi::LogicalSize::new(
                    config.window.width,
                    config.window.height,
                ));

            let window = match event_loop.create_window(window_attrs) {
                Ok(w) => Arc::new(w),
                Err(e) => {
                    log::error!("Failed to create window: {}", e);
                    event_loop.exit();
                    return;
                }
            };

            let state = pollster::block_on(GameState::new(window.clone(), &config));
            match state {
                Ok(s) => {
                    self.state = Some(s);
                    window.request_redraw();
                }
                Err(e) => {
                    log::error!("Failed to initialize game: {:#}", e);
                    event_loop.exit();
                }
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let Some(state) = &mut self.state {
            if state.handle_window_event(event) || !state.running {
                event_loop.exit();
            }
        }
    }

    fn device_event(&mut self, _: &ActiveEventLoop, _: DeviceId, event: DeviceEvent) {
        if let Some(state) = &mut self.state {
            state.handle_device_event(event);
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("╔══════════════════════════════════════════════════════╗");
    println!("║                       Liminal                        ║");
    println!("╠══════════════════════════════════════════════════════╣");
    println!("║  CONTROLS:                                           ║");
    println!("║    WASD       - Move        │  Mouse  - Look around  ║");
    println!("║    Left Click - Fire        │  Space  - Jump         ║");
    println!("║    Escape     - Pause       │                        ║");
    println!("╠══════════════════════════════════════════════════════╣");
    println!("║  DEBUG:                                              ║");
    println!("║    L - Wireframe  │ B - Bloom  │ C - Bloom buffer    ║");
    println!("║    O - Cycle debug light     │ M - Print position    ║");
    println!("╚══════════════════════════════════════════════════════╝");

    log::info!("Starting Liminal");

    let event_loop = EventLoop::new()?;
    // Poll so frames are produced continuously; flicker and physics run off the frame clock.
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new();
    event_loop.run_app(&mut app)?;

    Ok(())
}
