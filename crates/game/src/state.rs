//! Window-bound game state: renderer, input, frame clock and the gameplay orchestrator.

use crate::config::GameConfig;
use crate::orchestrator::FrameOrchestrator;
use crate::scene::load_environment;
use anyhow::Result;
use engine_core::Time;
use input::InputState;
use renderer::{Renderer, RendererAssets, RendererOptions};
use std::sync::Arc;
use winit::window::{CursorGrabMode, Window};

pub struct GameState {
    pub(crate) renderer: Renderer,
    pub(crate) input: InputState,
    pub(crate) orchestrator: FrameOrchestrator,
    time: Time,
    pub(crate) running: bool,
}

impl GameState {
    pub async fn new(window: Arc<Window>, config: &GameConfig) -> Result<Self> {
        let options = RendererOptions {
            vsync: config.window.vsync,
            blur_iterations: config.render.blur_iterations,
            assets: RendererAssets {
                crosshair: config.assets.crosshair.clone(),
                pause: config.assets.pause.clone(),
                decal: config.assets.decal.clone(),
            },
        };
        let mut renderer = Renderer::new(window, &options).await?;

        let environment = load_environment(config.assets.environment.as_deref());
        renderer.set_environment(&environment);

        let mut orchestrator = FrameOrchestrator::new(config, &environment)?;
        orchestrator.set_wireframe_supported(renderer.supports_wireframe());
        let (width, height) = renderer.dimensions();
        orchestrator.camera_mut().set_aspect(width, height);

        let mut state = Self {
            renderer,
            input: InputState::new(),
            orchestrator,
            time: Time::new(),
            running: true,
        };
        state.set_cursor_grabbed(true);
        Ok(state)
    }

    /// Advance gameplay by one frame.
    pub(crate) fn update(&mut self) {
        self.time.update();
        let snapshot = self.input.snapshot();
        let report = self.orchestrator.frame(
            &snapshot,
            self.time.elapsed_seconds(),
            self.time.delta_seconds(),
        );
        self.input.begin_frame();

        // Free the cursor while paused, take it back on resume.
        if snapshot.pause_pressed {
            self.set_cursor_grabbed(!report.paused);
        }
        log::trace!(
            "frame {}: step {:.4}s, {} flicker sub-steps, fired {}, {} hit(s)",
            self.time.frame_count(),
            report.physics_step,
            report.flicker_substeps,
            report.fired,
            report.hits
        );
    }

    pub(crate) fn render(&mut self) -> Result<()> {
        let frame = self.orchestrator.frame_state(self.time.elapsed_seconds());
        self.renderer.render_frame(&frame)
    }

    pub(crate) fn set_cursor_grabbed(&mut self, grabbed: bool) {
        let window = &self.renderer.window;
        if grabbed {
            let _ = window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
        } else {
            let _ = window.set_cursor_grab(CursorGrabMode::None);
        }
        window.set_cursor_visible(!grabbed);
        self.input.set_cursor_locked(grabbed);
    }
}
