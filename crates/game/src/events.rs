//! Window and device event handling for GameState.
//! Events only update the input table; gameplay reads it once per frame as a snapshot.

use winit::event::{DeviceEvent, WindowEvent};

impl crate::GameState {
    /// Handle a window event. Returns true if the app should exit.
    pub(crate) fn handle_window_event(&mut self, event: WindowEvent) -> bool {
        match event {
            WindowEvent::CloseRequested => {
                self.running = false;
                true
            }
            WindowEvent::Resized(size) => {
                self.renderer.resize(size);
                self.orchestrator
                    .camera_mut()
                    .set_aspect(size.width, size.height);
                false
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if let winit::keyboard::PhysicalKey::Code(key) = event.physical_key {
                    self.input.process_keyboard(key, event.state);
                }
                false
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.input.process_mouse_button(button, state);
                // Clicking back into the window re-captures the cursor unless paused.
                if state.is_pressed()
                    && !self.input.is_cursor_locked()
                    && !self.orchestrator.is_paused()
                {
                    self.set_cursor_grabbed(true);
                }
                false
            }
            WindowEvent::Focused(false) => {
                if self.input.is_cursor_locked() {
                    self.set_cursor_grabbed(false);
                }
                false
            }
            WindowEvent::RedrawRequested => {
                self.update();
                if let Err(e) = self.render() {
                    log::error!("Render error: {}", e);
                }
                self.renderer.window.request_redraw();
                false
            }
            _ => false,
        }
    }

    pub(crate) fn handle_device_event(&mut self, event: DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.input.process_mouse_motion(delta);
        }
    }
}
