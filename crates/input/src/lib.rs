//! Input handling: window events are reduced into [`InputState`], and gameplay
//! reads one immutable [`InputSnapshot`] per frame.

use glam::Vec2;
use std::collections::HashSet;

/// Key and button bindings for the viewer.
pub mod bindings {
    use super::{KeyCode, MouseButton};

    pub const FORWARD: KeyCode = KeyCode::KeyW;
    pub const BACK: KeyCode = KeyCode::KeyS;
    pub const LEFT: KeyCode = KeyCode::KeyA;
    pub const RIGHT: KeyCode = KeyCode::KeyD;
    pub const JUMP: KeyCode = KeyCode::Space;
    pub const PAUSE: KeyCode = KeyCode::Escape;
    pub const WIREFRAME: KeyCode = KeyCode::KeyL;
    pub const BLOOM: KeyCode = KeyCode::KeyB;
    pub const BLOOM_VIEW: KeyCode = KeyCode::KeyC;
    pub const CYCLE_DEBUG_LIGHT: KeyCode = KeyCode::KeyO;
    pub const DUMP_POSITION: KeyCode = KeyCode::KeyM;
    pub const FIRE: MouseButton = MouseButton::Left;
}

/// Everything gameplay needs to know about input for one frame.
///
/// Held flags reflect the key table at snapshot time; `*_pressed` and toggle
/// flags are press edges seen since the previous frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputSnapshot {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub jump_pressed: bool,
    pub fire_held: bool,
    pub pause_pressed: bool,
    pub toggle_wireframe: bool,
    pub toggle_bloom: bool,
    pub toggle_bloom_view: bool,
    pub cycle_debug_light: bool,
    pub dump_position: bool,
    /// Raw mouse motion accumulated since the previous frame.
    pub mouse_delta: Vec2,
}

impl InputSnapshot {
    /// Movement intent as (strafe, forward) in {-1, 0, 1}.
    /// Forward wins over back and left wins over right when both are held.
    pub fn movement_axes(&self) -> Vec2 {
        let forward = if self.forward {
            1.0
        } else if self.back {
            -1.0
        } else {
            0.0
        };
        let strafe = if self.left {
            -1.0
        } else if self.right {
            1.0
        } else {
            0.0
        };
        Vec2::new(strafe, forward)
    }

    pub fn has_movement(&self) -> bool {
        self.forward || self.back || self.left || self.right
    }
}

/// Manages input state between frames.
#[derive(Debug, Default)]
pub struct InputState {
    /// Keys currently held down.
    keys_held: HashSet<KeyCode>,
    /// Keys pressed since the last frame.
    keys_pressed: HashSet<KeyCode>,

    mouse_held: HashSet<MouseButton>,
    mouse_pressed: HashSet<MouseButton>,

    /// Mouse motion accumulated since the last frame.
    accumulated_delta: Vec2,

    /// Whether the cursor is captured/locked.
    cursor_locked: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear per-frame edges and motion. Call after the frame has consumed its snapshot.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
        self.mouse_pressed.clear();
        self.accumulated_delta = Vec2::ZERO;
    }

    /// Process a keyboard event. Auto-repeat does not produce new press edges.
    pub fn process_keyboard(&mut self, key: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if self.keys_held.insert(key) {
                    self.keys_pressed.insert(key);
                }
            }
            ElementState::Released => {
                self.keys_held.remove(&key);
            }
        }
    }

    /// Process a mouse button event.
    pub fn process_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if self.mouse_held.insert(button) {
                    self.mouse_pressed.insert(button);
                }
            }
            ElementState::Released => {
                self.mouse_held.remove(&button);
            }
        }
    }

    /// Process raw mouse movement. Ignored unless the cursor is locked.
    pub fn process_mouse_motion(&mut self, delta: (f64, f64)) {
        if !self.cursor_locked {
            return;
        }
        self.accumulated_delta.x += delta.0 as f32;
        self.accumulated_delta.y += delta.1 as f32;
    }

    pub fn is_key_held(&self, key: KeyCode) -> bool {
        self.keys_held.contains(&key)
    }

    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    pub fn is_mouse_held(&self, button: MouseButton) -> bool {
        self.mouse_held.contains(&button)
    }

    pub fn is_cursor_locked(&self) -> bool {
        self.cursor_locked
    }

    pub fn set_cursor_locked(&mut self, locked: bool) {
        self.cursor_locked = locked;
        if !locked {
            self.accumulated_delta = Vec2::ZERO;
        }
    }

    /// Reduce the current key table into this frame's snapshot.
    pub fn snapshot(&self) -> InputSnapshot {
        use bindings::*;
        InputSnapshot {
            forward: self.is_key_held(FORWARD),
            back: self.is_key_held(BACK),
            left: self.is_key_held(LEFT),
            right: self.is_key_held(RIGHT),
            jump_pressed: self.is_key_pressed(JUMP),
            fire_held: self.is_mouse_held(FIRE),
            pause_pressed: self.is_key_pressed(PAUSE),
            toggle_wireframe: self.is_key_pressed(WIREFRAME),
            toggle_bloom: self.is_key_pressed(BLOOM),
            toggle_bloom_view: self.is_key_pressed(BLOOM_VIEW),
            cycle_debug_light: self.is_key_pressed(CYCLE_DEBUG_LIGHT),
            dump_position: self.is_key_pressed(DUMP_POSITION),
            mouse_delta: self.accumulated_delta,
        }
    }
}

// Re-export for convenience
pub use winit::event::{ElementState, MouseButton};
pub use winit::keyboard::KeyCode;
