//! Input handling: per-frame key state and the normalized movement intent.

use glam::Vec2;
use std::collections::HashSet;

/// Normalized movement intent consumed by the locomotion core.
///
/// `jump` and `interact` are edge-triggered (true only on the press frame);
/// everything else is level-triggered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveIntent {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub sprint: bool,
    pub interact: bool,
    pub roll_left: bool,
    pub roll_right: bool,
}

impl MoveIntent {
    /// Planar wish as a normalized vector: x = strafe (right +), y = forward (+).
    pub fn planar(&self) -> Vec2 {
        let mut movement = Vec2::ZERO;
        if self.forward {
            movement.y += 1.0;
        }
        if self.back {
            movement.y -= 1.0;
        }
        if self.left {
            movement.x -= 1.0;
        }
        if self.right {
            movement.x += 1.0;
        }
        movement.normalize_or_zero()
    }

    /// Roll axis: -1 left, +1 right.
    pub fn roll(&self) -> f32 {
        (self.roll_right as i32 - self.roll_left as i32) as f32
    }

    /// Whether any directional key is held.
    pub fn is_moving(&self) -> bool {
        self.planar() != Vec2::ZERO
    }
}

/// Manages input state for the current frame.
#[derive(Debug, Default)]
pub struct InputState {
    /// Keys currently held down.
    keys_held: HashSet<KeyCode>,
    /// Keys pressed this frame.
    keys_pressed: HashSet<KeyCode>,
    /// Keys released this frame.
    keys_released: HashSet<KeyCode>,

    /// Mouse movement delta this frame.
    mouse_delta: Vec2,
    /// Accumulated mouse delta until the next frame begins.
    accumulated_delta: Vec2,

    /// Whether the cursor is captured/locked.
    cursor_locked: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear per-frame state. Call at the start of each frame.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
        self.keys_released.clear();
        self.mouse_delta = self.accumulated_delta;
        self.accumulated_delta = Vec2::ZERO;
    }

    /// Process a keyboard event.
    pub fn process_keyboard(&mut self, key: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if !self.keys_held.contains(&key) {
                    self.keys_pressed.insert(key);
                }
                self.keys_held.insert(key);
            }
            ElementState::Released => {
                self.keys_held.remove(&key);
                self.keys_released.insert(key);
            }
        }
    }

    /// Process mouse movement.
    pub fn process_mouse_motion(&mut self, delta: (f64, f64)) {
        self.accumulated_delta.x += delta.0 as f32;
        self.accumulated_delta.y += delta.1 as f32;
    }

    /// Check if a key is currently held.
    pub fn is_key_held(&self, key: KeyCode) -> bool {
        self.keys_held.contains(&key)
    }

    /// Check if a key was pressed this frame.
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Check if a key was released this frame.
    pub fn is_key_released(&self, key: KeyCode) -> bool {
        self.keys_released.contains(&key)
    }

    /// Check if the cursor is locked.
    pub fn is_cursor_locked(&self) -> bool {
        self.cursor_locked
    }

    /// Set cursor lock state.
    pub fn set_cursor_locked(&mut self, locked: bool) {
        self.cursor_locked = locked;
    }

    /// Mouse look delta in radians (yaw, pitch). Zero while the cursor is free.
    pub fn look_delta(&self, sensitivity: f32) -> Vec2 {
        if self.cursor_locked {
            self.mouse_delta * sensitivity
        } else {
            Vec2::ZERO
        }
    }

    /// Check if the camera mode toggle was pressed (C).
    pub fn is_camera_toggle_pressed(&self) -> bool {
        self.is_key_pressed(KeyCode::KeyC)
    }

    /// Check if the vessel door toggle was pressed (F).
    pub fn is_door_toggle_pressed(&self) -> bool {
        self.is_key_pressed(KeyCode::KeyF)
    }

    /// Build the movement intent for this frame (WASD, Space, Shift, E, Q/R roll).
    pub fn intent(&self) -> MoveIntent {
        MoveIntent {
            forward: self.is_key_held(KeyCode::KeyW),
            back: self.is_key_held(KeyCode::KeyS),
            left: self.is_key_held(KeyCode::KeyA),
            right: self.is_key_held(KeyCode::KeyD),
            jump: self.is_key_pressed(KeyCode::Space),
            sprint: self.is_key_held(KeyCode::ShiftLeft) || self.is_key_held(KeyCode::ShiftRight),
            interact: self.is_key_pressed(KeyCode::KeyE),
            roll_left: self.is_key_held(KeyCode::KeyQ),
            roll_right: self.is_key_held(KeyCode::KeyR),
        }
    }
}

// Re-export for convenience
pub use winit::event::ElementState;
pub use winit::keyboard::KeyCode;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jump_and_interact_are_edge_triggered() {
        let mut input = InputState::new();
        input.process_keyboard(KeyCode::Space, ElementState::Pressed);
        input.process_keyboard(KeyCode::KeyE, ElementState::Pressed);
        assert!(input.intent().jump);
        assert!(input.intent().interact);

        input.begin_frame();
        // Still held, but no longer a fresh press.
        assert!(!input.intent().jump);
        assert!(!input.intent().interact);
        assert!(input.is_key_held(KeyCode::Space));
    }

    #[test]
    fn diagonal_wish_is_normalized() {
        let intent = MoveIntent {
            forward: true,
            right: true,
            ..Default::default()
        };
        assert!((intent.planar().length() - 1.0).abs() < 1e-6);
        assert!(intent.is_moving());
    }

    #[test]
    fn opposing_keys_cancel() {
        let intent = MoveIntent {
            forward: true,
            back: true,
            ..Default::default()
        };
        assert_eq!(intent.planar(), Vec2::ZERO);
        assert!(!intent.is_moving());
    }

    #[test]
    fn look_requires_locked_cursor() {
        let mut input = InputState::new();
        input.process_mouse_motion((10.0, -4.0));
        input.begin_frame();
        assert_eq!(input.look_delta(0.01), Vec2::ZERO);
        input.set_cursor_locked(true);
        assert!((input.look_delta(0.01) - Vec2::new(0.1, -0.04)).length() < 1e-6);
    }

    #[test]
    fn roll_axis() {
        let intent = MoveIntent {
            roll_left: true,
            ..Default::default()
        };
        assert_eq!(intent.roll(), -1.0);
    }
}
