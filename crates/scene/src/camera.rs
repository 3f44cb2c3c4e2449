//! Camera with first-person, third-person and orbit views.
//!
//! The camera never owns a rotation of its own in first/third person: it
//! follows its parent node's transform, the owning agent's look pitch, and
//! (inside a spinning vessel) an independent aim quaternion.

use crate::NodeId;
use engine_core::Transform;
use glam::{Mat4, Quat, Vec3};

/// How the camera is placed relative to its parent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CameraMode {
    #[default]
    FirstPerson,
    ThirdPerson,
    Orbit,
}

impl CameraMode {
    /// Cycle to the next mode.
    pub fn next(self) -> Self {
        match self {
            CameraMode::FirstPerson => CameraMode::ThirdPerson,
            CameraMode::ThirdPerson => CameraMode::Orbit,
            CameraMode::Orbit => CameraMode::FirstPerson,
        }
    }
}

/// Camera with configurable FOV and clipping planes.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Camera world transform, recomputed by [`Camera::follow`].
    pub transform: Transform,
    /// Field of view in degrees.
    pub fov_degrees: f32,
    /// Near clipping plane.
    pub near: f32,
    /// Far clipping plane.
    pub far: f32,
    /// Aspect ratio (width / height).
    pub aspect: f32,
    /// Mouse sensitivity for orbit controls.
    pub sensitivity: f32,
    /// Current placement mode.
    pub mode: CameraMode,
    /// Eye height above the parent origin along its up axis.
    pub eye_height: f32,
    /// Distance behind the parent in third person.
    pub follow_distance: f32,
    /// Distance from the parent in orbit mode.
    pub orbit_distance: f32,
    /// Node the camera is attached to.
    parent: Option<NodeId>,
    /// Orbit yaw relative to the parent, radians.
    orbit_yaw: f32,
    /// Orbit pitch relative to the parent, radians.
    orbit_pitch: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            transform: Transform::default(),
            fov_degrees: 70.0,
            near: 0.1,
            far: 5000.0,
            aspect: 16.0 / 9.0,
            sensitivity: 0.002,
            mode: CameraMode::FirstPerson,
            eye_height: 0.7,
            follow_distance: 6.0,
            orbit_distance: 12.0,
            parent: None,
            orbit_yaw: 0.0,
            orbit_pitch: -0.3,
        }
    }
}

impl Camera {
    /// Update aspect ratio (call on window resize).
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    /// Node the camera currently follows.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub(crate) fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    /// Mouse movement in orbit mode swings the camera around its parent.
    pub fn process_orbit(&mut self, delta_x: f32, delta_y: f32) {
        self.orbit_by(delta_x * self.sensitivity, delta_y * self.sensitivity);
    }

    /// Swing the orbit camera by angles in radians. Ignored outside orbit mode.
    pub fn orbit_by(&mut self, yaw: f32, pitch: f32) {
        if self.mode != CameraMode::Orbit {
            return;
        }
        self.orbit_yaw -= yaw;
        self.orbit_pitch -= pitch;

        // Clamp pitch to prevent flipping
        let max_pitch = std::f32::consts::FRAC_PI_2 - 0.01;
        self.orbit_pitch = self.orbit_pitch.clamp(-max_pitch, max_pitch);
    }

    /// Place the camera relative to its parent transform.
    ///
    /// `aim`, when present, replaces the parent-derived view rotation so a
    /// spinning parent does not spin the view.
    pub fn follow(&mut self, parent: &Transform, look_pitch: f32, aim: Option<Quat>) {
        let up = parent.up();
        let eye = parent.position + up * self.eye_height;
        let view = aim.unwrap_or(parent.rotation * Quat::from_rotation_x(look_pitch));

        let (position, rotation) = match self.mode {
            CameraMode::FirstPerson => (eye, view),
            CameraMode::ThirdPerson => (eye + (view * Vec3::Z) * self.follow_distance, view),
            CameraMode::Orbit => {
                let rotation = parent.rotation
                    * Quat::from_rotation_y(self.orbit_yaw)
                    * Quat::from_rotation_x(self.orbit_pitch);
                (parent.position + (rotation * Vec3::Z) * self.orbit_distance, rotation)
            }
        };

        if position.is_finite() && rotation.is_finite() {
            self.transform.position = position;
            self.transform.rotation = rotation.normalize();
        }
    }

    /// Get the view matrix. Uses the camera's own up so curved worlds stay level.
    pub fn view_matrix(&self) -> Mat4 {
        let eye = self.transform.position;
        let target = eye + self.transform.forward();
        Mat4::look_at_rh(eye, target, self.transform.up())
    }

    /// Get the projection matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    /// Get the combined view-projection matrix.
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Get camera position.
    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    /// Get camera forward direction.
    pub fn forward(&self) -> Vec3 {
        self.transform.forward()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modes_cycle() {
        let mode = CameraMode::FirstPerson;
        assert_eq!(mode.next(), CameraMode::ThirdPerson);
        assert_eq!(mode.next().next(), CameraMode::Orbit);
        assert_eq!(mode.next().next().next(), CameraMode::FirstPerson);
    }

    #[test]
    fn first_person_sits_at_eye_height_along_parent_up() {
        let mut cam = Camera::default();
        // Parent standing on the +X side of a planet: up is +X.
        let parent = Transform::from_position_rotation(
            Vec3::new(50.0, 0.0, 0.0),
            Quat::from_rotation_z(-std::f32::consts::FRAC_PI_2),
        );
        cam.follow(&parent, 0.0, None);
        let expected = Vec3::new(50.0 + cam.eye_height, 0.0, 0.0);
        assert!((cam.position() - expected).length() < 1e-4);
    }

    #[test]
    fn third_person_stays_behind_parent() {
        let mut cam = Camera {
            mode: CameraMode::ThirdPerson,
            ..Default::default()
        };
        let parent = Transform::from_position(Vec3::ZERO);
        cam.follow(&parent, 0.0, None);
        // Forward is -Z, so behind is +Z.
        assert!(cam.position().z > cam.follow_distance - 1e-3);
    }

    #[test]
    fn independent_aim_ignores_parent_spin() {
        let mut cam = Camera::default();
        let aim = Quat::from_rotation_y(0.5);
        let spun = Transform::from_position_rotation(Vec3::ZERO, Quat::from_rotation_y(2.0));
        cam.follow(&spun, 0.0, Some(aim));
        assert!(cam.transform.rotation.angle_between(aim) < 1e-4);
    }

    #[test]
    fn orbit_input_ignored_outside_orbit_mode() {
        let mut cam = Camera::default();
        cam.process_orbit(100.0, 100.0);
        let parent = Transform::default();
        let before = {
            let mut c = cam.clone();
            c.mode = CameraMode::Orbit;
            c.follow(&parent, 0.0, None);
            c.transform
        };
        let mut fresh = Camera {
            mode: CameraMode::Orbit,
            ..Default::default()
        };
        fresh.follow(&parent, 0.0, None);
        assert_eq!(before, fresh.transform);
    }
}
