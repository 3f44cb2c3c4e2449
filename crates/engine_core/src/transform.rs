//! Transform component and frame conversions.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Quat, Vec3};

/// A 3D transform representing position, rotation, and scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Create a new transform at the given position.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a new transform with position and rotation.
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..Default::default()
        }
    }

    /// Create the model matrix for this transform.
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Get the forward direction (negative Z in right-handed coordinates).
    pub fn forward(&self) -> Vec3 {
        self.rotation * -Vec3::Z
    }

    /// Get the right direction (positive X).
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Get the up direction (positive Y).
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Map a world-space point into this transform's local frame (scale ignored).
    pub fn point_to_local(&self, world: Vec3) -> Vec3 {
        self.rotation.inverse() * (world - self.position)
    }

    /// Map a local-frame point into world space (scale ignored).
    pub fn point_to_world(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * local
    }

    /// Rotate a local-frame direction into world space.
    pub fn vector_to_world(&self, local: Vec3) -> Vec3 {
        self.rotation * local
    }

    /// Translate the transform by a delta.
    pub fn translate(&mut self, delta: Vec3) {
        self.position += delta;
    }
}

/// Raw transform data for GPU upload (instance data).
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct TransformRaw {
    pub model: [[f32; 4]; 4],
}

impl From<&Transform> for TransformRaw {
    fn from(transform: &Transform) -> Self {
        Self {
            model: transform.to_matrix().to_cols_array_2d(),
        }
    }
}

impl From<Transform> for TransformRaw {
    fn from(transform: Transform) -> Self {
        Self::from(&transform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_world_point_roundtrip_under_rotation() {
        let t = Transform::from_position_rotation(
            Vec3::new(10.0, -2.0, 4.0),
            Quat::from_rotation_y(1.1) * Quat::from_rotation_x(0.3),
        );
        let p = Vec3::new(1.0, 2.0, 3.0);
        let back = t.point_to_world(t.point_to_local(p));
        assert!((back - p).length() < 1e-4);
    }

    #[test]
    fn basis_vectors_follow_rotation() {
        let t = Transform::from_position_rotation(Vec3::ZERO, Quat::from_rotation_y(std::f32::consts::FRAC_PI_2));
        // Yaw of +90° turns -Z forward into -X.
        assert!((t.forward() - Vec3::NEG_X).length() < 1e-5);
        assert!((t.up() - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn raw_matrix_carries_translation() {
        let raw = TransformRaw::from(Transform::from_position(Vec3::new(1.0, 2.0, 3.0)));
        assert_eq!(raw.model[3][0], 1.0);
        assert_eq!(raw.model[3][1], 2.0);
        assert_eq!(raw.model[3][2], 3.0);
    }
}
