//! Orientation alignment toward a desired up vector.

use crate::config::AlignConfig;
use glam::{Mat3, Quat, Vec3};

/// One alignment step.
#[derive(Debug, Clone, Copy)]
pub struct AlignRequest {
    pub current: Quat,
    /// Surface normal (or vessel up) to align to.
    pub desired_up: Vec3,
    /// Gravity up used to measure the slope of `desired_up`.
    pub reference_up: Vec3,
    /// The agent was grounded on the previous tick too.
    pub already_grounded: bool,
    /// Not standing on anything (airborne or swimming).
    pub airborne: bool,
}

/// Rotation whose local +Y is `up` and whose local −Z is `forward_hint`
/// flattened onto the plane perpendicular to `up`.
///
/// A hint parallel to `up` falls back to world −Z, then world +X.
pub fn basis_rotation(forward_hint: Vec3, up: Vec3) -> Quat {
    let up = up.try_normalize().unwrap_or(Vec3::Y);
    let flatten = |v: Vec3| (v - up * v.dot(up)).try_normalize();
    let forward = flatten(forward_hint)
        .or_else(|| flatten(Vec3::NEG_Z))
        .or_else(|| flatten(Vec3::X))
        .unwrap_or_else(|| up.any_orthonormal_vector());
    let right = forward.cross(up);
    Quat::from_mat3(&Mat3::from_cols(right, up, -forward)).normalize()
}

/// Slerp `current` toward the basis built on `desired_up`.
///
/// A `desired_up` more than `max_slope_degrees` away from `reference_up`
/// returns `current` untouched.
pub fn align(req: &AlignRequest, cfg: &AlignConfig) -> Quat {
    let slope = req.reference_up.angle_between(req.desired_up);
    if !slope.is_finite() || slope > cfg.max_slope_degrees.to_radians() {
        return req.current;
    }

    let forward = req.current * Vec3::NEG_Z;
    let target = basis_rotation(forward, req.desired_up);
    let rate = if req.airborne {
        cfg.airborne_rate
    } else if req.already_grounded {
        cfg.grounded_rate
    } else {
        cfg.landing_rate
    };

    let aligned = req.current.slerp(target, rate.clamp(0.0, 1.0)).normalize();
    if aligned.is_finite() {
        aligned
    } else {
        req.current
    }
}
