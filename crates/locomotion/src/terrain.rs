//! Ring sampling of the ground around the agent and slope look-ahead.

use crate::config::TerrainConfig;
use crate::{Agent, GravitySample};
use glam::Vec3;
use physics::PhysicsBackend;

/// Rays in the sampling ring.
pub const RING_SAMPLES: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainSample {
    pub position: Vec3,
    pub normal: Vec3,
    /// Angle between the normal and the gravity up (radians).
    pub angle: f32,
}

/// Ring samples of one tick. Fixed size so sampling never allocates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainReport {
    pub samples: [Option<TerrainSample>; RING_SAMPLES],
    pub average_normal: Vec3,
}

impl TerrainReport {
    pub fn hit_count(&self) -> usize {
        self.samples.iter().flatten().count()
    }

    /// Steepest sampled slope in radians, zero with no samples.
    pub fn max_angle(&self) -> f32 {
        self.samples.iter().flatten().map(|s| s.angle).fold(0.0, f32::max)
    }
}

/// Cast the ring of rays under the agent and average the hit normals.
///
/// Fewer than `min_samples` hits fall back to the agent's last surface normal.
pub fn sample<B: PhysicsBackend + ?Sized>(
    agent: &Agent,
    gravity: &GravitySample,
    backend: &B,
    cfg: &TerrainConfig,
) -> TerrainReport {
    let mut samples = [None; RING_SAMPLES];
    let fallback = TerrainReport {
        samples,
        average_normal: agent.last_surface_normal,
    };
    let Some(body) = agent.body else {
        return fallback;
    };

    let down = gravity.direction;
    let up = -down;
    let (tangent, bitangent) = ring_axes(agent, down);
    let ring_radius = cfg.ring_radius_factor * agent.radius;
    let lift = cfg.ring_lift_factor.max(0.0) * agent.radius;
    let length = cfg.ray_length_factor * agent.radius + lift;
    let center = agent.feet(down) - down * lift;

    let mut sum = Vec3::ZERO;
    let mut hits = 0;
    for (i, slot) in samples.iter_mut().enumerate() {
        let theta = i as f32 * std::f32::consts::TAU / RING_SAMPLES as f32;
        let origin = center + (tangent * theta.cos() + bitangent * theta.sin()) * ring_radius;
        if let Some(hit) = backend.cast_ray(origin, down, length, Some(body)) {
            sum += hit.normal;
            hits += 1;
            *slot = Some(TerrainSample {
                position: hit.point,
                normal: hit.normal,
                angle: up.angle_between(hit.normal),
            });
        }
    }

    let average_normal = if hits >= cfg.min_samples.max(1) {
        sum.try_normalize().unwrap_or(agent.last_surface_normal)
    } else {
        agent.last_surface_normal
    };
    TerrainReport {
        samples,
        average_normal,
    }
}

/// Blend `current` toward the normal found one step ahead along `move_dir`.
///
/// Returns `current` when there is no movement or the look-ahead ray misses.
pub fn anticipate<B: PhysicsBackend + ?Sized>(
    agent: &Agent,
    gravity: &GravitySample,
    current: Vec3,
    move_dir: Vec3,
    backend: &B,
    cfg: &TerrainConfig,
) -> Vec3 {
    let Some(body) = agent.body else {
        return current;
    };
    let down = gravity.direction;
    let Some(dir) = (move_dir - down * move_dir.dot(down)).try_normalize() else {
        return current;
    };
    let origin = agent.feet(down) + dir * cfg.anticipate_distance - down * cfg.anticipate_lift;
    let reach = cfg.anticipate_lift + cfg.anticipate_depth;
    match backend.cast_ray(origin, down, reach, Some(body)) {
        Some(hit) => current
            .lerp(hit.normal, cfg.anticipate_blend.clamp(0.0, 1.0))
            .try_normalize()
            .unwrap_or(current),
        None => current,
    }
}

/// Two unit axes spanning the plane perpendicular to `down`, the first along
/// the agent's flattened forward.
fn ring_axes(agent: &Agent, down: Vec3) -> (Vec3, Vec3) {
    let forward = agent.forward();
    let tangent = (forward - down * forward.dot(down))
        .try_normalize()
        .unwrap_or_else(|| down.any_orthonormal_vector());
    (tangent, down.cross(tangent))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{agent_on, planet_world};
    use glam::Quat;
    use physics::PhysicsWorld;

    fn down() -> GravitySample {
        GravitySample {
            direction: Vec3::NEG_Y,
            strength: 9.81,
        }
    }

    #[test]
    fn flat_ground_fills_the_ring() {
        let mut world = PhysicsWorld::new();
        world.add_static_cuboid(Vec3::new(0.0, -1.0, 0.0), Quat::IDENTITY, Vec3::new(10.0, 1.0, 10.0));
        let agent = agent_on(&mut world, Vec3::new(0.0, 0.92, 0.0), Vec3::Y);

        let report = sample(&agent, &down(), &world, &TerrainConfig::default());
        assert_eq!(report.hit_count(), RING_SAMPLES);
        assert!((report.average_normal - Vec3::Y).length() < 1e-4);
        assert!(report.max_angle() < 1e-3);
    }

    #[test]
    fn sparse_hits_fall_back_to_last_normal() {
        // Narrow beam under one edge of the ring only.
        let mut world = PhysicsWorld::new();
        world.add_static_cuboid(Vec3::new(0.0, -1.0, -0.3), Quat::IDENTITY, Vec3::new(0.05, 1.0, 0.05));
        let mut agent = agent_on(&mut world, Vec3::new(0.0, 0.92, 0.0), Vec3::Y);
        let last = Vec3::new(0.0, 1.0, 0.2).normalize();
        agent.last_surface_normal = last;

        let report = sample(&agent, &down(), &world, &TerrainConfig::default());
        assert!(report.hit_count() < 3);
        assert_eq!(report.average_normal, last);
    }

    #[test]
    fn planet_ring_averages_to_radial_up() {
        let mut world = planet_world(20.0);
        let up = Vec3::new(1.0, 1.0, 0.0).normalize();
        let agent = agent_on(&mut world, up * (20.0 + 0.92), up);
        let gravity = GravitySample {
            direction: -up,
            strength: 9.81,
        };
        let report = sample(&agent, &gravity, &world, &TerrainConfig::default());
        assert_eq!(report.hit_count(), RING_SAMPLES);
        assert!(report.average_normal.angle_between(up) < 0.01);
    }

    #[test]
    fn anticipation_leans_toward_upcoming_slope() {
        let mut world = PhysicsWorld::new();
        world.add_static_cuboid(Vec3::new(0.0, -1.0, 0.0), Quat::IDENTITY, Vec3::new(1.0, 1.0, 1.0));
        // A 30° ramp starting just ahead along -Z.
        let ramp = Quat::from_rotation_x(std::f32::consts::FRAC_PI_6);
        world.add_static_cuboid(Vec3::new(0.0, -1.0, -3.0), ramp, Vec3::new(1.0, 1.0, 2.0));
        let agent = agent_on(&mut world, Vec3::new(0.0, 0.92, 0.0), Vec3::Y);
        let cfg = TerrainConfig {
            anticipate_distance: 2.5,
            anticipate_lift: 2.0,
            anticipate_depth: 2.0,
            ..Default::default()
        };

        let ahead = anticipate(&agent, &down(), Vec3::Y, Vec3::NEG_Z, &world, &cfg);
        let slope_normal = ramp * Vec3::Y;
        assert!(ahead.angle_between(Vec3::Y) > 0.05);
        assert!(ahead.angle_between(slope_normal) < Vec3::Y.angle_between(slope_normal));
        assert!((ahead.length() - 1.0).abs() < 1e-5);

        let idle = anticipate(&agent, &down(), Vec3::Y, Vec3::ZERO, &world, &cfg);
        assert_eq!(idle, Vec3::Y);
    }
}
