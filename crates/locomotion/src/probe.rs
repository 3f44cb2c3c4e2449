//! Three-ray ground probe under the agent's feet.

use crate::config::ProbeConfig;
use crate::{Agent, GravitySample};
use glam::Vec3;
use physics::{PhysicsBackend, RaycastHit};

/// One ray hit, valid for the current tick only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    pub point: Vec3,
    pub normal: Vec3,
    /// Distance along the ray.
    pub toi: f32,
}

impl From<RaycastHit> for SurfaceHit {
    fn from(hit: RaycastHit) -> Self {
        Self {
            point: hit.point,
            normal: hit.normal,
            toi: hit.distance,
        }
    }
}

/// Hits of the left, centre and right rays.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProbeHits {
    pub left: Option<SurfaceHit>,
    pub center: Option<SurfaceHit>,
    pub right: Option<SurfaceHit>,
}

impl ProbeHits {
    pub fn any(&self) -> bool {
        self.left.is_some() || self.center.is_some() || self.right.is_some()
    }

    pub fn count(&self) -> usize {
        [self.left, self.center, self.right].iter().flatten().count()
    }

    /// Only the side rays hit: the agent is straddling an edge or a gap.
    pub fn straddling_edge(&self) -> bool {
        self.center.is_none() && (self.left.is_some() || self.right.is_some())
    }

    /// Centre normal if it hit, otherwise the average of the side normals.
    pub fn surface_normal(&self) -> Option<Vec3> {
        if let Some(center) = self.center {
            return Some(center.normal);
        }
        let sum: Vec3 = [self.left, self.right].iter().flatten().map(|h| h.normal).sum();
        sum.try_normalize()
    }
}

/// Cast the three probe rays along gravity, ignoring the agent's own body.
///
/// An agent without a physics body yields no hits.
pub fn probe<B: PhysicsBackend + ?Sized>(
    agent: &Agent,
    gravity: &GravitySample,
    backend: &B,
    cfg: &ProbeConfig,
) -> ProbeHits {
    let Some(body) = agent.body else {
        return ProbeHits::default();
    };
    let down = gravity.direction;
    let lift = cfg.lift.max(0.0);
    let length = cfg.length_factor * agent.radius + lift;
    let center = agent.feet(down) - down * lift;
    let side = side_axis(agent, down) * (cfg.spread * agent.radius);

    let cast = |origin: Vec3| backend.cast_ray(origin, down, length, Some(body)).map(SurfaceHit::from);
    ProbeHits {
        left: cast(center - side),
        center: cast(center),
        right: cast(center + side),
    }
}

/// The agent's right axis flattened onto the gravity plane.
fn side_axis(agent: &Agent, down: Vec3) -> Vec3 {
    let right = agent.right();
    (right - down * right.dot(down))
        .try_normalize()
        .unwrap_or_else(|| down.any_orthonormal_vector())
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
    fn standing_agent_hits_with_all_rays() {
        let mut world = planet_world(10.0);
        let agent = agent_on(&mut world, Vec3::new(0.0, 10.0 + 0.9 + 0.02, 0.0), Vec3::Y);
        let hits = probe(&agent, &down(), &world, &ProbeConfig::default());
        assert_eq!(hits.count(), 3);
        assert!(!hits.straddling_edge());
        let n = hits.surface_normal().unwrap();
        assert!((n - Vec3::Y).length() < 1e-3);
        assert!(hits.center.unwrap().toi < 0.1);
    }

    #[test]
    fn airborne_agent_hits_nothing() {
        let mut world = planet_world(10.0);
        let agent = agent_on(&mut world, Vec3::new(0.0, 14.0, 0.0), Vec3::Y);
        let hits = probe(&agent, &down(), &world, &ProbeConfig::default());
        assert!(!hits.any());
        assert_eq!(hits.surface_normal(), None);
    }

    #[test]
    fn gap_under_centre_is_an_edge() {
        let mut world = PhysicsWorld::new();
        let half = Vec3::new(0.4, 1.0, 2.0);
        world.add_static_cuboid(Vec3::new(0.55, -1.0, 0.0), Quat::IDENTITY, half);
        world.add_static_cuboid(Vec3::new(-0.55, -1.0, 0.0), Quat::IDENTITY, half);
        let agent = agent_on(&mut world, Vec3::new(0.0, 0.92, 0.0), Vec3::Y);

        let hits = probe(&agent, &down(), &world, &ProbeConfig::default());
        assert!(hits.center.is_none());
        assert!(hits.left.is_some() && hits.right.is_some());
        assert!(hits.straddling_edge());
        assert!((hits.surface_normal().unwrap() - Vec3::Y).length() < 1e-3);
    }

    #[test]
    fn agent_without_body_probes_nothing() {
        let world = planet_world(10.0);
        let agent = Agent::new(Vec3::new(0.0, 10.9, 0.0), Quat::IDENTITY, Vec3::Y);
        assert!(!probe(&agent, &down(), &world, &ProbeConfig::default()).any());
    }
}
