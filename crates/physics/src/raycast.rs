//! Raycasts and overlap queries used by ground probing.

use crate::physics_world::{from_vector, to_vector};
use crate::PhysicsWorld;
use engine_core::Vec3;
use rapier3d::prelude::*;

/// Result of a raycast query.
#[derive(Debug, Clone, Copy)]
pub struct RaycastHit {
    /// The collider that was hit.
    pub collider: ColliderHandle,
    /// Distance along the ray to the hit point (time of impact for a unit ray).
    pub distance: f32,
    /// World position of the hit.
    pub point: Vec3,
    /// Surface normal at the hit point.
    pub normal: Vec3,
}

fn query_filter(exclude: Option<RigidBodyHandle>) -> QueryFilter<'static> {
    let filter = QueryFilter::default().exclude_sensors();
    match exclude {
        Some(body) => filter.exclude_rigid_body(body),
        None => filter,
    }
}

impl PhysicsWorld {
    /// Cast a ray and return the first hit, ignoring sensors and `exclude`.
    ///
    /// A ray starting inside a solid reports a zero normal from Rapier; that
    /// case is reported with the normal facing back along the ray.
    pub fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        exclude: Option<RigidBodyHandle>,
    ) -> Option<RaycastHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO || max_distance <= 0.0 {
            return None;
        }
        let ray = Ray::new(point![origin.x, origin.y, origin.z], to_vector(direction));

        self.query_pipeline
            .cast_ray_and_get_normal(
                &self.rigid_body_set,
                &self.collider_set,
                &ray,
                max_distance,
                true,
                query_filter(exclude),
            )
            .map(|(collider, intersection)| {
                let point = ray.point_at(intersection.time_of_impact);
                let normal = from_vector(&intersection.normal);
                RaycastHit {
                    collider,
                    distance: intersection.time_of_impact,
                    point: Vec3::new(point.x, point.y, point.z),
                    normal: if normal.length_squared() > 0.5 { normal } else { -direction },
                }
            })
    }

    /// Whether a sphere at `center` overlaps any solid collider except `exclude`.
    pub fn overlaps_sphere(&self, center: Vec3, radius: f32, exclude: Option<RigidBodyHandle>) -> bool {
        let shape = Ball::new(radius.max(1e-3));
        let shape_pos = Isometry::translation(center.x, center.y, center.z);
        self.query_pipeline
            .intersection_with_shape(
                &self.rigid_body_set,
                &self.collider_set,
                &shape_pos,
                &shape,
                query_filter(exclude),
            )
            .is_some()
    }
}
