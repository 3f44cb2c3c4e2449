//! Moving, rotating frame for agents walking inside a spaceship.

use crate::vehicle::Spaceship;
use engine_core::{Transform, Velocity};
use glam::{Quat, Vec2, Vec3};
use physics::{PhysicsBackend, RigidBodyHandle};

/// Axis-aligned interior volume in the vessel's local frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteriorBounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl InteriorBounds {
    pub fn contains_local(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }
}

/// Vessel centre of mass and velocity, sampled once per tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VesselMotion {
    pub center: Vec3,
    pub velocity: Velocity,
}

impl VesselMotion {
    /// Velocity a point rigidly riding the vessel would have.
    pub fn inherited(&self, point: Vec3) -> Vec3 {
        self.velocity.at_point(self.center, point)
    }
}

/// Whether `position` counts as inside the vessel.
///
/// With the door closed only agents that were already inside stay inside,
/// so a closed hull cannot be walked into.
pub fn is_inside(ship: &Spaceship, vessel: &Transform, position: Vec3, was_inside: bool) -> bool {
    if !ship.interior.contains_local(vessel.point_to_local(position)) {
        return false;
    }
    was_inside || !ship.door.is_closed()
}

/// Up axis of the vessel floor in world space.
pub fn vessel_up(vessel: &Transform) -> Vec3 {
    vessel.up().try_normalize().unwrap_or(Vec3::Y)
}

/// Sample the vessel's motion from the backend. Missing bodies ride a still frame.
pub fn vessel_motion<B: PhysicsBackend + ?Sized>(backend: &B, body: Option<RigidBodyHandle>, vessel: &Transform) -> VesselMotion {
    let velocity = body
        .map(|b| {
            Velocity::with_angular(
                backend.linear_velocity(b).unwrap_or(Vec3::ZERO),
                backend.angular_velocity(b).unwrap_or(Vec3::ZERO),
            )
        })
        .unwrap_or_default();
    VesselMotion {
        center: vessel.position,
        velocity,
    }
}

/// Apply a look delta to a world-space aim that ignores vessel rotation.
pub fn steer_aim(aim: Quat, look: Vec2) -> Quat {
    (aim * Quat::from_rotation_y(-look.x) * Quat::from_rotation_x(-look.y)).normalize()
}

/// Keep the door colliders in step with the door state.
///
/// Panels are removed as soon as the door leaves `Closed` and recreated only
/// once it is `Closed` again.
pub fn sync_door_colliders<B: PhysicsBackend + ?Sized>(ship: &mut Spaceship, body: Option<RigidBodyHandle>, backend: &mut B) {
    if ship.door.is_closed() {
        let Some(body) = body else {
            return;
        };
        if ship.door_colliders.is_empty() {
            for panel in &ship.panels {
                let handle = backend.create_collider(Some(body), &Spaceship::panel_collider(panel));
                ship.door_colliders.push(handle);
            }
            log::debug!("door colliders restored ({})", ship.door_colliders.len());
        }
    } else if !ship.door_colliders.is_empty() {
        for handle in ship.door_colliders.drain(..) {
            backend.remove_collider(handle);
        }
        log::debug!("door colliders removed");
    }
}
