//! Shared fixtures for the unit tests.

use crate::align::basis_rotation;
use crate::Agent;
use glam::Vec3;
use physics::{BodyDesc, ColliderDesc, ColliderShape, CollisionGroup, PhysicsBackend, PhysicsWorld};

/// Physics world with a static planet of `radius` at the origin.
pub(crate) fn planet_world(radius: f32) -> PhysicsWorld {
    let mut world = PhysicsWorld::new();
    world.add_static_ball(Vec3::ZERO, radius);
    world
}

/// Agent upright along `up` at `position`, with a capsule body in `world`.
pub(crate) fn agent_on(world: &mut PhysicsWorld, position: Vec3, up: Vec3) -> Agent {
    let mut agent = Agent::new(position, basis_rotation(Vec3::NEG_Z, up), up);
    let body = world.create_body(&BodyDesc::agent(position, agent.orientation));
    let collider = world.create_collider(
        Some(body),
        &ColliderDesc::new(
            ColliderShape::Capsule {
                half_height: agent.capsule_half_height(),
                radius: agent.radius,
            },
            CollisionGroup::Agent,
        ),
    );
    agent.body = Some(body);
    agent.collider = Some(collider);
    agent
}
