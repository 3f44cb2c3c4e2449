//! Physics backend abstraction.
//!
//! The locomotion core consumes physics exclusively through
//! [`PhysicsBackend`]. Every query is synchronous and every getter returns
//! `Option` so a body that has not been created yet (or was already removed)
//! degrades to a no-op instead of an error.

use crate::physics_world::{from_vector, to_isometry, to_rotation, to_vector};
use crate::{CollisionGroup, PhysicsWorld, RaycastHit};
use engine_core::{Quat, Transform, Vec3};
use rapier3d::prelude::*;

/// How a body is driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Dynamic,
    Fixed,
    KinematicVelocity,
}

/// Description of a rigid body to create.
#[derive(Debug, Clone, Copy)]
pub struct BodyDesc {
    pub kind: BodyKind,
    pub position: Vec3,
    pub rotation: Quat,
    /// Keep contacts from spinning the body; rotation is set explicitly.
    pub lock_rotations: bool,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub ccd: bool,
}

impl BodyDesc {
    /// Upright capsule agent whose orientation is owned by the controller.
    pub fn agent(position: Vec3, rotation: Quat) -> Self {
        Self {
            kind: BodyKind::Dynamic,
            position,
            rotation,
            lock_rotations: true,
            linear_damping: 0.0,
            angular_damping: 0.0,
            ccd: true,
        }
    }

    /// Free dynamic body (vehicles).
    pub fn dynamic(position: Vec3, rotation: Quat) -> Self {
        Self {
            kind: BodyKind::Dynamic,
            position,
            rotation,
            lock_rotations: false,
            linear_damping: 0.1,
            angular_damping: 1.0,
            ccd: false,
        }
    }
}

/// Collider geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColliderShape {
    /// Capsule along local Y. `half_height` excludes the caps.
    Capsule { half_height: f32, radius: f32 },
    Cuboid { half_extents: Vec3 },
    Ball { radius: f32 },
}

/// Description of a collider to create.
#[derive(Debug, Clone, Copy)]
pub struct ColliderDesc {
    pub shape: ColliderShape,
    /// Offset from the parent body in its local frame.
    pub offset: Vec3,
    pub group: CollisionGroup,
    pub sensor: bool,
    pub friction: f32,
}

impl ColliderDesc {
    pub fn new(shape: ColliderShape, group: CollisionGroup) -> Self {
        Self {
            shape,
            offset: Vec3::ZERO,
            group,
            sensor: false,
            friction: 0.5,
        }
    }

    pub fn with_offset(mut self, offset: Vec3) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }
}

/// Trait for physics backend implementations.
pub trait PhysicsBackend {
    /// Create a rigid body and return its handle.
    fn create_body(&mut self, desc: &BodyDesc) -> RigidBodyHandle;

    /// Create a collider, attached to `body` when given, fixed in world otherwise.
    fn create_collider(&mut self, body: Option<RigidBodyHandle>, desc: &ColliderDesc) -> ColliderHandle;

    /// Remove a collider. Unknown handles are ignored.
    fn remove_collider(&mut self, collider: ColliderHandle);

    /// Cast a ray and return the first hit, ignoring colliders of `exclude`.
    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        exclude: Option<RigidBodyHandle>,
    ) -> Option<RaycastHit>;

    /// Broad "touching geometry" test: does a sphere overlap anything but `exclude`?
    fn touching(&self, center: Vec3, radius: f32, exclude: Option<RigidBodyHandle>) -> bool;

    fn linear_velocity(&self, body: RigidBodyHandle) -> Option<Vec3>;
    fn set_linear_velocity(&mut self, body: RigidBodyHandle, velocity: Vec3);
    fn angular_velocity(&self, body: RigidBodyHandle) -> Option<Vec3>;
    fn set_angular_velocity(&mut self, body: RigidBodyHandle, velocity: Vec3);

    /// World transform of a body.
    fn transform(&self, body: RigidBodyHandle) -> Option<Transform>;
    fn set_position(&mut self, body: RigidBodyHandle, position: Vec3);
    fn set_rotation(&mut self, body: RigidBodyHandle, rotation: Quat);

    fn apply_impulse(&mut self, body: RigidBodyHandle, impulse: Vec3);
    fn apply_torque_impulse(&mut self, body: RigidBodyHandle, torque: Vec3);

    fn mass(&self, body: RigidBodyHandle) -> Option<f32>;

    /// Enable or disable a body (disabled bodies neither move nor collide).
    fn set_enabled(&mut self, body: RigidBodyHandle, enabled: bool);
    fn is_enabled(&self, body: RigidBodyHandle) -> bool;

    /// Advance the simulation by `dt` seconds.
    fn step(&mut self, dt: f32);
}

impl PhysicsBackend for PhysicsWorld {
    fn create_body(&mut self, desc: &BodyDesc) -> RigidBodyHandle {
        let builder = match desc.kind {
            BodyKind::Dynamic => RigidBodyBuilder::dynamic(),
            BodyKind::Fixed => RigidBodyBuilder::fixed(),
            BodyKind::KinematicVelocity => RigidBodyBuilder::kinematic_velocity_based(),
        };
        let mut builder = builder
            .position(to_isometry(desc.position, desc.rotation))
            .linear_damping(desc.linear_damping)
            .angular_damping(desc.angular_damping)
            .gravity_scale(0.0)
            .ccd_enabled(desc.ccd)
            .can_sleep(false);
        if desc.lock_rotations {
            builder = builder.lock_rotations();
        }
        self.rigid_body_set.insert(builder.build())
    }

    fn create_collider(&mut self, body: Option<RigidBodyHandle>, desc: &ColliderDesc) -> ColliderHandle {
        let builder = match desc.shape {
            ColliderShape::Capsule { half_height, radius } => ColliderBuilder::capsule_y(half_height, radius),
            ColliderShape::Cuboid { half_extents } => {
                ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            }
            ColliderShape::Ball { radius } => ColliderBuilder::ball(radius),
        };
        let collider = builder
            .position(to_isometry(desc.offset, Quat::IDENTITY))
            .collision_groups(desc.group.interaction_groups())
            .sensor(desc.sensor)
            .friction(desc.friction)
            .build();
        let handle = match body {
            Some(parent) if self.rigid_body_set.contains(parent) => {
                self.collider_set
                    .insert_with_parent(collider, parent, &mut self.rigid_body_set)
            }
            Some(parent) => {
                log::debug!("collider parent {:?} missing, inserting detached", parent);
                self.collider_set.insert(collider)
            }
            None => self.collider_set.insert(collider),
        };
        self.update_query_pipeline();
        handle
    }

    fn remove_collider(&mut self, collider: ColliderHandle) {
        if self.collider_set.contains(collider) {
            PhysicsWorld::remove_collider(self, collider);
        }
    }

    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        exclude: Option<RigidBodyHandle>,
    ) -> Option<RaycastHit> {
        self.raycast(origin, direction, max_distance, exclude)
    }

    fn touching(&self, center: Vec3, radius: f32, exclude: Option<RigidBodyHandle>) -> bool {
        self.overlaps_sphere(center, radius, exclude)
    }

    fn linear_velocity(&self, body: RigidBodyHandle) -> Option<Vec3> {
        self.rigid_body_set.get(body).map(|b| from_vector(b.linvel()))
    }

    fn set_linear_velocity(&mut self, body: RigidBodyHandle, velocity: Vec3) {
        if let Some(b) = self.rigid_body_set.get_mut(body) {
            b.set_linvel(to_vector(velocity), true);
        }
    }

    fn angular_velocity(&self, body: RigidBodyHandle) -> Option<Vec3> {
        self.rigid_body_set.get(body).map(|b| from_vector(b.angvel()))
    }

    fn set_angular_velocity(&mut self, body: RigidBodyHandle, velocity: Vec3) {
        if let Some(b) = self.rigid_body_set.get_mut(body) {
            b.set_angvel(to_vector(velocity), true);
        }
    }

    fn transform(&self, body: RigidBodyHandle) -> Option<Transform> {
        self.get_body_transform(body)
    }

    fn set_position(&mut self, body: RigidBodyHandle, position: Vec3) {
        if let Some(b) = self.rigid_body_set.get_mut(body) {
            b.set_translation(to_vector(position), true);
        }
    }

    fn set_rotation(&mut self, body: RigidBodyHandle, rotation: Quat) {
        if let Some(b) = self.rigid_body_set.get_mut(body) {
            b.set_rotation(to_rotation(rotation), true);
        }
    }

    fn apply_impulse(&mut self, body: RigidBodyHandle, impulse: Vec3) {
        if let Some(b) = self.rigid_body_set.get_mut(body) {
            b.apply_impulse(to_vector(impulse), true);
        }
    }

    fn apply_torque_impulse(&mut self, body: RigidBodyHandle, torque: Vec3) {
        if let Some(b) = self.rigid_body_set.get_mut(body) {
            b.apply_torque_impulse(to_vector(torque), true);
        }
    }

    fn mass(&self, body: RigidBodyHandle) -> Option<f32> {
        self.rigid_body_set.get(body).map(|b| b.mass())
    }

    fn set_enabled(&mut self, body: RigidBodyHandle, enabled: bool) {
        if let Some(b) = self.rigid_body_set.get_mut(body) {
            b.set_enabled(enabled);
        }
    }

    fn is_enabled(&self, body: RigidBodyHandle) -> bool {
        self.rigid_body_set.get(body).is_some_and(|b| b.is_enabled())
    }

    fn step(&mut self, dt: f32) {
        self.step_dt(dt);
    }
}
