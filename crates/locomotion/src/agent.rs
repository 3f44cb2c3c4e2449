//! Agent state carried between ticks.

use engine_core::{Timer, Transform};
use glam::{Quat, Vec2, Vec3};
use hecs::Entity;
use input::MoveIntent;
use physics::{ColliderHandle, RigidBodyHandle};
use scene::{CameraMode, NodeId};

/// How the agent is moving this tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LocomotionState {
    Grounded,
    #[default]
    Airborne,
    Swimming,
}

/// What defines "down" for an agent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GravityFrame {
    #[default]
    Planet,
    /// Walking inside a spaceship's interior.
    Vessel(Entity),
}

/// Vehicle occupancy of one agent.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Occupancy {
    #[default]
    Free,
    /// Interact pressed near `vehicle`; committed in the transition phase.
    Entering { vehicle: Entity },
    Occupying {
        vehicle: Entity,
        /// Camera mode to restore on exit, when this agent owns the camera.
        prior_camera: Option<CameraMode>,
    },
    /// Interact pressed while occupying; committed in the transition phase.
    Exiting {
        vehicle: Entity,
        prior_camera: Option<CameraMode>,
    },
    /// Re-entry is locked out until `remaining` runs out.
    ExitCooldown { remaining: f32 },
}

impl Occupancy {
    /// Vehicle the agent is in, or is about to leave.
    pub fn vehicle(&self) -> Option<Entity> {
        match *self {
            Occupancy::Occupying { vehicle, .. } | Occupancy::Exiting { vehicle, .. } => Some(vehicle),
            _ => None,
        }
    }
}

/// A walking, swimming or riding character.
#[derive(Debug, Clone, Copy)]
pub struct Agent {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Body orientation. Local −Z is forward, local +Y is up.
    pub orientation: Quat,
    /// Capsule radius.
    pub radius: f32,
    /// Total capsule height including both caps.
    pub height: f32,
    pub mass: f32,
    pub state: LocomotionState,
    /// Unit length. Points away from gravity when there is no surface evidence.
    pub last_surface_normal: Vec3,
    pub frame: GravityFrame,
    pub occupancy: Occupancy,
    /// View rotation decoupled from a spinning vessel.
    pub independent_aim: Option<Quat>,
    /// Camera pitch on top of the body orientation (radians).
    pub look_pitch: f32,
    pub jump_timer: Timer,
    /// Lower cap overlapped geometry on the last tick. Cleared while airborne.
    pub touching: bool,
    pub body: Option<RigidBodyHandle>,
    pub collider: Option<ColliderHandle>,
    pub node: Option<NodeId>,
}

impl Agent {
    pub const DEFAULT_RADIUS: f32 = 0.4;
    pub const DEFAULT_HEIGHT: f32 = 1.8;
    pub const DEFAULT_MASS: f32 = 80.0;

    /// Agent at `position` standing upright along `up`. No body or node yet.
    pub fn new(position: Vec3, orientation: Quat, up: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            orientation: orientation.normalize(),
            radius: Self::DEFAULT_RADIUS,
            height: Self::DEFAULT_HEIGHT,
            mass: Self::DEFAULT_MASS,
            state: LocomotionState::Airborne,
            last_surface_normal: up.try_normalize().unwrap_or(Vec3::Y),
            frame: GravityFrame::Planet,
            occupancy: Occupancy::Free,
            independent_aim: None,
            look_pitch: 0.0,
            jump_timer: Timer::default(),
            touching: false,
            body: None,
            collider: None,
            node: None,
        }
    }

    pub fn is_grounded(&self) -> bool {
        self.state == LocomotionState::Grounded
    }

    pub fn is_swimming(&self) -> bool {
        self.state == LocomotionState::Swimming
    }

    pub fn is_in_vehicle(&self) -> bool {
        self.occupancy.vehicle().is_some()
    }

    pub fn vehicle(&self) -> Option<Entity> {
        self.occupancy.vehicle()
    }

    pub fn half_height(&self) -> f32 {
        self.height * 0.5
    }

    /// Half height of the capsule's cylinder section.
    pub fn capsule_half_height(&self) -> f32 {
        (self.half_height() - self.radius).max(0.0)
    }

    /// Bottom of the capsule for the given gravity direction.
    pub fn feet(&self, down: Vec3) -> Vec3 {
        self.position + down * self.half_height()
    }

    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::NEG_Z
    }

    pub fn right(&self) -> Vec3 {
        self.orientation * Vec3::X
    }

    pub fn up(&self) -> Vec3 {
        self.orientation * Vec3::Y
    }

    /// World-space wish direction for a planar intent (x = strafe, y = forward).
    pub fn wish_direction(&self, planar: Vec2) -> Vec3 {
        self.right() * planar.x + self.forward() * planar.y
    }

    pub fn transform(&self) -> Transform {
        Transform::from_position_rotation(self.position, self.orientation)
    }
}

/// Per-tick input for one agent, written by the caller before `tick`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Controls {
    pub intent: MoveIntent,
    /// Look delta in radians (yaw, pitch).
    pub look: Vec2,
    /// Toggle the doors of the vessel the agent is in or piloting.
    pub toggle_door: bool,
    /// Cycle the camera mode (camera owner only).
    pub cycle_camera: bool,
}

impl Controls {
    /// Clear one-shot presses and the look delta, keeping held movement.
    pub fn consume_presses(&mut self) {
        self.intent.jump = false;
        self.intent.interact = false;
        self.look = Vec2::ZERO;
        self.toggle_door = false;
        self.cycle_camera = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feet_follow_gravity() {
        let agent = Agent::new(Vec3::new(0.0, 10.0, 0.0), Quat::IDENTITY, Vec3::Y);
        assert!((agent.feet(Vec3::NEG_Y) - Vec3::new(0.0, 9.1, 0.0)).length() < 1e-6);
        assert!((agent.capsule_half_height() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn degenerate_up_defaults_to_world_up() {
        let agent = Agent::new(Vec3::ZERO, Quat::IDENTITY, Vec3::ZERO);
        assert_eq!(agent.last_surface_normal, Vec3::Y);
        assert!(!agent.is_in_vehicle());
    }
}
