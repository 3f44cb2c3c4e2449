//! Vehicles and the spaceship door animation.

use crate::config::{LocomotionConfig, OccupancyConfig};
use crate::vessel::InteriorBounds;
use glam::Vec3;
use hecs::{Entity, World};
use physics::{ColliderDesc, ColliderHandle, ColliderShape, CollisionGroup, RigidBodyHandle};
use scene::{CameraMode, NodeId};

/// Door animation state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DoorState {
    #[default]
    Closed,
    Opening,
    Open,
    Closing,
}

/// Emitted by [`DoorAnimator::update`] when an animation finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorEvent {
    Opened,
    Closed,
}

/// Door open/close animation driven by delta time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoorAnimator {
    state: DoorState,
    /// Linear animation time in [0, 1]; 0 is closed.
    t: f32,
    /// Seconds for a full open or close.
    duration: f32,
}

impl DoorAnimator {
    pub fn new(duration: f32) -> Self {
        Self {
            state: DoorState::Closed,
            t: 0.0,
            duration: duration.max(1e-3),
        }
    }

    pub fn state(&self) -> DoorState {
        self.state
    }

    /// Eased progress in [0, 1]; 0 is fully closed.
    pub fn progress(&self) -> f32 {
        ease_in_out_cubic(self.t)
    }

    pub fn is_closed(&self) -> bool {
        self.state == DoorState::Closed
    }

    /// Reverse or start the animation. Mid-animation toggles turn around in place.
    pub fn toggle(&mut self) {
        self.state = match self.state {
            DoorState::Closed | DoorState::Closing => DoorState::Opening,
            DoorState::Open | DoorState::Opening => DoorState::Closing,
        };
    }

    /// Advance by `dt` seconds.
    pub fn update(&mut self, dt: f32) -> Option<DoorEvent> {
        let step = dt.max(0.0) / self.duration;
        match self.state {
            DoorState::Opening => {
                self.t = (self.t + step).min(1.0);
                if self.t >= 1.0 {
                    self.state = DoorState::Open;
                    return Some(DoorEvent::Opened);
                }
            }
            DoorState::Closing => {
                self.t = (self.t - step).max(0.0);
                if self.t <= 0.0 {
                    self.state = DoorState::Closed;
                    return Some(DoorEvent::Closed);
                }
            }
            DoorState::Closed | DoorState::Open => {}
        }
        None
    }
}

fn ease_in_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// A door panel in the ship's local frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoorPanel {
    pub offset: Vec3,
    pub half_extents: Vec3,
}

/// Crewed vessel with a walkable interior.
#[derive(Debug, Clone, PartialEq)]
pub struct Spaceship {
    pub door: DoorAnimator,
    pub interior: InteriorBounds,
    pub panels: Vec<DoorPanel>,
    /// Colliders of the panels; non-empty only while the door is closed.
    pub door_colliders: Vec<ColliderHandle>,
}

impl Spaceship {
    /// Floor half extents of the standard hull.
    pub const FLOOR_HALF_EXTENTS: Vec3 = Vec3::new(4.0, 0.2, 8.0);
    /// Floor centre in the hull frame.
    pub const FLOOR_OFFSET: Vec3 = Vec3::new(0.0, -1.7, 0.0);

    /// Standard hull: an interior box with a rear door made of two panels.
    pub fn new(door_duration: f32) -> Self {
        Self {
            door: DoorAnimator::new(door_duration),
            interior: InteriorBounds {
                min: Vec3::new(-4.0, -1.5, -8.0),
                max: Vec3::new(4.0, 2.5, 8.0),
            },
            panels: vec![
                DoorPanel {
                    offset: Vec3::new(-2.0, 0.5, 8.0),
                    half_extents: Vec3::new(2.0, 2.0, 0.1),
                },
                DoorPanel {
                    offset: Vec3::new(2.0, 0.5, 8.0),
                    half_extents: Vec3::new(2.0, 2.0, 0.1),
                },
            ],
            door_colliders: Vec::new(),
        }
    }

    pub fn panel_collider(panel: &DoorPanel) -> ColliderDesc {
        ColliderDesc::new(
            ColliderShape::Cuboid {
                half_extents: panel.half_extents,
            },
            CollisionGroup::VesselDoor,
        )
        .with_offset(panel.offset)
    }
}

/// Closed set of vehicle kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum VehicleKind {
    Car,
    Airplane,
    Spaceship(Spaceship),
}

impl VehicleKind {
    pub fn spaceship(cfg: &LocomotionConfig) -> Self {
        VehicleKind::Spaceship(Spaceship::new(cfg.door.duration))
    }

    pub fn name(&self) -> &'static str {
        match self {
            VehicleKind::Car => "car",
            VehicleKind::Airplane => "airplane",
            VehicleKind::Spaceship(_) => "spaceship",
        }
    }

    /// Exit point in the vehicle's local frame.
    pub fn exit_offset(&self, cfg: &OccupancyConfig) -> Vec3 {
        match self {
            VehicleKind::Car => cfg.car_exit_offset,
            VehicleKind::Airplane => cfg.airplane_exit_offset,
            VehicleKind::Spaceship(_) => cfg.spaceship_exit_offset,
        }
    }

    /// Camera mode while occupying.
    pub fn camera_mode(&self) -> CameraMode {
        match self {
            VehicleKind::Car | VehicleKind::Airplane => CameraMode::ThirdPerson,
            VehicleKind::Spaceship(_) => CameraMode::FirstPerson,
        }
    }

    /// The occupant's view is decoupled from the vehicle's rotation.
    pub fn independent_aim(&self) -> bool {
        matches!(self, VehicleKind::Spaceship(_))
    }

    /// Receives planetary gravity every tick.
    pub fn feels_planet_gravity(&self) -> bool {
        !matches!(self, VehicleKind::Spaceship(_))
    }

    /// Hull colliders in the body frame (door panels are managed separately).
    pub fn hull(&self) -> ColliderDesc {
        let shape = match self {
            VehicleKind::Car => ColliderShape::Cuboid {
                half_extents: Vec3::new(1.0, 0.6, 2.2),
            },
            VehicleKind::Airplane => ColliderShape::Cuboid {
                half_extents: Vec3::new(3.5, 0.6, 3.0),
            },
            VehicleKind::Spaceship(_) => ColliderShape::Cuboid {
                half_extents: Spaceship::FLOOR_HALF_EXTENTS,
            },
        };
        let desc = ColliderDesc::new(shape, CollisionGroup::Vehicle);
        match self {
            VehicleKind::Spaceship(_) => desc.with_offset(Spaceship::FLOOR_OFFSET),
            _ => desc,
        }
    }
}

/// Vehicle component. At most one occupant at a time.
#[derive(Debug, Clone, PartialEq)]
pub struct Vehicle {
    pub kind: VehicleKind,
    pub occupant: Option<Entity>,
    pub body: Option<RigidBodyHandle>,
    pub node: Option<NodeId>,
}

impl Vehicle {
    pub fn new(kind: VehicleKind) -> Self {
        Self {
            kind,
            occupant: None,
            body: None,
            node: None,
        }
    }

    /// The occupant, unless it has been despawned from `world`.
    pub fn live_occupant(&self, world: &World) -> Option<Entity> {
        self.occupant.filter(|&agent| world.contains(agent))
    }

    pub fn is_occupied(&self, world: &World) -> bool {
        self.live_occupant(world).is_some()
    }

    pub fn spaceship(&self) -> Option<&Spaceship> {
        match &self.kind {
            VehicleKind::Spaceship(ship) => Some(ship),
            _ => None,
        }
    }

    pub fn spaceship_mut(&mut self) -> Option<&mut Spaceship> {
        match &mut self.kind {
            VehicleKind::Spaceship(ship) => Some(ship),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn door_takes_full_duration_regardless_of_step() {
        for dt in [1.0 / 30.0, 1.0 / 144.0, 0.25] {
            let mut door = DoorAnimator::new(2.0);
            door.toggle();
            let mut elapsed = 0.0;
            let mut event = None;
            while event.is_none() {
                event = door.update(dt);
                elapsed += dt;
                assert!(elapsed < 3.0);
            }
            assert_eq!(event, Some(DoorEvent::Opened));
            assert!((elapsed - 2.0).abs() <= dt + 1e-4);
            assert_eq!(door.progress(), 1.0);
        }
    }

    #[test]
    fn toggle_mid_animation_reverses() {
        let mut door = DoorAnimator::new(2.0);
        door.toggle();
        door.update(0.5);
        assert_eq!(door.state(), DoorState::Opening);
        door.toggle();
        assert_eq!(door.state(), DoorState::Closing);
        assert_eq!(door.update(0.6), Some(DoorEvent::Closed));
        assert!(door.is_closed());
        assert_eq!(door.progress(), 0.0);
    }

    #[test]
    fn easing_is_symmetric_and_monotonic() {
        assert_eq!(ease_in_out_cubic(0.0), 0.0);
        assert_eq!(ease_in_out_cubic(1.0), 1.0);
        assert!((ease_in_out_cubic(0.5) - 0.5).abs() < 1e-6);
        let mut last = 0.0;
        for i in 1..=100 {
            let p = ease_in_out_cubic(i as f32 / 100.0);
            assert!(p >= last);
            last = p;
        }
    }

    #[test]
    fn kind_tables() {
        let cfg = LocomotionConfig::default();
        assert_eq!(VehicleKind::Car.exit_offset(&cfg.occupancy), Vec3::new(2.5, 0.0, 0.0));
        assert_eq!(VehicleKind::Airplane.camera_mode(), CameraMode::ThirdPerson);
        let ship = VehicleKind::spaceship(&cfg);
        assert_eq!(ship.camera_mode(), CameraMode::FirstPerson);
        assert!(ship.independent_aim());
        assert!(!ship.feels_planet_gravity());
    }
}
