//! Vehicle enter/exit state machine.
//!
//! An interact press only records a request ([`request_interact`]); the
//! request is committed by [`enter`] or [`exit`] in the transition phase of
//! the tick, after the physics step. Two agents racing for the same vehicle
//! are resolved there: the first commit wins and the loser returns to `Free`.

use crate::config::OccupancyConfig;
use crate::vehicle::Vehicle;
use crate::{Agent, GravityFrame, LocomotionState, Occupancy};
use engine_core::Transform;
use glam::Vec3;
use hecs::{Entity, World};
use physics::PhysicsBackend;
use scene::SceneLayer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum OccupancyError {
    #[error("agent is already in or leaving a vehicle")]
    NotFree,
    #[error("exit cooldown is still running")]
    Cooldown,
    #[error("agent is not in a vehicle")]
    NotOccupying,
    #[error("vehicle already has an occupant")]
    VehicleOccupied,
    #[error("vehicle is out of interaction range")]
    OutOfRange,
    #[error("vehicle does not exist")]
    MissingVehicle,
    #[error("agent does not exist")]
    MissingAgent,
}

/// Closest unoccupied vehicle within `radius` of `position`.
pub fn nearest_vehicle(world: &World, position: Vec3, radius: f32) -> Option<Entity> {
    world
        .query::<(&Vehicle, &Transform)>()
        .iter()
        .filter(|(_, (vehicle, _))| !vehicle.is_occupied(world))
        .map(|(e, (_, t))| (e, t.position.distance_squared(position)))
        .filter(|(_, d2)| *d2 <= radius * radius)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(e, _)| e)
}

/// Turn an interact press into an enter or exit request.
///
/// Returns whether a request was recorded. Presses during the exit cooldown
/// or while a request is pending are ignored.
pub fn request_interact(agent: &mut Agent, world: &World, cfg: &OccupancyConfig) -> bool {
    match agent.occupancy {
        Occupancy::Free => match nearest_vehicle(world, agent.position, cfg.interaction_radius) {
            Some(vehicle) => {
                agent.occupancy = Occupancy::Entering { vehicle };
                true
            }
            None => false,
        },
        Occupancy::Occupying { vehicle, prior_camera } => {
            agent.occupancy = Occupancy::Exiting { vehicle, prior_camera };
            true
        }
        Occupancy::Entering { .. } | Occupancy::Exiting { .. } | Occupancy::ExitCooldown { .. } => false,
    }
}

/// Count down the exit cooldown. Returns true on the tick it ends.
pub fn tick_cooldown(occupancy: &mut Occupancy, dt: f32) -> bool {
    if let Occupancy::ExitCooldown { remaining } = occupancy {
        *remaining -= dt;
        if *remaining <= 0.0 {
            *occupancy = Occupancy::Free;
            return true;
        }
    }
    false
}

/// Put `agent_id` into `vehicle_id`.
///
/// Disables the agent's body, hides its node, marks the vehicle occupied and,
/// when the agent owns the camera, reparents the camera to the vehicle. Nothing
/// is changed when an error is returned.
pub fn enter<B, S>(
    world: &mut World,
    backend: &mut B,
    scene: &mut S,
    camera_owner: Option<Entity>,
    agent_id: Entity,
    vehicle_id: Entity,
    cfg: &OccupancyConfig,
) -> Result<(), OccupancyError>
where
    B: PhysicsBackend + ?Sized,
    S: SceneLayer + ?Sized,
{
    let mut agent = world
        .get::<&Agent>(agent_id)
        .map(|a| *a)
        .map_err(|_| OccupancyError::MissingAgent)?;
    match agent.occupancy {
        Occupancy::Free | Occupancy::Entering { .. } => {}
        Occupancy::ExitCooldown { .. } => return Err(OccupancyError::Cooldown),
        Occupancy::Occupying { .. } | Occupancy::Exiting { .. } => return Err(OccupancyError::NotFree),
    }

    let (camera_mode, independent_aim, vehicle_node, vehicle_rotation, kind) = {
        let mut vehicle = world
            .get::<&mut Vehicle>(vehicle_id)
            .map_err(|_| OccupancyError::MissingVehicle)?;
        let transform = *world
            .get::<&Transform>(vehicle_id)
            .map_err(|_| OccupancyError::MissingVehicle)?;
        if vehicle.is_occupied(world) {
            return Err(OccupancyError::VehicleOccupied);
        }
        if agent.position.distance(transform.position) > cfg.interaction_radius {
            return Err(OccupancyError::OutOfRange);
        }
        vehicle.occupant = Some(agent_id);
        (
            vehicle.kind.camera_mode(),
            vehicle.kind.independent_aim(),
            vehicle.node,
            transform.rotation,
            vehicle.kind.name(),
        )
    };

    if let Some(body) = agent.body {
        backend.set_linear_velocity(body, Vec3::ZERO);
        backend.set_angular_velocity(body, Vec3::ZERO);
        backend.set_enabled(body, false);
    }
    agent.velocity = Vec3::ZERO;
    if let Some(node) = agent.node {
        scene.set_visible(node, false);
    }

    let prior_camera = if camera_owner == Some(agent_id) {
        let prior = scene.camera().mode;
        match vehicle_node.map(|node| scene.attach_camera(node, camera_mode)) {
            Some(Ok(())) => Some(prior),
            Some(Err(e)) => {
                log::warn!("camera stays on agent: {}", e);
                None
            }
            None => None,
        }
    } else {
        None
    };

    agent.independent_aim = independent_aim.then_some(vehicle_rotation);
    agent.frame = GravityFrame::Planet;
    agent.jump_timer.clear();
    agent.occupancy = Occupancy::Occupying {
        vehicle: vehicle_id,
        prior_camera,
    };
    write_back(world, agent_id, agent);
    log::info!("{:?} entered {} {:?}", agent_id, kind, vehicle_id);
    Ok(())
}

/// Take `agent_id` out of its vehicle.
///
/// The agent reappears at the vehicle's exit offset (in the vehicle frame)
/// with zero velocity, its camera mode restored and the exit cooldown running.
/// Leaving a spaceship into its own cabin puts the agent in the vessel frame.
pub fn exit<B, S>(
    world: &mut World,
    backend: &mut B,
    scene: &mut S,
    camera_owner: Option<Entity>,
    agent_id: Entity,
    cfg: &OccupancyConfig,
) -> Result<(), OccupancyError>
where
    B: PhysicsBackend + ?Sized,
    S: SceneLayer + ?Sized,
{
    let mut agent = world
        .get::<&Agent>(agent_id)
        .map(|a| *a)
        .map_err(|_| OccupancyError::MissingAgent)?;
    let (vehicle_id, prior_camera) = match agent.occupancy {
        Occupancy::Occupying { vehicle, prior_camera } | Occupancy::Exiting { vehicle, prior_camera } => {
            (vehicle, prior_camera)
        }
        _ => return Err(OccupancyError::NotOccupying),
    };

    let (exit_point, cabin) = {
        let vehicle = world.get::<&mut Vehicle>(vehicle_id);
        let transform = world.get::<&Transform>(vehicle_id);
        match (vehicle, transform) {
            (Ok(mut vehicle), Ok(transform)) => {
                if vehicle.occupant == Some(agent_id) {
                    vehicle.occupant = None;
                }
                let exit_point = transform.point_to_world(vehicle.kind.exit_offset(cfg));
                let in_cabin = vehicle
                    .spaceship()
                    .is_some_and(|ship| ship.interior.contains_local(transform.point_to_local(exit_point)));
                (exit_point, in_cabin.then_some(vehicle_id))
            }
            _ => {
                log::warn!("{:?} vanished while occupied, exiting in place", vehicle_id);
                (agent.position, None)
            }
        }
    };

    if let Some(body) = agent.body {
        backend.set_position(body, exit_point);
        backend.set_rotation(body, agent.orientation);
        backend.set_linear_velocity(body, Vec3::ZERO);
        backend.set_enabled(body, true);
    }
    agent.position = exit_point;
    agent.velocity = Vec3::ZERO;
    agent.state = LocomotionState::Airborne;
    agent.touching = false;
    if let Some(node) = agent.node {
        scene.set_visible(node, true);
    }

    if camera_owner == Some(agent_id) {
        if let (Some(mode), Some(node)) = (prior_camera, agent.node) {
            if let Err(e) = scene.attach_camera(node, mode) {
                log::warn!("could not restore camera: {}", e);
            }
        }
    }

    match cabin {
        Some(vessel) => agent.frame = GravityFrame::Vessel(vessel),
        None => {
            agent.frame = GravityFrame::Planet;
            agent.independent_aim = None;
        }
    }
    agent.occupancy = Occupancy::ExitCooldown {
        remaining: cfg.exit_cooldown,
    };
    write_back(world, agent_id, agent);
    log::info!("{:?} left {:?}", agent_id, vehicle_id);
    Ok(())
}

fn write_back(world: &mut World, id: Entity, agent: Agent) {
    if let Ok(mut slot) = world.get::<&mut Agent>(id) {
        *slot = agent;
    }
}
