//! Planet population: terrain, boulders, water and vehicles.

use crate::config::GameConfig;
use glam::{Quat, Vec3};
use hecs::Entity;
use locomotion::align::basis_rotation;
use locomotion::{GravityField, SimulationContext, VehicleKind, WaterVolume};
use physics::PhysicsWorld;
use rand::{Rng, SeedableRng};
use scene::{SceneGraph, SceneLayer};

pub type Simulation = SimulationContext<PhysicsWorld, SceneGraph>;

/// Boulders keep this angle (radians) away from the spawn pole.
const SPAWN_CLEARANCE: f32 = 0.5;

/// Entities the session script drives.
#[derive(Debug, Clone, Copy)]
pub struct Population {
    pub player: Entity,
    pub car: Entity,
    pub airplane: Entity,
    pub spaceship: Entity,
}

/// A boulder resting on the planet surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Boulder {
    pub position: Vec3,
    pub rotation: Quat,
    pub half_extents: Vec3,
}

/// Position and upright rotation `lift` metres above the surface along `dir`.
fn surface_frame(radius: f32, dir: Vec3, lift: f32) -> (Vec3, Quat) {
    let up = dir.try_normalize().unwrap_or(Vec3::Y);
    (up * (radius + lift), basis_rotation(Vec3::NEG_Z, up))
}

/// Deterministic boulder layout for `seed`, clear of the spawn pole (+Y).
pub fn scatter_boulders(radius: f32, count: usize, seed: u64) -> Vec<Boulder> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let mut boulders = Vec::with_capacity(count);
    while boulders.len() < count {
        let dir = Vec3::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0));
        if dir.length_squared() > 1.0 {
            continue;
        }
        let Some(up) = dir.try_normalize() else {
            continue;
        };
        if up.angle_between(Vec3::Y) < SPAWN_CLEARANCE {
            continue;
        }
        let half_extents = Vec3::new(
            rng.gen_range(0.5..2.0),
            rng.gen_range(0.4..1.5),
            rng.gen_range(0.5..2.0),
        );
        let (position, upright) = surface_frame(radius, up, half_extents.y * 0.5);
        let yaw = Quat::from_rotation_y(rng.gen_range(0.0..std::f32::consts::TAU));
        boulders.push(Boulder {
            position,
            rotation: upright * yaw,
            half_extents,
        });
    }
    boulders
}

/// Build the simulation and populate the planet.
pub fn populate(cfg: &GameConfig) -> (Simulation, Population) {
    let radius = cfg.planet_radius.max(1.0);
    let mut backend = PhysicsWorld::new();
    let mut scene = SceneGraph::new();

    backend.add_static_ball(Vec3::ZERO, radius);
    scene.add_node(engine_core::Transform::default());

    let boulders = scatter_boulders(radius, cfg.boulder_count, cfg.seed);
    for b in &boulders {
        backend.add_static_cuboid(b.position, b.rotation, b.half_extents);
        scene.add_node(engine_core::Transform::from_position_rotation(b.position, b.rotation));
    }
    log::info!("Planet r={} with {} boulders", radius, boulders.len());

    let gravity = GravityField::planet(Vec3::ZERO, radius, cfg.gravity);
    let mut sim = SimulationContext::new(backend, scene, gravity, cfg.locomotion.clone());
    if cfg.ocean_radius > 0.0 {
        sim.water.push(WaterVolume {
            center: Vec3::new(0.0, -radius, 0.0),
            radius: cfg.ocean_radius,
        });
    }

    let (player_pos, _) = surface_frame(radius, Vec3::Y, 1.0);
    let player = sim.spawn_agent(player_pos);

    let (pos, rot) = surface_frame(radius, Vec3::new(0.0, 1.0, -0.1), 0.65);
    let car = sim.spawn_vehicle(VehicleKind::Car, pos, rot);
    let (pos, rot) = surface_frame(radius, Vec3::new(-0.25, 1.0, 0.05), 0.65);
    let airplane = sim.spawn_vehicle(VehicleKind::Airplane, pos, rot);
    let (pos, rot) = surface_frame(radius, Vec3::new(0.0, 1.0, 0.4), 2.5);
    let spaceship = sim.spawn_vehicle(VehicleKind::spaceship(&cfg.locomotion), pos, rot);

    (
        sim,
        Population {
            player,
            car,
            airplane,
            spaceship,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boulders_are_deterministic_and_clear_of_spawn() {
        let a = scatter_boulders(60.0, 16, 3);
        let b = scatter_boulders(60.0, 16, 3);
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
        for boulder in &a {
            assert!(boulder.position.angle_between(Vec3::Y) >= SPAWN_CLEARANCE);
            assert!(boulder.position.length() > 60.0);
        }
    }

    #[test]
    fn player_lands_on_populated_planet() {
        let cfg = GameConfig::default();
        let (mut sim, pop) = populate(&cfg);
        assert_eq!(sim.camera_owner(), Some(pop.player));
        for _ in 0..120 {
            sim.tick(1.0 / 60.0);
        }
        let player = sim.agent(pop.player).unwrap();
        assert!(player.is_grounded());
        assert!((player.position.length() - (cfg.planet_radius + 0.9)).abs() < 0.2);
        assert_eq!(sim.vehicle_occupant(pop.car), None);
    }
}
