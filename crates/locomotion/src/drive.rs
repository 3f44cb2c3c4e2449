//! Vehicle control: pilot input and planetary gravity turned into impulses.

use crate::config::DriveConfig;
use crate::vehicle::{Vehicle, VehicleKind};
use crate::GravitySample;
use engine_core::Transform;
use glam::{Quat, Vec2, Vec3};
use input::MoveIntent;
use physics::PhysicsBackend;

/// Controls forwarded from the occupying agent.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Pilot {
    pub intent: MoveIntent,
    /// Look delta in radians (yaw, pitch).
    pub look: Vec2,
    /// Occupant's independent aim, steering a spaceship.
    pub aim: Option<Quat>,
}

/// Apply one tick of gravity and pilot control to a vehicle body.
///
/// Impulses are accelerations scaled by the body mass, so a body whose mass
/// is not known yet is left alone.
pub fn drive<B: PhysicsBackend + ?Sized>(
    vehicle: &Vehicle,
    transform: &Transform,
    pilot: Option<&Pilot>,
    gravity: Option<GravitySample>,
    dt: f32,
    backend: &mut B,
    cfg: &DriveConfig,
) {
    let Some(body) = vehicle.body else {
        return;
    };
    let Some(mass) = backend.mass(body).filter(|m| *m > 0.0) else {
        return;
    };
    let scale = mass * dt.max(0.0);

    if vehicle.kind.feels_planet_gravity() {
        if let Some(g) = gravity {
            backend.apply_impulse(body, g.acceleration() * scale);
        }
    }

    let Some(pilot) = pilot else {
        return;
    };
    let wish = pilot.intent.planar();
    let boost = if pilot.intent.sprint { cfg.boost } else { 1.0 };
    let forward = transform.forward();
    let right = transform.right();
    let up = transform.up();

    let (force, torque) = match &vehicle.kind {
        VehicleKind::Car => {
            let ground_up = gravity.map_or(up, |g| g.up());
            let heading = (forward - ground_up * forward.dot(ground_up)).normalize_or_zero();
            (
                heading * wish.y * cfg.car_thrust * boost,
                ground_up * -wish.x * cfg.car_turn,
            )
        }
        VehicleKind::Airplane => {
            let airspeed = backend.linear_velocity(body).unwrap_or(Vec3::ZERO).dot(forward).max(0.0);
            let thrust = forward * wish.y * cfg.airplane_thrust * boost;
            let lift = up * airspeed * cfg.airplane_lift;
            let turn = right * -pilot.look.y + up * -wish.x + forward * pilot.intent.roll();
            (thrust + lift, turn * cfg.airplane_turn)
        }
        VehicleKind::Spaceship(_) => {
            let vertical = if pilot.intent.jump { 1.0 } else { 0.0 };
            let thrust = (forward * wish.y + right * wish.x + up * vertical) * cfg.spaceship_thrust * boost;
            let steer = pilot
                .aim
                .map_or(Vec3::ZERO, |aim| forward.cross(aim * Vec3::NEG_Z));
            (thrust, (steer + forward * pilot.intent.roll()) * cfg.spaceship_turn)
        }
    };

    if force.is_finite() && force != Vec3::ZERO {
        backend.apply_impulse(body, force * scale);
    }
    if torque.is_finite() && torque != Vec3::ZERO {
        backend.apply_torque_impulse(body, torque * scale);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LocomotionConfig;
    use physics::{BodyDesc, PhysicsWorld};

    const DT: f32 = 1.0 / 60.0;

    fn spawn(world: &mut PhysicsWorld, kind: VehicleKind) -> Vehicle {
        let body = world.create_body(&BodyDesc::dynamic(Vec3::ZERO, Quat::IDENTITY));
        world.create_collider(Some(body), &kind.hull());
        // Mass properties settle on the first step.
        world.step(DT);
        Vehicle {
            body: Some(body),
            ..Vehicle::new(kind)
        }
    }

    fn run(world: &mut PhysicsWorld, vehicle: &Vehicle, pilot: Option<&Pilot>, gravity: Option<GravitySample>, ticks: usize) {
        let cfg = DriveConfig::default();
        for _ in 0..ticks {
            let t = vehicle.body.and_then(|b| world.transform(b)).unwrap_or_default();
            drive(vehicle, &t, pilot, gravity, DT, world, &cfg);
            world.step(DT);
        }
    }

    fn down() -> Option<GravitySample> {
        Some(GravitySample {
            direction: Vec3::NEG_Y,
            strength: 9.81,
        })
    }

    #[test]
    fn car_throttle_pushes_forward() {
        let mut world = PhysicsWorld::new();
        let car = spawn(&mut world, VehicleKind::Car);
        let pilot = Pilot {
            intent: MoveIntent {
                forward: true,
                ..Default::default()
            },
            ..Default::default()
        };
        run(&mut world, &car, Some(&pilot), None, 30);
        let v = world.linear_velocity(car.body.unwrap()).unwrap();
        assert!(v.z < -1.0);
        assert!(v.x.abs() < 1e-3);
    }

    #[test]
    fn unpiloted_car_falls_but_ship_hovers() {
        let mut world = PhysicsWorld::new();
        let car = spawn(&mut world, VehicleKind::Car);
        run(&mut world, &car, None, down(), 30);
        assert!(world.linear_velocity(car.body.unwrap()).unwrap().y < -1.0);

        let mut world = PhysicsWorld::new();
        let ship = spawn(&mut world, VehicleKind::spaceship(&LocomotionConfig::default()));
        run(&mut world, &ship, None, down(), 30);
        assert!(world.linear_velocity(ship.body.unwrap()).unwrap().length() < 1e-4);
    }

    #[test]
    fn spaceship_turns_toward_aim() {
        let mut world = PhysicsWorld::new();
        let ship = spawn(&mut world, VehicleKind::spaceship(&LocomotionConfig::default()));
        let pilot = Pilot {
            aim: Some(Quat::from_rotation_y(0.5)),
            ..Default::default()
        };
        run(&mut world, &ship, Some(&pilot), None, 5);
        let w = world.angular_velocity(ship.body.unwrap()).unwrap();
        assert!(w.y > 0.0);
    }

    #[test]
    fn airplane_lift_grows_with_airspeed() {
        let mut world = PhysicsWorld::new();
        let plane = spawn(&mut world, VehicleKind::Airplane);
        let body = plane.body.unwrap();
        world.set_linear_velocity(body, Vec3::new(0.0, 0.0, -30.0));
        run(&mut world, &plane, Some(&Pilot::default()), None, 10);
        assert!(world.linear_velocity(body).unwrap().y > 0.5);
    }
}
