//! Simulation context owning the ECS world, physics backend and scene layer.

use crate::align::{align, basis_rotation, AlignRequest};
use crate::classify::{classify, ClassifyInput};
use crate::drive::{drive, Pilot};
use crate::movement::{integrate, IntegrateContext, IntegrateMode, MoveInput};
use crate::occupancy::{self, OccupancyError};
use crate::probe::probe;
use crate::terrain;
use crate::vessel::{is_inside, steer_aim, sync_door_colliders, vessel_motion, vessel_up};
use crate::{
    Agent, AgentSnapshot, Controls, GravityField, GravityFrame, LocomotionConfig, LocomotionState, Occupancy,
    Vehicle, VehicleKind,
};
use engine_core::Transform;
use glam::{Quat, Vec2, Vec3};
use hecs::{Entity, World};
use physics::{BodyDesc, ColliderDesc, ColliderShape, CollisionGroup, PhysicsBackend, RigidBodyHandle};
use scene::SceneLayer;

/// Spherical body of liquid. Agents inside swim.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaterVolume {
    pub center: Vec3,
    pub radius: f32,
}

impl WaterVolume {
    pub fn contains(&self, point: Vec3) -> bool {
        point.distance_squared(self.center) <= self.radius * self.radius
    }
}

/// The vessel an agent is walking in, sampled for one tick.
#[derive(Debug, Clone, Copy)]
struct VesselFrame {
    entity: Entity,
    transform: Transform,
    body: Option<RigidBodyHandle>,
}

/// Owns everything one simulation needs and runs the per-tick pipeline.
pub struct SimulationContext<B: PhysicsBackend, S: SceneLayer> {
    pub world: World,
    pub backend: B,
    pub scene: S,
    pub gravity: GravityField,
    pub water: Vec<WaterVolume>,
    pub config: LocomotionConfig,
    /// Agent whose view drives the camera.
    camera_owner: Option<Entity>,
    agent_scratch: Vec<Entity>,
    vehicle_scratch: Vec<Entity>,
}

impl<B: PhysicsBackend, S: SceneLayer> SimulationContext<B, S> {
    pub fn new(backend: B, scene: S, gravity: GravityField, config: LocomotionConfig) -> Self {
        let gravity = gravity.with_artificial_multiplier(config.vessel.artificial_multiplier);
        Self {
            world: World::new(),
            backend,
            scene,
            gravity,
            water: Vec::new(),
            config,
            camera_owner: None,
            agent_scratch: Vec::new(),
            vehicle_scratch: Vec::new(),
        }
    }

    /// Spawn an agent standing upright against local gravity at `position`.
    ///
    /// The first agent spawned takes the camera.
    pub fn spawn_agent(&mut self, position: Vec3) -> Entity {
        let up = self.gravity.sample(position).up();
        let mut agent = Agent::new(position, basis_rotation(Vec3::NEG_Z, up), up);
        let body = self.backend.create_body(&BodyDesc::agent(position, agent.orientation));
        let collider = self.backend.create_collider(
            Some(body),
            &ColliderDesc::new(
                ColliderShape::Capsule {
                    half_height: agent.capsule_half_height(),
                    radius: agent.radius,
                },
                CollisionGroup::Agent,
            )
            .with_friction(0.0),
        );
        agent.body = Some(body);
        agent.collider = Some(collider);
        agent.node = Some(self.scene.add_node(agent.transform()));

        let entity = self.world.spawn((agent, Controls::default()));
        if self.camera_owner.is_none() {
            self.set_camera_owner(entity);
        }
        log::info!("Spawned agent {:?} at {:?}", entity, position);
        entity
    }

    /// Spawn a vehicle with its hull collider and scene node.
    pub fn spawn_vehicle(&mut self, kind: VehicleKind, position: Vec3, rotation: Quat) -> Entity {
        let transform = Transform::from_position_rotation(position, rotation);
        let body = self.backend.create_body(&BodyDesc::dynamic(position, rotation));
        self.backend.create_collider(Some(body), &kind.hull());
        let name = kind.name();

        let mut vehicle = Vehicle::new(kind);
        vehicle.body = Some(body);
        vehicle.node = Some(self.scene.add_node(transform));
        if let Some(ship) = vehicle.spaceship_mut() {
            sync_door_colliders(ship, Some(body), &mut self.backend);
        }

        let entity = self.world.spawn((vehicle, transform));
        log::info!("Spawned {} {:?} at {:?}", name, entity, position);
        entity
    }

    /// Remove an agent, first taking it out of any vehicle it occupies.
    ///
    /// Returns false when `agent` is not an agent.
    pub fn despawn_agent(&mut self, agent: Entity) -> bool {
        if self.agent(agent).and_then(|a| a.vehicle()).is_some() {
            if let Err(e) = self.exit(agent) {
                log::warn!("{:?} could not leave its vehicle: {}", agent, e);
            }
        }
        let Some(a) = self.agent(agent) else {
            return false;
        };
        if let Some(body) = a.body {
            self.backend.set_enabled(body, false);
        }
        if let Some(collider) = a.collider {
            self.backend.remove_collider(collider);
        }
        if let Some(node) = a.node {
            self.scene.set_visible(node, false);
        }
        if self.camera_owner == Some(agent) {
            self.camera_owner = None;
        }
        if self.world.despawn(agent).is_err() {
            return false;
        }
        log::info!("Despawned agent {:?}", agent);
        true
    }

    pub fn camera_owner(&self) -> Option<Entity> {
        self.camera_owner
    }

    /// Hand the camera to `agent`, attaching it to the agent or the vehicle it occupies.
    pub fn set_camera_owner(&mut self, agent: Entity) {
        let Some(a) = self.agent(agent) else {
            log::warn!("camera owner {:?} is not an agent", agent);
            return;
        };
        let vehicle_node = a
            .vehicle()
            .and_then(|v| self.world.get::<&Vehicle>(v).ok().and_then(|v| v.node));
        self.camera_owner = Some(agent);
        if let Some(node) = vehicle_node.or(a.node) {
            let mode = self.scene.camera().mode;
            if let Err(e) = self.scene.attach_camera(node, mode) {
                log::warn!("camera not attached: {}", e);
            }
        }
    }

    /// Set the controls `agent` acts on during the next tick.
    pub fn set_controls(&mut self, agent: Entity, controls: Controls) {
        if let Ok(mut slot) = self.world.get::<&mut Controls>(agent) {
            *slot = controls;
        }
    }

    /// Toggle a spaceship's doors. Returns false for other vehicles.
    pub fn toggle_doors(&mut self, vehicle: Entity) -> bool {
        let Ok(mut v) = self.world.get::<&mut Vehicle>(vehicle) else {
            return false;
        };
        let body = v.body;
        let Some(ship) = v.spaceship_mut() else {
            return false;
        };
        ship.door.toggle();
        log::info!("Doors of {:?} now {:?}", vehicle, ship.door.state());
        sync_door_colliders(ship, body, &mut self.backend);
        true
    }

    pub fn enter(&mut self, agent: Entity, vehicle: Entity) -> Result<(), OccupancyError> {
        occupancy::enter(
            &mut self.world,
            &mut self.backend,
            &mut self.scene,
            self.camera_owner,
            agent,
            vehicle,
            &self.config.occupancy,
        )
    }

    pub fn exit(&mut self, agent: Entity) -> Result<(), OccupancyError> {
        occupancy::exit(
            &mut self.world,
            &mut self.backend,
            &mut self.scene,
            self.camera_owner,
            agent,
            &self.config.occupancy,
        )
    }

    pub fn agent(&self, agent: Entity) -> Option<Agent> {
        self.world.get::<&Agent>(agent).ok().map(|a| *a)
    }

    pub fn snapshot(&self, agent: Entity) -> Option<AgentSnapshot> {
        self.agent(agent).as_ref().map(AgentSnapshot::from)
    }

    pub fn vehicle_occupant(&self, vehicle: Entity) -> Option<Entity> {
        self.world
            .get::<&Vehicle>(vehicle)
            .ok()
            .and_then(|v| v.live_occupant(&self.world))
    }

    /// Advance the simulation by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }

        self.agent_scratch.clear();
        self.agent_scratch
            .extend(self.world.query::<&Agent>().iter().map(|(e, _)| e));
        let agents = std::mem::take(&mut self.agent_scratch);

        for &entity in &agents {
            self.update_agent(entity, dt);
        }
        self.drive_vehicles(dt);
        self.consume_presses();
        self.backend.step(dt);
        self.sync_vehicles();
        self.resolve_transitions(&agents, dt);
        self.animate_doors(dt);
        self.sync_agents(&agents);
        self.sync_camera();

        self.agent_scratch = agents;
    }

    fn update_agent(&mut self, entity: Entity, dt: f32) {
        let Some(mut agent) = self.agent(entity) else {
            return;
        };
        let controls = self
            .world
            .get::<&Controls>(entity)
            .map(|c| *c)
            .unwrap_or_default();
        agent.jump_timer.tick(dt);

        if let Some(vehicle) = agent.vehicle() {
            self.apply_look(entity, &mut agent, controls.look);
            self.handle_actions(entity, &mut agent, &controls, Some(vehicle));
            self.write_agent(entity, agent);
            return;
        }

        if let Some(body) = agent.body {
            if let Some(t) = self.backend.transform(body) {
                agent.position = t.position;
            }
            if let Some(v) = self.backend.linear_velocity(body) {
                agent.velocity = v;
            }
        }
        self.apply_look(entity, &mut agent, controls.look);

        let vessel = self.current_vessel(&agent);
        self.switch_frame(&mut agent, vessel);

        let cfg = &self.config;
        let gravity = match vessel {
            Some(f) => self.gravity.sample_vessel(f.transform.rotation),
            None => self.gravity.sample(agent.position),
        };
        let motion = vessel.map(|f| vessel_motion(&self.backend, f.body, &f.transform));
        let down = gravity.direction;

        let touch_center = agent.position + down * agent.capsule_half_height();
        let touching = self
            .backend
            .touching(touch_center, agent.radius + cfg.classifier.touch_margin, agent.body);
        let in_liquid = vessel.is_none() && self.water.iter().any(|w| w.contains(agent.position));
        let hits = probe(&agent, &gravity, &self.backend, &cfg.probe);
        let relative = agent.velocity - motion.map_or(Vec3::ZERO, |m| m.inherited(agent.position));

        let was_grounded = agent.is_grounded();
        let class = classify(
            &mut agent,
            &ClassifyInput {
                hits: &hits,
                velocity: relative,
                gravity,
                in_liquid,
                touching,
            },
            &cfg.classifier,
        );
        if class.left_ground && agent.independent_aim.is_none() {
            agent.orientation = (agent.orientation * Quat::from_rotation_x(agent.look_pitch)).normalize();
            agent.look_pitch = 0.0;
        }
        if class.landed {
            agent.jump_timer.clear();
            log::debug!("{:?} landed", entity);
        }

        let reference_up = gravity.up();
        let wish = agent.wish_direction(controls.intent.planar());
        let desired_up = match vessel {
            Some(f) => vessel_up(&f.transform),
            None if agent.is_grounded() => {
                let report = terrain::sample(&agent, &gravity, &self.backend, &cfg.terrain);
                terrain::anticipate(&agent, &gravity, report.average_normal, wish, &self.backend, &cfg.terrain)
            }
            None => reference_up,
        };
        if let Some(aim) = agent.independent_aim {
            // Walk where the view points.
            agent.orientation = basis_rotation(aim * Vec3::NEG_Z, agent.up());
        }
        agent.orientation = align(
            &AlignRequest {
                current: agent.orientation,
                desired_up,
                reference_up,
                already_grounded: was_grounded && agent.is_grounded(),
                airborne: !agent.is_grounded(),
            },
            &cfg.align,
        );

        let mode = match (vessel, agent.state) {
            (Some(_), state) => IntegrateMode::VesselInterior {
                grounded: state == LocomotionState::Grounded,
            },
            (None, LocomotionState::Grounded) => IntegrateMode::Grounded,
            (None, LocomotionState::Airborne) => IntegrateMode::Airborne,
            (None, LocomotionState::Swimming) => IntegrateMode::Swimming,
        };
        let input = MoveInput {
            wish: controls.intent.planar(),
            sprint: controls.intent.sprint,
            jump: controls.intent.jump,
        };
        let context = IntegrateContext {
            mode,
            gravity,
            surface_normal: agent.last_surface_normal,
            up: vessel.map_or(agent.last_surface_normal, |f| vessel_up(&f.transform)),
            vessel: motion,
            delta: dt,
        };
        agent.velocity = integrate(&mut agent, &input, &context, cfg);

        if let Some(body) = agent.body {
            self.backend.set_linear_velocity(body, agent.velocity);
            self.backend.set_rotation(body, agent.orientation);
        }

        let frame_vessel = vessel.map(|f| f.entity);
        self.handle_actions(entity, &mut agent, &controls, frame_vessel);
        self.write_agent(entity, agent);
    }

    /// Yaw and pitch the view, or swing the orbit camera for its owner.
    fn apply_look(&mut self, entity: Entity, agent: &mut Agent, look: Vec2) {
        if look == Vec2::ZERO || !look.is_finite() {
            return;
        }
        if self.camera_owner == Some(entity) && self.scene.camera().mode == scene::CameraMode::Orbit {
            self.scene.camera_mut().orbit_by(look.x, look.y);
            return;
        }
        if let Some(aim) = agent.independent_aim {
            agent.independent_aim = Some(steer_aim(aim, look));
            return;
        }
        let max_pitch = self.config.align.max_look_pitch_degrees.to_radians();
        agent.look_pitch = (agent.look_pitch - look.y).clamp(-max_pitch, max_pitch);
        if !agent.is_in_vehicle() {
            agent.orientation = (agent.orientation * Quat::from_rotation_y(-look.x)).normalize();
        }
    }

    /// Door toggles, interact requests and camera cycling.
    fn handle_actions(&mut self, entity: Entity, agent: &mut Agent, controls: &Controls, door_target: Option<Entity>) {
        if controls.toggle_door {
            if let Some(vessel) = door_target {
                self.toggle_doors(vessel);
            }
        }
        if controls.intent.interact && occupancy::request_interact(agent, &self.world, &self.config.occupancy) {
            log::debug!("{:?} requested {:?}", entity, agent.occupancy);
        }
        if controls.cycle_camera && self.camera_owner == Some(entity) {
            let camera = self.scene.camera_mut();
            camera.mode = camera.mode.next();
            log::info!("Camera mode: {:?}", camera.mode);
        }
    }

    /// The spaceship interior containing the agent, if any.
    fn current_vessel(&self, agent: &Agent) -> Option<VesselFrame> {
        let was_in = match agent.frame {
            GravityFrame::Vessel(v) => Some(v),
            GravityFrame::Planet => None,
        };
        self.world
            .query::<(&Vehicle, &Transform)>()
            .iter()
            .find_map(|(entity, (vehicle, transform))| {
                let ship = vehicle.spaceship()?;
                is_inside(ship, transform, agent.position, was_in == Some(entity)).then_some(VesselFrame {
                    entity,
                    transform: *transform,
                    body: vehicle.body,
                })
            })
    }

    /// Move the agent between the planet and vessel frames.
    ///
    /// The view is decoupled from the body on the way in and folded back into
    /// the body heading on the way out.
    fn switch_frame(&self, agent: &mut Agent, vessel: Option<VesselFrame>) {
        let next = vessel.map_or(GravityFrame::Planet, |f| GravityFrame::Vessel(f.entity));
        if next == agent.frame {
            return;
        }
        match next {
            GravityFrame::Vessel(v) => {
                if agent.independent_aim.is_none() {
                    agent.independent_aim = Some(agent.orientation * Quat::from_rotation_x(agent.look_pitch));
                    agent.look_pitch = 0.0;
                }
                log::debug!("agent entered vessel {:?}", v);
            }
            GravityFrame::Planet => {
                if let Some(aim) = agent.independent_aim.take() {
                    let up = self.gravity.sample(agent.position).up();
                    agent.orientation = basis_rotation(aim * Vec3::NEG_Z, up);
                    agent.look_pitch = 0.0;
                }
                log::debug!("agent left vessel frame");
            }
        }
        agent.frame = next;
    }

    fn drive_vehicles(&mut self, dt: f32) {
        self.vehicle_scratch.clear();
        self.vehicle_scratch
            .extend(self.world.query::<&Vehicle>().iter().map(|(e, _)| e));
        let vehicles = std::mem::take(&mut self.vehicle_scratch);

        for &entity in &vehicles {
            let (Ok(vehicle), Ok(transform)) = (
                self.world.get::<&Vehicle>(entity),
                self.world.get::<&Transform>(entity).map(|t| *t),
            ) else {
                continue;
            };
            let pilot = vehicle.live_occupant(&self.world).and_then(|o| {
                let controls = self.world.get::<&Controls>(o).ok().map(|c| *c)?;
                let aim = self.world.get::<&Agent>(o).ok()?.independent_aim;
                Some(Pilot {
                    intent: controls.intent,
                    look: controls.look,
                    aim,
                })
            });
            let gravity = Some(self.gravity.sample(transform.position));
            drive(
                &vehicle,
                &transform,
                pilot.as_ref(),
                gravity,
                dt,
                &mut self.backend,
                &self.config.drive,
            );
        }

        self.vehicle_scratch = vehicles;
    }

    /// Presses act on one tick only; held movement stays until replaced.
    fn consume_presses(&mut self) {
        for (_, controls) in self.world.query_mut::<&mut Controls>() {
            controls.consume_presses();
        }
    }

    /// Commit pending enter/exit requests and run exit cooldowns.
    fn resolve_transitions(&mut self, agents: &[Entity], dt: f32) {
        for &entity in agents {
            let Some(occ) = self.agent(entity).map(|a| a.occupancy) else {
                continue;
            };
            match occ {
                Occupancy::Entering { vehicle } => {
                    // Range is checked from where the step left the body.
                    self.refresh_position(entity);
                    if let Err(e) = self.enter(entity, vehicle) {
                        log::debug!("{:?} could not enter {:?}: {}", entity, vehicle, e);
                        if let Ok(mut a) = self.world.get::<&mut Agent>(entity) {
                            a.occupancy = Occupancy::Free;
                        }
                    }
                }
                Occupancy::Exiting { .. } => {
                    if let Err(e) = self.exit(entity) {
                        log::warn!("{:?} could not exit: {}", entity, e);
                    }
                }
                Occupancy::ExitCooldown { .. } => {
                    if let Ok(mut a) = self.world.get::<&mut Agent>(entity) {
                        occupancy::tick_cooldown(&mut a.occupancy, dt);
                    }
                }
                Occupancy::Free | Occupancy::Occupying { .. } => {}
            }
        }
    }

    fn refresh_position(&mut self, entity: Entity) {
        let Ok(mut agent) = self.world.get::<&mut Agent>(entity) else {
            return;
        };
        if let Some(t) = agent.body.and_then(|b| self.backend.transform(b)) {
            agent.position = t.position;
        }
    }

    fn animate_doors(&mut self, dt: f32) {
        for (entity, vehicle) in self.world.query_mut::<&mut Vehicle>() {
            let body = vehicle.body;
            if let Some(ship) = vehicle.spaceship_mut() {
                if let Some(event) = ship.door.update(dt) {
                    log::info!("Doors of {:?}: {:?}", entity, event);
                }
                sync_door_colliders(ship, body, &mut self.backend);
            }
        }
    }

    fn sync_vehicles(&mut self) {
        for (_, (vehicle, transform)) in self.world.query_mut::<(&Vehicle, &mut Transform)>() {
            if let Some(t) = vehicle.body.and_then(|b| self.backend.transform(b)) {
                transform.position = t.position;
                transform.rotation = t.rotation;
            }
            if let Some(node) = vehicle.node {
                self.scene.set_node_transform(node, transform);
            }
        }
    }

    /// Agents take their body's post-step position; occupants ride their vehicle.
    fn sync_agents(&mut self, agents: &[Entity]) {
        for &entity in agents {
            let Some(mut agent) = self.agent(entity) else {
                continue;
            };
            match agent.vehicle() {
                Some(vehicle) => {
                    if let Ok(t) = self.world.get::<&Transform>(vehicle) {
                        agent.position = t.position;
                    }
                }
                None => {
                    if let Some(t) = agent.body.and_then(|b| self.backend.transform(b)) {
                        agent.position = t.position;
                    }
                    if let Some(node) = agent.node {
                        self.scene.set_node_transform(node, &agent.transform());
                    }
                }
            }
            self.write_agent(entity, agent);
        }
    }

    fn sync_camera(&mut self) {
        let Some(agent) = self.camera_owner.and_then(|e| self.agent(e)) else {
            return;
        };
        let Some(parent) = self.scene.camera().parent().and_then(|n| self.scene.node_transform(n)) else {
            return;
        };
        self.scene
            .camera_mut()
            .follow(&parent, agent.look_pitch, agent.independent_aim);
    }

    fn write_agent(&mut self, entity: Entity, agent: Agent) {
        if let Ok(mut slot) = self.world.get::<&mut Agent>(entity) {
            *slot = agent;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DoorState;
    use input::MoveIntent;
    use physics::PhysicsWorld;
    use scene::{CameraMode, SceneGraph};

    const DT: f32 = 1.0 / 60.0;

    type Ctx = SimulationContext<PhysicsWorld, SceneGraph>;

    fn flat_space() -> Ctx {
        SimulationContext::new(
            PhysicsWorld::new(),
            SceneGraph::new(),
            GravityField::default(),
            LocomotionConfig::default(),
        )
    }

    fn planet(radius: f32) -> Ctx {
        let mut backend = PhysicsWorld::new();
        backend.add_static_ball(Vec3::ZERO, radius);
        SimulationContext::new(
            backend,
            SceneGraph::new(),
            GravityField::planet(Vec3::ZERO, radius, 9.81),
            LocomotionConfig::default(),
        )
    }

    fn run(ctx: &mut Ctx, ticks: usize) {
        for _ in 0..ticks {
            ctx.tick(DT);
        }
    }

    #[test]
    fn agent_settles_on_planet_and_jumps() {
        let mut ctx = planet(20.0);
        let agent = ctx.spawn_agent(Vec3::new(0.0, 21.4, 0.0));
        run(&mut ctx, 180);

        let a = ctx.agent(agent).unwrap();
        assert!(a.is_grounded());
        assert!((a.position.length() - 20.9).abs() < 0.15);
        assert!(a.velocity.length() < 0.5);
        assert!(a.up().dot(Vec3::Y) > 0.99);

        ctx.set_controls(
            agent,
            Controls {
                intent: MoveIntent {
                    jump: true,
                    ..Default::default()
                },
                ..Default::default()
            },
        );
        ctx.tick(DT);
        let a = ctx.agent(agent).unwrap();
        assert!(a.velocity.dot(Vec3::Y) > 4.0);
        assert!(a.jump_timer.is_active());
    }

    #[test]
    fn first_airborne_tick_gains_g_dt() {
        let mut ctx = flat_space();
        let agent = ctx.spawn_agent(Vec3::new(0.0, 50.0, 0.0));
        ctx.tick(DT);
        let a = ctx.agent(agent).unwrap();
        assert_eq!(a.state, LocomotionState::Airborne);
        assert!((a.velocity - Vec3::new(0.0, -9.81 * DT, 0.0)).length() < 1e-3);
        assert!(a.position.y < 50.0);
    }

    #[test]
    fn look_yaws_body_and_clamps_pitch() {
        let mut ctx = flat_space();
        let agent = ctx.spawn_agent(Vec3::new(0.0, 50.0, 0.0));
        ctx.set_controls(
            agent,
            Controls {
                look: Vec2::new(0.5, -10.0),
                ..Default::default()
            },
        );
        ctx.tick(DT);
        let a = ctx.agent(agent).unwrap();
        assert!((a.forward().angle_between(Vec3::NEG_Z) - 0.5).abs() < 1e-3);
        let max = ctx.config.align.max_look_pitch_degrees.to_radians();
        assert!((a.look_pitch - max).abs() < 1e-5);
    }

    #[test]
    fn doors_animate_and_gate_colliders() {
        let mut ctx = flat_space();
        let ship = ctx.spawn_vehicle(VehicleKind::spaceship(&ctx.config), Vec3::ZERO, Quat::IDENTITY);
        let panels = |ctx: &Ctx| {
            ctx.world
                .get::<&Vehicle>(ship)
                .map(|v| v.spaceship().map_or(0, |s| s.door_colliders.len()))
                .unwrap_or(0)
        };
        let state = |ctx: &Ctx| {
            ctx.world
                .get::<&Vehicle>(ship)
                .ok()
                .and_then(|v| v.spaceship().map(|s| s.door.state()))
        };
        assert_eq!(panels(&ctx), 2);

        assert!(ctx.toggle_doors(ship));
        assert_eq!(panels(&ctx), 0);
        run(&mut ctx, 60);
        assert_eq!(state(&ctx), Some(DoorState::Opening));
        run(&mut ctx, 65);
        assert_eq!(state(&ctx), Some(DoorState::Open));
        assert_eq!(panels(&ctx), 0);

        ctx.toggle_doors(ship);
        run(&mut ctx, 60);
        assert_eq!(panels(&ctx), 0);
        run(&mut ctx, 65);
        assert_eq!(state(&ctx), Some(DoorState::Closed));
        assert_eq!(panels(&ctx), 2);
    }

    #[test]
    fn open_door_admits_agent_and_closed_door_keeps_it() {
        let mut ctx = flat_space();
        let ship_pos = Vec3::new(0.0, 100.0, 0.0);
        let ship = ctx.spawn_vehicle(VehicleKind::spaceship(&ctx.config), ship_pos, Quat::IDENTITY);
        let agent = ctx.spawn_agent(ship_pos + Vec3::new(0.0, -0.58, 2.0));

        ctx.tick(DT);
        assert_eq!(ctx.agent(agent).unwrap().frame, GravityFrame::Planet);

        ctx.toggle_doors(ship);
        ctx.tick(DT);
        let a = ctx.agent(agent).unwrap();
        assert_eq!(a.frame, GravityFrame::Vessel(ship));
        assert!(a.independent_aim.is_some());

        ctx.toggle_doors(ship);
        run(&mut ctx, 5);
        let a = ctx.agent(agent).unwrap();
        assert_eq!(a.frame, GravityFrame::Vessel(ship));
    }

    #[test]
    fn water_makes_agents_swim() {
        let mut ctx = flat_space();
        ctx.water.push(WaterVolume {
            center: Vec3::ZERO,
            radius: 10.0,
        });
        let agent = ctx.spawn_agent(Vec3::new(0.0, 2.0, 0.0));
        ctx.tick(DT);
        let snap = ctx.snapshot(agent).unwrap();
        assert!(snap.is_swimming);
        assert!(!snap.is_grounded);
        assert!(snap.velocity.y > 0.0);
    }

    #[test]
    fn occupant_rides_vehicle_and_camera_follows() {
        let mut ctx = flat_space();
        let car = ctx.spawn_vehicle(VehicleKind::Car, Vec3::new(0.0, 10.0, 0.0), Quat::IDENTITY);
        let agent = ctx.spawn_agent(Vec3::new(2.0, 10.0, 0.0));
        ctx.enter(agent, car).unwrap();
        assert_eq!(ctx.scene.camera().mode, CameraMode::ThirdPerson);

        run(&mut ctx, 20);
        let car_pos = ctx.world.get::<&Transform>(car).map(|t| t.position).unwrap();
        assert!(car_pos.y < 10.0);
        assert_eq!(ctx.agent(agent).unwrap().position, car_pos);
        assert!(ctx.scene.camera().position().distance(car_pos) > 1.0);
    }

    #[test]
    fn interact_enters_and_leaves_through_ticks() {
        let mut ctx = flat_space();
        let car = ctx.spawn_vehicle(VehicleKind::Car, Vec3::ZERO, Quat::IDENTITY);
        let agent = ctx.spawn_agent(Vec3::new(2.0, 0.0, 0.0));
        let press = Controls {
            intent: MoveIntent {
                interact: true,
                ..Default::default()
            },
            ..Default::default()
        };

        ctx.set_controls(agent, press);
        ctx.tick(DT);
        assert_eq!(ctx.vehicle_occupant(car), Some(agent));
        let stored = ctx.world.get::<&Controls>(agent).map(|c| *c).unwrap();
        assert!(!stored.intent.interact);

        // One press, one transition.
        run(&mut ctx, 5);
        assert_eq!(ctx.vehicle_occupant(car), Some(agent));

        ctx.set_controls(agent, press);
        ctx.tick(DT);
        assert_eq!(ctx.vehicle_occupant(car), None);
        assert!(matches!(ctx.agent(agent).unwrap().occupancy, Occupancy::ExitCooldown { .. }));

        // A press during the cooldown does not re-enter.
        ctx.set_controls(agent, press);
        ctx.tick(DT);
        assert_eq!(ctx.vehicle_occupant(car), None);
    }

    #[test]
    fn held_movement_survives_consumed_presses() {
        let mut ctx = flat_space();
        let agent = ctx.spawn_agent(Vec3::new(0.0, 50.0, 0.0));
        ctx.set_controls(
            agent,
            Controls {
                intent: MoveIntent {
                    forward: true,
                    jump: true,
                    ..Default::default()
                },
                look: Vec2::new(0.1, 0.0),
                toggle_door: true,
                cycle_camera: true,
            },
        );
        ctx.tick(DT);
        let stored = ctx.world.get::<&Controls>(agent).map(|c| *c).unwrap();
        assert!(stored.intent.forward);
        assert!(!stored.intent.jump);
        assert_eq!(stored.look, Vec2::ZERO);
        assert!(!stored.toggle_door);
        assert!(!stored.cycle_camera);
    }

    #[test]
    fn walking_off_a_ledge_goes_airborne() {
        let mut ctx = flat_space();
        ctx.backend
            .add_static_cuboid(Vec3::ZERO, Quat::IDENTITY, Vec3::new(2.0, 0.5, 2.0));
        let agent = ctx.spawn_agent(Vec3::new(0.0, 1.42, 1.0));
        run(&mut ctx, 30);
        assert!(ctx.agent(agent).unwrap().is_grounded());

        ctx.set_controls(
            agent,
            Controls {
                intent: MoveIntent {
                    forward: true,
                    ..Default::default()
                },
                ..Default::default()
            },
        );
        // Past the rim by more than the touch sphere nothing is under the feet.
        let clear = -2.0 - Agent::DEFAULT_RADIUS - ctx.config.classifier.touch_margin - 0.05;
        let mut passed = false;
        let mut grounded_past_edge = 0;
        for _ in 0..90 {
            ctx.tick(DT);
            let a = ctx.agent(agent).unwrap();
            if a.position.z < clear {
                passed = true;
                if a.is_grounded() {
                    grounded_past_edge += 1;
                }
            }
        }
        assert!(passed);
        assert_eq!(grounded_past_edge, 0);
        assert!(ctx.agent(agent).unwrap().position.y < 1.0);
    }

    #[test]
    fn despawned_driver_frees_the_vehicle() {
        let mut ctx = flat_space();
        let car = ctx.spawn_vehicle(VehicleKind::Car, Vec3::ZERO, Quat::IDENTITY);
        let driver = ctx.spawn_agent(Vec3::new(2.0, 0.0, 0.0));
        let other = ctx.spawn_agent(Vec3::new(-2.0, 0.0, 0.0));
        ctx.enter(driver, car).unwrap();

        ctx.world.despawn(driver).unwrap();
        run(&mut ctx, 5);
        assert_eq!(ctx.vehicle_occupant(car), None);
        let pos = ctx.agent(other).unwrap().position;
        assert_eq!(occupancy::nearest_vehicle(&ctx.world, pos, 5.0), Some(car));
        assert_eq!(ctx.enter(other, car), Ok(()));
        assert_eq!(ctx.vehicle_occupant(car), Some(other));
    }

    #[test]
    fn despawn_agent_releases_vehicle_and_camera() {
        let mut ctx = flat_space();
        let car = ctx.spawn_vehicle(VehicleKind::Car, Vec3::ZERO, Quat::IDENTITY);
        let driver = ctx.spawn_agent(Vec3::new(2.0, 0.0, 0.0));
        let other = ctx.spawn_agent(Vec3::new(-2.0, 0.0, 0.0));
        ctx.enter(driver, car).unwrap();
        let node = ctx.agent(driver).unwrap().node.unwrap();

        assert!(ctx.despawn_agent(driver));
        assert!(ctx.agent(driver).is_none());
        assert_eq!(ctx.vehicle_occupant(car), None);
        assert_eq!(ctx.camera_owner(), None);
        assert!(!ctx.scene.is_visible(node));
        assert!(!ctx.despawn_agent(driver));

        run(&mut ctx, 2);
        assert_eq!(ctx.enter(other, car), Ok(()));
    }

    #[test]
    fn interact_range_uses_post_step_position() {
        let mut ctx = flat_space();
        let car = ctx.spawn_vehicle(VehicleKind::Car, Vec3::ZERO, Quat::IDENTITY);
        let radius = ctx.config.occupancy.interaction_radius;
        let agent = ctx.spawn_agent(Vec3::new(radius - 0.1, 0.0, 0.0));
        let body = ctx.agent(agent).unwrap().body.unwrap();
        // Half a metre per tick away from the car.
        ctx.backend.set_linear_velocity(body, Vec3::new(30.0, 0.0, 0.0));
        ctx.set_controls(
            agent,
            Controls {
                intent: MoveIntent {
                    interact: true,
                    ..Default::default()
                },
                ..Default::default()
            },
        );
        ctx.tick(DT);

        let a = ctx.agent(agent).unwrap();
        assert!(a.position.x > radius);
        assert_eq!(a.occupancy, Occupancy::Free);
        assert_eq!(ctx.vehicle_occupant(car), None);
    }
}
