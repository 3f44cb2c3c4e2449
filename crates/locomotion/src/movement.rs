//! Velocity integration per locomotion mode.
//!
//! [`integrate`] never touches the physics backend: it turns intent, gravity
//! and the current velocity into the velocity the controller commits.

use crate::config::LocomotionConfig;
use crate::vessel::VesselMotion;
use crate::{Agent, GravitySample};
use glam::{Vec2, Vec3};

/// Planar intent for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MoveInput {
    /// x = strafe (right +), y = forward (+). Length ≤ 1.
    pub wish: Vec2,
    pub sprint: bool,
    /// Jump pressed this tick.
    pub jump: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrateMode {
    Grounded,
    Airborne,
    Swimming,
    /// Walking inside a vessel, standing on its floor or not.
    VesselInterior { grounded: bool },
}

#[derive(Debug, Clone, Copy)]
pub struct IntegrateContext {
    pub mode: IntegrateMode,
    pub gravity: GravitySample,
    pub surface_normal: Vec3,
    /// Jump direction: the surface normal, or the vessel up inside a vessel.
    pub up: Vec3,
    /// Motion of the vessel the agent stands in.
    pub vessel: Option<VesselMotion>,
    pub delta: f32,
}

/// New velocity for the agent. Arms `agent.jump_timer` when a jump starts.
pub fn integrate(agent: &mut Agent, input: &MoveInput, ctx: &IntegrateContext, cfg: &LocomotionConfig) -> Vec3 {
    let dt = ctx.delta.max(0.0);
    let wish = agent.wish_direction(input.wish);
    let velocity = match ctx.mode {
        IntegrateMode::Grounded => grounded(agent, wish, input, ctx, dt, cfg),
        IntegrateMode::Airborne => airborne(agent.velocity, wish, ctx, dt, cfg),
        IntegrateMode::Swimming => swimming(agent, wish, ctx, dt, cfg),
        IntegrateMode::VesselInterior { grounded } => interior(agent, wish, input, grounded, ctx, dt, cfg),
    };
    if velocity.is_finite() {
        velocity
    } else {
        log::debug!("non-finite velocity in {:?}, holding previous", ctx.mode);
        agent.velocity
    }
}

fn project_on_plane(v: Vec3, normal: Vec3) -> Vec3 {
    v - normal * v.dot(normal)
}

fn requested_speed(base: f32, sprint: bool, multiplier: f32) -> f32 {
    if sprint {
        base * multiplier
    } else {
        base
    }
}

/// Start a jump if none is active. Returns the velocity change.
fn try_jump(agent: &mut Agent, input: &MoveInput, up: Vec3, cfg: &LocomotionConfig) -> Vec3 {
    if !input.jump || agent.jump_timer.is_active() {
        return Vec3::ZERO;
    }
    agent.jump_timer.start(cfg.jump.duration);
    up * cfg.jump.speed
}

fn grounded(
    agent: &mut Agent,
    wish: Vec3,
    input: &MoveInput,
    ctx: &IntegrateContext,
    dt: f32,
    cfg: &LocomotionConfig,
) -> Vec3 {
    let ground = &cfg.ground;
    let n = ctx.surface_normal;
    let down = ctx.gravity.direction;
    let gravity_up = -down;
    let moving = input.wish != Vec2::ZERO;
    let mut v = agent.velocity;

    let along_surface = project_on_plane(wish, n).normalize_or_zero();
    v += along_surface * ground.acceleration * dt;

    let slope = gravity_up.angle_between(n);
    if moving && slope > ground.slide_angle_degrees.to_radians() {
        let downhill = project_on_plane(down, n).normalize_or_zero();
        if along_surface.dot(downhill) > 0.0 {
            v += downhill * ctx.gravity.strength * slope.sin() * dt;
        }
    }

    v -= n * (ground.stick_base + ground.stick_force * slope) * dt;

    let jumped = try_jump(agent, input, ctx.up, cfg);
    if jumped != Vec3::ZERO {
        // Cancel any motion into the surface so the full jump speed applies.
        v -= n * v.dot(n).min(0.0);
        v += jumped;
    }

    let rate = if moving { ground.moving_damping } else { ground.idle_damping };
    let normal_part = n * v.dot(n);
    v = normal_part + (v - normal_part) * (-rate * dt).exp();

    // Clamps are measured in the gravity frame.
    let requested = requested_speed(ground.walk_speed, input.sprint, ground.sprint_multiplier);
    let mut vertical = v.dot(gravity_up);
    let horizontal = (v - gravity_up * vertical).clamp_length_max(ground.speed_clamp_factor * requested);
    if !agent.jump_timer.is_active() {
        vertical = vertical.min(ground.max_upward_speed);
    }
    horizontal + gravity_up * vertical
}

fn airborne(velocity: Vec3, wish: Vec3, ctx: &IntegrateContext, dt: f32, cfg: &LocomotionConfig) -> Vec3 {
    let air = &cfg.air;
    let up = ctx.gravity.up();
    let vertical = up * velocity.dot(up);
    let horizontal = velocity - vertical;
    let mut v = horizontal * (-air.horizontal_damping * dt).exp() + vertical * (-air.vertical_damping * dt).exp();
    v += wish * air.control * dt;
    v + ctx.gravity.acceleration() * dt
}

fn swimming(agent: &Agent, wish: Vec3, ctx: &IntegrateContext, dt: f32, cfg: &LocomotionConfig) -> Vec3 {
    let swim = &cfg.swim;
    let mut v = agent.velocity;
    if agent.mass > f32::EPSILON {
        let impulse = ctx.gravity.up() * (agent.mass * swim.buoyancy * dt);
        v += impulse / agent.mass;
    }
    v += wish * swim.control * dt;
    v = v.clamp_length_max(swim.max_speed);
    v * (-swim.drag * dt).exp()
}

fn interior(
    agent: &mut Agent,
    wish: Vec3,
    input: &MoveInput,
    standing: bool,
    ctx: &IntegrateContext,
    dt: f32,
    cfg: &LocomotionConfig,
) -> Vec3 {
    let vessel_cfg = &cfg.vessel;
    let inherited = ctx.vessel.map_or(Vec3::ZERO, |m| m.inherited(agent.position));
    let up = ctx.up;
    let moving = input.wish != Vec2::ZERO;
    let mut relative = agent.velocity - inherited;

    relative += project_on_plane(wish, up).normalize_or_zero() * vessel_cfg.acceleration * dt;
    if standing {
        relative += try_jump(agent, input, up, cfg);
    } else {
        relative += ctx.gravity.acceleration() * dt;
    }

    let decay = (-(if moving { vessel_cfg.moving_damping } else { vessel_cfg.idle_damping }) * dt).exp();
    if standing && !agent.jump_timer.is_active() {
        relative *= decay;
    } else {
        let vertical = up * relative.dot(up);
        relative = vertical + (relative - vertical) * decay;
    }

    let requested = requested_speed(vessel_cfg.walk_speed, input.sprint, cfg.ground.sprint_multiplier);
    let vertical = up * relative.dot(up);
    let horizontal = (relative - vertical).clamp_length_max(cfg.ground.speed_clamp_factor * requested);
    inherited + horizontal + vertical
}
