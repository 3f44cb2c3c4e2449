//! Grounded / airborne / swimming decision with hysteresis.

use crate::config::ClassifierConfig;
use crate::probe::ProbeHits;
use crate::{Agent, GravitySample, LocomotionState};
use glam::Vec3;

/// Evidence gathered for one agent this tick.
#[derive(Debug, Clone, Copy)]
pub struct ClassifyInput<'a> {
    pub hits: &'a ProbeHits,
    pub velocity: Vec3,
    pub gravity: GravitySample,
    /// Agent is inside a liquid volume.
    pub in_liquid: bool,
    /// Broad-phase overlap between the lower cap and any geometry this tick.
    pub touching: bool,
}

/// Outcome of [`classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub state: LocomotionState,
    /// Grounded last tick, airborne now.
    pub left_ground: bool,
    /// Not grounded last tick, grounded now.
    pub landed: bool,
    /// Grounded only through the touching hysteresis, with no ray hit.
    pub via_hysteresis: bool,
}

/// Classify the agent and update its state, surface normal and touching flag.
///
/// Rules in priority order: liquid, any ray hit, touching while nearly at
/// rest along gravity and grounded last tick, airborne. Only this tick's
/// overlap test counts as touching.
pub fn classify(agent: &mut Agent, input: &ClassifyInput<'_>, cfg: &ClassifierConfig) -> Classification {
    let previous = agent.state;
    let away = input.gravity.up();
    let touching = input.touching;

    let (state, via_hysteresis) = if input.in_liquid {
        (LocomotionState::Swimming, false)
    } else if input.hits.any() {
        (LocomotionState::Grounded, false)
    } else if touching
        && input.velocity.dot(input.gravity.direction).abs() < cfg.hysteresis_speed
        && previous == LocomotionState::Grounded
    {
        (LocomotionState::Grounded, true)
    } else {
        (LocomotionState::Airborne, false)
    };

    let normal = match state {
        LocomotionState::Grounded if via_hysteresis => agent.last_surface_normal,
        LocomotionState::Grounded => input.hits.surface_normal().unwrap_or(away),
        LocomotionState::Airborne | LocomotionState::Swimming => away,
    };
    agent.last_surface_normal = unit_or(normal, away);

    agent.touching = touching && state != LocomotionState::Airborne;
    agent.state = state;

    Classification {
        state,
        left_ground: previous == LocomotionState::Grounded && state == LocomotionState::Airborne,
        landed: previous != LocomotionState::Grounded && state == LocomotionState::Grounded,
        via_hysteresis,
    }
}

/// `v` normalized, or `fallback` normalized, or world +Y.
pub(crate) fn unit_or(v: Vec3, fallback: Vec3) -> Vec3 {
    v.try_normalize()
        .or_else(|| fallback.try_normalize())
        .unwrap_or(Vec3::Y)
}
