//! Surface-relative locomotion, grounding and vehicle occupancy.
//!
//! Every tick, [`SimulationContext::tick`] runs each agent through the same
//! fixed pipeline:
//! - gravity frame (planet or vessel interior)
//! - surface probe and groundedness classification
//! - terrain sampling and orientation alignment
//! - velocity integration and commit to the physics backend
//!
//! followed by the physics step, occupancy transitions, door animation and
//! the transform sync to the scene layer.

pub mod agent;
pub mod align;
pub mod classify;
pub mod config;
pub mod controller;
pub mod drive;
pub mod gravity;
pub mod movement;
pub mod occupancy;
pub mod probe;
pub mod snapshot;
pub mod terrain;
pub mod vehicle;
pub mod vessel;

#[cfg(test)]
mod test_support;

pub use agent::{Agent, Controls, GravityFrame, LocomotionState, Occupancy};
pub use config::LocomotionConfig;
pub use controller::{SimulationContext, WaterVolume};
pub use gravity::{GravityField, GravitySample};
pub use occupancy::OccupancyError;
pub use snapshot::AgentSnapshot;
pub use vehicle::{DoorAnimator, DoorEvent, DoorState, Spaceship, Vehicle, VehicleKind};
