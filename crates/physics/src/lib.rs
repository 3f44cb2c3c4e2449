//! Physics collaborator for the locomotion core, backed by Rapier3D.
//!
//! The core only talks to [`PhysicsBackend`]; [`PhysicsWorld`] is the
//! rapier-backed implementation used by the game and by tests.

pub mod backend;
pub mod collision;
pub mod physics_world;
pub mod raycast;

pub use backend::*;
pub use collision::*;
pub use physics_world::*;
pub use raycast::*;

// Re-export Rapier for downstream crates
pub use rapier3d;

// Re-export common Rapier types
pub use rapier3d::prelude::{ColliderHandle, RigidBodyHandle};
