//! Scene collaborator: node transforms, visibility and the switchable camera.
//!
//! Rendering itself lives elsewhere; this crate is the narrow surface the
//! simulation writes into each tick (transform sync, mesh visibility, camera
//! parenting).

pub mod camera;
pub mod graph;

pub use camera::*;
pub use graph::*;
