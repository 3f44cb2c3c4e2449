//! Core engine types shared by every simulation crate.
//!
//! This crate provides the foundational value types:
//! - Transform and frame conversions
//! - Fixed-step time management
//! - Small per-entity components (velocity, countdown timers)

pub mod components;
pub mod time;
pub mod transform;

pub use components::*;
pub use time::*;
pub use transform::*;

// Re-export commonly used types
pub use glam::{Mat3, Mat4, Quat, Vec2, Vec3, Vec4};
pub use hecs::{Entity, World};
