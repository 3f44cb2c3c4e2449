//! Tunable locomotion constants, grouped per subsystem.
//!
//! Every struct is `#[serde(default)]`, so a config file only needs the
//! fields it changes.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// All locomotion tuning in one place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocomotionConfig {
    pub probe: ProbeConfig,
    pub classifier: ClassifierConfig,
    pub terrain: TerrainConfig,
    pub align: AlignConfig,
    pub ground: GroundConfig,
    pub air: AirConfig,
    pub swim: SwimConfig,
    pub vessel: VesselConfig,
    pub jump: JumpConfig,
    pub occupancy: OccupancyConfig,
    pub door: DoorConfig,
    pub drive: DriveConfig,
}

/// Three-ray ground probe under the feet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Ray length as a fraction of the agent radius.
    pub length_factor: f32,
    /// Distance of the side rays from the centre ray, as a fraction of the radius.
    pub spread: f32,
    /// Ray origins start this far above the capsule bottom.
    pub lift: f32,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            length_factor: 0.6,
            spread: 0.5,
            lift: 0.05,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Max speed along gravity (m/s) that still counts as resting for hysteresis.
    pub hysteresis_speed: f32,
    /// Extra radius of the touching-geometry sphere around the lower cap.
    pub touch_margin: f32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            hysteresis_speed: 0.5,
            touch_margin: 0.05,
        }
    }
}

/// Ring sampler and look-ahead ray.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Ring radius as a fraction of the agent radius.
    pub ring_radius_factor: f32,
    /// Ring ray origins sit this far above the feet, as a fraction of the radius.
    pub ring_lift_factor: f32,
    /// Ring ray length below the feet, as a fraction of the agent radius.
    pub ray_length_factor: f32,
    /// Fewer successful ring hits than this fall back to the last surface normal.
    pub min_samples: usize,
    /// How far ahead of the agent the anticipation ray starts (m).
    pub anticipate_distance: f32,
    /// Anticipation ray origin height above the feet (m).
    pub anticipate_lift: f32,
    /// Anticipation ray reach below the feet (m).
    pub anticipate_depth: f32,
    /// Weight of the look-ahead normal in the blend.
    pub anticipate_blend: f32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            ring_radius_factor: 0.8,
            ring_lift_factor: 0.5,
            ray_length_factor: 1.2,
            min_samples: 3,
            anticipate_distance: 1.2,
            anticipate_lift: 0.5,
            anticipate_depth: 1.0,
            anticipate_blend: 0.6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignConfig {
    /// Surfaces steeper than this are not aligned to.
    pub max_slope_degrees: f32,
    /// Slerp factor per tick when already grounded last tick.
    pub grounded_rate: f32,
    /// Slerp factor per tick on the landing tick.
    pub landing_rate: f32,
    /// Slerp factor per tick while airborne or swimming.
    pub airborne_rate: f32,
    pub max_look_pitch_degrees: f32,
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            max_slope_degrees: 45.0,
            grounded_rate: 0.15,
            landing_rate: 0.05,
            airborne_rate: 0.05,
            max_look_pitch_degrees: 85.0,
        }
    }
}

/// Grounded movement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundConfig {
    /// Requested walk speed (m/s).
    pub walk_speed: f32,
    pub sprint_multiplier: f32,
    /// Acceleration along the surface (m/s²).
    pub acceleration: f32,
    /// Horizontal damping rate with no input (1/s).
    pub idle_damping: f32,
    /// Horizontal damping rate while moving (1/s).
    pub moving_damping: f32,
    /// Slopes steeper than this slide when walking downhill.
    pub slide_angle_degrees: f32,
    /// Pull into the surface per radian of slope (m/s²).
    pub stick_force: f32,
    /// Pull into the surface applied even on flat ground (m/s²).
    pub stick_base: f32,
    /// Upward speed cap while no jump is active (m/s).
    pub max_upward_speed: f32,
    /// Horizontal speed cap as a multiple of the requested speed.
    pub speed_clamp_factor: f32,
}

impl Default for GroundConfig {
    fn default() -> Self {
        Self {
            walk_speed: 6.0,
            sprint_multiplier: 1.6,
            acceleration: 40.0,
            idle_damping: 10.0,
            moving_damping: 2.0,
            slide_angle_degrees: 30.0,
            stick_force: 12.0,
            stick_base: 2.0,
            max_upward_speed: 1.0,
            speed_clamp_factor: 1.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AirConfig {
    /// Air control acceleration (m/s²).
    pub control: f32,
    /// Damping rate across gravity (1/s).
    pub horizontal_damping: f32,
    /// Damping rate along gravity (1/s).
    pub vertical_damping: f32,
}

impl Default for AirConfig {
    fn default() -> Self {
        Self {
            control: 4.0,
            horizontal_damping: 0.1,
            vertical_damping: 0.02,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwimConfig {
    /// Buoyancy constant; the impulse per tick is mass × buoyancy × dt.
    pub buoyancy: f32,
    /// Swim acceleration (m/s²).
    pub control: f32,
    pub max_speed: f32,
    /// Uniform drag rate (1/s).
    pub drag: f32,
}

impl Default for SwimConfig {
    fn default() -> Self {
        Self {
            buoyancy: 3.0,
            control: 10.0,
            max_speed: 4.0,
            drag: 1.5,
        }
    }
}

/// Walking inside a moving vessel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VesselConfig {
    /// Artificial gravity as a multiple of planetary surface gravity.
    pub artificial_multiplier: f32,
    pub walk_speed: f32,
    pub acceleration: f32,
    /// Damping toward the inherited velocity with no input (1/s).
    pub idle_damping: f32,
    /// Damping toward the inherited velocity while moving (1/s).
    pub moving_damping: f32,
}

impl Default for VesselConfig {
    fn default() -> Self {
        Self {
            artificial_multiplier: 1.5,
            walk_speed: 4.0,
            acceleration: 30.0,
            idle_damping: 12.0,
            moving_damping: 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JumpConfig {
    /// Speed added along the up direction (m/s).
    pub speed: f32,
    /// How long a jump counts as active (s).
    pub duration: f32,
}

impl Default for JumpConfig {
    fn default() -> Self {
        Self {
            speed: 6.0,
            duration: 0.4,
        }
    }
}

/// Vehicle enter/exit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OccupancyConfig {
    /// Max distance from the agent to a vehicle it can enter (m).
    pub interaction_radius: f32,
    /// Re-entry lockout after exiting (s).
    pub exit_cooldown: f32,
    /// Exit points in each vehicle's local frame.
    pub car_exit_offset: Vec3,
    pub airplane_exit_offset: Vec3,
    pub spaceship_exit_offset: Vec3,
}

impl Default for OccupancyConfig {
    fn default() -> Self {
        Self {
            interaction_radius: 5.0,
            exit_cooldown: 1.0,
            car_exit_offset: Vec3::new(2.5, 0.0, 0.0),
            airplane_exit_offset: Vec3::new(4.0, 0.0, 0.0),
            spaceship_exit_offset: Vec3::new(0.0, 0.0, 6.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoorConfig {
    /// Full open or close animation time (s).
    pub duration: f32,
}

impl Default for DoorConfig {
    fn default() -> Self {
        Self { duration: 2.0 }
    }
}

/// Per-kind vehicle control gains. Accelerations are scaled by body mass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    pub car_thrust: f32,
    pub car_turn: f32,
    pub airplane_thrust: f32,
    pub airplane_turn: f32,
    /// Lift per unit forward speed (m/s² per m/s).
    pub airplane_lift: f32,
    pub spaceship_thrust: f32,
    pub spaceship_turn: f32,
    /// Thrust multiplier while sprint is held.
    pub boost: f32,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            car_thrust: 12.0,
            car_turn: 1.5,
            airplane_thrust: 20.0,
            airplane_turn: 1.0,
            airplane_lift: 0.25,
            spaceship_thrust: 15.0,
            spaceship_turn: 1.0,
            boost: 2.0,
        }
    }
}
