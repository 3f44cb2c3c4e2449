//! Gravity direction and strength for a world position.

use glam::{Quat, Vec3};

/// Surface gravity used when no planet is defined (m/s²).
pub const FALLBACK_STRENGTH: f32 = 9.81;

/// Gravity at one point. `direction` is unit length and points toward the attractor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GravitySample {
    pub direction: Vec3,
    pub strength: f32,
}

impl GravitySample {
    /// Gravity acceleration vector.
    pub fn acceleration(&self) -> Vec3 {
        self.direction * self.strength
    }

    /// Unit vector away from the attractor.
    pub fn up(&self) -> Vec3 {
        -self.direction
    }
}

/// A spherical attracting body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Planet {
    pub center: Vec3,
    pub radius: f32,
    /// Gravity at and above the surface (m/s²).
    pub strength: f32,
}

/// Gravity sources of the world: an optional planet plus vessel interiors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GravityField {
    pub planet: Option<Planet>,
    /// Strength used with the world −Y fallback.
    pub fallback_strength: f32,
    /// Vessel artificial gravity as a multiple of surface gravity.
    pub artificial_multiplier: f32,
}

impl Default for GravityField {
    fn default() -> Self {
        Self {
            planet: None,
            fallback_strength: FALLBACK_STRENGTH,
            artificial_multiplier: 1.5,
        }
    }
}

impl GravityField {
    pub fn planet(center: Vec3, radius: f32, strength: f32) -> Self {
        Self {
            planet: Some(Planet {
                center,
                radius,
                strength,
            }),
            ..Default::default()
        }
    }

    pub fn with_artificial_multiplier(mut self, multiplier: f32) -> Self {
        self.artificial_multiplier = multiplier;
        self
    }

    fn fallback(&self) -> GravitySample {
        GravitySample {
            direction: Vec3::NEG_Y,
            strength: self.fallback_strength,
        }
    }

    /// Planetary gravity at `position`.
    ///
    /// Strength falls off linearly inside the body so the centre is not a
    /// singularity. No planet, or a position at its centre, gives world −Y.
    pub fn sample(&self, position: Vec3) -> GravitySample {
        let Some(planet) = self.planet else {
            return self.fallback();
        };
        let to_center = planet.center - position;
        let distance = to_center.length();
        if !distance.is_finite() || distance < 1e-4 {
            return self.fallback();
        }
        let falloff = if planet.radius > 0.0 {
            (distance / planet.radius).min(1.0)
        } else {
            1.0
        };
        GravitySample {
            direction: to_center / distance,
            strength: planet.strength * falloff,
        }
    }

    /// Artificial gravity inside a vessel: the vessel's local −Y in world space.
    pub fn sample_vessel(&self, vessel_rotation: Quat) -> GravitySample {
        let surface = self.planet.map_or(self.fallback_strength, |p| p.strength);
        let direction = (vessel_rotation * Vec3::NEG_Y).try_normalize().unwrap_or(Vec3::NEG_Y);
        GravitySample {
            direction,
            strength: surface * self.artificial_multiplier,
        }
    }
}
