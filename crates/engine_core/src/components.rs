//! Common per-entity components used across the simulation.

use glam::Vec3;

/// Velocity component for moving entities.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Velocity {
    pub linear: Vec3,
    pub angular: Vec3,
}

impl Velocity {
    pub fn new(linear: Vec3) -> Self {
        Self {
            linear,
            angular: Vec3::ZERO,
        }
    }

    pub fn with_angular(linear: Vec3, angular: Vec3) -> Self {
        Self { linear, angular }
    }

    /// Velocity of a point rigidly attached to a body spinning about `center`.
    pub fn at_point(&self, center: Vec3, point: Vec3) -> Vec3 {
        self.linear + self.angular.cross(point - center)
    }
}

/// Countdown timer for cooldowns and short-lived flags.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Timer {
    pub remaining: f32,
}

impl Timer {
    pub fn new(seconds: f32) -> Self {
        Self {
            remaining: seconds.max(0.0),
        }
    }

    /// Re-arm the timer.
    pub fn start(&mut self, seconds: f32) {
        self.remaining = seconds.max(0.0);
    }

    /// Stop the timer immediately.
    pub fn clear(&mut self) {
        self.remaining = 0.0;
    }

    /// Advance by `dt`. Returns true on the tick the timer runs out.
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.remaining <= 0.0 {
            return false;
        }
        self.remaining = (self.remaining - dt).max(0.0);
        self.remaining <= 0.0
    }

    pub fn is_active(&self) -> bool {
        self.remaining > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_velocity_includes_spin() {
        let v = Velocity::with_angular(Vec3::X, Vec3::new(0.0, 1.0, 0.0));
        // ω = +Y, r = +X  →  ω × r = -Z
        let p = v.at_point(Vec3::ZERO, Vec3::X);
        assert!((p - Vec3::new(1.0, 0.0, -1.0)).length() < 1e-6);
    }

    #[test]
    fn timer_fires_once() {
        let mut t = Timer::new(0.1);
        assert!(t.is_active());
        assert!(!t.tick(0.05));
        assert!(t.tick(0.06));
        assert!(!t.is_active());
        assert!(!t.tick(0.06));
    }
}
