//! Unit scaling between SI and simulation space
//!
//! Kinematic state is stored in simulation units (pixels), i.e. SI meters
//! multiplied by the world scale. Every value that crosses the core boundary
//! names its unit space with [`Units`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

/// Unit space of a value crossing the core boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Units {
    /// Meters, seconds, newtons
    Si,
    /// Pixels: SI lengths multiplied by the world scale
    Sim,
}

/// Pixels per meter. Positive and fixed for a world's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scale(f32);

impl Scale {
    pub fn new(pixels_per_meter: f32) -> Result<Self> {
        if pixels_per_meter.is_finite() && pixels_per_meter > 0.0 {
            Ok(Self(pixels_per_meter))
        } else {
            Err(SimError::NonPositiveScale {
                scale: pixels_per_meter,
            })
        }
    }

    #[inline]
    pub fn get(self) -> f32 {
        self.0
    }

    /// SI vector to simulation space
    #[inline]
    pub fn to_sim(self, v: Vec2) -> Vec2 {
        v * self.0
    }

    /// Simulation vector to SI space
    #[inline]
    pub fn to_si(self, v: Vec2) -> Vec2 {
        v / self.0
    }

    /// Bring a value given in `units` into simulation space
    #[inline]
    pub fn import(self, v: Vec2, units: Units) -> Vec2 {
        match units {
            Units::Si => self.to_sim(v),
            Units::Sim => v,
        }
    }

    /// Express a simulation-space value in `units`
    #[inline]
    pub fn export(self, v: Vec2, units: Units) -> Vec2 {
        match units {
            Units::Si => self.to_si(v),
            Units::Sim => v,
        }
    }

    /// Pre-scale a constant whose dimension carries `length_power` powers of meters.
    ///
    /// Accelerations and forces scale linearly; `G` and the Coulomb constant
    /// (m³) scale cubically.
    #[inline]
    pub fn constant(self, value: f32, length_power: i32) -> f32 {
        value * self.0.powi(length_power)
    }
}

/// Unit vector of `v`, or `None` for a zero/non-finite vector
#[inline]
pub fn direction(v: Vec2) -> Option<Vec2> {
    v.try_normalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_rejects_non_positive() {
        assert!(Scale::new(0.0).is_err());
        assert!(Scale::new(-5.0).is_err());
        assert!(Scale::new(f32::NAN).is_err());
        assert!(Scale::new(10.0).is_ok());
    }

    #[test]
    fn test_round_trip() {
        let scale = Scale::new(10.0).unwrap();
        let v = Vec2::new(3.5, -1.25);
        let back = scale.to_si(scale.to_sim(v));
        assert!((back - v).length() < 1e-5);
        assert_eq!(scale.to_sim(v), Vec2::new(35.0, -12.5));
    }

    #[test]
    fn test_import_export() {
        let scale = Scale::new(4.0).unwrap();
        let v = Vec2::new(1.0, 2.0);
        assert_eq!(scale.import(v, Units::Si), Vec2::new(4.0, 8.0));
        assert_eq!(scale.import(v, Units::Sim), v);
        assert_eq!(scale.export(v, Units::Si), Vec2::new(0.25, 0.5));
        assert_eq!(scale.export(v, Units::Sim), v);
    }

    #[test]
    fn test_constant_dimensions() {
        let scale = Scale::new(10.0).unwrap();
        assert!((scale.constant(9.8, 1) - 98.0).abs() < 1e-4);
        assert!((scale.constant(2.0, 3) - 2000.0).abs() < 1e-3);
        assert!((scale.constant(5.0, -2) - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_direction() {
        assert!(direction(Vec2::ZERO).is_none());
        let d = direction(Vec2::new(3.0, 4.0)).unwrap();
        assert!((d.length() - 1.0).abs() < 1e-6);
    }
}
