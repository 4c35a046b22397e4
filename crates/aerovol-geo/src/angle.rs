//! Plane angles stored in radians, with the normalization conventions used
//! throughout the geometry generators: longitudes wrap to (-PI, PI], azimuths
//! wrap to [0, TAU).

use std::f64::consts::{PI, TAU};
use std::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// A plane angle. Thin wrapper over radians so that azimuth and longitude
/// normalization rules live in one place instead of at every call site.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Angle {
    radians: f64,
}

impl Angle {
    pub const ZERO: Angle = Angle { radians: 0.0 };
    pub const POS90: Angle = Angle { radians: PI / 2.0 };
    pub const POS180: Angle = Angle { radians: PI };

    #[must_use]
    pub const fn from_radians(radians: f64) -> Self {
        Self { radians }
    }

    #[must_use]
    pub fn from_degrees(degrees: f64) -> Self {
        Self {
            radians: degrees.to_radians(),
        }
    }

    #[must_use]
    pub const fn radians(self) -> f64 {
        self.radians
    }

    #[must_use]
    pub fn degrees(self) -> f64 {
        self.radians.to_degrees()
    }

    /// Wraps into (-PI, PI]. Used for longitudes and signed turn angles.
    #[must_use]
    pub fn normalized_signed(self) -> Self {
        let mut r = self.radians % TAU;
        if r <= -PI {
            r += TAU;
        } else if r > PI {
            r -= TAU;
        }
        Self { radians: r }
    }

    /// Wraps into [0, TAU). Used for azimuths.
    #[must_use]
    pub fn normalized_azimuth(self) -> Self {
        let mut r = self.radians % TAU;
        if r < 0.0 {
            r += TAU;
        }
        Self { radians: r }
    }

    /// Absolute shortest angular distance to `other`, in [0, PI].
    #[must_use]
    pub fn angular_distance_to(self, other: Angle) -> Angle {
        let d = (other - self).normalized_signed().radians.abs();
        Self { radians: d }
    }

    /// Linear interpolation between two angles. Does not take the short way
    /// around; both operands are interpolated as plain numbers.
    #[must_use]
    pub fn mix(amount: f64, a: Angle, b: Angle) -> Angle {
        Angle {
            radians: a.radians + amount * (b.radians - a.radians),
        }
    }

    #[must_use]
    pub fn sin(self) -> f64 {
        self.radians.sin()
    }

    #[must_use]
    pub fn cos(self) -> f64 {
        self.radians.cos()
    }
}

impl Add for Angle {
    type Output = Angle;

    fn add(self, rhs: Angle) -> Angle {
        Angle {
            radians: self.radians + rhs.radians,
        }
    }
}

impl Sub for Angle {
    type Output = Angle;

    fn sub(self, rhs: Angle) -> Angle {
        Angle {
            radians: self.radians - rhs.radians,
        }
    }
}

impl Neg for Angle {
    type Output = Angle;

    fn neg(self) -> Angle {
        Angle {
            radians: -self.radians,
        }
    }
}

impl Mul<f64> for Angle {
    type Output = Angle;

    fn mul(self, rhs: f64) -> Angle {
        Angle {
            radians: self.radians * rhs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_signed_wraps_into_half_open_range() {
        assert!((Angle::from_degrees(270.0).normalized_signed().degrees() - -90.0).abs() < 1e-9);
        assert!((Angle::from_degrees(-270.0).normalized_signed().degrees() - 90.0).abs() < 1e-9);
        // PI maps to itself, -PI maps to PI
        assert!((Angle::from_degrees(180.0).normalized_signed().degrees() - 180.0).abs() < 1e-9);
        assert!((Angle::from_degrees(-180.0).normalized_signed().degrees() - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_normalized_azimuth_wraps_into_full_turn() {
        assert!((Angle::from_degrees(-90.0).normalized_azimuth().degrees() - 270.0).abs() < 1e-9);
        assert!((Angle::from_degrees(370.0).normalized_azimuth().degrees() - 10.0).abs() < 1e-9);
        assert_eq!(Angle::ZERO.normalized_azimuth().radians(), 0.0);
    }

    #[test]
    fn test_angular_distance_takes_short_way() {
        let a = Angle::from_degrees(350.0);
        let b = Angle::from_degrees(10.0);
        assert!((a.angular_distance_to(b).degrees() - 20.0).abs() < 1e-9);
        assert!((b.angular_distance_to(a).degrees() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_mix_is_linear_not_shortest_path() {
        let a = Angle::from_degrees(0.0);
        let b = Angle::from_degrees(300.0);
        let mid = Angle::mix(0.5, a, b);
        assert!((mid.degrees() - 150.0).abs() < 1e-9, "mix interpolates raw values: {}", mid.degrees());
    }
}
