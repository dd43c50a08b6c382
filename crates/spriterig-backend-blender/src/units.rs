//! Angle units at the scene boundary.
//!
//! Project files and rig parameters speak degrees; hosts store radians. Every
//! rotation handed to a [`Scene`](crate::scene::Scene) goes through [`Euler`],
//! which is the only place the conversion happens.

use serde::{Deserialize, Serialize};
use spriterig_spec::Vec3;

/// Converts degrees to radians.
pub fn deg_to_rad(degrees: f64) -> f64 {
    degrees.to_radians()
}

/// Converts radians to degrees.
pub fn rad_to_deg(radians: f64) -> f64 {
    radians.to_degrees()
}

/// XYZ Euler rotation stored in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Euler([f64; 3]);

impl Euler {
    /// No rotation.
    pub const IDENTITY: Euler = Euler([0.0, 0.0, 0.0]);

    /// Builds a rotation from XYZ angles in degrees.
    pub fn from_degrees(degrees: Vec3) -> Self {
        Euler([
            deg_to_rad(degrees[0]),
            deg_to_rad(degrees[1]),
            deg_to_rad(degrees[2]),
        ])
    }

    /// Builds a rotation from XYZ angles in radians.
    pub fn from_radians(radians: [f64; 3]) -> Self {
        Euler(radians)
    }

    /// Rotation about the vertical (Z) axis only.
    pub fn yaw(degrees: f64) -> Self {
        Euler([0.0, 0.0, deg_to_rad(degrees)])
    }

    /// Returns the XYZ angles in radians.
    pub fn radians(&self) -> [f64; 3] {
        self.0
    }

    /// Returns the XYZ angles in degrees.
    pub fn degrees(&self) -> Vec3 {
        [rad_to_deg(self.0[0]), rad_to_deg(self.0[1]), rad_to_deg(self.0[2])]
    }

    /// Returns the Z angle in degrees.
    pub fn yaw_degrees(&self) -> f64 {
        rad_to_deg(self.0[2])
    }
}
