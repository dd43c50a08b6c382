//! Direction sets and compass directions.
//!
//! A direction set subdivides a full turn into `n` equal steps. Direction
//! index `i` maps to `i * 360 / n` degrees of pivot yaw.

use serde::{Deserialize, Serialize};

use crate::error::SpecError;

/// Number of directions used by the compass selector.
pub const COMPASS_DIRECTION_COUNT: usize = 8;

/// An ordered set of evenly spaced yaw angles in degrees, covering `[0, 360)`.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionSet {
    angles: Vec<f64>,
}

impl DirectionSet {
    /// Returns the number of directions.
    pub fn len(&self) -> usize {
        self.angles.len()
    }

    /// Always false; a direction set holds at least one angle.
    pub fn is_empty(&self) -> bool {
        self.angles.is_empty()
    }

    /// Returns the angular step between neighbouring directions.
    pub fn step(&self) -> f64 {
        360.0 / self.angles.len() as f64
    }

    /// Returns the angle at `index`, if in range.
    pub fn angle(&self, index: usize) -> Option<f64> {
        self.angles.get(index).copied()
    }

    /// Returns all angles in order.
    pub fn angles(&self) -> &[f64] {
        &self.angles
    }

    /// Iterates `(index, angle)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.angles.iter().copied().enumerate()
    }
}

/// Generates `n` evenly spaced yaw angles, `angle[i] = i * 360 / n`.
///
/// # Errors
/// Returns [`SpecError::InvalidArgument`] when `n <= 0`.
///
/// # Example
/// ```
/// use spriterig_spec::generate_directions;
///
/// let set = generate_directions(8).unwrap();
/// assert_eq!(set.angles(), &[0.0, 45.0, 90.0, 135.0, 180.0, 225.0, 270.0, 315.0]);
/// assert!(generate_directions(0).is_err());
/// ```
pub fn generate_directions(n: i64) -> Result<DirectionSet, SpecError> {
    if n <= 0 {
        return Err(SpecError::invalid_argument(format!(
            "direction count must be a positive integer, got {}",
            n
        )));
    }
    let count = usize::try_from(n).map_err(|_| {
        SpecError::invalid_argument(format!("direction count {} does not fit in memory", n))
    })?;

    let step = 360.0 / n as f64;
    let angles = (0..count).map(|i| i as f64 * step).collect();
    Ok(DirectionSet { angles })
}

/// The eight compass directions offered by the direction selector.
///
/// Indices follow the selector order, starting at south and turning clockwise
/// as seen from above.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CompassDirection {
    S,
    SW,
    W,
    NW,
    N,
    NE,
    E,
    SE,
}

impl CompassDirection {
    /// Returns all compass directions in index order.
    pub fn all() -> &'static [CompassDirection] {
        &[
            CompassDirection::S,
            CompassDirection::SW,
            CompassDirection::W,
            CompassDirection::NW,
            CompassDirection::N,
            CompassDirection::NE,
            CompassDirection::E,
            CompassDirection::SE,
        ]
    }

    /// Returns the zero-based direction index.
    pub fn index(&self) -> usize {
        match self {
            CompassDirection::S => 0,
            CompassDirection::SW => 1,
            CompassDirection::W => 2,
            CompassDirection::NW => 3,
            CompassDirection::N => 4,
            CompassDirection::NE => 5,
            CompassDirection::E => 6,
            CompassDirection::SE => 7,
        }
    }

    /// Returns the compass label.
    pub fn label(&self) -> &'static str {
        match self {
            CompassDirection::S => "S",
            CompassDirection::SW => "SW",
            CompassDirection::W => "W",
            CompassDirection::NW => "NW",
            CompassDirection::N => "N",
            CompassDirection::NE => "NE",
            CompassDirection::E => "E",
            CompassDirection::SE => "SE",
        }
    }

    /// Converts a direction index into a compass direction.
    ///
    /// # Errors
    /// Returns [`SpecError::InvalidArgument`] when `index` is not in `0..8`.
    pub fn from_index(index: i64) -> Result<Self, SpecError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::all().get(i).copied())
            .ok_or_else(|| {
                SpecError::invalid_argument(format!(
                    "direction index must be in 0..{}, got {}",
                    COMPASS_DIRECTION_COUNT, index
                ))
            })
    }

    /// Returns the pivot yaw in degrees for this direction.
    pub fn yaw_degrees(&self) -> f64 {
        self.index() as f64 * 360.0 / COMPASS_DIRECTION_COUNT as f64
    }
}

impl std::fmt::Display for CompassDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for CompassDirection {
    type Err = SpecError;

    /// Parses the selector keys `"0"`..`"7"` or a compass label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(index) = trimmed.parse::<i64>() {
            return Self::from_index(index);
        }
        Self::all()
            .iter()
            .copied()
            .find(|d| d.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| {
                SpecError::invalid_argument(format!("unknown compass direction: '{}'", s))
            })
    }
}
