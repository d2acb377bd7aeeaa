//! Closed real intervals.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// A closed range `[min, max]` of reals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub min: f64,
    pub max: f64,
}

impl Interval {
    /// Create an interval, rejecting reversed or non-finite bounds.
    pub fn new(min: f64, max: f64) -> ModelResult<Self> {
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(ModelError::InvalidInterval { min, max });
        }
        Ok(Self { min, max })
    }

    /// The interval `[-radius, radius]`.
    pub fn symmetric(radius: f64) -> ModelResult<Self> {
        Self::new(-radius, radius)
    }

    /// A degenerate interval containing one point.
    pub fn point(value: f64) -> ModelResult<Self> {
        Self::new(value, value)
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }

    /// True when the bounds mirror each other around zero.
    pub fn is_symmetric(&self) -> bool {
        self.min == -self.max
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symmetric() {
        let i = Interval::symmetric(0.25).unwrap();
        assert_eq!(i.min, -0.25);
        assert_eq!(i.max, 0.25);
        assert!(i.is_symmetric());
        assert!(i.contains(0.0));
        assert!(!i.contains(0.3));
        assert_eq!(i.width(), 0.5);
        assert_eq!(i.to_string(), "[-0.25, 0.25]");
    }

    #[test]
    fn test_rejects_bad_bounds() {
        assert!(Interval::new(1.0, 0.0).is_err());
        assert!(Interval::new(f64::NAN, 0.0).is_err());
        assert!(Interval::symmetric(-1.0).is_err());
        assert!(Interval::point(3.0).is_ok());
    }
}
