// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Curve capability and the bounded line

use crate::math::{unit, LINEAR_TOLERANCE};
use crate::{Error, Result, Transform};
use nalgebra::{Point3, Vector3};
use std::fmt;
use std::sync::Arc;

/// Parametric curve capability
///
/// Only evaluation and end points are needed by the kernel; concrete curve
/// kinds beyond [`Line`] are supplied by the host.
pub trait Curve: Send + Sync + fmt::Debug {
    /// Evaluate the curve
    ///
    /// With `normalized` set, `parameter` runs 0..=1 from the first end to
    /// the second; otherwise it is the raw parameter of the curve.
    fn evaluate(&self, parameter: f64, normalized: bool) -> Point3<f64>;

    /// End point by index (0 = start, 1 = end)
    fn end_point(&self, index: usize) -> Result<Point3<f64>>;

    /// Arc length
    fn length(&self) -> f64;

    /// A copy of this curve mapped through `transform`
    fn transformed(&self, transform: &Transform) -> Arc<dyn Curve>;

    /// Point halfway along the normalized parameter range
    fn midpoint(&self) -> Point3<f64> {
        self.evaluate(0.5, true)
    }
}

/// Bounded straight segment
///
/// The raw parameter is the distance from `start`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Line {
    start: Point3<f64>,
    end: Point3<f64>,
}

impl Line {
    /// Create a bound line between two points
    ///
    /// Fails if the points coincide.
    pub fn new(start: Point3<f64>, end: Point3<f64>) -> Result<Self> {
        if (end - start).norm() <= LINEAR_TOLERANCE {
            return Err(Error::invalid_argument("line end points coincide"));
        }
        Ok(Self { start, end })
    }

    /// Turn a vector into a line starting at `origin` (default: world
    /// origin) running along the vector for `length` (default: the
    /// vector's own length)
    pub fn from_vector(
        vector: &Vector3<f64>,
        origin: Option<Point3<f64>>,
        length: Option<f64>,
    ) -> Result<Self> {
        let origin = origin.unwrap_or_else(Point3::origin);
        let length = length.unwrap_or_else(|| vector.norm());
        let direction = unit(vector, "line vector")?;
        Self::new(origin, origin + direction * length)
    }

    /// Start point
    pub fn start(&self) -> Point3<f64> {
        self.start
    }

    /// End point
    pub fn end(&self) -> Point3<f64> {
        self.end
    }

    /// Unit direction from start to end
    pub fn direction(&self) -> Vector3<f64> {
        (self.end - self.start).normalize()
    }
}

impl Curve for Line {
    fn evaluate(&self, parameter: f64, normalized: bool) -> Point3<f64> {
        let t = if normalized {
            parameter
        } else {
            parameter / self.length()
        };
        self.start + (self.end - self.start) * t
    }

    fn end_point(&self, index: usize) -> Result<Point3<f64>> {
        match index {
            0 => Ok(self.start),
            1 => Ok(self.end),
            _ => Err(Error::invalid_argument(format!(
                "curve end point index must be 0 or 1, got {}",
                index
            ))),
        }
    }

    fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    fn transformed(&self, transform: &Transform) -> Arc<dyn Curve> {
        Arc::new(Line {
            start: transform.of_point(&self.start),
            end: transform.of_point(&self.end),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_line_midpoint() {
        let line = Line::new(Point3::new(0.0, 0.0, 0.0), Point3::new(4.0, 2.0, 0.0)).unwrap();
        assert_relative_eq!(line.midpoint(), Point3::new(2.0, 1.0, 0.0));
    }

    #[test]
    fn test_raw_parameter_is_distance() {
        let line = Line::new(Point3::new(1.0, 0.0, 0.0), Point3::new(1.0, 10.0, 0.0)).unwrap();
        assert_relative_eq!(line.evaluate(2.5, false), Point3::new(1.0, 2.5, 0.0));
        assert_relative_eq!(line.evaluate(0.25, true), Point3::new(1.0, 2.5, 0.0));
    }

    #[test]
    fn test_end_point_index() {
        let line = Line::new(Point3::origin(), Point3::new(0.0, 0.0, 3.0)).unwrap();
        assert_eq!(line.end_point(1).unwrap(), Point3::new(0.0, 0.0, 3.0));
        assert!(matches!(line.end_point(2), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_zero_length_line_rejected() {
        let p = Point3::new(1.0, 1.0, 1.0);
        assert!(Line::new(p, p).is_err());
    }

    #[test]
    fn test_from_vector_defaults() {
        let line = Line::from_vector(&Vector3::new(0.0, 3.0, 4.0), None, None).unwrap();
        assert_relative_eq!(line.length(), 5.0);
        assert_eq!(line.start(), Point3::origin());

        let start = Point3::new(0.0, 1.0, 0.0);
        let scaled =
            Line::from_vector(&Vector3::new(2.0, 0.0, 0.0), Some(start), Some(0.5)).unwrap();
        assert_relative_eq!(scaled.end(), Point3::new(0.5, 1.0, 0.0));
    }

    #[test]
    fn test_transformed_line() {
        let line = Line::new(Point3::origin(), Point3::new(1.0, 0.0, 0.0)).unwrap();
        let moved = line.transformed(&Transform::translation(Vector3::new(0.0, 0.0, 2.0)));
        assert_relative_eq!(moved.end_point(1).unwrap(), Point3::new(1.0, 0.0, 2.0));
    }
}
