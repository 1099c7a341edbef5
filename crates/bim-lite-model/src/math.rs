// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Vector helpers, tolerances and oriented frames

use crate::{Error, Result};
use nalgebra::{Matrix4, Point3, Vector3};

/// Lengths at or below this are treated as zero
pub const LINEAR_TOLERANCE: f64 = 1e-9;

/// Normalize a vector, failing with `DegenerateDirection` when its length
/// is near zero or not finite
///
/// `what` names the vector in the error message.
pub fn unit(v: &Vector3<f64>, what: &str) -> Result<Vector3<f64>> {
    match v.try_normalize(LINEAR_TOLERANCE) {
        Some(n) if n.iter().all(|c| c.is_finite()) => Ok(n),
        _ => Err(Error::degenerate_direction(format!(
            "{} has near-zero length",
            what
        ))),
    }
}

/// Project a vector onto the horizontal (XY) plane
#[inline]
pub fn horizontal(v: &Vector3<f64>) -> Vector3<f64> {
    Vector3::new(v.x, v.y, 0.0)
}

/// Horizontal perpendicular of a direction (rotated +90° about Z)
#[inline]
pub fn horizontal_perpendicular(v: &Vector3<f64>) -> Vector3<f64> {
    Vector3::new(-v.y, v.x, 0.0)
}

/// Move a point along a direction by a distance
///
/// The direction is normalized first, so only its orientation matters.
pub fn move_along(
    point: &Point3<f64>,
    direction: &Vector3<f64>,
    distance: f64,
) -> Result<Point3<f64>> {
    Ok(point + unit(direction, "move direction")? * distance)
}

/// Midpoint of two points
#[inline]
pub fn midpoint(a: &Point3<f64>, b: &Point3<f64>) -> Point3<f64> {
    nalgebra::center(a, b)
}

/// Local-to-world frame: an origin plus right/up/forward basis vectors
///
/// The basis is expected to be orthonormal for `inverse_of_point` to be
/// exact; `of_point`/`of_vector` work for any basis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// Origin of the local frame in world coordinates
    pub origin: Point3<f64>,
    /// Local X (right)
    pub basis_x: Vector3<f64>,
    /// Local Y (up)
    pub basis_y: Vector3<f64>,
    /// Local Z (forward)
    pub basis_z: Vector3<f64>,
}

impl Transform {
    /// Identity transform
    pub fn identity() -> Self {
        Self {
            origin: Point3::origin(),
            basis_x: Vector3::x(),
            basis_y: Vector3::y(),
            basis_z: Vector3::z(),
        }
    }

    /// Create a transform from an origin and three basis vectors
    pub fn from_basis(
        origin: Point3<f64>,
        basis_x: Vector3<f64>,
        basis_y: Vector3<f64>,
        basis_z: Vector3<f64>,
    ) -> Self {
        Self {
            origin,
            basis_x,
            basis_y,
            basis_z,
        }
    }

    /// Pure translation
    pub fn translation(offset: Vector3<f64>) -> Self {
        Self {
            origin: Point3::from(offset),
            ..Self::identity()
        }
    }

    /// Same basis, different origin
    pub fn with_origin(mut self, origin: Point3<f64>) -> Self {
        self.origin = origin;
        self
    }

    /// Map a local point to world coordinates
    #[inline]
    pub fn of_point(&self, point: &Point3<f64>) -> Point3<f64> {
        self.origin + self.of_vector(&point.coords)
    }

    /// Map a local vector to world coordinates (no translation)
    #[inline]
    pub fn of_vector(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.basis_x * v.x + self.basis_y * v.y + self.basis_z * v.z
    }

    /// Map a world point into this frame's local coordinates
    ///
    /// Exact for orthonormal bases.
    #[inline]
    pub fn inverse_of_point(&self, point: &Point3<f64>) -> Point3<f64> {
        let d = point - self.origin;
        Point3::new(d.dot(&self.basis_x), d.dot(&self.basis_y), d.dot(&self.basis_z))
    }

    /// Compose `self` after `inner`: the result maps `inner`'s local space
    /// straight into `self`'s world space
    pub fn compose(&self, inner: &Transform) -> Transform {
        Transform {
            origin: self.of_point(&inner.origin),
            basis_x: self.of_vector(&inner.basis_x),
            basis_y: self.of_vector(&inner.basis_y),
            basis_z: self.of_vector(&inner.basis_z),
        }
    }

    /// Check whether this is the identity within `tolerance`
    pub fn is_identity(&self, tolerance: f64) -> bool {
        let id = Self::identity();
        (self.origin - id.origin).norm() <= tolerance
            && (self.basis_x - id.basis_x).norm() <= tolerance
            && (self.basis_y - id.basis_y).norm() <= tolerance
            && (self.basis_z - id.basis_z).norm() <= tolerance
    }

    /// Check that the basis vectors are unit length and mutually orthogonal
    pub fn is_orthonormal(&self, tolerance: f64) -> bool {
        let (x, y, z) = (&self.basis_x, &self.basis_y, &self.basis_z);
        (x.norm() - 1.0).abs() <= tolerance
            && (y.norm() - 1.0).abs() <= tolerance
            && (z.norm() - 1.0).abs() <= tolerance
            && x.dot(y).abs() <= tolerance
            && y.dot(z).abs() <= tolerance
            && z.dot(x).abs() <= tolerance
    }

    /// Check that X × Y points along Z
    pub fn is_right_handed(&self) -> bool {
        self.basis_x.cross(&self.basis_y).dot(&self.basis_z) > 0.0
    }

    /// 4x4 homogeneous matrix (basis vectors as columns)
    pub fn to_matrix(&self) -> Matrix4<f64> {
        let (x, y, z, o) = (&self.basis_x, &self.basis_y, &self.basis_z, &self.origin);
        Matrix4::new(
            x.x, y.x, z.x, o.x, x.y, y.y, z.y, o.y, x.z, y.z, z.z, o.z, 0.0, 0.0, 0.0, 1.0,
        )
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Box between `min` and `max` expressed in the coordinates of `transform`
///
/// With an identity transform this is a world axis-aligned box; with any
/// other transform it is an oriented box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    /// Minimum corner in local coordinates
    pub min: Point3<f64>,
    /// Maximum corner in local coordinates
    pub max: Point3<f64>,
    /// Local-to-world frame of the box
    pub transform: Transform,
}

impl BoundingBox {
    /// Create an axis-aligned box in world coordinates
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self {
            min,
            max,
            transform: Transform::identity(),
        }
    }

    /// Set the frame the corners are expressed in
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Smallest axis-aligned box containing all points
    ///
    /// Returns `None` for an empty iterator.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3<f64>>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let (min, max) = iter.fold((first, first), |(min, max), p| {
            (min.inf(p), max.sup(p))
        });
        Some(Self::new(min, max))
    }

    /// Check if any extent is inverted
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Extents along the local axes
    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// Centre in world coordinates
    pub fn center(&self) -> Point3<f64> {
        self.transform.of_point(&midpoint(&self.min, &self.max))
    }

    /// Check if a world point lies inside (boundary inclusive)
    pub fn contains(&self, point: &Point3<f64>) -> bool {
        let local = self.transform.inverse_of_point(point);
        let eps = LINEAR_TOLERANCE;
        local.x >= self.min.x - eps
            && local.x <= self.max.x + eps
            && local.y >= self.min.y - eps
            && local.y <= self.max.y + eps
            && local.z >= self.min.z - eps
            && local.z <= self.max.z + eps
    }

    /// The eight corners in world coordinates
    pub fn corners(&self) -> [Point3<f64>; 8] {
        let (a, b) = (&self.min, &self.max);
        [
            Point3::new(a.x, a.y, a.z),
            Point3::new(b.x, a.y, a.z),
            Point3::new(b.x, b.y, a.z),
            Point3::new(a.x, b.y, a.z),
            Point3::new(a.x, a.y, b.z),
            Point3::new(b.x, a.y, b.z),
            Point3::new(b.x, b.y, b.z),
            Point3::new(a.x, b.y, b.z),
        ]
        .map(|p| self.transform.of_point(&p))
    }

    /// World axis-aligned box enclosing this (possibly oriented) box
    pub fn world_aligned(&self) -> BoundingBox {
        let corners = self.corners();
        // Eight corners, never empty
        Self::from_points(corners.iter()).unwrap_or(*self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_unit_rejects_zero() {
        let err = unit(&Vector3::zeros(), "facing").unwrap_err();
        assert!(matches!(err, Error::DegenerateDirection(_)));
    }

    #[test]
    fn test_unit_rejects_nan() {
        assert!(unit(&Vector3::new(f64::NAN, 0.0, 1.0), "facing").is_err());
    }

    #[test]
    fn test_move_along_uses_direction_only() {
        let moved =
            move_along(&Point3::new(1.0, 1.0, 0.0), &Vector3::new(10.0, 0.0, 0.0), 2.0).unwrap();
        assert_relative_eq!(moved, Point3::new(3.0, 1.0, 0.0));
    }

    #[test]
    fn test_transform_round_trip() {
        let t = Transform::from_basis(
            Point3::new(5.0, 0.0, 1.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(1.0, 0.0, 0.0),
        );
        assert!(t.is_orthonormal(1e-12));
        assert!(t.is_right_handed());

        let local = Point3::new(1.0, 2.0, 3.0);
        let world = t.of_point(&local);
        assert_relative_eq!(world, Point3::new(8.0, 1.0, 3.0));
        assert_relative_eq!(t.inverse_of_point(&world), local);
    }

    #[test]
    fn test_compose_applies_inner_first() {
        let outer = Transform::translation(Vector3::new(10.0, 0.0, 0.0));
        let inner = Transform::translation(Vector3::new(0.0, 1.0, 0.0));
        let both = outer.compose(&inner);
        assert!(!both.is_identity(1e-12));
        assert!(Transform::identity().compose(&Transform::identity()).is_identity(0.0));
        assert_relative_eq!(both.of_point(&Point3::origin()), Point3::new(10.0, 1.0, 0.0));
    }

    #[test]
    fn test_matrix_matches_of_point() {
        let t = Transform::from_basis(
            Point3::new(1.0, 2.0, 3.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(-1.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
        );
        let p = Point3::new(0.5, -2.0, 4.0);
        let m = t.to_matrix();
        let h = m * p.to_homogeneous();
        assert_relative_eq!(Point3::new(h.x, h.y, h.z), t.of_point(&p));
    }

    #[test]
    fn test_oriented_box_contains() {
        // Box rotated 90° about Z, sitting at x = 10
        let frame = Transform::from_basis(
            Point3::new(10.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(-1.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
        );
        let bbox = BoundingBox::new(Point3::new(0.0, 0.0, 0.0), Point3::new(4.0, 1.0, 1.0))
            .with_transform(frame);

        // Local +X is world +Y
        assert!(bbox.contains(&Point3::new(9.5, 3.0, 0.5)));
        assert!(!bbox.contains(&Point3::new(13.0, 0.5, 0.5)));

        let aligned = bbox.world_aligned();
        assert_relative_eq!(aligned.min, Point3::new(9.0, 0.0, 0.0));
        assert_relative_eq!(aligned.max, Point3::new(10.0, 4.0, 1.0));
    }

    #[test]
    fn test_from_points() {
        let pts = [
            Point3::new(1.0, -1.0, 0.0),
            Point3::new(-2.0, 3.0, 5.0),
            Point3::new(0.0, 0.0, -1.0),
        ];
        let bbox = BoundingBox::from_points(pts.iter()).unwrap();
        assert_eq!(bbox.min, Point3::new(-2.0, -1.0, -1.0));
        assert_eq!(bbox.max, Point3::new(1.0, 3.0, 5.0));
        assert!(BoundingBox::from_points(std::iter::empty()).is_none());
    }
}
