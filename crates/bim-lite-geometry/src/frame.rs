// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Oriented frames and section boxes
//!
//! Builds a right/up/forward frame looking against an object's facing
//! direction, and the local box used to clip a view around the object.

use crate::{Error, Result};
use bim_lite_model::math::unit;
use bim_lite_model::{BoundingBox, Line, Transform};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Build an orthonormal frame that looks back at a facing direction
///
/// forward = -facing, right = world_up × forward, up = world_up. When
/// `facing` is tilted out of the horizontal plane, up is re-derived as
/// forward × right so the basis stays orthonormal. The origin is the world
/// origin.
///
/// Fails with `DegenerateDirection` when either vector has near-zero length
/// or the two are parallel.
pub fn build_frame(facing: &Vector3<f64>, world_up: &Vector3<f64>) -> Result<Transform> {
    let forward = -unit(facing, "facing direction")?;
    let up = unit(world_up, "world up")?;
    let right = unit(&up.cross(&forward), "facing parallel to world up")?;
    let up = forward.cross(&right);

    Ok(Transform::from_basis(Point3::origin(), right, up, forward))
}

/// Box around `origin` in the local coordinates of `frame`
///
/// The box spans `[-half_width, half_width]` along right, `[-below, above]`
/// along up and `[0, depth]` along forward. Extents must be non-negative.
pub fn build_local_box(
    origin: Point3<f64>,
    frame: &Transform,
    half_width: f64,
    below: f64,
    above: f64,
    depth: f64,
) -> Result<BoundingBox> {
    for (name, value) in [
        ("half width", half_width),
        ("below", below),
        ("above", above),
        ("depth", depth),
    ] {
        if !(value >= 0.0) || !value.is_finite() {
            return Err(Error::invalid_argument(format!(
                "box extent {} must be non-negative, got {}",
                name, value
            )));
        }
    }

    Ok(BoundingBox::new(
        Point3::new(-half_width, -below, 0.0),
        Point3::new(half_width, above, depth),
    )
    .with_transform(frame.with_origin(origin)))
}

/// Extents of a section box around an oriented object
///
/// Defaults suit a door: 3 either side, 2 below, 7 above and 3 deep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionBoxExtents {
    /// Distance either side along right
    pub half_width: f64,
    /// Distance below the origin along up
    pub below: f64,
    /// Distance above the origin along up
    pub above: f64,
    /// Distance along forward
    pub depth: f64,
}

impl Default for SectionBoxExtents {
    fn default() -> Self {
        Self {
            half_width: 3.0,
            below: 2.0,
            above: 7.0,
            depth: 3.0,
        }
    }
}

impl SectionBoxExtents {
    /// Same box scaled by `factor` on every side
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            half_width: self.half_width * factor,
            below: self.below * factor,
            above: self.above * factor,
            depth: self.depth * factor,
        }
    }
}

/// Section box in front of an object at `origin` facing `facing`
pub fn section_box(
    origin: Point3<f64>,
    facing: &Vector3<f64>,
    world_up: &Vector3<f64>,
    extents: &SectionBoxExtents,
) -> Result<BoundingBox> {
    let frame = build_frame(facing, world_up)?;
    build_local_box(
        origin,
        &frame,
        extents.half_width,
        extents.below,
        extents.above,
        extents.depth,
    )
}

/// Outline of a frame for display
///
/// Four edges of the square spanned by right and up at `scale` from the
/// origin, then a unit line along forward.
pub fn frame_outline(frame: &Transform, scale: f64) -> Result<Vec<Line>> {
    let o = frame.origin;
    let (x, y) = (frame.basis_x * scale, frame.basis_y * scale);
    let upper_right = o + x + y;
    let upper_left = o - x + y;
    let lower_right = o + x - y;
    let lower_left = o - x - y;

    Ok(vec![
        Line::new(upper_right, upper_left)?,
        Line::new(upper_right, lower_right)?,
        Line::new(upper_left, lower_left)?,
        Line::new(lower_left, lower_right)?,
        Line::new(o, o + frame.basis_z)?,
    ])
}
