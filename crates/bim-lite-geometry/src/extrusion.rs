// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Extrusion of plan footprints into closed solids

use crate::triangulation::triangulate_footprint;
use crate::{Error, Result};
use bim_lite_model::{Face, PolygonRegion, Solid};
use nalgebra::{Point2, Point3};

/// Extrude a plan footprint vertically into a closed solid
///
/// The footprint may run either way round and may be concave. Caps are
/// triangulated; each footprint edge becomes one quad side face. Faces are
/// oriented outward.
pub fn extrude_footprint(
    footprint: &[Point2<f64>],
    base_elevation: f64,
    height: f64,
) -> Result<Solid> {
    if !(height > 0.0) || !height.is_finite() {
        return Err(Error::invalid_argument(format!(
            "extrusion height must be positive, got {}",
            height
        )));
    }

    let triangles = triangulate_footprint(footprint)?;

    // Sides are built from the counter-clockwise loop
    let mut outline: Vec<Point2<f64>> = footprint.to_vec();
    if signed_area(&outline) < 0.0 {
        outline.reverse();
    }

    let top = base_elevation + height;
    let at = |p: &Point2<f64>, z: f64| Point3::new(p.x, p.y, z);

    let mut faces = Vec::with_capacity(triangles.len() * 2 + outline.len());
    for [a, b, c] in &triangles {
        let (pa, pb, pc) = (&footprint[*a], &footprint[*b], &footprint[*c]);
        faces.push(Face::new(vec![at(pa, top), at(pb, top), at(pc, top)])?);
        faces.push(Face::new(vec![
            at(pa, base_elevation),
            at(pc, base_elevation),
            at(pb, base_elevation),
        ])?);
    }

    let n = outline.len();
    for i in 0..n {
        let (p, q) = (&outline[i], &outline[(i + 1) % n]);
        if (q - p).norm() <= bim_lite_model::LINEAR_TOLERANCE {
            continue;
        }
        faces.push(Face::new(vec![
            at(p, base_elevation),
            at(q, base_elevation),
            at(q, top),
            at(p, top),
        ])?);
    }

    Ok(Solid::from_faces(faces))
}

/// Solid occupied by a room
pub fn extrude_region(region: &PolygonRegion) -> Result<Solid> {
    extrude_footprint(region.footprint(), region.base_elevation(), region.height())
}

fn signed_area(points: &[Point2<f64>]) -> f64 {
    let n = points.len();
    (0..n)
        .map(|i| {
            let (a, b) = (&points[i], &points[(i + 1) % n]);
            a.x * b.y - b.x * a.y
        })
        .sum::<f64>()
        * 0.5
}
