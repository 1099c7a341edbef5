// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Footprint triangulation
//!
//! Splits room footprints into counter-clockwise triangles, using earcutr
//! for concave outlines.

use crate::{Error, Result};
use nalgebra::Point2;

/// Twice the signed area of a plan triangle, positive when counter-clockwise
#[inline]
fn orient(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Check if every turn of the loop goes the same way
///
/// Collinear runs are ignored.
fn is_convex(points: &[Point2<f64>]) -> bool {
    let n = points.len();
    let mut sign = 0.0_f64;
    for i in 0..n {
        let turn = orient(&points[i], &points[(i + 1) % n], &points[(i + 2) % n]);
        if turn.abs() <= 1e-12 {
            continue;
        }
        if sign == 0.0 {
            sign = turn.signum();
        } else if sign != turn.signum() {
            return false;
        }
    }
    true
}

/// Triangulate a simple plan polygon
///
/// Returns index triples into `points`, each wound counter-clockwise
/// regardless of the input orientation. Zero-area slivers are dropped.
pub fn triangulate_footprint(points: &[Point2<f64>]) -> Result<Vec<[usize; 3]>> {
    let n = points.len();
    if n < 3 {
        return Err(Error::invalid_argument(format!(
            "footprint needs at least 3 points to triangulate, got {}",
            n
        )));
    }

    let raw: Vec<usize> = if is_convex(points) {
        // Fan from the first vertex
        (1..n - 1).flat_map(|i| [0, i, i + 1]).collect()
    } else {
        let coords: Vec<f64> = points.iter().flat_map(|p| [p.x, p.y]).collect();
        earcutr::earcut(&coords, &[], 2).map_err(|e| {
            Error::degenerate_geometry(None, format!("footprint triangulation failed: {:?}", e))
        })?
    };

    let triangles: Vec<[usize; 3]> = raw
        .chunks_exact(3)
        .filter_map(|t| {
            let turn = orient(&points[t[0]], &points[t[1]], &points[t[2]]);
            if turn > 0.0 {
                Some([t[0], t[1], t[2]])
            } else if turn < 0.0 {
                Some([t[0], t[2], t[1]])
            } else {
                None
            }
        })
        .collect();

    if triangles.is_empty() {
        return Err(Error::degenerate_geometry(
            None,
            "footprint triangulation produced no triangles",
        ));
    }
    Ok(triangles)
}
