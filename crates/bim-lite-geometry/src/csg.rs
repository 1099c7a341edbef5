// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! csgrs-backed boolean engine

use crate::union::BooleanEngine;
use crate::{Error, Result};
use bim_lite_model::{BoundingBox, Face, Solid, LINEAR_TOLERANCE};
use csgrs::mesh::{polygon::Polygon, vertex::Vertex, Mesh as CSGMesh};
use log::debug;
use nalgebra::Point3;
use std::sync::OnceLock;

/// Boolean engine running csgrs BSP operations
///
/// Results are checked before they are returned: an empty mesh, a
/// non-finite vertex, or a union smaller than its larger operand is reported
/// as `BooleanOperationFailed`.
#[derive(Debug, Clone, Copy)]
pub struct CsgEngine {
    /// Relative volume slack when validating results
    pub volume_tolerance: f64,
}

impl CsgEngine {
    /// Engine with the default tolerance
    pub fn new() -> Self {
        Self {
            volume_tolerance: 1e-6,
        }
    }

    /// Convert a solid to a csgrs mesh, one polygon per face
    fn solid_to_csgrs(solid: &Solid) -> CSGMesh<()> {
        if solid.is_empty() {
            return CSGMesh {
                polygons: Vec::new(),
                bounding_box: OnceLock::new(),
                metadata: None,
            };
        }

        let polygons: Vec<Polygon<()>> = solid
            .faces()
            .iter()
            .filter_map(|face| {
                // Zero-area faces would feed NaN planes into the BSP tree
                let normal = face.normal().try_normalize(LINEAR_TOLERANCE)?;
                let vertices = face
                    .vertices()
                    .iter()
                    .map(|p| Vertex::new(*p, normal))
                    .collect();
                Some(Polygon::new(vertices, None))
            })
            .collect();

        CSGMesh::from_polygons(&polygons, None)
    }

    /// Convert a csgrs mesh back into a solid
    fn csgrs_to_solid(mesh: &CSGMesh<()>) -> Result<Solid> {
        let mut faces = Vec::with_capacity(mesh.polygons.len());
        for polygon in &mesh.polygons {
            if polygon.vertices.len() < 3 {
                continue;
            }
            let points: Vec<Point3<f64>> = polygon
                .vertices
                .iter()
                .map(|v| Point3::new(v.pos[0], v.pos[1], v.pos[2]))
                .collect();
            if points.iter().any(|p| !p.iter().all(|c| c.is_finite())) {
                return Err(Error::boolean_failed(0, "result has non-finite vertices"));
            }
            faces.push(Face::new(points)?);
        }
        Ok(Solid::from_faces(faces))
    }

    fn check(&self, a: &Solid, b: &Solid, result: &Solid) -> Result<()> {
        if result.is_empty() {
            return Err(Error::boolean_failed(0, "union produced an empty solid"));
        }
        let (va, vb, v) = (a.volume(), b.volume(), result.volume());
        let slack = self.volume_tolerance * va.max(vb).max(1.0);
        if !v.is_finite() || v + slack < va.max(vb) {
            return Err(Error::boolean_failed(
                0,
                format!(
                    "union volume {:.6} is smaller than operand volume {:.6}",
                    v,
                    va.max(vb)
                ),
            ));
        }
        if v > va + vb + slack {
            return Err(Error::boolean_failed(
                0,
                format!(
                    "union volume {:.6} exceeds the operand total {:.6}",
                    v,
                    va + vb
                ),
            ));
        }
        Ok(())
    }
}

impl Default for CsgEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Check if two boxes are separated along some axis
fn disjoint(a: &BoundingBox, b: &BoundingBox) -> bool {
    let gap = |lo: f64, hi: f64| lo > hi + LINEAR_TOLERANCE;
    gap(a.min.x, b.max.x)
        || gap(b.min.x, a.max.x)
        || gap(a.min.y, b.max.y)
        || gap(b.min.y, a.max.y)
        || gap(a.min.z, b.max.z)
        || gap(b.min.z, a.max.z)
}

impl BooleanEngine for CsgEngine {
    fn union(&self, a: &Solid, b: &Solid) -> Result<Solid> {
        use csgrs::traits::CSG;

        if a == b {
            return Ok(a.clone());
        }
        if b.is_empty() {
            return Ok(a.clone());
        }
        if a.is_empty() {
            return Ok(b.clone());
        }

        // Separated shells need no BSP work
        if let (Some(ba), Some(bb)) = (a.bounds(), b.bounds()) {
            if disjoint(&ba, &bb) {
                debug!("Disjoint operands, concatenating shells");
                let faces = a.faces().iter().chain(b.faces()).cloned().collect();
                return Ok(Solid::from_faces(faces));
            }
        }

        let left = Self::solid_to_csgrs(a);
        let right = Self::solid_to_csgrs(b);
        let merged = left.union(&right);

        let result = Self::csgrs_to_solid(&merged)?;
        self.check(a, b, &result)?;
        Ok(result)
    }

    fn name(&self) -> &'static str {
        "csgrs"
    }
}
