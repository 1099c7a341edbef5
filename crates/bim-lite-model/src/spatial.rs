// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Regions (rooms) and the elements classified against them

use crate::{BoundingBox, Category, Curve, ElementId, Error, GeometryNode, Result};
use nalgebra::{Point2, Point3};
use std::sync::Arc;

/// A bounded area or volume with a containment predicate
///
/// Implementations are backed by whatever area/volume computation the host
/// has. They must be safe to query from several threads at once.
///
/// # Example
///
/// ```ignore
/// use bim_lite_model::{Region, ElementId};
///
/// fn report(region: &dyn Region, point: &Point3<f64>) {
///     if region.contains(point) {
///         println!("{} ({}) contains the point", region.name(), region.id());
///     }
/// }
/// ```
pub trait Region: Send + Sync {
    /// Region identifier, compared against relational hints
    fn id(&self) -> ElementId;

    /// Check if a world point lies inside the region
    fn contains(&self, point: &Point3<f64>) -> bool;

    /// Optional world bounding box used to reject far-away points early
    fn bounding_box(&self) -> Option<BoundingBox> {
        None
    }

    /// Display name
    fn name(&self) -> &str {
        ""
    }
}

/// Room given by a horizontal footprint polygon extruded between two
/// elevations
#[derive(Clone, Debug, PartialEq)]
pub struct PolygonRegion {
    id: ElementId,
    name: String,
    footprint: Vec<Point2<f64>>,
    base_elevation: f64,
    height: f64,
    bounds: BoundingBox,
}

impl PolygonRegion {
    /// Create a region from a simple (non self-intersecting) footprint
    ///
    /// Fails on fewer than three vertices, zero footprint area or a
    /// non-positive height.
    pub fn new(
        id: ElementId,
        footprint: Vec<Point2<f64>>,
        base_elevation: f64,
        height: f64,
    ) -> Result<Self> {
        if footprint.len() < 3 {
            return Err(Error::invalid_argument(format!(
                "region {} footprint needs at least 3 vertices",
                id
            )));
        }
        if !(height > 0.0) {
            return Err(Error::invalid_argument(format!(
                "region {} height must be positive, got {}",
                id, height
            )));
        }
        if signed_area(&footprint).abs() <= f64::EPSILON {
            return Err(Error::degenerate_geometry(
                Some(id),
                "region footprint has zero area",
            ));
        }

        let corners = footprint.iter().flat_map(|p| {
            [
                Point3::new(p.x, p.y, base_elevation),
                Point3::new(p.x, p.y, base_elevation + height),
            ]
        });
        let corners: Vec<Point3<f64>> = corners.collect();
        let bounds = BoundingBox::from_points(corners.iter())
            .ok_or_else(|| Error::invalid_argument("region footprint is empty"))?;

        Ok(Self {
            id,
            name: String::new(),
            footprint,
            base_elevation,
            height,
            bounds,
        })
    }

    /// Rectangular room between two plan corners
    pub fn rectangle(
        id: ElementId,
        min: Point2<f64>,
        max: Point2<f64>,
        base_elevation: f64,
        height: f64,
    ) -> Result<Self> {
        Self::new(
            id,
            vec![
                Point2::new(min.x, min.y),
                Point2::new(max.x, min.y),
                Point2::new(max.x, max.y),
                Point2::new(min.x, max.y),
            ],
            base_elevation,
            height,
        )
    }

    /// Set the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Footprint vertices in plan
    pub fn footprint(&self) -> &[Point2<f64>] {
        &self.footprint
    }

    /// Floor elevation
    pub fn base_elevation(&self) -> f64 {
        self.base_elevation
    }

    /// Floor-to-ceiling height
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Footprint area
    pub fn area(&self) -> f64 {
        signed_area(&self.footprint).abs()
    }

    /// Enclosed volume
    pub fn volume(&self) -> f64 {
        self.area() * self.height
    }

    /// Check if the footprint runs counter-clockwise in plan
    pub fn is_counter_clockwise(&self) -> bool {
        signed_area(&self.footprint) > 0.0
    }

    /// Even-odd ray cast on the footprint
    fn footprint_contains(&self, x: f64, y: f64) -> bool {
        let pts = &self.footprint;
        let mut inside = false;
        let mut j = pts.len() - 1;
        for i in 0..pts.len() {
            let (pi, pj) = (&pts[i], &pts[j]);
            if (pi.y > y) != (pj.y > y) && x < (pj.x - pi.x) * (y - pi.y) / (pj.y - pi.y) + pi.x {
                inside = !inside;
            }
            j = i;
        }
        inside
    }
}

impl Region for PolygonRegion {
    fn id(&self) -> ElementId {
        self.id
    }

    fn contains(&self, point: &Point3<f64>) -> bool {
        self.bounds.contains(point) && self.footprint_contains(point.x, point.y)
    }

    fn bounding_box(&self) -> Option<BoundingBox> {
        Some(self.bounds)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Shoelace area, positive for counter-clockwise loops
fn signed_area(points: &[Point2<f64>]) -> f64 {
    let n = points.len();
    let twice: f64 = (0..n)
        .map(|i| {
            let (a, b) = (&points[i], &points[(i + 1) % n]);
            a.x * b.y - b.x * a.y
        })
        .sum();
    twice * 0.5
}

/// Precomputed adjacency carried by connector elements
///
/// For a door this is its from-room and to-room; either may be missing for
/// exterior doors.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RelationalHint {
    adjoining: Vec<ElementId>,
}

impl RelationalHint {
    /// Hint naming the given regions
    pub fn new(adjoining: impl IntoIterator<Item = ElementId>) -> Self {
        Self {
            adjoining: adjoining.into_iter().collect(),
        }
    }

    /// Hint from a connector's two sides
    pub fn between(from: Option<ElementId>, to: Option<ElementId>) -> Self {
        Self::new(from.into_iter().chain(to))
    }

    /// Adjoining region ids
    pub fn adjoining(&self) -> &[ElementId] {
        &self.adjoining
    }

    /// Check if the hint names `region`
    pub fn mentions(&self, region: ElementId) -> bool {
        self.adjoining.contains(&region)
    }
}

/// How an element is positioned
#[derive(Clone, Debug, Default)]
pub enum Location {
    /// No position data
    #[default]
    None,
    /// Point-located (furniture, fixtures, family instances)
    Point(Point3<f64>),
    /// Curve-located (pipes, beams, and walls via their location line)
    Curve(Arc<dyn Curve>),
    /// Only geometry is available
    Geometry(Vec<GeometryNode>),
}

/// Element snapshot to classify against regions
#[derive(Clone, Debug)]
pub struct LocatedElement {
    /// Element id
    pub id: ElementId,
    /// Category tag
    pub category: Category,
    /// Position data
    pub location: Location,
    /// Adjacency data, if the host provides it
    pub hint: Option<RelationalHint>,
    /// Display name
    pub name: Option<String>,
}

impl LocatedElement {
    /// Create an element without location
    pub fn new(id: ElementId, category: Category) -> Self {
        Self {
            id,
            category,
            location: Location::None,
            hint: None,
            name: None,
        }
    }

    /// Position at a point
    pub fn with_point(mut self, point: Point3<f64>) -> Self {
        self.location = Location::Point(point);
        self
    }

    /// Position along a curve
    pub fn with_curve(mut self, curve: Arc<dyn Curve>) -> Self {
        self.location = Location::Curve(curve);
        self
    }

    /// Position through geometry only
    pub fn with_geometry(mut self, geometry: Vec<GeometryNode>) -> Self {
        self.location = Location::Geometry(geometry);
        self
    }

    /// Attach a relational hint
    pub fn with_hint(mut self, hint: RelationalHint) -> Self {
        self.hint = Some(hint);
        self
    }

    /// Set the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Placement point, if point-located
    pub fn placement_point(&self) -> Option<Point3<f64>> {
        match &self.location {
            Location::Point(p) => Some(*p),
            _ => None,
        }
    }

    /// Placement curve, if curve-located
    pub fn placement_curve(&self) -> Option<&Arc<dyn Curve>> {
        match &self.location {
            Location::Curve(c) => Some(c),
            _ => None,
        }
    }
}
