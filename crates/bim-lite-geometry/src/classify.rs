// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Element-to-room classification
//!
//! Decides which regions an element belongs to. Relational hints are
//! consulted first; otherwise the element is reduced to one or two
//! representative points that are tested against the region.

use crate::flatten::geometry_bounds;
use crate::{Error, Result};
use bim_lite_model::math::{horizontal, horizontal_perpendicular, LINEAR_TOLERANCE};
use bim_lite_model::{Curve, ElementId, LocatedElement, Location, Region, Representation};
use log::{debug, warn};
use nalgebra::Point3;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// What to do when an element's hint does not name the region under test
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HintPolicy {
    /// Ignore the hint and test geometrically
    #[default]
    FallThrough,
    /// Trust the hint: the element is not in the region
    Exclusive,
}

/// Classifier configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierOptions {
    /// Distance of the wall probes from the wall's location line
    pub wall_probe_offset: f64,
    /// Handling of hints that do not name the region
    pub hint_policy: HintPolicy,
}

impl Default for ClassifierOptions {
    fn default() -> Self {
        Self {
            wall_probe_offset: 0.09,
            hint_policy: HintPolicy::FallThrough,
        }
    }
}

impl ClassifierOptions {
    /// Options that take relational hints as the final word
    pub fn hints_exclusive() -> Self {
        Self {
            hint_policy: HintPolicy::Exclusive,
            ..Self::default()
        }
    }
}

/// How an element is reduced to test points
#[derive(Debug, Clone, PartialEq)]
pub enum Strategy {
    /// Point-located element
    Point(Point3<f64>),
    /// Midpoint of a non-wall location curve
    CurveMidpoint(Point3<f64>),
    /// Points either side of a wall's location line
    WallProbes([Point3<f64>; 2]),
    /// Centre of the element's placed geometry
    GeometryCenter(Point3<f64>),
    /// Connector without location; never inside by geometry
    Unlocated,
}

impl Strategy {
    /// Pick the strategy for an element from the data it carries
    ///
    /// Fails with `DegenerateGeometry` for a wall whose location line has
    /// no horizontal extent, and with `MissingLocation` when a non-connector
    /// has nothing to test.
    pub fn for_element(element: &LocatedElement, options: &ClassifierOptions) -> Result<Self> {
        match &element.location {
            Location::Point(point) => Ok(Strategy::Point(*point)),
            Location::Curve(curve) if element.category.is_wall_like() => {
                wall_probes(element.id, curve.as_ref(), options.wall_probe_offset)
                    .map(Strategy::WallProbes)
            }
            Location::Curve(curve) => Ok(Strategy::CurveMidpoint(curve.midpoint())),
            Location::Geometry(nodes) => geometry_bounds(nodes, Representation::Placed)
                .map(|bounds| Strategy::GeometryCenter(bounds.center()))
                .ok_or(Error::MissingLocation(element.id)),
            Location::None if element.category.is_connector() => Ok(Strategy::Unlocated),
            Location::None => Err(Error::MissingLocation(element.id)),
        }
    }

    /// Short name for diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Point(_) => "point",
            Strategy::CurveMidpoint(_) => "curve midpoint",
            Strategy::WallProbes(_) => "wall probes",
            Strategy::GeometryCenter(_) => "geometry centre",
            Strategy::Unlocated => "unlocated",
        }
    }

    /// Points tested against a region; any hit counts
    pub fn test_points(&self) -> &[Point3<f64>] {
        match self {
            Strategy::Point(p) | Strategy::CurveMidpoint(p) | Strategy::GeometryCenter(p) => {
                std::slice::from_ref(p)
            }
            Strategy::WallProbes(probes) => probes.as_slice(),
            Strategy::Unlocated => &[],
        }
    }

    /// Check the strategy's points against a region
    ///
    /// Points outside the region's bounding box, when it has one, are
    /// rejected without calling `contains`.
    pub fn is_inside(&self, region: &dyn Region) -> bool {
        let bounds = region.bounding_box();
        self.test_points()
            .iter()
            .any(|p| bounds.map_or(true, |b| b.contains(p)) && region.contains(p))
    }
}

/// Probe points just either side of a wall's location line, at its middle
fn wall_probes(id: ElementId, curve: &dyn Curve, offset: f64) -> Result<[Point3<f64>; 2]> {
    let direction = horizontal(&(curve.end_point(1)? - curve.end_point(0)?));
    let direction = direction.try_normalize(LINEAR_TOLERANCE).ok_or_else(|| {
        Error::degenerate_geometry(Some(id), "wall location line has no horizontal extent")
    })?;
    let side = horizontal_perpendicular(&direction) * offset;
    let mid = curve.midpoint();
    Ok([mid + side, mid - side])
}

/// Result of classifying many elements against many regions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assignment {
    /// Elements found in each region, in input order
    pub by_region: FxHashMap<ElementId, Vec<ElementId>>,
    /// Elements that could not be classified at all
    pub unclassifiable: Vec<ElementId>,
}

impl Assignment {
    /// Elements in `region` (empty if none)
    pub fn elements_in(&self, region: ElementId) -> &[ElementId] {
        self.by_region.get(&region).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Classifies located elements against regions
///
/// # Example
///
/// ```ignore
/// use bim_lite_geometry::SpatialClassifier;
///
/// let classifier = SpatialClassifier::new();
/// if classifier.belongs_to(&chair, &room)? {
///     println!("{} is in {}", chair.id, room.name());
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct SpatialClassifier {
    options: ClassifierOptions,
}

impl SpatialClassifier {
    /// Classifier with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Classifier with custom options
    pub fn with_options(options: ClassifierOptions) -> Self {
        Self { options }
    }

    /// Current options
    pub fn options(&self) -> &ClassifierOptions {
        &self.options
    }

    /// Verdict from the element's hint alone, if it settles the question
    fn hint_verdict(&self, element: &LocatedElement, region: ElementId) -> Option<bool> {
        let hint = element.hint.as_ref()?;
        if hint.mentions(region) {
            return Some(true);
        }
        match self.options.hint_policy {
            HintPolicy::Exclusive => Some(false),
            HintPolicy::FallThrough => None,
        }
    }

    /// Check if an element belongs to a region
    pub fn belongs_to(&self, element: &LocatedElement, region: &dyn Region) -> Result<bool> {
        if let Some(verdict) = self.hint_verdict(element, region.id()) {
            debug!(
                "Element {} vs region {}: settled by hint ({})",
                element.id,
                region.id(),
                verdict
            );
            return Ok(verdict);
        }

        let strategy = Strategy::for_element(element, &self.options)?;
        let inside = strategy.is_inside(region);
        debug!(
            "Element {} vs region {}: {} -> {}",
            element.id,
            region.id(),
            strategy.name(),
            inside
        );
        Ok(inside)
    }

    /// Ids of all regions the element belongs to, in region order
    ///
    /// The strategy is only derived if some region is not settled by the
    /// element's hint. If that derivation fails, the regions named by the
    /// hint are still returned; the error surfaces only when the hint
    /// settled nothing.
    pub fn regions_of(
        &self,
        element: &LocatedElement,
        regions: &[&dyn Region],
    ) -> Result<Vec<ElementId>> {
        let mut strategy: Option<Result<Strategy>> = None;
        let mut found = Vec::new();

        for region in regions {
            let inside = match self.hint_verdict(element, region.id()) {
                Some(verdict) => verdict,
                None => match strategy
                    .get_or_insert_with(|| Strategy::for_element(element, &self.options))
                {
                    Ok(s) => s.is_inside(*region),
                    Err(_) => false,
                },
            };
            if inside {
                found.push(region.id());
            }
        }

        match strategy {
            Some(Err(e)) if found.is_empty() => Err(e),
            Some(Err(e)) => {
                debug!(
                    "Element {}: keeping {} hinted regions ({})",
                    element.id,
                    found.len(),
                    e
                );
                Ok(found)
            }
            _ => Ok(found),
        }
    }

    /// Classify every element against every region in parallel
    ///
    /// Elements that have no usable location, or whose geometry makes the
    /// test undefined, are listed in `unclassifiable` instead of failing the
    /// batch, unless their hint placed them in some region. Any other error
    /// is returned.
    pub fn assign(
        &self,
        elements: &[LocatedElement],
        regions: &[&dyn Region],
    ) -> Result<Assignment> {
        let results: Vec<(ElementId, Result<Vec<ElementId>>)> = elements
            .par_iter()
            .map(|element| (element.id, self.regions_of(element, regions)))
            .collect();

        let mut assignment = Assignment::default();
        for region in regions {
            assignment.by_region.entry(region.id()).or_default();
        }

        for (id, result) in results {
            match result {
                Ok(found) => {
                    for region in found {
                        assignment.by_region.entry(region).or_default().push(id);
                    }
                }
                Err(e) if e.is_unclassifiable() => {
                    warn!("Element {} could not be classified: {}", id, e);
                    assignment.unclassifiable.push(id);
                }
                Err(e) => return Err(e),
            }
        }

        debug!(
            "Assigned {} elements to {} regions ({} unclassifiable)",
            elements.len(),
            regions.len(),
            assignment.unclassifiable.len()
        );
        Ok(assignment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bim_lite_model::{
        BoundingBox, Category, GeometryInstance, GeometryNode, Line, PolygonRegion, RelationalHint,
        Solid, Transform,
    };
    use nalgebra::{Point2, Vector3};
    use std::sync::Arc;

    fn room(id: u64, x0: f64, x1: f64) -> PolygonRegion {
        let (min, max) = (Point2::new(x0, 0.0), Point2::new(x1, 5.0));
        PolygonRegion::rectangle(ElementId(id), min, max, 0.0, 3.0).unwrap()
    }

    fn line(a: [f64; 3], b: [f64; 3]) -> Arc<dyn Curve> {
        Arc::new(Line::new(Point3::new(a[0], a[1], a[2]), Point3::new(b[0], b[1], b[2])).unwrap())
    }

    #[test]
    fn test_point_inside_and_outside() {
        let classifier = SpatialClassifier::new();
        let r = room(1, 0.0, 5.0);
        let inside = LocatedElement::new(ElementId(10), Category::Furniture)
            .with_point(Point3::new(2.5, 2.5, 0.5));
        let outside = LocatedElement::new(ElementId(11), Category::Furniture)
            .with_point(Point3::new(50.0, 2.5, 0.5));
        assert!(classifier.belongs_to(&inside, &r).unwrap());
        assert!(!classifier.belongs_to(&outside, &r).unwrap());
    }

    #[test]
    fn test_hint_shortcut() {
        let classifier = SpatialClassifier::new();
        let r1 = room(1, 0.0, 5.0);
        // Placed far away, but the hint names the room
        let door = LocatedElement::new(ElementId(20), Category::Door)
            .with_point(Point3::new(100.0, 0.0, 0.0))
            .with_hint(RelationalHint::between(Some(ElementId(1)), None));
        assert!(classifier.belongs_to(&door, &r1).unwrap());
    }

    #[test]
    fn test_hint_mismatch_policies() {
        let r2 = room(2, 0.0, 5.0);
        let door = LocatedElement::new(ElementId(21), Category::Door)
            .with_point(Point3::new(2.0, 2.0, 0.0))
            .with_hint(RelationalHint::between(Some(ElementId(1)), None));

        let fall_through = SpatialClassifier::new();
        assert!(fall_through.belongs_to(&door, &r2).unwrap());

        let exclusive = SpatialClassifier::with_options(ClassifierOptions::hints_exclusive());
        assert!(!exclusive.belongs_to(&door, &r2).unwrap());
    }

    #[test]
    fn test_curve_uses_midpoint() {
        let classifier = SpatialClassifier::new();
        let r = room(1, 0.0, 5.0);
        // Ends outside on both sides, midpoint inside
        let pipe = LocatedElement::new(ElementId(30), Category::Pipe)
            .with_curve(line([-3.0, 2.0, 1.0], [7.0, 2.0, 1.0]));
        assert!(classifier.belongs_to(&pipe, &r).unwrap());
    }

    #[test]
    fn test_wall_on_boundary_belongs_to_both_rooms() {
        let classifier = SpatialClassifier::new();
        let left = room(1, 0.0, 5.0);
        let right = room(2, 5.0, 10.0);
        let wall = LocatedElement::new(ElementId(40), Category::Wall)
            .with_curve(line([5.0, 0.0, 0.0], [5.0, 5.0, 0.0]));
        assert!(classifier.belongs_to(&wall, &left).unwrap());
        assert!(classifier.belongs_to(&wall, &right).unwrap());

        let far = room(3, 20.0, 25.0);
        assert!(!classifier.belongs_to(&wall, &far).unwrap());
    }

    #[test]
    fn test_vertical_wall_is_degenerate() {
        let classifier = SpatialClassifier::new();
        let wall = LocatedElement::new(ElementId(41), Category::Wall)
            .with_curve(line([1.0, 1.0, 0.0], [1.0, 1.0, 3.0]));
        match classifier.belongs_to(&wall, &room(1, 0.0, 5.0)) {
            Err(Error::DegenerateGeometry { element, .. }) => {
                assert_eq!(element, Some(ElementId(41)))
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_geometry_center() {
        let classifier = SpatialClassifier::new();
        let r = room(1, 0.0, 5.0);
        let symbol = vec![GeometryNode::solid(Solid::cuboid(
            Point3::origin(),
            Point3::new(1.0, 1.0, 1.0),
        ))];
        let column = LocatedElement::new(ElementId(50), Category::Column).with_geometry(vec![
            GeometryNode::Instance(GeometryInstance::from_symbol(
                Transform::translation(Vector3::new(2.0, 2.0, 0.0)),
                symbol,
            )),
        ]);
        assert!(classifier.belongs_to(&column, &r).unwrap());
        assert_eq!(
            Strategy::for_element(&column, classifier.options()).unwrap(),
            Strategy::GeometryCenter(Point3::new(2.5, 2.5, 0.5))
        );
    }

    #[test]
    fn test_missing_location() {
        let classifier = SpatialClassifier::new();
        let r = room(1, 0.0, 5.0);
        let chair = LocatedElement::new(ElementId(60), Category::Furniture);
        assert!(matches!(
            classifier.belongs_to(&chair, &r),
            Err(Error::MissingLocation(ElementId(60)))
        ));

        let empty =
            LocatedElement::new(ElementId(61), Category::Equipment).with_geometry(Vec::new());
        assert!(matches!(
            classifier.belongs_to(&empty, &r),
            Err(Error::MissingLocation(_))
        ));

        let opening = LocatedElement::new(ElementId(62), Category::Opening);
        assert!(!classifier.belongs_to(&opening, &r).unwrap());
    }

    #[test]
    fn test_regions_of_and_assign() {
        let classifier = SpatialClassifier::new();
        let (a, b) = (room(1, 0.0, 5.0), room(2, 5.0, 10.0));
        let regions: Vec<&dyn Region> = vec![&a as &dyn Region, &b];

        let elements = vec![
            LocatedElement::new(ElementId(70), Category::Furniture)
                .with_point(Point3::new(1.0, 1.0, 0.0)),
            LocatedElement::new(ElementId(71), Category::Wall)
                .with_curve(line([5.0, 0.0, 0.0], [5.0, 5.0, 0.0])),
            LocatedElement::new(ElementId(72), Category::Furniture),
            LocatedElement::new(ElementId(73), Category::Fixture)
                .with_point(Point3::new(7.0, 1.0, 0.0)),
        ];

        assert_eq!(
            classifier.regions_of(&elements[1], &regions).unwrap(),
            vec![ElementId(1), ElementId(2)]
        );

        let assignment = classifier.assign(&elements, &regions).unwrap();
        assert_eq!(assignment.elements_in(ElementId(1)), &[ElementId(70), ElementId(71)]);
        assert_eq!(assignment.elements_in(ElementId(2)), &[ElementId(71), ElementId(73)]);
        assert_eq!(assignment.unclassifiable, vec![ElementId(72)]);
        assert!(assignment.elements_in(ElementId(99)).is_empty());
    }

    #[test]
    fn test_hinted_elements_keep_memberships_without_location() {
        let classifier = SpatialClassifier::new();
        let (a, b) = (room(1, 0.0, 5.0), room(2, 5.0, 10.0));
        let regions: Vec<&dyn Region> = vec![&a as &dyn Region, &b];
        let hint = RelationalHint::between(Some(ElementId(1)), None);

        let elements = vec![
            // Nothing to test geometrically, but the hint names room 1
            LocatedElement::new(ElementId(80), Category::Furniture).with_hint(hint.clone()),
            // Vertical location line: no probes, same hint
            LocatedElement::new(ElementId(81), Category::CurtainWall)
                .with_curve(line([1.0, 1.0, 0.0], [1.0, 1.0, 3.0]))
                .with_hint(hint),
            LocatedElement::new(ElementId(82), Category::Furniture),
        ];

        for element in &elements[..2] {
            assert!(classifier.belongs_to(element, &a).unwrap());
            assert!(classifier.belongs_to(element, &b).unwrap_err().is_unclassifiable());
            assert_eq!(classifier.regions_of(element, &regions).unwrap(), vec![ElementId(1)]);
        }
        assert!(matches!(
            classifier.regions_of(&elements[2], &regions),
            Err(Error::MissingLocation(ElementId(82)))
        ));

        let assignment = classifier.assign(&elements, &regions).unwrap();
        assert_eq!(assignment.elements_in(ElementId(1)), &[ElementId(80), ElementId(81)]);
        assert!(assignment.elements_in(ElementId(2)).is_empty());
        assert_eq!(assignment.unclassifiable, vec![ElementId(82)]);
    }

    /// Claims every point but reports a small box
    struct BoxedEverywhere(BoundingBox);

    impl Region for BoxedEverywhere {
        fn id(&self) -> ElementId {
            ElementId(90)
        }

        fn contains(&self, _point: &Point3<f64>) -> bool {
            true
        }

        fn bounding_box(&self) -> Option<BoundingBox> {
            Some(self.0)
        }
    }

    #[test]
    fn test_bounding_box_rejects_before_contains() {
        let region =
            BoxedEverywhere(BoundingBox::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0)));
        let near = Strategy::Point(Point3::new(0.5, 0.5, 0.5));
        let far = Strategy::Point(Point3::new(30.0, 0.5, 0.5));
        assert!(near.is_inside(&region));
        assert!(!far.is_inside(&region));

        // Only one wall probe needs to clear the box
        let straddling =
            Strategy::WallProbes([Point3::new(1.05, 0.5, 0.5), Point3::new(0.95, 0.5, 0.5)]);
        assert!(straddling.is_inside(&region));
    }

    #[test]
    fn test_options_from_json() {
        let options: ClassifierOptions =
            serde_json::from_str(r#"{"hint_policy": "Exclusive"}"#).unwrap();
        assert_eq!(options.hint_policy, HintPolicy::Exclusive);
        assert_eq!(options.wall_probe_offset, 0.09);
    }
}
