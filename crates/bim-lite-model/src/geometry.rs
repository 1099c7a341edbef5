// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometry primitives and the instanced geometry tree

use crate::math::{midpoint, LINEAR_TOLERANCE};
use crate::{BoundingBox, Curve, Error, Result, Transform};
use nalgebra::{Point3, Vector3};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Planar convex polygon loop
///
/// Vertices run counter-clockwise when seen from the side the face's
/// normal points to.
#[derive(Clone, Debug, PartialEq)]
pub struct Face {
    vertices: Vec<Point3<f64>>,
}

impl Face {
    /// Create a face from at least three vertices
    pub fn new(vertices: Vec<Point3<f64>>) -> Result<Self> {
        if vertices.len() < 3 {
            return Err(Error::invalid_argument(format!(
                "face needs at least 3 vertices, got {}",
                vertices.len()
            )));
        }
        Ok(Self { vertices })
    }

    /// Vertex loop
    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    /// Area-weighted normal (Newell's method); length is twice the area
    fn newell(&self) -> Vector3<f64> {
        let n = self.vertices.len();
        let mut normal = Vector3::<f64>::zeros();
        for i in 0..n {
            let current = &self.vertices[i];
            let next = &self.vertices[(i + 1) % n];
            normal.x += (current.y - next.y) * (current.z + next.z);
            normal.y += (current.z - next.z) * (current.x + next.x);
            normal.z += (current.x - next.x) * (current.y + next.y);
        }
        normal
    }

    /// Unit normal, or zero for a degenerate (collinear) loop
    pub fn normal(&self) -> Vector3<f64> {
        self.newell()
            .try_normalize(LINEAR_TOLERANCE)
            .unwrap_or_else(Vector3::zeros)
    }

    /// Polygon area
    pub fn area(&self) -> f64 {
        self.newell().norm() * 0.5
    }

    /// Vertex average
    pub fn centroid(&self) -> Point3<f64> {
        let sum = self
            .vertices
            .iter()
            .fold(Vector3::zeros(), |acc, p| acc + p.coords);
        Point3::from(sum / self.vertices.len() as f64)
    }

    /// Boundary edges in loop order
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| Edge::new(self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// A copy mapped through `transform`
    pub fn transformed(&self, transform: &Transform) -> Face {
        Face {
            vertices: self.vertices.iter().map(|p| transform.of_point(p)).collect(),
        }
    }
}

/// Straight edge between two points
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
    pub start: Point3<f64>,
    pub end: Point3<f64>,
}

impl Edge {
    /// Create an edge
    pub fn new(start: Point3<f64>, end: Point3<f64>) -> Self {
        Self { start, end }
    }

    /// Edge length
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    /// Midpoint
    pub fn midpoint(&self) -> Point3<f64> {
        midpoint(&self.start, &self.end)
    }

    /// Same edge regardless of direction, with -0.0 folded into 0.0
    fn key(&self) -> ([u64; 3], [u64; 3]) {
        let bits = |p: &Point3<f64>| {
            [
                (p.x + 0.0).to_bits(),
                (p.y + 0.0).to_bits(),
                (p.z + 0.0).to_bits(),
            ]
        };
        let (a, b) = (bits(&self.start), bits(&self.end));
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }

    /// A copy mapped through `transform`
    pub fn transformed(&self, transform: &Transform) -> Edge {
        Edge::new(transform.of_point(&self.start), transform.of_point(&self.end))
    }
}

impl Curve for Edge {
    fn evaluate(&self, parameter: f64, normalized: bool) -> Point3<f64> {
        let length = self.length();
        let t = if normalized || length <= LINEAR_TOLERANCE {
            parameter
        } else {
            parameter / length
        };
        self.start + (self.end - self.start) * t
    }

    fn end_point(&self, index: usize) -> Result<Point3<f64>> {
        match index {
            0 => Ok(self.start),
            1 => Ok(self.end),
            _ => Err(Error::invalid_argument(format!(
                "edge end point index must be 0 or 1, got {}",
                index
            ))),
        }
    }

    fn length(&self) -> f64 {
        Edge::length(self)
    }

    fn transformed(&self, transform: &Transform) -> Arc<dyn Curve> {
        Arc::new(Edge::transformed(self, transform))
    }
}

/// Closed shell of planar faces
///
/// Faces are oriented outward. An empty or flat shell has zero volume and is
/// treated as degenerate by aggregation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Solid {
    faces: Vec<Face>,
}

impl Solid {
    /// Create a solid from its boundary faces
    pub fn from_faces(faces: Vec<Face>) -> Self {
        Self { faces }
    }

    /// Axis-aligned box between two corners
    ///
    /// A zero extent on any axis gives a zero-volume (degenerate) solid.
    pub fn cuboid(min: Point3<f64>, max: Point3<f64>) -> Self {
        let (a, b) = (min, max);
        let v = [
            Point3::new(a.x, a.y, a.z), // 0: bottom-front-left
            Point3::new(b.x, a.y, a.z), // 1: bottom-front-right
            Point3::new(b.x, b.y, a.z), // 2: bottom-back-right
            Point3::new(a.x, b.y, a.z), // 3: bottom-back-left
            Point3::new(a.x, a.y, b.z), // 4: top-front-left
            Point3::new(b.x, a.y, b.z), // 5: top-front-right
            Point3::new(b.x, b.y, b.z), // 6: top-back-right
            Point3::new(a.x, b.y, b.z), // 7: top-back-left
        ];
        let quad = |i: [usize; 4]| Face {
            vertices: i.iter().map(|&k| v[k]).collect(),
        };
        Self {
            faces: vec![
                quad([0, 3, 2, 1]), // -Z
                quad([4, 5, 6, 7]), // +Z
                quad([0, 1, 5, 4]), // -Y
                quad([3, 7, 6, 2]), // +Y
                quad([0, 4, 7, 3]), // -X
                quad([1, 2, 6, 5]), // +X
            ],
        }
    }

    /// Boundary faces
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Check if the shell has no faces
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Enclosed volume (divergence theorem over fan-triangulated faces)
    pub fn volume(&self) -> f64 {
        let reference = match self.faces.first() {
            Some(face) => face.vertices[0],
            None => return 0.0,
        };

        let mut six_volume = 0.0;
        for face in &self.faces {
            let v = &face.vertices;
            let a = v[0] - reference;
            for i in 1..v.len() - 1 {
                let b = v[i] - reference;
                let c = v[i + 1] - reference;
                six_volume += a.dot(&b.cross(&c));
            }
        }
        six_volume / 6.0
    }

    /// Centre of mass of the enclosed volume
    ///
    /// Falls back to the centre of the bounds for shells without volume;
    /// `None` when empty.
    pub fn centroid(&self) -> Option<Point3<f64>> {
        let reference = self.faces.first()?.vertices[0];

        let mut six_volume = 0.0;
        let mut weighted = Vector3::zeros();
        for face in &self.faces {
            let v = &face.vertices;
            let a = v[0] - reference;
            for i in 1..v.len() - 1 {
                let b = v[i] - reference;
                let c = v[i + 1] - reference;
                let tet = a.dot(&b.cross(&c));
                six_volume += tet;
                weighted += (a + b + c) * (tet / 4.0);
            }
        }

        if six_volume.abs() <= LINEAR_TOLERANCE {
            return self.bounds().map(|b| b.center());
        }
        Some(reference + weighted / six_volume)
    }

    /// Check if the solid carries material (`volume > 0`)
    pub fn has_volume(&self) -> bool {
        self.volume() > 0.0
    }

    /// Unique undirected edges of all faces
    ///
    /// Vertices shared between faces must be bit-identical to merge.
    pub fn edges(&self) -> Vec<Edge> {
        let mut seen = FxHashSet::default();
        self.faces
            .iter()
            .flat_map(|f| f.edges())
            .filter(|e| e.length() > LINEAR_TOLERANCE && seen.insert(e.key()))
            .collect()
    }

    /// All face vertices (with repeats)
    pub fn vertices(&self) -> impl Iterator<Item = &Point3<f64>> {
        self.faces.iter().flat_map(|f| f.vertices.iter())
    }

    /// World axis-aligned bounds, `None` when empty
    pub fn bounds(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(self.vertices())
    }

    /// A copy mapped through `transform`
    pub fn transformed(&self, transform: &Transform) -> Solid {
        Solid {
            faces: self.faces.iter().map(|f| f.transformed(transform)).collect(),
        }
    }
}

/// A leaf primitive of the geometry tree
#[derive(Clone, Debug)]
pub enum GeometryObject {
    Solid(Solid),
    Curve(Arc<dyn Curve>),
    Face(Face),
    Edge(Edge),
    Point(Point3<f64>),
}

impl GeometryObject {
    /// Short kind name for diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            GeometryObject::Solid(_) => "Solid",
            GeometryObject::Curve(_) => "Curve",
            GeometryObject::Face(_) => "Face",
            GeometryObject::Edge(_) => "Edge",
            GeometryObject::Point(_) => "Point",
        }
    }

    /// A copy mapped through `transform`
    pub fn transformed(&self, transform: &Transform) -> GeometryObject {
        match self {
            GeometryObject::Solid(s) => GeometryObject::Solid(s.transformed(transform)),
            GeometryObject::Curve(c) => GeometryObject::Curve(c.transformed(transform)),
            GeometryObject::Face(f) => GeometryObject::Face(f.transformed(transform)),
            GeometryObject::Edge(e) => GeometryObject::Edge(e.transformed(transform)),
            GeometryObject::Point(p) => GeometryObject::Point(transform.of_point(p)),
        }
    }
}

/// Which child tree of an instance to descend into
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Representation {
    /// Resolved geometry already placed in world space
    #[default]
    Placed,
    /// Untransformed template (symbol) geometry
    Symbol,
}

/// An instance of shared template geometry
///
/// Carries both the resolved (`placed`) and template (`symbol`) trees; the
/// caller picks one through [`Representation`].
#[derive(Clone, Debug)]
pub struct GeometryInstance {
    /// Symbol-to-world transform
    pub transform: Transform,
    /// Geometry in world space
    pub placed: Vec<GeometryNode>,
    /// Geometry in the symbol's own space
    pub symbol: Vec<GeometryNode>,
}

impl GeometryInstance {
    /// Create an instance from both trees
    pub fn new(transform: Transform, placed: Vec<GeometryNode>, symbol: Vec<GeometryNode>) -> Self {
        Self {
            transform,
            placed,
            symbol,
        }
    }

    /// Create an instance from its template, deriving the placed tree by
    /// applying `transform`
    ///
    /// An identity transform shares the symbol's leaves instead of mapping
    /// them.
    pub fn from_symbol(transform: Transform, symbol: Vec<GeometryNode>) -> Self {
        let placed = if transform.is_identity(0.0) {
            symbol.clone()
        } else {
            symbol.iter().map(|n| n.transformed(&transform)).collect()
        };
        Self {
            transform,
            placed,
            symbol,
        }
    }

    /// Child tree for the requested representation
    pub fn children(&self, representation: Representation) -> &[GeometryNode] {
        match representation {
            Representation::Placed => &self.placed,
            Representation::Symbol => &self.symbol,
        }
    }
}

/// Node of an instanced geometry tree
///
/// Children are owned, so a tree cannot reference one of its ancestors.
#[derive(Clone, Debug)]
pub enum GeometryNode {
    /// A primitive
    Leaf(GeometryObject),
    /// Placed template geometry
    Instance(GeometryInstance),
    /// Nested geometry element
    Group(Vec<GeometryNode>),
}

impl GeometryNode {
    /// Leaf holding a solid
    pub fn solid(solid: Solid) -> Self {
        GeometryNode::Leaf(GeometryObject::Solid(solid))
    }

    /// Leaf holding a curve
    pub fn curve(curve: Arc<dyn Curve>) -> Self {
        GeometryNode::Leaf(GeometryObject::Curve(curve))
    }

    /// Leaf holding a point
    pub fn point(point: Point3<f64>) -> Self {
        GeometryNode::Leaf(GeometryObject::Point(point))
    }

    /// A copy mapped through `transform`
    ///
    /// Instances keep their symbol tree; their placed tree and transform are
    /// moved.
    pub fn transformed(&self, transform: &Transform) -> GeometryNode {
        match self {
            GeometryNode::Leaf(obj) => GeometryNode::Leaf(obj.transformed(transform)),
            GeometryNode::Instance(inst) => GeometryNode::Instance(GeometryInstance {
                transform: transform.compose(&inst.transform),
                placed: inst.placed.iter().map(|n| n.transformed(transform)).collect(),
                symbol: inst.symbol.clone(),
            }),
            GeometryNode::Group(nodes) => {
                GeometryNode::Group(nodes.iter().map(|n| n.transformed(transform)).collect())
            }
        }
    }
}

/// Leaf primitive kinds that can be picked out of a geometry tree
pub trait LeafKind {
    /// Borrow the primitive if `object` is of this kind
    fn from_object(object: &GeometryObject) -> Option<&Self>;
}

/// Every leaf, whatever its kind
impl LeafKind for GeometryObject {
    fn from_object(object: &GeometryObject) -> Option<&Self> {
        Some(object)
    }
}

impl LeafKind for Solid {
    fn from_object(object: &GeometryObject) -> Option<&Self> {
        match object {
            GeometryObject::Solid(s) => Some(s),
            _ => None,
        }
    }
}

impl LeafKind for dyn Curve {
    fn from_object(object: &GeometryObject) -> Option<&Self> {
        match object {
            GeometryObject::Curve(c) => Some(c.as_ref()),
            _ => None,
        }
    }
}

impl LeafKind for Face {
    fn from_object(object: &GeometryObject) -> Option<&Self> {
        match object {
            GeometryObject::Face(f) => Some(f),
            _ => None,
        }
    }
}

impl LeafKind for Edge {
    fn from_object(object: &GeometryObject) -> Option<&Self> {
        match object {
            GeometryObject::Edge(e) => Some(e),
            _ => None,
        }
    }
}

impl LeafKind for Point3<f64> {
    fn from_object(object: &GeometryObject) -> Option<&Self> {
        match object {
            GeometryObject::Point(p) => Some(p),
            _ => None,
        }
    }
}
